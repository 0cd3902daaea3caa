use anyhow::{anyhow, Result};
use clap::Parser;
use log::info;

use std::io::{stdin, stdout, Stdin, Write};

use tictactoe_ai::{
    analysis,
    cell::Player,
    game::{Game, GameState},
    heuristic::Scoring,
    search::{SearchConfig, Searcher, DEFAULT_DEPTH},
};

mod display;
use display::*;

/// Play Tic-Tac-Toe against a minimax bot
#[derive(Parser, Debug)]
#[command(name = "tictactoe")]
#[command(about = "Play Tic-Tac-Toe against a minimax bot", long_about = None)]
#[command(version)]
struct Cli {
    /// Number of plies the bot looks ahead
    #[arg(short, long, default_value_t = DEFAULT_DEPTH)]
    depth: usize,

    /// Line scoring used by the bot (exponential or squared)
    #[arg(long, default_value_t = Scoring::Exponential)]
    scoring: Scoring,

    /// Search the bot's candidate moves in parallel
    #[arg(long)]
    parallel: bool,

    /// Check the search against plain minimax on every reachable position, then exit
    #[arg(long)]
    analyse: bool,
}

fn read_line(stdin: &Stdin) -> Result<String> {
    let mut buffer = String::new();
    if stdin.read_line(&mut buffer)? == 0 {
        return Err(anyhow!("stdin closed"));
    }
    Ok(buffer)
}

fn ask_yes_no(stdin: &Stdin, question: &str) -> Result<bool> {
    loop {
        print!("{}", question);
        stdout().flush()?;
        match read_line(stdin)?.to_lowercase().chars().next() {
            Some(_letter @ 'y') => return Ok(true),
            Some(_letter @ 'n') => return Ok(false),
            _ => println!("Unknown answer given"),
        }
    }
}

fn choose_player(stdin: &Stdin) -> Result<Player> {
    loop {
        print!("Play as X or O? (X moves first): ");
        stdout().flush()?;
        match read_line(stdin)?.trim().to_lowercase().chars().next() {
            Some(_letter @ 'x') => return Ok(Player::X),
            Some(_letter @ 'o') | Some(_letter @ '0') => return Ok(Player::O),
            _ => println!("Unknown answer given"),
        }
    }
}

fn play(game: &mut Game, searcher: &mut Searcher, parallel: bool, stdin: &Stdin) -> Result<()> {
    loop {
        display(game.board())?;

        match game.state() {
            GameState::Playing => {
                // bot player
                if game.is_bot_turn() {
                    println!("Bot is thinking...");
                    let index = if parallel {
                        game.par_bot_move(searcher)?
                    } else {
                        game.bot_move(searcher)?
                    };
                    println!("Bot plays {}", index + 1);

                // human player
                } else {
                    print!("Move input ({}) > ", game.human());
                    stdout().flush()?;
                    let input_str = read_line(stdin)?;

                    let index = match input_str.trim().parse::<usize>() {
                        Ok(number) if number >= 1 => number - 1,
                        _ => {
                            println!("Invalid cell: {}", input_str.trim());
                            continue;
                        }
                    };
                    if let Err(err) = game.play_checked(index) {
                        println!("{}", err);
                        // try the move again
                        continue;
                    }
                }
            }

            // end states
            GameState::Won(player) if player == game.human() => {
                println!("You win!");
                break;
            }
            GameState::Won(_) => {
                println!("The bot wins!");
                break;
            }
            GameState::Draw => {
                println!("Draw!");
                break;
            }
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    if cli.analyse {
        let report = analysis::analyse(cli.depth, cli.scoring, true)?;
        println!("{}", report);
        for board in report.mismatches.iter() {
            println!("\n{}", board);
        }
        return Ok(());
    }

    let config = SearchConfig {
        depth: cli.depth,
        scoring: cli.scoring,
    };
    let stdin = stdin();

    println!("Welcome to Tic-Tac-Toe\n");
    println!(
        "The bot searches {} plies ahead with {} scoring",
        config.depth, config.scoring
    );

    loop {
        let human = choose_player(&stdin)?;
        let mut game = Game::new(human);
        let mut searcher = Searcher::new(config);

        play(&mut game, &mut searcher, cli.parallel, &stdin)?;
        info!(
            "bot searched {} nodes this game at depth {}",
            searcher.node_count,
            searcher.config().depth
        );

        if !ask_yes_no(&stdin, "Play again? y/n: ")? {
            break;
        }
    }
    Ok(())
}
