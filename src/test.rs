#[cfg(test)]
pub mod test {
    use anyhow::{anyhow, Result};

    use crate::analysis::{analyse, enumerate_positions, side_to_move, NUM_POSITIONS};
    use crate::board::Board;
    use crate::cell::{Cell, Player};
    use crate::game::{apply_move, Game, GameState};
    use crate::heuristic::{Scoring, LINES};
    use crate::search::{SearchConfig, Searcher, INFINITY};

    const CORNERS_AND_CENTER: [usize; 5] = [0, 2, 4, 6, 8];

    #[test]
    pub fn reachable_positions() {
        let positions = enumerate_positions();
        assert_eq!(positions.len(), NUM_POSITIONS);
        assert_eq!(positions[0].key(), 0);
    }

    #[test]
    pub fn winner_matches_a_completed_line() {
        for board in enumerate_positions() {
            let completed: Vec<Cell> = LINES
                .iter()
                .map(|line| board.cell(line[0]))
                .zip(LINES.iter())
                .filter(|(first, line)| {
                    !first.is_empty() && line.iter().all(|&i| board.cell(i) == *first)
                })
                .map(|(first, _)| first)
                .collect();

            let winner = board.winner();
            if completed.is_empty() {
                assert_eq!(winner, Cell::Empty, "\n{}", board);
            } else {
                assert!(completed.iter().all(|&c| c == winner), "\n{}", board);
            }
        }
    }

    #[test]
    pub fn moves_and_marks_cover_the_board() {
        for board in enumerate_positions() {
            let mut moves = board.possible_moves();
            assert_eq!(moves.len() + board.num_moves(), 9);
            assert!(moves.as_slice().windows(2).all(|w| w[0] < w[1]));
            assert_eq!(moves.is_empty(), board.is_full());
            assert!(moves.all(|i| board.cell(i).is_empty()));
            assert!(moves.is_empty());
        }
    }

    #[test]
    pub fn winner_check_order() -> Result<()> {
        assert_eq!("XXX OO. ...".parse::<Board>()?.winner(), Cell::X);
        assert_eq!("XO. XO. .O.".parse::<Board>()?.winner(), Cell::O);
        assert_eq!("X.O .XO ..X".parse::<Board>()?.winner(), Cell::X);
        assert_eq!("X.O XO. O.X".parse::<Board>()?.winner(), Cell::O);
        // the first line found wins on an otherwise illegal board
        assert_eq!("XXX OOO ...".parse::<Board>()?.winner(), Cell::X);
        assert_eq!("OXX OXX OXX".parse::<Board>()?.winner(), Cell::O);
        Ok(())
    }

    #[test]
    pub fn coordinates_are_row_major() {
        let mut board = Board::new();
        board.set_coords(1, 2, Cell::X);
        assert_eq!(board.cell(5), Cell::X);
        assert_eq!(board.get(1, 2), Cell::X);

        board.set(6, Cell::O);
        assert_eq!(board.get(2, 0), Cell::O);
    }

    #[test]
    #[should_panic]
    pub fn get_out_of_range_panics() {
        Board::new().get(0, 3);
    }

    #[test]
    #[should_panic]
    pub fn set_out_of_range_panics() {
        Board::new().set_coords(3, 0, Cell::X);
    }

    #[test]
    pub fn clone_is_independent() -> Result<()> {
        let original: Board = "X.. .O. ...".parse()?;
        let mut copy = original.clone();
        assert_eq!(copy, original);

        copy.set(8, Cell::X);
        apply_move(&mut copy, 2, Player::O);
        assert_eq!(original.cell(8), Cell::Empty);
        assert_eq!(original.cell(2), Cell::Empty);
        assert_ne!(copy, original);

        let next = original.with_move(1, Player::X);
        assert_eq!(next.cell(1), Cell::X);
        assert_eq!(original.cell(1), Cell::Empty);
        Ok(())
    }

    #[test]
    pub fn parse_and_display() -> Result<()> {
        let board: Board = "xx_\n-0-\n...".parse()?;
        assert_eq!(board.to_string(), "XX.\n.O.\n...");
        assert_eq!(board, Board::from_moves("1 5 2")?);

        assert!("XX. .O.".parse::<Board>().is_err());
        assert!("XX. .O. ... X".parse::<Board>().is_err());
        assert!("XX. .Q. ...".parse::<Board>().is_err());
        Ok(())
    }

    #[test]
    pub fn from_moves_rejects_illegal_games() {
        assert!(Board::from_moves("1 1").is_err());
        assert!(Board::from_moves("0").is_err());
        assert!(Board::from_moves("10").is_err());
        assert!(Board::from_moves("a").is_err());
        // X wins with 1 2 3, nothing may follow
        assert!(Board::from_moves("1 4 2 5 3").is_ok());
        assert!(Board::from_moves("1 4 2 5 3 6").is_err());
    }

    #[test]
    pub fn position_keys() -> Result<()> {
        assert_eq!(Board::new().key(), 0);
        assert_eq!("........X".parse::<Board>()?.key(), 1);
        assert_eq!("........O".parse::<Board>()?.key(), 2);
        assert_eq!("X........".parse::<Board>()?.key(), 6561);
        assert_ne!(Board::from_moves("1 2")?.key(), Board::from_moves("2 1")?.key());
        Ok(())
    }

    #[test]
    pub fn heuristic_known_lines() -> Result<()> {
        let board: Board = "XX. .O. ...".parse()?;
        // row 0 +99, column 0 +9, column 1 contested, diagonal 0 contested,
        // row 1 -9, column 2 0, diagonal 1 -9, row 2 0
        assert_eq!(board.heuristic(Player::X), 90);
        assert_eq!(board.heuristic(Player::O), -90);
        assert_eq!(board.heuristic_with(Player::X, Scoring::Squared), 3);
        assert_eq!(Board::new().heuristic(Player::X), 0);
        Ok(())
    }

    #[test]
    pub fn heuristic_is_antisymmetric() {
        for board in enumerate_positions() {
            for &scoring in [Scoring::Exponential, Scoring::Squared].iter() {
                assert_eq!(
                    board.heuristic_with(Player::X, scoring),
                    -board.heuristic_with(Player::O, scoring),
                    "\n{}",
                    board
                );
            }
        }
    }

    #[test]
    pub fn full_board_is_terminal() -> Result<()> {
        let board: Board = "XOX XOO OXX".parse()?;
        assert_eq!(board.winner(), Cell::Empty);
        assert!(board.possible_moves().is_empty());
        assert!(!Board::new().possible_moves().is_empty());
        assert_eq!(GameState::of(&board), GameState::Draw);

        let mut searcher = Searcher::default();
        let score = searcher.search(&board, 0, Player::X, Player::X, -INFINITY, INFINITY);
        assert_eq!(score, board.heuristic(Player::X));
        assert_eq!(searcher.node_count, 1);

        // a full board ends the search even with depth to spare
        let score = searcher.search(&board, 4, Player::O, Player::O, -INFINITY, INFINITY);
        assert_eq!(score, board.heuristic(Player::O));
        assert_eq!(searcher.node_count, 2);

        assert_eq!(searcher.best_move(&board, Player::X), None);
        Ok(())
    }

    #[test_log::test]
    pub fn opening_move() {
        let mut searcher = Searcher::default();
        for &bot in [Player::X, Player::O].iter() {
            let best = searcher.best_move(&Board::new(), bot);
            assert!(best.map_or(false, |index| CORNERS_AND_CENTER.contains(&index)));
            assert_eq!(best, Some(4));
        }

        // every opening draws with perfect play, so the first corner is kept
        let mut searcher = Searcher::with_depth(9);
        let best = searcher.best_move_scored(&Board::new(), Player::X);
        assert_eq!(best, Some((0, 0)));
    }

    #[test_log::test]
    pub fn completes_winning_line() -> Result<()> {
        let board: Board = "XX. .O. ...".parse()?;
        let mut searcher = Searcher::default();
        assert_eq!(searcher.best_move(&board, Player::X), Some(2));
        Ok(())
    }

    #[test]
    pub fn blocks_opponent() -> Result<()> {
        for &layout in ["OO. X.. ...", "OO. .X. ..X"].iter() {
            let board: Board = layout.parse()?;
            let mut searcher = Searcher::default();
            assert_eq!(searcher.best_move(&board, Player::X), Some(2), "\n{}", board);
        }
        // O to move, X threatens the anti-diagonal
        let board: Board = "O.. .X. X..".parse()?;
        assert_eq!(Searcher::default().best_move(&board, Player::O), Some(2));
        Ok(())
    }

    fn immediate_wins(board: &Board, player: Player) -> Vec<usize> {
        board
            .possible_moves()
            .filter(|&i| board.with_move(i, player).winner() == player.cell())
            .collect()
    }

    #[test]
    pub fn blocks_every_single_threat() {
        let mut searcher = Searcher::default();
        let mut solver = Searcher::with_depth(9);

        for board in enumerate_positions() {
            if board.winner() != Cell::Empty || board.is_full() {
                continue;
            }
            let side = side_to_move(&board);
            let threats = immediate_wins(&board, side.opponent());
            if !immediate_wins(&board, side).is_empty() || threats.len() != 1 {
                continue;
            }

            // positions already lost with perfect play may give up the block
            let block = board.with_move(threats[0], side);
            if solver.search(&block, 8, side, side.opponent(), -INFINITY, INFINITY) < -500 {
                continue;
            }
            assert_eq!(searcher.best_move(&board, side), Some(threats[0]), "\n{}", board);
        }
    }

    #[test]
    pub fn pruning_matches_minimax() -> Result<()> {
        for &depth in [1, 2, 3, 4, 9].iter() {
            let report = analyse(depth, Scoring::Exponential, false)?;
            assert_eq!(report.positions, NUM_POSITIONS);
            assert!(report.checked > 0);
            assert!(report.mismatches.is_empty(), "{}", report);
            assert!(report.pruned_nodes <= report.exhaustive_nodes);
        }

        let report = analyse(4, Scoring::Squared, false)?;
        assert!(report.mismatches.is_empty(), "{}", report);
        Ok(())
    }

    #[test]
    pub fn pruning_saves_work() -> Result<()> {
        let board = Board::new();
        let config = SearchConfig {
            depth: 9,
            ..SearchConfig::default()
        };

        let mut pruned = Searcher::new(config);
        let (index, score) = pruned
            .best_move_scored(&board, Player::X)
            .ok_or_else(|| anyhow!("no move on an empty board"))?;

        let mut exhaustive = Searcher::new(config);
        let value = exhaustive.minimax(&board.with_move(index, Player::X), 8, Player::X, Player::O);
        assert_eq!(score, value);
        assert!(pruned.node_count < exhaustive.node_count);
        Ok(())
    }

    #[test]
    pub fn parallel_search_agrees() {
        let positions = enumerate_positions();
        for board in positions.iter().step_by(7) {
            let bot = side_to_move(board);
            let mut sequential = Searcher::default();
            let mut parallel = Searcher::default();
            assert_eq!(
                sequential.best_move_scored(board, bot),
                parallel.par_best_move_scored(board, bot),
                "\n{}",
                board
            );
        }
    }

    // plays every possible opponent line against the bot
    fn outcomes(bot: Player, depth: usize) -> Result<Vec<GameState>> {
        fn walk(game: Game, searcher: &mut Searcher, found: &mut Vec<GameState>) -> Result<()> {
            if game.state().is_over() {
                if !found.contains(&game.state()) {
                    found.push(game.state());
                }
                return Ok(());
            }
            if game.is_bot_turn() {
                let mut next = game;
                next.bot_move(searcher)?;
                walk(next, searcher, found)
            } else {
                for index in game.board().possible_moves() {
                    let mut next = game.clone();
                    next.play_checked(index)?;
                    walk(next, searcher, found)?;
                }
                Ok(())
            }
        }

        let mut found = Vec::new();
        let mut searcher = Searcher::with_depth(depth);
        walk(Game::new(bot.opponent()), &mut searcher, &mut found)?;
        Ok(found)
    }

    #[test]
    pub fn bot_never_loses() -> Result<()> {
        for &depth in [4, 9].iter() {
            for &bot in [Player::X, Player::O].iter() {
                let found = outcomes(bot, depth)?;
                if found.contains(&GameState::Won(bot.opponent())) {
                    return Err(anyhow!("bot playing {} at depth {} lost a game", bot, depth));
                }
            }
        }
        Ok(())
    }

    #[test]
    pub fn full_depth_self_play_draws() -> Result<()> {
        let mut game = Game::new(Player::O);
        let mut searcher = Searcher::with_depth(9);
        while !game.state().is_over() {
            if game.is_bot_turn() {
                game.bot_move(&mut searcher)?;
            } else {
                let index = searcher
                    .best_move(game.board(), game.human())
                    .ok_or_else(|| anyhow!("no move on\n{}", game.board()))?;
                game.play_checked(index)?;
            }
        }
        assert_eq!(game.state(), GameState::Draw);
        assert_eq!(game.history().len(), 9);
        Ok(())
    }

    #[test]
    pub fn parallel_bot_move_agrees() -> Result<()> {
        // X is the bot and is to move after each of these openings
        for &moves in ["", "5 1", "1 5 9 3"].iter() {
            let mut sequential = Game::new(Player::O);
            let mut parallel = Game::new(Player::O);
            for token in moves.split_whitespace() {
                let index = token.parse::<usize>()? - 1;
                sequential.play_checked(index)?;
                parallel.play_checked(index)?;
            }
            assert!(sequential.is_bot_turn());

            let config = SearchConfig {
                depth: 9,
                ..SearchConfig::default()
            };
            let mut searcher = Searcher::new(config);
            let mut par_searcher = Searcher::new(config);
            assert_eq!(par_searcher.config(), config);
            assert_eq!(
                sequential.bot_move(&mut searcher)?,
                parallel.par_bot_move(&mut par_searcher)?,
                "after {}",
                moves
            );
            assert_eq!(sequential.board(), parallel.board());
            assert!(par_searcher.node_count > 0);
        }
        Ok(())
    }

    #[test]
    pub fn game_session_rules() -> Result<()> {
        let mut searcher = Searcher::default();

        // the bot opens when the human plays O
        let mut game = Game::new(Player::O);
        assert_eq!(game.bot(), Player::X);
        assert!(game.is_bot_turn());
        assert!(game.play_checked(9).is_err());
        let opening = game.bot_move(&mut searcher)?;
        assert_eq!(game.board().cell(opening), Cell::X);
        assert!(game.bot_move(&mut searcher).is_err());
        assert!(game.play_checked(opening).is_err());
        assert_eq!(game.to_move(), Player::O);

        // X: 1 2 3 wins
        let mut game = Game::new(Player::X);
        assert!(!game.is_bot_turn());
        for &index in [0, 3, 1, 4].iter() {
            assert_eq!(game.play_checked(index)?, GameState::Playing);
        }
        assert_eq!(game.play_checked(2)?, GameState::Won(Player::X));
        assert!(game.play_checked(8).is_err());
        assert!(game.bot_move(&mut searcher).is_err());
        assert_eq!(game.history(), &[0, 3, 1, 4, 2]);
        Ok(())
    }
}
