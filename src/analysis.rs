//! Exhaustive checking of the search over every reachable position

use anyhow::{anyhow, Result};
use indicatif::*;
use log::{info, warn};
use rayon::prelude::*;

use std::any::Any;
use std::collections::HashSet;
use std::fmt;
use std::sync::mpsc::*;
use std::thread;
use std::time::*;

use crate::{
    board::Board,
    cell::{Cell, Player},
    heuristic::Scoring,
    search::{SearchConfig, Searcher},
};

/// Number of positions reachable from the empty board, the empty board included
pub const NUM_POSITIONS: usize = 5478;

/// Summary of an analysis run
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Report {
    /// Depth the positions were searched to
    pub depth: usize,
    /// Reachable positions found
    pub positions: usize,
    /// Non-terminal positions searched
    pub checked: usize,
    /// Positions where a pruned root score differed from the exhaustive one
    pub mismatches: Vec<Board>,
    /// Nodes visited with alpha-beta pruning
    pub pruned_nodes: usize,
    /// Nodes visited without pruning
    pub exhaustive_nodes: usize,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Depth {}: checked {} of {} positions, {} mismatches",
            self.depth,
            self.checked,
            self.positions,
            self.mismatches.len()
        )?;
        let saved = if self.exhaustive_nodes == 0 {
            0.0
        } else {
            100.0 * (1.0 - self.pruned_nodes as f64 / self.exhaustive_nodes as f64)
        };
        write!(
            f,
            "Nodes searched: {} pruned vs {} exhaustive ({:.1}% saved)",
            self.pruned_nodes, self.exhaustive_nodes, saved
        )
    }
}

/// The side to play in a reachable position, X moving first
pub fn side_to_move(board: &Board) -> Player {
    let x = board.cells().iter().filter(|&&c| c == Cell::X).count();
    let o = board.cells().iter().filter(|&&c| c == Cell::O).count();
    if x > o {
        Player::O
    } else {
        Player::X
    }
}

/// Every position reachable from the empty board, sorted by `Board::key`
///
/// Play stops as soon as a line is completed.
pub fn enumerate_positions() -> Vec<Board> {
    let mut seen = HashSet::with_capacity(NUM_POSITIONS);
    let mut positions = Vec::with_capacity(NUM_POSITIONS);
    let mut stack = vec![Board::new()];

    while let Some(board) = stack.pop() {
        if !seen.insert(board.key()) {
            continue;
        }
        positions.push(board);
        if board.winner() != Cell::Empty {
            continue;
        }
        let player = side_to_move(&board);
        for index in board.possible_moves() {
            stack.push(board.with_move(index, player));
        }
    }

    positions.sort_unstable_by_key(|board| board.key());
    positions
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        *message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic"
    }
}

/// Waits for a worker thread, turning a panic into an error
fn join_worker(worker: thread::JoinHandle<()>) -> Result<()> {
    worker
        .join()
        .map_err(|payload| anyhow!("analysis worker panicked: {}", panic_message(&*payload)))
}

struct Outcome {
    matches: bool,
    pruned_nodes: usize,
    exhaustive_nodes: usize,
}

/// Compares every pruned root score of `board` with its exhaustive value
fn check_position(board: &Board, config: SearchConfig) -> Outcome {
    let bot = side_to_move(board);
    let depth = config.depth.saturating_sub(1);

    let mut pruned = Searcher::new(config);
    let root_scores = pruned.root_scores(board, bot);

    let mut exhaustive = Searcher::new(config);
    let matches = root_scores.iter().all(|&(index, score)| {
        let next = board.with_move(index, bot);
        exhaustive.minimax(&next, depth, bot, bot.opponent()) == score
    });

    Outcome {
        matches,
        pruned_nodes: pruned.node_count,
        exhaustive_nodes: exhaustive.node_count,
    }
}

/// Searches every reachable non-terminal position at `depth`, checking that
/// pruning never changes a root move's value
///
/// With `progress` set a progress bar is drawn on stderr.
pub fn analyse(depth: usize, scoring: Scoring, progress: bool) -> Result<Report> {
    let start = Instant::now();
    let mut next_time = start;
    let config = SearchConfig { depth, scoring };

    let mut report = Report {
        depth,
        ..Report::default()
    };

    let positions = enumerate_positions();
    report.positions = positions.len();
    let candidates: Vec<Board> = positions
        .into_iter()
        .filter(|board| board.winner() == Cell::Empty && !board.is_full())
        .collect();
    info!(
        "found {} positions, {} to search at depth {}",
        report.positions,
        candidates.len(),
        depth
    );

    let bar = if progress {
        ProgressBar::new(candidates.len() as u64)
    } else {
        ProgressBar::hidden()
    };
    bar.set_style(
        ProgressStyle::default_bar()
            .template("Checking positions: {bar:40.cyan/blue} {msg} ~{eta} remaining")
            .progress_chars("█▓▒░  "),
    );

    enum Message {
        Checked((Board, Outcome)),
        Finish,
    }
    let (tx, rx) = channel();

    let worker = thread::spawn(move || {
        candidates
            .par_iter()
            .for_each_with(tx.clone(), |tx, board| {
                let outcome = check_position(board, config);
                // the receiver only hangs up on error, nothing left to report to
                let _ = tx.send(Message::Checked((*board, outcome)));
            });
        let _ = tx.send(Message::Finish);
    });

    let mut delta = 0;
    loop {
        let message = match rx.recv() {
            Ok(message) => message,
            // all senders are gone without a Finish, so the worker panicked
            Err(err) => {
                join_worker(worker)?;
                return Err(err.into());
            }
        };
        match message {
            Message::Finish => break,
            Message::Checked((board, outcome)) => {
                report.checked += 1;
                report.pruned_nodes += outcome.pruned_nodes;
                report.exhaustive_nodes += outcome.exhaustive_nodes;
                if !outcome.matches {
                    warn!("pruned search disagrees with minimax on\n{}", board);
                    report.mismatches.push(board);
                }
                delta += 1;
            }
        }
        if Instant::now() > next_time {
            bar.inc(delta);
            delta = 0;
            bar.set_message(&format!("({} / {})", bar.position(), bar.length()));
            next_time += Duration::from_millis(100);
        }
    }
    bar.inc(delta);
    bar.finish();
    join_worker(worker)?;

    report.mismatches.sort_unstable_by_key(|board| board.key());
    info!(
        "analysis at depth {} completed in {}",
        depth,
        HumanDuration(Instant::now() - start)
    );
    Ok(report)
}
