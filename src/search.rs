//! A minimax agent with alpha-beta pruning

use log::debug;
use rayon::prelude::*;

use crate::{
    board::Board,
    cell::{Cell, Player},
    heuristic::Scoring,
};

/// Sentinel bound for scores, larger than any heuristic value
pub const INFINITY: i32 = 1_000_000;

/// The default number of plies searched, counting the bot's own move
pub const DEFAULT_DEPTH: usize = 4;

/// Tunable parameters for a `Searcher`
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct SearchConfig {
    /// Maximum number of plies to look ahead
    pub depth: usize,
    /// Line scoring used at the leaves
    pub scoring: Scoring,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            depth: DEFAULT_DEPTH,
            scoring: Scoring::default(),
        }
    }
}

/// An agent to pick Tic-Tac-Toe moves
///
/// # Notes
/// Positions are searched to a fixed depth with minimax and alpha-beta
/// pruning. Leaves (depth exhausted, a completed line, or a full board) are
/// scored with the static heuristic from the bot's point of view, so the
/// strength of play depends on both the depth and the scoring policy.
///
/// Every branch evaluates its own copy of the board, so searches never
/// alias the caller's board.
#[derive(Clone, Debug, Default)]
pub struct Searcher {
    config: SearchConfig,

    /// The number of nodes searched by this `Searcher` so far (for diagnostics only)
    pub node_count: usize,
}

impl Searcher {
    pub fn new(config: SearchConfig) -> Self {
        Self {
            config,
            node_count: 0,
        }
    }

    /// Creates a `Searcher` with the default scoring and the given depth
    pub fn with_depth(depth: usize) -> Self {
        Self::new(SearchConfig {
            depth,
            ..SearchConfig::default()
        })
    }

    pub fn config(&self) -> SearchConfig {
        self.config
    }

    fn evaluate(&self, board: &Board, bot: Player) -> i32 {
        board.heuristic_with(bot, self.config.scoring)
    }

    /// Performs minimax search with alpha-beta pruning
    ///
    /// Returns the value of `board` for `bot` with `to_move` about to play.
    pub fn search(
        &mut self,
        board: &Board,
        depth: usize,
        bot: Player,
        to_move: Player,
        mut alpha: i32,
        mut beta: i32,
    ) -> i32 {
        self.node_count += 1;

        if depth == 0 || board.winner() != Cell::Empty {
            return self.evaluate(board, bot);
        }

        let moves = board.possible_moves();
        // full board
        if moves.is_empty() {
            return self.evaluate(board, bot);
        }

        let maximizing = to_move == bot;
        let mut best = if maximizing { -INFINITY } else { INFINITY };

        for index in moves {
            let next = board.with_move(index, to_move);
            let score = self.search(&next, depth - 1, bot, to_move.opponent(), alpha, beta);

            if maximizing {
                best = best.max(score);
                alpha = alpha.max(best);
            } else {
                best = best.min(score);
                beta = beta.min(best);
            }

            // the remaining siblings cannot change the result
            if beta <= alpha {
                break;
            }
        }

        best
    }

    /// Performs minimax search without pruning
    ///
    /// Produces the same values as `search` with a full window while visiting every node.
    pub fn minimax(&mut self, board: &Board, depth: usize, bot: Player, to_move: Player) -> i32 {
        self.node_count += 1;

        if depth == 0 || board.winner() != Cell::Empty || board.is_full() {
            return self.evaluate(board, bot);
        }

        let maximizing = to_move == bot;
        let mut best = if maximizing { -INFINITY } else { INFINITY };

        for index in board.possible_moves() {
            let next = board.with_move(index, to_move);
            let score = self.minimax(&next, depth - 1, bot, to_move.opponent());
            best = if maximizing { best.max(score) } else { best.min(score) };
        }

        best
    }

    /// Value of the successor after `bot` plays `index`
    fn root_score(&mut self, board: &Board, index: usize, bot: Player) -> i32 {
        let next = board.with_move(index, bot);
        let depth = self.config.depth.saturating_sub(1);
        self.search(&next, depth, bot, bot.opponent(), -INFINITY, INFINITY)
    }

    /// Scores every legal move for `bot` in ascending move order
    pub fn root_scores(&mut self, board: &Board, bot: Player) -> Vec<(usize, i32)> {
        board
            .possible_moves()
            .map(|index| (index, self.root_score(board, index, bot)))
            .collect()
    }

    /// Returns the best move for `bot`, or `None` if the board is full
    pub fn best_move(&mut self, board: &Board, bot: Player) -> Option<usize> {
        self.best_move_scored(board, bot).map(|(index, _)| index)
    }

    /// Returns the best move for `bot` with its search value
    ///
    /// Ties go to the lowest index.
    pub fn best_move_scored(&mut self, board: &Board, bot: Player) -> Option<(usize, i32)> {
        let start = self.node_count;
        let best = pick_best(self.root_scores(board, bot));
        debug!(
            "searched {} nodes at depth {}, best move {:?}",
            self.node_count - start,
            self.config.depth,
            best
        );
        best
    }

    /// Same as `best_move_scored`, evaluating the root moves in parallel
    ///
    /// Each root move is searched with its own board and a full window, which
    /// is also what the sequential search does, so both pick the same move.
    pub fn par_best_move_scored(&mut self, board: &Board, bot: Player) -> Option<(usize, i32)> {
        let moves: Vec<usize> = board.possible_moves().collect();
        let config = self.config;

        let results: Vec<(usize, i32, usize)> = moves
            .par_iter()
            .map(|&index| {
                let mut worker = Searcher::new(config);
                let score = worker.root_score(board, index, bot);
                (index, score, worker.node_count)
            })
            .collect();

        self.node_count += results.iter().map(|r| r.2).sum::<usize>();
        let best = pick_best(results.into_iter().map(|(index, score, _)| (index, score)));
        debug!("parallel search at depth {}, best move {:?}", config.depth, best);
        best
    }
}

/// Keeps the first move with the strictly greatest score
fn pick_best<I: IntoIterator<Item = (usize, i32)>>(scores: I) -> Option<(usize, i32)> {
    let mut best: Option<(usize, i32)> = None;
    for (index, score) in scores {
        debug!("move {} scores {}", index, score);
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((index, score)),
        }
    }
    best
}
