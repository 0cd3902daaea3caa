//! A game session between a human and the search

use anyhow::{anyhow, Result};
use log::info;

use crate::{
    board::Board,
    cell::{Cell, Player},
    search::Searcher,
    NUM_CELLS,
};

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum GameState {
    Playing,
    Won(Player),
    Draw,
}

impl GameState {
    /// Derives the state of a board: a completed line wins, a full board draws
    pub fn of(board: &Board) -> Self {
        match board.winner().player() {
            Some(player) => GameState::Won(player),
            None if board.is_full() => GameState::Draw,
            None => GameState::Playing,
        }
    }

    pub fn is_over(self) -> bool {
        self != GameState::Playing
    }
}

/// Places `player`'s mark at `index` without any checks
///
/// Callers are responsible for only playing into empty cells on their own turn.
pub fn apply_move(board: &mut Board, index: usize, player: Player) {
    board.set(index, Cell::from(player));
}

/// The state of one game, owned by whatever presents it
///
/// X always moves first, so a human playing O lets the bot open.
#[derive(Clone, Debug)]
pub struct Game {
    board: Board,
    human: Player,
    to_move: Player,
    history: Vec<usize>,
    state: GameState,
}

impl Game {
    pub fn new(human: Player) -> Self {
        Self {
            board: Board::new(),
            human,
            to_move: Player::X,
            history: Vec::with_capacity(NUM_CELLS),
            state: GameState::Playing,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }
    pub fn human(&self) -> Player {
        self.human
    }
    pub fn bot(&self) -> Player {
        self.human.opponent()
    }
    pub fn to_move(&self) -> Player {
        self.to_move
    }
    pub fn state(&self) -> GameState {
        self.state
    }
    /// Indices played so far, in order
    pub fn history(&self) -> &[usize] {
        &self.history
    }
    pub fn is_bot_turn(&self) -> bool {
        !self.state.is_over() && self.to_move == self.bot()
    }

    /// Plays `index` for the side to move, rejecting illegal moves
    pub fn play_checked(&mut self, index: usize) -> Result<GameState> {
        if self.state.is_over() {
            return Err(anyhow!("Invalid move, the game is already over"));
        }
        if index >= NUM_CELLS {
            return Err(anyhow!(
                "Invalid move, cell {} out of range. Cells must be between 1 and {}",
                index + 1,
                NUM_CELLS
            ));
        }
        if !self.board.cell(index).is_empty() {
            return Err(anyhow!("Invalid move, cell {} is occupied", index + 1));
        }

        apply_move(&mut self.board, index, self.to_move);
        self.history.push(index);
        self.state = GameState::of(&self.board);
        self.to_move = self.to_move.opponent();

        if self.state.is_over() {
            info!("game over after {} moves: {:?}", self.history.len(), self.state);
        }
        Ok(self.state)
    }

    /// Asks `searcher` for the bot's move and plays it
    ///
    /// Returns the index played.
    pub fn bot_move(&mut self, searcher: &mut Searcher) -> Result<usize> {
        if !self.is_bot_turn() {
            return Err(anyhow!("It is not the bot's turn"));
        }
        let index = searcher
            .best_move(&self.board, self.bot())
            .ok_or_else(|| anyhow!("No moves left for the bot"))?;
        self.play_checked(index)?;
        Ok(index)
    }

    /// Same as `bot_move`, searching the root moves in parallel
    pub fn par_bot_move(&mut self, searcher: &mut Searcher) -> Result<usize> {
        if !self.is_bot_turn() {
            return Err(anyhow!("It is not the bot's turn"));
        }
        let (index, _) = searcher
            .par_best_move_scored(&self.board, self.bot())
            .ok_or_else(|| anyhow!("No moves left for the bot"))?;
        self.play_checked(index)?;
        Ok(index)
    }
}
