use anyhow::{anyhow, Result};

use std::fmt;
use std::str::FromStr;

use crate::{
    cell::{Cell, Player},
    heuristic::{Scoring, LINES},
    NUM_CELLS, SIZE,
};

/// The empty cells of a board in ascending index order
#[derive(Copy, Clone, Debug)]
pub struct MoveList {
    size: usize,
    next: usize,
    moves: [usize; NUM_CELLS],
}

impl MoveList {
    fn new() -> Self {
        Self {
            size: 0,
            next: 0,
            moves: [0; NUM_CELLS],
        }
    }
    fn push(&mut self, index: usize) {
        self.moves[self.size] = index;
        self.size += 1;
    }
    pub fn is_empty(&self) -> bool {
        self.next == self.size
    }
    /// The remaining moves as a slice
    pub fn as_slice(&self) -> &[usize] {
        &self.moves[self.next..self.size]
    }
}

impl Iterator for MoveList {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next == self.size {
            None
        } else {
            self.next += 1;
            Some(self.moves[self.next - 1])
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.size - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for MoveList {}

/// A 3x3 board, cells stored row-major so that `index = row * 3 + col`
///
/// `Board` is `Copy`: handing a board to the search or cloning it never
/// shares cell storage with the original.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Board {
    cells: [Cell; NUM_CELLS],
}

impl Board {
    pub fn new() -> Self {
        Self {
            cells: [Cell::Empty; NUM_CELLS],
        }
    }

    /// Builds a board from 1-based cell numbers, X moving first
    pub fn from_moves<S: AsRef<str>>(moves: S) -> Result<Self> {
        let mut board = Self::new();
        let mut player = Player::X;

        for token in moves.as_ref().split(|c: char| c.is_whitespace() || c == ',') {
            if token.is_empty() {
                continue;
            }
            match token.parse::<usize>() {
                Ok(number @ 1..=NUM_CELLS) => {
                    let index = number - 1;
                    if !board.cells[index].is_empty() {
                        return Err(anyhow!("Invalid move, cell {} is occupied", number));
                    }
                    // abort if the position is won at any point
                    if board.winner() != Cell::Empty {
                        return Err(anyhow!("Invalid position, game is over"));
                    }
                    board.play(index, player);
                    player = player.opponent();
                }
                _ => return Err(anyhow!("could not parse '{}' as a valid move", token)),
            }
        }
        Ok(board)
    }

    /// Returns the cell at the given coordinate
    ///
    /// # Panics
    /// If `row` or `col` is outside `0..3`.
    pub fn get(&self, row: usize, col: usize) -> Cell {
        assert!(
            row < SIZE && col < SIZE,
            "cell ({}, {}) is outside the {}x{} board",
            row,
            col,
            SIZE,
            SIZE
        );
        self.cells[row * SIZE + col]
    }

    /// Returns the cell at a flat index
    pub fn cell(&self, index: usize) -> Cell {
        self.cells[index]
    }

    pub fn cells(&self) -> &[Cell; NUM_CELLS] {
        &self.cells
    }

    /// Overwrites a cell without checking that it was empty
    pub fn set(&mut self, index: usize, cell: Cell) {
        self.cells[index] = cell;
    }

    /// Overwrites the cell at a coordinate without checking that it was empty
    pub fn set_coords(&mut self, row: usize, col: usize, cell: Cell) {
        assert!(
            row < SIZE && col < SIZE,
            "cell ({}, {}) is outside the {}x{} board",
            row,
            col,
            SIZE,
            SIZE
        );
        self.cells[row * SIZE + col] = cell;
    }

    pub fn play(&mut self, index: usize, player: Player) {
        self.set(index, player.cell());
    }

    /// Returns a copy of this board with `player`'s mark at `index`
    pub fn with_move(&self, index: usize, player: Player) -> Self {
        let mut next = *self;
        next.play(index, player);
        next
    }

    pub fn possible_moves(&self) -> MoveList {
        let mut moves = MoveList::new();
        for (index, cell) in self.cells.iter().enumerate() {
            if cell.is_empty() {
                moves.push(index);
            }
        }
        moves
    }

    /// Number of marks on the board
    pub fn num_moves(&self) -> usize {
        self.cells.iter().filter(|c| !c.is_empty()).count()
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|c| !c.is_empty())
    }

    /// Returns the mark of the first completed line found, or `Cell::Empty`
    ///
    /// Lines are checked rows first, then columns, then diagonals.
    /// An empty result means the game is either drawn or still going.
    pub fn winner(&self) -> Cell {
        for line in LINES.iter() {
            let first = self.cells[line[0]];
            if first != Cell::Empty
                && first == self.cells[line[1]]
                && self.cells[line[1]] == self.cells[line[2]]
            {
                return first;
            }
        }
        Cell::Empty
    }

    /// Scores the position for `player` with the exponential policy
    pub fn heuristic(&self, player: Player) -> i32 {
        self.heuristic_with(player, Scoring::Exponential)
    }

    /// Sums `scoring` over all eight lines
    pub fn heuristic_with(&self, player: Player, scoring: Scoring) -> i32 {
        LINES
            .iter()
            .map(|line| {
                scoring.evaluate_line(
                    [
                        self.cells[line[0]],
                        self.cells[line[1]],
                        self.cells[line[2]],
                    ],
                    player,
                )
            })
            .sum()
    }

    // base-3 code, unique for each board
    pub fn key(&self) -> u16 {
        self.cells
            .iter()
            .fold(0, |code, cell| code * 3 + cell.digit())
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for Board {
    type Err = anyhow::Error;

    /// Parses a row-major layout such as `"XX. .O. ..."` or `"XX..O...."`
    fn from_str(layout: &str) -> Result<Self> {
        let mut board = Self::new();
        let mut index = 0;

        for c in layout.chars().filter(|c| !c.is_whitespace()) {
            let cell = Cell::from_char(c)
                .ok_or_else(|| anyhow!("could not parse '{}' as a cell", c))?;
            if index == NUM_CELLS {
                return Err(anyhow!(
                    "Invalid board '{}', expected {} cells",
                    layout,
                    NUM_CELLS
                ));
            }
            board.cells[index] = cell;
            index += 1;
        }

        if index != NUM_CELLS {
            return Err(anyhow!(
                "Invalid board '{}', expected {} cells but found {}",
                layout,
                NUM_CELLS,
                index
            ));
        }
        Ok(board)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..SIZE {
            for col in 0..SIZE {
                write!(f, "{}", self.get(row, col))?;
            }
            if row + 1 < SIZE {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}
