//! Static evaluation of board lines

use anyhow::{anyhow, Result};

use std::fmt;
use std::str::FromStr;

use crate::cell::{Cell, Player};

/// Every line of three cells that wins the game: rows, then columns, then diagonals
pub const LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// Policy used to score a single line for one player
///
/// # Line Scoring
/// With `p` of the player's marks and `o` of the opponent's marks on a line:
/// - `Exponential` scores `10^p - 10^o`, and zero when both sides are present.
///   Near-complete lines dominate the total, which is what the search needs.
/// - `Squared` scores `p² - o²` with no special case for contested lines.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Scoring {
    Exponential,
    Squared,
}

impl Scoring {
    /// Scores one line of cells for `player`
    pub fn evaluate_line(self, line: [Cell; 3], player: Player) -> i32 {
        let mine = player.cell();
        let theirs = -mine;
        let player_count = line.iter().filter(|&&c| c == mine).count() as u32;
        let opponent_count = line.iter().filter(|&&c| c == theirs).count() as u32;

        match self {
            Scoring::Exponential => {
                if player_count > 0 && opponent_count > 0 {
                    0
                } else {
                    10i32.pow(player_count) - 10i32.pow(opponent_count)
                }
            }
            Scoring::Squared => {
                (player_count * player_count) as i32 - (opponent_count * opponent_count) as i32
            }
        }
    }
}

impl Default for Scoring {
    fn default() -> Self {
        Scoring::Exponential
    }
}

impl FromStr for Scoring {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "exponential" | "exp" => Ok(Scoring::Exponential),
            "squared" | "square" => Ok(Scoring::Squared),
            _ => Err(anyhow!(
                "unknown scoring policy '{}', expected 'exponential' or 'squared'",
                s
            )),
        }
    }
}

impl fmt::Display for Scoring {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scoring::Exponential => write!(f, "exponential"),
            Scoring::Squared => write!(f, "squared"),
        }
    }
}
