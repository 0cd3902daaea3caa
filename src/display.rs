use anyhow::Result;
use crossterm::{
    style::{style, Attribute, Color, PrintStyledContent},
    QueueableCommand,
};

use std::io::{stdout, Write};

use tictactoe_ai::{board::Board, cell::Cell, SIZE};

/// Draws the board to stdout, numbering the empty cells 1-9
pub fn display(board: &Board) -> Result<()> {
    let mut stdout = stdout();

    stdout.queue(PrintStyledContent(style("\n".to_string())))?;
    for row in 0..SIZE {
        for col in 0..SIZE {
            let number = row * SIZE + col + 1;
            let content = match board.get(row, col) {
                Cell::X => style("X".to_string())
                    .attribute(Attribute::Bold)
                    .with(Color::Red),
                Cell::O => style("O".to_string())
                    .attribute(Attribute::Bold)
                    .with(Color::Yellow),
                Cell::Empty => style(number.to_string()).attribute(Attribute::Dim),
            };
            stdout.queue(PrintStyledContent(style(" ".to_string())))?;
            stdout.queue(PrintStyledContent(content))?;
            if col + 1 < SIZE {
                stdout.queue(PrintStyledContent(style(" |".to_string())))?;
            }
        }
        stdout.queue(PrintStyledContent(style("\n".to_string())))?;
        if row + 1 < SIZE {
            stdout.queue(PrintStyledContent(style("---+---+---\n".to_string())))?;
        }
    }
    stdout.queue(PrintStyledContent(style("\n".to_string())))?;
    stdout.flush()?;
    Ok(())
}
