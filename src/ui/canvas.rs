//! Cursor-addressable canvas primitives
//!
//! Stateless drawing operations over any byte sink. Escape sequences are
//! queued through crossterm commands, so nothing here knows whether the
//! sink is a socket, a telnet wrapper or an in-memory test buffer.

use std::io::{self, Write};

use crossterm::{
    cursor::{MoveDown, MoveLeft, MoveRight, MoveTo, MoveUp},
    queue,
    style::Print,
    terminal::{Clear, ClearType},
};

/// Erase the visible screen and home the cursor
pub fn clear_screen<W: Write>(out: &mut W) -> io::Result<()> {
    queue!(out, Clear(ClearType::All), MoveTo(0, 0))
}

/// Erase the current line and return to column 0
pub fn clear_line<W: Write>(out: &mut W) -> io::Result<()> {
    queue!(out, Clear(ClearType::CurrentLine), Print('\r'))
}

/// Erase `n` lines starting at the cursor row, leaving the cursor where it started.
///
/// A request for zero lines still clears the current one.
pub fn clear_lines_relative<W: Write>(out: &mut W, n: u16) -> io::Result<()> {
    let n = n.max(1);
    for i in 0..n {
        clear_line(out)?;
        if i < n - 1 {
            move_cursor_relative(out, 0, 1)?;
        }
    }
    move_cursor_relative(out, 0, -(i32::from(n) - 1))
}

/// Move the cursor relative to its current position.
///
/// Positive `dx` moves right, negative left. Positive `dy` moves down,
/// negative up. A zero delta emits nothing for that axis.
pub fn move_cursor_relative<W: Write>(out: &mut W, dx: i32, dy: i32) -> io::Result<()> {
    if dy > 0 {
        queue!(out, MoveDown(clamp_delta(dy)))?;
    } else if dy < 0 {
        queue!(out, MoveUp(clamp_delta(dy)))?;
    }

    if dx > 0 {
        queue!(out, MoveRight(clamp_delta(dx)))?;
    } else if dx < 0 {
        queue!(out, MoveLeft(clamp_delta(dx)))?;
    }

    Ok(())
}

/// Move the cursor to zero-based column `x`, row `y`
pub fn move_cursor_absolute<W: Write>(out: &mut W, x: u16, y: u16) -> io::Result<()> {
    // MoveTo does the 1-based translation
    queue!(out, MoveTo(x, y))
}

/// Write text, turning every bare LF into CR LF.
///
/// Raw terminals treat LF as "down one row, same column".
pub fn print_multiline<W: Write>(out: &mut W, text: &str) -> io::Result<()> {
    out.write_all(normalize_newlines(text).as_bytes())
}

/// Emit `n` CR LF pairs
pub fn print_blank_lines<W: Write>(out: &mut W, n: usize) -> io::Result<()> {
    out.write_all("\r\n".repeat(n).as_bytes())
}

/// Translate LF to CR LF
pub fn normalize_newlines(text: &str) -> String {
    text.replace('\n', "\r\n")
}

fn clamp_delta(delta: i32) -> u16 {
    u16::try_from(delta.unsigned_abs()).unwrap_or(u16::MAX)
}
