//! Raw line editor
//!
//! Turns the client's raw byte stream into completed lines. The client
//! echoes nothing by itself, so every accepted character is echoed back
//! from here and backspace is rendered as an in-place erase.

use std::char::REPLACEMENT_CHARACTER;
use std::io::{self, ErrorKind, Read, Write};

use tracing::debug;

const CR: char = '\r';
const LF: char = '\n';
const DEL: char = '\x7f';
/// Ctrl+C, Ctrl+D, Ctrl+X
const INTERRUPTS: [char; 3] = ['\x03', '\x04', '\x18'];

/// Erases the character left of the cursor
const ERASE: &[u8] = b"\x08 \x08";

const READ_CHUNK: usize = 512;

/// How a [`LineEditor::read_line`] call ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    /// A terminator was seen; the line excludes it
    Line(String),
    /// The client sent an interrupt code; the partial line is discarded
    Interrupted,
    /// The stream ended or failed before a terminator
    Closed,
}

/// Per-session line reader.
///
/// Keeps its own read buffer and UTF-8 decoder between calls, so input
/// that arrives together with a terminator is kept for the next line.
pub struct LineEditor {
    buf: Box<[u8]>,
    pos: usize,
    filled: usize,
    /// The previous line ended on CR; a LF right after it is absorbed
    after_cr: bool,
}

impl Default for LineEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl LineEditor {
    pub fn new() -> Self {
        Self {
            buf: vec![0u8; READ_CHUNK].into_boxed_slice(),
            pos: 0,
            filled: 0,
            after_cr: false,
        }
    }

    /// Read one line from `channel`, echoing as it goes.
    ///
    /// Blocks until a terminator, an interrupt code or the end of the
    /// stream. Must not be called concurrently on the same channel.
    pub fn read_line<S: Read + Write>(&mut self, channel: &mut S) -> LineOutcome {
        match self.read_line_inner(channel) {
            Ok(outcome) => outcome,
            Err(e) => {
                debug!("Line read ended with error: {}", e);
                LineOutcome::Closed
            }
        }
    }

    fn read_line_inner<S: Read + Write>(&mut self, channel: &mut S) -> io::Result<LineOutcome> {
        let mut line: Vec<char> = Vec::new();

        loop {
            let Some(ch) = self.next_char(channel)? else {
                return Ok(LineOutcome::Closed);
            };

            let after_cr = std::mem::replace(&mut self.after_cr, false);

            match ch {
                LF if after_cr => continue,
                CR | LF => {
                    self.after_cr = ch == CR;
                    return Ok(LineOutcome::Line(line.into_iter().collect()));
                }
                DEL => {
                    if line.pop().is_some() {
                        channel.write_all(ERASE)?;
                        channel.flush()?;
                    }
                }
                c if INTERRUPTS.contains(&c) => return Ok(LineOutcome::Interrupted),
                c if u32::from(c) >= 32 => {
                    line.push(c);
                    let mut utf8 = [0u8; 4];
                    channel.write_all(c.encode_utf8(&mut utf8).as_bytes())?;
                    channel.flush()?;
                }
                // Remaining control codes are dropped silently
                _ => {}
            }
        }
    }

    /// Decode the next code point; `None` at end of stream.
    ///
    /// Malformed sequences decode to U+FFFD. A byte that breaks a
    /// sequence is left in the buffer to start the next one.
    fn next_char<R: Read>(&mut self, reader: &mut R) -> io::Result<Option<char>> {
        let Some(first) = self.next_byte(reader)? else {
            return Ok(None);
        };

        let len = match first {
            0x00..=0x7f => return Ok(Some(char::from(first))),
            b if b & 0xE0 == 0xC0 => 2,
            b if b & 0xF0 == 0xE0 => 3,
            b if b & 0xF8 == 0xF0 => 4,
            _ => return Ok(Some(REPLACEMENT_CHARACTER)),
        };

        let mut seq = [first, 0, 0, 0];
        for slot in seq.iter_mut().take(len).skip(1) {
            match self.peek_byte(reader)? {
                Some(b) if b & 0xC0 == 0x80 => {
                    *slot = b;
                    self.pos += 1;
                }
                _ => return Ok(Some(REPLACEMENT_CHARACTER)),
            }
        }

        let ch = std::str::from_utf8(&seq[..len])
            .ok()
            .and_then(|s| s.chars().next())
            .unwrap_or(REPLACEMENT_CHARACTER);
        Ok(Some(ch))
    }

    fn next_byte<R: Read>(&mut self, reader: &mut R) -> io::Result<Option<u8>> {
        let byte = self.peek_byte(reader)?;
        if byte.is_some() {
            self.pos += 1;
        }
        Ok(byte)
    }

    fn peek_byte<R: Read>(&mut self, reader: &mut R) -> io::Result<Option<u8>> {
        if self.pos == self.filled && !self.fill(reader)? {
            return Ok(None);
        }
        Ok(Some(self.buf[self.pos]))
    }

    /// Refill the buffer; `false` at end of stream
    fn fill<R: Read>(&mut self, reader: &mut R) -> io::Result<bool> {
        loop {
            match reader.read(&mut self.buf) {
                Ok(0) => return Ok(false),
                Ok(n) => {
                    self.pos = 0;
                    self.filled = n;
                    return Ok(true);
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }
}
