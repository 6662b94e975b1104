//! Session orchestration
//!
//! One [`Session`] drives one client from the greeting to the farewell:
//!
//! ```text
//! Greeting → Prompting → Evaluating ─┬→ Rejected → Prompting
//!                ↑                   ├→ (empty)  → Prompting
//!                └───────────────────┤
//!                                    ├→ Success → Unwinding → Closed
//!                                    └→ (exit)  → Unwinding → Closed
//! ```
//!
//! An interrupt from the line editor goes straight to `Closed` with a
//! farewell; a closed stream goes to `Closed` without writing anything.

use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;
use tracing::debug;

use super::editor::{LineEditor, LineOutcome};
use super::Channel;
use crate::config::SessionConfig;
use crate::ui::animation::{Animator, Pacer, Wipe};
use crate::ui::art::{self, Beat, GlyphGrid, SUCCESS_SCRIPT};
use crate::ui::canvas;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Failed to write to client: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, SessionError>;

/// How a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The secret was found and the script played
    Solved,
    /// The client typed an exit word
    GaveUp,
    /// The client sent an interrupt code
    Interrupted,
    /// The stream closed or failed while waiting for input
    Disconnected,
}

/// Per-session mutable state
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SessionContext {
    /// Index of the last decoy shown
    pub last_decoy: Option<usize>,
}

impl SessionContext {
    /// Pick a decoy index from a pool of `pool_len`, never repeating the
    /// previous pick unless the pool has a single entry.
    ///
    /// Returns `None` only for an empty pool.
    pub fn next_decoy<R: Rng>(&mut self, pool_len: usize, rng: &mut R) -> Option<usize> {
        if pool_len == 0 {
            return None;
        }
        let mut idx = rng.gen_range(0..pool_len);
        if pool_len > 1 && Some(idx) == self.last_decoy {
            idx = (idx + 1) % pool_len;
        }
        self.last_decoy = Some(idx);
        Some(idx)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum State {
    Greeting,
    Prompting,
    Evaluating(String),
    Rejected,
    Success,
    Unwinding,
    Closed { end: SessionEnd, farewell: bool },
}

/// One client's run through the prompt loop
pub struct Session<S: Channel, P: Pacer> {
    channel: S,
    content: Arc<SessionConfig>,
    editor: LineEditor,
    context: SessionContext,
    animator: Animator<P>,
    rng: StdRng,
    /// Ending recorded before unwinding
    pending_end: SessionEnd,
}

impl<S: Channel, P: Pacer> Session<S, P> {
    /// Create a session; `rng` seeds both decoy choice and typing jitter
    pub fn new(channel: S, content: Arc<SessionConfig>, pacer: P, mut rng: StdRng) -> Self {
        let animator = Animator::new(pacer, StdRng::seed_from_u64(rng.gen()));
        Self {
            channel,
            content,
            editor: LineEditor::new(),
            context: SessionContext::default(),
            animator,
            rng,
            pending_end: SessionEnd::GaveUp,
        }
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    /// Run to completion.
    ///
    /// A write failure abandons the rest of the session.
    pub fn run(&mut self) -> Result<SessionEnd> {
        let mut state = State::Greeting;
        loop {
            state = match state {
                State::Closed { end, farewell } => {
                    if farewell {
                        let content = Arc::clone(&self.content);
                        self.write_str(&content.farewell)?;
                        self.flush()?;
                    }
                    return Ok(end);
                }
                other => {
                    let next = self.step(other)?;
                    debug!(state = ?next, "Session transition");
                    next
                }
            };
        }
    }

    fn step(&mut self, state: State) -> Result<State> {
        Ok(match state {
            State::Greeting => self.greet()?,
            State::Prompting => self.prompt()?,
            State::Evaluating(input) => self.evaluate(&input)?,
            State::Rejected => self.reject()?,
            State::Success => self.celebrate()?,
            State::Unwinding => State::Closed {
                end: self.pending_end,
                farewell: true,
            },
            closed @ State::Closed { .. } => closed,
        })
    }

    fn greet(&mut self) -> Result<State> {
        canvas::clear_screen(&mut self.channel)?;
        canvas::print_blank_lines(&mut self.channel, 2)?;
        canvas::print_multiline(&mut self.channel, art::banner().trim_matches('\n'))?;
        canvas::print_blank_lines(&mut self.channel, 2)?;
        Ok(State::Prompting)
    }

    fn prompt(&mut self) -> Result<State> {
        let (dx, dy) = art::prompt_input_offset();
        canvas::move_cursor_absolute(&mut self.channel, 0, art::PROMPT_ROW)?;
        canvas::print_multiline(&mut self.channel, art::PROMPT_BOX)?;
        canvas::move_cursor_relative(&mut self.channel, dx, dy)?;
        self.flush()?;

        Ok(match self.editor.read_line(&mut self.channel) {
            LineOutcome::Line(input) => State::Evaluating(input),
            LineOutcome::Interrupted => State::Closed {
                end: SessionEnd::Interrupted,
                farewell: true,
            },
            LineOutcome::Closed => State::Closed {
                end: SessionEnd::Disconnected,
                farewell: false,
            },
        })
    }

    fn evaluate(&mut self, input: &str) -> Result<State> {
        canvas::move_cursor_absolute(&mut self.channel, 0, art::MESSAGE_ROW)?;
        let input = input.trim();

        if input.is_empty() {
            canvas::clear_lines_relative(&mut self.channel, art::NAG_CLEAR_LINES)?;
            let nag = format!("{}\r\n", self.content.nag);
            self.write_str(&nag)?;
            return Ok(State::Prompting);
        }

        if self.content.is_exit_word(input) {
            self.pending_end = SessionEnd::GaveUp;
            return Ok(State::Unwinding);
        }

        if input == self.content.secret {
            return Ok(State::Success);
        }

        Ok(State::Rejected)
    }

    fn reject(&mut self) -> Result<State> {
        canvas::clear_lines_relative(&mut self.channel, art::DECOY_CLEAR_LINES)?;

        let content = Arc::clone(&self.content);
        if let Some(idx) = self.context.next_decoy(content.decoys.len(), &mut self.rng) {
            self.write_str(&format!("{}\r\n", content.decoys[idx]))?;
        }
        self.write_str(&format!("{}\r\n", content.reminder))?;
        self.flush()?;
        Ok(State::Prompting)
    }

    fn celebrate(&mut self) -> Result<State> {
        canvas::clear_screen(&mut self.channel)?;

        let grid = GlyphGrid::from_template(&art::banner());
        let wipe = Wipe {
            source: art::SOURCE_GLYPH,
            target: art::TARGET_GLYPH,
        };

        for beat in SUCCESS_SCRIPT {
            match *beat {
                Beat::Type { text, delay_ms } => {
                    self.animator
                        .type_out(&mut self.channel, text, Duration::from_millis(delay_ms))?;
                }
                Beat::Line {
                    text,
                    delay_ms,
                    pause_ms,
                } => {
                    let line = format!("  {}\r\n", text);
                    self.animator
                        .type_out(&mut self.channel, &line, Duration::from_millis(delay_ms))?;
                    if pause_ms > 0 {
                        self.animator.pause(Duration::from_millis(pause_ms));
                    }
                }
                Beat::Pause(ms) => self.animator.pause(Duration::from_millis(ms)),
                Beat::Blank(n) => canvas::print_blank_lines(&mut self.channel, n)?,
                Beat::Hearts => {
                    self.animator
                        .animate_grid(&mut self.channel, &grid, art::HEARTS_ORIGIN, wipe)?;
                }
            }
        }

        self.pending_end = SessionEnd::Solved;
        Ok(State::Unwinding)
    }

    fn write_str(&mut self, text: &str) -> Result<()> {
        self.channel.write_all(text.as_bytes())?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.channel.flush()?;
        Ok(())
    }

    #[cfg(test)]
    fn channel(&self) -> &S {
        &self.channel
    }
}
