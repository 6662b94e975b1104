//! Frame-paced output effects
//!
//! Two effects are provided on top of the canvas primitives:
//!
//! - **Typewriter**: reveals text one character at a time with a trailing
//!   underscore acting as a cursor.
//! - **Grid wipe**: sweeps a [`GlyphGrid`] diagonally, converting one glyph
//!   into another, then sweeps it back.
//!
//! All waiting goes through a [`Pacer`], so tests can run every frame
//! without sleeping.

use std::io::{self, Write};
use std::thread;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::Rng;

use super::art::GlyphGrid;
use super::canvas;

/// Pause between wipe frames
pub const FRAME_DELAY: Duration = Duration::from_millis(80);

/// Pause between the converted frame and the fade pass
pub const FADE_DELAY: Duration = Duration::from_millis(300);

/// Upper bound (exclusive) of the random per-character jitter, in ms
const JITTER_MS: u64 = 100;

/// Erases the character left of the cursor
const ERASE: &[u8] = b"\x08 \x08";

/// Blocking delay primitive
pub trait Pacer {
    fn pause(&mut self, duration: Duration);
}

/// Real-time pacer backed by `thread::sleep`
#[derive(Debug, Default, Clone, Copy)]
pub struct Sleeper;

impl Pacer for Sleeper {
    fn pause(&mut self, duration: Duration) {
        if !duration.is_zero() {
            thread::sleep(duration);
        }
    }
}

/// Which way a wipe pass converts cells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sweep {
    /// Source cells reached by the diagonal show the target glyph
    Convert,
    /// Source cells reached by the diagonal go back to the source glyph
    Revert,
}

/// Glyph pair a wipe converts between
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wipe {
    pub source: char,
    pub target: char,
}

impl Wipe {
    /// Compose one frame, one string per row.
    ///
    /// `step` is the diagonal threshold: cells with `x + y <= step` have been
    /// reached. `None` means every cell has been reached.
    pub fn frame(&self, grid: &GlyphGrid, step: Option<usize>, sweep: Sweep) -> Vec<String> {
        grid.rows()
            .enumerate()
            .map(|(y, row)| {
                row.iter()
                    .enumerate()
                    .map(|(x, &glyph)| self.cell(glyph, x + y, step, sweep))
                    .collect()
            })
            .collect()
    }

    fn cell(&self, glyph: char, diagonal: usize, step: Option<usize>, sweep: Sweep) -> char {
        if glyph != self.source {
            return glyph;
        }
        let reached = step.map_or(true, |s| diagonal <= s);
        match (sweep, reached) {
            (Sweep::Convert, true) | (Sweep::Revert, false) => self.target,
            (Sweep::Convert, false) | (Sweep::Revert, true) => self.source,
        }
    }
}

/// Drives timed effects for one session.
///
/// Owns the session's pacer and its jitter source; nothing is shared
/// between sessions.
pub struct Animator<P: Pacer> {
    pacer: P,
    rng: StdRng,
}

impl<P: Pacer> Animator<P> {
    pub fn new(pacer: P, rng: StdRng) -> Self {
        Self { pacer, rng }
    }

    /// Plain pause
    pub fn pause(&mut self, duration: Duration) {
        self.pacer.pause(duration);
    }

    #[cfg(test)]
    pub fn pacer(&self) -> &P {
        &self.pacer
    }

    /// Reveal `text` character by character.
    ///
    /// Visible ASCII gets an underscore cursor while the reveal waits.
    /// Whitespace is written at full speed. The last character is written
    /// without any cursor or delay.
    pub fn type_out<W: Write>(&mut self, out: &mut W, text: &str, per_char: Duration) -> io::Result<()> {
        let mut chars = text.chars().peekable();
        let mut utf8 = [0u8; 4];

        while let Some(ch) = chars.next() {
            out.write_all(ch.encode_utf8(&mut utf8).as_bytes())?;
            if chars.peek().is_none() {
                break;
            }

            let underline = ch.is_ascii_graphic();
            let wait = !per_char.is_zero() && !ch.is_whitespace();

            if underline {
                out.write_all(b"_")?;
            }
            if wait {
                out.flush()?;
                let jitter = Duration::from_millis(self.rng.gen_range(0..JITTER_MS));
                self.pacer.pause(per_char + jitter);
            }
            if underline {
                out.write_all(ERASE)?;
            }
        }

        out.flush()
    }

    /// Diagonal wipe over `grid` drawn at `origin`.
    ///
    /// Runs the converting pass, draws one fully converted frame, then runs
    /// the reverting pass in the same diagonal order. The grid itself is
    /// never modified.
    pub fn animate_grid<W: Write>(
        &mut self,
        out: &mut W,
        grid: &GlyphGrid,
        origin: (u16, u16),
        wipe: Wipe,
    ) -> io::Result<()> {
        let last_step = grid.height() + grid.width();

        for step in 0..=last_step {
            draw_frame(out, origin, &wipe.frame(grid, Some(step), Sweep::Convert))?;
            self.pacer.pause(FRAME_DELAY);
        }

        // Authoritative converted frame, independent of how the passes timed out
        draw_frame(out, origin, &wipe.frame(grid, None, Sweep::Convert))?;
        self.pacer.pause(FADE_DELAY);

        for step in 0..=last_step {
            draw_frame(out, origin, &wipe.frame(grid, Some(step), Sweep::Revert))?;
            self.pacer.pause(FRAME_DELAY);
        }

        Ok(())
    }
}

/// Draw each row at its absolute position below `origin`
fn draw_frame<W: Write>(out: &mut W, origin: (u16, u16), rows: &[String]) -> io::Result<()> {
    let (x, y) = origin;
    for (row, text) in (0u16..).zip(rows) {
        canvas::move_cursor_absolute(out, x, y.saturating_add(row))?;
        out.write_all(text.as_bytes())?;
    }
    out.flush()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::SeedableRng;

    /// Pacer that records every requested pause instead of sleeping
    #[derive(Debug, Default)]
    pub(crate) struct RecordingPacer {
        pub pauses: Vec<Duration>,
    }

    impl Pacer for RecordingPacer {
        fn pause(&mut self, duration: Duration) {
            self.pauses.push(duration);
        }
    }

    fn animator() -> Animator<RecordingPacer> {
        Animator::new(RecordingPacer::default(), StdRng::seed_from_u64(7))
    }

    const WIPE: Wipe = Wipe {
        source: 'o',
        target: '*',
    };

    #[test]
    fn test_typewriter_exempts_last_character() {
        let mut out = Vec::new();
        animator().type_out(&mut out, "ab", Duration::ZERO).unwrap();
        assert_eq!(out, b"a_\x08 \x08b".to_vec());
    }

    #[test]
    fn test_typewriter_zero_delay_never_pauses() {
        let mut anim = animator();
        let mut out = Vec::new();
        anim.type_out(&mut out, "hello world", Duration::ZERO).unwrap();
        assert!(anim.pacer().pauses.is_empty());
    }

    #[test]
    fn test_typewriter_whitespace_runs_at_full_speed() {
        let mut anim = animator();
        let mut out = Vec::new();
        anim.type_out(&mut out, "a b\r\n", Duration::from_millis(30)).unwrap();

        // Only 'a' and 'b' wait; the final '\n' is exempt anyway
        assert_eq!(anim.pacer().pauses.len(), 2);
        for pause in &anim.pacer().pauses {
            assert!(*pause >= Duration::from_millis(30));
            assert!(*pause < Duration::from_millis(130));
        }
        assert_eq!(out, b"a_\x08 \x08 b_\x08 \x08\r\n".to_vec());
    }

    #[test]
    fn test_typewriter_non_ascii_waits_without_underline() {
        let mut anim = animator();
        let mut out = Vec::new();
        anim.type_out(&mut out, "💙!", Duration::from_millis(10)).unwrap();
        assert_eq!(anim.pacer().pauses.len(), 1);
        assert_eq!(String::from_utf8(out).unwrap(), "💙!");
    }

    #[test]
    fn test_typewriter_empty_text() {
        let mut out = Vec::new();
        animator().type_out(&mut out, "", Duration::from_millis(10)).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_convert_frame_follows_diagonal() {
        let grid = GlyphGrid::from_template("oo\noo");
        assert_eq!(WIPE.frame(&grid, Some(0), Sweep::Convert), vec!["*o", "oo"]);
        assert_eq!(WIPE.frame(&grid, Some(1), Sweep::Convert), vec!["**", "*o"]);
        assert_eq!(WIPE.frame(&grid, Some(2), Sweep::Convert), vec!["**", "**"]);
    }

    #[test]
    fn test_revert_frame_follows_diagonal() {
        let grid = GlyphGrid::from_template("oo\noo");
        assert_eq!(WIPE.frame(&grid, Some(0), Sweep::Revert), vec!["o*", "**"]);
        assert_eq!(WIPE.frame(&grid, Some(2), Sweep::Revert), vec!["oo", "oo"]);
    }

    #[test]
    fn test_final_frame_converts_every_source_cell() {
        let grid = GlyphGrid::from_template("o.o\n.o\nxo");
        let frame = WIPE.frame(&grid, None, Sweep::Convert);

        for (y, row) in frame.iter().enumerate() {
            for (x, rendered) in row.chars().enumerate() {
                let original = grid.get(x, y).unwrap();
                if original == WIPE.source {
                    assert_eq!(rendered, WIPE.target);
                } else {
                    assert_eq!(rendered, original);
                }
            }
        }
    }

    #[test]
    fn test_animate_grid_does_not_touch_source() {
        let grid = GlyphGrid::from_template("oo\no");
        let before = grid.clone();
        let mut out = Vec::new();
        animator().animate_grid(&mut out, &grid, (0, 4), WIPE).unwrap();
        assert_eq!(grid, before);
    }

    #[test]
    fn test_animate_grid_frame_count_and_pacing() {
        let grid = GlyphGrid::from_template("oo\no");
        let mut anim = animator();
        let mut out = Vec::new();
        anim.animate_grid(&mut out, &grid, (3, 4), WIPE).unwrap();

        // height + width = 4, so five frames per pass plus the converted frame
        let pauses = &anim.pacer().pauses;
        assert_eq!(pauses.len(), 11);
        assert_eq!(pauses[5], FADE_DELAY);
        assert!(pauses.iter().enumerate().all(|(i, p)| i == 5 || *p == FRAME_DELAY));

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches("\x1b[5;4H").count(), 11);
        assert_eq!(text.matches("\x1b[6;4H").count(), 11);
    }

    #[test]
    fn test_animate_grid_converted_frame_precedes_fade() {
        let grid = GlyphGrid::from_template("oo\no");
        let mut out = Vec::new();
        animator().animate_grid(&mut out, &grid, (0, 0), WIPE).unwrap();
        let text = String::from_utf8(out).unwrap();

        // Frames are split on the first-row cursor placement
        let frames: Vec<&str> = text.split("\x1b[1;1H").skip(1).collect();
        assert_eq!(frames.len(), 11);
        assert_eq!(frames[5], "**\x1b[2;1H* ");
        assert_eq!(frames[10], "oo\x1b[2;1Ho ");
    }
}
