//! Static art, layout coordinates and the success script
//!
//! The heart template is drawn with two glyphs: [`SOURCE_GLYPH`] for the
//! heart itself and [`TARGET_GLYPH`] for the background. The greeting
//! banner blanks out the background; the wipe animation starts from that
//! blanked form and sweeps the heart over to the target glyph.

use unicode_width::UnicodeWidthStr;

/// Glyph the wipe converts from
pub const SOURCE_GLYPH: char = '🩷';

/// Glyph the wipe converts to
pub const TARGET_GLYPH: char = '💙';

/// Heart art template
pub const HEART_ART: &str = "
💙🩷🩷💙💙💙🩷🩷💙
🩷🩷🩷🩷💙🩷🩷🩷🩷
🩷🩷🩷🩷🩷🩷🩷🩷🩷
💙🩷🩷🩷🩷🩷🩷🩷💙
💙💙💙🩷🩷🩷💙💙💙
💙💙💙💙🩷💙💙💙💙
";

/// Box the guess is typed into
pub const PROMPT_BOX: &str = "\
╭──────────────────────────────────────────╮
│  What is the secret key?                 │
│                                          │
│  >                                       │
╰──────────────────────────────────────────╯";

/// Marker preceding the input column inside [`PROMPT_BOX`]
const PROMPT_MARKER: &str = "> ";

/// Row the prompt box is drawn at
pub const PROMPT_ROW: u16 = 10;

/// Row feedback messages are written at
pub const MESSAGE_ROW: u16 = 17;

/// Lines wiped before the empty-input nag
pub const NAG_CLEAR_LINES: u16 = 7;

/// Lines wiped before a decoy message
pub const DECOY_CLEAR_LINES: u16 = 2;

/// Where the heart animation is drawn on the success screen
pub const HEARTS_ORIGIN: (u16, u16) = (0, 4);

/// Greeting banner: the art with the target glyph blanked.
///
/// Each glyph is two columns wide, so it is replaced by two spaces.
pub fn banner() -> String {
    HEART_ART.replace(TARGET_GLYPH, "  ")
}

/// Cursor delta from the end of [`PROMPT_BOX`] to its input position
pub fn prompt_input_offset() -> (i32, i32) {
    let lines: Vec<&str> = PROMPT_BOX.lines().collect();
    let last_row = lines.len().saturating_sub(1);
    let last_width = lines.last().map_or(0, |l| l.width());

    let (row, col) = lines
        .iter()
        .enumerate()
        .find_map(|(row, line)| {
            line.find(PROMPT_MARKER)
                .map(|at| (row, line[..at + PROMPT_MARKER.len()].width()))
        })
        .unwrap_or((last_row, last_width));

    (col as i32 - last_width as i32, row as i32 - last_row as i32)
}

/// A rectangular, space-padded matrix of code points
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlyphGrid {
    rows: Vec<Vec<char>>,
    width: usize,
}

impl GlyphGrid {
    /// Build a grid from a multi-line template.
    ///
    /// Leading and trailing newlines are dropped; short rows are padded
    /// with spaces up to the longest row's code-point count.
    pub fn from_template(template: &str) -> Self {
        let mut rows: Vec<Vec<char>> = template
            .trim_matches('\n')
            .split('\n')
            .map(|line| line.chars().collect())
            .collect();
        if rows.len() == 1 && rows[0].is_empty() {
            rows.clear();
        }

        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        for row in &mut rows {
            row.resize(width, ' ');
        }

        Self { rows, width }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Glyph at column `x`, row `y`
    #[allow(dead_code)]
    pub fn get(&self, x: usize, y: usize) -> Option<char> {
        self.rows.get(y).and_then(|row| row.get(x)).copied()
    }

    pub fn rows(&self) -> impl Iterator<Item = &[char]> {
        self.rows.iter().map(Vec::as_slice)
    }
}

/// One step of the success script
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Beat {
    /// Typewriter text as-is
    Type { text: &'static str, delay_ms: u64 },
    /// Indented typewriter line ending in CR LF, then a pause
    Line {
        text: &'static str,
        delay_ms: u64,
        pause_ms: u64,
    },
    /// Plain pause
    Pause(u64),
    /// Blank lines
    Blank(usize),
    /// Heart wipe animation at [`HEARTS_ORIGIN`]
    Hearts,
}

const fn line(text: &'static str, delay_ms: u64, pause_ms: u64) -> Beat {
    Beat::Line {
        text,
        delay_ms,
        pause_ms,
    }
}

/// Played once the secret key is found
pub const SUCCESS_SCRIPT: &[Beat] = &[
    Beat::Blank(1),
    Beat::Type { text: "You found the secret key! ", delay_ms: 50 },
    Beat::Pause(500),
    Beat::Type { text: "Well done!!!\r\n", delay_ms: 40 },
    Beat::Pause(1000),
    Beat::Type { text: "Initiating Valentine's Day surprise...\r\n", delay_ms: 20 },
    Beat::Pause(1000),
    Beat::Hearts,
    Beat::Blank(2),
    line("                    *** Happy Valentine's Day!!! ***", 50, 1000),
    line("Hello my dearest Molly!", 30, 100),
    Beat::Blank(1),
    line("Today is a beautiful day to express my deepest feelings for you.", 30, 300),
    line("You are the light of my life, the beat of my heart, and the love of my soul.", 30, 400),
    line("I am so grateful to have you in my life, and I promise I will always be there for you.", 30, 500),
    Beat::Blank(1),
    line("No words can possibly capture what I feel for you, but I hope this little", 30, 0),
    line(" silly SSH surprise brings a nerdy smile to your face.", 30, 1000),
    Beat::Blank(1),
    line("I love you sososososo much and I would like to", 30, 0),
    line(" wish you the HAPPIEST VALENTINE'S DAY EVER!!! <333", 30, 1000),
    Beat::Blank(1),
    line("~ Yours forever,", 30, 150),
    Beat::Type { text: "  marcelektro@bf4l.net <3", delay_ms: 30 },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_pads_short_rows() {
        let grid = GlyphGrid::from_template("\nab\nabcd\n\nx\n");
        assert_eq!(grid.height(), 4);
        assert_eq!(grid.width(), 4);
        for row in grid.rows() {
            assert_eq!(row.len(), 4);
        }
        assert_eq!(grid.get(2, 0), Some(' '));
        assert_eq!(grid.get(3, 1), Some('d'));
        assert_eq!(grid.get(0, 2), Some(' '));
        assert_eq!(grid.get(4, 0), None);
    }

    #[test]
    fn test_grid_counts_code_points() {
        let grid = GlyphGrid::from_template("🩷🩷\n💙");
        assert_eq!(grid.width(), 2);
        assert_eq!(grid.get(0, 1), Some('💙'));
        assert_eq!(grid.get(1, 1), Some(' '));
    }

    #[test]
    fn test_empty_template() {
        let grid = GlyphGrid::from_template("\n\n");
        assert_eq!(grid.height(), 0);
        assert_eq!(grid.width(), 0);
    }

    #[test]
    fn test_banner_has_no_target_glyph() {
        let banner = banner();
        assert!(!banner.contains(TARGET_GLYPH));
        assert!(banner.contains(SOURCE_GLYPH));
        // Two spaces per blanked glyph keeps every row eighteen columns wide
        for row in banner.trim_matches('\n').lines() {
            let columns: usize = row
                .chars()
                .map(|c| if c == SOURCE_GLYPH { 2 } else { 1 })
                .sum();
            assert_eq!(columns, 18);
        }
    }

    #[test]
    fn test_banner_fits_above_prompt() {
        // clear + 2 blank lines + art + 2 blank lines must end before the prompt
        let art_rows = HEART_ART.trim_matches('\n').lines().count() as u16;
        assert!(2 + art_rows + 2 <= PROMPT_ROW);
    }

    #[test]
    fn test_prompt_offset_lands_after_marker() {
        let (dx, dy) = prompt_input_offset();
        let rows = PROMPT_BOX.lines().count() as i32;
        let last_width = PROMPT_BOX.lines().last().unwrap().width() as i32;
        assert_eq!(dy, -1);
        assert_eq!(last_width + dx, 5);
        assert!(rows + dy > 0);
    }

    #[test]
    fn test_message_row_below_prompt() {
        let rows = PROMPT_BOX.lines().count() as u16;
        assert!(PROMPT_ROW + rows < MESSAGE_ROW);
    }

    #[test]
    fn test_script_runs_hearts_once_and_ends_with_signature() {
        let hearts = SUCCESS_SCRIPT.iter().filter(|b| **b == Beat::Hearts).count();
        assert_eq!(hearts, 1);
        assert!(matches!(
            SUCCESS_SCRIPT.last(),
            Some(Beat::Type { text, .. }) if text.ends_with("<3")
        ));
    }
}
