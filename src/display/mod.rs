//! Character-display peripheral interface
//!
//! The monitor owns exactly one 16x2 character display for its lifetime. The
//! [`Screen`] trait is the seam between the rendering logic and the physical
//! peripheral: two addressable lines of fixed width, a backlight toggle, a
//! full clear, and a one-time custom-glyph-table load. `LcdScreen` drives the
//! real HD44780 module over I2C; `NullScreen` stands in when the operator
//! chooses to continue without a confirmed display connection.

#[cfg(target_os = "linux")]
pub mod lcd;
pub mod renderer;

use thiserror::Error;

#[cfg(target_os = "linux")]
pub use lcd::LcdScreen;
pub use renderer::DisplayRenderer;

/// Number of characters per display line
pub const LCD_WIDTH: usize = 16;

/// Number of cells in a rendered gauge bar
pub const BAR_CELLS: usize = 10;

/// Custom glyph code points, valid after [`Screen::load_glyphs`]
pub const GLYPH_CHECK: char = '\u{00}';
pub const GLYPH_BLOCK: char = '\u{01}';
pub const GLYPH_BOX: char = '\u{02}';
pub const GLYPH_FILL: char = '\u{03}';
pub const GLYPH_UP_ARROW: char = '\u{04}';
pub const GLYPH_DOWN_ARROW: char = '\u{05}';

/// The six 8-row glyph bitmaps loaded into the display's character generator
/// at startup: check, block, box, fill, up arrow, down arrow.
///
/// Bitmaps can be designed at <https://omerk.github.io/lcdchargen/>.
pub const GLYPHS: [[u8; 8]; 6] = [
    // check
    [
        0b00000, 0b00001, 0b00011, 0b10110, 0b11100, 0b01000, 0b00000, 0b00000,
    ],
    // block
    [
        0b00000, 0b11111, 0b10011, 0b10101, 0b11001, 0b11111, 0b00000, 0b00000,
    ],
    // box
    [
        0b11111, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11111,
    ],
    // fill
    [
        0b11111, 0b11111, 0b11111, 0b11111, 0b11111, 0b11111, 0b11111, 0b11111,
    ],
    // up arrow
    [
        0b00100, 0b01110, 0b10101, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100,
    ],
    // down arrow
    [
        0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b10101, 0b01110, 0b00100,
    ],
];

/// Problem talking to the display peripheral
#[derive(Debug, Error)]
pub enum DisplayError {
    #[error("display I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("display has no line {0}")]
    BadLine(u8),
}

/// The display capability the monitor core needs, nothing more
pub trait Screen: Send + Sync {
    /// Writes `text` to line `line` (1-based). Implementations pad or
    /// truncate to the physical line width; text never wraps.
    fn write_line(&mut self, line: u8, text: &str) -> Result<(), DisplayError>;

    /// Blanks both lines.
    fn clear(&mut self) -> Result<(), DisplayError>;

    /// Switches the backlight on or off.
    fn backlight(&mut self, on: bool) -> Result<(), DisplayError>;

    /// Loads the custom glyph table. Called once at startup before any
    /// gauge is rendered.
    fn load_glyphs(&mut self, glyphs: &[[u8; 8]; 6]) -> Result<(), DisplayError>;
}

/// Screen that accepts every call and does nothing, used when the physical
/// display could not be reached and the operator chose to continue
#[derive(Debug, Default, Clone, Copy)]
pub struct NullScreen;

impl Screen for NullScreen {
    fn write_line(&mut self, line: u8, _text: &str) -> Result<(), DisplayError> {
        if line == 1 || line == 2 {
            Ok(())
        } else {
            Err(DisplayError::BadLine(line))
        }
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        Ok(())
    }

    fn backlight(&mut self, _on: bool) -> Result<(), DisplayError> {
        Ok(())
    }

    fn load_glyphs(&mut self, _glyphs: &[[u8; 8]; 6]) -> Result<(), DisplayError> {
        Ok(())
    }
}
