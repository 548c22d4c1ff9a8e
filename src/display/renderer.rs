//! Rendering of monitor frames onto the display and the console
//!
//! All display output funnels through here so every line is padded or
//! truncated to exactly the peripheral width in one place. The console half
//! is a full status report: a cleared terminal with a banner, the last API
//! call, CPU temperature and both rates.

use std::io::{Write as _, stdout};

use crossterm::cursor::MoveTo;
use crossterm::execute;
use crossterm::terminal::{Clear, ClearType};

use crate::models::{Direction, RuntimeSample};

use super::{
    BAR_CELLS, DisplayError, GLYPH_BOX, GLYPH_DOWN_ARROW, GLYPH_FILL, GLYPH_UP_ARROW, LCD_WIDTH,
    Screen,
};

/// Owns the screen handle and formats every frame the monitor can show
pub struct DisplayRenderer {
    screen: Box<dyn Screen>,
}

impl DisplayRenderer {
    pub fn new(screen: Box<dyn Screen>) -> Self {
        Self { screen }
    }

    /// Loads the glyph table and applies the backlight choice. Must run
    /// before the first gauge frame.
    pub fn setup(&mut self, backlight_on: bool) -> Result<(), DisplayError> {
        self.screen.load_glyphs(&super::GLYPHS)?;
        self.screen.backlight(backlight_on)
    }

    /// Pads or truncates to the physical line width; text never wraps.
    fn fit(text: &str) -> String {
        let mut line: String = text.chars().take(LCD_WIDTH).collect();
        while line.chars().count() < LCD_WIDTH {
            line.push(' ');
        }
        line
    }

    fn write(&mut self, line: u8, text: &str) -> Result<(), DisplayError> {
        self.screen.write_line(line, &Self::fit(text))
    }

    pub fn blank(&mut self) -> Result<(), DisplayError> {
        self.screen.clear()
    }

    /// Boot frame shown while startup continues behind it
    pub fn render_boot(&mut self, version: &str) -> Result<(), DisplayError> {
        self.write(1, "Loading Monitor..")?;
        self.write(2, &format!("V {version}"))
    }

    /// One-line progress note on the second line during config handling
    pub fn render_config_progress(&mut self, note: &str) -> Result<(), DisplayError> {
        self.write(2, note)
    }

    /// Standing banner with the configured router address
    pub fn render_ip_banner(&mut self, router_address: &str) -> Result<(), DisplayError> {
        self.screen.clear()?;
        self.write(1, "FritzBox IP:")?;
        self.write(2, router_address)
    }

    /// Frame for a failed internet probe
    pub fn render_no_network(&mut self) -> Result<(), DisplayError> {
        self.screen.clear()?;
        self.write(1, "No network.")?;
        self.write(2, "Check router.")
    }

    /// Frame for an unreachable router
    pub fn render_no_router(&mut self, router_address: &str) -> Result<(), DisplayError> {
        self.screen.clear()?;
        self.write(1, "No FritzBox.")?;
        self.write(2, router_address)
    }

    /// Two-line shutdown notice, written exactly once on interrupt
    pub fn render_cancel(&mut self) -> Result<(), DisplayError> {
        self.screen.clear()?;
        self.write(1, "Manual cancel.")?;
        self.write(2, "Exiting app.")
    }

    /// Renders the upload and download gauges
    pub fn render_gauge(
        &mut self,
        upload_percent: u8,
        download_percent: u8,
    ) -> Result<(), DisplayError> {
        let up = gauge_line(upload_percent, Direction::Upload);
        let down = gauge_line(download_percent, Direction::Download);
        self.write(1, &up)?;
        self.write(2, &down)
    }

    /// Clears the console and prints the textual status report
    pub fn render_header(
        &mut self,
        sample: &RuntimeSample,
        router_address: &str,
    ) -> Result<(), DisplayError> {
        let mut out = stdout();
        execute!(out, Clear(ClearType::All), MoveTo(0, 0))?;

        writeln!(out, "##########################")?;
        writeln!(out, "    Network Monitoring    ")?;
        writeln!(out, "##########################")?;
        writeln!(out)?;
        writeln!(
            out,
            "Last API call:\t\t{}",
            sample.timestamp.format("%Y-%m-%d %H:%M:%S")
        )?;
        match sample.cpu_temp_celsius {
            Some(temp) => writeln!(out, "Current CPU:\t\t{temp}\u{b0}C")?,
            None => writeln!(out, "Current CPU:\t\tn/a")?,
        }
        writeln!(out, "FritzBox IP:\t\t{router_address}")?;
        writeln!(
            out,
            "Upload:\t\t\t{} MBit/s | {} %",
            sample.upload_mbit, sample.upload_percent
        )?;
        writeln!(
            out,
            "Download:\t\t{} MBit/s | {} %",
            sample.download_mbit, sample.download_percent
        )?;
        out.flush()?;
        Ok(())
    }
}

/// Builds one gauge line, already padded to the display width: one filled
/// cell per full ten percent, empty-box padding to ten cells, the direction
/// arrow, then the literal percentage.
pub fn gauge_line(percent: u8, direction: Direction) -> String {
    let filled = (percent / 10) as usize;
    let arrow = match direction {
        Direction::Upload => GLYPH_UP_ARROW,
        Direction::Download => GLYPH_DOWN_ARROW,
    };

    let mut line = String::with_capacity(LCD_WIDTH);
    for _ in 0..filled {
        line.push(GLYPH_FILL);
    }
    for _ in filled..BAR_CELLS {
        line.push(GLYPH_BOX);
    }
    line.push(arrow);
    line.push(' ');
    line.push_str(&format!("{percent}%"));

    DisplayRenderer::fit(&line)
}
