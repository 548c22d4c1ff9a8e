//! HD44780 16x2 driver behind a PCF8574 I2C backpack
//!
//! The backpack maps one I2C byte onto the controller's 4-bit bus: data in
//! the high nibble, register-select in bit 0, enable in bit 2, backlight in
//! bit 3. Every byte sent to the controller is therefore two bus writes with
//! an enable pulse each. Timing follows the controller datasheet; the delays
//! are microseconds, so blocking sleeps are fine here.

use std::fs::{File, OpenOptions};
use std::io::Write as _;
use std::os::fd::AsRawFd;
use std::thread;
use std::time::Duration;

use log::debug;

use super::{DisplayError, LCD_WIDTH, Screen};

// I2C_SLAVE from linux/i2c-dev.h
nix::ioctl_write_int_bad!(i2c_set_slave_addr, 0x0703);

/// Default I2C bus device on the Raspberry Pi
pub const DEFAULT_BUS: &str = "/dev/i2c-1";
/// Default address of the PCF8574 backpack (check with `i2cdetect -y 1`)
pub const DEFAULT_ADDR: u16 = 0x27;

const REGISTER_COMMAND: u8 = 0x00;
const REGISTER_DATA: u8 = 0x01;
const ENABLE: u8 = 0b0000_0100;
const BACKLIGHT_ON: u8 = 0x08;
const BACKLIGHT_OFF: u8 = 0x00;

const CMD_CLEAR: u8 = 0x01;
const CMD_ENTRY_MODE: u8 = 0x06;
const CMD_DISPLAY_ON: u8 = 0x0C;
const CMD_FUNCTION_SET: u8 = 0x28;
const CMD_SET_CGRAM: u8 = 0x40;
/// DDRAM addresses of the two visible lines
const LINE_ADDR: [u8; 2] = [0x80, 0xC0];

const PULSE_DELAY: Duration = Duration::from_micros(500);
const CLEAR_DELAY: Duration = Duration::from_millis(2);

/// Exclusive handle on the physical display for the process lifetime
pub struct LcdScreen {
    bus: File,
    backlight: u8,
}

impl LcdScreen {
    /// Opens the bus device and runs the controller's 4-bit init sequence.
    pub fn open(bus_path: &str, address: u16) -> Result<Self, DisplayError> {
        let bus = OpenOptions::new().read(true).write(true).open(bus_path)?;
        unsafe { i2c_set_slave_addr(bus.as_raw_fd(), address as i32) }
            .map_err(std::io::Error::from)?;

        let mut screen = Self {
            bus,
            backlight: BACKLIGHT_ON,
        };

        // 8-bit to 4-bit mode handshake, then function set / display on /
        // entry mode / clear, per datasheet
        for cmd in [
            0x33,
            0x32,
            CMD_ENTRY_MODE,
            CMD_DISPLAY_ON,
            CMD_FUNCTION_SET,
            CMD_CLEAR,
        ] {
            screen.send(cmd, REGISTER_COMMAND)?;
        }
        thread::sleep(CLEAR_DELAY);

        debug!("LCD initialized on {bus_path} at 0x{address:02x}");
        Ok(screen)
    }

    fn bus_write(&mut self, byte: u8) -> Result<(), DisplayError> {
        self.bus.write_all(&[byte])?;
        Ok(())
    }

    /// Clocks one nibble-carrying byte into the controller.
    fn pulse(&mut self, byte: u8) -> Result<(), DisplayError> {
        self.bus_write(byte | ENABLE)?;
        thread::sleep(PULSE_DELAY);
        self.bus_write(byte & !ENABLE)?;
        thread::sleep(PULSE_DELAY);
        Ok(())
    }

    /// Sends a full byte as two nibbles with the given register select.
    fn send(&mut self, value: u8, register: u8) -> Result<(), DisplayError> {
        let high = (value & 0xF0) | register | self.backlight;
        let low = ((value << 4) & 0xF0) | register | self.backlight;
        self.bus_write(high)?;
        self.pulse(high)?;
        self.bus_write(low)?;
        self.pulse(low)?;
        Ok(())
    }
}

impl Screen for LcdScreen {
    fn write_line(&mut self, line: u8, text: &str) -> Result<(), DisplayError> {
        let addr = *LINE_ADDR
            .get(line.checked_sub(1).ok_or(DisplayError::BadLine(line))? as usize)
            .ok_or(DisplayError::BadLine(line))?;
        self.send(addr, REGISTER_COMMAND)?;

        // Pad to the full width so stale characters never survive a shorter
        // write; truncate instead of wrapping.
        let mut written = 0;
        for ch in text.chars().take(LCD_WIDTH) {
            self.send(encode_char(ch), REGISTER_DATA)?;
            written += 1;
        }
        for _ in written..LCD_WIDTH {
            self.send(b' ', REGISTER_DATA)?;
        }
        Ok(())
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        self.send(CMD_CLEAR, REGISTER_COMMAND)?;
        thread::sleep(CLEAR_DELAY);
        Ok(())
    }

    fn backlight(&mut self, on: bool) -> Result<(), DisplayError> {
        self.backlight = if on { BACKLIGHT_ON } else { BACKLIGHT_OFF };
        // The backlight pin is sampled on every bus write; push one byte so
        // the change takes effect immediately.
        self.bus_write(self.backlight)
    }

    fn load_glyphs(&mut self, glyphs: &[[u8; 8]; 6]) -> Result<(), DisplayError> {
        self.send(CMD_SET_CGRAM, REGISTER_COMMAND)?;
        for glyph in glyphs {
            for row in glyph {
                self.send(*row, REGISTER_DATA)?;
            }
        }
        Ok(())
    }
}

/// Maps a rendered character onto the controller's 8-bit character set.
/// Code points below 8 address the custom glyph table.
fn encode_char(ch: char) -> u8 {
    let code = ch as u32;
    if code < 8 || (0x20..0x7F).contains(&code) {
        code as u8
    } else {
        b'?'
    }
}
