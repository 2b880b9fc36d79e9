/*
 *  display/drivers/hd44780.rs
 *
 *  LCDvu - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  HD44780 character LCD driven through a PCF8574 I2C port expander
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use log::{debug, info};

use crate::display::error::DisplayError;
use crate::display::traits::{CharacterDisplay, DisplayCapabilities};
use crate::glyphs::{BarGlyph, GlyphBitmap, GLYPH_ROW_MASK};

// PCF8574 pin map used by the common blue/green 1602 backpacks.
// P1 is RW, held low: the driver never reads the busy flag.
const PIN_RS: u8 = 0x01;
const PIN_EN: u8 = 0x04;
const PIN_BACKLIGHT: u8 = 0x08;

const CMD_CLEAR: u8 = 0x01;
const CMD_ENTRY_MODE: u8 = 0x04;
const CMD_DISPLAY_CONTROL: u8 = 0x08;
const CMD_FUNCTION_SET: u8 = 0x20;
const CMD_SET_CGRAM: u8 = 0x40;
const CMD_SET_DDRAM: u8 = 0x80;

const ENTRY_INCREMENT: u8 = 0x02;
const DISPLAY_ON: u8 = 0x04;
const FUNCTION_8BIT: u8 = 0x10;
const FUNCTION_2LINE: u8 = 0x08;

/// Highest DDRAM address, anything above collides with the command bit
const DDRAM_MAX: u8 = 0x7F;

/// HD44780 wrapper, generic over the embedded-hal 1.0 bus and delay so the
/// same code runs on `/dev/i2c-*` and against a recording bus in tests.
pub struct Hd44780<I, D> {
    i2c: I,
    delay: D,
    address: u8,
    backlight: bool,
    capabilities: DisplayCapabilities,
}

impl<I, D> Hd44780<I, D>
where
    I: I2c,
    D: DelayNs,
{
    pub fn new(i2c: I, delay: D, address: u8, cols: u8, rows: u8, backlight: bool) -> Self {
        Self {
            i2c,
            delay,
            address,
            backlight,
            capabilities: DisplayCapabilities {
                cols,
                rows,
                custom_glyphs: 8,
                supports_backlight: true,
            },
        }
    }

    /// Hand the bus and delay back
    pub fn release(self) -> (I, D) {
        (self.i2c, self.delay)
    }

    #[inline]
    fn backlight_bit(&self) -> u8 {
        if self.backlight { PIN_BACKLIGHT } else { 0 }
    }

    fn expander_write(&mut self, bits: u8) -> Result<(), DisplayError> {
        let byte = bits | self.backlight_bit();
        self.i2c
            .write(self.address, &[byte])
            .map_err(|e| DisplayError::I2cError(format!("write 0x{:02X} to 0x{:02X}: {:?}", byte, self.address, e)))
    }

    /// Latch the upper nibble of `bits` with an enable strobe
    fn write4bits(&mut self, bits: u8) -> Result<(), DisplayError> {
        self.expander_write(bits | PIN_EN)?;
        self.delay.delay_us(1);
        self.expander_write(bits & !PIN_EN)?;
        self.delay.delay_us(50);
        Ok(())
    }

    fn send(&mut self, byte: u8, flags: u8) -> Result<(), DisplayError> {
        self.write4bits((byte & 0xF0) | flags)?;
        self.write4bits(((byte << 4) & 0xF0) | flags)
    }

    fn command(&mut self, cmd: u8) -> Result<(), DisplayError> {
        self.send(cmd, 0)
    }

    fn data(&mut self, byte: u8) -> Result<(), DisplayError> {
        self.send(byte, PIN_RS)
    }

    /// DDRAM start of a row. Rows 2 and 3 continue rows 0 and 1 at `cols`.
    fn row_offset(&self, row: u8) -> Option<u8> {
        let cols = self.capabilities.cols;
        match row {
            0 => Some(0x00),
            1 => Some(0x40),
            2 => Some(cols),
            _ => 0x40u8.checked_add(cols),
        }
    }

    /// DDRAM address of a cell, None when the geometry runs past DDRAM
    fn ddram_address(&self, row: u8, col: u8) -> Option<u8> {
        self.row_offset(row)?
            .checked_add(col)
            .filter(|&address| address <= DDRAM_MAX)
    }

    /// Printable ASCII maps straight onto the A00/A02 ROM, anything else is '?'
    fn char_code(c: char) -> u8 {
        if c.is_ascii() && !c.is_ascii_control() { c as u8 } else { b'?' }
    }
}

impl<I, D> CharacterDisplay for Hd44780<I, D>
where
    I: I2c + Send,
    D: DelayNs + Send,
{
    fn capabilities(&self) -> &DisplayCapabilities {
        &self.capabilities
    }

    fn init(&mut self) -> Result<(), DisplayError> {
        info!(
            "Initializing HD44780 {}x{} at address 0x{:02X}",
            self.capabilities.cols, self.capabilities.rows, self.address
        );

        // power-on wait, then park the expander with every line low
        self.delay.delay_ms(50);
        self.expander_write(0)
            .map_err(|e| DisplayError::InitializationFailed(e.to_string()))?;
        self.delay.delay_ms(1);

        // reset by instruction: three 8-bit function sets, then drop to 4-bit
        let function_8bit = CMD_FUNCTION_SET | FUNCTION_8BIT;
        self.write4bits(function_8bit)?;
        self.delay.delay_ms(5);
        self.write4bits(function_8bit)?;
        self.delay.delay_us(150);
        self.write4bits(function_8bit)?;
        self.write4bits(CMD_FUNCTION_SET)?;

        let lines = if self.capabilities.rows > 1 { FUNCTION_2LINE } else { 0 };
        self.command(CMD_FUNCTION_SET | lines)?;
        self.command(CMD_DISPLAY_CONTROL | DISPLAY_ON)?;
        self.clear()?;
        self.command(CMD_ENTRY_MODE | ENTRY_INCREMENT)?;

        debug!("HD44780 ready");
        Ok(())
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        self.command(CMD_CLEAR)?;
        self.delay.delay_ms(2);
        Ok(())
    }

    fn set_cursor(&mut self, row: u8, col: u8) -> Result<(), DisplayError> {
        self.check_cursor(row, col)?;
        let address = self
            .ddram_address(row, col)
            .ok_or(DisplayError::InvalidCursor { row, col })?;
        self.command(CMD_SET_DDRAM | address)
    }

    fn write_str(&mut self, text: &str) -> Result<(), DisplayError> {
        for c in text.chars() {
            self.data(Self::char_code(c))?;
        }
        Ok(())
    }

    fn write_glyphs(&mut self, glyphs: &[BarGlyph]) -> Result<(), DisplayError> {
        for glyph in glyphs {
            self.data(glyph.slot())?;
        }
        Ok(())
    }

    fn create_char(&mut self, glyph: BarGlyph, bitmap: &GlyphBitmap) -> Result<(), DisplayError> {
        self.command(CMD_SET_CGRAM | (glyph.slot() << 3))?;
        for &row in bitmap {
            self.data(row & GLYPH_ROW_MASK)?;
        }
        // back to DDRAM, otherwise the next text lands in CGRAM
        self.command(CMD_SET_DDRAM)
    }

    fn set_backlight(&mut self, on: bool) -> Result<(), DisplayError> {
        self.backlight = on;
        self.expander_write(0)
    }
}
