/*
 *  constants.rs
 *
 *  LCDvu - worth the squeeze
 *	(c) 2020-26 Stuart Hunter
 *
 *	This program is free software: you can redistribute it and/or modify
 *	it under the terms of the GNU General Public License as published by
 *	the Free Software Foundation, either version 3 of the License, or
 *	(at your option) any later version.
 *
 *	This program is distributed in the hope that it will be useful,
 *	but WITHOUT ANY WARRANTY; without even the implied warranty of
 *	MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *	GNU General Public License for more details.
 *
 *	See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *	Public License.
 *
 */

/// Character columns on a 1602 module.
pub const LCD_COLS: u8 = 16;
/// Character rows on a 1602 module.
pub const LCD_ROWS: u8 = 2;
/// Widest line the controller addresses.
pub const LCD_MAX_COLS: u8 = 40;
/// DDRAM size of an HD44780, all rows together.
pub const LCD_DDRAM_CELLS: u16 = 80;

/// Cells per channel, the row is split in two halves.
pub const HALF_CELLS: usize = 8;
/// Highest bar level, also the highest custom glyph slot.
pub const MAX_LEVEL: u8 = 7;

/// Default I2C bus on a Raspberry Pi
pub const DEFAULT_I2C_BUS: &str = "/dev/i2c-1";
/// Usual address of a PCF8574 backpack (0x3F on the PCF8574A variant)
pub const DEFAULT_I2C_ADDRESS: u8 = 0x27;

pub const DEFAULT_MIXER_CARD: &str = "default";
pub const DEFAULT_MIXER_CONTROL: &str = "Master";

/// Row the meter is drawn on.
pub const METER_ROW: u8 = 0;
pub const DEFAULT_REFRESH_MS: u64 = 100;
pub const DEFAULT_SPLASH_MS: u64 = 1000;
pub const WELCOME_TEXT: &str = "LCD1602 VU Meter";
