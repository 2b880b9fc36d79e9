/*
 *  display/traits.rs
 *
 *  LCDvu - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Core trait definitions for character display drivers
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

use crate::display::error::DisplayError;
use crate::glyphs::{validate_bar_set, BarGlyph, GlyphBitmap};

/// Display capabilities and metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayCapabilities {
    /// Character columns
    pub cols: u8,

    /// Character rows
    pub rows: u8,

    /// Number of user-definable characters (8 on an HD44780 in 5x8 mode)
    pub custom_glyphs: u8,

    /// Whether the backlight can be switched
    pub supports_backlight: bool,
}

/// Minimal hardware abstraction - all character display drivers implement this trait
///
/// The grid is addressed in character cells. Text and bar glyphs are written
/// at the cursor, which advances one column per cell written.
pub trait CharacterDisplay: Send {
    /// Returns the capabilities of this display
    fn capabilities(&self) -> &DisplayCapabilities;

    /// Returns the grid size as (cols, rows)
    fn dimensions(&self) -> (u8, u8) {
        let caps = self.capabilities();
        (caps.cols, caps.rows)
    }

    /// Initialize the display controller and leave it cleared
    fn init(&mut self) -> Result<(), DisplayError>;

    /// Clear the full grid and home the cursor
    fn clear(&mut self) -> Result<(), DisplayError>;

    /// Move the cursor, zero based
    fn set_cursor(&mut self, row: u8, col: u8) -> Result<(), DisplayError>;

    /// Write text at the cursor. Characters the controller cannot show are
    /// replaced, never interpreted as glyph codes.
    fn write_str(&mut self, text: &str) -> Result<(), DisplayError>;

    /// Write custom bar glyphs at the cursor
    fn write_glyphs(&mut self, glyphs: &[BarGlyph]) -> Result<(), DisplayError>;

    /// Store a bitmap in the glyph's slot
    fn create_char(&mut self, glyph: BarGlyph, bitmap: &GlyphBitmap) -> Result<(), DisplayError>;

    /// Push buffered changes out. Drivers that write through can leave the default.
    fn flush(&mut self) -> Result<(), DisplayError> {
        Ok(())
    }

    /// Switch the backlight (if supported)
    fn set_backlight(&mut self, on: bool) -> Result<(), DisplayError> {
        let _ = on;
        Err(DisplayError::UnsupportedOperation)
    }

    /// Validate and load a full set of eight bar glyphs
    fn load_glyph_set(&mut self, set: &[GlyphBitmap; 8]) -> Result<(), DisplayError> {
        let slots = self.capabilities().custom_glyphs;
        if (slots as usize) < set.len() {
            return Err(DisplayError::InvalidGlyphSet(format!(
                "display has {} custom glyph slots, the bar set needs {}",
                slots,
                set.len()
            )));
        }
        validate_bar_set(set)?;
        for glyph in BarGlyph::ALL {
            self.create_char(glyph, &set[glyph.slot() as usize])?;
        }
        Ok(())
    }

    /// Bounds check shared by the drivers
    fn check_cursor(&self, row: u8, col: u8) -> Result<(), DisplayError> {
        let (cols, rows) = self.dimensions();
        if row >= rows || col >= cols {
            return Err(DisplayError::InvalidCursor { row, col });
        }
        Ok(())
    }
}
