/*
 *  glyphs.rs
 *
 *  LCDvu - worth the squeeze
 *	(c) 2020-26 Stuart Hunter
 *
 *	Bar-height glyphs loaded into the HD44780 character generator RAM
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

use crate::display::error::DisplayError;

/// One row of a 5x8 glyph, only the low five bits are shown.
pub const GLYPH_ROW_MASK: u8 = 0x1F;

/// A 5x8 custom character, top row first
pub type GlyphBitmap = [u8; 8];

/// Identifier of a bar glyph. The discriminant is the CGRAM slot the
/// bitmap is loaded into and therefore the character code written to DDRAM.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BarGlyph {
    Blank = 0,
    Level1 = 1,
    Level2 = 2,
    Level3 = 3,
    Level4 = 4,
    Level5 = 5,
    Level6 = 6,
    Full = 7,
}

impl BarGlyph {
    pub const ALL: [BarGlyph; 8] = [
        BarGlyph::Blank,
        BarGlyph::Level1,
        BarGlyph::Level2,
        BarGlyph::Level3,
        BarGlyph::Level4,
        BarGlyph::Level5,
        BarGlyph::Level6,
        BarGlyph::Full,
    ];

    /// Glyph for a bar level, levels above 7 saturate at `Full`
    pub fn from_level(level: u8) -> Self {
        Self::ALL[level.min(7) as usize]
    }

    /// CGRAM slot, also the DDRAM character code
    #[inline]
    pub fn slot(self) -> u8 {
        self as u8
    }

    #[inline]
    pub fn is_blank(self) -> bool {
        self == BarGlyph::Blank
    }
}

const fn bar(height: usize) -> GlyphBitmap {
    let mut rows = [0u8; 8];
    let mut r = 8 - height;
    while r < 8 {
        rows[r] = GLYPH_ROW_MASK;
        r += 1;
    }
    rows
}

/// Default glyph set: slot n is a solid block n pixel rows high.
pub const BAR_CHARS: [GlyphBitmap; 8] = [
    bar(0),
    bar(1),
    bar(2),
    bar(3),
    bar(4),
    bar(5),
    bar(6),
    bar(7),
];

/// Check a glyph set before it goes into CGRAM.
///
/// Slot 0 is written as the literal code 0x00 for every empty cell, so it
/// has to be blank or empty cells would show pixels.
pub fn validate_bar_set(set: &[GlyphBitmap; 8]) -> Result<(), DisplayError> {
    if set[BarGlyph::Blank.slot() as usize].iter().any(|&row| row != 0) {
        return Err(DisplayError::InvalidGlyphSet(
            "slot 0 must be the blank glyph".to_string(),
        ));
    }
    for (slot, glyph) in set.iter().enumerate() {
        if let Some(row) = glyph.iter().find(|&&row| row & !GLYPH_ROW_MASK != 0) {
            return Err(DisplayError::InvalidGlyphSet(format!(
                "slot {} row 0x{:02X} is wider than 5 pixels",
                slot, row
            )));
        }
    }
    Ok(())
}
