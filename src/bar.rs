/*
 *  bar.rs
 *
 *  LCDvu - worth the squeeze
 *	(c) 2020-26 Stuart Hunter
 *
 *	Volume percentage to bar level mapping and frame construction
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

use crate::constants::{HALF_CELLS, MAX_LEVEL};
use crate::glyphs::BarGlyph;
use crate::mixer::VolumeReading;

/// Linear map of a percentage onto 0..=7, truncated.
///
/// Inputs above 100 are clamped so a misbehaving backend can never
/// address a glyph slot past `Full`.
#[inline]
pub fn to_level(volume: u8) -> u8 {
    let v = volume.min(100) as u16;
    (v * MAX_LEVEL as u16 / 100) as u8
}

/// Which half of the meter row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Half {
    Left,
    Right,
}

impl Half {
    /// First column of the half
    pub fn column(self) -> u8 {
        match self {
            Half::Left => 0,
            Half::Right => HALF_CELLS as u8,
        }
    }
}

/// One 8-cell run, left aligned solid bar.
pub type HalfRun = [BarGlyph; HALF_CELLS];

fn build_half(level: u8) -> HalfRun {
    let glyph = BarGlyph::from_level(level);
    let mut run = [BarGlyph::Blank; HALF_CELLS];
    for (i, cell) in run.iter_mut().enumerate() {
        if i < level as usize {
            *cell = glyph;
        }
    }
    run
}

/// The 16 cells of the meter row for one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayFrame {
    pub left_level: u8,
    pub right_level: u8,
    left: HalfRun,
    right: HalfRun,
}

impl DisplayFrame {
    pub fn from_levels(left_level: u8, right_level: u8) -> Self {
        let left_level = left_level.min(MAX_LEVEL);
        let right_level = right_level.min(MAX_LEVEL);
        Self {
            left_level,
            right_level,
            left: build_half(left_level),
            right: build_half(right_level),
        }
    }

    pub fn from_reading(reading: VolumeReading) -> Self {
        Self::from_levels(to_level(reading.left), to_level(reading.right))
    }

    /// An all-blank frame, what a silent or missing mixer renders as
    pub fn blank() -> Self {
        Self::from_levels(0, 0)
    }

    pub fn half(&self, half: Half) -> &HalfRun {
        match half {
            Half::Left => &self.left,
            Half::Right => &self.right,
        }
    }

    /// All 16 cells, left half first
    pub fn cells(&self) -> impl Iterator<Item = BarGlyph> + '_ {
        self.left.iter().chain(self.right.iter()).copied()
    }

    pub fn filled(&self, half: Half) -> usize {
        self.half(half).iter().filter(|g| !g.is_blank()).count()
    }

    pub fn is_blank(&self) -> bool {
        self.cells().all(BarGlyph::is_blank)
    }
}
