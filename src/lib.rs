/*
 *  lib.rs
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

//! Stereo volume bar-graph for HD44780 character LCDs.
//!
//! The mixer is sampled once per tick, each channel is mapped to a level
//! 0..=7 and drawn as a left aligned run of custom bar glyphs on one half
//! of a 16 cell row.

pub mod bar;
pub mod config;
pub mod constants;
pub mod display;
pub mod glyphs;
pub mod meter;
pub mod mixer;

pub use bar::{to_level, DisplayFrame, Half};
pub use glyphs::BarGlyph;
pub use meter::{Meter, MeterSettings, MeterState};
pub use mixer::{Mixer, MixerError, SampleOutcome, VolumeReading, VolumeSampler};
