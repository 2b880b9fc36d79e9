/*
 *  display/error.rs
 *
 *  LCDvu - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
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

use thiserror::Error;

/// Anything a character display can fail at once it exists
#[derive(Debug, Error)]
pub enum DisplayError {
    #[error("LCD did not come up: {0}")]
    InitializationFailed(String),

    /// Expander write NAKed or the bus went away mid transfer
    #[error("I2C transfer failed: {0}")]
    I2cError(String),

    #[error("not supported by this display")]
    UnsupportedOperation,

    #[error("cell ({row}, {col}) is off the panel")]
    InvalidCursor { row: u8, col: u8 },

    #[error("bar glyph set rejected: {0}")]
    InvalidGlyphSet(String),

    /// Terminal emulator output
    #[error("terminal write failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

/// Failures building a driver, before anything is sent to the panel
#[derive(Debug, Error)]
pub enum DisplayFactoryError {
    #[error("cannot open {bus}: {reason}")]
    BusUnavailable { bus: String, reason: String },

    #[error("display configuration rejected: {0}")]
    ConfigError(String),
}
