/*
 *  display/factory.rs
 *
 *  LCDvu - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Builds the configured display driver
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

use linux_embedded_hal::{Delay, I2cdev};
use log::info;

use crate::config::{DisplayConfig, DriverKind};
use crate::display::drivers::hd44780::Hd44780;
use crate::display::drivers::terminal::TerminalDisplay;
use crate::display::error::DisplayFactoryError;
use crate::display::traits::CharacterDisplay;

/// Type alias for boxed display driver trait objects
pub type BoxedDisplay = Box<dyn CharacterDisplay>;

/// Factory for creating display drivers from configuration
pub struct DisplayDriverFactory;

impl DisplayDriverFactory {
    /// Create a display driver from configuration
    ///
    /// The driver is returned uninitialized; the meter runs `init` as part
    /// of its startup so an init failure is reported in one place.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let config = DisplayConfig {
    ///     driver: Some(DriverKind::Hd44780),
    ///     i2c: Some(I2cConfig {
    ///         bus: Some("/dev/i2c-1".to_string()),
    ///         address: Some(0x27),
    ///     }),
    ///     ..Default::default()
    /// };
    ///
    /// let driver = DisplayDriverFactory::create_from_config(&config)?;
    /// ```
    pub fn create_from_config(config: &DisplayConfig) -> Result<BoxedDisplay, DisplayFactoryError> {
        let (cols, rows) = (config.cols(), config.rows());
        if cols == 0 || rows == 0 {
            return Err(DisplayFactoryError::ConfigError(format!(
                "display must have at least one cell, got {}x{}", cols, rows
            )));
        }

        match config.driver() {
            DriverKind::Hd44780 => {
                let bus = config.i2c_bus();
                let address = config.i2c_address();
                info!("Opening HD44780 on {} at address 0x{:02X}", bus, address);

                let i2c = I2cdev::new(bus).map_err(|e| DisplayFactoryError::BusUnavailable {
                    bus: bus.to_string(),
                    reason: e.to_string(),
                })?;
                Ok(Box::new(Hd44780::new(i2c, Delay, address, cols, rows, config.backlight())))
            }
            DriverKind::Terminal => {
                info!("Emulation mode enabled - rendering to the terminal");
                Ok(Box::new(TerminalDisplay::new(cols, rows)))
            }
        }
    }
}
