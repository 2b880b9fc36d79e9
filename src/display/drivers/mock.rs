/*
 *  display/drivers/mock.rs
 *
 *  LCDvu - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Mock display driver for testing without hardware
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
use crate::display::traits::{CharacterDisplay, DisplayCapabilities};
use crate::glyphs::{BarGlyph, GlyphBitmap};

use std::sync::{Arc, Mutex};

/// What a cell of the mock grid holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockCell {
    Char(char),
    Glyph(BarGlyph),
}

/// Mock display driver for testing
///
/// Records every operation in a shared state so tests can keep a handle
/// after the driver has been boxed and moved into the meter.
#[derive(Debug, Clone)]
pub struct MockDisplay {
    capabilities: DisplayCapabilities,
    state: Arc<Mutex<MockDisplayState>>,
}

/// Internal state for the mock driver (shared for inspection in tests)
#[derive(Debug, Default)]
pub struct MockDisplayState {
    pub grid: Vec<Vec<MockCell>>,
    pub cursor: (u8, u8),
    pub init_count: usize,
    pub clear_count: usize,
    pub flush_count: usize,
    pub glyphs_loaded: [Option<GlyphBitmap>; 8],
    pub backlight: Option<bool>,

    /// Simulate failures (for error testing)
    pub simulate_write_failure: bool,
    pub simulate_init_failure: bool,
}

impl MockDisplayState {
    pub fn row(&self, row: u8) -> &[MockCell] {
        &self.grid[row as usize]
    }

    pub fn row_text(&self, row: u8) -> String {
        self.row(row)
            .iter()
            .map(|c| match c {
                MockCell::Char(ch) => *ch,
                MockCell::Glyph(g) => char::from(b'0' + g.slot()),
            })
            .collect()
    }
}

impl MockDisplay {
    pub fn new(cols: u8, rows: u8) -> Self {
        Self::with_capabilities(DisplayCapabilities {
            cols,
            rows,
            custom_glyphs: 8,
            supports_backlight: true,
        })
    }

    /// Mock of a panel with other limits, e.g. no backlight control
    pub fn with_capabilities(capabilities: DisplayCapabilities) -> Self {
        let state = MockDisplayState {
            grid: vec![vec![MockCell::Char(' '); capabilities.cols as usize]; capabilities.rows as usize],
            ..Default::default()
        };
        Self {
            capabilities,
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Get reference to state for inspection in tests
    pub fn state(&self) -> Arc<Mutex<MockDisplayState>> {
        Arc::clone(&self.state)
    }

    fn put(&mut self, cell: MockCell) -> Result<(), DisplayError> {
        let cols = self.capabilities.cols;
        let mut state = self.state.lock().unwrap();
        if state.simulate_write_failure {
            return Err(DisplayError::I2cError("Simulated write failure".to_string()));
        }
        let (row, col) = state.cursor;
        state.grid[row as usize][col as usize] = cell;
        state.cursor.1 = (col + 1) % cols;
        Ok(())
    }
}

impl CharacterDisplay for MockDisplay {
    fn capabilities(&self) -> &DisplayCapabilities {
        &self.capabilities
    }

    fn init(&mut self) -> Result<(), DisplayError> {
        let mut state = self.state.lock().unwrap();
        if state.simulate_init_failure {
            return Err(DisplayError::InitializationFailed("Simulated init failure".to_string()));
        }
        state.init_count += 1;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        let mut state = self.state.lock().unwrap();
        state.clear_count += 1;
        for row in state.grid.iter_mut() {
            row.iter_mut().for_each(|c| *c = MockCell::Char(' '));
        }
        state.cursor = (0, 0);
        Ok(())
    }

    fn set_cursor(&mut self, row: u8, col: u8) -> Result<(), DisplayError> {
        self.check_cursor(row, col)?;
        self.state.lock().unwrap().cursor = (row, col);
        Ok(())
    }

    fn write_str(&mut self, text: &str) -> Result<(), DisplayError> {
        for c in text.chars() {
            self.put(MockCell::Char(c))?;
        }
        Ok(())
    }

    fn write_glyphs(&mut self, glyphs: &[BarGlyph]) -> Result<(), DisplayError> {
        for &g in glyphs {
            self.put(MockCell::Glyph(g))?;
        }
        Ok(())
    }

    fn create_char(&mut self, glyph: BarGlyph, bitmap: &GlyphBitmap) -> Result<(), DisplayError> {
        self.state.lock().unwrap().glyphs_loaded[glyph.slot() as usize] = Some(*bitmap);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), DisplayError> {
        self.state.lock().unwrap().flush_count += 1;
        Ok(())
    }

    fn set_backlight(&mut self, on: bool) -> Result<(), DisplayError> {
        self.state.lock().unwrap().backlight = Some(on);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glyphs::BAR_CHARS;

    #[test]
    fn test_mock_records_cells() {
        let mut display = MockDisplay::new(16, 2);
        display.set_cursor(1, 2).unwrap();
        display.write_str("ab").unwrap();
        display.write_glyphs(&[BarGlyph::Level5]).unwrap();
        let state = display.state();
        let state = state.lock().unwrap();
        assert_eq!(state.row_text(1), "  ab5           ");
        assert_eq!(state.cursor, (1, 5));
    }

    #[test]
    fn test_mock_glyph_set() {
        let mut display = MockDisplay::new(16, 2);
        display.load_glyph_set(&BAR_CHARS).unwrap();
        let state = display.state();
        assert!(state.lock().unwrap().glyphs_loaded.iter().all(Option::is_some));
    }

    #[test]
    fn test_glyph_set_needs_eight_slots() {
        let mut display = MockDisplay::with_capabilities(DisplayCapabilities {
            cols: 16,
            rows: 2,
            custom_glyphs: 4,
            supports_backlight: false,
        });
        assert!(matches!(
            display.load_glyph_set(&BAR_CHARS),
            Err(DisplayError::InvalidGlyphSet(_))
        ));
        let state = display.state();
        assert!(state.lock().unwrap().glyphs_loaded.iter().all(Option::is_none));
    }

    #[test]
    fn test_mock_simulated_failure() {
        let mut display = MockDisplay::new(16, 2);
        display.state().lock().unwrap().simulate_write_failure = true;
        assert!(display.write_str("x").is_err());
        display.state().lock().unwrap().simulate_write_failure = false;
        assert!(display.write_str("x").is_ok());
    }
}
