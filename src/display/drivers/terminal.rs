/*
 *  display/drivers/terminal.rs
 *
 *  LCDvu - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Character grid rendered to a terminal, for running without an LCD
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

use std::io::{self, Stdout, Write};

use log::info;

use crate::display::error::DisplayError;
use crate::display::traits::{CharacterDisplay, DisplayCapabilities};
use crate::glyphs::{BarGlyph, GlyphBitmap};

/// Glyph levels as Unicode lower eighth blocks
const LEVEL_BLOCKS: [char; 8] = [' ', '▁', '▂', '▃', '▄', '▅', '▆', '▇'];

/// Emulated HD44780 grid. Writes go to an in-memory grid, `flush`
/// redraws the frame in place when anything changed.
pub struct TerminalDisplay<W: Write + Send = Stdout> {
    out: W,
    grid: Vec<Vec<char>>,
    cursor: (u8, u8),
    capabilities: DisplayCapabilities,
    loaded: [bool; 8],
    dirty: bool,
    drawn_once: bool,
}

impl TerminalDisplay<Stdout> {
    pub fn new(cols: u8, rows: u8) -> Self {
        Self::with_writer(io::stdout(), cols, rows)
    }
}

impl<W: Write + Send> TerminalDisplay<W> {
    pub fn with_writer(out: W, cols: u8, rows: u8) -> Self {
        Self {
            out,
            grid: vec![vec![' '; cols as usize]; rows as usize],
            cursor: (0, 0),
            capabilities: DisplayCapabilities {
                cols,
                rows,
                custom_glyphs: 8,
                supports_backlight: false,
            },
            loaded: [false; 8],
            dirty: true,
            drawn_once: false,
        }
    }

    /// Contents of one row as shown
    pub fn row_text(&self, row: u8) -> String {
        self.grid
            .get(row as usize)
            .map(|r| r.iter().collect())
            .unwrap_or_default()
    }

    pub fn writer(&self) -> &W {
        &self.out
    }

    /// Put one cell at the cursor. Like the controller, writing past the
    /// last column wraps to the start of the same row.
    fn put(&mut self, c: char) {
        let (row, col) = self.cursor;
        if let Some(cell) = self.grid.get_mut(row as usize).and_then(|r| r.get_mut(col as usize)) {
            if *cell != c {
                *cell = c;
                self.dirty = true;
            }
        }
        self.cursor.1 = (col + 1) % self.capabilities.cols.max(1);
    }

    fn render(&mut self) -> io::Result<()> {
        let cols = self.capabilities.cols as usize;
        let rows = self.grid.len();
        if self.drawn_once {
            // move back over the previous frame: rows + both borders
            write!(self.out, "\x1b[{}A", rows + 2)?;
        }
        writeln!(self.out, "\r+{}+", "-".repeat(cols))?;
        for row in &self.grid {
            let line: String = row.iter().collect();
            writeln!(self.out, "\r|{}|", line)?;
        }
        writeln!(self.out, "\r+{}+", "-".repeat(cols))?;
        self.out.flush()
    }
}

impl<W: Write + Send> CharacterDisplay for TerminalDisplay<W> {
    fn capabilities(&self) -> &DisplayCapabilities {
        &self.capabilities
    }

    fn init(&mut self) -> Result<(), DisplayError> {
        info!(
            "Terminal display {}x{} (emulated)",
            self.capabilities.cols, self.capabilities.rows
        );
        self.clear()
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        for row in self.grid.iter_mut() {
            row.iter_mut().for_each(|c| *c = ' ');
        }
        self.cursor = (0, 0);
        self.dirty = true;
        Ok(())
    }

    fn set_cursor(&mut self, row: u8, col: u8) -> Result<(), DisplayError> {
        self.check_cursor(row, col)?;
        self.cursor = (row, col);
        Ok(())
    }

    fn write_str(&mut self, text: &str) -> Result<(), DisplayError> {
        for c in text.chars() {
            let shown = if c.is_ascii() && !c.is_ascii_control() { c } else { '?' };
            self.put(shown);
        }
        Ok(())
    }

    fn write_glyphs(&mut self, glyphs: &[BarGlyph]) -> Result<(), DisplayError> {
        for &glyph in glyphs {
            let slot = glyph.slot() as usize;
            if !self.loaded[slot] {
                return Err(DisplayError::Other(format!("glyph slot {} was never loaded", slot)));
            }
            self.put(LEVEL_BLOCKS[slot]);
        }
        Ok(())
    }

    fn create_char(&mut self, glyph: BarGlyph, _bitmap: &GlyphBitmap) -> Result<(), DisplayError> {
        self.loaded[glyph.slot() as usize] = true;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), DisplayError> {
        if self.dirty {
            self.render()?;
            self.dirty = false;
            self.drawn_once = true;
        }
        Ok(())
    }
}
