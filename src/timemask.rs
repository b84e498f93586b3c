/*
 *  timemask.rs
 *
 *  tideclock - worth the wait
 *  (c) 2020-26 Stuart Hunter
 *
 *  Boolean silhouette of the time digits, uncovered by the receding wave
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

use std::fmt;

use log::debug;

use crate::font::{FontTable, TextOptions};
use crate::text::center_shift;

/// `font height + 2` rows by grid-width columns; row 0 is the bottom
/// padding row and the last row the top one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeMask {
    text: String,
    width: usize,
    rows: Vec<Vec<bool>>,
}

impl TimeMask {
    /// Rasterize `text` centered across `width` columns
    pub fn build(font: &FontTable, text: &str, width: usize) -> Self {
        let text = font.normalize(text, TextOptions::default());
        let height = font.height() + 2;
        let mut rows = vec![vec![false; width]; height];

        let (x_shift, _) = center_shift(font, &text, width, height);
        let mut column = x_shift;
        for c in text.chars() {
            let glyph = font.glyph(c);
            for col in 0..glyph.width {
                if column >= width {
                    break;
                }
                for row in 0..font.height() {
                    if font.is_lit(&glyph, col, row) {
                        rows[row + 1][column] = true;
                    }
                }
                column += 1;
            }
            column += 1;
        }

        debug!("time mask '{}' {}x{}", text, width, height);
        Self { text, width, rows }
    }

    /// An all-blank mask, shown before the first time is known
    pub fn blank(font: &FontTable, width: usize) -> Self {
        Self::build(font, "", width)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Mask cell at (x, mask row); outside the mask is blank
    pub fn get(&self, x: usize, row: usize) -> bool {
        self.rows.get(row).and_then(|r| r.get(x)).copied().unwrap_or(false)
    }

    /// Mask cell behind grid cell (x, y) on a grid `grid_height` rows tall.
    ///
    /// The mask is centered vertically the same way text is, so on a grid
    /// exactly mask-high mask row == grid row.
    pub fn at_grid(&self, x: usize, y: i64, grid_height: usize) -> bool {
        let lift = grid_height.saturating_sub(self.height()) / 2;
        let row = y - lift as i64;
        row >= 0 && self.get(x, row as usize)
    }

    pub fn rows(&self) -> &[Vec<bool>] {
        &self.rows
    }
}

/// Top row first, `#` for set cells
impl fmt::Display for TimeMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows.iter().rev() {
            let line: String = row.iter().map(|&b| if b { '#' } else { '.' }).collect();
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}
