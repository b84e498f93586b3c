/*
 *  display/mapping.rs
 *
 *  tideclock - worth the wait
 *  (c) 2020-26 Stuart Hunter
 *
 *  Logical (x,y) to physical strip index translation
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

//! The strip enters the grid at the lower-left corner, which is the origin of
//! a first-quadrant XY grid. Four wiring conventions are supported:
//!
//! ```text
//! RowSerpentine              ColumnSerpentine
//!   ------R2------> END        |--|  |--|  | END
//!   |                          |  |  |  |  |
//!   <-----R1-------            C0 C1 C2 C3 C4
//!                 |            |  |  |  |  |
//!   START> --R0---->     START> |  |--|  |--|
//!
//! RowLinear                  ColumnLinear
//!   every row left-to-right    every column bottom-to-top
//! ```

use serde::{Deserialize, Serialize};

/// Physical wiring of the LED strip behind the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WiringMode {
    /// Even rows left-to-right, odd rows right-to-left
    #[default]
    RowSerpentine,
    /// Even columns bottom-to-top, odd columns top-to-bottom
    ColumnSerpentine,
    /// Every row left-to-right
    RowLinear,
    /// Every column bottom-to-top (the common 8x8 panel)
    ColumnLinear,
}

impl WiringMode {
    pub const ALL: [WiringMode; 4] = [
        WiringMode::RowSerpentine,
        WiringMode::ColumnSerpentine,
        WiringMode::RowLinear,
        WiringMode::ColumnLinear,
    ];
}

/// Checked translation of a logical coordinate to a strip index.
///
/// Offsets are applied first; `None` when the shifted point falls outside
/// `[0,width) x [0,height)`.
pub fn map_index(
    x: i32,
    y: i32,
    mode: WiringMode,
    width: usize,
    height: usize,
    x_offset: i32,
    y_offset: i32,
) -> Option<usize> {
    let x = x as i64 + x_offset as i64;
    let y = y as i64 + y_offset as i64;
    if x < 0 || y < 0 || x >= width as i64 || y >= height as i64 {
        return None;
    }
    Some(map_index_fast(x as usize, y as usize, mode, width, height))
}

/// Unchecked translation of a zero-based coordinate.
///
/// The caller guarantees `x < width` and `y < height`; the result is
/// meaningless (but harmless) otherwise.
#[inline]
pub fn map_index_fast(x: usize, y: usize, mode: WiringMode, width: usize, height: usize) -> usize {
    match mode {
        WiringMode::RowSerpentine => {
            if y % 2 == 0 {
                y * width + x
            } else {
                (y * width + width).wrapping_sub(1).wrapping_sub(x)
            }
        }
        WiringMode::ColumnSerpentine => {
            if x % 2 == 0 {
                x * height + y
            } else {
                (x * height + height).wrapping_sub(1).wrapping_sub(y)
            }
        }
        WiringMode::RowLinear => y * width + x,
        WiringMode::ColumnLinear => x * height + y,
    }
}
