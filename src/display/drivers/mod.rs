/*
 *  display/drivers/mod.rs
 *
 *  tideclock - worth the wait
 *  (c) 2020-26 Stuart Hunter
 *
 *  LED driver implementations
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

use crate::display::color::{Color, ColorDepth};
use crate::display::error::DisplayError;
use crate::display::traits::LedDriver;

// Terminal preview
pub mod console;

// Packed bytes to a file, FIFO or serial device
pub mod stream;

// Mock driver for testing
pub mod mock;

pub use console::ConsoleDriver;
pub use mock::MockDriver;
pub use stream::StreamDriver;

/// Discards every frame
#[derive(Debug, Default, Clone, Copy)]
pub struct NullDriver;

impl LedDriver for NullDriver {
    fn name(&self) -> &str {
        "null"
    }

    fn write_frame(&mut self, _frame: &[Color], _depth: ColorDepth) -> Result<(), DisplayError> {
        Ok(())
    }
}
