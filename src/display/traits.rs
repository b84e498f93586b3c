/*
 *  display/traits.rs
 *
 *  tideclock - worth the wait
 *  (c) 2020-26 Stuart Hunter
 *
 *  Core trait definition for the LED strip driver abstraction
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

/// Minimal hardware abstraction - every LED strip driver implements this trait
///
/// The grid owns the pixel buffer and hands it over, already in physical
/// strip order, on every flush. The driver is responsible for the
/// physical-layer timing of whatever protocol the strip speaks.
pub trait LedDriver: Send {
    /// Short name used in log lines
    fn name(&self) -> &str;

    /// Prepare the output (open devices, reset the strip)
    fn init(&mut self) -> Result<(), DisplayError> {
        Ok(())
    }

    /// Transmit one frame
    ///
    /// `frame[i]` is the color of LED `i` along the strip. Blocking: the
    /// frame is considered shown once this returns. Failures are not retried.
    fn write_frame(&mut self, frame: &[Color], depth: ColorDepth) -> Result<(), DisplayError>;
}

impl<T: LedDriver + ?Sized> LedDriver for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn init(&mut self) -> Result<(), DisplayError> {
        (**self).init()
    }

    fn write_frame(&mut self, frame: &[Color], depth: ColorDepth) -> Result<(), DisplayError> {
        (**self).write_frame(frame, depth)
    }
}
