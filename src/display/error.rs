/*
 *  display/error.rs
 *
 *  tideclock - worth the wait
 *  (c) 2020-26 Stuart Hunter
 *
 *  Unified error type for the LED grid and its drivers
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

use std::error::Error;
use std::fmt;

/// Unified error type for all grid and driver operations
///
/// Coordinate and glyph problems never surface here; only a failed hand-off
/// to the LED hardware (or a misconfigured driver) does.
#[derive(Debug)]
pub enum DisplayError {
    /// The LED driver rejected or failed to transmit a frame
    DriverFailure(String),

    /// I/O error while writing to a device or stream
    Io(std::io::Error),

    /// Invalid configuration
    InvalidConfiguration(String),

    /// Frame size mismatch between grid and driver
    BufferSizeMismatch { expected: usize, actual: usize },
}

impl fmt::Display for DisplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayError::DriverFailure(msg) =>
                write!(f, "LED driver failure: {}", msg),
            DisplayError::Io(err) =>
                write!(f, "LED output I/O error: {}", err),
            DisplayError::InvalidConfiguration(msg) =>
                write!(f, "Invalid configuration: {}", msg),
            DisplayError::BufferSizeMismatch { expected, actual } =>
                write!(f, "Frame size mismatch: expected {} pixels, got {}", expected, actual),
        }
    }
}

impl Error for DisplayError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            DisplayError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for DisplayError {
    fn from(err: std::io::Error) -> Self {
        DisplayError::Io(err)
    }
}
