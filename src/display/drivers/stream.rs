/*
 *  display/drivers/stream.rs
 *
 *  tideclock - worth the wait
 *  (c) 2020-26 Stuart Hunter
 *
 *  Raw byte stream output, one packed frame per flush
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

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use log::info;

use crate::display::color::{Color, ColorDepth};
use crate::display::error::DisplayError;
use crate::display::grid::pack_frame;
use crate::display::traits::LedDriver;

/// Writes each frame as packed R,G,B[,W] bytes to any writer
///
/// Intended for a FIFO or serial device read by whatever actually clocks
/// the strip (a microcontroller bridge, a PIO/SPI helper process).
pub struct StreamDriver<W: Write + Send> {
    out: W,
    label: String,
    frames: u64,
}

impl StreamDriver<std::fs::File> {
    /// Open (or create) a file, FIFO or device node for writing
    pub fn open(path: &Path) -> Result<Self, DisplayError> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(|e| {
                DisplayError::InvalidConfiguration(format!("cannot open {}: {}", path.display(), e))
            })?;
        Ok(Self::new(file, path.to_path_buf()))
    }
}

impl<W: Write + Send> StreamDriver<W> {
    pub fn new(out: W, label: impl Into<PathBuf>) -> Self {
        Self { out, label: label.into().display().to_string(), frames: 0 }
    }

    pub fn frames_written(&self) -> u64 {
        self.frames
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> LedDriver for StreamDriver<W> {
    fn name(&self) -> &str {
        "stream"
    }

    fn init(&mut self) -> Result<(), DisplayError> {
        info!("streaming frames to {}", self.label);
        Ok(())
    }

    fn write_frame(&mut self, frame: &[Color], depth: ColorDepth) -> Result<(), DisplayError> {
        let bytes = pack_frame(frame, depth);
        self.out.write_all(&bytes)?;
        self.out.flush()?;
        self.frames += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_writes_packed_frames() {
        let mut d = StreamDriver::new(Vec::new(), "buffer");
        d.write_frame(&[Color::rgb(1, 2, 3), Color::rgbw(4, 5, 6, 7)], ColorDepth::Rgb).unwrap();
        d.write_frame(&[Color::rgbw(4, 5, 6, 7)], ColorDepth::Rgbw).unwrap();
        assert_eq!(d.frames_written(), 2);
        assert_eq!(d.into_inner(), vec![1, 2, 3, 4, 5, 6, 4, 5, 6, 7]);
    }
}
