/*
 *  display/drivers/console.rs
 *
 *  tideclock - worth the wait
 *  (c) 2020-26 Stuart Hunter
 *
 *  Terminal preview of the LED matrix using ANSI true-color blocks
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

use std::io::Write;

use log::debug;

use crate::display::color::{Color, ColorDepth};
use crate::display::error::DisplayError;
use crate::display::mapping::{map_index_fast, WiringMode};
use crate::display::traits::LedDriver;

/// Renders each frame as a block of colored cells, top row first
///
/// The driver needs the grid geometry to undo the strip wiring. Dim clock
/// colors are stretched to full range so they remain visible on screen.
pub struct ConsoleDriver<W: Write + Send> {
    out: W,
    width: usize,
    height: usize,
    mode: WiringMode,
    /// Channel multiplier applied before printing
    gain: u16,
    drawn: bool,
}

impl<W: Write + Send> ConsoleDriver<W> {
    pub fn new(out: W, width: usize, height: usize, mode: WiringMode) -> Self {
        Self { out, width, height, mode, gain: 1, drawn: false }
    }

    /// Scale channels so a frame dimmed to `max_value` prints at full range
    pub fn with_brightness_compensation(mut self, max_value: u8) -> Self {
        self.gain = (255 / u16::from(max_value.max(1))).max(1);
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn boost(&self, c: u8) -> u8 {
        (u16::from(c) * self.gain).min(255) as u8
    }

    fn render(&self, frame: &[Color]) -> String {
        let mut s = String::with_capacity(self.width * self.height * 24);
        if self.drawn {
            // cursor back to the top of the previous frame
            s.push_str(&format!("\x1b[{}A", self.height));
        }
        for y in (0..self.height).rev() {
            for x in 0..self.width {
                let i = map_index_fast(x, y, self.mode, self.width, self.height);
                let c = frame.get(i).copied().unwrap_or(Color::OFF);
                if c.is_off() {
                    s.push_str("\x1b[0m  ");
                } else {
                    // white channel folds into grey so RGBW strips preview sanely
                    let w = c.w;
                    s.push_str(&format!(
                        "\x1b[48;2;{};{};{}m  ",
                        self.boost(c.r.saturating_add(w)),
                        self.boost(c.g.saturating_add(w)),
                        self.boost(c.b.saturating_add(w)),
                    ));
                }
            }
            s.push_str("\x1b[0m\n");
        }
        s
    }
}

impl<W: Write + Send> LedDriver for ConsoleDriver<W> {
    fn name(&self) -> &str {
        "console"
    }

    fn init(&mut self) -> Result<(), DisplayError> {
        debug!("console preview {}x{} {:?}", self.width, self.height, self.mode);
        self.drawn = false;
        Ok(())
    }

    fn write_frame(&mut self, frame: &[Color], _depth: ColorDepth) -> Result<(), DisplayError> {
        let expected = self.width * self.height;
        if frame.len() != expected {
            return Err(DisplayError::BufferSizeMismatch { expected, actual: frame.len() });
        }
        let text = self.render(frame);
        self.out.write_all(text.as_bytes())?;
        self.out.flush()?;
        self.drawn = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_renders_top_row_first() {
        let mut d = ConsoleDriver::new(Vec::new(), 2, 2, WiringMode::RowLinear);
        // LED 2 is (0,1), the top-left cell
        let frame = [Color::OFF, Color::OFF, Color::rgb(255, 0, 0), Color::OFF];
        d.write_frame(&frame, ColorDepth::Rgb).unwrap();
        let out = String::from_utf8(d.into_inner()).unwrap();
        let first_line = out.lines().next().unwrap();
        assert!(first_line.starts_with("\x1b[48;2;255;0;0m"));
        assert_eq!(out.lines().count(), 2);
    }

    #[test]
    fn test_console_rewinds_after_first_frame() {
        let mut d = ConsoleDriver::new(Vec::new(), 1, 3, WiringMode::ColumnLinear);
        d.write_frame(&[Color::OFF; 3], ColorDepth::Rgb).unwrap();
        d.write_frame(&[Color::OFF; 3], ColorDepth::Rgb).unwrap();
        let out = String::from_utf8(d.into_inner()).unwrap();
        assert_eq!(out.matches("\x1b[3A").count(), 1);
    }

    #[test]
    fn test_console_compensates_dim_colors() {
        let mut d = ConsoleDriver::new(Vec::new(), 1, 1, WiringMode::RowLinear)
            .with_brightness_compensation(8);
        d.write_frame(&[Color::rgb(0, 0, 8)], ColorDepth::Rgb).unwrap();
        let out = String::from_utf8(d.into_inner()).unwrap();
        assert!(out.contains("48;2;0;0;248m"));
    }

    #[test]
    fn test_console_rejects_wrong_frame_size() {
        let mut d = ConsoleDriver::new(Vec::new(), 2, 2, WiringMode::RowLinear);
        assert!(matches!(
            d.write_frame(&[Color::OFF], ColorDepth::Rgb),
            Err(DisplayError::BufferSizeMismatch { expected: 4, actual: 1 })
        ));
    }
}
