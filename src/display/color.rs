/*
 *  display/color.rs
 *
 *  tideclock - worth the wait
 *  (c) 2020-26 Stuart Hunter
 *
 *  Pixel color values and channel depth for addressable LEDs
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

use embedded_graphics::pixelcolor::{Rgb888, RgbColor};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of 8-bit channels each LED on the strip consumes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ColorDepth {
    /// 3 channels, R G B (WS2812B and friends)
    #[default]
    Rgb,

    /// 4 channels, R G B W (SK6812 RGBW)
    Rgbw,
}

impl ColorDepth {
    pub fn channels(self) -> usize {
        match self {
            ColorDepth::Rgb => 3,
            ColorDepth::Rgbw => 4,
        }
    }
}

impl TryFrom<u8> for ColorDepth {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            3 => Ok(ColorDepth::Rgb),
            4 => Ok(ColorDepth::Rgbw),
            other => Err(format!("color depth must be 3 or 4, got {}", other)),
        }
    }
}

impl From<ColorDepth> for u8 {
    fn from(depth: ColorDepth) -> Self {
        depth.channels() as u8
    }
}

/// One LED's color
///
/// The white channel is carried for every color but only survives into the
/// pixel buffer when the grid runs at [`ColorDepth::Rgbw`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub w: u8,
}

impl Color {
    pub const OFF: Color = Color::rgb(0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b, w: 0 }
    }

    pub const fn rgbw(r: u8, g: u8, b: u8, w: u8) -> Self {
        Color { r, g, b, w }
    }

    /// Build from a channel list: missing channels are zero, extras dropped
    pub fn from_channels(channels: &[u8]) -> Self {
        let at = |i: usize| channels.get(i).copied().unwrap_or(0);
        Color::rgbw(at(0), at(1), at(2), at(3))
    }

    pub fn channels(&self) -> [u8; 4] {
        [self.r, self.g, self.b, self.w]
    }

    /// Scale every channel by `max_value / 255`, rounding half to even
    pub fn scaled(self, max_value: u8) -> Self {
        let scale = max_value as f64 / 255.0;
        let s = |c: u8| (c as f64 * scale).round_ties_even().clamp(0.0, 255.0) as u8;
        Color::rgbw(s(self.r), s(self.g), s(self.b), s(self.w))
    }

    /// Drop channels the strip does not have
    pub fn for_depth(self, depth: ColorDepth) -> Self {
        match depth {
            ColorDepth::Rgb => Color { w: 0, ..self },
            ColorDepth::Rgbw => self,
        }
    }

    pub fn is_off(&self) -> bool {
        self.channels().iter().all(|&c| c == 0)
    }

    /// Append this color's channels in strip order (R, G, B[, W])
    pub fn write_channels(&self, depth: ColorDepth, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.channels()[..depth.channels()]);
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.w == 0 {
            write!(f, "({},{},{})", self.r, self.g, self.b)
        } else {
            write!(f, "({},{},{},{})", self.r, self.g, self.b, self.w)
        }
    }
}

impl From<Rgb888> for Color {
    fn from(c: Rgb888) -> Self {
        Color::rgb(c.r(), c.g(), c.b())
    }
}

impl From<Color> for Rgb888 {
    fn from(c: Color) -> Self {
        Rgb888::new(c.r, c.g, c.b)
    }
}
