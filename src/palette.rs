/*
 *  palette.rs
 *
 *  tideclock - worth the wait
 *  (c) 2020-26 Stuart Hunter
 *
 *  Named bold colors, brightness scaling and color selection
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

use serde::{Deserialize, Serialize};

use crate::display::Color;
use crate::sources::RandomSource;

/// Bold colors in spectrum order
pub const BOLD_COLORS: [(&str, Color); 18] = [
    ("blue", Color::rgb(0, 0, 255)),
    ("deep blue gatoraide", Color::rgb(0, 32, 255)),
    ("blue gatoraide", Color::rgb(0, 127, 255)),
    ("cyan", Color::rgb(0, 255, 255)),
    ("aqua", Color::rgb(0, 255, 127)),
    ("electric mint", Color::rgb(0, 255, 32)),
    ("green", Color::rgb(0, 255, 0)),
    ("electric lime", Color::rgb(32, 255, 0)),
    ("green yellow", Color::rgb(127, 255, 0)),
    ("yellow", Color::rgb(255, 255, 0)),
    ("orange", Color::rgb(255, 127, 0)),
    ("electric pumpkin", Color::rgb(255, 32, 0)),
    ("red", Color::rgb(255, 0, 0)),
    ("deep pink", Color::rgb(255, 0, 32)),
    ("pink", Color::rgb(255, 0, 127)),
    ("magenta", Color::rgb(255, 0, 255)),
    ("purple", Color::rgb(127, 0, 255)),
    ("deep purple", Color::rgb(32, 0, 255)),
];

pub const WHITE: Color = Color::rgb(255, 255, 255);
pub const RED: Color = Color::rgb(255, 0, 0);

/// Palette entry or one of the extras (white, black/off), full brightness
pub fn lookup(name: &str) -> Option<Color> {
    let name = name.trim().to_lowercase();
    match name.as_str() {
        "white" => Some(WHITE),
        "black" | "off" => Some(Color::OFF),
        _ => BOLD_COLORS.iter().find(|(n, _)| *n == name).map(|&(_, c)| c),
    }
}

/// Case-insensitive lookup scaled to `max_value`; unknown names are red
pub fn color_by_name(name: &str, max_value: u8) -> Color {
    lookup(name).unwrap_or(RED).scaled(max_value)
}

/// Endless walk through the palette at one brightness.
///
/// Wraps back to blue before reaching deep purple, the last entry.
#[derive(Debug, Clone)]
pub struct ColorCycle {
    place: usize,
    max_value: u8,
}

impl ColorCycle {
    pub fn new(max_value: u8) -> Self {
        Self { place: 0, max_value }
    }
}

impl Iterator for ColorCycle {
    type Item = Color;

    fn next(&mut self) -> Option<Color> {
        let color = BOLD_COLORS[self.place].1.scaled(self.max_value);
        self.place += 1;
        if self.place >= BOLD_COLORS.len() - 1 {
            self.place = 0;
        }
        Some(color)
    }
}

/// Any palette color, plus white and black unless `no_white`
pub fn random_color(rng: &mut dyn RandomSource, max_value: u8, no_white: bool) -> Color {
    let extras: &[Color] = if no_white { &[] } else { &[WHITE, Color::OFF] };
    let count = BOLD_COLORS.len() + extras.len();
    let pick = rng.random_int((count - 1) as u32) as usize;
    let color = match BOLD_COLORS.get(pick) {
        Some(&(_, c)) => c,
        None => extras[pick - BOLD_COLORS.len()],
    };
    color.scaled(max_value)
}

/// A color as written in config: a palette name or a channel list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorSpec {
    Name(String),
    Channels(Vec<u8>),
}

impl ColorSpec {
    /// Full-brightness color; `None` for an unknown name or a list that
    /// is not 3 or 4 channels
    pub fn resolve(&self) -> Option<Color> {
        match self {
            ColorSpec::Name(name) => lookup(name),
            ColorSpec::Channels(ch) if (3..=4).contains(&ch.len()) => Some(Color::from_channels(ch)),
            ColorSpec::Channels(_) => None,
        }
    }
}

impl From<&str> for ColorSpec {
    fn from(name: &str) -> Self {
        ColorSpec::Name(name.to_string())
    }
}

impl From<Color> for ColorSpec {
    fn from(c: Color) -> Self {
        if c.w == 0 {
            ColorSpec::Channels(vec![c.r, c.g, c.b])
        } else {
            ColorSpec::Channels(c.channels().to_vec())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::ScriptedRandom;

    #[test]
    fn test_color_by_name_scales_and_defaults() {
        assert_eq!(color_by_name("Blue", 255), Color::rgb(0, 0, 255));
        assert_eq!(color_by_name("blue", 8), Color::rgb(0, 0, 8));
        assert_eq!(color_by_name("orange", 32), Color::rgb(32, 16, 0));
        assert_eq!(color_by_name("no such color", 8), Color::rgb(8, 0, 0));
    }

    #[test]
    fn test_cycle_skips_last_entry() {
        let colors: Vec<Color> = ColorCycle::new(255).take(18).collect();
        assert_eq!(colors[0], Color::rgb(0, 0, 255));
        assert_eq!(colors[16], Color::rgb(127, 0, 255));
        assert_eq!(colors[17], Color::rgb(0, 0, 255));
    }

    #[test]
    fn test_random_color_extras() {
        let mut rng = ScriptedRandom::new(vec![18, 19, 99]);
        assert_eq!(random_color(&mut rng, 255, false), WHITE);
        assert_eq!(random_color(&mut rng, 255, false), Color::OFF);
        // clamped to the last palette entry when extras are off
        assert_eq!(random_color(&mut rng, 255, true), Color::rgb(32, 0, 255));
    }

    #[test]
    fn test_color_spec_yaml_forms() {
        let name: ColorSpec = serde_yaml::from_str("deep pink").unwrap();
        assert_eq!(name.resolve(), Some(Color::rgb(255, 0, 32)));
        let list: ColorSpec = serde_yaml::from_str("[1, 2, 3, 4]").unwrap();
        assert_eq!(list.resolve(), Some(Color::rgbw(1, 2, 3, 4)));
        let short: ColorSpec = serde_yaml::from_str("[1, 2]").unwrap();
        assert_eq!(short.resolve(), None);
        assert_eq!(ColorSpec::from("mauve").resolve(), None);
    }
}
