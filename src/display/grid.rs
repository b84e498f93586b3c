/*
 *  display/grid.rs
 *
 *  tideclock - worth the wait
 *  (c) 2020-26 Stuart Hunter
 *
 *  Pixel buffer for an addressable LED matrix
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

use core::convert::Infallible;
use embedded_graphics::geometry::{OriginDimensions, Size};
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use log::{debug, trace};

use crate::display::color::{Color, ColorDepth};
use crate::display::error::DisplayError;
use crate::display::mapping::{map_index, map_index_fast, WiringMode};
use crate::display::traits::LedDriver;

/// Geometry and wiring of one LED matrix, fixed once the grid is built
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridConfig {
    pub width: usize,
    pub height: usize,
    pub depth: ColorDepth,
    pub mode: WiringMode,
    /// Added to every logical x before mapping
    pub x_offset: i32,
    /// Added to every logical y before mapping
    pub y_offset: i32,
}

impl GridConfig {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            depth: ColorDepth::Rgb,
            mode: WiringMode::RowSerpentine,
            x_offset: 0,
            y_offset: 0,
        }
    }

    pub fn with_depth(mut self, depth: ColorDepth) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_mode(mut self, mode: WiringMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_offsets(mut self, x_offset: i32, y_offset: i32) -> Self {
        self.x_offset = x_offset;
        self.y_offset = y_offset;
        self
    }

    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    pub fn validate(&self) -> Result<(), DisplayError> {
        if self.width == 0 || self.height == 0 {
            return Err(DisplayError::InvalidConfiguration(format!(
                "grid must be at least 1x1, got {}x{}",
                self.width, self.height
            )));
        }
        if i32::try_from(self.width).is_err() || i32::try_from(self.height).is_err() {
            return Err(DisplayError::InvalidConfiguration(
                "grid dimensions exceed addressable range".to_string(),
            ));
        }
        Ok(())
    }
}

/// A width x height LED matrix and the buffer behind it
///
/// The buffer is stored in physical strip order so a flush is a straight
/// hand-off to the driver. `(0,0)` is the bottom-left LED; y grows upward.
///
/// Three addressing flavours exist:
/// - [`Grid::set_pixel`] / [`Grid::get_pixel`]: logical coordinates, offsets
///   applied, out of range is a silent no-op
/// - [`Grid::set_cell`] / [`Grid::get_cell`]: zero-based coordinates, checked
/// - [`Grid::set_pixel_fast`]: zero-based, for hot loops that already know
///   the coordinate is in range
pub struct Grid<D: LedDriver> {
    config: GridConfig,
    pixels: Vec<Color>,
    driver: D,
}

impl<D: LedDriver> Grid<D> {
    pub fn new(config: GridConfig, driver: D) -> Result<Self, DisplayError> {
        config.validate()?;
        debug!(
            "grid {}x{} depth {} {:?} offsets ({},{}) on {}",
            config.width,
            config.height,
            config.depth.channels(),
            config.mode,
            config.x_offset,
            config.y_offset,
            driver.name()
        );
        Ok(Self {
            pixels: vec![Color::OFF; config.pixel_count()],
            config,
            driver,
        })
    }

    /// Initialize the driver and blank the strip
    pub fn init(&mut self) -> Result<(), DisplayError> {
        self.driver.init()?;
        self.off()
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.config.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.config.height
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    /// Physical order, one entry per LED
    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    /// Strip index of a logical coordinate
    pub fn index_of(&self, x: i32, y: i32) -> Option<usize> {
        let c = &self.config;
        map_index(x, y, c.mode, c.width, c.height, c.x_offset, c.y_offset)
    }

    fn cell_index(&self, x: i32, y: i32) -> Option<usize> {
        let c = &self.config;
        map_index(x, y, c.mode, c.width, c.height, 0, 0)
    }

    pub fn set_pixel(&mut self, x: i32, y: i32, color: Color) {
        if let Some(i) = self.index_of(x, y) {
            self.pixels[i] = color.for_depth(self.config.depth);
        }
    }

    pub fn get_pixel(&self, x: i32, y: i32) -> Option<Color> {
        self.index_of(x, y).map(|i| self.pixels[i])
    }

    pub fn set_cell(&mut self, x: i32, y: i32, color: Color) {
        if let Some(i) = self.cell_index(x, y) {
            self.pixels[i] = color.for_depth(self.config.depth);
        }
    }

    pub fn get_cell(&self, x: i32, y: i32) -> Option<Color> {
        self.cell_index(x, y).map(|i| self.pixels[i])
    }

    /// Zero-based write without the range test on x/y.
    ///
    /// An index that lands outside the buffer is dropped, so a bad
    /// coordinate can paint the wrong LED but never grows the buffer.
    #[inline]
    pub fn set_pixel_fast(&mut self, x: usize, y: usize, color: Color) {
        let c = &self.config;
        let i = map_index_fast(x, y, c.mode, c.width, c.height);
        let depth = c.depth;
        if let Some(p) = self.pixels.get_mut(i) {
            *p = color.for_depth(depth);
        }
    }

    /// Write by position along the strip, bypassing the wiring map
    pub fn set_index(&mut self, index: usize, color: Color) {
        let depth = self.config.depth;
        if let Some(p) = self.pixels.get_mut(index) {
            *p = color.for_depth(depth);
        }
    }

    pub fn fill(&mut self, color: Color) {
        let color = color.for_depth(self.config.depth);
        self.pixels.fill(color);
    }

    /// Blank the buffer, optionally pushing it to the strip
    pub fn clear(&mut self, flush: bool) -> Result<(), DisplayError> {
        self.pixels.fill(Color::OFF);
        if flush {
            self.flush()?;
        }
        Ok(())
    }

    /// Hand the buffer to the driver
    pub fn flush(&mut self) -> Result<(), DisplayError> {
        trace!("flush {} leds to {}", self.pixels.len(), self.driver.name());
        self.driver.write_frame(&self.pixels, self.config.depth)
    }

    pub fn off(&mut self) -> Result<(), DisplayError> {
        self.clear(true)
    }

    /// The buffer as `depth` bytes per LED, strip order
    pub fn to_packed_bytes(&self) -> Vec<u8> {
        pack_frame(&self.pixels, self.config.depth)
    }
}

/// Pack a physical-order frame as R,G,B[,W] bytes per LED
pub fn pack_frame(frame: &[Color], depth: ColorDepth) -> Vec<u8> {
    let mut out = Vec::with_capacity(frame.len() * depth.channels());
    for c in frame {
        c.write_channels(depth, &mut out);
    }
    out
}

impl<D: LedDriver> OriginDimensions for Grid<D> {
    fn size(&self) -> Size {
        Size::new(self.config.width as u32, self.config.height as u32)
    }
}

/// embedded-graphics draws top-left-origin, the matrix is bottom-left-origin
impl<D: LedDriver> DrawTarget for Grid<D> {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let top = self.config.height as i32 - 1;
        for Pixel(p, c) in pixels {
            self.set_cell(p.x, top - p.y, Color::from(c));
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.fill(Color::from(color));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::drivers::mock::MockDriver;
    use embedded_graphics::primitives::{Line, PrimitiveStyle};

    fn grid(w: usize, h: usize, mode: WiringMode) -> Grid<MockDriver> {
        Grid::new(GridConfig::new(w, h).with_mode(mode), MockDriver::new()).unwrap()
    }

    #[test]
    fn test_rejects_empty_grid() {
        assert!(Grid::new(GridConfig::new(0, 4), MockDriver::new()).is_err());
    }

    #[test]
    fn test_set_get_round_trip_all_modes() {
        for mode in WiringMode::ALL {
            let mut g = grid(5, 3, mode);
            for y in 0..3 {
                for x in 0..5 {
                    let c = Color::rgb(x as u8, y as u8, 7);
                    g.set_pixel(x, y, c);
                    assert_eq!(g.get_pixel(x, y), Some(c));
                }
            }
        }
    }

    #[test]
    fn test_out_of_range_is_a_no_op() {
        let mut g = grid(4, 4, WiringMode::RowSerpentine);
        g.set_pixel(-1, 0, Color::rgb(1, 1, 1));
        g.set_pixel(4, 0, Color::rgb(1, 1, 1));
        g.set_pixel(0, 4, Color::rgb(1, 1, 1));
        assert!(g.pixels().iter().all(|c| c.is_off()));
        assert_eq!(g.get_pixel(4, 4), None);
        assert_eq!(g.pixels().len(), 16);
    }

    #[test]
    fn test_offsets_apply_to_logical_but_not_cells() {
        let cfg = GridConfig::new(16, 8).with_offsets(-1, -1);
        let mut g = Grid::new(cfg, MockDriver::new()).unwrap();
        g.set_pixel(1, 2, Color::rgb(9, 0, 0));
        assert_eq!(g.pixels()[31], Color::rgb(9, 0, 0));
        assert_eq!(g.get_cell(0, 1), Some(Color::rgb(9, 0, 0)));
    }

    #[test]
    fn test_fast_setter_matches_checked_setter() {
        for mode in WiringMode::ALL {
            let mut a = grid(6, 4, mode);
            let mut b = grid(6, 4, mode);
            a.set_cell(3, 1, Color::rgb(1, 2, 3));
            b.set_pixel_fast(3, 1, Color::rgb(1, 2, 3));
            assert_eq!(a.pixels(), b.pixels());
        }
    }

    #[test]
    fn test_fast_setter_ignores_wild_index() {
        let mut g = grid(4, 4, WiringMode::RowLinear);
        g.set_pixel_fast(0, 40, Color::rgb(1, 1, 1));
        assert_eq!(g.pixels().len(), 16);
        assert!(g.pixels().iter().all(|c| c.is_off()));
    }

    #[test]
    fn test_rgb_grid_drops_white() {
        let mut g = grid(2, 2, WiringMode::RowLinear);
        g.set_pixel(0, 0, Color::rgbw(1, 2, 3, 4));
        assert_eq!(g.get_pixel(0, 0), Some(Color::rgb(1, 2, 3)));
    }

    #[test]
    fn test_clear_and_flush_reach_driver() {
        let mut g = grid(3, 3, WiringMode::RowSerpentine);
        let state = g.driver().state();
        g.fill(Color::rgb(5, 5, 5));
        g.clear(false).unwrap();
        assert_eq!(state.lock().unwrap().flush_count, 0);
        g.fill(Color::rgb(5, 5, 5));
        g.flush().unwrap();
        g.off().unwrap();
        let s = state.lock().unwrap();
        assert_eq!(s.flush_count, 2);
        assert!(s.last_frame.iter().all(|c| c.is_off()));
    }

    #[test]
    fn test_flush_failure_propagates() {
        let mut g = grid(3, 3, WiringMode::RowSerpentine);
        g.driver().state().lock().unwrap().simulate_flush_failure = true;
        assert!(matches!(g.flush(), Err(DisplayError::DriverFailure(_))));
    }

    #[test]
    fn test_packed_bytes_follow_depth() {
        let cfg = GridConfig::new(2, 1).with_depth(ColorDepth::Rgbw).with_mode(WiringMode::RowLinear);
        let mut g = Grid::new(cfg, MockDriver::new()).unwrap();
        g.set_pixel(1, 0, Color::rgbw(1, 2, 3, 4));
        assert_eq!(g.to_packed_bytes(), vec![0, 0, 0, 0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_draw_target_flips_vertically() {
        let mut g = grid(4, 3, WiringMode::RowLinear);
        // top row in embedded-graphics space is y = height - 1 on the matrix
        Line::new(Point::new(0, 0), Point::new(3, 0))
            .into_styled(PrimitiveStyle::with_stroke(Rgb888::new(0, 0, 9), 1))
            .draw(&mut g)
            .unwrap();
        for x in 0..4 {
            assert_eq!(g.get_cell(x, 2), Some(Color::rgb(0, 0, 9)));
            assert_eq!(g.get_cell(x, 0), Some(Color::OFF));
        }
    }
}
