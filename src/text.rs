/*
 *  text.rs
 *
 *  tideclock - worth the wait
 *  (c) 2020-26 Stuart Hunter
 *
 *  Text layout on the LED grid - place, center, scroll and flash
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

use std::sync::atomic::AtomicBool;
use std::time::Duration;

use log::{debug, trace};

use crate::display::{Color, DisplayError, Grid, LedDriver};
use crate::font::{FontTable, TextOptions};
use crate::pacer::{interrupted, Completion, Pacer};
use crate::sources::MonotonicClock;

/// Shift that centers `text` (already normalized) on a width x height grid.
///
/// Text as wide as the grid or wider is left-anchored; a font as tall as
/// the grid or taller sits on row 0.
pub fn center_shift(font: &FontTable, text: &str, width: usize, height: usize) -> (usize, usize) {
    let len = font.measure(text);
    let x = if len < width { (width - len) / 2 } else { 0 };
    let y = if font.height() < height { (height - font.height()) / 2 } else { 0 };
    (x, y)
}

/// Text rendering through one font with one set of normalization rules
///
/// All coordinates here are zero-based grid cells; the grid's logical
/// offsets never apply to text.
#[derive(Debug, Clone, Copy)]
pub struct TextLayer<'f> {
    font: &'f FontTable,
    options: TextOptions,
}

impl<'f> TextLayer<'f> {
    pub fn new(font: &'f FontTable) -> Self {
        Self { font, options: TextOptions::default() }
    }

    pub fn with_options(mut self, options: TextOptions) -> Self {
        self.options = options;
        self
    }

    pub fn font(&self) -> &'f FontTable {
        self.font
    }

    pub fn normalize(&self, text: &str) -> String {
        self.font.normalize(text, self.options)
    }

    pub fn measure(&self, text: &str) -> usize {
        self.font.measure(&self.normalize(text))
    }

    /// Normalize, then paint with the lower-left of the first glyph at
    /// (`x_shift`, `y_shift`)
    pub fn place<D: LedDriver>(&self, grid: &mut Grid<D>, text: &str, color: Color, x_shift: i32, y_shift: i32) {
        let text = self.normalize(text);
        self.place_normalized(grid, &text, color, x_shift, y_shift);
    }

    /// Paint text that is already normalized.
    ///
    /// Each glyph is followed by one blank column. No glyph is started once
    /// its first column would be off the right edge.
    pub fn place_normalized<D: LedDriver>(
        &self,
        grid: &mut Grid<D>,
        text: &str,
        color: Color,
        x_shift: i32,
        y_shift: i32,
    ) {
        let width = grid.width() as i32;
        let mut column = 0i32;
        for c in text.chars() {
            let glyph = self.font.glyph(c);
            for col in 0..glyph.width {
                for row in 0..self.font.height() {
                    if self.font.is_lit(&glyph, col, row) {
                        grid.set_cell(column + x_shift, row as i32 + y_shift, color);
                    }
                }
                column += 1;
            }
            column += 1;
            if column + x_shift >= width {
                break;
            }
        }
    }

    pub fn center<D: LedDriver>(&self, grid: &mut Grid<D>, text: &str, color: Color) {
        let text = self.normalize(text);
        if text.is_empty() {
            return;
        }
        let (x, y) = center_shift(self.font, &text, grid.width(), grid.height());
        self.place_normalized(grid, &text, color, x as i32, y as i32);
    }

    /// Scroll `text` right to left through the grid.
    ///
    /// The text enters from the right edge and leaves past the left. Each
    /// frame paints the visible window, flushes, then erases the same cells
    /// with the background so the buffer never needs a full refill.
    pub fn scroll<D: LedDriver>(
        &self,
        grid: &mut Grid<D>,
        text: &str,
        color: Color,
        background: Option<Color>,
        frame_interval: Duration,
        clock: &dyn MonotonicClock,
        interrupt: Option<&AtomicBool>,
    ) -> Result<Completion, DisplayError> {
        let text = self.normalize(text);
        if text.is_empty() {
            return Ok(Completion::Finished);
        }

        let (width, height) = (grid.width(), grid.height());
        let (_, y_shift) = center_shift(self.font, &text, width, height);
        let strip = self.font.strip(&text, width);

        let background = match background {
            Some(bg) => {
                grid.fill(bg);
                bg
            }
            None => {
                grid.clear(false)?;
                Color::OFF
            }
        };

        debug!("scroll '{}' over {} frames", text, strip.len() - width);
        let mut pacer = Pacer::new(frame_interval);
        for start in 0..strip.len() - width {
            pacer.wait(clock);

            let window = &strip[start..start + width];
            paint_window(grid, window, y_shift, color);
            grid.flush()?;
            paint_window(grid, window, y_shift, background);

            if interrupted(interrupt) {
                debug!("scroll interrupted at frame {}", start);
                grid.off()?;
                return Ok(Completion::Interrupted);
            }
        }
        Ok(Completion::Finished)
    }

    /// Show each character of `text` centered on its own, one after another
    pub fn flash_chars<D: LedDriver>(
        &self,
        grid: &mut Grid<D>,
        text: &str,
        color: Color,
        on_time: Duration,
        off_time: Duration,
        clock: &dyn MonotonicClock,
        interrupt: Option<&AtomicBool>,
    ) -> Result<Completion, DisplayError> {
        let text = self.normalize(text);
        let mut buf = [0u8; 4];
        for c in text.chars() {
            trace!("flash '{}'", c);
            grid.clear(false)?;
            let single: &str = c.encode_utf8(&mut buf);
            let (x, y) = center_shift(self.font, single, grid.width(), grid.height());
            self.place_normalized(grid, single, color, x as i32, y as i32);
            grid.flush()?;
            clock.sleep(on_time);

            grid.off()?;
            clock.sleep(off_time);

            if interrupted(interrupt) {
                grid.off()?;
                return Ok(Completion::Interrupted);
            }
        }
        Ok(Completion::Finished)
    }
}

fn paint_window<D: LedDriver>(grid: &mut Grid<D>, window: &[u32], y_shift: usize, color: Color) {
    let height = grid.height();
    for (x, &bits) in window.iter().enumerate() {
        if bits == 0 {
            continue;
        }
        for row in 0..32 {
            let y = row + y_shift;
            if y >= height {
                break;
            }
            if bits & (1 << row) != 0 {
                grid.set_pixel_fast(x, y, color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::drivers::MockDriver;
    use crate::display::GridConfig;
    use crate::sources::FakeClock;
    use std::sync::atomic::Ordering;

    const FG: Color = Color::rgb(0, 0, 8);

    fn grid(w: usize, h: usize) -> Grid<MockDriver> {
        Grid::new(GridConfig::new(w, h).with_offsets(-1, -1), MockDriver::with_history()).unwrap()
    }

    fn lit(g: &Grid<MockDriver>) -> Vec<(i32, i32)> {
        let mut out = Vec::new();
        for y in 0..g.height() as i32 {
            for x in 0..g.width() as i32 {
                if g.get_cell(x, y).is_some_and(|c| !c.is_off()) {
                    out.push((x, y));
                }
            }
        }
        out
    }

    #[test]
    fn test_center_shift() {
        let f = FontTable::builtin();
        assert_eq!(center_shift(f, "9:05", 27, 9), (4, 1));
        assert_eq!(center_shift(f, "9:05", 19, 7), (0, 0));
        assert_eq!(center_shift(f, "9:05", 10, 5), (0, 0));
    }

    #[test]
    fn test_place_ignores_grid_offsets() {
        let layer = TextLayer::new(FontTable::builtin());
        let mut g = grid(10, 7);
        layer.place(&mut g, "i", FG, 0, 0);
        // I is a 3 wide column with serifs; bottom row fully lit
        let cells = lit(&g);
        assert!(cells.contains(&(0, 0)));
        assert!(cells.contains(&(2, 0)));
        assert!(cells.contains(&(1, 3)));
        assert!(!cells.contains(&(0, 3)));
    }

    #[test]
    fn test_place_stops_at_right_edge() {
        let layer = TextLayer::new(FontTable::builtin());
        let mut g = grid(6, 7);
        // I occupies 0..3, gap at 3, second I would start at 4 and third at 8
        layer.place(&mut g, "III", FG, 0, 0);
        let cells = lit(&g);
        assert!(cells.contains(&(4, 0)));
        assert!(cells.iter().all(|&(x, _)| x < 6));
        let mut wide = grid(12, 7);
        layer.place(&mut wide, "III", FG, 0, 0);
        assert!(lit(&wide).contains(&(8, 0)));

        let mut narrow = grid(4, 7);
        layer.place(&mut narrow, "III", FG, 0, 0);
        assert!(lit(&narrow).iter().all(|&(x, _)| x < 3));
    }

    #[test]
    fn test_center_left_anchors_wide_text() {
        let layer = TextLayer::new(FontTable::builtin());
        let mut g = grid(8, 7);
        layer.center(&mut g, "MMMM", FG);
        assert!(lit(&g).contains(&(0, 0)));
    }

    #[test]
    fn test_center_time_string() {
        let layer = TextLayer::new(FontTable::builtin());
        let mut g = grid(27, 9);
        layer.center(&mut g, "9:05", FG);
        let cells = lit(&g);
        let min_x = cells.iter().map(|c| c.0).min().unwrap();
        let min_y = cells.iter().map(|c| c.1).min().unwrap();
        let max_y = cells.iter().map(|c| c.1).max().unwrap();
        assert_eq!(min_x, 4);
        assert_eq!((min_y, max_y), (1, 7));
    }

    #[test]
    fn test_scroll_frame_count_and_pacing() {
        let layer = TextLayer::new(FontTable::builtin());
        let clock = FakeClock::new();
        let mut g = grid(5, 7);
        let state = g.driver().state();
        let done = layer
            .scroll(&mut g, "i", FG, None, Duration::from_millis(100), &clock, None)
            .unwrap();
        assert_eq!(done, Completion::Finished);
        // strip = 5 pad + 3 glyph + 1 gap + 5 pad, windows = 14 - 5
        let s = state.lock().unwrap();
        assert_eq!(s.flush_count, 9);
        assert_eq!(clock.now(), Duration::from_millis(800));
        // first frame is still blank padding, the glyph enters on the right
        assert!(s.history[0].iter().all(|c| c.is_off()));
        assert!(s.history[1].iter().any(|c| !c.is_off()));
        // erased after the last flush
        assert!(g.pixels().iter().all(|c| c.is_off()));
    }

    #[test]
    fn test_scroll_stops_on_interrupt() {
        let layer = TextLayer::new(FontTable::builtin());
        let clock = FakeClock::new();
        let flag = AtomicBool::new(true);
        let mut g = grid(5, 7);
        let state = g.driver().state();
        let done = layer
            .scroll(&mut g, "hello", FG, Some(Color::rgb(1, 0, 0)), Duration::from_millis(100), &clock, Some(&flag))
            .unwrap();
        assert_eq!(done, Completion::Interrupted);
        let s = state.lock().unwrap();
        // one frame, then the cancel blanks and flushes
        assert_eq!(s.flush_count, 2);
        assert!(s.last_frame.iter().all(|c| c.is_off()));
    }

    #[test]
    fn test_flash_chars_timing() {
        let layer = TextLayer::new(FontTable::builtin());
        let clock = FakeClock::new();
        let mut g = grid(7, 7);
        let state = g.driver().state();
        let on = Duration::from_millis(250);
        let off = Duration::from_millis(100);
        let done = layer.flash_chars(&mut g, "ab", FG, on, off, &clock, None).unwrap();
        assert_eq!(done, Completion::Finished);
        assert_eq!(clock.now(), (on + off) * 2);
        let s = state.lock().unwrap();
        assert_eq!(s.flush_count, 4);
        assert!(s.history[0].iter().any(|c| !c.is_off()));
        assert!(s.history[1].iter().all(|c| c.is_off()));
    }

    #[test]
    fn test_flash_chars_interrupt_per_character() {
        let layer = TextLayer::new(FontTable::builtin());
        let clock = FakeClock::new();
        let flag = AtomicBool::new(false);
        let mut g = grid(7, 7);
        flag.store(true, Ordering::Relaxed);
        let done = layer
            .flash_chars(&mut g, "abc", FG, Duration::from_millis(1), Duration::from_millis(1), &clock, Some(&flag))
            .unwrap();
        assert_eq!(done, Completion::Interrupted);
        assert_eq!(clock.now(), Duration::from_millis(2));
    }
}
