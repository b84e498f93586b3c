/*
 *  wave.rs
 *
 *  tideclock - worth the wait
 *  (c) 2020-26 Stuart Hunter
 *
 *  The wave: a rising and receding circular front that uncovers the time
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

//! The front is the top arc of a large circle whose center starts below
//! the grid. Each run moves the center up one row per step (Rising), holds
//! for one step (Peak), then drops back one row per step past where it
//! started (Falling). The center also drifts sideways the whole time.
//!
//! ```text
//!   Rising   foam on the front, water under it
//!   Peak     as Rising, and the two rows above the front resolve
//!            against the time mask (digits in land color, rest sand)
//!   Falling  as Peak; the leftmost 4 columns resolve a third row
//! ```

use std::sync::atomic::AtomicBool;
use std::time::Duration;

use log::{debug, trace};

use crate::display::{Color, DisplayError, Grid, LedDriver};
use crate::pacer::{interrupted, Completion, StepPacer};
use crate::sources::{MonotonicClock, RandomSource};
use crate::timemask::TimeMask;

/// Columns at the left edge that get the extra seam row while Falling
const SEAM_COLUMNS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Rising,
    Peak,
    Falling,
    Done,
}

/// Shape and timing of every wave
#[derive(Debug, Clone, PartialEq)]
pub struct WaveParams {
    /// Circle radius as a multiple of grid width
    pub radius_factor: f64,
    /// Rising steps per run (N); a run is 2N+2 frames
    pub steps: u32,
    /// Lowest crest, as steps below the top, for a random start
    pub min_height: u32,
    /// Pause after step k is `step_pause_base * k^2`
    pub step_pause_base: Duration,
    /// Random start center x range, inclusive
    pub x_start_min: i32,
    pub x_start_max: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaveColors {
    /// Time digits
    pub land: Color,
    pub water: Color,
    pub foam: Color,
    /// Everything that is not a digit once the water recedes
    pub sand: Color,
}

/// Where the circle starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaveStart {
    /// Random depth and horizontal position
    Random,
    /// Centered, crest reaching the top of the grid, raised by up to
    /// `jitter` rows at random
    Full { jitter: u32 },
}

impl WaveStart {
    pub const FULL: WaveStart = WaveStart::Full { jitter: 0 };
}

/// `round(sqrt(|r^2 - (x - cx)^2|) + cy)`, half to even.
///
/// The absolute value keeps columns outside the circle defined instead of
/// producing NaN.
pub fn wavefront_row(x: f64, cx: f64, cy: f64, r: f64) -> i64 {
    let d = x - cx;
    ((r * r - d * d).abs().sqrt() + cy).round_ties_even() as i64
}

/// Geometry of one run; created per wave and dropped when Done
#[derive(Debug, Clone, PartialEq)]
pub struct WaveState {
    pub phase: Phase,
    /// Rising 0..N, Peak N-1, Falling N-1 down to -1
    pub step: i64,
    pub cx: f64,
    pub cy: f64,
    pub radius: f64,
    /// cx change per step
    pub drift: f64,
    steps: i64,
}

impl WaveState {
    pub fn new(params: &WaveParams, width: usize, start: WaveStart, rng: &mut dyn RandomSource) -> Self {
        let steps = i64::from(params.steps.max(1));
        let radius = width as f64 * params.radius_factor;
        let (cx, cy) = match start {
            WaveStart::Full { jitter } => {
                let lift = if jitter > 0 { rng.random_int(jitter) } else { 0 };
                (width as f64 / 2.0, -radius - f64::from(lift))
            }
            WaveStart::Random => {
                let depth = rng.random_int(params.steps.saturating_sub(params.min_height));
                let span = params.x_start_max.saturating_sub(params.x_start_min).max(0) as u32;
                let cx = params.x_start_min as f64 + f64::from(rng.random_int(span));
                (cx, -radius - f64::from(depth))
            }
        };
        let end_x = width as f64 - cx;
        let drift = (end_x - cx) / (2 * steps + 1) as f64;
        Self { phase: Phase::Rising, step: 0, cx, cy, radius, drift, steps }
    }

    /// Pacing key of the step about to run
    pub fn pace_key(&self) -> i64 {
        self.step
    }

    /// Move the circle for the next step and report which phase it belongs to
    pub fn advance(&mut self) -> Option<Phase> {
        let phase = self.phase;
        match phase {
            Phase::Rising => {
                self.cy += 1.0;
                self.cx += self.drift;
                self.step += 1;
                if self.step == self.steps {
                    self.phase = Phase::Peak;
                    self.step = self.steps - 1;
                }
            }
            Phase::Peak => {
                self.cx += self.drift;
                self.phase = Phase::Falling;
            }
            Phase::Falling => {
                self.cy -= 1.0;
                self.cx += self.drift;
                self.step -= 1;
                if self.step < -1 {
                    self.phase = Phase::Done;
                }
            }
            Phase::Done => return None,
        }
        Some(phase)
    }

    pub fn row_at(&self, x: usize) -> i64 {
        wavefront_row(x as f64, self.cx, self.cy, self.radius)
    }
}

/// Frames emitted and how the run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaveRun {
    pub completion: Completion,
    pub frames: usize,
}

/// Runs waves over a grid with one set of colors
pub struct WaveAnimator<'a> {
    params: &'a WaveParams,
    colors: WaveColors,
}

impl<'a> WaveAnimator<'a> {
    pub fn new(params: &'a WaveParams, colors: WaveColors) -> Self {
        Self { params, colors }
    }

    /// One complete run, Rising through Falling.
    ///
    /// Flush failures abort the run. With no interrupt flag every run is
    /// exactly 2N+2 frames; with one, the flag is checked after each flush.
    pub fn run<D: LedDriver>(
        &self,
        grid: &mut Grid<D>,
        mask: &TimeMask,
        start: WaveStart,
        rng: &mut dyn RandomSource,
        clock: &dyn MonotonicClock,
        interrupt: Option<&AtomicBool>,
    ) -> Result<WaveRun, DisplayError> {
        let mut state = WaveState::new(self.params, grid.width(), start, rng);
        let mut pacer = StepPacer::new(self.params.step_pause_base);
        let mut frames = 0;
        let mut last_phase = state.phase;
        debug!(
            "wave {:?} r={:.1} c=({:.2},{:.2}) drift={:.3}",
            start, state.radius, state.cx, state.cy, state.drift
        );

        while state.phase != Phase::Done {
            pacer.wait(state.pace_key(), clock);
            let Some(phase) = state.advance() else { break };
            if phase != last_phase {
                trace!("wave {:?} -> {:?} at cy {:.2}", last_phase, phase, state.cy);
                last_phase = phase;
            }

            self.paint(grid, mask, &state, phase);
            grid.flush()?;
            frames += 1;

            if interrupted(interrupt) {
                debug!("wave interrupted after {} frames", frames);
                grid.off()?;
                return Ok(WaveRun { completion: Completion::Interrupted, frames });
            }
        }
        Ok(WaveRun { completion: Completion::Finished, frames })
    }

    fn paint<D: LedDriver>(&self, grid: &mut Grid<D>, mask: &TimeMask, state: &WaveState, phase: Phase) {
        let (width, height) = (grid.width(), grid.height());
        let in_range = |y: i64| y >= 0 && y < height as i64;
        let c = self.colors;

        for x in 0..width {
            let y = state.row_at(x);

            // Rising and Peak only draw once the front has reached the grid
            if phase != Phase::Falling && y < 0 {
                continue;
            }

            if in_range(y) {
                grid.set_pixel_fast(x, y as usize, c.foam);
            }
            for below in [y - 1, y - 2] {
                if in_range(below) {
                    grid.set_pixel_fast(x, below as usize, c.water);
                }
            }
            if phase == Phase::Rising {
                continue;
            }

            if phase == Phase::Falling && x < SEAM_COLUMNS {
                self.resolve(grid, mask, x, y + 3);
            }
            for above in [y + 1, y + 2] {
                self.resolve(grid, mask, x, above);
            }
        }
    }

    /// Land where the mask is set, sand elsewhere
    fn resolve<D: LedDriver>(&self, grid: &mut Grid<D>, mask: &TimeMask, x: usize, y: i64) {
        let height = grid.height();
        if y < 0 || y >= height as i64 {
            return;
        }
        let color = if mask.at_grid(x, y, height) { self.colors.land } else { self.colors.sand };
        grid.set_pixel_fast(x, y as usize, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::drivers::MockDriver;
    use crate::display::GridConfig;
    use crate::font::FontTable;
    use crate::sources::{FakeClock, ScriptedRandom};
    use std::sync::atomic::Ordering;

    fn params(steps: u32) -> WaveParams {
        WaveParams {
            radius_factor: 1.6,
            steps,
            min_height: 3,
            step_pause_base: Duration::from_millis(1),
            x_start_min: -10,
            x_start_max: 7,
        }
    }

    fn colors() -> WaveColors {
        WaveColors {
            land: Color::rgb(0, 0, 8),
            water: Color::rgb(0, 0, 4),
            foam: Color::rgb(4, 4, 8),
            sand: Color::OFF,
        }
    }

    #[test]
    fn test_wavefront_outside_circle_is_defined() {
        // |x - cx| > r would be a negative radicand
        let row = wavefront_row(100.0, 0.0, -5.0, 10.0);
        assert_eq!(row, ((100.0f64 * 100.0 - 100.0).sqrt() - 5.0).round() as i64);
        assert_eq!(wavefront_row(0.0, 0.0, -43.2, 43.2), 0);
        // half rounds to even
        assert_eq!(wavefront_row(0.0, 0.0, -0.5, 3.0), 2);
        assert_eq!(wavefront_row(0.0, 0.0, 0.5, 3.0), 4);
    }

    #[test]
    fn test_state_phase_sequence() {
        let mut rng = ScriptedRandom::new(vec![0]);
        let mut s = WaveState::new(&params(3), 27, WaveStart::FULL, &mut rng);
        let cy0 = s.cy;
        let mut phases = Vec::new();
        let mut keys = Vec::new();
        loop {
            keys.push(s.pace_key());
            match s.advance() {
                Some(p) => phases.push(p),
                None => break,
            }
        }
        use Phase::*;
        assert_eq!(phases, vec![Rising, Rising, Rising, Peak, Falling, Falling, Falling, Falling]);
        assert_eq!(keys[..8], [0, 1, 2, 2, 2, 1, 0, -1]);
        assert!((s.cy - (cy0 - 1.0)).abs() < 1e-9);
        assert_eq!(s.phase, Done);
    }

    #[test]
    fn test_full_start_is_centered_and_still() {
        let mut rng = ScriptedRandom::new(vec![4]);
        let s = WaveState::new(&params(15), 27, WaveStart::FULL, &mut rng);
        assert_eq!(s.cx, 13.5);
        assert_eq!(s.cy, -27.0 * 1.6);
        assert_eq!(s.drift, 0.0);

        let s = WaveState::new(&params(15), 27, WaveStart::Full { jitter: 5 }, &mut rng);
        assert_eq!(s.cy, -27.0 * 1.6 - 4.0);
    }

    #[test]
    fn test_random_start_uses_configured_range() {
        // depth draw, then x draw
        let mut rng = ScriptedRandom::new(vec![12, 17]);
        let s = WaveState::new(&params(15), 27, WaveStart::Random, &mut rng);
        assert_eq!(s.cy, -27.0 * 1.6 - 12.0);
        assert_eq!(s.cx, 7.0);
        assert!((s.drift - (20.0 - 7.0) / 31.0).abs() < 1e-12);
    }

    #[test]
    fn test_run_frame_accounting() {
        let mask = TimeMask::build(FontTable::builtin(), "9:05", 27);
        for n in [1u32, 2, 5, 15] {
            let clock = FakeClock::new();
            let mut rng = ScriptedRandom::new(vec![0]);
            let mut g = Grid::new(GridConfig::new(27, 9), MockDriver::new()).unwrap();
            let state = g.driver().state();
            let p = params(n);
            let run = WaveAnimator::new(&p, colors())
                .run(&mut g, &mask, WaveStart::Random, &mut rng, &clock, None)
                .unwrap();
            let expected = (2 * n + 2) as usize;
            assert_eq!(run, WaveRun { completion: Completion::Finished, frames: expected });
            assert_eq!(state.lock().unwrap().flush_count, expected);
        }
    }

    #[test]
    fn test_run_pacing() {
        let mask = TimeMask::blank(FontTable::builtin(), 27);
        let clock = FakeClock::new();
        let mut rng = ScriptedRandom::new(vec![0]);
        let mut g = Grid::new(GridConfig::new(27, 9), MockDriver::new()).unwrap();
        let p = params(2);
        WaveAnimator::new(&p, colors())
            .run(&mut g, &mask, WaveStart::FULL, &mut rng, &clock, None)
            .unwrap();
        // pauses after keys 0,1,1,1,0 precede the last of six steps
        assert_eq!(clock.now(), Duration::from_millis(3));
    }

    #[test]
    fn test_full_wave_reveals_time() {
        let mask = TimeMask::build(FontTable::builtin(), "9:05", 27);
        let clock = FakeClock::new();
        let mut rng = ScriptedRandom::new(vec![0]);
        let mut g = Grid::new(GridConfig::new(27, 9).with_offsets(-1, -1), MockDriver::new()).unwrap();
        let p = params(15);
        WaveAnimator::new(&p, colors())
            .run(&mut g, &mask, WaveStart::FULL, &mut rng, &clock, None)
            .unwrap();
        for y in 0..9 {
            for x in 0..27 {
                let want = if mask.get(x, y) { colors().land } else { colors().sand };
                assert_eq!(g.get_cell(x as i32, y as i32), Some(want), "cell ({},{})", x, y);
            }
        }
    }

    #[test]
    fn test_run_interrupt_checked_per_step() {
        let mask = TimeMask::blank(FontTable::builtin(), 27);
        let clock = FakeClock::new();
        let flag = AtomicBool::new(false);
        let mut rng = ScriptedRandom::new(vec![0]);
        let mut g = Grid::new(GridConfig::new(27, 9), MockDriver::new()).unwrap();
        flag.store(true, Ordering::Relaxed);
        let p = params(15);
        let run = WaveAnimator::new(&p, colors())
            .run(&mut g, &mask, WaveStart::FULL, &mut rng, &clock, Some(&flag))
            .unwrap();
        assert_eq!(run, WaveRun { completion: Completion::Interrupted, frames: 1 });
        assert!(g.pixels().iter().all(|c| c.is_off()));
    }

    #[test]
    fn test_flush_failure_aborts_run() {
        let mask = TimeMask::blank(FontTable::builtin(), 27);
        let clock = FakeClock::new();
        let mut rng = ScriptedRandom::new(vec![0]);
        let mut g = Grid::new(GridConfig::new(27, 9), MockDriver::new()).unwrap();
        g.driver().state().lock().unwrap().simulate_flush_failure = true;
        let p = params(3);
        assert!(WaveAnimator::new(&p, colors())
            .run(&mut g, &mask, WaveStart::FULL, &mut rng, &clock, None)
            .is_err());
    }
}
