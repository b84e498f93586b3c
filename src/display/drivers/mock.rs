/*
 *  display/drivers/mock.rs
 *
 *  tideclock - worth the wait
 *  (c) 2020-26 Stuart Hunter
 *
 *  Mock LED driver for testing without hardware
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

use std::sync::{Arc, Mutex, MutexGuard};

/// Mock LED driver for testing
///
/// Records every frame handed to it instead of lighting anything. The
/// recorded state lives behind an `Arc<Mutex<_>>` so a test can keep a
/// handle after the driver has been moved into a grid.
#[derive(Debug, Clone, Default)]
pub struct MockDriver {
    state: Arc<Mutex<MockDriverState>>,
}

/// Internal state for the mock driver (shared for inspection in tests)
#[derive(Debug, Default)]
pub struct MockDriverState {
    /// Number of times init() was called
    pub init_count: usize,

    /// Number of frames successfully written
    pub flush_count: usize,

    /// The most recent frame, physical order
    pub last_frame: Vec<Color>,

    /// Depth the most recent frame was written at
    pub last_depth: Option<ColorDepth>,

    /// Every frame, when `keep_history` is set
    pub history: Vec<Vec<Color>>,
    pub keep_history: bool,

    /// Simulate failures (for error testing)
    pub simulate_flush_failure: bool,
    pub simulate_init_failure: bool,
}

impl MockDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// A mock that keeps a copy of every frame
    pub fn with_history() -> Self {
        let driver = Self::default();
        driver.lock().keep_history = true;
        driver
    }

    /// Get reference to state for inspection in tests
    pub fn state(&self) -> Arc<Mutex<MockDriverState>> {
        Arc::clone(&self.state)
    }

    /// Reset state counters (useful between tests)
    pub fn reset_state(&mut self) {
        let mut state = self.lock();
        let keep_history = state.keep_history;
        *state = MockDriverState { keep_history, ..Default::default() };
    }

    /// Lit LEDs in the last frame
    pub fn count_lit(&self) -> usize {
        self.lock().last_frame.iter().filter(|c| !c.is_off()).count()
    }

    fn lock(&self) -> MutexGuard<'_, MockDriverState> {
        // a panicking test thread must not hide the frames it already wrote
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl LedDriver for MockDriver {
    fn name(&self) -> &str {
        "mock"
    }

    fn init(&mut self) -> Result<(), DisplayError> {
        let mut state = self.lock();

        if state.simulate_init_failure {
            return Err(DisplayError::DriverFailure("Simulated init failure".to_string()));
        }

        state.init_count += 1;
        Ok(())
    }

    fn write_frame(&mut self, frame: &[Color], depth: ColorDepth) -> Result<(), DisplayError> {
        let mut state = self.lock();

        if state.simulate_flush_failure {
            return Err(DisplayError::DriverFailure("Simulated flush failure".to_string()));
        }

        state.flush_count += 1;
        state.last_depth = Some(depth);
        state.last_frame.clear();
        state.last_frame.extend_from_slice(frame);
        if state.keep_history {
            state.history.push(frame.to_vec());
        }
        Ok(())
    }
}
