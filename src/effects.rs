/*
 *  effects.rs
 *
 *  tideclock - worth the wait
 *  (c) 2020-26 Stuart Hunter
 *
 *  Strip diagnostics - color chase and random sparkle
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

use log::{debug, info};

use crate::display::{Color, DisplayError, Grid, LedDriver};
use crate::pacer::{interrupted, Completion};
use crate::palette::{random_color, ColorCycle};
use crate::sources::{MonotonicClock, RandomSource};

/// Sparkle hold time when running fast
const FAST_HOLD: Duration = Duration::from_millis(50);

/// Walk one lit LED up the whole strip, once per palette color.
///
/// Follows physical order so wiring faults show up as jumps. `loops` of
/// `None` runs until interrupted. The grid is left off.
pub fn chase_strip<D: LedDriver>(
    grid: &mut Grid<D>,
    max_value: u8,
    loops: Option<u32>,
    step_delay: Duration,
    clock: &dyn MonotonicClock,
    interrupt: Option<&AtomicBool>,
) -> Result<Completion, DisplayError> {
    grid.off()?;
    let count = grid.pixels().len();
    info!("chase test over {} leds", count);

    let mut passes = 0u32;
    let mut completion = Completion::Finished;
    for color in ColorCycle::new(max_value) {
        grid.clear(false)?;
        for i in 0..count {
            let previous = if i == 0 { count - 1 } else { i - 1 };
            grid.set_index(previous, Color::OFF);
            grid.set_index(i, color);
            grid.flush()?;
            clock.sleep(step_delay);
        }
        passes += 1;
        if loops.is_some_and(|n| passes >= n) {
            break;
        }
        if interrupted(interrupt) {
            completion = Completion::Interrupted;
            break;
        }
    }

    debug!("chase test done after {} passes", passes);
    grid.off()?;
    Ok(completion)
}

/// Flash random LEDs in random colors.
///
/// Each flash lights one LED, holds, and turns it off again. When `fast`
/// the hold is fixed and there is no gap; otherwise both are random.
pub fn random_flash<D: LedDriver>(
    grid: &mut Grid<D>,
    rng: &mut dyn RandomSource,
    max_value: u8,
    loops: Option<u32>,
    fast: bool,
    clock: &dyn MonotonicClock,
    interrupt: Option<&AtomicBool>,
) -> Result<Completion, DisplayError> {
    grid.off()?;
    let last = grid.pixels().len().saturating_sub(1) as u32;

    let mut flashes = 0u32;
    let mut completion = Completion::Finished;
    loop {
        let index = rng.random_int(last) as usize;
        let color = random_color(rng, max_value, false);

        grid.set_index(index, color);
        grid.flush()?;
        if fast {
            clock.sleep(FAST_HOLD);
        } else {
            clock.sleep(centis(rng.random_int(25)));
        }

        grid.set_index(index, Color::OFF);
        grid.flush()?;
        if !fast {
            clock.sleep(centis(rng.random_int(50)));
        }

        flashes += 1;
        if loops.is_some_and(|n| flashes >= n) {
            break;
        }
        if interrupted(interrupt) {
            completion = Completion::Interrupted;
            break;
        }
    }

    grid.off()?;
    Ok(completion)
}

fn centis(n: u32) -> Duration {
    Duration::from_millis(u64::from(n) * 10)
}
