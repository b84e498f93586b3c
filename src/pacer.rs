/*
 *  pacer.rs
 *
 *  tideclock - worth the wait
 *  (c) 2020-26 Stuart Hunter
 *
 *  Frame and step pacing for the cooperative animation loops
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
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::sources::MonotonicClock;

/// How a cancellable operation ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Finished,
    Interrupted,
}

impl Completion {
    pub fn is_interrupted(self) -> bool {
        self == Completion::Interrupted
    }
}

/// Has the caller asked us to stop
#[inline]
pub fn interrupted(flag: Option<&AtomicBool>) -> bool {
    flag.is_some_and(|f| f.load(Ordering::Relaxed))
}

/// Fixed frame interval, measured from one frame start to the next
pub struct Pacer {
    next_deadline: Option<Duration>,
    frame: Duration,
}

impl Pacer {
    pub fn new(frame: Duration) -> Self {
        Self { next_deadline: None, frame }
    }

    /// Block until the next frame is due, then schedule the one after
    pub fn wait(&mut self, clock: &dyn MonotonicClock) {
        if let Some(deadline) = self.next_deadline {
            sleep_until(clock, deadline);
        }
        self.next_deadline = Some(clock.now().saturating_add(self.frame));
    }
}

/// Quadratic step pacing: after step `k` the next step may not start for
/// `base * k^2`, so motion eases out towards the middle of a run and back in.
pub struct StepPacer {
    base: Duration,
    wait_until: Duration,
}

impl StepPacer {
    pub fn new(base: Duration) -> Self {
        Self { base, wait_until: Duration::ZERO }
    }

    pub fn pause_for(&self, key: i64) -> Duration {
        let k = key.unsigned_abs().min(u64::from(u16::MAX)) as u32;
        self.base.checked_mul(k * k).unwrap_or(Duration::MAX)
    }

    /// Wait out the previous step's deadline, then set this step's
    pub fn wait(&mut self, key: i64, clock: &dyn MonotonicClock) {
        sleep_until(clock, self.wait_until);
        self.wait_until = clock.now().saturating_add(self.pause_for(key));
    }
}

fn sleep_until(clock: &dyn MonotonicClock, deadline: Duration) {
    let now = clock.now();
    if now < deadline {
        clock.sleep(deadline - now);
    }
}
