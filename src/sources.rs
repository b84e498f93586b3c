/*
 *  sources.rs
 *
 *  tideclock - worth the wait
 *  (c) 2020-26 Stuart Hunter
 *
 *  Time, randomness and time-sync collaborators
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

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use chrono::{Datelike, Local, Timelike};
use log::{debug, info, warn};
use rand::Rng;
use thiserror::Error;

/// Monotonic time for pacing; never used for the calendar
pub trait MonotonicClock {
    /// Time since an arbitrary fixed origin
    fn now(&self) -> Duration;
    fn sleep(&self, d: Duration);
}

/// Calendar time as the clock face shows it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WallTime {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

impl WallTime {
    pub fn hm(&self) -> (u32, u32) {
        (self.hour, self.minute)
    }
}

pub trait WallClock {
    fn now(&self) -> WallTime;
}

pub trait RandomSource {
    /// Uniform over `[0, max_inclusive]`
    fn random_int(&mut self, max_inclusive: u32) -> u32;
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("clock not set (year {year})")]
    ClockNotSet { year: i32 },
    #[error("time source unavailable: {0}")]
    Unavailable(String),
    #[error("time sync failed after {attempts} attempts")]
    Exhausted { attempts: u32 },
}

/// Anything that can vouch for the wall clock
pub trait TimeSync {
    fn sync(&mut self) -> Result<WallTime, SyncError>;
}

/// Bounded retry around a [`TimeSync`]; sleeps `backoff` between failures
pub fn sync_with_retry(
    sync: &mut dyn TimeSync,
    attempts: u32,
    backoff: Duration,
    clock: &dyn MonotonicClock,
) -> Result<WallTime, SyncError> {
    for attempt in 1..=attempts {
        match sync.sync() {
            Ok(t) => {
                info!("time sync ok on attempt {}: {:04}-{:02}-{:02} {:02}:{:02}:{:02}",
                    attempt, t.year, t.month, t.day, t.hour, t.minute, t.second);
                return Ok(t);
            }
            Err(e) => {
                warn!("time sync attempt {}/{}: {}", attempt, attempts, e);
                if attempt < attempts {
                    clock.sleep(backoff);
                }
            }
        }
    }
    Err(SyncError::Exhausted { attempts })
}

/// `Instant` based monotonic clock
#[derive(Debug, Clone, Copy)]
pub struct SystemMonotonic {
    origin: Instant,
}

impl SystemMonotonic {
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Default for SystemMonotonic {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock for SystemMonotonic {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep(&self, d: Duration) {
        std::thread::sleep(d);
    }
}

/// Local time from the OS
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemWallClock;

impl WallClock for SystemWallClock {
    fn now(&self) -> WallTime {
        let t = Local::now();
        WallTime {
            year: t.year(),
            month: t.month(),
            day: t.day(),
            hour: t.hour(),
            minute: t.minute(),
            second: t.second(),
        }
    }
}

/// Thread-local generator from `rand`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRandom;

impl RandomSource for SystemRandom {
    fn random_int(&mut self, max_inclusive: u32) -> u32 {
        rand::rng().random_range(0..=max_inclusive)
    }
}

/// Trusts the OS clock once it reads a plausible year.
///
/// NTP (or an RTC) is expected to have set the system time; a board that
/// booted without either reports 1970 and is refused.
pub struct SystemTimeCheck<W: WallClock> {
    clock: W,
    min_year: i32,
}

impl<W: WallClock> SystemTimeCheck<W> {
    pub fn new(clock: W, min_year: i32) -> Self {
        Self { clock, min_year }
    }
}

impl<W: WallClock> TimeSync for SystemTimeCheck<W> {
    fn sync(&mut self) -> Result<WallTime, SyncError> {
        let t = self.clock.now();
        debug!("system clock reads year {}", t.year);
        if t.year < self.min_year {
            return Err(SyncError::ClockNotSet { year: t.year });
        }
        Ok(t)
    }
}

/// Virtual monotonic time; `sleep` advances it instantly.
///
/// Clones share the same time line so a test can keep a handle.
#[derive(Debug, Clone, Default)]
pub struct FakeClock {
    now: Arc<Mutex<Duration>>,
}

impl FakeClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, d: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|p| p.into_inner());
        *now = now.saturating_add(d);
    }
}

impl MonotonicClock for FakeClock {
    fn now(&self) -> Duration {
        *self.now.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn sleep(&self, d: Duration) {
        self.advance(d);
    }
}

/// Wall clock a test can set
#[derive(Debug, Clone, Default)]
pub struct FixedWallClock {
    time: Arc<Mutex<WallTime>>,
}

impl FixedWallClock {
    pub fn new(time: WallTime) -> Self {
        Self { time: Arc::new(Mutex::new(time)) }
    }

    pub fn set(&self, time: WallTime) {
        *self.time.lock().unwrap_or_else(|p| p.into_inner()) = time;
    }
}

impl WallClock for FixedWallClock {
    fn now(&self) -> WallTime {
        *self.time.lock().unwrap_or_else(|p| p.into_inner())
    }
}

/// Replays a fixed script of values, clamped to the requested maximum
#[derive(Debug, Clone)]
pub struct ScriptedRandom {
    script: Vec<u32>,
    next: usize,
}

impl ScriptedRandom {
    pub fn new(script: Vec<u32>) -> Self {
        Self { script, next: 0 }
    }
}

impl RandomSource for ScriptedRandom {
    fn random_int(&mut self, max_inclusive: u32) -> u32 {
        if self.script.is_empty() {
            return 0;
        }
        let v = self.script[self.next % self.script.len()];
        self.next += 1;
        v.min(max_inclusive)
    }
}

/// Canned sync results, for exercising the retry policy
pub struct ScriptedSync {
    results: Vec<Result<WallTime, SyncError>>,
    pub calls: u32,
}

impl ScriptedSync {
    /// Results are handed out in order; once used up every call fails
    pub fn new(results: Vec<Result<WallTime, SyncError>>) -> Self {
        let mut results = results;
        results.reverse();
        Self { results, calls: 0 }
    }
}

impl TimeSync for ScriptedSync {
    fn sync(&mut self) -> Result<WallTime, SyncError> {
        self.calls += 1;
        self.results
            .pop()
            .unwrap_or_else(|| Err(SyncError::Unavailable("script exhausted".to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn when(year: i32) -> WallTime {
        WallTime { year, month: 6, day: 1, hour: 9, minute: 5, second: 0 }
    }

    #[test]
    fn test_fake_clock_sleep_advances() {
        let clock = FakeClock::new();
        let handle = clock.clone();
        clock.sleep(Duration::from_millis(250));
        assert_eq!(handle.now(), Duration::from_millis(250));
    }

    #[test]
    fn test_scripted_random_clamps_and_cycles() {
        let mut r = ScriptedRandom::new(vec![3, 9]);
        assert_eq!(r.random_int(5), 3);
        assert_eq!(r.random_int(5), 5);
        assert_eq!(r.random_int(10), 3);
    }

    #[test]
    fn test_system_random_in_range() {
        let mut r = SystemRandom;
        for _ in 0..100 {
            assert!(r.random_int(4) <= 4);
        }
        assert_eq!(r.random_int(0), 0);
    }

    #[test]
    fn test_system_time_check_refuses_unset_clock() {
        let mut s = SystemTimeCheck::new(FixedWallClock::new(when(1970)), 2020);
        assert!(matches!(s.sync(), Err(SyncError::ClockNotSet { year: 1970 })));
        let mut s = SystemTimeCheck::new(FixedWallClock::new(when(2026)), 2020);
        assert_eq!(s.sync().unwrap().year, 2026);
    }

    #[test]
    fn test_retry_succeeds_after_failures() {
        let clock = FakeClock::new();
        let mut sync = ScriptedSync::new(vec![
            Err(SyncError::Unavailable("down".into())),
            Err(SyncError::Unavailable("down".into())),
            Ok(when(2026)),
        ]);
        let t = sync_with_retry(&mut sync, 10, Duration::from_secs(3), &clock).unwrap();
        assert_eq!(t.year, 2026);
        assert_eq!(sync.calls, 3);
        assert_eq!(clock.now(), Duration::from_secs(6));
    }

    #[test]
    fn test_retry_is_bounded() {
        let clock = FakeClock::new();
        let mut sync = ScriptedSync::new(vec![]);
        let err = sync_with_retry(&mut sync, 4, Duration::from_secs(3), &clock).unwrap_err();
        assert!(matches!(err, SyncError::Exhausted { attempts: 4 }));
        assert_eq!(sync.calls, 4);
        // no sleep after the final attempt
        assert_eq!(clock.now(), Duration::from_secs(9));
    }
}
