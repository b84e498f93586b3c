/*
 *  clock.rs
 *
 *  tideclock - worth the wait
 *  (c) 2020-26 Stuart Hunter
 *
 *  The clock face - time tracking, wave scheduling and notifications
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

use log::{debug, error, info};

use crate::constants::*;
use crate::display::{Color, DisplayError, Grid, LedDriver};
use crate::effects::random_flash;
use crate::font::FontTable;
use crate::pacer::{interrupted, Completion};
use crate::palette::{color_by_name, lookup};
use crate::sources::{sync_with_retry, MonotonicClock, RandomSource, TimeSync, WallClock};
use crate::text::TextLayer;
use crate::timemask::TimeMask;
use crate::wave::{WaveAnimator, WaveColors, WaveParams, WaveStart};

/// "H:MM" as the face shows it.
///
/// In 12-hour mode hours past 24 and past 12 fold down and 0 reads as 12.
pub fn display_time_string(hour: u32, minute: u32, twelve_hour: bool) -> String {
    let mut h = hour as i64;
    if twelve_hour {
        if h > 24 {
            h -= 24;
        } else if h > 12 {
            h -= 12;
        } else if h <= 0 {
            h += 12;
        }
    }
    format!("{}:{:02}", h, minute)
}

/// Face colors, already scaled to the configured brightness
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceColors {
    pub foreground: Color,
    pub water: Color,
    pub foam: Color,
    pub sand: Color,
    /// Replaces the water on a surprise wave; the step count stays the same
    pub surprise: Color,
    pub notify_ok: Color,
    pub notify_error: Color,
}

impl FaceColors {
    fn scaled(max_value: u8) -> Self {
        let channels = |c: [u8; 3]| Color::from_channels(&c).scaled(max_value);
        Self {
            foreground: color_by_name(COLOR_FOREGROUND, max_value),
            water: channels(COLOR_WATER),
            foam: channels(COLOR_FOAM),
            sand: lookup(COLOR_SAND).unwrap_or(Color::OFF).scaled(max_value),
            surprise: color_by_name(COLOR_SURPRISE, max_value),
            notify_ok: color_by_name(COLOR_NOTIFY_OK, max_value),
            notify_error: color_by_name(COLOR_NOTIFY_ERROR, max_value),
        }
    }
}

/// Everything that shapes the face's behavior
#[derive(Debug, Clone, PartialEq)]
pub struct FaceSettings {
    pub colors: FaceColors,
    pub wave: WaveParams,
    /// From one wave start to the next
    pub wave_pause: Duration,
    pub surprise_every: u32,
    pub surprise_jitter: u32,
    pub resync_every: Duration,
    pub sync_attempts: u32,
    pub sync_backoff: Duration,
    /// Random sparkle before the first notification
    pub splash: bool,
    pub twelve_hour: bool,
    /// Scrolled once at start-up
    pub greeting: Option<String>,
}

impl Default for FaceSettings {
    fn default() -> Self {
        Self {
            colors: FaceColors::scaled(MAX_COLOR_VALUE),
            wave: WaveParams {
                radius_factor: WAVE_RADIUS_FACTOR,
                steps: WAVE_STEPS,
                min_height: WAVE_MIN_HEIGHT,
                step_pause_base: Duration::from_secs_f64(WAVE_STEP_PAUSE_BASE_SECS),
                x_start_min: WAVE_X_START_MIN,
                x_start_max: WAVE_X_START_MAX,
            },
            wave_pause: Duration::from_secs_f64(WAVE_PAUSE_SECS),
            surprise_every: WAVE_SURPRISE_EVERY,
            surprise_jitter: WAVE_SURPRISE_JITTER,
            resync_every: Duration::from_secs(RESYNC_SECS),
            sync_attempts: SYNC_ATTEMPTS,
            sync_backoff: Duration::from_secs_f64(SYNC_BACKOFF_SECS),
            splash: true,
            twelve_hour: true,
            greeting: None,
        }
    }
}

/// The outside world as the face sees it
pub struct Sources {
    pub wall: Box<dyn WallClock>,
    pub clock: Box<dyn MonotonicClock>,
    pub rng: Box<dyn RandomSource>,
    pub sync: Box<dyn TimeSync>,
}

/// The clock: owns the grid and decides when to redraw
pub struct ClockFace<D: LedDriver> {
    grid: Grid<D>,
    text: TextLayer<'static>,
    settings: FaceSettings,
    sources: Sources,

    mask: TimeMask,
    last_hm: Option<(u32, u32)>,
    last_wave: Option<Duration>,
    last_sync: Option<Duration>,
    full_pending: bool,
    wave_count: u32,
    time_ok: bool,
}

impl<D: LedDriver> ClockFace<D> {
    pub fn new(grid: Grid<D>, settings: FaceSettings, sources: Sources) -> Self {
        let font = FontTable::builtin();
        let mask = TimeMask::blank(font, grid.width());
        Self {
            grid,
            text: TextLayer::new(font),
            settings,
            sources,
            mask,
            last_hm: None,
            last_wave: None,
            last_sync: None,
            full_pending: true,
            wave_count: 0,
            time_ok: false,
        }
    }

    pub fn grid(&self) -> &Grid<D> {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut Grid<D> {
        &mut self.grid
    }

    pub fn mask(&self) -> &TimeMask {
        &self.mask
    }

    pub fn time_ok(&self) -> bool {
        self.time_ok
    }

    pub fn waves_run(&self) -> u32 {
        self.wave_count
    }

    pub fn into_grid(self) -> Grid<D> {
        self.grid
    }

    /// Show `text` one word at a time, centered, then go dark
    pub fn notify(&mut self, text: &str, color: Color) -> Result<(), DisplayError> {
        info!("notify: {}", text);
        for word in text.split_whitespace() {
            self.grid.clear(false)?;
            self.text.center(&mut self.grid, word, color);
            self.grid.flush()?;
            self.sources.clock.sleep(Duration::from_millis(NOTIFY_WORD_MS));
        }
        self.grid.off()
    }

    /// Power-on sequence: sparkle, announce, greet and fetch the time
    pub fn start(&mut self, interrupt: Option<&AtomicBool>) -> Result<(), DisplayError> {
        self.grid.init()?;

        if self.settings.splash {
            random_flash(
                &mut self.grid,
                self.sources.rng.as_mut(),
                SPLASH_MAX_VALUE,
                Some(SPLASH_FLASHES),
                true,
                self.sources.clock.as_ref(),
                interrupt,
            )?;
        }
        self.notify("reset", self.settings.colors.notify_error)?;

        if let Some(greeting) = self.settings.greeting.clone() {
            self.text.scroll(
                &mut self.grid,
                &greeting,
                self.settings.colors.foreground,
                None,
                Duration::from_millis(SCROLL_FRAME_MS),
                self.sources.clock.as_ref(),
                interrupt,
            )?;
        }

        self.sync_time(true)?;
        Ok(())
    }

    /// Ask the time source, optionally announcing progress on the grid
    pub fn sync_time(&mut self, announce: bool) -> Result<bool, DisplayError> {
        let colors = self.settings.colors;
        if announce {
            self.notify("get time", colors.notify_ok)?;
        }

        let result = sync_with_retry(
            self.sources.sync.as_mut(),
            self.settings.sync_attempts,
            self.settings.sync_backoff,
            self.sources.clock.as_ref(),
        );
        self.last_sync = Some(self.sources.clock.now());
        self.time_ok = match result {
            Ok(_) => true,
            Err(e) => {
                error!("{}", e);
                false
            }
        };

        if announce {
            if self.time_ok {
                self.notify("time okay", colors.notify_ok)?;
            } else {
                self.notify("time error", colors.notify_error)?;
            }
        }
        Ok(self.time_ok)
    }

    /// One pass of the outer loop.
    ///
    /// Re-syncs when due, rebuilds the mask when the minute changes and
    /// runs a wave when the pause since the last one has elapsed.
    pub fn tick(&mut self, interrupt: Option<&AtomicBool>) -> Result<Completion, DisplayError> {
        let mut now = self.sources.clock.now();
        let resync_due = self
            .last_sync
            .is_none_or(|t| now.saturating_sub(t) >= self.settings.resync_every);
        if resync_due {
            self.sync_time(false)?;
            now = self.sources.clock.now();
        }

        let wall = self.sources.wall.now();
        if self.last_hm != Some(wall.hm()) {
            let shown = display_time_string(wall.hour, wall.minute, self.settings.twelve_hour);
            info!("time change {:?} -> {}", self.last_hm, shown);
            self.mask = TimeMask::build(self.text.font(), &shown, self.grid.width());
            self.full_pending = true;
            self.last_hm = Some(wall.hm());
        }

        let mut completion = Completion::Finished;
        if self.last_wave.is_none_or(|t| now >= t.saturating_add(self.settings.wave_pause)) {
            completion = self.wave(interrupt)?;
            self.last_wave = Some(now);
            self.full_pending = false;
        }

        if !self.time_ok {
            // lower-right corner
            let x = self.grid.width() as i32;
            self.grid.set_pixel(x, 1, self.settings.colors.notify_error);
            self.grid.flush()?;
        }
        Ok(completion)
    }

    fn wave(&mut self, interrupt: Option<&AtomicBool>) -> Result<Completion, DisplayError> {
        self.wave_count += 1;
        let c = self.settings.colors;
        let surprise = self.wave_count % self.settings.surprise_every.max(1) == 0;

        let mut colors = WaveColors { land: c.foreground, water: c.water, foam: c.foam, sand: c.sand };
        let start = if surprise {
            colors.water = c.surprise;
            WaveStart::Full { jitter: self.settings.surprise_jitter.min(self.settings.wave.steps) }
        } else if self.full_pending {
            WaveStart::FULL
        } else {
            WaveStart::Random
        };
        debug!("wave #{} {:?}{}", self.wave_count, start, if surprise { " surprise" } else { "" });

        let run = WaveAnimator::new(&self.settings.wave, colors).run(
            &mut self.grid,
            &self.mask,
            start,
            self.sources.rng.as_mut(),
            self.sources.clock.as_ref(),
            interrupt,
        )?;
        Ok(run.completion)
    }

    /// Tick until `interrupt` is raised, then blank the grid
    pub fn run(&mut self, interrupt: &AtomicBool) -> Result<(), DisplayError> {
        info!("clock loop running");
        while !interrupted(Some(interrupt)) {
            if self.tick(Some(interrupt))?.is_interrupted() {
                debug!("wave cut short after {} waves", self.wave_count);
                break;
            }
            self.sources.clock.sleep(Duration::from_millis(LOOP_SLEEP_MS));
        }
        info!("clock loop stopped");
        self.grid.off()
    }
}
