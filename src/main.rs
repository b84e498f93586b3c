/*
 *  main.rs
 *
 *  tideclock - worth the wait
 *  (c) 2020-26 Stuart Hunter
 *
 *  Application entry: configuration, logging, driver selection and the
 *  clock loop
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

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use env_logger::Env;
use log::{info, warn};

use tideclock::clock::{ClockFace, Sources};
use tideclock::config::{self, DriverConfig};
use tideclock::constants::SYNC_MIN_YEAR;
use tideclock::display::drivers::{ConsoleDriver, NullDriver, StreamDriver};
use tideclock::display::{Grid, LedDriver};
use tideclock::effects::{chase_strip, random_flash};
use tideclock::sources::{SystemMonotonic, SystemRandom, SystemTimeCheck, SystemWallClock};

include!(concat!(env!("OUT_DIR"), "/build_info.rs"));

const CHASE_STEP: Duration = Duration::from_millis(20);
const TEST_FLASHES: u32 = 50;

fn main() -> anyhow::Result<()> {
    let (cli, cfg) = config::load().context("loading configuration")?;

    env_logger::Builder::from_env(Env::default().default_filter_or(cfg.log_level()))
        .format_timestamp_secs()
        .init();

    info!("This {} is worth the wait", env!("CARGO_PKG_NAME"));
    info!("v.{} built {}", env!("CARGO_PKG_VERSION"), BUILD_DATE);

    let grid_config = cfg.grid_config()?;
    let brightness = cfg.brightness();
    let driver: Box<dyn LedDriver> = match cfg.driver() {
        DriverConfig::Console => Box::new(
            ConsoleDriver::new(io::stdout(), grid_config.width, grid_config.height, grid_config.mode)
                .with_brightness_compensation(brightness),
        ),
        DriverConfig::Stream { path } => Box::new(
            StreamDriver::open(&path).with_context(|| format!("opening LED stream {}", path.display()))?,
        ),
        DriverConfig::Null => Box::new(NullDriver),
    };
    info!(
        "{}x{} grid, {:?} wiring, {} driver",
        grid_config.width,
        grid_config.height,
        grid_config.mode,
        driver.name()
    );
    let mut grid = Grid::new(grid_config, driver)?;

    let stop = Arc::new(AtomicBool::new(false));
    if let Some(secs) = cli.run_for {
        let flag = Arc::clone(&stop);
        thread::spawn(move || {
            thread::sleep(Duration::from_secs(secs));
            info!("run time of {}s reached", secs);
            flag.store(true, Ordering::SeqCst);
        });
    }

    if cli.test_strip {
        let clock = SystemMonotonic::new();
        grid.init()?;
        let chase = chase_strip(&mut grid, brightness, Some(1), CHASE_STEP, &clock, Some(&stop))?;
        if chase.is_interrupted() {
            warn!("strip test stopped during the chase");
            return Ok(());
        }
        random_flash(&mut grid, &mut SystemRandom, brightness, Some(TEST_FLASHES), false, &clock, Some(&stop))?;
        info!("strip test complete");
        return Ok(());
    }

    let settings = cfg.face_settings()?;
    let sources = Sources {
        wall: Box::new(SystemWallClock),
        clock: Box::new(SystemMonotonic::new()),
        rng: Box::new(SystemRandom),
        sync: Box::new(SystemTimeCheck::new(SystemWallClock, SYNC_MIN_YEAR)),
    };
    let mut face = ClockFace::new(grid, settings, sources);

    face.start(Some(&stop)).context("starting clock face")?;
    if !face.time_ok() {
        warn!("running without a trusted time source");
    }
    face.run(&stop).context("clock loop")?;

    info!("{} stopped", env!("CARGO_PKG_NAME"));
    Ok(())
}
