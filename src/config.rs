/*
 *  config.rs
 *
 *  tideclock - worth the wait
 *  (c) 2020-26 Stuart Hunter
 *
 *  YAML configuration layered with command line overrides
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

use clap::{ArgAction, Parser, ValueHint};
use dirs_next::home_dir;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use std::{fs, path::{Path, PathBuf}};
use thiserror::Error;

use crate::clock::{FaceColors, FaceSettings};
use crate::constants::*;
use crate::display::{Color, ColorDepth, GridConfig, WiringMode};
use crate::palette::ColorSpec;
use crate::wave::WaveParams;

/// Error type for config loading/validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Unknown color: {0}")]
    UnknownColor(String),
}

/// Top-level app configuration. Every leaf is optional so a file only
/// needs to carry what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub log_level: Option<String>,
    pub grid: Option<GridSection>,
    pub colors: Option<ColorSection>,
    pub wave: Option<WaveSection>,
    pub clock: Option<ClockSection>,
    pub driver: Option<DriverConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct GridSection {
    pub width: Option<usize>,
    pub height: Option<usize>,
    pub color_depth: Option<ColorDepth>, // 3 or 4
    pub wiring: Option<WiringMode>,
    pub x_offset: Option<i32>,
    pub y_offset: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ColorSection {
    /// Channel ceiling every color is scaled to (0-255)
    pub brightness: Option<u8>,
    pub foreground: Option<ColorSpec>,
    pub water: Option<ColorSpec>,
    pub foam: Option<ColorSpec>,
    pub sand: Option<ColorSpec>,
    pub surprise: Option<ColorSpec>,
    pub notify_ok: Option<ColorSpec>,
    pub notify_error: Option<ColorSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct WaveSection {
    pub pause_secs: Option<f64>,
    pub surprise_every: Option<u32>,
    pub surprise_jitter: Option<u32>,
    pub radius_factor: Option<f64>,
    pub steps: Option<u32>,
    pub min_height: Option<u32>,
    pub step_pause_base_secs: Option<f64>,
    pub x_start_min: Option<i32>,
    pub x_start_max: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ClockSection {
    pub resync_secs: Option<u64>,
    pub sync_attempts: Option<u32>,
    pub sync_backoff_secs: Option<f64>,
    pub splash: Option<bool>,
    pub twelve_hour: Option<bool>,
    pub greeting: Option<String>,
}

/// Where frames go
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DriverConfig {
    /// ANSI true-color blocks on stdout
    Console,
    /// Packed channel bytes to a file, FIFO or serial device
    Stream { path: PathBuf },
    /// Frames are dropped
    Null,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: Some("info".into()),
            grid: Some(GridSection {
                width: Some(GRID_WIDTH),
                height: Some(GRID_HEIGHT),
                color_depth: Some(ColorDepth::Rgb),
                wiring: Some(WiringMode::RowSerpentine),
                x_offset: Some(GRID_X_OFFSET),
                y_offset: Some(GRID_Y_OFFSET),
            }),
            colors: Some(ColorSection {
                brightness: Some(MAX_COLOR_VALUE),
                foreground: Some(COLOR_FOREGROUND.into()),
                water: Some(ColorSpec::Channels(COLOR_WATER.to_vec())),
                foam: Some(ColorSpec::Channels(COLOR_FOAM.to_vec())),
                sand: Some(COLOR_SAND.into()),
                surprise: Some(COLOR_SURPRISE.into()),
                notify_ok: Some(COLOR_NOTIFY_OK.into()),
                notify_error: Some(COLOR_NOTIFY_ERROR.into()),
            }),
            wave: Some(WaveSection {
                pause_secs: Some(WAVE_PAUSE_SECS),
                surprise_every: Some(WAVE_SURPRISE_EVERY),
                surprise_jitter: Some(WAVE_SURPRISE_JITTER),
                radius_factor: Some(WAVE_RADIUS_FACTOR),
                steps: Some(WAVE_STEPS),
                min_height: Some(WAVE_MIN_HEIGHT),
                step_pause_base_secs: Some(WAVE_STEP_PAUSE_BASE_SECS),
                x_start_min: Some(WAVE_X_START_MIN),
                x_start_max: Some(WAVE_X_START_MAX),
            }),
            clock: Some(ClockSection {
                resync_secs: Some(RESYNC_SECS),
                sync_attempts: Some(SYNC_ATTEMPTS),
                sync_backoff_secs: Some(SYNC_BACKOFF_SECS),
                splash: Some(true),
                twelve_hour: Some(true),
                greeting: None,
            }),
            driver: Some(DriverConfig::Console),
        }
    }
}

fn parse_wiring(s: &str) -> Result<WiringMode, String> {
    serde_yaml::from_str(s).map_err(|_| {
        format!("unknown wiring '{}', expected row_serpentine|column_serpentine|row_linear|column_linear", s)
    })
}

/// CLI overrides. All fields are Options so we can layer them over YAML.
#[derive(Debug, Parser, Clone, Default)]
#[command(name = "tideclock", version, about = "LED matrix tide clock")]
pub struct Cli {
    /// Path to a YAML config file (overrides search)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub log_level: Option<String>,
    /// Shorthand for --log-level debug
    #[arg(long, action = ArgAction::SetTrue)]
    pub debug: bool,
    #[arg(long)]
    pub width: Option<usize>,
    #[arg(long)]
    pub height: Option<usize>,
    /// row_serpentine | column_serpentine | row_linear | column_linear
    #[arg(long, value_parser = parse_wiring)]
    pub wiring: Option<WiringMode>,
    /// console | stream | null
    #[arg(long)]
    pub driver: Option<String>,
    /// Output path for the stream driver
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub stream_path: Option<PathBuf>,
    /// Channel ceiling, 0-255
    #[arg(long)]
    pub brightness: Option<u8>,
    /// Scrolled once after the splash
    #[arg(long)]
    pub greeting: Option<String>,
    #[arg(long, action = ArgAction::SetTrue)]
    pub no_splash: bool,
    #[arg(long, action = ArgAction::SetTrue)]
    pub twenty_four_hour: bool,
    /// Stop after this many seconds
    #[arg(long)]
    pub run_for: Option<u64>,
    /// Run the strip wiring diagnostics and exit
    #[arg(long, action = ArgAction::SetTrue)]
    pub test_strip: bool,
    /// dump fully merged config (after overrides) and exit
    #[arg(long, action = ArgAction::SetTrue)]
    pub dump_config: bool,
}

/// Public entry point: parse CLI, read YAML, merge, validate.
pub fn load() -> Result<(Cli, Config), ConfigError> {
    let cli = Cli::parse();
    let cfg = load_with(&cli)?;

    if cli.dump_config {
        let s = serde_yaml::to_string(&cfg)?;
        println!("{s}");
        std::process::exit(0);
    }

    Ok((cli, cfg))
}

/// The load pipeline for an already parsed command line
pub fn load_with(cli: &Cli) -> Result<Config, ConfigError> {
    // 1) defaults
    let mut cfg = Config::default();

    // 2) YAML file (explicit path or search)
    if let Some(p) = cli.config.as_ref() {
        if !p.exists() {
            return Err(ConfigError::Validation(format!("Config file not found: {}", p.display())));
        }
        merge(&mut cfg, read_yaml(p)?);
    } else if let Some(p) = find_config_file() {
        merge(&mut cfg, read_yaml(&p)?);
    }

    // 3) CLI overrides (highest precedence)
    apply_cli_overrides(&mut cfg, cli)?;

    // 4) Validate
    validate(&cfg)?;
    Ok(cfg)
}

/// Try common locations in order (first hit wins).
fn find_config_file() -> Option<PathBuf> {
    if let Some(home) = home_dir() {
        let p = home.join(".config/tideclock/config.yaml");
        if p.exists() { return Some(p) }
        let p = home.join(".config/tideclock.yaml");
        if p.exists() { return Some(p) }
    }
    for candidate in &["tideclock.yaml", "config/tideclock.yaml"] {
        let p = PathBuf::from(candidate);
        if p.exists() { return Some(p) }
    }
    None
}

fn read_yaml(path: &Path) -> Result<Config, ConfigError> {
    let s = fs::read_to_string(path)?;
    parse_yaml(&s)
}

/// A partial config from YAML text; absent keys stay `None`
pub fn parse_yaml(s: &str) -> Result<Config, ConfigError> {
    let cfg: Config = serde_yaml::from_str(s)?;
    Ok(cfg)
}

macro_rules! take {
    ($dst:expr, $src:expr; $($field:ident),+) => {
        $( if $src.$field.is_some() { $dst.$field = $src.$field; } )+
    };
}

fn merge_section<T>(dst: &mut Option<T>, src: Option<T>, f: impl FnOnce(&mut T, T)) {
    if let Some(s) = src {
        if let Some(d) = dst.as_mut() {
            f(d, s);
        } else {
            *dst = Some(s);
        }
    }
}

/// Merge `src` into `dst`, Option-by-Option.
pub fn merge(dst: &mut Config, src: Config) {
    take!(dst, src; log_level, driver);
    merge_section(&mut dst.grid, src.grid, |d, s| {
        take!(d, s; width, height, color_depth, wiring, x_offset, y_offset);
    });
    merge_section(&mut dst.colors, src.colors, |d, s| {
        take!(d, s; brightness, foreground, water, foam, sand, surprise, notify_ok, notify_error);
    });
    merge_section(&mut dst.wave, src.wave, |d, s| {
        take!(d, s; pause_secs, surprise_every, surprise_jitter, radius_factor, steps,
            min_height, step_pause_base_secs, x_start_min, x_start_max);
    });
    merge_section(&mut dst.clock, src.clock, |d, s| {
        take!(d, s; resync_secs, sync_attempts, sync_backoff_secs, splash, twelve_hour, greeting);
    });
}

fn apply_cli_overrides(cfg: &mut Config, cli: &Cli) -> Result<(), ConfigError> {
    if cli.log_level.is_some() { cfg.log_level = cli.log_level.clone(); }
    if cli.debug { cfg.log_level = Some("debug".into()); }

    let grid = cfg.grid.get_or_insert_with(GridSection::default);
    if cli.width.is_some()  { grid.width = cli.width; }
    if cli.height.is_some() { grid.height = cli.height; }
    if cli.wiring.is_some() { grid.wiring = cli.wiring; }

    let colors = cfg.colors.get_or_insert_with(ColorSection::default);
    if cli.brightness.is_some() { colors.brightness = cli.brightness; }

    let clock = cfg.clock.get_or_insert_with(ClockSection::default);
    if cli.no_splash { clock.splash = Some(false); }
    if cli.twenty_four_hour { clock.twelve_hour = Some(false); }
    if cli.greeting.is_some() { clock.greeting = cli.greeting.clone(); }

    match cli.driver.as_deref() {
        None => {
            if let Some(path) = cli.stream_path.clone() {
                cfg.driver = Some(DriverConfig::Stream { path });
            }
        }
        Some("console") => cfg.driver = Some(DriverConfig::Console),
        Some("null") => cfg.driver = Some(DriverConfig::Null),
        Some("stream") => {
            let path = match (&cli.stream_path, &cfg.driver) {
                (Some(p), _) => p.clone(),
                (None, Some(DriverConfig::Stream { path })) => path.clone(),
                (None, _) => {
                    return Err(ConfigError::Validation("--driver stream needs --stream-path".into()))
                }
            };
            cfg.driver = Some(DriverConfig::Stream { path });
        }
        Some(other) => {
            return Err(ConfigError::Validation(format!(
                "unknown driver '{}', expected console|stream|null",
                other
            )))
        }
    }
    Ok(())
}

/// Put any invariants here (required fields, ranges, etc.)
fn validate(cfg: &Config) -> Result<(), ConfigError> {
    cfg.grid_config()?;
    cfg.face_settings()?;
    Ok(())
}

fn invalid(msg: &str) -> ConfigError {
    ConfigError::Validation(msg.into())
}

fn resolve_color(spec: Option<&ColorSpec>, default: ColorSpec, max_value: u8) -> Result<Color, ConfigError> {
    let spec = spec.cloned().unwrap_or(default);
    let color = spec.resolve().ok_or_else(|| match &spec {
        ColorSpec::Name(name) => ConfigError::UnknownColor(name.clone()),
        ColorSpec::Channels(ch) => {
            ConfigError::Validation(format!("color needs 3 or 4 channels, got {}", ch.len()))
        }
    })?;
    Ok(color.scaled(max_value))
}

fn secs(value: f64, what: &str) -> Result<Duration, ConfigError> {
    Duration::try_from_secs_f64(value)
        .map_err(|_| ConfigError::Validation(format!("{} must be a non-negative number of seconds", what)))
}

impl Config {
    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or("info")
    }

    pub fn driver(&self) -> DriverConfig {
        self.driver.clone().unwrap_or(DriverConfig::Console)
    }

    pub fn brightness(&self) -> u8 {
        self.colors.as_ref().and_then(|c| c.brightness).unwrap_or(MAX_COLOR_VALUE)
    }

    /// Grid geometry, validated
    pub fn grid_config(&self) -> Result<GridConfig, ConfigError> {
        let g = self.grid.clone().unwrap_or_default();
        let width = g.width.unwrap_or(GRID_WIDTH);
        let height = g.height.unwrap_or(GRID_HEIGHT);
        if width == 0 || height == 0 {
            return Err(invalid("grid width/height must be > 0"));
        }
        let config = GridConfig::new(width, height)
            .with_depth(g.color_depth.unwrap_or_default())
            .with_mode(g.wiring.unwrap_or_default())
            .with_offsets(g.x_offset.unwrap_or(GRID_X_OFFSET), g.y_offset.unwrap_or(GRID_Y_OFFSET));
        config.validate().map_err(|e| ConfigError::Validation(e.to_string()))?;
        Ok(config)
    }

    /// Everything the clock face needs, colors already scaled
    pub fn face_settings(&self) -> Result<FaceSettings, ConfigError> {
        let max_value = self.brightness();
        let c = self.colors.clone().unwrap_or_default();
        let colors = FaceColors {
            foreground: resolve_color(c.foreground.as_ref(), COLOR_FOREGROUND.into(), max_value)?,
            water: resolve_color(c.water.as_ref(), ColorSpec::Channels(COLOR_WATER.to_vec()), max_value)?,
            foam: resolve_color(c.foam.as_ref(), ColorSpec::Channels(COLOR_FOAM.to_vec()), max_value)?,
            sand: resolve_color(c.sand.as_ref(), COLOR_SAND.into(), max_value)?,
            surprise: resolve_color(c.surprise.as_ref(), COLOR_SURPRISE.into(), max_value)?,
            notify_ok: resolve_color(c.notify_ok.as_ref(), COLOR_NOTIFY_OK.into(), max_value)?,
            notify_error: resolve_color(c.notify_error.as_ref(), COLOR_NOTIFY_ERROR.into(), max_value)?,
        };

        let w = self.wave.clone().unwrap_or_default();
        let wave = WaveParams {
            radius_factor: w.radius_factor.unwrap_or(WAVE_RADIUS_FACTOR),
            steps: w.steps.unwrap_or(WAVE_STEPS),
            min_height: w.min_height.unwrap_or(WAVE_MIN_HEIGHT),
            step_pause_base: secs(w.step_pause_base_secs.unwrap_or(WAVE_STEP_PAUSE_BASE_SECS), "wave step_pause_base_secs")?,
            x_start_min: w.x_start_min.unwrap_or(WAVE_X_START_MIN),
            x_start_max: w.x_start_max.unwrap_or(WAVE_X_START_MAX),
        };
        if wave.steps < 1 {
            return Err(invalid("wave steps must be >= 1"));
        }
        if wave.min_height > wave.steps {
            return Err(invalid("wave min_height must not exceed steps"));
        }
        if wave.x_start_min > wave.x_start_max {
            return Err(invalid("wave x_start_min must be <= x_start_max"));
        }
        if !(wave.radius_factor > 0.0 && wave.radius_factor.is_finite()) {
            return Err(invalid("wave radius_factor must be > 0"));
        }
        let surprise_every = w.surprise_every.unwrap_or(WAVE_SURPRISE_EVERY);
        if surprise_every < 1 {
            return Err(invalid("wave surprise_every must be >= 1"));
        }

        let k = self.clock.clone().unwrap_or_default();
        let sync_attempts = k.sync_attempts.unwrap_or(SYNC_ATTEMPTS);
        if sync_attempts < 1 {
            return Err(invalid("clock sync_attempts must be >= 1"));
        }

        Ok(FaceSettings {
            colors,
            surprise_jitter: w.surprise_jitter.unwrap_or(WAVE_SURPRISE_JITTER),
            wave_pause: secs(w.pause_secs.unwrap_or(WAVE_PAUSE_SECS), "wave pause_secs")?,
            wave,
            surprise_every,
            resync_every: Duration::from_secs(k.resync_secs.unwrap_or(RESYNC_SECS)),
            sync_attempts,
            sync_backoff: secs(k.sync_backoff_secs.unwrap_or(SYNC_BACKOFF_SECS), "clock sync_backoff_secs")?,
            splash: k.splash.unwrap_or(true),
            twelve_hour: k.twelve_hour.unwrap_or(true),
            greeting: k.greeting,
        })
    }
}
