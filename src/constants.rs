//! This module contains the defaults used across the grid, wave and clock modules.
//! Everything here can be overridden from the YAML config.

// Grid: the 27x9 panel addressed from (1,1)
/// Columns in the matrix.
pub const GRID_WIDTH: usize = 27;
/// Rows in the matrix.
pub const GRID_HEIGHT: usize = 9;
/// Logical origin offsets, so the lower-left LED is (1,1).
pub const GRID_X_OFFSET: i32 = -1;
pub const GRID_Y_OFFSET: i32 = -1;

/// Brightness every configured color is scaled to (out of 255).
pub const MAX_COLOR_VALUE: u8 = 8;
/// Brightness of the start-up sparkle.
pub const SPLASH_MAX_VALUE: u8 = 255;
/// Flashes in the start-up sparkle.
pub const SPLASH_FLASHES: u32 = 100;

// Wave
/// Seconds between wave starts.
pub const WAVE_PAUSE_SECS: f64 = 4.44;
/// Every this-many waves is a surprise.
pub const WAVE_SURPRISE_EVERY: u32 = 444;
/// Largest random lift of a surprise wave's start, in rows. The step
/// count of a surprise wave is the same as any other.
pub const WAVE_SURPRISE_JITTER: u32 = 5;
/// Radius as a multiple of grid width.
pub const WAVE_RADIUS_FACTOR: f64 = 1.6;
/// Rising steps; a wave is 2N+2 frames.
pub const WAVE_STEPS: u32 = 15;
pub const WAVE_MIN_HEIGHT: u32 = 3;
/// Smaller is faster.
pub const WAVE_STEP_PAUSE_BASE_SECS: f64 = 0.001;
pub const WAVE_X_START_MIN: i32 = -10;
pub const WAVE_X_START_MAX: i32 = 7;

// Clock
/// Seconds between silent time re-syncs.
pub const RESYNC_SECS: u64 = 3600;
pub const SYNC_ATTEMPTS: u32 = 10;
pub const SYNC_BACKOFF_SECS: f64 = 3.0;
/// A wall clock reading earlier than this year means it was never set.
pub const SYNC_MIN_YEAR: i32 = 2020;
/// Outer loop period.
pub const LOOP_SLEEP_MS: u64 = 100;
/// How long each word of a notification stays up.
pub const NOTIFY_WORD_MS: u64 = 800;
/// Frame interval when scrolling text.
pub const SCROLL_FRAME_MS: u64 = 100;

/// Colors, full brightness; scaled by MAX_COLOR_VALUE at start-up.
pub const COLOR_FOREGROUND: &str = "blue";
pub const COLOR_WATER: [u8; 3] = [0, 0, 128];
pub const COLOR_FOAM: [u8; 3] = [128, 128, 255];
pub const COLOR_SAND: &str = "black";
pub const COLOR_SURPRISE: &str = "red";
pub const COLOR_NOTIFY_OK: &str = "green";
pub const COLOR_NOTIFY_ERROR: &str = "red";
