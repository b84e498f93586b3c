/*
 *  tests/tideclock_integration.rs
 *
 *  Integration tests against the library surface
 *
 *  tideclock - worth the wait
 *  (c) 2020-26 Stuart Hunter
 */

use std::collections::HashSet;
use std::time::Duration;

use tideclock::clock::{ClockFace, FaceSettings, Sources};
use tideclock::display::drivers::MockDriver;
use tideclock::display::mapping::map_index;
use tideclock::display::{Color, Grid, GridConfig, WiringMode};
use tideclock::font::{FontTable, TextOptions};
use tideclock::pacer::Completion;
use tideclock::sources::{FakeClock, FixedWallClock, ScriptedRandom, ScriptedSync, WallTime};
use tideclock::text::TextLayer;
use tideclock::timemask::TimeMask;
use tideclock::wave::{wavefront_row, WaveAnimator, WaveColors, WaveParams, WaveStart};

const SIZES: [(usize, usize); 4] = [(1, 1), (3, 2), (16, 8), (27, 9)];

fn grid(width: usize, height: usize, mode: WiringMode) -> Grid<MockDriver> {
    Grid::new(GridConfig::new(width, height).with_mode(mode), MockDriver::new()).unwrap()
}

#[test]
fn test_mapping_is_a_bijection() {
    for mode in WiringMode::ALL {
        for (w, h) in SIZES {
            let mut seen = HashSet::new();
            for y in 0..h as i32 {
                for x in 0..w as i32 {
                    let i = map_index(x, y, mode, w, h, 0, 0).unwrap();
                    assert!(i < w * h);
                    assert!(seen.insert(i), "{:?} {}x{} repeats {}", mode, w, h, i);
                }
            }
            assert_eq!(seen.len(), w * h);
        }
    }
}

#[test]
fn test_set_get_round_trip_every_mode() {
    for mode in WiringMode::ALL {
        let mut g = grid(5, 4, mode);
        for y in 0..4 {
            for x in 0..5 {
                let c = Color::rgb(x as u8, y as u8, 7);
                g.set_pixel(x, y, c);
                assert_eq!(g.get_pixel(x, y), Some(c));
            }
        }
    }
}

#[test]
fn test_out_of_range_is_ignored() {
    let mut g = grid(4, 3, WiringMode::RowSerpentine);
    g.fill(Color::rgb(1, 1, 1));
    let before = g.pixels().to_vec();
    for (x, y) in [(-1, 0), (0, -1), (4, 0), (0, 3), (i32::MAX, i32::MIN)] {
        g.set_pixel(x, y, Color::rgb(9, 9, 9));
        assert_eq!(g.get_pixel(x, y), None);
    }
    assert_eq!(g.pixels(), &before[..]);
}

#[test]
fn test_center_falls_back_to_left_edge() {
    let font = FontTable::builtin();
    let layer = TextLayer::new(font);
    let mut g = grid(8, 9, WiringMode::RowSerpentine);
    assert!(layer.measure("WIDE") >= 8);
    layer.center(&mut g, "WIDE", Color::rgb(0, 0, 8));
    // 'W' starts in column 0
    assert!((0..9).any(|y| g.get_cell(0, y) == Some(Color::rgb(0, 0, 8))));
}

#[test]
fn test_mask_is_deterministic_and_tracks_minutes() {
    let font = FontTable::builtin();
    let a = TimeMask::build(font, "9:05", 27);
    let b = TimeMask::build(font, "9:05", 27);
    let c = TimeMask::build(font, "9:06", 27);
    assert_eq!(a, b);
    assert_ne!(a.rows(), c.rows());
}

#[test]
fn test_wave_frame_count() {
    let font = FontTable::builtin();
    let mask = TimeMask::build(font, "9:05", 27);
    let colors = WaveColors {
        land: Color::rgb(0, 0, 8),
        water: Color::rgb(0, 0, 4),
        foam: Color::rgb(4, 4, 8),
        sand: Color::OFF,
    };
    for n in [1, 2, 7, 15] {
        let params = WaveParams {
            radius_factor: 1.6,
            steps: n,
            min_height: 1,
            step_pause_base: Duration::ZERO,
            x_start_min: -10,
            x_start_max: 7,
        };
        for start in [WaveStart::FULL, WaveStart::Random] {
            let mut g = grid(27, 9, WiringMode::RowSerpentine);
            let run = WaveAnimator::new(&params, colors)
                .run(&mut g, &mask, start, &mut ScriptedRandom::new(vec![3, 11]), &FakeClock::new(), None)
                .unwrap();
            assert_eq!(run.completion, Completion::Finished);
            assert_eq!(run.frames, 2 * n as usize + 2);
            let flushes = g.driver().state().lock().unwrap().flush_count;
            assert_eq!(flushes, 2 * n as usize + 2);
        }
    }
}

#[test]
fn test_wavefront_defined_outside_circle() {
    assert_eq!(wavefront_row(0.0, 0.0, 0.0, 5.0), 5);
    assert_eq!(wavefront_row(3.0, 0.0, -2.0, 5.0), 2);
    // |x - cx| > r reflects instead of failing
    assert_eq!(wavefront_row(13.0, 0.0, 0.0, 5.0), 12);
}

#[test]
fn test_offset_panel_scenario() {
    let cfg = GridConfig::new(16, 8).with_offsets(-1, -1);
    let mut g = Grid::new(cfg, MockDriver::new()).unwrap();
    assert_eq!(g.index_of(1, 1), Some(0));
    assert_eq!(g.index_of(16, 1), Some(15));
    assert_eq!(g.index_of(1, 2), Some(31));
    g.set_pixel(1, 2, Color::rgb(0, 8, 0));
    assert_eq!(g.pixels()[31], Color::rgb(0, 8, 0));
}

#[test]
fn test_normalize_scenario() {
    let font = FontTable::builtin();
    assert_eq!(font.normalize("  hello   world  ", TextOptions::default()), "HELLO WORLD");
}

#[test]
fn test_clock_mask_scenario() {
    let mask = TimeMask::build(FontTable::builtin(), "9:05", 27);
    assert_eq!(mask.height(), 9);
    assert!(mask.rows()[0].iter().all(|&c| !c));
    assert!(mask.rows()[8].iter().all(|&c| !c));
    assert!(mask.rows()[1..8].iter().any(|r| r.iter().any(|&c| c)));
}

#[test]
fn test_clock_face_day_in_the_life() {
    let when = |hour, minute| WallTime { year: 2026, month: 10, day: 19, hour, minute, second: 0 };
    let clock = FakeClock::new();
    let wall = FixedWallClock::new(when(23, 59));
    let cfg = GridConfig::new(27, 9).with_offsets(-1, -1);
    let settings = FaceSettings { splash: false, surprise_every: 2, ..FaceSettings::default() };
    let sources = Sources {
        wall: Box::new(wall.clone()),
        clock: Box::new(clock.clone()),
        rng: Box::new(ScriptedRandom::new(vec![2, 5, 1])),
        sync: Box::new(ScriptedSync::new(vec![Ok(when(23, 59))])),
    };
    let mut face = ClockFace::new(Grid::new(cfg, MockDriver::new()).unwrap(), settings, sources);

    face.start(None).unwrap();
    assert!(face.time_ok());

    face.tick(None).unwrap();
    assert_eq!(face.mask().text(), "11:59");

    wall.set(when(0, 0));
    clock.advance(Duration::from_secs(5));
    face.tick(None).unwrap();
    assert_eq!(face.mask().text(), "12:00");
    assert_eq!(face.waves_run(), 2);

    // an hour on, the silent resync finds nothing and the error mark appears
    clock.advance(Duration::from_secs(3600));
    face.tick(None).unwrap();
    assert!(!face.time_ok());
    assert_eq!(face.grid().get_cell(26, 0), Some(FaceSettings::default().colors.notify_error));
}
