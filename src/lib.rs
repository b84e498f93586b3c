/*
 *  lib.rs
 *
 *  tideclock - worth the wait
 *  (c) 2020-26 Stuart Hunter
 *
 *  LED matrix tide clock: the time is revealed by a wave washing over it
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

// LED matrix, wiring and drivers
pub mod display;

// Glyphs and text rendering
pub mod font;
pub mod text;

// The clock itself
pub mod timemask;
pub mod wave;
pub mod clock;

pub mod pacer;
pub mod sources;
pub mod palette;
pub mod effects;
pub mod config;
pub mod constants;
