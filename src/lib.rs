//! Lockstep Breakout - a brick-breaker driven by two cooperating engines
//!
//! Core modules:
//! - `sim`: Ball, bricks, paddle, collision classifier and reflection solver
//! - `protocol`: Messages exchanged between the engines (typed + fixed-width wire form)
//! - `channel`: One-slot rendezvous mailboxes between the engines
//! - `engine`: Motion engine, session engine, lockstep driver and threaded runtime
//! - `settings`: Runtime configuration (seed, pacing, headless run length)

pub mod autopilot;
pub mod channel;
pub mod engine;
pub mod error;
pub mod protocol;
pub mod settings;
pub mod sim;

pub use error::{EngineError, ProtocolError, SettingsError};
pub use settings::Settings;

/// Fixed game constants. Physics is not configurable.
pub mod consts {
    /// Arena boundary lines (pixels)
    pub const ARENA_LEFT: i32 = 60;
    pub const ARENA_TOP: i32 = 60;
    pub const ARENA_RIGHT: i32 = 514;
    pub const ARENA_BOTTOM: i32 = 419;

    /// Ball defaults
    pub const BALL_RADIUS: i32 = 7;
    pub const BALL_START_X: i32 = PADDLE_START_X;
    pub const BALL_START_Y: i32 = PADDLE_TOP - BALL_RADIUS;
    pub const BALL_START_ANGLE: f32 = 90.0;
    pub const BALL_START_SPEED: i32 = 10;
    /// Speed clamp (pixels per tick)
    pub const MIN_SPEED: i32 = 2;
    pub const MAX_SPEED: i32 = 20;
    /// Every this many points the ball gets one pixel per tick faster
    pub const SPEEDUP_SCORE_INTERVAL: u32 = 10;

    /// Paddle defaults
    pub const PADDLE_TOP: i32 = 405;
    pub const PADDLE_START_X: i32 = 288;
    pub const PADDLE_HALF_LENGTH: i32 = 40;
    /// Outer limits of the paddle track; the centre is clamped to [LEFT + h, RIGHT - h]
    pub const PADDLE_TRACK_LEFT: i32 = 61;
    pub const PADDLE_TRACK_RIGHT: i32 = 513;
    /// Speed change applied by the S zones
    pub const PADDLE_SPEED_STEP: i32 = 4;
    /// Angle bias applied by the A zones (degrees)
    pub const PADDLE_ANGLE_BIAS: f32 = 15.0;
    /// The A zones never send the ball flatter than this (degrees from horizontal)
    pub const PADDLE_MIN_EXIT_ANGLE: f32 = 15.0;
    pub const PADDLE_MAX_EXIT_ANGLE: f32 = 165.0;

    /// Brick grid layout
    pub const ROWS: usize = 8;
    pub const COLUMNS: usize = 10;
    pub const BRICK_COUNT: usize = ROWS * COLUMNS;
    pub const BRICK_ORIGIN_X: i32 = 65;
    pub const BRICK_ORIGIN_Y: i32 = 65;
    pub const BRICK_PITCH_X: i32 = 45;
    pub const BRICK_PITCH_Y: i32 = 20;
    pub const BRICK_WIDTH: i32 = 40;
    pub const BRICK_HEIGHT: i32 = 15;

    /// Tagged cells, chosen at session start without repeats
    pub const SPECIAL_BRICKS: usize = 10;
    pub const HIGH_VALUE_BRICKS: usize = 16;

    /// Power-up lifetime in session ticks
    pub const POWER_UP_TICKS: u32 = 375;
}

/// Normalize an angle in degrees to [0, 360)
#[inline]
pub fn normalize_degrees(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}
