//! The paddle and its five surface zones
//!
//! For half-length `h` the zones split `[-h, h)` (offsets from the centre) into
//! half-open intervals:
//!
//! ```text
//!  A-        S-         N          S+        A+
//! [-h,-3h/4)[-3h/4,-h/2)[-h/2,h/2)[h/2,3h/4)[3h/4,h)
//! ```

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Surface zone struck by the ball
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaddleZone {
    /// Left edge: bounces 15° flatter toward the right
    AngleNeg,
    /// Slows the ball by `PADDLE_SPEED_STEP`
    SpeedDown,
    /// Plain reflection
    Center,
    /// Speeds the ball up by `PADDLE_SPEED_STEP`
    SpeedUp,
    /// Right edge: bounces 15° steeper toward the left
    AnglePos,
}

impl PaddleZone {
    /// All zones, left to right
    pub const ALL: [PaddleZone; 5] = [
        PaddleZone::AngleNeg,
        PaddleZone::SpeedDown,
        PaddleZone::Center,
        PaddleZone::SpeedUp,
        PaddleZone::AnglePos,
    ];

    /// Speed change applied on contact
    pub fn speed_delta(&self) -> i32 {
        match self {
            PaddleZone::SpeedUp => PADDLE_SPEED_STEP,
            PaddleZone::SpeedDown => -PADDLE_SPEED_STEP,
            _ => 0,
        }
    }

    /// Offsets from the paddle centre covered by this zone
    pub fn span(&self, half_length: i32) -> Range<i32> {
        let h = half_length;
        match self {
            PaddleZone::AngleNeg => -h..-3 * h / 4,
            PaddleZone::SpeedDown => -3 * h / 4..-h / 2,
            PaddleZone::Center => -h / 2..h / 2,
            PaddleZone::SpeedUp => h / 2..3 * h / 4,
            PaddleZone::AnglePos => 3 * h / 4..h,
        }
    }
}

/// The player's paddle as known for one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paddle {
    /// Centre x position
    pub x: i32,
    /// Doubles the half-length while set
    pub lengthened: bool,
}

impl Default for Paddle {
    fn default() -> Self {
        Self {
            x: PADDLE_START_X,
            lengthened: false,
        }
    }
}

impl Paddle {
    pub fn half_length(&self) -> i32 {
        if self.lengthened {
            PADDLE_HALF_LENGTH * 2
        } else {
            PADDLE_HALF_LENGTH
        }
    }

    /// Allowed range for the centre at the current half-length
    pub fn track(&self) -> (i32, i32) {
        let h = self.half_length();
        (PADDLE_TRACK_LEFT + h, PADDLE_TRACK_RIGHT - h)
    }

    /// Keep the centre on the track
    pub fn clamp_to_track(&mut self) {
        let (min, max) = self.track();
        self.x = self.x.clamp(min, max);
    }

    /// Move by `delta` pixels, staying on the track
    pub fn shift(&mut self, delta: i32) {
        self.x = self.x.saturating_add(delta);
        self.clamp_to_track();
    }

    /// Zone under horizontal position `x`, if any
    pub fn zone_at(&self, x: i32) -> Option<PaddleZone> {
        let offset = x - self.x;
        let h = self.half_length();
        PaddleZone::ALL
            .into_iter()
            .find(|zone| zone.span(h).contains(&offset))
    }
}
