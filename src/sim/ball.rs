//! Ball state and the per-tick ray march
//!
//! The ball's position is never stored directly. It is `origin` plus an offset
//! built from whole sub-steps along the current angle; `origin` moves only when
//! the ball collides with something.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::bricks::LiveCells;
use super::collision::{Contact, Target, classify};
use super::paddle::Paddle;
use super::reflect::reflect;
use crate::consts::*;
use crate::normalize_degrees;

/// The ball, owned by the motion engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    /// Anchor of the current straight segment
    pub origin: IVec2,
    /// Sub-steps taken from `origin`, with y pointing up
    pub offset: IVec2,
    /// Travel direction in degrees, [0, 360)
    pub angle: f32,
    /// Pixels per tick
    pub speed: i32,
    /// Sub-steps per tick for the current segment
    pub step_increment: i32,
    needs_increment: bool,
}

impl Default for Ball {
    fn default() -> Self {
        Self::served_from(
            IVec2::new(BALL_START_X, BALL_START_Y),
            BALL_START_ANGLE,
            BALL_START_SPEED,
        )
    }
}

impl Ball {
    /// A ball starting a fresh segment at `pos`
    pub fn served_from(pos: IVec2, angle: f32, speed: i32) -> Self {
        Self {
            origin: pos,
            offset: IVec2::ZERO,
            angle: normalize_degrees(angle),
            speed: speed.clamp(MIN_SPEED, MAX_SPEED),
            step_increment: 1,
            needs_increment: true,
        }
    }

    /// Screen position (y down)
    pub fn position(&self) -> IVec2 {
        self.origin + IVec2::new(self.offset.x, -self.offset.y)
    }

    /// Travel is exactly along the y axis
    pub fn is_vertical(&self) -> bool {
        self.angle == 90.0 || self.angle == 270.0
    }

    /// Change speed by `delta`, staying within the speed bounds
    pub fn adjust_speed(&mut self, delta: i32) {
        self.speed = (self.speed + delta).clamp(MIN_SPEED, MAX_SPEED);
    }

    /// Move the ball horizontally without starting a new segment
    pub fn set_x(&mut self, x: i32) {
        self.origin.x = x - self.offset.x;
    }

    /// Sub-steps per tick at the current speed and angle
    pub fn compute_increment(&self) -> i32 {
        if self.is_vertical() {
            return self.speed.max(1);
        }
        let horizontal = self.speed as f64 * (self.angle as f64).to_radians().cos().abs();
        snap_trunc(horizontal).max(1)
    }

    /// Offset after one more sub-step
    fn next_offset(&self) -> IVec2 {
        if self.is_vertical() {
            let dy = if self.angle == 90.0 { 1 } else { -1 };
            return self.offset + IVec2::new(0, dy);
        }
        let dx = if self.angle > 90.0 && self.angle < 270.0 {
            self.offset.x - 1
        } else {
            self.offset.x + 1
        };
        let slope = (self.angle as f64).to_radians().tan();
        IVec2::new(dx, snap_trunc(slope * dx as f64))
    }

    /// Advance one tick: up to `step_increment` sub-steps, stopping at the first
    /// contact. The contact is resolved before returning.
    pub fn advance(&mut self, live: &LiveCells, paddle: &Paddle) -> Option<Contact> {
        if self.needs_increment {
            self.step_increment = self.compute_increment();
            self.needs_increment = false;
        }

        for _ in 0..self.step_increment {
            let from = self.position();
            let next = self.next_offset();
            let to = self.origin + IVec2::new(next.x, -next.y);

            // Bricks are struck from the last pixel clear of them, so the ball
            // never rests overlapping a live brick
            let mut clear = from;
            let contact = pixel_walk(from, to).find_map(|p| {
                let contact = classify(p, self.angle, live, paddle).map(|mut contact| {
                    if let Target::Brick(_) = contact.target {
                        contact.at = clear;
                    }
                    contact
                });
                clear = p;
                contact
            });
            if let Some(contact) = contact {
                self.resolve(&contact);
                return Some(contact);
            }
            self.offset = next;
        }
        None
    }

    /// Bounce off a contact and start a new segment from the contact point
    pub fn resolve(&mut self, contact: &Contact) {
        let before = self.angle;
        self.origin = contact.at;
        self.offset = IVec2::ZERO;
        self.angle = reflect(contact.incidence, self.angle);
        if let Target::Paddle(zone) = contact.target {
            self.adjust_speed(zone.speed_delta());
        }
        self.needs_increment = true;
        log::trace!(
            "{:?} at ({}, {}): {} -> {} deg, speed {}",
            contact.incidence,
            contact.at.x,
            contact.at.y,
            before,
            self.angle,
            self.speed
        );
    }
}

/// Truncate toward zero, treating values within rounding noise of an integer
/// as that integer
fn snap_trunc(value: f64) -> i32 {
    let nearest = value.round();
    if (value - nearest).abs() < 1e-6 {
        nearest as i32
    } else {
        value.trunc() as i32
    }
}

/// Pixels visited moving from `from` to `to`: the new column first, then one
/// pixel at a time along y. Consecutive pixels are always 8-connected.
fn pixel_walk(from: IVec2, to: IVec2) -> impl Iterator<Item = IVec2> {
    let dy = to.y - from.y;
    let dir = dy.signum();
    let first = if dy == 0 { 0 } else { 1 };
    (first..=dy.abs()).map(move |k| IVec2::new(to.x, from.y + k * dir))
}
