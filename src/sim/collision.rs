//! Collision classifier
//!
//! Given a candidate ball centre and its travel angle, decide whether the ball
//! touches the paddle, a live brick or an arena wall, and if so which of the
//! ten incidence classes applies.
//!
//! Every class has an outward surface normal. The paddle and the walls only
//! count as hit while the ball travels *into* them (more than 90° away from the
//! normal), so a ball that has just bounced off one never re-triggers it on the
//! way out. Bricks need no such gate since a struck brick is destroyed: any
//! live brick the ball touches is a contact, and the travel angle only picks
//! the class.
//!
//! Contact uses one convention throughout: brick footprints are half-open pixel
//! rectangles and the ball touches one when the closest footprint pixel lies
//! within `BALL_RADIUS` of its centre.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::bricks::{BrickRect, Cell, LiveCells};
use super::paddle::{Paddle, PaddleZone};
use crate::consts::*;

/// Surface class struck by the ball
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Incidence {
    /// Arena left wall, or the right face of a brick
    LeftWall,
    /// Arena right wall, or the left face of a brick
    RightWall,
    /// Arena ceiling, or the bottom face of a brick
    TopWall,
    /// Arena floor, the top face of a brick, or the paddle's N and S zones
    BottomWall,
    BrickSe,
    BrickNe,
    BrickNw,
    BrickSw,
    /// Paddle A+ zone
    PaddleAnglePos,
    /// Paddle A- zone
    PaddleAngleNeg,
}

impl Incidence {
    /// Direction (degrees) the struck surface faces
    pub fn normal(&self) -> i32 {
        match self {
            Incidence::LeftWall => 0,
            Incidence::RightWall => 180,
            Incidence::TopWall => 270,
            Incidence::BottomWall => 90,
            Incidence::BrickNe => 45,
            Incidence::BrickNw => 135,
            Incidence::BrickSw => 225,
            Incidence::BrickSe => 315,
            Incidence::PaddleAnglePos => 90,
            Incidence::PaddleAngleNeg => 90,
        }
    }

    /// Whether travel at `angle` heads into a surface of this class
    pub fn faces(&self, angle: f32) -> bool {
        let diff = (angle - self.normal() as f32).rem_euclid(360.0);
        diff.min(360.0 - diff) > 90.0
    }
}

/// What the ball ran into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Left or right wall, or the ceiling
    Wall,
    /// Arena floor: the ball is lost
    Floor,
    Paddle(PaddleZone),
    Brick(Cell),
}

/// A classified collision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contact {
    pub incidence: Incidence,
    /// Ball centre at the moment of contact, clamped onto the struck surface
    pub at: IVec2,
    pub target: Target,
}

/// Classify a candidate ball centre. Paddle first, then bricks, then walls.
pub fn classify(pos: IVec2, angle: f32, live: &LiveCells, paddle: &Paddle) -> Option<Contact> {
    paddle_contact(pos, angle, paddle)
        .or_else(|| brick_contact(pos, angle, live))
        .or_else(|| wall_contact(pos, angle))
}

fn paddle_contact(pos: IVec2, angle: f32, paddle: &Paddle) -> Option<Contact> {
    if pos.y + BALL_RADIUS < PADDLE_TOP || !Incidence::BottomWall.faces(angle) {
        return None;
    }
    let zone = paddle.zone_at(pos.x)?;
    let incidence = match zone {
        PaddleZone::AngleNeg => Incidence::PaddleAngleNeg,
        PaddleZone::AnglePos => Incidence::PaddleAnglePos,
        _ => Incidence::BottomWall,
    };
    Some(Contact {
        incidence,
        at: IVec2::new(pos.x, PADDLE_TOP - BALL_RADIUS - 1),
        target: Target::Paddle(zone),
    })
}

fn wall_contact(pos: IVec2, angle: f32) -> Option<Contact> {
    let walls = [
        (
            Incidence::LeftWall,
            pos.x - BALL_RADIUS <= ARENA_LEFT,
            IVec2::new(ARENA_LEFT + BALL_RADIUS, pos.y),
            Target::Wall,
        ),
        (
            Incidence::RightWall,
            pos.x + BALL_RADIUS >= ARENA_RIGHT,
            IVec2::new(ARENA_RIGHT - BALL_RADIUS, pos.y),
            Target::Wall,
        ),
        (
            Incidence::TopWall,
            pos.y - BALL_RADIUS <= ARENA_TOP,
            IVec2::new(pos.x, ARENA_TOP + BALL_RADIUS),
            Target::Wall,
        ),
        (
            Incidence::BottomWall,
            pos.y + BALL_RADIUS >= ARENA_BOTTOM,
            IVec2::new(pos.x, ARENA_BOTTOM - BALL_RADIUS),
            Target::Floor,
        ),
    ];
    // A ball leaving one wall may still be touching it while it reaches the next
    walls
        .into_iter()
        .find(|(incidence, touching, _, _)| *touching && incidence.faces(angle))
        .map(|(incidence, _, at, target)| Contact {
            incidence,
            at,
            target,
        })
}

fn brick_contact(pos: IVec2, angle: f32, live: &LiveCells) -> Option<Contact> {
    live.scan()
        .find(|cell| cell.rect().touches_circle(pos, BALL_RADIUS))
        .map(|cell| Contact {
            incidence: brick_incidence(&cell.rect(), pos, angle),
            at: pos,
            target: Target::Brick(cell),
        })
}

/// Class for a ball touching `rect`. Corners are decided before faces.
fn brick_incidence(rect: &BrickRect, pos: IVec2, angle: f32) -> Incidence {
    let side = if pos.x < rect.left {
        Some(Incidence::RightWall)
    } else if pos.x >= rect.right {
        Some(Incidence::LeftWall)
    } else {
        None
    };
    let level = if pos.y < rect.top {
        Some(Incidence::BottomWall)
    } else if pos.y >= rect.bottom {
        Some(Incidence::TopWall)
    } else {
        None
    };

    match (side, level) {
        (Some(side), Some(level)) => {
            let corner = corner_of(side, level);
            // A ball running along a corner's diagonal still moves into one face
            [corner, side, level]
                .into_iter()
                .find(|incidence| incidence.faces(angle))
                .unwrap_or(corner)
        }
        (Some(face), None) | (None, Some(face)) => {
            if face.faces(angle) {
                face
            } else {
                graze(face, angle)
            }
        }
        // Centre inside the brick: push back out the way it came
        (None, None) => [
            Incidence::BottomWall,
            Incidence::TopWall,
            Incidence::RightWall,
            Incidence::LeftWall,
        ]
        .into_iter()
        .find(|incidence| incidence.faces(angle))
        .unwrap_or(Incidence::BottomWall),
    }
}

/// Corner between a side face and a top or bottom face
fn corner_of(side: Incidence, level: Incidence) -> Incidence {
    match (side, level) {
        (Incidence::RightWall, Incidence::BottomWall) => Incidence::BrickNw,
        (Incidence::LeftWall, Incidence::BottomWall) => Incidence::BrickNe,
        (Incidence::RightWall, _) => Incidence::BrickSw,
        _ => Incidence::BrickSe,
    }
}

/// Class for a ball that touches `face` while running along it or away from
/// it, which happens when it slides in off the end of the face. The ball is
/// turned off the corner it came past; with no motion along the face it keeps
/// its angle.
fn graze(face: Incidence, angle: f32) -> Incidence {
    let leftward = angle > 90.0 && angle < 270.0;
    let rightward = angle < 90.0 || angle > 270.0;
    let upward = angle > 0.0 && angle < 180.0;
    let downward = angle > 180.0;
    match face {
        Incidence::TopWall | Incidence::BottomWall => {
            if leftward {
                corner_of(Incidence::LeftWall, face)
            } else if rightward {
                corner_of(Incidence::RightWall, face)
            } else {
                Incidence::LeftWall
            }
        }
        _ => {
            if upward {
                corner_of(face, Incidence::TopWall)
            } else if downward {
                corner_of(face, Incidence::BottomWall)
            } else {
                Incidence::TopWall
            }
        }
    }
}
