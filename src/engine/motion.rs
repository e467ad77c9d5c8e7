//! Motion engine: owns the ball and resolves its collisions
//!
//! Each tick it advances the ball, reports the result to the session engine
//! and waits for the session's reply before doing anything else.

use std::thread;
use std::time::Duration;

use crate::channel::MotionLink;
use crate::consts::SPEEDUP_SCORE_INTERVAL;
use crate::error::{EngineError, ProtocolError};
use crate::protocol::{BallReport, GameStatus, Hit, Recipient, SessionReply};
use crate::sim::{Ball, LiveCells, Paddle, Target};

/// Where the engine is within its tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionPhase {
    /// Sub-stepping the ball
    Advancing,
    /// A contact was found and is being resolved
    Resolving,
    /// Report sent; waiting for the session's reply
    AwaitingSync,
}

#[derive(Debug, Clone)]
pub struct MotionEngine {
    ball: Ball,
    /// Private copy of the live bricks, cleared as hits are reported
    live: LiveCells,
    paddle: Paddle,
    status: GameStatus,
    score: u32,
    /// Score-driven speed bumps already applied
    speedups: u32,
    phase: MotionPhase,
    ticks: u64,
}

impl Default for MotionEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MotionEngine {
    pub fn new() -> Self {
        Self::with_ball(Ball::default())
    }

    /// Start from a given ball instead of the serve position
    pub fn with_ball(ball: Ball) -> Self {
        Self {
            ball,
            live: LiveCells::full(),
            paddle: Paddle::default(),
            status: GameStatus::Normal,
            score: 0,
            speedups: 0,
            phase: MotionPhase::Advancing,
            ticks: 0,
        }
    }

    pub fn ball(&self) -> &Ball {
        &self.ball
    }

    pub fn live(&self) -> &LiveCells {
        &self.live
    }

    pub fn paddle(&self) -> &Paddle {
        &self.paddle
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn phase(&self) -> MotionPhase {
        self.phase
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Compute one tick and build the report for the session.
    ///
    /// Outside `Normal` the ball stays put and the report carries no hit.
    pub fn tick(&mut self) -> BallReport {
        self.phase = MotionPhase::Advancing;
        self.ticks += 1;

        let hit = if self.status == GameStatus::Normal {
            match self.ball.advance(&self.live, &self.paddle) {
                Some(contact) => {
                    self.phase = MotionPhase::Resolving;
                    if let Target::Brick(cell) = contact.target {
                        self.live.remove(cell);
                    }
                    Hit::from(contact.target)
                }
                None => Hit::None,
            }
        } else {
            Hit::None
        };

        self.phase = MotionPhase::AwaitingSync;
        let pos = self.ball.position();
        BallReport {
            recipient: Recipient::Session,
            ball_x: pos.x,
            ball_y: pos.y,
            hit,
            speed: self.ball.speed,
        }
    }

    /// Take on the session's view before the next tick
    pub fn apply_reply(&mut self, reply: &SessionReply) {
        self.paddle = Paddle {
            x: reply.paddle_x,
            lengthened: reply.lengthen_active,
        };
        if reply.game_state != self.status {
            log::debug!("Motion: {:?} -> {:?}", self.status, reply.game_state);
        }
        let was_held = self.status == GameStatus::BallHeld;
        self.status = reply.game_state;
        self.score = reply.score;

        let due = self.score / SPEEDUP_SCORE_INTERVAL;
        if due > self.speedups {
            let bumps = i32::try_from(due - self.speedups).unwrap_or(i32::MAX);
            self.ball.adjust_speed(bumps);
            self.speedups = due;
            log::debug!("Score {} reached, ball speed {}", self.score, self.ball.speed);
        }

        // The release reply still places the ball
        if was_held || self.status == GameStatus::BallHeld {
            self.ball.set_x(reply.held_ball_x);
        }
        self.phase = MotionPhase::Advancing;
    }

    /// Run until the session resets or goes away.
    ///
    /// A reply addressed to the wrong engine (or otherwise malformed) halts the
    /// engine with an error.
    pub fn run(mut self, link: MotionLink, interval: Option<Duration>) -> Result<(), EngineError> {
        log::info!("Motion engine started");
        loop {
            let report = self.tick();
            if link.send(&report).is_err() {
                break;
            }
            let reply = match link.recv() {
                Ok(reply) => reply,
                Err(ProtocolError::Disconnected) => break,
                Err(err) => {
                    log::error!("Motion engine halted: {}", err);
                    return Err(err.into());
                }
            };
            if reply.game_state == GameStatus::Reset {
                break;
            }
            self.apply_reply(&reply);
            if let Some(interval) = interval {
                thread::sleep(interval);
            }
        }
        log::info!("Motion engine stopped after {} ticks", self.ticks);
        Ok(())
    }
}
