//! Demo controller
//!
//! Plays the game from the collaborator feed alone: it follows the ball with
//! the paddle, lets go of held balls after a short wait and, optionally,
//! starts a new session some time after a win or a loss.

use crate::consts::*;
use crate::protocol::{CoreEvent, GameStatus, PlayerCommand};

/// Largest paddle move per tick (one button press)
pub const MAX_PADDLE_STEP: i32 = 25;
/// Ticks a caught ball is held before release
pub const RELEASE_AFTER_TICKS: u32 = 20;
/// Ticks spent on the win/lose screen before restarting
pub const RESTART_AFTER_TICKS: u32 = 100;

#[derive(Debug, Clone)]
pub struct Autopilot {
    /// Where the paddle is, or will be once the last move lands
    paddle_x: i32,
    half_length: i32,
    status: GameStatus,
    /// Ticks spent in the current status
    waited: u32,
    restart: bool,
}

impl Default for Autopilot {
    fn default() -> Self {
        Self::new()
    }
}

impl Autopilot {
    pub fn new() -> Self {
        Self {
            paddle_x: PADDLE_START_X,
            half_length: PADDLE_HALF_LENGTH,
            status: GameStatus::Normal,
            waited: 0,
            restart: false,
        }
    }

    /// Also reset the session after it ends
    pub fn restarting(mut self) -> Self {
        self.restart = true;
        self
    }

    /// Feed one event, possibly getting a command back
    pub fn observe(&mut self, event: &CoreEvent) -> Option<PlayerCommand> {
        match *event {
            CoreEvent::PaddleMoved { x, half_length } => {
                self.paddle_x = x;
                self.half_length = half_length;
                None
            }
            CoreEvent::StatusChanged(status) => {
                self.status = status;
                self.waited = 0;
                None
            }
            CoreEvent::SessionReset { .. } => {
                *self = Self {
                    restart: self.restart,
                    ..Self::new()
                };
                None
            }
            CoreEvent::BallMoved { x, .. } => self.on_tick(x),
            CoreEvent::BrickRemoved { .. } | CoreEvent::ScoreChanged(_) => None,
        }
    }

    fn on_tick(&mut self, ball_x: i32) -> Option<PlayerCommand> {
        self.waited = self.waited.saturating_add(1);
        match self.status {
            GameStatus::Normal => self.follow(ball_x),
            GameStatus::BallHeld if self.waited >= RELEASE_AFTER_TICKS => {
                Some(PlayerCommand::ReleaseBall)
            }
            GameStatus::Win | GameStatus::Lose
                if self.restart && self.waited >= RESTART_AFTER_TICKS =>
            {
                Some(PlayerCommand::Reset)
            }
            _ => None,
        }
    }

    fn follow(&mut self, ball_x: i32) -> Option<PlayerCommand> {
        let delta = (ball_x - self.paddle_x).clamp(-MAX_PADDLE_STEP, MAX_PADDLE_STEP);
        if delta == 0 {
            return None;
        }
        let min = PADDLE_TRACK_LEFT + self.half_length;
        let max = PADDLE_TRACK_RIGHT - self.half_length;
        let target = (self.paddle_x + delta).clamp(min, max);
        if target == self.paddle_x {
            return None;
        }
        // Assume the move lands; the next PaddleMoved corrects any difference
        self.paddle_x = target;
        Some(PlayerCommand::MovePaddle(delta))
    }
}
