//! Messages exchanged between the engines and with outside collaborators
//!
//! Engine-to-engine messages are plain fixed-width integer records on the
//! wire. The typed forms here are what the engines work with; `to_words` and
//! `from_words` convert at the channel boundary and validate every field.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ProtocolError;
use crate::sim::{Cell, Target};

/// `hit_row`/`hit_col` sentinel for a ball lost through the floor
pub const BOTTOM_HIT: i32 = 20;
/// `hit_row`/`hit_col` sentinel for a paddle contact
pub const PADDLE_HIT: i32 = 24;

/// Which engine a message is addressed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Recipient {
    Motion,
    Session,
}

impl Recipient {
    pub fn code(&self) -> i32 {
        match self {
            Recipient::Motion => 0,
            Recipient::Session => 1,
        }
    }

    pub fn from_code(code: i32) -> Result<Self, ProtocolError> {
        match code {
            0 => Ok(Recipient::Motion),
            1 => Ok(Recipient::Session),
            other => Err(ProtocolError::UnknownRecipient(other)),
        }
    }
}

impl fmt::Display for Recipient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Recipient::Motion => write!(f, "motion"),
            Recipient::Session => write!(f, "session"),
        }
    }
}

/// Session game state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GameStatus {
    #[default]
    Normal,
    Win,
    Lose,
    Pause,
    Reset,
    BallHeld,
}

impl GameStatus {
    pub fn code(&self) -> i32 {
        match self {
            GameStatus::Normal => 0,
            GameStatus::Win => 1,
            GameStatus::Lose => 2,
            GameStatus::Pause => 3,
            GameStatus::Reset => 4,
            GameStatus::BallHeld => 5,
        }
    }

    pub fn from_code(code: i32) -> Result<Self, ProtocolError> {
        match code {
            0 => Ok(GameStatus::Normal),
            1 => Ok(GameStatus::Win),
            2 => Ok(GameStatus::Lose),
            3 => Ok(GameStatus::Pause),
            4 => Ok(GameStatus::Reset),
            5 => Ok(GameStatus::BallHeld),
            other => Err(ProtocolError::UnknownGameState(other)),
        }
    }

    /// Win and lose persist until the player resets
    pub fn is_over(&self) -> bool {
        matches!(self, GameStatus::Win | GameStatus::Lose)
    }
}

/// What the ball struck during a tick, as far as the session cares
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Hit {
    #[default]
    None,
    Brick(Cell),
    BottomWall,
    Paddle,
}

impl Hit {
    /// `(hit_row, hit_col)` wire pair
    pub fn to_wire(&self) -> (i32, i32) {
        match self {
            Hit::None => (0, 0),
            Hit::Brick(cell) => cell.to_wire(),
            Hit::BottomWall => (BOTTOM_HIT, BOTTOM_HIT),
            Hit::Paddle => (PADDLE_HIT, PADDLE_HIT),
        }
    }

    pub fn from_wire(row: i32, col: i32) -> Result<Self, ProtocolError> {
        match (row, col) {
            (0, 0) => Ok(Hit::None),
            (BOTTOM_HIT, BOTTOM_HIT) => Ok(Hit::BottomWall),
            (PADDLE_HIT, PADDLE_HIT) => Ok(Hit::Paddle),
            _ => Cell::from_wire(row, col).map(Hit::Brick),
        }
    }
}

impl From<Target> for Hit {
    fn from(target: Target) -> Self {
        match target {
            Target::Wall => Hit::None,
            Target::Floor => Hit::BottomWall,
            Target::Paddle(_) => Hit::Paddle,
            Target::Brick(cell) => Hit::Brick(cell),
        }
    }
}

/// A message that crosses the engine channel as a fixed-width integer record
pub trait WireMessage: Sized {
    type Words: Copy + Send + 'static;

    fn recipient(&self) -> Recipient;
    fn to_words(&self) -> Self::Words;
    fn from_words(words: &Self::Words) -> Result<Self, ProtocolError>;
}

/// Motion → session, once per tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BallReport {
    pub recipient: Recipient,
    pub ball_x: i32,
    pub ball_y: i32,
    pub hit: Hit,
    pub speed: i32,
}

impl WireMessage for BallReport {
    type Words = [i32; 6];

    fn recipient(&self) -> Recipient {
        self.recipient
    }

    fn to_words(&self) -> [i32; 6] {
        let (row, col) = self.hit.to_wire();
        [
            self.recipient.code(),
            self.ball_x,
            self.ball_y,
            row,
            col,
            self.speed,
        ]
    }

    fn from_words(words: &[i32; 6]) -> Result<Self, ProtocolError> {
        let [recipient, ball_x, ball_y, row, col, speed] = *words;
        if speed < 0 {
            return Err(ProtocolError::InvalidField {
                field: "speed",
                value: speed,
            });
        }
        Ok(Self {
            recipient: Recipient::from_code(recipient)?,
            ball_x,
            ball_y,
            hit: Hit::from_wire(row, col)?,
            speed,
        })
    }
}

/// Session → motion, once per tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionReply {
    pub recipient: Recipient,
    pub paddle_x: i32,
    pub score: u32,
    pub game_state: GameStatus,
    pub hold_active: bool,
    pub lengthen_active: bool,
    /// Where to place the ball while `game_state` is `BallHeld`
    pub held_ball_x: i32,
}

impl WireMessage for SessionReply {
    type Words = [i32; 7];

    fn recipient(&self) -> Recipient {
        self.recipient
    }

    fn to_words(&self) -> [i32; 7] {
        [
            self.recipient.code(),
            self.paddle_x,
            i32::try_from(self.score).unwrap_or(i32::MAX),
            self.game_state.code(),
            i32::from(self.hold_active),
            i32::from(self.lengthen_active),
            self.held_ball_x,
        ]
    }

    fn from_words(words: &[i32; 7]) -> Result<Self, ProtocolError> {
        let [recipient, paddle_x, score, state, hold, lengthen, held_ball_x] = *words;
        Ok(Self {
            recipient: Recipient::from_code(recipient)?,
            paddle_x,
            score: u32::try_from(score).map_err(|_| ProtocolError::InvalidField {
                field: "score",
                value: score,
            })?,
            game_state: GameStatus::from_code(state)?,
            hold_active: flag("hold_active", hold)?,
            lengthen_active: flag("lengthen_active", lengthen)?,
            held_ball_x,
        })
    }
}

fn flag(field: &'static str, value: i32) -> Result<bool, ProtocolError> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        _ => Err(ProtocolError::InvalidField { field, value }),
    }
}

/// Input from the player (or the autopilot) to the session engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerCommand {
    /// Move the paddle by this many pixels (negative = left)
    MovePaddle(i32),
    Pause,
    Resume,
    /// Start a fresh session from any state
    Reset,
    /// Let go of a ball held on the paddle
    ReleaseBall,
    /// Stop the engines
    Shutdown,
}

/// Feed for rendering and other collaborators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoreEvent {
    /// Ball position after a tick
    BallMoved { x: i32, y: i32 },
    /// Paddle centre after the player moved it or its length changed
    PaddleMoved { x: i32, half_length: i32 },
    /// 1-based brick coordinates
    BrickRemoved { row: i32, col: i32 },
    ScoreChanged(u32),
    StatusChanged(GameStatus),
    /// A fresh session has started
    SessionReset { generation: u64 },
}
