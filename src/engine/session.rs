//! Session engine: owns bricks, score, paddle and the game state machine
//!
//! The session answers every motion report straight away. Player input is
//! buffered between ticks and folded in while building the reply, so a slow
//! or silent player never stalls the motion engine.

use std::sync::mpsc::{Receiver, Sender, TryRecvError};

use serde::{Deserialize, Serialize};

use crate::channel::SessionLink;
use crate::consts::*;
use crate::error::{EngineError, ProtocolError};
use crate::protocol::{
    BallReport, CoreEvent, GameStatus, Hit, PlayerCommand, Recipient, SessionReply,
};
use crate::sim::{BrickGrid, Paddle};

/// A countdown in session ticks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerUp {
    remaining: u32,
}

impl PowerUp {
    pub fn activate(&mut self) {
        self.remaining = POWER_UP_TICKS;
    }

    pub fn is_active(&self) -> bool {
        self.remaining > 0
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Count down one tick. Returns true on the tick it runs out.
    pub fn tick(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        self.remaining == 0
    }
}

/// Ball and paddle positions when the ball was caught
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Hold {
    ball_x: i32,
    paddle_x: i32,
}

/// How a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The player asked for a fresh session
    Reset,
    /// The engines should stop
    Shutdown,
}

/// Result of handling one motion report
#[derive(Debug, Clone, PartialEq)]
pub struct SessionStep {
    pub reply: SessionReply,
    pub events: Vec<CoreEvent>,
    /// Set when the session is finished. The reply is only sent on `Reset`.
    pub end: Option<SessionEnd>,
}

#[derive(Debug, Clone)]
pub struct SessionEngine {
    grid: BrickGrid,
    paddle: Paddle,
    score: u32,
    status: GameStatus,
    hold: PowerUp,
    lengthen: PowerUp,
    held: Option<Hold>,
    ball_speed: i32,
    ticks: u64,
    tick_limit: Option<u64>,
}

impl SessionEngine {
    /// Fresh session with bricks tagged from `seed`
    pub fn new(seed: u64) -> Self {
        Self {
            grid: BrickGrid::new(seed),
            paddle: Paddle::default(),
            score: 0,
            status: GameStatus::Normal,
            hold: PowerUp::default(),
            lengthen: PowerUp::default(),
            held: None,
            ball_speed: BALL_START_SPEED,
            ticks: 0,
            tick_limit: None,
        }
    }

    /// Shut down on its own after `limit` ticks
    pub fn with_tick_limit(mut self, limit: Option<u64>) -> Self {
        self.tick_limit = limit;
        self
    }

    pub fn grid(&self) -> &BrickGrid {
        &self.grid
    }

    pub fn paddle(&self) -> &Paddle {
        &self.paddle
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn hold(&self) -> PowerUp {
        self.hold
    }

    pub fn lengthen(&self) -> PowerUp {
        self.lengthen
    }

    /// Ball speed from the latest report
    pub fn ball_speed(&self) -> i32 {
        self.ball_speed
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Apply one motion report and the player input buffered since the last
    /// one, and build the reply.
    pub fn on_report(
        &mut self,
        report: &BallReport,
        commands: impl IntoIterator<Item = PlayerCommand>,
    ) -> Result<SessionStep, ProtocolError> {
        if report.recipient != Recipient::Session {
            return Err(ProtocolError::Misaddressed {
                receiver: Recipient::Session,
                addressed: report.recipient,
            });
        }

        let status_before = self.status;
        let score_before = self.score;
        let paddle_before = self.paddle;
        let mut events = vec![CoreEvent::BallMoved {
            x: report.ball_x,
            y: report.ball_y,
        }];
        let mut end = None;
        let mut activated = false;

        self.ticks += 1;
        self.ball_speed = report.speed;

        match report.hit {
            Hit::Brick(cell) => match self.grid.destroy(cell) {
                Some(tags) => {
                    self.score += tags.points();
                    let (row, col) = cell.to_wire();
                    events.push(CoreEvent::BrickRemoved { row, col });
                    log::debug!(
                        "Brick ({}, {}) removed, {} left",
                        row,
                        col,
                        self.grid.remaining()
                    );
                    if tags.special {
                        self.hold.activate();
                        self.lengthen.activate();
                        activated = true;
                        self.paddle.lengthened = true;
                        self.paddle.clamp_to_track();
                        log::debug!("Power-ups active for {} ticks", POWER_UP_TICKS);
                    }
                }
                None => log::warn!("Report for brick {:?} that is already gone", cell),
            },
            Hit::BottomWall => {
                if self.status == GameStatus::Normal {
                    self.status = GameStatus::Lose;
                }
            }
            Hit::Paddle => {
                if self.status == GameStatus::Normal && self.hold.is_active() {
                    self.status = GameStatus::BallHeld;
                    self.held = Some(Hold {
                        ball_x: report.ball_x,
                        paddle_x: self.paddle.x,
                    });
                }
            }
            Hit::None => {}
        }

        if self.grid.remaining() == 0 && !self.status.is_over() {
            self.status = GameStatus::Win;
        }

        // A power-up's lifetime starts on the tick after it is earned
        if self.status == GameStatus::Normal && !activated {
            self.hold.tick();
            if self.lengthen.tick() {
                self.paddle.lengthened = false;
                self.paddle.clamp_to_track();
                log::debug!("Power-ups expired");
            }
        }

        for command in commands {
            if let Some(finished) = self.apply_command(command) {
                end = Some(finished);
                if finished == SessionEnd::Shutdown {
                    break;
                }
            }
        }

        if self
            .tick_limit
            .is_some_and(|limit| self.ticks >= limit && end.is_none())
        {
            log::info!("Tick limit reached after {} ticks", self.ticks);
            end = Some(SessionEnd::Shutdown);
        }

        if self.paddle != paddle_before {
            events.push(CoreEvent::PaddleMoved {
                x: self.paddle.x,
                half_length: self.paddle.half_length(),
            });
        }
        if self.score != score_before {
            events.push(CoreEvent::ScoreChanged(self.score));
        }
        if self.status != status_before {
            log::info!("Session: {:?} -> {:?}", status_before, self.status);
            events.push(CoreEvent::StatusChanged(self.status));
        }

        // A release still carries where the paddle took the ball this tick
        let held_ball_x = self
            .held
            .map(|hold| hold.ball_x + (self.paddle.x - hold.paddle_x))
            .unwrap_or(report.ball_x);
        if self.status != GameStatus::BallHeld {
            self.held = None;
        }

        Ok(SessionStep {
            reply: SessionReply {
                recipient: Recipient::Motion,
                paddle_x: self.paddle.x,
                score: self.score,
                game_state: self.status,
                hold_active: self.hold.is_active(),
                lengthen_active: self.lengthen.is_active(),
                held_ball_x,
            },
            events,
            end,
        })
    }

    fn apply_command(&mut self, command: PlayerCommand) -> Option<SessionEnd> {
        match (command, self.status) {
            (PlayerCommand::MovePaddle(delta), GameStatus::Normal | GameStatus::BallHeld) => {
                self.paddle.shift(delta);
            }
            (PlayerCommand::Pause, GameStatus::Normal) => self.status = GameStatus::Pause,
            (PlayerCommand::Resume, GameStatus::Pause) => self.status = GameStatus::Normal,
            (PlayerCommand::ReleaseBall, GameStatus::BallHeld) => {
                self.status = GameStatus::Normal;
            }
            (PlayerCommand::Reset, _) => {
                self.status = GameStatus::Reset;
                return Some(SessionEnd::Reset);
            }
            (PlayerCommand::Shutdown, _) => return Some(SessionEnd::Shutdown),
            (command, status) => log::trace!("Ignoring {:?} while {:?}", command, status),
        }
        None
    }

    /// Serve the motion engine until reset or shutdown.
    ///
    /// On reset the final reply (carrying `Reset`) is sent so the motion engine
    /// stops too. On shutdown nothing is sent and dropping the link releases
    /// the peer.
    pub fn run(
        &mut self,
        link: SessionLink,
        commands: &Receiver<PlayerCommand>,
        events: &Sender<CoreEvent>,
    ) -> Result<SessionEnd, EngineError> {
        log::info!("Session engine started, {} bricks", self.grid.remaining());
        loop {
            let report = match link.recv() {
                Ok(report) => report,
                Err(err) => {
                    log::error!("Session engine halted: {}", err);
                    return Err(err.into());
                }
            };

            let step = self.on_report(&report, drain(commands))?;
            for event in step.events {
                // Nobody listening is fine
                let _ = events.send(event);
            }

            match step.end {
                Some(SessionEnd::Shutdown) => {
                    log::info!("Session shut down after {} ticks", self.ticks);
                    return Ok(SessionEnd::Shutdown);
                }
                Some(SessionEnd::Reset) => {
                    let _ = link.send(&step.reply);
                    log::info!("Session reset after {} ticks", self.ticks);
                    return Ok(SessionEnd::Reset);
                }
                None => link.send(&step.reply)?,
            }
        }
    }
}

/// Everything buffered so far. A closed command channel means shut down.
fn drain(commands: &Receiver<PlayerCommand>) -> Vec<PlayerCommand> {
    let mut batch = Vec::new();
    loop {
        match commands.try_recv() {
            Ok(command) => batch.push(command),
            Err(TryRecvError::Empty) => break,
            Err(TryRecvError::Disconnected) => {
                batch.push(PlayerCommand::Shutdown);
                break;
            }
        }
    }
    batch
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{BrickTags, Cell};

    fn report(hit: Hit) -> BallReport {
        BallReport {
            recipient: Recipient::Session,
            ball_x: 300,
            ball_y: 397,
            hit,
            speed: 10,
        }
    }

    fn idle(session: &mut SessionEngine, commands: &[PlayerCommand]) -> SessionStep {
        session
            .on_report(&report(Hit::None), commands.iter().copied())
            .unwrap()
    }

    fn first_where(session: &SessionEngine, pred: impl Fn(BrickTags) -> bool) -> Cell {
        session.grid().cells_where(pred)[0]
    }

    #[test]
    fn test_brick_scores_and_is_removed() {
        let mut session = SessionEngine::new(3);
        let plain = first_where(&session, |t| !t.high_value && !t.special);
        let step = session.on_report(&report(Hit::Brick(plain)), []).unwrap();
        assert_eq!(step.reply.score, 1);
        assert!(!session.grid().live().is_alive(plain));
        let (row, col) = plain.to_wire();
        assert!(step.events.contains(&CoreEvent::BrickRemoved { row, col }));
        assert!(step.events.contains(&CoreEvent::ScoreChanged(1)));

        // A repeated report changes nothing
        let step = session.on_report(&report(Hit::Brick(plain)), []).unwrap();
        assert_eq!(step.reply.score, 1);
    }

    #[test]
    fn test_high_value_brick_scores_double() {
        let mut session = SessionEngine::new(3);
        let cell = first_where(&session, |t| t.high_value);
        let step = session.on_report(&report(Hit::Brick(cell)), []).unwrap();
        assert_eq!(step.reply.score, 2);
    }

    #[test]
    fn test_special_brick_activates_power_ups() {
        let mut session = SessionEngine::new(3);
        let cell = first_where(&session, |t| t.special);
        let step = session.on_report(&report(Hit::Brick(cell)), []).unwrap();
        assert!(step.reply.hold_active);
        assert!(step.reply.lengthen_active);
        assert_eq!(session.paddle().half_length(), 2 * PADDLE_HALF_LENGTH);

        for _ in 0..POWER_UP_TICKS - 1 {
            idle(&mut session, &[]);
        }
        assert!(session.lengthen().is_active());
        let step = idle(&mut session, &[]);
        assert!(!step.reply.lengthen_active);
        assert!(!step.reply.hold_active);
        assert_eq!(session.paddle().half_length(), PADDLE_HALF_LENGTH);
    }

    #[test]
    fn test_power_ups_pause_with_the_game() {
        let mut session = SessionEngine::new(3);
        let cell = first_where(&session, |t| t.special);
        session.on_report(&report(Hit::Brick(cell)), []).unwrap();
        let remaining = session.hold().remaining();
        assert_eq!(remaining, POWER_UP_TICKS);
        idle(&mut session, &[PlayerCommand::Pause]);
        for _ in 0..10 {
            idle(&mut session, &[]);
        }
        assert_eq!(session.hold().remaining(), remaining - 1);
    }

    #[test]
    fn test_lengthen_reclamps_paddle() {
        let mut session = SessionEngine::new(3);
        idle(&mut session, &[PlayerCommand::MovePaddle(1000)]);
        assert_eq!(session.paddle().x, PADDLE_TRACK_RIGHT - PADDLE_HALF_LENGTH);
        let cell = first_where(&session, |t| t.special);
        let step = session.on_report(&report(Hit::Brick(cell)), []).unwrap();
        assert_eq!(step.reply.paddle_x, PADDLE_TRACK_RIGHT - 2 * PADDLE_HALF_LENGTH);
    }

    #[test]
    fn test_bottom_hit_loses() {
        let mut session = SessionEngine::new(3);
        let step = session.on_report(&report(Hit::BottomWall), []).unwrap();
        assert_eq!(step.reply.game_state, GameStatus::Lose);
        assert!(step.events.contains(&CoreEvent::StatusChanged(GameStatus::Lose)));

        // Terminal until reset
        let step = idle(&mut session, &[PlayerCommand::Resume, PlayerCommand::Pause]);
        assert_eq!(step.reply.game_state, GameStatus::Lose);
        let step = idle(&mut session, &[PlayerCommand::Reset]);
        assert_eq!(step.reply.game_state, GameStatus::Reset);
        assert_eq!(step.end, Some(SessionEnd::Reset));
    }

    #[test]
    fn test_last_brick_wins() {
        let mut session = SessionEngine::new(3);
        let cells: Vec<_> = (0..BRICK_COUNT).filter_map(Cell::from_index).collect();
        let (last, rest) = cells.split_last().unwrap();
        for &cell in rest {
            let step = session.on_report(&report(Hit::Brick(cell)), []).unwrap();
            assert_ne!(step.reply.game_state, GameStatus::Win);
        }
        let step = session.on_report(&report(Hit::Brick(*last)), []).unwrap();
        assert_eq!(step.reply.game_state, GameStatus::Win);
        assert_eq!(step.reply.score as usize, BRICK_COUNT + HIGH_VALUE_BRICKS);
    }

    #[test]
    fn test_pause_and_resume() {
        let mut session = SessionEngine::new(3);
        let step = idle(&mut session, &[PlayerCommand::Pause]);
        assert_eq!(step.reply.game_state, GameStatus::Pause);
        // Paddle is frozen while paused
        let step = idle(&mut session, &[PlayerCommand::MovePaddle(25)]);
        assert_eq!(step.reply.paddle_x, PADDLE_START_X);
        let step = idle(&mut session, &[PlayerCommand::Resume]);
        assert_eq!(step.reply.game_state, GameStatus::Normal);
    }

    #[test]
    fn test_paddle_hit_with_hold_catches_ball() {
        let mut session = SessionEngine::new(3);
        let cell = first_where(&session, |t| t.special);
        session.on_report(&report(Hit::Brick(cell)), []).unwrap();

        let step = session.on_report(&report(Hit::Paddle), []).unwrap();
        assert_eq!(step.reply.game_state, GameStatus::BallHeld);
        assert_eq!(step.reply.held_ball_x, 300);

        // The held ball rides along with the paddle
        let step = idle(&mut session, &[PlayerCommand::MovePaddle(-25)]);
        assert_eq!(step.reply.held_ball_x, 275);
        assert_eq!(step.reply.paddle_x, PADDLE_START_X - 25);

        let step = idle(&mut session, &[PlayerCommand::ReleaseBall]);
        assert_eq!(step.reply.game_state, GameStatus::Normal);
    }

    #[test]
    fn test_release_after_move_in_same_tick() {
        let mut session = SessionEngine::new(3);
        let cell = first_where(&session, |t| t.special);
        session.on_report(&report(Hit::Brick(cell)), []).unwrap();
        session.on_report(&report(Hit::Paddle), []).unwrap();

        let step = idle(
            &mut session,
            &[PlayerCommand::MovePaddle(-25), PlayerCommand::ReleaseBall],
        );
        assert_eq!(step.reply.game_state, GameStatus::Normal);
        assert_eq!(step.reply.held_ball_x, 275);

        // Once released the ball is no longer tied to the paddle
        let step = idle(&mut session, &[PlayerCommand::MovePaddle(-25)]);
        assert_eq!(step.reply.held_ball_x, 300);
    }

    #[test]
    fn test_paddle_hit_without_hold_is_ordinary() {
        let mut session = SessionEngine::new(3);
        let step = session.on_report(&report(Hit::Paddle), []).unwrap();
        assert_eq!(step.reply.game_state, GameStatus::Normal);
    }

    #[test]
    fn test_shutdown_and_tick_limit() {
        let mut session = SessionEngine::new(3);
        let step = idle(&mut session, &[PlayerCommand::Shutdown, PlayerCommand::Reset]);
        assert_eq!(step.end, Some(SessionEnd::Shutdown));

        let mut session = SessionEngine::new(3).with_tick_limit(Some(3));
        assert_eq!(idle(&mut session, &[]).end, None);
        assert_eq!(idle(&mut session, &[]).end, None);
        assert_eq!(idle(&mut session, &[]).end, Some(SessionEnd::Shutdown));
    }

    #[test]
    fn test_misaddressed_report() {
        let mut session = SessionEngine::new(3);
        let mut wrong = report(Hit::None);
        wrong.recipient = Recipient::Motion;
        assert!(session.on_report(&wrong, []).is_err());
    }

    #[test]
    fn test_every_reply_reports_ball_position() {
        let mut session = SessionEngine::new(3);
        let step = idle(&mut session, &[]);
        assert_eq!(step.events[0], CoreEvent::BallMoved { x: 300, y: 397 });
        assert_eq!(step.reply.recipient, Recipient::Motion);
    }
}
