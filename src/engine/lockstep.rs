//! Single-threaded lockstep driver
//!
//! Alternates the two engines exactly as the channel would (report, then
//! reply, then the next report) but on the calling thread. Messages still go
//! through their wire encoding, so a run here exercises the same decoding
//! and recipient checks as the threaded runtime.

use crate::error::{EngineError, ProtocolError};
use crate::protocol::{BallReport, CoreEvent, PlayerCommand, Recipient, SessionReply, WireMessage};

use super::motion::MotionEngine;
use super::session::{SessionEnd, SessionEngine};

/// What happened on a lockstep tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Continued,
    /// Both engines were rebuilt
    Reset { generation: u64 },
    Shutdown,
}

pub struct Lockstep {
    seed: u64,
    generation: u64,
    motion: MotionEngine,
    session: SessionEngine,
    events: Vec<CoreEvent>,
    stopped: bool,
}

impl Lockstep {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            generation: 0,
            motion: MotionEngine::new(),
            session: SessionEngine::new(seed),
            events: Vec::new(),
            stopped: false,
        }
    }

    pub fn motion(&self) -> &MotionEngine {
        &self.motion
    }

    pub fn session(&self) -> &SessionEngine {
        &self.session
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Collaborator events produced since the last call
    pub fn drain_events(&mut self) -> Vec<CoreEvent> {
        std::mem::take(&mut self.events)
    }

    /// Run one request/reply exchange with `commands` buffered for the session
    pub fn step(
        &mut self,
        commands: impl IntoIterator<Item = PlayerCommand>,
    ) -> Result<TickOutcome, EngineError> {
        if self.stopped {
            return Err(ProtocolError::Disconnected.into());
        }

        let report = deliver::<BallReport>(&self.motion.tick(), Recipient::Session)?;
        let step = self.session.on_report(&report, commands)?;
        self.events.extend(step.events);

        match step.end {
            None => {
                let reply = deliver::<SessionReply>(&step.reply, Recipient::Motion)?;
                self.motion.apply_reply(&reply);
                Ok(TickOutcome::Continued)
            }
            Some(SessionEnd::Reset) => {
                self.generation += 1;
                self.motion = MotionEngine::new();
                self.session = SessionEngine::new(self.seed.wrapping_add(self.generation));
                self.events.push(CoreEvent::SessionReset {
                    generation: self.generation,
                });
                log::info!("Lockstep generation {} started", self.generation);
                Ok(TickOutcome::Reset {
                    generation: self.generation,
                })
            }
            Some(SessionEnd::Shutdown) => {
                self.stopped = true;
                Ok(TickOutcome::Shutdown)
            }
        }
    }
}

/// Pass a message through its wire form, as the channel does
fn deliver<M: WireMessage>(message: &M, to: Recipient) -> Result<M, ProtocolError> {
    let received = M::from_words(&message.to_words())?;
    if received.recipient() != to {
        return Err(ProtocolError::Misaddressed {
            receiver: to,
            addressed: received.recipient(),
        });
    }
    Ok(received)
}
