//! Threaded runtime
//!
//! A supervisor thread owns the session engine and, for every session
//! generation, runs the motion engine on a scoped thread connected through a
//! fresh channel pair. A reset ends the generation: both engines stop, the
//! supervisor announces the new generation and starts over with full state.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use crate::channel;
use crate::error::EngineError;
use crate::protocol::{CoreEvent, GameStatus, PlayerCommand, Recipient};
use crate::settings::Settings;

use super::motion::MotionEngine;
use super::session::{SessionEnd, SessionEngine};

/// Totals for a finished run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Resets performed
    pub generations: u64,
    /// Ticks across all generations
    pub ticks: u64,
    /// Score and state of the last session
    pub score: u32,
    pub status: GameStatus,
}

/// Handle to a running game
pub struct GameHandle {
    commands: Sender<PlayerCommand>,
    events: Receiver<CoreEvent>,
    supervisor: JoinHandle<Result<RunSummary, EngineError>>,
}

impl GameHandle {
    /// Queue a command for the session engine. Returns false once the game
    /// has stopped.
    pub fn send(&self, command: PlayerCommand) -> bool {
        self.commands.send(command).is_ok()
    }

    pub fn commands(&self) -> Sender<PlayerCommand> {
        self.commands.clone()
    }

    pub fn events(&self) -> &Receiver<CoreEvent> {
        &self.events
    }

    /// Ask the engines to stop and wait for them
    pub fn shutdown(self) -> Result<RunSummary, EngineError> {
        let _ = self.commands.send(PlayerCommand::Shutdown);
        self.join()
    }

    /// Wait for the engines to stop on their own
    pub fn join(self) -> Result<RunSummary, EngineError> {
        let GameHandle {
            commands,
            events,
            supervisor,
        } = self;
        // Keep the command channel open so waiting is not mistaken for a shutdown
        let result = supervisor
            .join()
            .map_err(|_| EngineError::Panicked(Recipient::Session))?;
        drop((commands, events));
        result
    }
}

/// Start the engines on background threads
pub fn spawn(settings: Settings) -> GameHandle {
    let (command_tx, command_rx) = mpsc::channel();
    let (event_tx, event_rx) = mpsc::channel();
    let supervisor = thread::spawn(move || supervise(&settings, &command_rx, &event_tx));
    GameHandle {
        commands: command_tx,
        events: event_rx,
        supervisor,
    }
}

fn supervise(
    settings: &Settings,
    commands: &Receiver<PlayerCommand>,
    events: &Sender<CoreEvent>,
) -> Result<RunSummary, EngineError> {
    let interval = settings.tick_interval();
    let mut generation = 0u64;
    let mut ticks = 0u64;

    loop {
        let remaining = match settings.max_ticks {
            0 => None,
            max => Some(max.saturating_sub(ticks).max(1)),
        };
        let mut session =
            SessionEngine::new(settings.seed.wrapping_add(generation)).with_tick_limit(remaining);
        let (motion_link, session_link) = channel::link();

        let end = thread::scope(|scope| {
            let motion = scope.spawn(move || MotionEngine::new().run(motion_link, interval));
            let session_result = session.run(session_link, commands, events);
            let motion_result = motion
                .join()
                .map_err(|_| EngineError::Panicked(Recipient::Motion))?;
            motion_result?;
            session_result
        })?;
        ticks += session.ticks();

        match end {
            SessionEnd::Reset => {
                generation += 1;
                log::info!("Starting session generation {}", generation);
                let _ = events.send(CoreEvent::SessionReset { generation });
            }
            SessionEnd::Shutdown => {
                log::info!(
                    "Engines stopped after {} ticks, score {}",
                    ticks,
                    session.score()
                );
                return Ok(RunSummary {
                    generations: generation,
                    ticks,
                    score: session.score(),
                    status: session.status(),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_runs_to_tick_limit() {
        let settings = Settings {
            max_ticks: 200,
            ..Settings::headless(4)
        };
        let summary = spawn(settings).join().unwrap();
        assert_eq!(summary.ticks, 200);
        assert_eq!(summary.generations, 0);
    }

    #[test]
    fn test_shutdown_with_idle_player() {
        // No commands at all: the engines must keep exchanging ticks
        let handle = spawn(Settings::headless(4));
        let mut moves = 0;
        while moves < 100 {
            match handle.events().recv_timeout(Duration::from_secs(5)) {
                Ok(CoreEvent::BallMoved { .. }) => moves += 1,
                Ok(_) => {}
                Err(err) => panic!("engines stalled: {err}"),
            }
        }
        let summary = handle.shutdown().unwrap();
        assert!(summary.ticks >= 100);
    }

    #[test]
    fn test_reset_starts_new_generation() {
        let handle = spawn(Settings::headless(4));
        assert!(handle.send(PlayerCommand::Pause));
        assert!(handle.send(PlayerCommand::Reset));
        loop {
            match handle.events().recv_timeout(Duration::from_secs(5)) {
                Ok(CoreEvent::SessionReset { generation }) => {
                    assert_eq!(generation, 1);
                    break;
                }
                Ok(_) => {}
                Err(err) => panic!("no reset seen: {err}"),
            }
        }
        let summary = handle.shutdown().unwrap();
        assert_eq!(summary.generations, 1);
    }

    #[test]
    fn test_dropping_handle_stops_engines() {
        let handle = spawn(Settings::headless(4));
        let GameHandle {
            commands,
            events,
            supervisor,
        } = handle;
        drop(commands);
        drop(events);
        assert!(supervisor.join().unwrap().is_ok());
    }
}
