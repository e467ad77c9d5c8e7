//! Lockstep Breakout - headless runner
//!
//! Starts both engines on their own threads and follows the collaborator
//! feed, optionally letting the autopilot play.

use std::path::PathBuf;

use clap::Parser;
use lockstep_breakout::Settings;
use lockstep_breakout::autopilot::Autopilot;
use lockstep_breakout::engine;
use lockstep_breakout::protocol::CoreEvent;

#[derive(Parser, Debug)]
#[command(name = "lockstep-breakout")]
#[command(about = "Brick-breaker driven by a motion engine and a session engine in lockstep")]
struct Cli {
    /// JSON settings file; flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,
    /// Seed for tagging special and high-value bricks
    #[arg(long)]
    seed: Option<u64>,
    /// Stop after this many ticks (0 = run until interrupted)
    #[arg(long)]
    ticks: Option<u64>,
    /// Milliseconds between motion ticks (0 = as fast as possible)
    #[arg(long)]
    tick_interval_ms: Option<u64>,
    /// Leave the paddle alone instead of letting the demo controller play
    #[arg(long)]
    no_autopilot: bool,
}

impl Cli {
    fn settings(&self) -> Result<Settings, lockstep_breakout::SettingsError> {
        let mut settings = match &self.config {
            Some(path) => Settings::load(path)?,
            None => Settings::default(),
        };
        if let Some(seed) = self.seed {
            settings.seed = seed;
        }
        if let Some(ticks) = self.ticks {
            settings.max_ticks = ticks;
        }
        if let Some(interval) = self.tick_interval_ms {
            settings.tick_interval_ms = interval;
        }
        if self.no_autopilot {
            settings.autopilot = false;
        }
        Ok(settings)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();
    let settings = cli.settings()?;

    log::info!(
        "Lockstep Breakout starting (seed {}, {} ms/tick, autopilot {})",
        settings.seed,
        settings.tick_interval_ms,
        if settings.autopilot { "on" } else { "off" }
    );

    let mut pilot = settings.autopilot.then(|| Autopilot::new().restarting());
    let handle = engine::spawn(settings);
    let commands = handle.commands();

    for event in handle.events().iter() {
        match event {
            CoreEvent::BallMoved { x, y } => log::trace!("Ball at ({}, {})", x, y),
            CoreEvent::BrickRemoved { row, col } => log::debug!("Brick ({}, {}) removed", row, col),
            CoreEvent::ScoreChanged(score) => log::debug!("Score {}", score),
            CoreEvent::StatusChanged(status) => log::info!("Game state: {:?}", status),
            CoreEvent::SessionReset { generation } => log::info!("New game (#{})", generation),
            CoreEvent::PaddleMoved { .. } => {}
        }
        if let Some(command) = pilot.as_mut().and_then(|pilot| pilot.observe(&event)) {
            if commands.send(command).is_err() {
                break;
            }
        }
    }

    let summary = handle.join()?;
    log::info!(
        "Finished: {} ticks, {} resets, final score {} ({:?})",
        summary.ticks,
        summary.generations,
        summary.score,
        summary.status
    );
    Ok(())
}
