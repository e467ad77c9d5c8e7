//! The two engines and the ways to run them
//!
//! - `motion`: owns the ball, reports once per tick
//! - `session`: owns bricks, score, paddle and game state, replies once per tick
//! - `lockstep`: both engines alternated on one thread (deterministic)
//! - `runtime`: both engines on their own threads over the one-slot channel

pub mod lockstep;
pub mod motion;
pub mod runtime;
pub mod session;

pub use lockstep::{Lockstep, TickOutcome};
pub use motion::{MotionEngine, MotionPhase};
pub use runtime::{GameHandle, RunSummary, spawn};
pub use session::{PowerUp, SessionEnd, SessionEngine, SessionStep};
