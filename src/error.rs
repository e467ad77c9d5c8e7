//! Error types for the engines, the wire protocol and configuration

use thiserror::Error;

use crate::protocol::Recipient;

/// Violations of the engine-to-engine protocol.
///
/// None of these are recoverable: they mean the two engines no longer agree
/// on the state of the game, so the affected engine halts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("{receiver} engine received a message addressed to the {addressed} engine")]
    Misaddressed {
        receiver: Recipient,
        addressed: Recipient,
    },
    #[error("unknown recipient tag {0}")]
    UnknownRecipient(i32),
    #[error("unknown game state code {0}")]
    UnknownGameState(i32),
    #[error("hit coordinate out of range: row={row}, col={col}")]
    HitOutOfRange { row: i32, col: i32 },
    #[error("invalid {field} value {value}")]
    InvalidField { field: &'static str, value: i32 },
    #[error("peer engine disconnected")]
    Disconnected,
}

/// Reasons an engine loop stopped abnormally
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("protocol violation: {0}")]
    Protocol(#[from] ProtocolError),
    #[error("{0} engine thread panicked")]
    Panicked(Recipient),
}

/// Failures loading or saving `Settings`
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings file I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("settings file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
