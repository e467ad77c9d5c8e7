//! Runtime settings
//!
//! Only pacing and session setup live here. Arena size, speed bounds and the
//! brick layout are fixed constants in `crate::consts`.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::SettingsError;

/// Runtime settings/preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Seed for tagging special and high-value bricks
    pub seed: u64,
    /// Pause between motion ticks in milliseconds (0 = run as fast as possible)
    pub tick_interval_ms: u64,
    /// Stop a headless run after this many ticks (0 = run until shutdown)
    pub max_ticks: u64,
    /// Let the demo controller drive the paddle
    pub autopilot: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: 0,
            tick_interval_ms: 40,
            max_ticks: 0,
            autopilot: true,
        }
    }
}

impl Settings {
    /// Settings for headless runs: no pacing, fixed seed
    pub fn headless(seed: u64) -> Self {
        Self {
            seed,
            tick_interval_ms: 0,
            ..Self::default()
        }
    }

    /// Tick pacing as a `Duration` (`None` when free-running)
    pub fn tick_interval(&self) -> Option<Duration> {
        if self.tick_interval_ms == 0 {
            None
        } else {
            Some(Duration::from_millis(self.tick_interval_ms))
        }
    }

    /// Load settings from a JSON file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let json = fs::read_to_string(path)?;
        let settings = serde_json::from_str(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Save settings as pretty-printed JSON
    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings: Settings = serde_json::from_str(r#"{ "seed": 7 }"#).unwrap();
        assert_eq!(settings.seed, 7);
        assert_eq!(settings.tick_interval_ms, Settings::default().tick_interval_ms);
        assert!(settings.autopilot);
    }

    #[test]
    fn test_save_then_load() {
        let path = std::env::temp_dir().join(format!(
            "lockstep-breakout-settings-{}.json",
            std::process::id()
        ));
        let settings = Settings {
            seed: 42,
            tick_interval_ms: 0,
            max_ticks: 500,
            autopilot: false,
        };
        settings.save(&path).unwrap();
        let loaded = Settings::load(&path).unwrap();
        let _ = fs::remove_file(&path);
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_tick_interval() {
        assert_eq!(Settings::headless(1).tick_interval(), None);
        assert_eq!(
            Settings::default().tick_interval(),
            Some(Duration::from_millis(40))
        );
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = Settings::load(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, SettingsError::Io(_)));
    }
}
