//! Match settings and their persistence
//!
//! [`MatchSettings`] is stored as pretty-printed JSON in the platform config
//! directory. A missing or unreadable file is not an error for the match: the
//! loader logs and falls back to defaults.

use super::error::{CoreError, CoreResult};
use bevy_ecs::prelude::*;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info, warn};

/// Settings filename
const SETTINGS_FILENAME: &str = "settings.json";

/// Tunables for the match client
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchSettings {
    /// Period of the clock prediction tick, milliseconds
    pub clock_tick_ms: u64,

    /// How long a move animates before its snapshot is committed, milliseconds
    pub commit_delay_ms: u64,

    /// Charge the side to move for server-to-client transit time
    pub compensate_transit_lag: bool,

    /// Whether to show legal destinations for the selected piece
    pub show_hints: bool,

    /// Whether to highlight the previous move
    pub highlight_last_move: bool,
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            clock_tick_ms: 100,
            commit_delay_ms: 100,
            compensate_transit_lag: true,
            show_hints: true,
            highlight_last_move: true,
        }
    }
}

impl MatchSettings {
    pub fn clock_tick(&self) -> Duration {
        Duration::from_millis(self.clock_tick_ms)
    }

    pub fn commit_delay(&self) -> Duration {
        Duration::from_millis(self.commit_delay_ms)
    }

    /// Reject values the clock cannot run with
    pub fn validate(&self) -> CoreResult<()> {
        if self.clock_tick_ms == 0 {
            return Err(CoreError::InvalidSetting {
                field: "clock_tick_ms",
                message: "tick period must be positive".to_string(),
            });
        }
        Ok(())
    }
}

/// Resolve the settings file path
///
/// Returns `settings.json` in the user's configuration directory, or in the
/// working directory when the platform has none.
pub fn settings_path() -> PathBuf {
    if let Some(proj_dirs) = ProjectDirs::from("com", "duelchess", "DuelChess") {
        proj_dirs.config_dir().join(SETTINGS_FILENAME)
    } else {
        PathBuf::from(SETTINGS_FILENAME)
    }
}

/// Read and validate settings from `path`
pub fn load_settings_from(path: &Path) -> CoreResult<MatchSettings> {
    let contents = fs::read_to_string(path)?;
    let settings: MatchSettings = serde_json::from_str(&contents)?;
    settings.validate()?;
    Ok(settings)
}

/// Write settings to `path`, creating parent directories as needed
pub fn save_settings_to(path: &Path, settings: &MatchSettings) -> CoreResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(settings)?;
    fs::write(path, json)?;
    Ok(())
}

/// Load settings, falling back to defaults on any failure
pub fn load_settings(path: &Path) -> MatchSettings {
    if !path.exists() {
        info!("[SETTINGS] No settings file found at {:?}. Using defaults.", path);
        return MatchSettings::default();
    }
    match load_settings_from(path) {
        Ok(settings) => {
            info!("[SETTINGS] Loaded settings from {:?}", path);
            settings
        }
        Err(e) => {
            warn!(
                "[SETTINGS] Failed to load settings at {:?}: {}. Using defaults.",
                path, e
            );
            MatchSettings::default()
        }
    }
}

/// Save settings when the resource changes
pub fn save_settings_system(settings: Res<MatchSettings>) {
    if !settings.is_changed() || settings.is_added() {
        return;
    }
    let path = settings_path();
    match save_settings_to(&path, &settings) {
        Ok(()) => info!("[SETTINGS] Saved settings to {:?}", path),
        Err(e) => error!("[SETTINGS] Failed to save settings at {:?}: {}", path, e),
    }
}
