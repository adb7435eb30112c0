//! Client settings and their persistence
//!
//! Saves and loads [`ClientSettings`] to/from a JSON file so preferences
//! survive across sessions.
//!
//! # File Location
//!
//! `settings.json` in the platform configuration directory resolved by
//! `directories::ProjectDirs`, e.g. `~/.config/strategik/settings.json`.
//! Falls back to `settings.json` in the working directory when no config
//! directory exists.
//!
//! # Precedence
//!
//! defaults < settings file < environment (`STRATEGIK_SERVER_URL`,
//! `STRATEGIK_AI_DELAY_MS`) < command-line flags
//!
//! # Error Handling
//!
//! - Load failures fall back to default settings and are logged
//! - Save failures are returned to the caller

use crate::core::error::{CoreError, CoreResult};
use crate::rendering::network::NetworkTopology;
use crate::rendering::theme::BoardTheme;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Settings filename
const SETTINGS_FILENAME: &str = "settings.json";

pub const ENV_SERVER_URL: &str = "STRATEGIK_SERVER_URL";
pub const ENV_AI_DELAY_MS: &str = "STRATEGIK_AI_DELAY_MS";

/// Side played by the human
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerSide {
    #[default]
    White,
    Black,
}

impl PlayerSide {
    pub fn color(self) -> shakmaty::Color {
        match self {
            PlayerSide::White => shakmaty::Color::White,
            PlayerSide::Black => shakmaty::Color::Black,
        }
    }
}

/// Everything the client can be configured with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    /// Base URL of the AI service
    pub server_url: String,

    /// Cosmetic pause before each AI move request
    pub ai_move_delay_ms: u64,

    /// Board edge length in pixels
    pub board_size: u32,

    /// Draw the board with black at the bottom
    pub flipped: bool,

    pub player_color: PlayerSide,

    pub board_theme: BoardTheme,

    /// Layers drawn before the first snapshot arrives
    pub network_layers: NetworkTopology,

    pub network_width: u32,
    pub network_height: u32,

    /// Post finished games to the service
    pub save_games: bool,

    pub player_name: String,
    pub ai_name: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:5000".to_string(),
            ai_move_delay_ms: 500,
            board_size: 480,
            flipped: false,
            player_color: PlayerSide::White,
            board_theme: BoardTheme::Classic,
            network_layers: NetworkTopology::default(),
            network_width: 600,
            network_height: 400,
            save_games: true,
            player_name: "Human".to_string(),
            ai_name: "Strategik DQN".to_string(),
        }
    }
}

impl ClientSettings {
    pub fn ai_move_delay(&self) -> Duration {
        Duration::from_millis(self.ai_move_delay_ms)
    }

    /// Load from the platform settings file, defaults on any failure
    pub fn load() -> Self {
        Self::load_from(&settings_path())
    }

    /// Load from a specific file, defaults on any failure
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            info!("[SETTINGS] No settings file found at {:?}. Using defaults.", path);
            return Self::default();
        }

        match Self::read(path) {
            Ok(settings) => {
                info!("[SETTINGS] Loaded settings from {:?}", path);
                settings
            }
            Err(e) => {
                warn!(
                    "[SETTINGS] Failed to load settings file at {:?}: {}. Using defaults.",
                    path, e
                );
                Self::default()
            }
        }
    }

    fn read(path: &Path) -> CoreResult<Self> {
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Save to the platform settings file
    pub fn save(&self) -> CoreResult<PathBuf> {
        let path = settings_path();
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save to a specific file, creating parent directories
    pub fn save_to(&self, path: &Path) -> CoreResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        info!("[SETTINGS] Saved settings to {:?}", path);
        Ok(())
    }

    /// Apply `STRATEGIK_*` overrides from the process environment
    pub fn apply_env(&mut self) -> CoreResult<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key lookup
    pub fn apply_overrides<F>(&mut self, lookup: F) -> CoreResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_SERVER_URL) {
            let url = url.trim();
            if url.is_empty() {
                return Err(CoreError::InvalidSetting {
                    key: ENV_SERVER_URL.to_string(),
                    message: "empty URL".to_string(),
                });
            }
            self.server_url = url.to_string();
        }

        if let Some(delay) = lookup(ENV_AI_DELAY_MS) {
            self.ai_move_delay_ms =
                delay
                    .trim()
                    .parse()
                    .map_err(|e: std::num::ParseIntError| CoreError::InvalidSetting {
                        key: ENV_AI_DELAY_MS.to_string(),
                        message: e.to_string(),
                    })?;
        }

        Ok(())
    }
}

/// Helper to resolve the settings file path
pub fn settings_path() -> PathBuf {
    if let Some(proj_dirs) = ProjectDirs::from("com", "strategik", "strategik") {
        proj_dirs.config_dir().join(SETTINGS_FILENAME)
    } else {
        PathBuf::from(SETTINGS_FILENAME)
    }
}
