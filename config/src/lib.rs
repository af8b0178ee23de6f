//! Configuration loading for Beacon.
//!
//! ```toml
//! [guidance]
//! interference_fill_variance = 0.1
//! interference_time = 0.05
//! distance_check_wait_time = 1.0
//! initial_distance_check_wait_time = 3.0
//!
//! [tiers.high]
//! distance = 10.0
//! grain_intensity = 0.15
//! animator_speed = 6.0
//! proximity_fill = 0.9
//! interference_volume = 0.8
//! # [tiers.medium], [tiers.low] and [tiers.default] follow the same shape
//!
//! [session]
//! end_game_delay = 5.0
//! cursor_visible_in_game = false
//!
//! [scene]
//! objective_count = 5
//! spread = 80.0
//! reach_radius = 2.0
//! ```
//!
//! Raw sections carry `Option` fields; [`BeaconConfig::resolve`] fills gaps
//! with defaults and validates into [`Settings`]. A bad value is a startup
//! error, never a silent fallback.

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use beacon_types::settings::seconds;
use beacon_types::{GuidanceSettings, SceneSettings, SessionSettings, SettingsError, TierTable};

/// Environment variable that overrides the config file location.
pub const CONFIG_ENV_VAR: &str = "BEACON_CONFIG";

#[derive(Debug, Default, Deserialize)]
pub struct BeaconConfig {
    pub guidance: Option<GuidanceConfig>,
    /// All four tiers must be present when the table is given.
    pub tiers: Option<TierTable>,
    pub session: Option<SessionConfig>,
    pub scene: Option<SceneConfig>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid config at {}: {source}", path.display())]
    Invalid {
        path: PathBuf,
        #[source]
        source: SettingsError,
    },
}

impl ConfigError {
    pub fn path(&self) -> &PathBuf {
        match self {
            ConfigError::Read { path, .. }
            | ConfigError::Parse { path, .. }
            | ConfigError::Invalid { path, .. } => path,
        }
    }
}

/// Timing for the guidance loop. All values are seconds.
#[derive(Debug, Default, Deserialize)]
pub struct GuidanceConfig {
    pub interference_fill_variance: Option<f32>,
    pub interference_time: Option<f32>,
    pub distance_check_wait_time: Option<f32>,
    pub initial_distance_check_wait_time: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SessionConfig {
    /// Seconds spent in `End` before returning to the menu. Default: 5.
    pub end_game_delay: Option<f32>,
    #[serde(default)]
    pub cursor_visible_in_game: bool,
}

/// Generated scene layout, consumed by the simulator.
#[derive(Debug, Default, Deserialize)]
pub struct SceneConfig {
    pub objective_count: Option<u32>,
    pub spread: Option<f32>,
    pub reach_radius: Option<f32>,
}

/// Fully resolved and validated settings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    pub guidance: GuidanceSettings,
    pub session: SessionSettings,
    pub scene: SceneSettings,
}

fn seconds_or(
    field: &'static str,
    value: Option<f32>,
    default: Duration,
) -> Result<Duration, SettingsError> {
    value.map_or(Ok(default), |secs| seconds(field, secs))
}

impl BeaconConfig {
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read config at {:?}: {}", path, err);
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        };

        match Self::parse(&content) {
            Ok(config) => Ok(config),
            Err(err) => {
                tracing::warn!("Failed to parse config at {:?}: {}", path, err);
                Err(ConfigError::Parse {
                    path: path.to_path_buf(),
                    source: err,
                })
            }
        }
    }

    /// Fill missing values with defaults and validate.
    pub fn resolve(&self) -> Result<Settings, SettingsError> {
        let defaults = Settings::default();

        let guidance = {
            let raw = self.guidance.as_ref();
            let base = &defaults.guidance;
            GuidanceSettings::new(
                self.tiers.clone().unwrap_or_else(|| base.tiers().clone()),
                raw.and_then(|g| g.interference_fill_variance)
                    .unwrap_or(base.interference_fill_variance()),
                seconds_or(
                    "interference_time",
                    raw.and_then(|g| g.interference_time),
                    base.interference_time(),
                )?,
                seconds_or(
                    "distance_check_wait_time",
                    raw.and_then(|g| g.distance_check_wait_time),
                    base.distance_check_wait_time(),
                )?,
                seconds_or(
                    "initial_distance_check_wait_time",
                    raw.and_then(|g| g.initial_distance_check_wait_time),
                    base.initial_distance_check_wait_time(),
                )?,
            )?
        };

        let session = match &self.session {
            Some(raw) => SessionSettings {
                end_game_delay: seconds_or(
                    "end_game_delay",
                    raw.end_game_delay,
                    defaults.session.end_game_delay,
                )?,
                cursor_visible_in_game: raw.cursor_visible_in_game,
            },
            None => defaults.session,
        };

        let scene = match &self.scene {
            Some(raw) => {
                let base = defaults.scene;
                SceneSettings::new(
                    raw.objective_count
                        .unwrap_or(u32::from(base.objective_count())),
                    raw.spread.unwrap_or(base.spread()),
                    raw.reach_radius.unwrap_or(base.reach_radius()),
                )?
            }
            None => defaults.scene,
        };

        Ok(Settings {
            guidance,
            session,
            scene,
        })
    }
}

impl Settings {
    /// Load, resolve, and validate settings from the default location.
    ///
    /// A missing file yields defaults; anything unreadable or invalid is an error.
    pub fn load() -> Result<Self, ConfigError> {
        let Some(path) = config_path() else {
            return Ok(Self::default());
        };
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let raw = BeaconConfig::load_from(path)?;
        raw.resolve().map_err(|source| {
            tracing::warn!(path = %path.display(), error = %source, "Rejected config");
            ConfigError::Invalid {
                path: path.to_path_buf(),
                source,
            }
        })
    }
}

/// `$BEACON_CONFIG` if set, otherwise `~/.beacon/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    if let Ok(custom) = env::var(CONFIG_ENV_VAR)
        && !custom.trim().is_empty()
    {
        return Some(PathBuf::from(custom));
    }
    dirs::home_dir().map(|home| home.join(".beacon").join("config.toml"))
}
