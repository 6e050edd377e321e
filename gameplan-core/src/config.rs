//! Gameplan configuration.
//!
//! Read from `~/.config/gameplan/config.toml`, with every key overridable by
//! a `GAMEPLAN_`-prefixed environment variable.

use std::path::{Path, PathBuf};

use chrono_tz::Tz;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_EVENT_DURATION_HOURS, DEFAULT_MAX_RESULTS, DEFAULT_REMINDER_MINUTES,
    DEFAULT_SOURCE_URL, DEFAULT_TIME_ZONE,
};
use crate::error::{GameplanError, GameplanResult};
use crate::bootstrap::BootstrapSettings;
use crate::sync::{EventSettings, Strategy};

static DEFAULT_DATABASE_PATH: &str = "~/.local/share/gameplan/games.db";

fn default_database_path() -> PathBuf {
    PathBuf::from(DEFAULT_DATABASE_PATH)
}

fn default_time_zone() -> String {
    DEFAULT_TIME_ZONE.to_string()
}

fn default_club_name() -> String {
    "Basket".to_string()
}

fn default_source_url() -> String {
    DEFAULT_SOURCE_URL.to_string()
}

fn default_max_results() -> usize {
    DEFAULT_MAX_RESULTS
}

fn default_event_duration_hours() -> i64 {
    DEFAULT_EVENT_DURATION_HOURS
}

fn default_reminder_minutes() -> i64 {
    DEFAULT_REMINDER_MINUTES
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GameplanConfig {
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// Venue timezone for civil schedule times and event payloads.
    #[serde(default = "default_time_zone")]
    pub time_zone: String,

    /// Used as the club calendar name and as prefix for league calendars.
    #[serde(default = "default_club_name")]
    pub club_name: String,

    /// Club id on the schedule site.
    pub club_id: Option<String>,

    #[serde(default = "default_source_url")]
    pub source_url: String,

    /// Google account whose stored session is used.
    pub google_account: Option<String>,

    /// E-mail address that gets read access to every calendar.
    pub share_with: Option<String>,

    #[serde(default)]
    pub strategy: Strategy,

    #[serde(default = "default_max_results")]
    pub max_results: usize,

    #[serde(default = "default_event_duration_hours")]
    pub event_duration_hours: i64,

    #[serde(default = "default_reminder_minutes")]
    pub reminder_minutes: i64,

    /// Webhook receiving the run summary. Logged only when unset.
    pub notify_url: Option<String>,
}

impl GameplanConfig {
    pub fn config_path() -> GameplanResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| GameplanError::Configuration("Could not determine config directory".into()))?
            .join("gameplan");

        Ok(config_dir.join("config.toml"))
    }

    /// Load the config file (creating a commented default on first use)
    /// and apply environment overrides.
    pub fn load() -> GameplanResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> GameplanResult<Self> {
        let config: GameplanConfig = Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix("GAMEPLAN"))
            .build()
            .map_err(|e| GameplanError::Configuration(e.to_string()))?
            .try_deserialize()
            .map_err(|e| GameplanError::Configuration(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> GameplanResult<()> {
        self.tz()?;

        if self.event_duration_hours <= 0 {
            return Err(GameplanError::Configuration(
                "event_duration_hours must be positive".into(),
            ));
        }

        if self.max_results == 0 {
            return Err(GameplanError::Configuration(
                "max_results must be at least 1".into(),
            ));
        }

        Ok(())
    }

    pub fn tz(&self) -> GameplanResult<Tz> {
        self.time_zone.parse::<Tz>().map_err(|_| {
            GameplanError::Configuration(format!("Unknown time zone '{}'", self.time_zone))
        })
    }

    pub fn database_path(&self) -> PathBuf {
        let full_path_str =
            shellexpand::tilde(&self.database_path.to_string_lossy()).into_owned();

        PathBuf::from(full_path_str)
    }

    pub fn google_account(&self) -> GameplanResult<&str> {
        self.google_account.as_deref().ok_or_else(|| {
            GameplanError::Configuration(
                "No google_account configured. Run `gameplan auth` first.".into(),
            )
        })
    }

    pub fn club_id(&self) -> GameplanResult<&str> {
        self.club_id
            .as_deref()
            .ok_or_else(|| GameplanError::Configuration("No club_id configured".into()))
    }

    pub fn event_settings(&self) -> GameplanResult<EventSettings> {
        Ok(EventSettings {
            time_zone: self.tz()?,
            duration_hours: self.event_duration_hours,
            reminder_minutes: self.reminder_minutes,
            max_results: self.max_results,
        })
    }

    pub fn bootstrap_settings(&self) -> BootstrapSettings {
        BootstrapSettings {
            club_name: self.club_name.clone(),
            time_zone: self.time_zone.clone(),
            share_with: self.share_with.clone().filter(|s| !s.trim().is_empty()),
        }
    }

    /// Save the current config to its default location.
    pub fn save(&self) -> GameplanResult<()> {
        let config_path = Self::config_path()?;

        let content =
            toml::to_string_pretty(self).map_err(|e| GameplanError::Configuration(e.to_string()))?;

        std::fs::write(&config_path, content).map_err(|e| {
            GameplanError::Configuration(format!("Could not write config file: {e}"))
        })?;

        Ok(())
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> GameplanResult<()> {
        let contents = format!(
            "\
# gameplan configuration

# Where games and calendars are stored:
# database_path = \"{DEFAULT_DATABASE_PATH}\"

# Venue timezone:
# time_zone = \"{DEFAULT_TIME_ZONE}\"

# Club on the schedule site:
# club_id = \"163\"
# club_name = \"Basket\"

# Google account used for the calendars (set by `gameplan auth`):
# google_account = \"you@example.com\"

# Give this address read access to every calendar:
# share_with = \"coach@example.com\"

# \"batched\" or \"sequential\":
# strategy = \"batched\"

# Webhook for run summaries:
# notify_url = \"https://discord.com/api/webhooks/...\"
"
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                GameplanError::Configuration(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents).map_err(|e| {
            GameplanError::Configuration(format!("Could not write config file: {e}"))
        })?;

        Ok(())
    }
}
