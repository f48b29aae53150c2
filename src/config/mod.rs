//! Configuration loading and validation.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

use crate::models::TeamColor;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Run-constant mapping from export colors to league teams.
///
/// Supplied by the caller for the whole import run; the engine never derives
/// team assignment beyond reading a row's color.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamAssignment {
    /// Team credited for Orange-side rows
    #[serde(default = "default_orange_team")]
    pub orange: String,

    /// Team credited for Blue-side rows
    #[serde(default = "default_blue_team")]
    pub blue: String,
}

fn default_orange_team() -> String {
    "Team Orange".to_string()
}

fn default_blue_team() -> String {
    "Team Blue".to_string()
}

impl Default for TeamAssignment {
    fn default() -> Self {
        Self {
            orange: default_orange_team(),
            blue: default_blue_team(),
        }
    }
}

impl TeamAssignment {
    pub fn new(orange: String, blue: String) -> Self {
        Self { orange, blue }
    }

    /// Team name credited for rows of the given color.
    pub fn team_for(&self, color: TeamColor) -> &str {
        match color {
            TeamColor::Orange => &self.orange,
            TeamColor::Blue => &self.blue,
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub teams: TeamAssignment,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
            teams: TeamAssignment::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &PathBuf) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.teams.orange.trim().is_empty() || self.teams.blue.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "Team names must not be empty".to_string(),
            ));
        }

        if self.teams.orange.eq_ignore_ascii_case(&self.teams.blue) {
            return Err(ConfigError::ValidationError(format!(
                "Both colors assigned to the same team: {}",
                self.teams.orange
            )));
        }

        Ok(())
    }
}
