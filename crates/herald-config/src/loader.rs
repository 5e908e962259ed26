//! Configuration loading from TOML with environment variable overrides.

use crate::schema::Config;
use herald_common::HeraldError;
use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Default configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "herald.toml";

/// Environment variable naming an explicit configuration file.
pub const CONFIG_PATH_ENV: &str = "HERALD_CONFIG";

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error when reading configuration file.
    #[error("Failed to read configuration file '{path}': {source}")]
    Io {
        /// File that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// TOML parsing error.
    #[error("Failed to parse TOML configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// Environment variable parsing error.
    #[error("Failed to parse environment variable '{var}': {message}")]
    EnvParse {
        /// Variable name.
        var: String,
        /// Parse failure description.
        message: String,
    },

    /// Configuration validation error.
    #[error(transparent)]
    Validation(#[from] HeraldError),
}

impl From<ConfigError> for HeraldError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation(inner) => inner,
            other => Self::config(other.to_string()),
        }
    }
}

/// Configuration loader for the application.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads configuration from an explicit path, `HERALD_CONFIG`, `herald.toml`,
    /// or defaults (in that order), then applies environment overrides and validates.
    pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
        let resolved = path
            .map(Path::to_path_buf)
            .or_else(|| env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from))
            .or_else(|| {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                default.exists().then_some(default)
            });

        let mut config = match resolved {
            Some(path) => Self::read_file(&path)?,
            None => {
                debug!("No configuration file found, using defaults");
                Config::default()
            }
        };

        Self::apply_overrides(&mut config, |var| env::var(var).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a TOML configuration file without validating it.
    pub fn read_file(path: &Path) -> Result<Config, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&content)?;
        info!(path = %path.display(), "Configuration file loaded");
        Ok(config)
    }

    /// Parses TOML text into a configuration; missing sections take their defaults.
    pub fn parse(content: &str) -> Result<Config, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Applies overrides from a variable lookup (the process environment in production).
    pub fn apply_overrides<F>(config: &mut Config, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup("DISCORD_TOKEN") {
            config.discord.token = token;
        }

        if let Some(ids) = lookup("HERALD_ADMIN_IDS") {
            config.discord.admin_ids = ids
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| parse_var("HERALD_ADMIN_IDS", s))
                .collect::<Result<_, _>>()?;
        }

        if let Some(guild) = lookup("HERALD_TEST_GUILD_ID") {
            config.interactions.test_guild_id = Some(parse_var("HERALD_TEST_GUILD_ID", &guild)?);
        }

        if let Some(global) = lookup("HERALD_REGISTER_GLOBALLY") {
            config.interactions.global = parse_var("HERALD_REGISTER_GLOBALLY", &global)?;
        }

        Ok(())
    }
}

fn parse_var<T>(var: &str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::EnvParse {
        var: var.to_string(),
        message: e.to_string(),
    })
}
