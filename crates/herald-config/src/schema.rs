//! Configuration schema definitions using serde.

use herald_common::{parse_hex_color, HeraldError, LoggingConfig};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure for Herald.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Discord configuration.
    pub discord: DiscordConfig,
    /// Slash command registration settings.
    pub interactions: InteractionsConfig,
    /// Embed colour palette.
    pub embed_colors: EmbedColorsConfig,
    /// Logging configuration.
    pub logging: LogSettings,
}

/// Discord bot configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscordConfig {
    /// Discord bot token.
    pub token: String,
    /// User IDs allowed to run commands in the admin category.
    pub admin_ids: Vec<u64>,
}

/// Slash command registration settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionsConfig {
    /// Whether slash commands are registered at all.
    pub slash: bool,
    /// Register globally instead of in the test guild.
    pub global: bool,
    /// Guild that receives the command set when `global` is false.
    pub test_guild_id: Option<u64>,
}

/// Embed colour palette as `#RRGGBB` strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbedColorsConfig {
    /// Default embed colour.
    pub default: String,
    /// Colour for success embeds.
    pub success: String,
    /// Colour for error embeds.
    pub error: String,
    /// Colour for warning embeds.
    pub warning: String,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Log level filter.
    pub level: String,
    /// Directory for the rolling log files.
    pub directory: String,
    /// Rolling file name prefix.
    pub file_prefix: String,
}

impl Config {
    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), HeraldError> {
        crate::validator::ConfigValidator::validate(self)
    }

    /// Returns whether the user is a configured bot admin.
    pub fn is_admin(&self, user_id: u64) -> bool {
        self.discord.admin_ids.contains(&user_id)
    }
}

impl EmbedColorsConfig {
    /// Packed RGB value of the default colour.
    pub fn default_rgb(&self) -> u32 {
        parse_hex_color(&self.default).unwrap_or(DEFAULT_EMBED_RGB)
    }

    /// Packed RGB value of the success colour.
    pub fn success_rgb(&self) -> u32 {
        parse_hex_color(&self.success).unwrap_or(DEFAULT_SUCCESS_RGB)
    }

    /// Packed RGB value of the error colour.
    pub fn error_rgb(&self) -> u32 {
        parse_hex_color(&self.error).unwrap_or(DEFAULT_ERROR_RGB)
    }

    /// Packed RGB value of the warning colour.
    pub fn warning_rgb(&self) -> u32 {
        parse_hex_color(&self.warning).unwrap_or(DEFAULT_WARNING_RGB)
    }
}

/// Fallback for the default embed colour (`#FF8C00`).
pub const DEFAULT_EMBED_RGB: u32 = 0x00FF_8C00;

/// Fallback for the success embed colour (`#00FF00`).
pub const DEFAULT_SUCCESS_RGB: u32 = 0x0000_FF00;

/// Fallback for the error embed colour (`#D61A3C`).
pub const DEFAULT_ERROR_RGB: u32 = 0x00D6_1A3C;

/// Fallback for the warning embed colour (`#F7E919`).
pub const DEFAULT_WARNING_RGB: u32 = 0x00F7_E919;

impl LogSettings {
    /// Converts these settings into the logging bootstrap configuration.
    pub fn to_logging_config(&self) -> LoggingConfig {
        LoggingConfig {
            level: self.level.clone(),
            directory: PathBuf::from(&self.directory),
            file_prefix: self.file_prefix.clone(),
            ..LoggingConfig::default()
        }
    }
}
