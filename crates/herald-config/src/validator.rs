//! Startup validation of the loaded configuration.

use crate::schema::Config;
use herald_common::{is_hex_color, HeraldError};

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validates a configuration, reporting every problem found in one error.
    pub fn validate(config: &Config) -> Result<(), HeraldError> {
        let issues = Self::issues(config);
        if issues.is_empty() {
            Ok(())
        } else {
            Err(HeraldError::config(issues.join("; ")))
        }
    }

    /// Lists the problems with a configuration; empty when it is valid.
    pub fn issues(config: &Config) -> Vec<String> {
        let mut issues = Vec::new();

        if config.discord.token.trim().is_empty() {
            issues.push("Discord token cannot be empty".to_string());
        }

        if config.discord.admin_ids.contains(&0) {
            issues.push("discord.admin_ids cannot contain 0".to_string());
        }

        let interactions = &config.interactions;
        if interactions.slash
            && !interactions.global
            && interactions.test_guild_id.unwrap_or(0) == 0
        {
            issues.push(
                "interactions.test_guild_id is required when interactions.global is false"
                    .to_string(),
            );
        }

        let colors = &config.embed_colors;
        for (name, value) in [
            ("default", &colors.default),
            ("success", &colors.success),
            ("error", &colors.error),
            ("warning", &colors.warning),
        ] {
            if !is_hex_color(value) {
                issues.push(format!(
                    "embed_colors.{name} must be a #RRGGBB hex colour, got '{value}'"
                ));
            }
        }

        issues
    }
}
