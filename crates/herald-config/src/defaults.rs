//! Default values for every configuration section.

use crate::schema::*;

impl Default for Config {
    fn default() -> Self {
        Self {
            discord: DiscordConfig::default(),
            interactions: InteractionsConfig::default(),
            embed_colors: EmbedColorsConfig::default(),
            logging: LogSettings::default(),
        }
    }
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            admin_ids: Vec::new(),
        }
    }
}

impl Default for InteractionsConfig {
    fn default() -> Self {
        Self {
            slash: true,
            global: false,
            test_guild_id: None,
        }
    }
}

impl Default for EmbedColorsConfig {
    fn default() -> Self {
        Self {
            default: "#FF8C00".to_string(),
            success: "#00FF00".to_string(),
            error: "#D61A3C".to_string(),
            warning: "#F7E919".to_string(),
        }
    }
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: "logs".to_string(),
            file_prefix: "herald.log".to_string(),
        }
    }
}
