//! Test utilities and shared test helpers for Herald.
//!
//! This module provides logging setup, fixtures, and helper functions that
//! can be used across all crates in the workspace for unit and integration testing.

use std::sync::Once;
use tracing_subscriber::{fmt, EnvFilter};

/// Initialize test logging once per test run.
static INIT: Once = Once::new();

/// Initialize logging for tests with a sensible default configuration.
/// This function is safe to call multiple times and will only initialize once.
pub fn init_test_logging() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

        let _ = fmt().with_test_writer().with_env_filter(filter).try_init();
    });
}

/// Create a temporary directory for tests that automatically cleans up.
#[cfg(feature = "tempfile")]
pub fn create_temp_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("Failed to create temporary directory")
}

/// Discord-related test identifiers.
pub mod discord_fixtures {
    /// Guild used by test invocations.
    pub const TEST_GUILD_ID: u64 = 123_456_789_012_345_678;

    /// Regular (non-admin) user.
    pub const TEST_USER_ID: u64 = 987_654_321_098_765_432;

    /// User listed as a bot admin in the test configuration.
    pub const TEST_ADMIN_ID: u64 = 111_111_111_111_111_111;

    /// Create multiple distinct user IDs.
    pub fn test_user_ids(count: usize) -> Vec<u64> {
        (0..count as u64).map(|i| 100_000_000_000_000_000 + i).collect()
    }
}

/// Configuration-related test utilities.
pub mod config_fixtures {
    /// A minimal valid configuration as TOML.
    pub fn minimal_config_toml() -> &'static str {
        r#"
[discord]
token = "test_token"
admin_ids = [111111111111111111]

[interactions]
global = true
"#
    }

    /// A full configuration as TOML.
    pub fn full_config_toml() -> &'static str {
        concat!(
            "[discord]\n",
            "token = \"test_token_full\"\n",
            "admin_ids = [111111111111111111, 222222222222222222]\n",
            "\n",
            "[interactions]\n",
            "slash = true\n",
            "global = false\n",
            "test_guild_id = 123456789012345678\n",
            "\n",
            "[embed_colors]\n",
            "default = \"#FF8C00\"\n",
            "success = \"#00FF00\"\n",
            "error = \"#D61A3C\"\n",
            "warning = \"#F7E919\"\n",
            "\n",
            "[logging]\n",
            "level = \"debug\"\n",
            "directory = \"var/log\"\n",
            "file_prefix = \"bot.log\"\n",
        )
    }
}
