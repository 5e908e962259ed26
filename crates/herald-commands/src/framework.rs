//! Shared command state and the context handed to command behaviours.

use crate::cooldown::CooldownCache;
use crate::help::HelpSessions;
use crate::invocation::Invocation;
use crate::registry::CommandRegistry;
use herald_config::Config;
use std::sync::Arc;

/// Application data accessible in all commands and event handlers.
pub struct Data {
    /// Application configuration.
    pub config: Arc<Config>,
    /// Loaded commands; written once at startup.
    pub registry: Arc<CommandRegistry>,
    /// Per-(command, user) cooldown timestamps.
    pub cooldowns: CooldownCache,
    /// Live help menu sessions.
    pub help_sessions: HelpSessions,
}

impl Data {
    /// Creates the shared state from a validated configuration and a loaded registry.
    pub fn new(config: Arc<Config>, registry: CommandRegistry) -> Self {
        Self {
            config,
            registry: Arc::new(registry),
            cooldowns: CooldownCache::new(),
            help_sessions: HelpSessions::new(),
        }
    }
}

impl std::fmt::Debug for Data {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Data")
            .field("config", &"<Config>")
            .field("registry", &self.registry.len())
            .field("cooldowns", &self.cooldowns.len())
            .field("help_sessions", &self.help_sessions.len())
            .finish()
    }
}

/// Application error type for commands.
pub type CommandError = Box<dyn std::error::Error + Send + Sync>;

/// Context passed to a command behaviour for one invocation.
#[derive(Clone, Copy)]
pub struct Context<'a> {
    /// The interaction being answered.
    pub invocation: &'a dyn Invocation,
    /// Shared application data.
    pub data: &'a Data,
}

impl<'a> Context<'a> {
    /// Creates a context for a single invocation.
    pub fn new(invocation: &'a dyn Invocation, data: &'a Data) -> Self {
        Self { invocation, data }
    }

    /// Default embed colour from the configured palette.
    pub fn embed_color(&self) -> u32 {
        self.data.config.embed_colors.default_rgb()
    }
}
