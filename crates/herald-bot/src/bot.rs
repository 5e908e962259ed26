//! Core bot logic using the Poise framework.

use crate::error::{BotError, BotResult};
use crate::events::EventTable;
use herald_commands::{CommandBuilder, CommandError, CommandRegistry, Data, LoadReport};
use herald_config::Config;
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Framework user data: shared command state plus the event bindings.
pub struct BotState {
    /// State handed to command behaviours.
    pub data: Data,
    /// Event bindings built when the bot was created.
    pub events: EventTable,
}

/// Main bot structure.
pub struct HeraldBot {
    config: Arc<Config>,
    registry: CommandRegistry,
    report: LoadReport,
    events: EventTable,
}

impl HeraldBot {
    /// Creates a bot, loads its commands and binds its event handlers.
    pub fn new(config: Arc<Config>, commands: Vec<CommandBuilder>) -> BotResult<Self> {
        let (registry, report) = Self::load_commands(commands)?;
        Ok(Self {
            config,
            registry,
            report,
            events: EventTable::standard(),
        })
    }

    /// Builds the command registry. Fails only when the command ceiling is exceeded.
    pub fn load_commands(commands: Vec<CommandBuilder>) -> BotResult<(CommandRegistry, LoadReport)> {
        info!("Loading commands...");
        let mut registry = CommandRegistry::new();
        let report = registry.load_all(commands)?;
        for (name, reason) in &report.rejected {
            warn!("Skipped command '{}': {}", name, reason);
        }
        herald_common::success!("Loaded {} slash commands", registry.len());
        Ok((registry, report))
    }

    /// Loaded command registry.
    pub const fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Outcome of command loading.
    pub const fn load_report(&self) -> &LoadReport {
        &self.report
    }

    /// Event bindings the client will dispatch through.
    pub const fn events(&self) -> &EventTable {
        &self.events
    }

    /// Connects to the gateway and runs until shutdown.
    pub async fn start(self) -> BotResult<()> {
        self.events.log_bindings();

        let token = self.config.discord.token.clone();
        let state = BotState {
            data: Data::new(Arc::clone(&self.config), self.registry),
            events: self.events,
        };

        let framework = poise::Framework::builder()
            .options(poise::FrameworkOptions {
                commands: Vec::new(),
                event_handler: |ctx, event, _framework, state| {
                    Box::pin(handle_event(ctx, event, state))
                },
                on_error: |error| Box::pin(on_error(error)),
                ..Default::default()
            })
            .setup(move |_ctx, ready, _framework| {
                Box::pin(async move {
                    debug!("Framework ready for {} guilds", ready.guilds.len());
                    Ok(state)
                })
            })
            .build();

        let mut client =
            serenity::ClientBuilder::new(&token, serenity::GatewayIntents::non_privileged())
                .framework(framework)
                .await?;

        let shard_manager = Arc::clone(&client.shard_manager);
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("Shutdown signal received, disconnecting");
                    shard_manager.shutdown_all().await;
                }
                Err(e) => error!("Failed to listen for shutdown signal: {}", e),
            }
        });

        client.start().await.map_err(BotError::from)
    }
}

async fn handle_event(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    state: &BotState,
) -> Result<(), CommandError> {
    state.events.dispatch(ctx, event, &state.data).await?;
    Ok(())
}

async fn on_error(error: poise::FrameworkError<'_, BotState, CommandError>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            error!("Failed to set up the framework: {:?}", error);
        }
        poise::FrameworkError::EventHandler { error, event, .. } => {
            error!("Client error in {}: {:?}", event.snake_case_name(), error);
        }
        poise::FrameworkError::UnknownInteraction { interaction, .. } => {
            debug!(
                "Interaction '{}' handled outside the framework",
                interaction.data.name
            );
        }
        other => {
            if let Err(e) = poise::builtins::on_error(other).await {
                error!("Error while handling error: {}", e);
            }
        }
    }
}
