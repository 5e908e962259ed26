//! Slash command schema registration.
//!
//! Registration is a full replace: the set sent to Discord becomes the
//! complete command list for its scope.

use crate::error::{BotError, BotResult};
use herald_commands::{CommandDescriptor, CommandOption, CommandRegistry, Data, OptionKind};
use herald_config::InteractionsConfig;
use poise::serenity_prelude::{
    self as serenity, CommandOptionType, CreateCommand, CreateCommandOption, GuildId,
};
use tracing::{debug, info};

/// Where the command set is registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationTarget {
    /// Every guild the application is in.
    Global,
    /// A single test guild.
    Guild(GuildId),
}

impl RegistrationTarget {
    /// Resolves the target from the interaction settings.
    pub fn from_settings(settings: &InteractionsConfig) -> BotResult<Self> {
        if settings.global {
            return Ok(Self::Global);
        }
        match settings.test_guild_id {
            Some(id) if id != 0 => Ok(Self::Guild(GuildId::new(id))),
            _ => Err(BotError::Registration(
                "Did you provide a valid test_guild_id to register slash commands?".to_string(),
            )),
        }
    }
}

/// Builds the command schemas to register, sorted by name.
///
/// Returns an empty set when slash commands are switched off.
pub fn build_commands(registry: &CommandRegistry, settings: &InteractionsConfig) -> Vec<CreateCommand> {
    if !settings.slash {
        return Vec::new();
    }
    let mut descriptors: Vec<&CommandDescriptor> = registry.iter().collect();
    descriptors.sort_by(|a, b| a.name().cmp(b.name()));
    descriptors.into_iter().map(create_command).collect()
}

/// Converts a descriptor to its registration schema.
pub fn create_command(descriptor: &CommandDescriptor) -> CreateCommand {
    CreateCommand::new(descriptor.name())
        .description(descriptor.description())
        .set_options(descriptor.options().iter().map(create_option).collect())
}

fn create_option(option: &CommandOption) -> CreateCommandOption {
    let mut created = CreateCommandOption::new(
        option_type(option.kind),
        &option.name,
        &option.description,
    )
    .required(option.required);
    for sub in &option.options {
        created = created.add_sub_option(create_option(sub));
    }
    created
}

/// Platform option type for an option kind.
pub const fn option_type(kind: OptionKind) -> CommandOptionType {
    match kind {
        OptionKind::SubCommand => CommandOptionType::SubCommand,
        OptionKind::SubCommandGroup => CommandOptionType::SubCommandGroup,
        OptionKind::String => CommandOptionType::String,
        OptionKind::Integer => CommandOptionType::Integer,
        OptionKind::Boolean => CommandOptionType::Boolean,
        OptionKind::User => CommandOptionType::User,
        OptionKind::Channel => CommandOptionType::Channel,
        OptionKind::Role => CommandOptionType::Role,
        OptionKind::Mentionable => CommandOptionType::Mentionable,
        OptionKind::Number => CommandOptionType::Number,
        OptionKind::Attachment => CommandOptionType::Attachment,
    }
}

/// Resolves where to register and what, or `None` when slash commands are off.
///
/// The target is only resolved when registration will happen, so a missing
/// test guild is not an error while slash commands are disabled.
pub fn plan(
    registry: &CommandRegistry,
    settings: &InteractionsConfig,
) -> BotResult<Option<(RegistrationTarget, Vec<CreateCommand>)>> {
    if !settings.slash {
        return Ok(None);
    }
    let target = RegistrationTarget::from_settings(settings)?;
    Ok(Some((target, build_commands(registry, settings))))
}

/// Replaces the registered command set, globally or in the test guild.
///
/// The test guild must already be in the cache. Returns the number of
/// commands registered.
pub async fn register_interactions(ctx: &serenity::Context, data: &Data) -> BotResult<usize> {
    let Some((target, commands)) = plan(&data.registry, &data.config.interactions)? else {
        info!("Slash commands are disabled, skipping registration");
        return Ok(0);
    };
    let count = commands.len();

    match target {
        RegistrationTarget::Global => {
            debug!("Registering {} commands globally", count);
            serenity::Command::set_global_commands(ctx, commands).await?;
        }
        RegistrationTarget::Guild(guild) => {
            if !ctx.cache.guilds().contains(&guild) {
                return Err(BotError::Registration(format!(
                    "No guilds found matching {guild}"
                )));
            }
            debug!("Registering {} commands in guild {}", count, guild);
            guild.set_commands(ctx, commands).await?;
        }
    }

    if count == 0 {
        info!("No slash commands to register, cleared the registered set");
    } else {
        herald_common::success!("Successfully registered {} slash commands", count);
    }
    Ok(count)
}
