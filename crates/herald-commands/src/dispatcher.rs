//! Routing of slash-command interactions through the guard chain.
//!
//! Every invocation gets exactly one user-visible answer: a decline, the
//! command's own response, or a generic failure message.

use crate::category::Category;
use crate::descriptor::CommandDescriptor;
use crate::framework::{CommandError, Context, Data};
use crate::invocation::{EmbedView, Invocation, Reply};
use crate::permissions::{self, PermissionInfo};
use futures::FutureExt;
use herald_common::format_duration;
use poise::serenity_prelude::Permissions;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Reply for interactions outside a guild.
pub const GUILD_ONLY_MESSAGE: &str = "Command can only be executed in a discord server";

/// Reply for interactions naming a command that is not loaded.
pub const UNKNOWN_COMMAND_MESSAGE: &str = "An error has occurred";

/// Follow-up sent when a command behaviour fails.
pub const FAILURE_MESSAGE: &str = "Oops! An error occurred while running the command";

/// Reply for non-admins invoking an admin command.
pub const ADMIN_ONLY_MESSAGE: &str = "This command is only accessible to bot admins";

/// Why the guard chain refused an invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decline {
    /// A command validation failed; carries its message.
    Validation(String),
    /// Admin command invoked by a non-admin.
    AdminOnly,
    /// The member lacks these permissions.
    MissingUserPermissions(Vec<&'static PermissionInfo>),
    /// The bot lacks these permissions.
    MissingBotPermissions(Vec<&'static PermissionInfo>),
    /// The user must wait this long.
    Cooldown(Duration),
}

impl Decline {
    /// Text shown to the invoking user.
    pub fn message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::AdminOnly => ADMIN_ONLY_MESSAGE.to_string(),
            Self::MissingUserPermissions(missing) => {
                format!("You need {} for this command", permissions::describe(missing))
            }
            Self::MissingBotPermissions(missing) => {
                format!("I need {} for this command", permissions::describe(missing))
            }
            Self::Cooldown(remaining) => format!(
                "You are on cooldown. You can again use the command in `{}`",
                format_duration(*remaining)
            ),
        }
    }

    /// Short name of the guard that declined, for logs.
    pub const fn guard(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::AdminOnly => "admin",
            Self::MissingUserPermissions(_) => "user_permissions",
            Self::MissingBotPermissions(_) => "bot_permissions",
            Self::Cooldown(_) => "cooldown",
        }
    }
}

/// What became of one interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Received outside a guild.
    NotInGuild,
    /// Named a command that is not loaded.
    UnknownCommand,
    /// Refused by a guard.
    Declined(Decline),
    /// The behaviour ran to completion.
    Completed,
    /// The behaviour failed or panicked, or the acknowledgement before it failed.
    Failed,
}

/// Runs guards 1-5 in order and returns the first decline.
///
/// Missing permission information counts as no permissions.
pub fn evaluate_guards(
    descriptor: &CommandDescriptor,
    invocation: &dyn Invocation,
    data: &Data,
) -> Result<(), Decline> {
    if let Some(failed) = descriptor
        .validations()
        .iter()
        .find(|validation| !validation.check(invocation))
    {
        return Err(Decline::Validation(failed.message().to_string()));
    }

    if descriptor.category() == Category::Admin
        && !data.config.is_admin(invocation.user_id().get())
    {
        return Err(Decline::AdminOnly);
    }

    if !descriptor.user_permissions().is_empty() {
        let granted = invocation
            .member_permissions()
            .unwrap_or_else(Permissions::empty);
        let missing = permissions::missing(descriptor.user_permissions(), granted);
        if !missing.is_empty() {
            return Err(Decline::MissingUserPermissions(missing));
        }
    }

    if !descriptor.bot_permissions().is_empty() {
        let granted = invocation
            .bot_permissions()
            .unwrap_or_else(Permissions::empty);
        let missing = permissions::missing(descriptor.bot_permissions(), granted);
        if !missing.is_empty() {
            return Err(Decline::MissingBotPermissions(missing));
        }
    }

    let remaining =
        data.cooldowns
            .remaining(descriptor.name(), invocation.user_id(), descriptor.cooldown());
    if !remaining.is_zero() {
        return Err(Decline::Cooldown(remaining));
    }

    Ok(())
}

/// Runs the guard chain for `descriptor` and, if it passes, the command behaviour.
///
/// Once the guards pass, the cooldown is charged whether the command
/// completes, returns an error, panics, or cannot be acknowledged.
pub async fn execute(
    descriptor: &CommandDescriptor,
    invocation: &dyn Invocation,
    data: &Data,
) -> DispatchOutcome {
    let name = descriptor.name();
    let user = invocation.user_id();
    let palette = &data.config.embed_colors;

    if let Err(decline) = evaluate_guards(descriptor, invocation, data) {
        debug!(command = %name, user = %user, guard = decline.guard(), "Invocation declined");
        let embed = EmbedView::new(decline.message(), palette.warning_rgb());
        if let Err(e) = invocation.reply(Reply::embed(embed).ephemeral()).await {
            warn!(command = %name, "Failed to send decline message: {}", e);
        }
        return DispatchOutcome::Declined(decline);
    }

    let result = acknowledge_and_run(descriptor, invocation, data).await;

    if !descriptor.cooldown().is_zero() {
        data.cooldowns.record(name, user);
    }

    match result {
        Ok(()) => {
            info!(command = %name, user = %user, "Command completed");
            DispatchOutcome::Completed
        }
        Err(e) => {
            error!(command = %name, user = %user, "Command failed: {:?}", e);
            let embed = EmbedView::new(FAILURE_MESSAGE, palette.error_rgb());
            if let Err(e) = invocation.follow_up(Reply::embed(embed)).await {
                warn!(command = %name, "Failed to send failure message: {}", e);
            }
            DispatchOutcome::Failed
        }
    }
}

async fn acknowledge_and_run(
    descriptor: &CommandDescriptor,
    invocation: &dyn Invocation,
    data: &Data,
) -> Result<(), CommandError> {
    invocation.defer(descriptor.is_ephemeral()).await?;
    AssertUnwindSafe(descriptor.behavior().run(Context::new(invocation, data)))
        .catch_unwind()
        .await
        .unwrap_or_else(|panic| {
            Err(format!("command panicked: {}", panic_message(&*panic)).into())
        })
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

/// Entry point for every slash-command interaction.
pub async fn handle(invocation: &dyn Invocation, data: &Data) -> DispatchOutcome {
    if invocation.guild_id().is_none() {
        if let Err(e) = invocation
            .reply(Reply::text(GUILD_ONLY_MESSAGE).ephemeral())
            .await
        {
            debug!("Failed to answer direct-message interaction: {}", e);
        }
        return DispatchOutcome::NotInGuild;
    }

    let Some(descriptor) = data.registry.lookup(invocation.command_name()) else {
        warn!(command = invocation.command_name(), "Received interaction for unknown command");
        if let Err(e) = invocation
            .reply(Reply::text(UNKNOWN_COMMAND_MESSAGE).ephemeral())
            .await
        {
            debug!("Failed to answer unknown command: {}", e);
        }
        return DispatchOutcome::UnknownCommand;
    };

    execute(descriptor, invocation, data).await
}
