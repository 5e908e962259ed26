//! Gateway event table: which client events the bot handles and how.

use crate::error::BotError;
use crate::registration;
use futures::future::BoxFuture;
use herald_commands::{dispatcher, Data, SlashInvocation};
use poise::serenity_prelude as serenity;
use tracing::{debug, error, info};

/// Client events the bot binds a handler to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// The shard finished connecting.
    Ready,
    /// A user ran a slash command or used a component.
    InteractionCreate,
    /// A guild became available or the bot joined one.
    GuildCreate,
}

impl EventKind {
    /// Gateway event name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Ready => "ready",
            Self::InteractionCreate => "interactionCreate",
            Self::GuildCreate => "guildCreate",
        }
    }

    /// Kind of a received event, if it is one the bot can bind.
    pub fn of(event: &serenity::FullEvent) -> Option<Self> {
        match event {
            serenity::FullEvent::Ready { .. } => Some(Self::Ready),
            serenity::FullEvent::InteractionCreate { .. } => Some(Self::InteractionCreate),
            serenity::FullEvent::GuildCreate { .. } => Some(Self::GuildCreate),
            _ => None,
        }
    }
}

/// An event handler.
pub type Handler = for<'a> fn(
    &'a serenity::Context,
    &'a serenity::FullEvent,
    &'a Data,
) -> BoxFuture<'a, Result<(), BotError>>;

/// Bindings from event kinds to handlers. Each kind is bound at most once.
pub struct EventTable {
    bindings: Vec<(EventKind, Handler)>,
}

impl EventTable {
    /// An empty table.
    pub const fn new() -> Self {
        Self {
            bindings: Vec::new(),
        }
    }

    /// The bot's standard bindings.
    pub fn standard() -> Self {
        let mut table = Self::new();
        table.bind(EventKind::Ready, on_ready);
        table.bind(EventKind::InteractionCreate, on_interaction_create);
        table.bind(EventKind::GuildCreate, on_guild_create);
        table
    }

    /// Binds `handler` to `kind`, replacing any previous binding.
    pub fn bind(&mut self, kind: EventKind, handler: Handler) {
        self.bindings.retain(|(bound, _)| *bound != kind);
        self.bindings.push((kind, handler));
    }

    /// Bound event kinds, in binding order.
    pub fn kinds(&self) -> Vec<EventKind> {
        self.bindings.iter().map(|(kind, _)| *kind).collect()
    }

    /// Handler bound to `kind`.
    pub fn handler(&self, kind: EventKind) -> Option<Handler> {
        self.bindings
            .iter()
            .find(|(bound, _)| *bound == kind)
            .map(|(_, handler)| *handler)
    }

    /// Runs the handler bound to the event, if any.
    pub async fn dispatch(
        &self,
        ctx: &serenity::Context,
        event: &serenity::FullEvent,
        data: &Data,
    ) -> Result<(), BotError> {
        match EventKind::of(event).and_then(|kind| self.handler(kind)) {
            Some(handler) => handler(ctx, event, data).await,
            None => Ok(()),
        }
    }

    /// Renders the bindings as a two-column table.
    pub fn render(&self) -> String {
        let mut lines = vec![
            format!("┌{:─<33}┐", ""),
            format!("│{:^33}│", "Client Events"),
            format!("├{:─<27}┬{:─<5}┤", "", ""),
        ];
        for (kind, _) in &self.bindings {
            lines.push(format!("│ {:<25} │{:^5}│", kind.name(), "✓"));
        }
        lines.push(format!("└{:─<27}┴{:─<5}┘", "", ""));
        lines.join("\n")
    }

    /// Logs the bindings at startup.
    pub fn log_bindings(&self) {
        for line in self.render().lines() {
            info!("{}", line);
        }
        info!("Loaded {} events", self.bindings.len());
    }
}

impl Default for EventTable {
    fn default() -> Self {
        Self::new()
    }
}

fn on_ready<'a>(
    ctx: &'a serenity::Context,
    event: &'a serenity::FullEvent,
    data: &'a Data,
) -> BoxFuture<'a, Result<(), BotError>> {
    Box::pin(async move {
        let serenity::FullEvent::Ready { data_about_bot } = event else {
            return Ok(());
        };
        herald_common::success!(
            "Logged in as {}! ({})",
            data_about_bot.user.tag(),
            data_about_bot.user.id
        );

        if let Err(e) = registration::register_interactions(ctx, data).await {
            error!("Failed to register slash commands: {}", e);
        }
        Ok(())
    })
}

fn on_interaction_create<'a>(
    ctx: &'a serenity::Context,
    event: &'a serenity::FullEvent,
    data: &'a Data,
) -> BoxFuture<'a, Result<(), BotError>> {
    Box::pin(async move {
        let serenity::FullEvent::InteractionCreate { interaction } = event else {
            return Ok(());
        };
        let Some(command) = interaction.as_command() else {
            return Ok(());
        };

        let invocation = SlashInvocation::new(ctx, command);
        let outcome = dispatcher::handle(&invocation, data).await;
        debug!(command = %command.data.name, ?outcome, "Interaction handled");
        Ok(())
    })
}

fn on_guild_create<'a>(
    _ctx: &'a serenity::Context,
    event: &'a serenity::FullEvent,
    _data: &'a Data,
) -> BoxFuture<'a, Result<(), BotError>> {
    Box::pin(async move {
        if let serenity::FullEvent::GuildCreate { guild, is_new } = event {
            if is_new.unwrap_or(false) {
                info!("Joined guild {} ({})", guild.name, guild.id);
            } else {
                debug!("Guild available: {} ({})", guild.name, guild.id);
            }
        }
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_bindings() {
        let table = EventTable::standard();
        assert_eq!(
            table.kinds(),
            vec![
                EventKind::Ready,
                EventKind::InteractionCreate,
                EventKind::GuildCreate
            ]
        );
        assert!(table.handler(EventKind::Ready).is_some());
    }

    #[test]
    fn test_rebinding_replaces() {
        let mut table = EventTable::new();
        table.bind(EventKind::Ready, on_ready);
        table.bind(EventKind::Ready, on_guild_create);
        assert_eq!(table.kinds(), vec![EventKind::Ready]);
        assert!(table.handler(EventKind::GuildCreate).is_none());
    }

    #[test]
    fn test_render_lists_event_names() {
        let rendered = EventTable::standard().render();
        assert!(rendered.contains("Client Events"));
        assert!(rendered.contains("│ interactionCreate"));
        assert_eq!(rendered.lines().count(), 7);

        let widths: Vec<usize> = rendered.lines().map(|line| line.chars().count()).collect();
        assert!(widths.iter().all(|width| *width == widths[0]));
    }

    #[test]
    fn test_event_names() {
        assert_eq!(EventKind::Ready.name(), "ready");
        assert_eq!(EventKind::GuildCreate.name(), "guildCreate");
    }
}
