//! In-memory [`Invocation`] for exercising the dispatcher and help menu
//! without a gateway connection.

use crate::framework::CommandError;
use crate::invocation::{ComponentEvent, Invocation, Reply};
use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use parking_lot::Mutex;
use poise::serenity_prelude::{GuildId, MessageId, Permissions, UserId};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::time::Instant;

/// Guild used by [`MockInvocation::new`].
pub const MOCK_GUILD_ID: u64 = 123_456_789_012_345_678;

/// Something the code under test did to the interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recorded {
    /// Initial response.
    Reply(Reply),
    /// Deferral with its visibility.
    Defer {
        /// Whether the deferral was ephemeral.
        ephemeral: bool,
    },
    /// Follow-up message and the id it was given.
    FollowUp(MessageId, Reply),
    /// Edit of a follow-up.
    Edit(MessageId, Reply),
    /// Components stripped from a follow-up.
    ClearComponents(MessageId),
}

/// A scripted, recording invocation.
#[derive(Debug)]
pub struct MockInvocation {
    command: String,
    user: UserId,
    guild: Option<GuildId>,
    member_permissions: Option<Permissions>,
    bot_permissions: Option<Permissions>,
    options: HashMap<String, String>,
    components: Mutex<VecDeque<(Duration, ComponentEvent)>>,
    fail_defer: bool,
    fail_edits: bool,
    edit_delay: Duration,
    recorded: Mutex<Vec<Recorded>>,
    next_message: AtomicU64,
}

impl MockInvocation {
    /// An invocation of `command` by `user` in [`MOCK_GUILD_ID`] with every permission granted.
    pub fn new(command: impl Into<String>, user: u64) -> Self {
        Self {
            command: command.into(),
            user: UserId::new(user),
            guild: Some(GuildId::new(MOCK_GUILD_ID)),
            member_permissions: Some(Permissions::all()),
            bot_permissions: Some(Permissions::all()),
            options: HashMap::new(),
            components: Mutex::new(VecDeque::new()),
            fail_defer: false,
            fail_edits: false,
            edit_delay: Duration::ZERO,
            recorded: Mutex::new(Vec::new()),
            next_message: AtomicU64::new(1),
        }
    }

    /// Places the invocation in another guild.
    #[must_use]
    pub fn in_guild(mut self, guild: u64) -> Self {
        self.guild = Some(GuildId::new(guild));
        self
    }

    /// Makes the invocation arrive from a direct message.
    #[must_use]
    pub fn without_guild(mut self) -> Self {
        self.guild = None;
        self
    }

    /// Sets the member's permissions.
    #[must_use]
    pub fn member_permissions(mut self, permissions: Option<Permissions>) -> Self {
        self.member_permissions = permissions;
        self
    }

    /// Sets the bot's permissions.
    #[must_use]
    pub fn bot_permissions(mut self, permissions: Option<Permissions>) -> Self {
        self.bot_permissions = permissions;
        self
    }

    /// Supplies a string option.
    #[must_use]
    pub fn option(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(name.into(), value.into());
        self
    }

    /// Queues a component event delivered `after` the previous one, or after
    /// the component stream opened for the first event.
    #[must_use]
    pub fn component(self, after: Duration, event: ComponentEvent) -> Self {
        self.components.lock().push_back((after, event));
        self
    }

    /// Makes [`Invocation::defer`] fail.
    #[must_use]
    pub fn failing_defer(mut self) -> Self {
        self.fail_defer = true;
        self
    }

    /// Makes every [`Invocation::edit_message`] call take `delay` to complete.
    #[must_use]
    pub fn slow_edits(mut self, delay: Duration) -> Self {
        self.edit_delay = delay;
        self
    }

    /// Makes every [`Invocation::edit_message`] call fail.
    #[must_use]
    pub fn failing_edits(mut self) -> Self {
        self.fail_edits = true;
        self
    }

    /// Everything recorded so far.
    pub fn recorded(&self) -> Vec<Recorded> {
        self.recorded.lock().clone()
    }

    /// Every reply, follow-up and edit payload, in order.
    pub fn responses(&self) -> Vec<Reply> {
        self.recorded
            .lock()
            .iter()
            .filter_map(|entry| match entry {
                Recorded::Reply(reply) | Recorded::FollowUp(_, reply) | Recorded::Edit(_, reply) => {
                    Some(reply.clone())
                }
                _ => None,
            })
            .collect()
    }

    /// Text of the most recent response that had any: its content, or the
    /// description of its first embed.
    pub fn last_text(&self) -> Option<String> {
        self.responses().into_iter().rev().find_map(|reply| {
            reply
                .content
                .or_else(|| reply.embeds.into_iter().next().map(|embed| embed.description))
        })
    }

    fn record(&self, entry: Recorded) {
        self.recorded.lock().push(entry);
    }
}

#[async_trait]
impl Invocation for MockInvocation {
    fn command_name(&self) -> &str {
        &self.command
    }

    fn user_id(&self) -> UserId {
        self.user
    }

    fn guild_id(&self) -> Option<GuildId> {
        self.guild
    }

    fn member_permissions(&self) -> Option<Permissions> {
        self.member_permissions
    }

    fn bot_permissions(&self) -> Option<Permissions> {
        self.bot_permissions
    }

    fn string_option(&self, name: &str) -> Option<String> {
        self.options.get(name).cloned()
    }

    async fn reply(&self, reply: Reply) -> Result<(), CommandError> {
        self.record(Recorded::Reply(reply));
        Ok(())
    }

    async fn defer(&self, ephemeral: bool) -> Result<(), CommandError> {
        if self.fail_defer {
            return Err("Unknown interaction".into());
        }
        self.record(Recorded::Defer { ephemeral });
        Ok(())
    }

    async fn follow_up(&self, reply: Reply) -> Result<MessageId, CommandError> {
        let id = MessageId::new(self.next_message.fetch_add(1, Ordering::SeqCst));
        self.record(Recorded::FollowUp(id, reply));
        Ok(id)
    }

    async fn edit_message(&self, message: MessageId, reply: Reply) -> Result<(), CommandError> {
        if !self.edit_delay.is_zero() {
            tokio::time::sleep(self.edit_delay).await;
        }
        if self.fail_edits {
            return Err("Unknown Message".into());
        }
        self.record(Recorded::Edit(message, reply));
        Ok(())
    }

    async fn clear_components(&self, message: MessageId) -> Result<(), CommandError> {
        self.record(Recorded::ClearComponents(message));
        Ok(())
    }

    fn component_stream(&self, _message: MessageId) -> BoxStream<'_, ComponentEvent> {
        let mut at = Instant::now();
        let timeline: Vec<(Instant, ComponentEvent)> = self
            .components
            .lock()
            .drain(..)
            .map(|(after, event)| {
                at += after;
                (at, event)
            })
            .collect();

        stream::iter(timeline)
            .then(|(at, event)| async move {
                tokio::time::sleep_until(at).await;
                event
            })
            .chain(stream::pending())
            .boxed()
    }
}
