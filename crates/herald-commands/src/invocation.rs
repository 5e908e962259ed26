//! The invocation port: everything the dispatcher and commands need from one
//! slash-command interaction, independent of the gateway library.

use crate::framework::CommandError;
use async_trait::async_trait;
use futures::stream::BoxStream;
use poise::serenity_prelude::{GuildId, MessageId, Permissions, UserId};

/// A single slash-command interaction being answered.
#[async_trait]
pub trait Invocation: Send + Sync {
    /// Name of the invoked command.
    fn command_name(&self) -> &str;

    /// The invoking user.
    fn user_id(&self) -> UserId;

    /// Guild the interaction came from, if any.
    fn guild_id(&self) -> Option<GuildId>;

    /// Permissions of the invoking member in the channel.
    fn member_permissions(&self) -> Option<Permissions>;

    /// Permissions of the bot in the channel.
    fn bot_permissions(&self) -> Option<Permissions>;

    /// Value of a string option supplied with the command.
    fn string_option(&self, name: &str) -> Option<String>;

    /// Sends the initial response.
    async fn reply(&self, reply: Reply) -> Result<(), CommandError>;

    /// Acknowledges the interaction so the response can follow later.
    async fn defer(&self, ephemeral: bool) -> Result<(), CommandError>;

    /// Sends a follow-up message and returns its id.
    async fn follow_up(&self, reply: Reply) -> Result<MessageId, CommandError>;

    /// Replaces the embeds and components of a previously sent follow-up.
    async fn edit_message(&self, message: MessageId, reply: Reply) -> Result<(), CommandError>;

    /// Removes every interactive component from a message.
    async fn clear_components(&self, message: MessageId) -> Result<(), CommandError>;

    /// Component uses by the invoking user on `message`, acknowledged as they arrive.
    ///
    /// Events are buffered from the moment the stream is opened, so a menu
    /// keeps one stream for its whole life.
    fn component_stream(&self, message: MessageId) -> BoxStream<'_, ComponentEvent>;
}

/// A message to send: text, embeds, and interactive components.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reply {
    /// Plain text content.
    pub content: Option<String>,
    /// Embeds, in order.
    pub embeds: Vec<EmbedView>,
    /// Component rows, in order.
    pub components: Vec<ComponentRow>,
    /// Only visible to the invoking user.
    pub ephemeral: bool,
}

impl Reply {
    /// A plain text reply.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    /// A reply carrying a single embed.
    pub fn embed(embed: EmbedView) -> Self {
        Self {
            embeds: vec![embed],
            ..Self::default()
        }
    }

    /// Marks the reply as ephemeral.
    #[must_use]
    pub fn ephemeral(mut self) -> Self {
        self.ephemeral = true;
        self
    }

    /// Attaches component rows.
    #[must_use]
    pub fn with_components(mut self, components: Vec<ComponentRow>) -> Self {
        self.components = components;
        self
    }
}

/// Transport-agnostic embed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmbedView {
    /// Author line.
    pub author: Option<String>,
    /// Body text.
    pub description: String,
    /// Footer line.
    pub footer: Option<String>,
    /// Packed RGB colour.
    pub color: u32,
}

impl EmbedView {
    /// An embed with a description and colour.
    pub fn new(description: impl Into<String>, color: u32) -> Self {
        Self {
            description: description.into(),
            color,
            ..Self::default()
        }
    }

    /// Sets the author line.
    #[must_use]
    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Sets the footer line.
    #[must_use]
    pub fn footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }
}

/// One row of interactive components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComponentRow {
    /// A string select menu.
    Select {
        /// Id reported back in [`ComponentEvent::custom_id`].
        custom_id: String,
        /// Placeholder text.
        placeholder: String,
        /// Choices.
        options: Vec<SelectOption>,
    },
    /// A row of buttons.
    Buttons(Vec<Button>),
}

/// A select menu choice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    /// Visible label.
    pub label: String,
    /// Value reported back when chosen.
    pub value: String,
    /// Secondary text.
    pub description: String,
    /// Unicode emoji.
    pub emoji: Option<String>,
}

/// A secondary-style button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    /// Id reported back in [`ComponentEvent::custom_id`].
    pub custom_id: String,
    /// Unicode emoji shown on the button.
    pub emoji: String,
    /// Whether the button is greyed out.
    pub disabled: bool,
}

/// A component use by the invoking user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentEvent {
    /// Id of the component that was used.
    pub custom_id: String,
    /// Selected values for select menus; empty for buttons.
    pub values: Vec<String>,
}

impl ComponentEvent {
    /// A button press.
    pub fn button(custom_id: impl Into<String>) -> Self {
        Self {
            custom_id: custom_id.into(),
            values: Vec::new(),
        }
    }

    /// A select menu choice.
    pub fn select(custom_id: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            custom_id: custom_id.into(),
            values: vec![value.into()],
        }
    }
}
