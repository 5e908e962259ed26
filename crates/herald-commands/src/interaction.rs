//! [`Invocation`] implemented over serenity's slash-command interactions.

use crate::framework::CommandError;
use crate::invocation::{ComponentEvent, ComponentRow, EmbedView, Invocation, Reply};
use async_trait::async_trait;
use futures::stream::{BoxStream, StreamExt};
use herald_common::truncate_string;
use poise::serenity_prelude::{
    self as serenity, ButtonStyle, CommandInteraction, ComponentInteractionCollector,
    ComponentInteractionDataKind, CreateActionRow, CreateButton, CreateEmbed, CreateEmbedAuthor,
    CreateEmbedFooter, CreateInteractionResponse, CreateInteractionResponseFollowup,
    CreateInteractionResponseMessage, CreateSelectMenu, CreateSelectMenuKind,
    CreateSelectMenuOption, GuildId, MessageId, Permissions, ReactionType, UserId,
};
use tracing::debug;

/// Discord's limit on embed descriptions.
const MAX_EMBED_DESCRIPTION: usize = 4096;

/// Discord's limit on select option labels and descriptions.
const MAX_OPTION_TEXT: usize = 100;

/// One slash-command interaction received from the gateway.
pub struct SlashInvocation<'a> {
    ctx: &'a serenity::Context,
    interaction: &'a CommandInteraction,
}

impl<'a> SlashInvocation<'a> {
    /// Wraps an interaction and the context it arrived with.
    pub const fn new(ctx: &'a serenity::Context, interaction: &'a CommandInteraction) -> Self {
        Self { ctx, interaction }
    }
}

#[async_trait]
impl Invocation for SlashInvocation<'_> {
    fn command_name(&self) -> &str {
        &self.interaction.data.name
    }

    fn user_id(&self) -> UserId {
        self.interaction.user.id
    }

    fn guild_id(&self) -> Option<GuildId> {
        self.interaction.guild_id
    }

    fn member_permissions(&self) -> Option<Permissions> {
        self.interaction
            .member
            .as_ref()
            .and_then(|member| member.permissions)
    }

    fn bot_permissions(&self) -> Option<Permissions> {
        self.interaction.app_permissions
    }

    fn string_option(&self, name: &str) -> Option<String> {
        self.interaction
            .data
            .options
            .iter()
            .find(|option| option.name == name)
            .and_then(|option| option.value.as_str())
            .map(ToOwned::to_owned)
    }

    async fn reply(&self, reply: Reply) -> Result<(), CommandError> {
        let mut message = CreateInteractionResponseMessage::new()
            .embeds(reply.embeds.iter().map(build_embed).collect())
            .components(build_rows(&reply.components))
            .ephemeral(reply.ephemeral);
        if let Some(content) = reply.content {
            message = message.content(content);
        }
        self.interaction
            .create_response(self.ctx, CreateInteractionResponse::Message(message))
            .await?;
        Ok(())
    }

    async fn defer(&self, ephemeral: bool) -> Result<(), CommandError> {
        if ephemeral {
            self.interaction.defer_ephemeral(self.ctx).await?;
        } else {
            self.interaction.defer(self.ctx).await?;
        }
        Ok(())
    }

    async fn follow_up(&self, reply: Reply) -> Result<MessageId, CommandError> {
        let message = self
            .interaction
            .create_followup(self.ctx, build_followup(reply))
            .await?;
        Ok(message.id)
    }

    async fn edit_message(&self, message: MessageId, reply: Reply) -> Result<(), CommandError> {
        self.interaction
            .edit_followup(self.ctx, message, build_followup(reply))
            .await?;
        Ok(())
    }

    async fn clear_components(&self, message: MessageId) -> Result<(), CommandError> {
        self.interaction
            .edit_followup(
                self.ctx,
                message,
                CreateInteractionResponseFollowup::new().components(Vec::new()),
            )
            .await?;
        Ok(())
    }

    fn component_stream(&self, message: MessageId) -> BoxStream<'_, ComponentEvent> {
        let ctx = self.ctx;
        ComponentInteractionCollector::new(ctx)
            .message_id(message)
            .author_id(self.interaction.user.id)
            .stream()
            .then(move |component| async move {
                if let Err(e) = component
                    .create_response(ctx, CreateInteractionResponse::Acknowledge)
                    .await
                {
                    debug!("Failed to acknowledge component interaction: {}", e);
                }

                let values = match &component.data.kind {
                    ComponentInteractionDataKind::StringSelect { values } => values.clone(),
                    _ => Vec::new(),
                };
                ComponentEvent {
                    custom_id: component.data.custom_id.clone(),
                    values,
                }
            })
            .boxed()
    }
}

fn build_followup(reply: Reply) -> CreateInteractionResponseFollowup {
    let mut builder = CreateInteractionResponseFollowup::new()
        .embeds(reply.embeds.iter().map(build_embed).collect())
        .components(build_rows(&reply.components))
        .ephemeral(reply.ephemeral);
    if let Some(content) = reply.content {
        builder = builder.content(content);
    }
    builder
}

fn build_embed(embed: &EmbedView) -> CreateEmbed {
    let mut builder = CreateEmbed::new()
        .description(truncate_string(&embed.description, MAX_EMBED_DESCRIPTION))
        .color(embed.color);
    if let Some(author) = &embed.author {
        builder = builder.author(CreateEmbedAuthor::new(author));
    }
    if let Some(footer) = &embed.footer {
        builder = builder.footer(CreateEmbedFooter::new(footer));
    }
    builder
}

fn build_rows(rows: &[ComponentRow]) -> Vec<CreateActionRow> {
    rows.iter()
        .map(|row| match row {
            ComponentRow::Select {
                custom_id,
                placeholder,
                options,
            } => {
                let options = options
                    .iter()
                    .map(|option| {
                        let mut choice = CreateSelectMenuOption::new(
                            truncate_string(&option.label, MAX_OPTION_TEXT),
                            &option.value,
                        )
                        .description(truncate_string(&option.description, MAX_OPTION_TEXT));
                        if let Some(emoji) = &option.emoji {
                            choice = choice.emoji(ReactionType::Unicode(emoji.clone()));
                        }
                        choice
                    })
                    .collect();
                CreateActionRow::SelectMenu(
                    CreateSelectMenu::new(custom_id, CreateSelectMenuKind::String { options })
                        .placeholder(placeholder),
                )
            }
            ComponentRow::Buttons(buttons) => CreateActionRow::Buttons(
                buttons
                    .iter()
                    .map(|button| {
                        CreateButton::new(&button.custom_id)
                            .style(ButtonStyle::Secondary)
                            .emoji(ReactionType::Unicode(button.emoji.clone()))
                            .disabled(button.disabled)
                    })
                    .collect(),
            ),
        })
        .collect()
}
