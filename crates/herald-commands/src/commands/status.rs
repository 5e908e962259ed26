//! `/status`: runtime counters for bot admins.

use crate::category::Category;
use crate::descriptor::{CommandBehavior, CommandBuilder};
use crate::framework::{CommandError, Context};
use crate::invocation::{EmbedView, Reply};
use async_trait::async_trait;

struct Status;

#[async_trait]
impl CommandBehavior for Status {
    async fn run(&self, ctx: Context<'_>) -> Result<(), CommandError> {
        let data = ctx.data;
        let description = format!(
            "**Commands loaded:** {}\n**Open help menus:** {}\n**Tracked cooldowns:** {}",
            data.registry.len(),
            data.help_sessions.len(),
            data.cooldowns.len()
        );
        let color = data.config.embed_colors.success_rgb();
        let embed = EmbedView::new(description, color).author("Herald Status");
        ctx.invocation.follow_up(Reply::embed(embed).ephemeral()).await?;
        Ok(())
    }
}

/// Definition of `/status`.
pub fn definition() -> CommandBuilder {
    CommandBuilder::new("status")
        .description("Shows loaded commands and live session counts")
        .category(Category::Admin)
        .ephemeral(true)
        .enabled(true)
        .behavior(Status)
}
