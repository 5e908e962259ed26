//! `/ping`: round-trip latency check.

use crate::category::Category;
use crate::descriptor::{CommandBehavior, CommandBuilder};
use crate::framework::{CommandError, Context};
use crate::invocation::Reply;
use async_trait::async_trait;
use tokio::time::Instant;

struct Ping;

#[async_trait]
impl CommandBehavior for Ping {
    async fn run(&self, ctx: Context<'_>) -> Result<(), CommandError> {
        let started = Instant::now();
        let message = ctx.invocation.follow_up(Reply::text("Pinging...")).await?;
        let elapsed = started.elapsed().as_millis();

        ctx.invocation
            .edit_message(message, Reply::text(format!("🏓 Pong! `{elapsed}ms`")))
            .await?;
        Ok(())
    }
}

/// Definition of `/ping`.
pub fn definition() -> CommandBuilder {
    CommandBuilder::new("ping")
        .description("Shows the bot's response latency")
        .category(Category::Utility)
        .cooldown(5)
        .enabled(true)
        .behavior(Ping)
}
