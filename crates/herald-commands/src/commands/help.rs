//! `/help`: the interactive help menu, or one command's usage page.

use crate::category::Category;
use crate::descriptor::{CommandBehavior, CommandBuilder, CommandOption, OptionKind};
use crate::framework::{CommandError, Context};
use crate::help::{self, NO_MATCH_MESSAGE};
use crate::invocation::Reply;
use async_trait::async_trait;

/// Name of the optional argument naming a single command.
pub const COMMAND_OPTION: &str = "command";

struct Help;

#[async_trait]
impl CommandBehavior for Help {
    async fn run(&self, ctx: Context<'_>) -> Result<(), CommandError> {
        let Some(name) = ctx.invocation.string_option(COMMAND_OPTION) else {
            return help::run_menu(ctx).await;
        };

        let reply = match ctx.data.registry.lookup(&name) {
            Some(descriptor) => Reply::embed(descriptor.usage(ctx.embed_color())),
            None => Reply::text(NO_MATCH_MESSAGE),
        };
        ctx.invocation.follow_up(reply).await?;
        Ok(())
    }
}

/// Definition of `/help`.
pub fn definition() -> CommandBuilder {
    CommandBuilder::new("help")
        .description("Command help menu")
        .category(Category::Utility)
        .bot_permissions(["EMBED_LINKS"])
        .option(CommandOption::new(
            OptionKind::String,
            COMMAND_OPTION,
            "Command name",
        ))
        .enabled(true)
        .behavior(Help)
}
