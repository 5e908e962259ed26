//! Built-in commands.

pub mod help;
pub mod ping;
pub mod status;

use crate::descriptor::CommandBuilder;

/// Every command definition shipped with the bot, in load order.
pub fn manifest() -> Vec<CommandBuilder> {
    vec![help::definition(), ping::definition(), status::definition()]
}
