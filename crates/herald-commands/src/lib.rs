//! # Herald Commands
//!
//! Slash command plumbing for the Herald bot.
//!
//! Commands are declared as [`CommandBuilder`]s, validated into immutable
//! [`CommandDescriptor`]s and stored in a [`CommandRegistry`]. The
//! [`dispatcher`] routes each incoming interaction through the guard chain
//! (validations, admin gate, permission gates, cooldown) before running the
//! command's behaviour. Interactions are reached through the [`Invocation`]
//! port; [`SlashInvocation`] adapts serenity's command interactions to it.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod category;
pub mod commands;
pub mod cooldown;
pub mod descriptor;
pub mod dispatcher;
pub mod framework;
pub mod help;
pub mod interaction;
pub mod invocation;
pub mod permissions;
pub mod registry;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use category::Category;
pub use cooldown::CooldownCache;
pub use descriptor::*;
pub use dispatcher::{Decline, DispatchOutcome};
pub use framework::*;
pub use help::HelpSessions;
pub use interaction::SlashInvocation;
pub use invocation::*;
pub use registry::*;
