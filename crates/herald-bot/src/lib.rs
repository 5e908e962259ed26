//! # Herald Bot
//!
//! Discord bot client built on the Poise framework.
//!
//! This crate wires the command registry, the gateway event table and slash
//! command registration together, and provides the `herald` binary.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod bot;
pub mod error;
pub mod events;
pub mod registration;

pub use bot::*;
pub use error::*;
