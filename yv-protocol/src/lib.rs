//! Shared command alphabet, roles, and wire encoding for yv.

pub mod command;
pub mod role;

pub use command::{decode_command, encode_command, Command, CommandError};
pub use role::Role;

/// Fixed application key identifying the process-wide command channel.
pub const CHANNEL_KEY: &str = "yv";
