//! Synchronization roles a viewer process can take.

use std::str::FromStr;

use crate::command::CommandError;

/// Role of this process in command synchronization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Role {
    /// Not synchronized with anyone.
    #[default]
    Inactive,
    /// Owns the channel and emits every local command onto it.
    Originator,
    /// Attached to someone else's channel; replays received commands.
    Follower,
}

impl Role {
    /// Caption tag shown in the window title.
    pub fn caption_tag(self) -> &'static str {
        match self {
            Role::Inactive => "",
            Role::Originator => "[ORIGINATOR]",
            Role::Follower => "[FOLLOWER]",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Inactive => "inactive",
            Role::Originator => "originator",
            Role::Follower => "follower",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "inactive" | "none" => Ok(Role::Inactive),
            "originator" => Ok(Role::Originator),
            "follower" => Ok(Role::Follower),
            other => Err(CommandError::UnknownRole(other.to_string())),
        }
    }
}
