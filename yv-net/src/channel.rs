//! Command channel capability: the originator end creates and sends, follower
//! ends attach and receive. Each message is one command byte.

use std::io;
use std::time::Duration;

/// Errors from creating, attaching to, or using a command channel.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("no command channel named {key:?}")]
    NotFound { key: String },
    #[error("command channel closed")]
    Closed,
    #[error("command channel {key:?} already has a live originator")]
    InUse { key: String },
    #[error("already originating on {key:?}; switch to inactive before following")]
    OwnChannel { key: String },
    #[error("invalid channel key {0:?}")]
    InvalidKey(String),
    #[error("channel i/o: {0}")]
    Io(#[from] io::Error),
}

/// Sending side of a channel, held by the originator that created it.
pub trait OriginatorEnd: Send {
    /// Enqueue one command byte for every follower. Never blocks.
    fn send(&mut self, byte: u8) -> Result<(), ChannelError>;

    /// Tear the channel down. Followers see [`ChannelError::Closed`] once they
    /// drain what was already sent.
    fn destroy(self: Box<Self>) -> Result<(), ChannelError>;
}

/// Receiving side of a channel.
pub trait FollowerEnd: Send {
    /// Take one pending byte without waiting.
    fn try_recv(&mut self) -> Result<Option<u8>, ChannelError>;

    /// Wait up to `timeout` for one byte.
    fn recv_timeout(&mut self, timeout: Duration) -> Result<Option<u8>, ChannelError>;
}

/// Factory for channel ends keyed by an application name.
pub trait CommandTransport: Send {
    fn create(&self, key: &str) -> Result<Box<dyn OriginatorEnd>, ChannelError>;
    fn attach(&self, key: &str) -> Result<Box<dyn FollowerEnd>, ChannelError>;
}

/// Keys become file names for some transports, so keep them to a safe set.
pub fn validate_key(key: &str) -> Result<(), ChannelError> {
    let ok = !key.is_empty()
        && key.len() <= 64
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
        && !key.starts_with('.');
    if ok {
        Ok(())
    } else {
        Err(ChannelError::InvalidKey(key.to_string()))
    }
}
