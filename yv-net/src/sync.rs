//! Role-switching synchronization endpoint.
//!
//! A [`CommandSync`] is in exactly one of three roles. As originator it owns
//! the channel and mirrors every emitted command to followers; as follower it
//! yields commands received from the originator. Failures never escape as
//! fatal errors: a failed switch leaves the previous role in place, and a
//! failed send is logged and dropped.

use std::time::Duration;

use yv_protocol::{decode_command, encode_command, Command, CommandError, Role};

use crate::channel::{ChannelError, CommandTransport, FollowerEnd, OriginatorEnd};

enum Endpoint {
    Inactive,
    Originator(Box<dyn OriginatorEnd>),
    Follower(Box<dyn FollowerEnd>),
}

impl Endpoint {
    fn role(&self) -> Role {
        match self {
            Endpoint::Inactive => Role::Inactive,
            Endpoint::Originator(_) => Role::Originator,
            Endpoint::Follower(_) => Role::Follower,
        }
    }
}

/// What a follower poll produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Incoming {
    /// A recognised command to apply locally.
    Command(Command),
    /// A byte outside the command alphabet. Reported and ignored.
    Unknown(u8),
}

/// Synchronization endpoint bound to one transport and channel key.
pub struct CommandSync {
    transport: Box<dyn CommandTransport>,
    key: String,
    endpoint: Endpoint,
}

impl CommandSync {
    pub fn new(transport: Box<dyn CommandTransport>, key: impl Into<String>) -> Self {
        Self {
            transport,
            key: key.into(),
            endpoint: Endpoint::Inactive,
        }
    }

    pub fn role(&self) -> Role {
        self.endpoint.role()
    }

    /// Switch to `role`. Switching to the current role does nothing.
    ///
    /// On error the previous role and its channel stay in place.
    pub fn switch_to(&mut self, role: Role) -> Result<(), ChannelError> {
        if role == self.role() {
            return Ok(());
        }

        let next = match role {
            Role::Inactive => Endpoint::Inactive,
            Role::Originator => Endpoint::Originator(self.transport.create(&self.key)?),
            Role::Follower => {
                // The key is fixed, so the only channel to attach to is our own.
                if matches!(self.endpoint, Endpoint::Originator(_)) {
                    return Err(ChannelError::OwnChannel {
                        key: self.key.clone(),
                    });
                }
                Endpoint::Follower(self.transport.attach(&self.key)?)
            }
        };

        let previous = std::mem::replace(&mut self.endpoint, next);
        release(previous, &self.key);
        tracing::info!(key = %self.key, role = %role, "sync role changed");
        Ok(())
    }

    /// Mirror `command` to followers when originator. Fire-and-forget.
    pub fn emit(&mut self, command: Command) {
        let Endpoint::Originator(tx) = &mut self.endpoint else {
            return;
        };
        let [byte] = encode_command(command);
        match tx.send(byte) {
            Ok(()) => tracing::debug!(command = %command, "command emitted"),
            Err(e) => tracing::warn!(command = %command, error = %e, "failed to emit command"),
        }
    }

    /// Take one pending remote command when follower, waiting up to `timeout`.
    ///
    /// Returns `None` in any other role, when nothing arrived, or when the
    /// channel failed. A closed channel drops the endpoint back to inactive.
    pub fn poll(&mut self, timeout: Duration) -> Option<Incoming> {
        let Endpoint::Follower(rx) = &mut self.endpoint else {
            return None;
        };
        let received = if timeout.is_zero() {
            rx.try_recv()
        } else {
            rx.recv_timeout(timeout)
        };
        match received {
            Ok(Some(byte)) => Some(match decode_command(&[byte]) {
                Ok(cmd) => Incoming::Command(cmd),
                Err(CommandError::UnknownByte(b)) => Incoming::Unknown(b),
                Err(_) => Incoming::Unknown(byte),
            }),
            Ok(None) => None,
            Err(ChannelError::Closed) => {
                tracing::warn!(key = %self.key, "command channel closed by originator");
                self.endpoint = Endpoint::Inactive;
                None
            }
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "failed to receive command");
                None
            }
        }
    }
}

impl Drop for CommandSync {
    fn drop(&mut self) {
        let previous = std::mem::replace(&mut self.endpoint, Endpoint::Inactive);
        release(previous, &self.key);
    }
}

/// Tear down an endpoint that is being left. Only an originator destroys.
fn release(endpoint: Endpoint, key: &str) {
    if let Endpoint::Originator(tx) = endpoint {
        match tx.destroy() {
            Ok(()) => tracing::info!(key, "command channel destroyed"),
            Err(e) => tracing::warn!(key, error = %e, "failed to destroy command channel"),
        }
    }
}
