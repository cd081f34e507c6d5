//! In-process command channels.
//!
//! A [`MemoryHub`] plays the role of the operating system: channels live in a
//! shared table keyed by name, and every end handed out shares one FIFO queue.
//! Cloning the hub shares the table, so an originator and a follower built
//! from clones of the same hub talk to each other.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use crate::channel::{validate_key, ChannelError, CommandTransport, FollowerEnd, OriginatorEnd};

#[derive(Default)]
struct Queue {
    pending: VecDeque<u8>,
    closed: bool,
}

#[derive(Default)]
struct Shared {
    queue: Mutex<Queue>,
    ready: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Queue> {
        // A panic while holding the lock cannot leave the queue half-updated.
        self.queue.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn close(&self) {
        self.lock().closed = true;
        self.ready.notify_all();
    }
}

/// Table of named in-memory channels.
#[derive(Clone, Default)]
pub struct MemoryHub {
    channels: Arc<Mutex<HashMap<String, Arc<Shared>>>>,
}

impl MemoryHub {
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self) -> MutexGuard<'_, HashMap<String, Arc<Shared>>> {
        self.channels.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Whether a channel named `key` currently exists.
    pub fn exists(&self, key: &str) -> bool {
        self.table().contains_key(key)
    }

    /// Number of unread bytes in channel `key`.
    pub fn pending(&self, key: &str) -> usize {
        self.table()
            .get(key)
            .map(|s| s.lock().pending.len())
            .unwrap_or(0)
    }

    /// Push a raw byte into channel `key` as if an originator had sent it.
    pub fn inject(&self, key: &str, byte: u8) -> Result<(), ChannelError> {
        let shared = self
            .table()
            .get(key)
            .cloned()
            .ok_or_else(|| ChannelError::NotFound {
                key: key.to_string(),
            })?;
        shared.lock().pending.push_back(byte);
        shared.ready.notify_one();
        Ok(())
    }
}

impl CommandTransport for MemoryHub {
    fn create(&self, key: &str) -> Result<Box<dyn OriginatorEnd>, ChannelError> {
        validate_key(key)?;
        let mut table = self.table();
        if table.get(key).is_some_and(|live| !live.lock().closed) {
            return Err(ChannelError::InUse {
                key: key.to_string(),
            });
        }
        let shared = Arc::new(Shared::default());
        table.insert(key.to_string(), shared.clone());
        drop(table);
        tracing::debug!(key, "in-memory channel created");
        Ok(Box::new(MemoryOriginator {
            hub: self.clone(),
            key: key.to_string(),
            shared,
        }))
    }

    fn attach(&self, key: &str) -> Result<Box<dyn FollowerEnd>, ChannelError> {
        validate_key(key)?;
        let shared = self
            .table()
            .get(key)
            .cloned()
            .ok_or_else(|| ChannelError::NotFound {
                key: key.to_string(),
            })?;
        tracing::debug!(key, "attached to in-memory channel");
        Ok(Box::new(MemoryFollower { shared }))
    }
}

struct MemoryOriginator {
    hub: MemoryHub,
    key: String,
    shared: Arc<Shared>,
}

impl OriginatorEnd for MemoryOriginator {
    fn send(&mut self, byte: u8) -> Result<(), ChannelError> {
        let mut queue = self.shared.lock();
        if queue.closed {
            return Err(ChannelError::Closed);
        }
        queue.pending.push_back(byte);
        drop(queue);
        self.shared.ready.notify_one();
        Ok(())
    }

    fn destroy(self: Box<Self>) -> Result<(), ChannelError> {
        let mut table = self.hub.table();
        // Only remove the entry if it is still ours.
        if table
            .get(&self.key)
            .is_some_and(|s| Arc::ptr_eq(s, &self.shared))
        {
            table.remove(&self.key);
        }
        drop(table);
        self.shared.close();
        tracing::debug!(key = %self.key, "in-memory channel destroyed");
        Ok(())
    }
}

struct MemoryFollower {
    shared: Arc<Shared>,
}

impl FollowerEnd for MemoryFollower {
    fn try_recv(&mut self) -> Result<Option<u8>, ChannelError> {
        let mut queue = self.shared.lock();
        match queue.pending.pop_front() {
            Some(b) => Ok(Some(b)),
            None if queue.closed => Err(ChannelError::Closed),
            None => Ok(None),
        }
    }

    fn recv_timeout(&mut self, timeout: Duration) -> Result<Option<u8>, ChannelError> {
        let deadline = Instant::now() + timeout;
        let mut queue = self.shared.lock();
        loop {
            if let Some(b) = queue.pending.pop_front() {
                return Ok(Some(b));
            }
            if queue.closed {
                return Err(ChannelError::Closed);
            }
            let now = Instant::now();
            if now >= deadline {
                return Ok(None);
            }
            queue = self
                .shared
                .ready
                .wait_timeout(queue, deadline - now)
                .map(|(guard, _)| guard)
                .unwrap_or_else(|e| e.into_inner().0);
        }
    }
}
