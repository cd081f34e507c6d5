//! Command channels between yv processes and the role-switching endpoint.

pub mod channel;
pub mod memory;
pub mod sync;
#[cfg(unix)]
pub mod unix;

pub use channel::{ChannelError, CommandTransport, FollowerEnd, OriginatorEnd};
pub use memory::MemoryHub;
pub use sync::{CommandSync, Incoming};
#[cfg(unix)]
pub use unix::{socket_dir, UnixTransport};
