//! Command channel over a Unix-domain socket.
//!
//! The originator binds `<dir>/<key>.sock` and never blocks: each send first
//! accepts whichever followers have connected since the last send, then writes
//! the byte to every one of them. Followers that cannot take the byte are
//! dropped.

use std::fs;
use std::io::{self, Read, Write};
use std::os::unix::fs::{MetadataExt, PermissionsExt};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::channel::{validate_key, ChannelError, CommandTransport, FollowerEnd, OriginatorEnd};

/// Directory that holds channel sockets.
///
/// An explicit override wins; otherwise the per-user runtime directory, then
/// `<tmp>/yv`.
pub fn socket_dir(override_dir: Option<&Path>) -> PathBuf {
    if let Some(dir) = override_dir {
        return dir.to_path_buf();
    }
    directories::ProjectDirs::from("", "", "yv")
        .and_then(|dirs| dirs.runtime_dir().map(Path::to_path_buf))
        .unwrap_or_else(|| std::env::temp_dir().join("yv"))
}

/// Socket-backed transport rooted at one directory.
#[derive(Debug, Clone)]
pub struct UnixTransport {
    dir: PathBuf,
}

impl UnixTransport {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn socket_path(&self, key: &str) -> Result<PathBuf, ChannelError> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{key}.sock")))
    }
}

impl CommandTransport for UnixTransport {
    fn create(&self, key: &str) -> Result<Box<dyn OriginatorEnd>, ChannelError> {
        let path = self.socket_path(key)?;
        fs::create_dir_all(&self.dir)?;

        clear_stale_socket(&path, key)?;

        let listener = UnixListener::bind(&path)?;
        listener.set_nonblocking(true)?;

        fs::set_permissions(&path, fs::Permissions::from_mode(0o600))?;
        let meta = fs::metadata(&path)?;

        tracing::info!(path = %path.display(), "command channel listening");
        Ok(Box::new(SocketOriginator {
            listener,
            path,
            identity: (meta.dev(), meta.ino()),
            followers: Vec::new(),
            removed: false,
        }))
    }

    fn attach(&self, key: &str) -> Result<Box<dyn FollowerEnd>, ChannelError> {
        let path = self.socket_path(key)?;
        let not_found = || ChannelError::NotFound {
            key: key.to_string(),
        };
        if !path.exists() {
            return Err(not_found());
        }
        let stream = UnixStream::connect(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound | io::ErrorKind::ConnectionRefused => not_found(),
            _ => ChannelError::Io(e),
        })?;
        tracing::info!(path = %path.display(), "attached to command channel");
        Ok(Box::new(SocketFollower { stream }))
    }
}

/// Remove a socket file left behind by an originator that is gone.
///
/// A socket that still accepts connections belongs to a live originator and
/// is left alone.
fn clear_stale_socket(path: &Path, key: &str) -> Result<(), ChannelError> {
    if !path.exists() {
        return Ok(());
    }
    match UnixStream::connect(path) {
        Ok(_) => Err(ChannelError::InUse {
            key: key.to_string(),
        }),
        Err(e) if e.kind() == io::ErrorKind::ConnectionRefused => {
            tracing::debug!(path = %path.display(), "removing stale channel socket");
            match fs::remove_file(path) {
                Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e.into()),
                _ => Ok(()),
            }
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

struct SocketOriginator {
    listener: UnixListener,
    path: PathBuf,
    /// Device and inode of the socket file this originator bound.
    identity: (u64, u64),
    followers: Vec<UnixStream>,
    removed: bool,
}

impl SocketOriginator {
    fn accept_pending(&mut self) -> Result<(), ChannelError> {
        loop {
            match self.listener.accept() {
                Ok((stream, _)) => {
                    stream.set_nonblocking(true)?;
                    self.followers.push(stream);
                    tracing::debug!(followers = self.followers.len(), "follower connected");
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => return Ok(()),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn remove_socket(&mut self) -> io::Result<()> {
        if self.removed {
            return Ok(());
        }
        self.removed = true;
        let meta = match fs::metadata(&self.path) {
            Ok(meta) => meta,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e),
        };
        if (meta.dev(), meta.ino()) != self.identity {
            tracing::debug!(
                path = %self.path.display(),
                "socket path now belongs to another originator"
            );
            return Ok(());
        }
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

impl OriginatorEnd for SocketOriginator {
    fn send(&mut self, byte: u8) -> Result<(), ChannelError> {
        self.accept_pending()?;
        self.followers.retain_mut(|stream| match stream.write(&[byte]) {
            Ok(1) => true,
            Ok(_) => false,
            Err(e) => {
                tracing::debug!(error = %e, "dropping follower");
                false
            }
        });
        Ok(())
    }

    fn destroy(mut self: Box<Self>) -> Result<(), ChannelError> {
        self.followers.clear();
        self.remove_socket()?;
        tracing::info!(path = %self.path.display(), "command channel destroyed");
        Ok(())
    }
}

impl Drop for SocketOriginator {
    fn drop(&mut self) {
        if let Err(e) = self.remove_socket() {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to remove channel socket");
        }
    }
}

struct SocketFollower {
    stream: UnixStream,
}

impl SocketFollower {
    fn read_one(&mut self) -> Result<Option<u8>, ChannelError> {
        let mut buf = [0u8; 1];
        loop {
            match self.stream.read(&mut buf) {
                Ok(0) => return Err(ChannelError::Closed),
                Ok(_) => return Ok(Some(buf[0])),
                Err(e)
                    if matches!(
                        e.kind(),
                        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
                    ) =>
                {
                    return Ok(None)
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }
    }
}

impl FollowerEnd for SocketFollower {
    fn try_recv(&mut self) -> Result<Option<u8>, ChannelError> {
        self.stream.set_nonblocking(true)?;
        self.read_one()
    }

    fn recv_timeout(&mut self, timeout: Duration) -> Result<Option<u8>, ChannelError> {
        if timeout.is_zero() {
            return self.try_recv();
        }
        self.stream.set_nonblocking(false)?;
        self.stream.set_read_timeout(Some(timeout))?;
        self.read_one()
    }
}
