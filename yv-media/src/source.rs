//! Sequential, seekable byte sources for raw frame data.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

/// Result of a block read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    /// The buffer was filled completely.
    Complete,
    /// The source ran out before the buffer was full.
    Short { read: usize },
}

/// A source of raw frame bytes.
///
/// Implemented for every `Read + Seek` type, so files and in-memory cursors
/// both work.
pub trait ByteSource {
    /// Fill `buf` completely, or report how far the source got.
    fn read_block(&mut self, buf: &mut [u8]) -> io::Result<ReadOutcome>;

    /// Move the read cursor to an absolute byte offset.
    fn seek_to(&mut self, offset: u64) -> io::Result<()>;

    /// Current read cursor.
    fn read_position(&mut self) -> io::Result<u64>;

    /// Total length of the source, leaving the cursor where it was.
    fn total_len(&mut self) -> io::Result<u64>;
}

impl<T: Read + Seek> ByteSource for T {
    fn read_block(&mut self, buf: &mut [u8]) -> io::Result<ReadOutcome> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.read(&mut buf[filled..]) {
                Ok(0) => return Ok(ReadOutcome::Short { read: filled }),
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        Ok(ReadOutcome::Complete)
    }

    fn seek_to(&mut self, offset: u64) -> io::Result<()> {
        self.seek(SeekFrom::Start(offset)).map(|_| ())
    }

    fn read_position(&mut self) -> io::Result<u64> {
        self.stream_position()
    }

    fn total_len(&mut self) -> io::Result<u64> {
        let pos = self.stream_position()?;
        let len = self.seek(SeekFrom::End(0))?;
        self.seek(SeekFrom::Start(pos))?;
        Ok(len)
    }
}

/// Open a raw YUV file for reading.
pub fn open_file(path: &Path) -> io::Result<File> {
    let file = File::open(path)?;
    tracing::debug!(path = %path.display(), "opened byte source");
    Ok(file)
}
