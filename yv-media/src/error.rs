//! Error type for frame decoding and analysis.

use thiserror::Error;

/// Errors raised by the media layer.
///
/// Running out of input is not one of them: decoders report it as
/// [`DecodeStatus::EndOfStream`](crate::frame_store::DecodeStatus).
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("format tag '{0}' is not recognized")]
    UnknownFormat(String),
    #[error("invalid frame dimensions {width}x{height}: {reason}")]
    InvalidDimensions {
        width: u32,
        height: u32,
        reason: &'static str,
    },
    #[error("failed to allocate {bytes} bytes for the {buffer} buffer")]
    Allocation { buffer: &'static str, bytes: usize },
    #[error("frame buffers do not match the active format ({expected} vs {actual} bytes)")]
    SizeMismatch { expected: usize, actual: usize },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
