//! Raw YUV frame decoding, display composition, and frame analysis.

pub mod difference;
pub mod error;
pub mod format;
pub mod frame_store;
pub mod histogram;
pub mod macroblock;
pub mod picture;
pub mod source;
#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use difference::{DiffOutcome, DifferenceEngine, Psnr};
pub use error::MediaError;
pub use format::{FormatDescriptor, InputWarning, Layout, PixelFormat, PlaneKind};
pub use frame_store::{DecodeStatus, FrameStore};
pub use histogram::Histogram;
pub use macroblock::MacroblockDump;
pub use picture::{Overlays, Picture, PlaneSelection};
pub use source::{ByteSource, ReadOutcome};
