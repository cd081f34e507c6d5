//! Shared test utilities.
//!
//! Available behind the `test-util` feature or in `#[cfg(test)]` within
//! yv-media. Builds synthetic raw frames so tests never need fixture files.

use crate::format::{FormatDescriptor, Layout, PlaneKind};

/// Initialise a tracing subscriber for tests.
///
/// Respects `RUST_LOG`, defaults to `debug`. Safe to call more than once.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "debug".into()),
        )
        .with_test_writer()
        .try_init();
}

/// Encode one frame whose planes are filled with the given constant values,
/// laid out in `d`'s on-disk byte order.
pub fn synthetic_frame(d: &FormatDescriptor, luma: u8, cb: u8, cr: u8) -> Vec<u8> {
    let value = |kind: PlaneKind| match kind {
        PlaneKind::Luma => luma,
        PlaneKind::Cb => cb,
        PlaneKind::Cr => cr,
    };

    match d.layout() {
        Layout::Planar => {
            let mut out = Vec::with_capacity(d.frame_size);
            if let Some(order) = d.format.plane_order() {
                for kind in order {
                    out.extend(std::iter::repeat(value(kind)).take(d.plane_size(kind)));
                }
            }
            out
        }
        Layout::Packed => {
            let mut out = vec![0u8; d.frame_size];
            for kind in [PlaneKind::Luma, PlaneKind::Cb, PlaneKind::Cr] {
                let offset = d.interleave_offset(kind);
                let stride = FormatDescriptor::interleave_stride(kind);
                for b in out.iter_mut().skip(offset).step_by(stride) {
                    *b = value(kind);
                }
            }
            out
        }
    }
}

/// Concatenate `frames` synthetic frames. Frame `n` has luma `n`, Cb `0x40 + n`
/// and Cr `0xC0 - n` (all wrapping), so every frame is distinguishable.
pub fn synthetic_stream(d: &FormatDescriptor, frames: u8) -> Vec<u8> {
    (0..frames)
        .flat_map(|n| synthetic_frame(d, n, 0x40u8.wrapping_add(n), 0xC0u8.wrapping_sub(n)))
        .collect()
}
