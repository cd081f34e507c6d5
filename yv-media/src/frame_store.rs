//! Owned frame buffers and the two decode strategies.
//!
//! The store allocates its four buffers once (an interleaved `raw` buffer plus
//! one buffer per plane) and overwrites them in place for every frame.
//! Planar formats read their three planes straight from the source; packed
//! formats read one interleaved block into `raw` and split it into planes.

use crate::error::MediaError;
use crate::format::{FormatDescriptor, Layout, PlaneKind};
use crate::source::{ByteSource, ReadOutcome};

/// Result of decoding one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeStatus {
    /// A complete frame is now in the buffers.
    Frame,
    /// The source ran out. Buffer contents are unspecified.
    EndOfStream,
}

/// Allocate a zeroed buffer, reporting failure instead of aborting.
pub(crate) fn allocate(buffer: &'static str, bytes: usize) -> Result<Vec<u8>, MediaError> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(bytes)
        .map_err(|_| MediaError::Allocation { buffer, bytes })?;
    buf.resize(bytes, 0);
    Ok(buf)
}

/// Raw and decoded buffers for the current frame.
pub struct FrameStore {
    descriptor: FormatDescriptor,
    raw: Vec<u8>,
    luma: Vec<u8>,
    cb: Vec<u8>,
    cr: Vec<u8>,
}

impl FrameStore {
    /// Allocate every buffer for `descriptor`.
    pub fn new(descriptor: FormatDescriptor) -> Result<Self, MediaError> {
        let store = Self {
            raw: allocate("raw", descriptor.frame_size)?,
            luma: allocate("luma", descriptor.luma_size)?,
            cb: allocate("cb", descriptor.cb_size)?,
            cr: allocate("cr", descriptor.cr_size)?,
            descriptor,
        };

        tracing::debug!(
            format = %descriptor.format,
            width = descriptor.width,
            height = descriptor.height,
            frame_size = descriptor.frame_size,
            "frame store allocated"
        );

        Ok(store)
    }

    pub fn descriptor(&self) -> &FormatDescriptor {
        &self.descriptor
    }

    /// Interleaved frame bytes. Only meaningful for packed formats.
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    pub fn luma(&self) -> &[u8] {
        &self.luma
    }

    pub fn cb(&self) -> &[u8] {
        &self.cb
    }

    pub fn cr(&self) -> &[u8] {
        &self.cr
    }

    pub fn plane(&self, kind: PlaneKind) -> &[u8] {
        match kind {
            PlaneKind::Luma => &self.luma,
            PlaneKind::Cb => &self.cb,
            PlaneKind::Cr => &self.cr,
        }
    }

    pub(crate) fn plane_mut(&mut self, kind: PlaneKind) -> &mut [u8] {
        match kind {
            PlaneKind::Luma => &mut self.luma,
            PlaneKind::Cb => &mut self.cb,
            PlaneKind::Cr => &mut self.cr,
        }
    }

    /// Read exactly one frame from `source` into the buffers.
    ///
    /// A short read anywhere reports [`DecodeStatus::EndOfStream`]; the
    /// buffers must then be treated as unavailable until the next
    /// successful decode.
    pub fn decode<S: ByteSource + ?Sized>(
        &mut self,
        source: &mut S,
    ) -> Result<DecodeStatus, MediaError> {
        match self.descriptor.layout() {
            Layout::Planar => self.decode_planar(source),
            Layout::Packed => self.decode_packed(source),
        }
    }

    fn decode_planar<S: ByteSource + ?Sized>(
        &mut self,
        source: &mut S,
    ) -> Result<DecodeStatus, MediaError> {
        let order = self
            .descriptor
            .format
            .plane_order()
            .unwrap_or([PlaneKind::Luma, PlaneKind::Cb, PlaneKind::Cr]);

        for kind in order {
            let buf = self.plane_mut(kind);
            if let ReadOutcome::Short { read } = source.read_block(buf)? {
                tracing::debug!(plane = kind.label(), read, "short read, end of stream");
                return Ok(DecodeStatus::EndOfStream);
            }
        }
        Ok(DecodeStatus::Frame)
    }

    fn decode_packed<S: ByteSource + ?Sized>(
        &mut self,
        source: &mut S,
    ) -> Result<DecodeStatus, MediaError> {
        if let ReadOutcome::Short { read } = source.read_block(&mut self.raw)? {
            tracing::debug!(read, "short read, end of stream");
            return Ok(DecodeStatus::EndOfStream);
        }
        self.deinterleave();
        Ok(DecodeStatus::Frame)
    }

    /// Split the interleaved buffer into the three planes.
    fn deinterleave(&mut self) {
        for kind in [PlaneKind::Luma, PlaneKind::Cb, PlaneKind::Cr] {
            let offset = self.descriptor.interleave_offset(kind);
            let stride = FormatDescriptor::interleave_stride(kind);
            let plane = match kind {
                PlaneKind::Luma => &mut self.luma,
                PlaneKind::Cb => &mut self.cb,
                PlaneKind::Cr => &mut self.cr,
            };
            for (dst, src) in plane
                .iter_mut()
                .zip(self.raw.iter().skip(offset).step_by(stride))
            {
                *dst = *src;
            }
        }
    }

    /// Write the planes back into the interleaved buffer, so `raw` reflects
    /// any plane edits. No-op for planar formats.
    pub(crate) fn reinterleave(&mut self) {
        if self.descriptor.layout() != Layout::Packed {
            return;
        }
        for kind in [PlaneKind::Luma, PlaneKind::Cb, PlaneKind::Cr] {
            let offset = self.descriptor.interleave_offset(kind);
            let stride = FormatDescriptor::interleave_stride(kind);
            let plane = match kind {
                PlaneKind::Luma => &self.luma,
                PlaneKind::Cb => &self.cb,
                PlaneKind::Cr => &self.cr,
            };
            for (dst, src) in self
                .raw
                .iter_mut()
                .skip(offset)
                .step_by(stride)
                .zip(plane.iter())
            {
                *dst = *src;
            }
        }
    }
}
