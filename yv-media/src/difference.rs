//! Difference mode: compare the primary stream against a secondary one frame by
//! frame, report PSNR on luma, and replace the frame with a visual diff.

use std::fmt;

use crate::error::MediaError;
use crate::format::{FormatDescriptor, PlaneKind, NEUTRAL};
use crate::frame_store::{allocate, DecodeStatus, FrameStore};
use crate::source::ByteSource;

/// Peak signal-to-noise ratio between two luma planes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Psnr {
    /// The planes are identical; the metric is undefined.
    Undefined,
    /// PSNR in decibels.
    Decibels(f64),
}

impl Psnr {
    pub fn as_f64(self) -> f64 {
        match self {
            Psnr::Undefined => f64::NAN,
            Psnr::Decibels(db) => db,
        }
    }
}

impl fmt::Display for Psnr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Psnr::Undefined => f.write_str("NaN"),
            Psnr::Decibels(db) => write!(f, "{db:.6}"),
        }
    }
}

/// PSNR of `b` against `a` with a peak of 256.
pub fn psnr(a: &[u8], b: &[u8]) -> Psnr {
    let sum: u64 = a
        .iter()
        .zip(b)
        .map(|(&x, &y)| {
            let d = u64::from(x.abs_diff(y));
            d * d
        })
        .sum();

    if sum == 0 {
        return Psnr::Undefined;
    }

    let mse = sum as f64 / a.len() as f64;
    Psnr::Decibels(10.0 * (65536.0 / mse).log10())
}

/// Signed visual difference centred on mid grey, with 8-bit wraparound.
pub fn visual_difference(a: u8, b: u8) -> u8 {
    NEUTRAL.wrapping_sub(a.wrapping_sub(b))
}

/// Outcome of one difference step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DiffOutcome {
    /// Both frames decoded; the store now holds the visual difference.
    Frame(Psnr),
    /// One of the streams ran out.
    EndOfStream,
}

/// Reusable state for difference mode.
pub struct DifferenceEngine {
    primary_luma: Vec<u8>,
}

impl DifferenceEngine {
    pub fn new(descriptor: &FormatDescriptor) -> Result<Self, MediaError> {
        Ok(Self {
            primary_luma: allocate("difference luma", descriptor.luma_size)?,
        })
    }

    /// Decode the next frame of both streams and leave the difference frame in
    /// `store`.
    ///
    /// If the secondary stream runs out, the primary cursor is moved back to
    /// where it was so the caller can retry or seek elsewhere.
    pub fn compute<P, S>(
        &mut self,
        store: &mut FrameStore,
        primary: &mut P,
        secondary: &mut S,
    ) -> Result<DiffOutcome, MediaError>
    where
        P: ByteSource + ?Sized,
        S: ByteSource + ?Sized,
    {
        let primary_pos = primary.read_position()?;

        if store.decode(primary)? == DecodeStatus::EndOfStream {
            primary.seek_to(primary_pos)?;
            return Ok(DiffOutcome::EndOfStream);
        }
        if self.primary_luma.len() != store.luma().len() {
            return Err(MediaError::SizeMismatch {
                expected: self.primary_luma.len(),
                actual: store.luma().len(),
            });
        }
        self.primary_luma.copy_from_slice(store.luma());

        if store.decode(secondary)? == DecodeStatus::EndOfStream {
            primary.seek_to(primary_pos)?;
            tracing::debug!("secondary stream exhausted, primary cursor restored");
            return Ok(DiffOutcome::EndOfStream);
        }

        // Measure before the luma plane is overwritten.
        let metric = psnr(&self.primary_luma, store.luma());

        for (out, &a) in store
            .plane_mut(PlaneKind::Luma)
            .iter_mut()
            .zip(&self.primary_luma)
        {
            *out = visual_difference(a, *out);
        }
        store.plane_mut(PlaneKind::Cb).fill(NEUTRAL);
        store.plane_mut(PlaneKind::Cr).fill(NEUTRAL);
        store.reinterleave();

        tracing::trace!(psnr = metric.as_f64(), "difference frame computed");
        Ok(DiffOutcome::Frame(metric))
    }
}
