//! Per-plane value histograms.

use std::fmt;

use crate::format::PlaneKind;
use crate::frame_store::FrameStore;

/// Counts of each sample value, one table per plane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Histogram {
    pub luma: [u64; 256],
    pub cb: [u64; 256],
    pub cr: [u64; 256],
}

fn count(plane: &[u8]) -> [u64; 256] {
    let mut bins = [0u64; 256];
    for &v in plane {
        bins[v as usize] += 1;
    }
    bins
}

impl Histogram {
    /// Histogram of the frame currently held in `store`.
    pub fn of(store: &FrameStore) -> Self {
        Self {
            luma: count(store.luma()),
            cb: count(store.cb()),
            cr: count(store.cr()),
        }
    }

    pub fn plane(&self, kind: PlaneKind) -> &[u64; 256] {
        match kind {
            PlaneKind::Luma => &self.luma,
            PlaneKind::Cb => &self.cb,
            PlaneKind::Cr => &self.cr,
        }
    }
}

impl fmt::Display for Histogram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for kind in [PlaneKind::Luma, PlaneKind::Cb, PlaneKind::Cr] {
            write!(f, "{},", kind.label())?;
            for n in self.plane(kind) {
                write!(f, "{n},")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
