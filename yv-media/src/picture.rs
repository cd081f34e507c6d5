//! Display composition: copy the decoded frame into a [`Picture`] and draw
//! overlays on top of it.
//!
//! The picture is what the display sink receives. Overlays never touch the
//! frame store, so switching an overlay off and recomposing restores the
//! clean frame without another decode.
//!
//! Composition order is fixed: copy, grid, luma mask, Cb mask, Cr mask.

use crate::error::MediaError;
use crate::format::{FormatDescriptor, Layout, PlaneKind, NEUTRAL};
use crate::frame_store::{allocate, FrameStore};

/// Primary grid line intensity.
pub const GRID_PRIMARY: u8 = 0xF0;
/// Secondary grid intensity, drawn a few samples after the primary.
pub const GRID_SECONDARY: u8 = 0x20;

/// Spacing of grid lines in luma samples.
const GRID_PITCH: usize = 16;
/// Dash period along a line, in samples.
const DASH: usize = 8;

/// Which planes carry signal on screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PlaneSelection {
    #[default]
    All,
    LumaOnly,
    CbOnly,
    CrOnly,
}

impl PlaneSelection {
    /// Planes that get masked to the neutral value.
    fn masked(self) -> &'static [PlaneKind] {
        match self {
            PlaneSelection::All => &[],
            PlaneSelection::LumaOnly => &[PlaneKind::Cb, PlaneKind::Cr],
            PlaneSelection::CbOnly => &[PlaneKind::Luma, PlaneKind::Cr],
            PlaneSelection::CrOnly => &[PlaneKind::Luma, PlaneKind::Cb],
        }
    }
}

/// Overlay switches applied during composition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Overlays {
    pub grid: bool,
    pub planes: PlaneSelection,
}

/// Display buffers handed to the sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Picture {
    /// Three planes, as for planar formats.
    Planar {
        luma: Vec<u8>,
        cb: Vec<u8>,
        cr: Vec<u8>,
    },
    /// One interleaved buffer, as for packed formats.
    Packed { raw: Vec<u8> },
}

impl Picture {
    /// Allocate a blank picture matching `descriptor`.
    pub fn for_descriptor(descriptor: &FormatDescriptor) -> Result<Self, MediaError> {
        let picture = match descriptor.layout() {
            Layout::Planar => {
                let mut cb = allocate("picture cb", descriptor.cb_size)?;
                let mut cr = allocate("picture cr", descriptor.cr_size)?;
                cb.fill(NEUTRAL);
                cr.fill(NEUTRAL);
                Picture::Planar {
                    luma: allocate("picture luma", descriptor.luma_size)?,
                    cb,
                    cr,
                }
            }
            Layout::Packed => Picture::Packed {
                raw: allocate("picture raw", descriptor.frame_size)?,
            },
        };
        Ok(picture)
    }

    /// Copy the current frame out of `store`.
    pub fn fill_from(&mut self, store: &FrameStore) -> Result<(), MediaError> {
        match self {
            Picture::Planar { luma, cb, cr } => {
                copy_exact(luma, store.luma())?;
                copy_exact(cb, store.cb())?;
                copy_exact(cr, store.cr())?;
            }
            Picture::Packed { raw } => copy_exact(raw, store.raw())?,
        }
        Ok(())
    }

    /// Recompose from `store` and apply `overlays` in the fixed order.
    pub fn compose(
        &mut self,
        store: &FrameStore,
        overlays: Overlays,
    ) -> Result<(), MediaError> {
        let descriptor = store.descriptor();
        self.fill_from(store)?;
        if overlays.grid {
            self.draw_grid(descriptor);
        }
        self.isolate(descriptor, overlays.planes);
        Ok(())
    }

    /// Luma bytes of a planar picture, or the interleaved buffer of a packed one.
    pub fn primary(&self) -> &[u8] {
        match self {
            Picture::Planar { luma, .. } => luma,
            Picture::Packed { raw } => raw,
        }
    }

    /// Draw the two-tone macroblock grid into the luma samples.
    pub fn draw_grid(&mut self, d: &FormatDescriptor) {
        let height = d.height as usize;
        match self {
            Picture::Planar { luma, .. } => {
                let width = d.width as usize;
                draw_grid_lines(luma, width, height, 0, width, 1);
            }
            Picture::Packed { raw } => {
                // Two bytes per pixel: every distance doubles along a row.
                let pitch = d.packed_pitch();
                draw_grid_lines(raw, pitch, height, d.grid_offset, pitch, 2);
            }
        }
    }

    /// Overwrite every plane except the selected one with the neutral value.
    pub fn isolate(&mut self, d: &FormatDescriptor, selection: PlaneSelection) {
        for &kind in selection.masked() {
            self.mask_plane(d, kind);
        }
    }

    fn mask_plane(&mut self, d: &FormatDescriptor, kind: PlaneKind) {
        match self {
            Picture::Planar { luma, cb, cr } => match kind {
                PlaneKind::Luma => luma.fill(NEUTRAL),
                PlaneKind::Cb => cb.fill(NEUTRAL),
                PlaneKind::Cr => cr.fill(NEUTRAL),
            },
            Picture::Packed { raw } => {
                let offset = d.interleave_offset(kind);
                let stride = FormatDescriptor::interleave_stride(kind);
                raw.iter_mut()
                    .skip(offset)
                    .step_by(stride)
                    .for_each(|b| *b = NEUTRAL);
            }
        }
    }
}

fn copy_exact(dst: &mut [u8], src: &[u8]) -> Result<(), MediaError> {
    if dst.len() != src.len() {
        return Err(MediaError::SizeMismatch {
            expected: dst.len(),
            actual: src.len(),
        });
    }
    dst.copy_from_slice(src);
    Ok(())
}

/// Draw dashed horizontal lines every 16 rows and vertical lines every 16
/// samples into a row-major buffer.
///
/// `scale` is the byte distance between horizontally adjacent luma samples
/// (1 for a luma plane, 2 for an interleaved 4:2:2 row); `start` is the byte
/// of the first luma sample in each row.
fn draw_grid_lines(
    buf: &mut [u8],
    pitch: usize,
    height: usize,
    start: usize,
    row_bytes: usize,
    scale: usize,
) {
    let dash = DASH * scale;
    let half = dash / 2;

    // Horizontal lines.
    for y in (0..height).step_by(GRID_PITCH) {
        let row = y * pitch;
        for x in (start..row_bytes).step_by(dash) {
            buf[row + x] = GRID_PRIMARY;
            if x + half < row_bytes {
                buf[row + x + half] = GRID_SECONDARY;
            }
        }
    }

    // Vertical lines.
    for x in (start..row_bytes).step_by(GRID_PITCH * scale) {
        for y in (0..height).step_by(DASH) {
            buf[y * pitch + x] = GRID_PRIMARY;
            if y + DASH / 2 < height {
                buf[(y + DASH / 2) * pitch + x] = GRID_SECONDARY;
            }
        }
    }
}
