//! Macroblock inspection: locate the 16x16 block under a display position and
//! dump its samples as hex.

use std::fmt;

use crate::format::{FormatDescriptor, MACROBLOCK_SIZE};
use crate::frame_store::FrameStore;

/// Samples of one macroblock, copied out of the frame store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroblockDump {
    pub index: u32,
    /// 16 rows of 16 luma samples, row-major.
    pub luma: Vec<u8>,
    /// Co-located Cb block, row-major.
    pub cb: Vec<u8>,
    /// Co-located Cr block, row-major.
    pub cr: Vec<u8>,
}

/// Index of the macroblock under display position `(x, y)` at `zoom`.
///
/// Returns `None` when the zoom is not a magnification (block maths has no
/// meaning when shrunk) or the position falls outside the frame.
pub fn macroblock_index(d: &FormatDescriptor, x: u32, y: u32, zoom: i32) -> Option<u32> {
    if zoom < 1 {
        return None;
    }
    let span = MACROBLOCK_SIZE.checked_mul(zoom as u32)?;
    let col = x / span;
    let row = y / span;
    let per_row = d.macroblocks_per_row();
    if col >= per_row {
        return None;
    }
    let index = col + per_row * row;
    (index < d.macroblock_count()).then_some(index)
}

impl MacroblockDump {
    /// Copy macroblock `index` out of `store`.
    pub fn extract(store: &FrameStore, index: u32) -> Option<Self> {
        let d = store.descriptor();
        if index >= d.macroblock_count() {
            return None;
        }
        let per_row = d.macroblocks_per_row();
        let col = (index % per_row) as usize;
        let row = (index / per_row) as usize;
        let mb = MACROBLOCK_SIZE as usize;

        let luma = copy_block(store.luma(), d.width as usize, col * mb, row * mb, mb, mb);

        let (cw, ch) = d.macroblock_chroma_block();
        let chroma_pitch = d.chroma_width();
        let cb = copy_block(store.cb(), chroma_pitch, col * cw, row * ch, cw, ch);
        let cr = copy_block(store.cr(), chroma_pitch, col * cw, row * ch, cw, ch);

        Some(Self {
            index,
            luma,
            cb,
            cr,
        })
    }
}

fn copy_block(
    plane: &[u8],
    pitch: usize,
    x0: usize,
    y0: usize,
    width: usize,
    height: usize,
) -> Vec<u8> {
    let mut out = Vec::with_capacity(width * height);
    for y in y0..y0 + height {
        let start = y * pitch + x0;
        out.extend_from_slice(&plane[start..start + width]);
    }
    out
}

fn write_rows(f: &mut fmt::Formatter<'_>, label: &str, data: &[u8]) -> fmt::Result {
    writeln!(f, "= {label} =")?;
    for row in data.chunks(MACROBLOCK_SIZE as usize) {
        let line: Vec<String> = row.iter().map(|b| format!("{b:02X}")).collect();
        writeln!(f, "{}", line.join(" "))?;
    }
    Ok(())
}

impl fmt::Display for MacroblockDump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "MB #{}", self.index)?;
        write_rows(f, "Y", &self.luma)?;
        write_rows(f, "Cb", &self.cb)?;
        write_rows(f, "Cr", &self.cr)
    }
}
