//! Format descriptor table for the supported raw YUV layouts.
//!
//! Every layout is identified by its FourCC tag. A [`FormatDescriptor`] binds a
//! layout to a frame size and carries all the byte arithmetic the decoder and
//! overlays need: plane sizes, the total frame size, and where each component
//! starts inside an interleaved group.

use std::str::FromStr;

use crate::error::MediaError;

/// Side length of a macroblock in luma samples.
pub const MACROBLOCK_SIZE: u32 = 16;

/// Neutral sample value for masked planes and neutralized chroma.
pub const NEUTRAL: u8 = 0x80;

/// Supported pixel layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// Planar 4:2:0, Y then Cr then Cb.
    Yv12,
    /// Planar 4:2:0, Y then Cb then Cr.
    Iyuv,
    /// Packed 4:2:2, `Y Cb Y Cr`.
    Yuy2,
    /// Packed 4:2:2, `Cb Y Cr Y`.
    Uyvy,
    /// Packed 4:2:2, `Y Cr Y Cb`.
    Yvyu,
}

/// How the samples of one frame are arranged in the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Three separate contiguous planes.
    Planar,
    /// One buffer with components interleaved byte by byte.
    Packed,
}

/// A colour component plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaneKind {
    Luma,
    Cb,
    Cr,
}

impl PlaneKind {
    pub fn label(self) -> &'static str {
        match self {
            PlaneKind::Luma => "Y",
            PlaneKind::Cb => "Cb",
            PlaneKind::Cr => "Cr",
        }
    }
}

impl PixelFormat {
    pub const ALL: [PixelFormat; 5] = [
        PixelFormat::Yv12,
        PixelFormat::Iyuv,
        PixelFormat::Yuy2,
        PixelFormat::Uyvy,
        PixelFormat::Yvyu,
    ];

    /// FourCC tag.
    pub fn tag(self) -> &'static str {
        match self {
            PixelFormat::Yv12 => "YV12",
            PixelFormat::Iyuv => "IYUV",
            PixelFormat::Yuy2 => "YUY2",
            PixelFormat::Uyvy => "UYVY",
            PixelFormat::Yvyu => "YVYU",
        }
    }

    pub fn layout(self) -> Layout {
        match self {
            PixelFormat::Yv12 | PixelFormat::Iyuv => Layout::Planar,
            PixelFormat::Yuy2 | PixelFormat::Uyvy | PixelFormat::Yvyu => Layout::Packed,
        }
    }

    /// Average bits per pixel.
    pub fn bits_per_pixel(self) -> u32 {
        match self.layout() {
            Layout::Planar => 12,
            Layout::Packed => 16,
        }
    }

    /// Order in which planar formats store their planes.
    ///
    /// Packed formats have no plane order and return `None`.
    pub fn plane_order(self) -> Option<[PlaneKind; 3]> {
        match self {
            PixelFormat::Yv12 => Some([PlaneKind::Luma, PlaneKind::Cr, PlaneKind::Cb]),
            PixelFormat::Iyuv => Some([PlaneKind::Luma, PlaneKind::Cb, PlaneKind::Cr]),
            _ => None,
        }
    }

    /// Byte offsets of the first Y, Cb and Cr sample and of the first grid
    /// byte inside a four-byte interleave group. All zero for planar formats.
    fn interleave_offsets(self) -> Offsets {
        match self {
            PixelFormat::Yv12 | PixelFormat::Iyuv => Offsets {
                luma: 0,
                cb: 0,
                cr: 0,
                grid: 0,
            },
            // Y U Y V
            PixelFormat::Yuy2 => Offsets {
                luma: 0,
                cb: 1,
                cr: 3,
                grid: 0,
            },
            // U Y V Y
            PixelFormat::Uyvy => Offsets {
                luma: 1,
                cb: 0,
                cr: 2,
                grid: 1,
            },
            // Y V Y U
            PixelFormat::Yvyu => Offsets {
                luma: 0,
                cb: 3,
                cr: 1,
                grid: 0,
            },
        }
    }

    /// Width and height, in chroma samples, of the chroma block co-located
    /// with one macroblock.
    fn macroblock_chroma_block(self) -> (usize, usize) {
        match self.layout() {
            Layout::Planar => (8, 8),
            Layout::Packed => (8, 16),
        }
    }
}

impl FromStr for PixelFormat {
    type Err = MediaError;

    /// Parse a FourCC tag. Only the first four characters are compared.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.get(..4).unwrap_or(s);
        PixelFormat::ALL
            .into_iter()
            .find(|f| f.tag() == tag)
            .ok_or_else(|| MediaError::UnknownFormat(s.to_string()))
    }
}

impl std::fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Debug, Clone, Copy)]
struct Offsets {
    luma: usize,
    cb: usize,
    cr: usize,
    grid: usize,
}

/// Immutable byte geometry of one frame in a given format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatDescriptor {
    pub format: PixelFormat,
    pub width: u32,
    pub height: u32,
    /// Bytes in the luma plane.
    pub luma_size: usize,
    /// Bytes in the Cb plane.
    pub cb_size: usize,
    /// Bytes in the Cr plane.
    pub cr_size: usize,
    /// Bytes in one frame of the stream.
    pub frame_size: usize,
    /// Offset of the first Y sample within an interleave group.
    pub luma_offset: usize,
    /// Offset of the first Cb sample within an interleave group.
    pub cb_offset: usize,
    /// Offset of the first Cr sample within an interleave group.
    pub cr_offset: usize,
    /// Offset of the first grid byte within a packed row.
    pub grid_offset: usize,
}

/// Non-fatal problems with the input geometry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputWarning {
    WidthNotMacroblockAligned(u32),
    HeightNotMacroblockAligned(u32),
    PartialTrailingFrame { stream_len: u64, frame_size: usize },
}

impl std::fmt::Display for InputWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputWarning::WidthNotMacroblockAligned(w) => {
                write!(f, "width {w} is not a multiple of 16")
            }
            InputWarning::HeightNotMacroblockAligned(h) => {
                write!(f, "height {h} is not a multiple of 16")
            }
            InputWarning::PartialTrailingFrame {
                stream_len,
                frame_size,
            } => write!(
                f,
                "stream length {stream_len} is not a whole number of {frame_size}-byte frames"
            ),
        }
    }
}

impl FormatDescriptor {
    /// Build the descriptor for `format` at `width`x`height`.
    ///
    /// Dimensions must be non-zero and even so the chroma planes subsample
    /// exactly.
    pub fn new(format: PixelFormat, width: u32, height: u32) -> Result<Self, MediaError> {
        if width == 0 || height == 0 {
            return Err(MediaError::InvalidDimensions {
                width,
                height,
                reason: "dimensions must be non-zero",
            });
        }
        if width % 2 != 0 || height % 2 != 0 {
            return Err(MediaError::InvalidDimensions {
                width,
                height,
                reason: "dimensions must be even",
            });
        }

        let wh = width as usize * height as usize;
        let (chroma_size, frame_size) = match format.layout() {
            Layout::Planar => (wh / 4, wh * 3 / 2),
            Layout::Packed => (wh / 2, wh * 2),
        };
        let offsets = format.interleave_offsets();

        Ok(Self {
            format,
            width,
            height,
            luma_size: wh,
            cb_size: chroma_size,
            cr_size: chroma_size,
            frame_size,
            luma_offset: offsets.luma,
            cb_offset: offsets.cb,
            cr_offset: offsets.cr,
            grid_offset: offsets.grid,
        })
    }

    pub fn layout(&self) -> Layout {
        self.format.layout()
    }

    /// Width in samples of a chroma plane row.
    pub fn chroma_width(&self) -> usize {
        self.width as usize / 2
    }

    /// Bytes per row of the interleaved buffer (packed formats).
    pub fn packed_pitch(&self) -> usize {
        self.width as usize * 2
    }

    /// Size in bytes of the plane for `kind`.
    pub fn plane_size(&self, kind: PlaneKind) -> usize {
        match kind {
            PlaneKind::Luma => self.luma_size,
            PlaneKind::Cb => self.cb_size,
            PlaneKind::Cr => self.cr_size,
        }
    }

    /// Byte offset of the first sample of `kind` within an interleave group.
    pub fn interleave_offset(&self, kind: PlaneKind) -> usize {
        match kind {
            PlaneKind::Luma => self.luma_offset,
            PlaneKind::Cb => self.cb_offset,
            PlaneKind::Cr => self.cr_offset,
        }
    }

    /// Distance between consecutive samples of `kind` in the interleaved buffer.
    pub fn interleave_stride(kind: PlaneKind) -> usize {
        match kind {
            PlaneKind::Luma => 2,
            PlaneKind::Cb | PlaneKind::Cr => 4,
        }
    }

    /// Number of macroblocks per row.
    pub fn macroblocks_per_row(&self) -> u32 {
        self.width / MACROBLOCK_SIZE
    }

    /// Total number of whole macroblocks in a frame.
    pub fn macroblock_count(&self) -> u32 {
        self.macroblocks_per_row() * (self.height / MACROBLOCK_SIZE)
    }

    /// Chroma block geometry per macroblock as `(width, height)`.
    pub fn macroblock_chroma_block(&self) -> (usize, usize) {
        self.format.macroblock_chroma_block()
    }

    /// Bytes of one chroma plane covered by a macroblock (64 or 128).
    pub fn macroblock_chroma_bytes(&self) -> usize {
        let (w, h) = self.macroblock_chroma_block();
        w * h
    }

    /// Rows of 16 bytes needed to print a macroblock's chroma block (4 or 8).
    pub fn macroblock_chroma_rows(&self) -> usize {
        self.macroblock_chroma_bytes() / MACROBLOCK_SIZE as usize
    }

    /// Byte offset of frame number `index` (zero-based) in the stream.
    pub fn frame_offset(&self, index: u64) -> u64 {
        index * self.frame_size as u64
    }

    /// Consistency checks on the input. None of these stop playback.
    pub fn check_input(&self, stream_len: Option<u64>) -> Vec<InputWarning> {
        let mut warnings = Vec::new();
        if self.width % MACROBLOCK_SIZE != 0 {
            warnings.push(InputWarning::WidthNotMacroblockAligned(self.width));
        }
        if self.height % MACROBLOCK_SIZE != 0 {
            warnings.push(InputWarning::HeightNotMacroblockAligned(self.height));
        }
        if let Some(len) = stream_len {
            if len % self.frame_size as u64 != 0 {
                warnings.push(InputWarning::PartialTrailingFrame {
                    stream_len: len,
                    frame_size: self.frame_size,
                });
            }
        }
        warnings
    }
}
