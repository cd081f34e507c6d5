//! Display sink boundary.
//!
//! The viewer never draws pixels itself beyond its overlays; it hands a
//! composed [`Picture`] and a target size to a sink.

use std::fmt;

use anyhow::Result;
use yv_media::Picture;

/// Target size of the displayed picture, in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayRect {
    pub width: u32,
    pub height: u32,
}

impl fmt::Display for DisplayRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Where composed pictures go.
pub trait DisplaySink {
    /// Show `picture` scaled to `rect`.
    fn present(&mut self, picture: &Picture, rect: DisplayRect) -> Result<()>;

    /// The target size changed.
    fn resize(&mut self, rect: DisplayRect) -> Result<()>;

    fn set_caption(&mut self, caption: &str) -> Result<()>;
}

/// Headless sink that only logs what would be shown.
#[derive(Debug, Default)]
pub struct LogSink {
    presented: u64,
}

impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of pictures presented so far.
    pub fn presented(&self) -> u64 {
        self.presented
    }
}

impl DisplaySink for LogSink {
    fn present(&mut self, picture: &Picture, rect: DisplayRect) -> Result<()> {
        self.presented += 1;
        tracing::debug!(
            size = %rect,
            bytes = picture.primary().len(),
            count = self.presented,
            "present"
        );
        Ok(())
    }

    fn resize(&mut self, rect: DisplayRect) -> Result<()> {
        tracing::info!(size = %rect, "display resized");
        Ok(())
    }

    fn set_caption(&mut self, caption: &str) -> Result<()> {
        tracing::info!(caption, "caption");
        Ok(())
    }
}
