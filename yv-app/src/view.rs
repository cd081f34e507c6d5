//! View state: frame position, zoom, and the overlay and mode switches.

use yv_media::{Overlays, PlaneSelection};
use yv_protocol::Role;

use crate::sink::DisplayRect;

/// Mutable view record owned by the player.
///
/// Plane isolation is a single [`PlaneSelection`], so at most one of
/// luma-only, Cb-only and Cr-only can be active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    /// 1-based index of the displayed frame; 0 before the first decode.
    pub frame: u64,
    /// Positive magnifies by `zoom`; zero or negative shrinks by `|zoom| + 2`.
    pub zoom: i32,
    pub grid: bool,
    pub macroblocks: bool,
    pub difference: bool,
    pub histogram: bool,
    pub planes: PlaneSelection,
    pub role: Role,
}

impl ViewState {
    pub fn new(difference: bool) -> Self {
        Self {
            frame: 0,
            zoom: 1,
            grid: false,
            macroblocks: false,
            difference,
            histogram: false,
            planes: PlaneSelection::All,
            role: Role::Inactive,
        }
    }

    /// Whether block-based overlays are meaningful at the current zoom.
    pub fn magnified(&self) -> bool {
        self.zoom >= 1
    }

    pub fn zoom_by(&mut self, delta: i32) {
        self.zoom = self.zoom.saturating_add(delta);
        if !self.magnified() {
            self.grid = false;
            self.macroblocks = false;
        }
    }

    pub fn toggle_grid(&mut self) {
        self.grid = !self.grid && self.magnified();
    }

    pub fn toggle_macroblocks(&mut self) {
        self.macroblocks = !self.macroblocks && self.magnified();
    }

    pub fn toggle_histogram(&mut self) {
        self.histogram = !self.histogram;
    }

    pub fn overlays(&self) -> Overlays {
        Overlays {
            grid: self.grid,
            planes: self.planes,
        }
    }

    /// Displayed size of a `width` x `height` frame at the current zoom.
    pub fn display_rect(&self, width: u32, height: u32) -> DisplayRect {
        if self.zoom > 0 {
            let z = self.zoom.unsigned_abs();
            DisplayRect {
                width: width.saturating_mul(z),
                height: height.saturating_mul(z),
            }
        } else {
            let divisor = self.zoom.unsigned_abs().saturating_add(2);
            DisplayRect {
                width: width / divisor,
                height: height / divisor,
            }
        }
    }

    /// Window caption: role tag, active mode letters, frame and size.
    pub fn caption(&self, rect: DisplayRect) -> String {
        let mut caption = String::from(self.role.caption_tag());
        for (on, letter) in [
            (self.grid, "G"),
            (self.macroblocks, "M"),
            (self.difference, "D"),
            (self.histogram, "H"),
            (self.planes == PlaneSelection::LumaOnly, "Y"),
            (self.planes == PlaneSelection::CbOnly, "Cb"),
            (self.planes == PlaneSelection::CrOnly, "Cr"),
        ] {
            if on {
                caption.push_str(letter);
            }
        }
        caption.push_str(&format!(" frame {}, size {}", self.frame, rect));
        caption
    }
}
