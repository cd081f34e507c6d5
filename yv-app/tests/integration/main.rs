//! Viewer scenarios driven through scripted input and in-memory channels.

mod helpers;

mod analysis;
mod navigation;
mod overlays;
mod playback;
mod sync;
