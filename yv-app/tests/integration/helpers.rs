//! Recording sink, scripted input and player builders shared by the scenarios.

use std::collections::VecDeque;
use std::io::Cursor;
use std::time::Duration;

use anyhow::Result;
use yv_app::{Action, DisplayRect, DisplaySink, InputSource, Player, PlayerConfig, Sources};
use yv_media::testing::synthetic_stream;
use yv_media::{ByteSource, FormatDescriptor, Picture, PixelFormat};
use yv_net::{CommandSync, FollowerEnd, MemoryHub};

pub use yv_media::testing::init_test_tracing;

pub const KEY: &str = "yv";

pub type TestPlayer = Player<RecordingSink, ScriptedInput, Vec<u8>>;

/// Sink that keeps everything it was given.
#[derive(Default)]
pub struct RecordingSink {
    pub presented: Vec<(Picture, DisplayRect)>,
    pub resizes: Vec<DisplayRect>,
    pub captions: Vec<String>,
}

impl DisplaySink for RecordingSink {
    fn present(&mut self, picture: &Picture, rect: DisplayRect) -> Result<()> {
        self.presented.push((picture.clone(), rect));
        Ok(())
    }

    fn resize(&mut self, rect: DisplayRect) -> Result<()> {
        self.resizes.push(rect);
        Ok(())
    }

    fn set_caption(&mut self, caption: &str) -> Result<()> {
        self.captions.push(caption.to_string());
        Ok(())
    }
}

/// Input that replays a fixed script.
///
/// A `None` entry means "nothing pending" for one poll. Once the script is
/// used up, polls see nothing and any real wait sees the display close.
#[derive(Default)]
pub struct ScriptedInput {
    script: VecDeque<Option<Action>>,
}

impl ScriptedInput {
    pub fn new(script: impl IntoIterator<Item = Option<Action>>) -> Self {
        Self {
            script: script.into_iter().collect(),
        }
    }

    pub fn actions(actions: impl IntoIterator<Item = Action>) -> Self {
        Self::new(actions.into_iter().map(Some))
    }
}

impl InputSource for ScriptedInput {
    fn next_action(&mut self, timeout: Option<Duration>) -> Result<Option<Action>> {
        match self.script.pop_front() {
            Some(entry) => Ok(entry),
            None if timeout == Some(Duration::ZERO) => Ok(None),
            None => Ok(Some(Action::Close)),
        }
    }
}

pub fn descriptor(format: PixelFormat) -> FormatDescriptor {
    FormatDescriptor::new(format, 16, 16).unwrap()
}

pub fn fast_config() -> PlayerConfig {
    PlayerConfig {
        frame_budget: Duration::ZERO,
        follower_poll: Duration::from_millis(1),
    }
}

pub fn sync(hub: &MemoryHub) -> CommandSync {
    CommandSync::new(Box::new(hub.clone()), KEY)
}

/// Player over `frames` synthetic frames, frame `n` (1-based) having luma `n - 1`.
pub fn player_with(
    format: PixelFormat,
    frames: u8,
    secondary: Option<Vec<u8>>,
    sync: CommandSync,
    input: ScriptedInput,
) -> TestPlayer {
    let d = descriptor(format);
    let sources = Sources {
        primary: Box::new(Cursor::new(synthetic_stream(&d, frames))),
        secondary: secondary.map(|bytes| Box::new(Cursor::new(bytes)) as Box<dyn ByteSource>),
    };
    Player::new(
        d,
        sources,
        sync,
        RecordingSink::default(),
        input,
        Vec::new(),
        fast_config(),
    )
    .unwrap()
}

pub fn player(frames: u8, hub: &MemoryHub, input: ScriptedInput) -> TestPlayer {
    player_with(PixelFormat::Iyuv, frames, None, sync(hub), input)
}

pub fn diagnostics(player: &TestPlayer) -> String {
    String::from_utf8(player.diagnostics().clone()).unwrap()
}

/// Drain every byte a follower end can see right now.
pub fn drain(rx: &mut dyn FollowerEnd) -> Vec<u8> {
    let mut out = Vec::new();
    while let Ok(Some(b)) = rx.try_recv() {
        out.push(b);
    }
    out
}
