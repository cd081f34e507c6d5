//! Playback and view state machine.
//!
//! One synchronous loop drives everything: wait for a local action (or, as
//! follower, a remote command), apply it to the frame store and view state,
//! recompose the picture and present it. Local navigation and view commands
//! are mirrored to followers when this process is the originator; commands
//! received from the channel are applied without being sent on.

use std::io::Write;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use yv_media::macroblock::macroblock_index;
use yv_media::{
    ByteSource, DecodeStatus, DiffOutcome, DifferenceEngine, FormatDescriptor, FrameStore,
    Histogram, MacroblockDump, MediaError, Picture, PlaneSelection,
};
use yv_net::{CommandSync, Incoming};
use yv_protocol::{Command, Role};

use crate::input::{Action, InputSource};
use crate::settings::Settings;
use crate::sink::{DisplayRect, DisplaySink};
use crate::view::ViewState;

/// Where an action came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Local user input. Mirrored to followers when originator.
    Local,
    /// Received from the command channel. Never mirrored.
    Remote,
}

/// Whether the main loop keeps going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Timing knobs for the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerConfig {
    /// Time budget per frame during playback.
    pub frame_budget: Duration,
    /// How long a follower waits on local input before checking the channel.
    pub follower_poll: Duration,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            frame_budget: Duration::from_millis(40),
            follower_poll: Duration::from_millis(20),
        }
    }
}

impl From<&Settings> for PlayerConfig {
    fn from(settings: &Settings) -> Self {
        Self {
            frame_budget: settings.frame_budget(),
            follower_poll: settings.follower_poll(),
        }
    }
}

/// The primary stream and, in difference mode, the stream it is compared to.
pub struct Sources {
    pub primary: Box<dyn ByteSource>,
    pub secondary: Option<Box<dyn ByteSource>>,
}

struct Difference {
    source: Box<dyn ByteSource>,
    engine: DifferenceEngine,
}

enum Event {
    Local(Action),
    Remote(Incoming),
}

/// The viewer.
pub struct Player<D, I, W> {
    descriptor: FormatDescriptor,
    store: FrameStore,
    picture: Picture,
    primary: Box<dyn ByteSource>,
    difference: Option<Difference>,
    view: ViewState,
    sync: CommandSync,
    sink: D,
    input: I,
    diagnostics: W,
    config: PlayerConfig,
    caption: String,
}

impl<D, I, W> Player<D, I, W>
where
    D: DisplaySink,
    I: InputSource,
    W: Write,
{
    /// Allocate the frame buffers and wire up the collaborators.
    pub fn new(
        descriptor: FormatDescriptor,
        sources: Sources,
        sync: CommandSync,
        sink: D,
        input: I,
        diagnostics: W,
        config: PlayerConfig,
    ) -> Result<Self, MediaError> {
        let store = FrameStore::new(descriptor)?;
        let picture = Picture::for_descriptor(&descriptor)?;
        let difference = match sources.secondary {
            Some(source) => Some(Difference {
                source,
                engine: DifferenceEngine::new(&descriptor)?,
            }),
            None => None,
        };
        let mut view = ViewState::new(difference.is_some());
        view.role = sync.role();

        Ok(Self {
            descriptor,
            store,
            picture,
            primary: sources.primary,
            difference,
            view,
            sync,
            sink,
            input,
            diagnostics,
            config,
            caption: String::new(),
        })
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn picture(&self) -> &Picture {
        &self.picture
    }

    pub fn store(&self) -> &FrameStore {
        &self.store
    }

    pub fn sink(&self) -> &D {
        &self.sink
    }

    pub fn diagnostics(&self) -> &W {
        &self.diagnostics
    }

    pub fn sync(&self) -> &CommandSync {
        &self.sync
    }

    pub fn display_rect(&self) -> DisplayRect {
        self.view
            .display_rect(self.descriptor.width, self.descriptor.height)
    }

    /// Show the first frame, then process events until quit or close.
    ///
    /// The synchronization endpoint is switched to inactive on the way out.
    pub fn run(&mut self) -> Result<()> {
        let result = self.run_loop();
        self.shutdown();
        result
    }

    fn run_loop(&mut self) -> Result<()> {
        let rect = self.display_rect();
        self.sink.resize(rect)?;
        // Show the first frame. Not a user command, so never mirrored.
        self.advance()?;

        loop {
            self.view.role = self.sync.role();
            self.publish_caption()?;
            let flow = match self.wait_event()? {
                Event::Local(action) => self.apply(action)?,
                Event::Remote(incoming) => self.apply_remote(incoming)?,
            };
            if flow == Flow::Quit {
                tracing::info!(frame = self.view.frame, "viewer stopping");
                return Ok(());
            }
        }
    }

    fn shutdown(&mut self) {
        if let Err(e) = self.sync.switch_to(Role::Inactive) {
            tracing::warn!(error = %e, "failed to leave sync role");
        }
        self.view.role = self.sync.role();
    }

    /// Block until the next event. A follower checks the channel first and
    /// only waits on local input for a short while before checking again.
    fn wait_event(&mut self) -> Result<Event> {
        loop {
            if self.sync.role() != Role::Follower {
                if let Some(action) = self.input.next_action(None)? {
                    return Ok(Event::Local(action));
                }
                continue;
            }

            if let Some(incoming) = self.sync.poll(Duration::ZERO) {
                return Ok(Event::Remote(incoming));
            }
            if let Some(action) = self.input.next_action(Some(self.config.follower_poll))? {
                return Ok(Event::Local(action));
            }
            // The channel may have closed while we waited.
            self.view.role = self.sync.role();
            self.publish_caption()?;
        }
    }

    /// Check for any pending event without waiting.
    fn poll_event(&mut self) -> Result<Option<Event>> {
        if let Some(action) = self.input.next_action(Some(Duration::ZERO))? {
            return Ok(Some(Event::Local(action)));
        }
        Ok(self.sync.poll(Duration::ZERO).map(Event::Remote))
    }

    /// Apply one local action.
    pub fn apply(&mut self, action: Action) -> Result<Flow> {
        tracing::debug!(?action, "local action");
        match action {
            Action::Command(command) => return self.apply_command(command, Origin::Local),
            Action::Play => return self.play(),
            Action::ToggleGrid => {
                self.view.toggle_grid();
                self.refresh()?;
            }
            Action::ToggleMacroblocks => {
                self.view.toggle_macroblocks();
                self.refresh()?;
            }
            Action::ToggleHistogram => {
                self.view.toggle_histogram();
                self.refresh()?;
            }
            Action::SetRole(role) => self.set_role(role),
            Action::Inspect { x, y } => self.inspect(x, y)?,
            Action::Expose => {
                let rect = self.display_rect();
                self.sink.present(&self.picture, rect)?;
            }
            Action::Close => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    fn apply_remote(&mut self, incoming: Incoming) -> Result<Flow> {
        match incoming {
            Incoming::Command(command) => {
                tracing::debug!(%command, "remote command");
                self.apply_command(command, Origin::Remote)
            }
            Incoming::Unknown(byte) => {
                tracing::warn!(byte, "ignoring unrecognized command byte");
                Ok(Flow::Continue)
            }
        }
    }

    /// Apply a replicated command. Local commands that change state are
    /// mirrored to followers.
    pub fn apply_command(&mut self, command: Command, origin: Origin) -> Result<Flow> {
        let changed = match command {
            Command::Advance => self.advance()?,
            Command::Retreat => self.retreat()?,
            Command::Rewind => self.rewind()?,
            Command::ZoomIn => self.zoom(1)?,
            Command::ZoomOut => self.zoom(-1)?,
            Command::LumaOnly => self.isolate(PlaneSelection::LumaOnly)?,
            Command::CbOnly => self.isolate(PlaneSelection::CbOnly)?,
            Command::CrOnly => self.isolate(PlaneSelection::CrOnly)?,
            Command::AllPlanes => self.isolate(PlaneSelection::All)?,
            Command::Quit => true,
        };

        if changed && origin == Origin::Local {
            self.sync.emit(command);
        }

        Ok(if command == Command::Quit {
            Flow::Quit
        } else {
            Flow::Continue
        })
    }

    fn advance(&mut self) -> Result<bool> {
        if !self.load_next(true)? {
            tracing::debug!(frame = self.view.frame, "no next frame");
            self.restore_current()?;
            return Ok(false);
        }
        self.view.frame += 1;
        self.refresh()?;
        Ok(true)
    }

    fn retreat(&mut self) -> Result<bool> {
        if self.view.frame <= 1 {
            return Ok(false);
        }
        self.view.frame -= 1;
        self.seek_to_frame(self.view.frame)?;
        self.reload()?;
        self.refresh()?;
        Ok(true)
    }

    fn rewind(&mut self) -> Result<bool> {
        if self.view.frame <= 1 {
            return Ok(false);
        }
        self.view.frame = 1;
        self.seek_to_frame(1)?;
        self.reload()?;
        self.refresh()?;
        Ok(true)
    }

    fn zoom(&mut self, delta: i32) -> Result<bool> {
        self.view.zoom_by(delta);
        let rect = self.display_rect();
        tracing::debug!(zoom = self.view.zoom, size = %rect, "zoom changed");
        self.sink.resize(rect)?;
        self.refresh()?;
        Ok(true)
    }

    fn isolate(&mut self, planes: PlaneSelection) -> Result<bool> {
        self.view.planes = planes;
        self.refresh()?;
        Ok(true)
    }

    fn set_role(&mut self, role: Role) {
        match self.sync.switch_to(role) {
            Ok(()) => {}
            Err(e) => tracing::warn!(role = %role, error = %e, "role switch failed"),
        }
        self.view.role = self.sync.role();
    }

    fn inspect(&mut self, x: u32, y: u32) -> Result<()> {
        if !self.view.macroblocks || self.view.frame == 0 {
            return Ok(());
        }
        let Some(index) = macroblock_index(&self.descriptor, x, y, self.view.zoom) else {
            tracing::debug!(x, y, "click outside the frame");
            return Ok(());
        };
        if let Some(dump) = MacroblockDump::extract(&self.store, index) {
            writeln!(self.diagnostics, "{dump}").context("failed to write macroblock dump")?;
            self.diagnostics.flush()?;
        }
        Ok(())
    }

    /// Continuous playback until the stream runs out or any event arrives.
    fn play(&mut self) -> Result<Flow> {
        tracing::info!(frame = self.view.frame, "playback started");
        loop {
            let started = Instant::now();
            self.publish_caption()?;

            if !self.load_next(true)? {
                self.restore_current()?;
                tracing::info!(frame = self.view.frame, "playback reached end of stream");
                return Ok(Flow::Continue);
            }
            self.refresh()?;

            let elapsed = started.elapsed();
            if elapsed < self.config.frame_budget {
                thread::sleep(self.config.frame_budget - elapsed);
            }
            self.view.frame += 1;
            self.sync.emit(Command::Advance);

            match self.poll_event()? {
                None => {}
                Some(Event::Local(Action::Close)) => return Ok(Flow::Quit),
                Some(Event::Local(action)) => {
                    tracing::info!(frame = self.view.frame, ?action, "playback stopped");
                    return Ok(Flow::Continue);
                }
                Some(Event::Remote(Incoming::Unknown(byte))) => {
                    tracing::warn!(byte, "ignoring unrecognized command byte");
                }
                Some(Event::Remote(Incoming::Command(command))) => {
                    tracing::info!(frame = self.view.frame, %command, "playback stopped");
                    return self.apply_command(command, Origin::Remote);
                }
            }
        }
    }

    /// Decode the next frame, or the next difference frame. Returns false at
    /// end of stream.
    fn load_next(&mut self, report_metric: bool) -> Result<bool> {
        match &mut self.difference {
            None => {
                let status = self
                    .store
                    .decode(self.primary.as_mut())
                    .context("failed to decode frame")?;
                Ok(status == DecodeStatus::Frame)
            }
            Some(diff) => {
                let outcome = diff
                    .engine
                    .compute(&mut self.store, self.primary.as_mut(), diff.source.as_mut())
                    .context("failed to compute difference frame")?;
                match outcome {
                    DiffOutcome::Frame(psnr) => {
                        if report_metric {
                            writeln!(self.diagnostics, "PSNR: {psnr}")
                                .context("failed to write PSNR")?;
                            self.diagnostics.flush()?;
                        }
                        Ok(true)
                    }
                    DiffOutcome::EndOfStream => Ok(false),
                }
            }
        }
    }

    /// Re-decode the displayed frame after a read moved past it.
    fn reload(&mut self) -> Result<()> {
        if !self.load_next(true)? {
            tracing::warn!(frame = self.view.frame, "displayed frame could not be re-read");
        }
        Ok(())
    }

    /// A failed read leaves the buffers unspecified; put the displayed frame
    /// back so later overlay changes compose from it.
    fn restore_current(&mut self) -> Result<()> {
        if self.view.frame == 0 {
            return Ok(());
        }
        self.seek_to_frame(self.view.frame)?;
        if !self.load_next(false)? {
            tracing::warn!(frame = self.view.frame, "displayed frame could not be re-read");
        }
        Ok(())
    }

    /// Position both sources at the start of 1-based frame `frame`.
    fn seek_to_frame(&mut self, frame: u64) -> Result<()> {
        let offset = self.descriptor.frame_offset(frame.saturating_sub(1));
        self.primary
            .seek_to(offset)
            .context("failed to seek primary stream")?;
        if let Some(diff) = &mut self.difference {
            diff.source
                .seek_to(offset)
                .context("failed to seek difference stream")?;
        }
        Ok(())
    }

    /// Recompose the picture from the current frame and present it.
    fn refresh(&mut self) -> Result<()> {
        self.picture
            .compose(&self.store, self.view.overlays())
            .context("failed to compose picture")?;

        if self.view.histogram {
            let histogram = Histogram::of(&self.store);
            write!(self.diagnostics, "{histogram}").context("failed to write histogram")?;
            self.diagnostics.flush()?;
        }

        let rect = self.display_rect();
        self.sink.present(&self.picture, rect)?;
        Ok(())
    }

    fn publish_caption(&mut self) -> Result<()> {
        let caption = self.view.caption(self.display_rect());
        if caption != self.caption {
            self.sink.set_caption(&caption)?;
            self.caption = caption;
        }
        Ok(())
    }
}
