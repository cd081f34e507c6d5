//! Local input: the actions a user can take and where they come from.

use std::io::BufRead;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, TryRecvError};
use std::time::Duration;

use anyhow::Result;
use yv_protocol::{Command, Role};

/// One local user action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// A replicated navigation or view command.
    Command(Command),
    /// Start continuous playback.
    Play,
    ToggleGrid,
    ToggleMacroblocks,
    ToggleHistogram,
    /// Switch synchronization role. Never replicated.
    SetRole(Role),
    /// Pointer click at a display position.
    Inspect { x: u32, y: u32 },
    /// The display needs repainting.
    Expose,
    /// The display was closed.
    Close,
}

/// Source of local actions.
pub trait InputSource {
    /// Wait for the next action.
    ///
    /// `None` blocks until something arrives; `Some(Duration::ZERO)` only
    /// checks. Returns `Ok(None)` when the wait elapsed without input.
    fn next_action(&mut self, timeout: Option<Duration>) -> Result<Option<Action>>;
}

/// Map one line of terminal input to an action.
///
/// The words follow the viewer's key bindings: arrow names for navigation,
/// `f1`..`f3` for roles and `f5`..`f8` for plane isolation.
pub fn parse_action(line: &str) -> Option<Action> {
    let mut words = line.split_whitespace();
    let word = words.next()?.to_ascii_lowercase();
    let action = match word.as_str() {
        "right" | "n" | "next" => Action::Command(Command::Advance),
        "left" | "p" | "prev" => Action::Command(Command::Retreat),
        "r" | "rewind" => Action::Command(Command::Rewind),
        "up" | "+" => Action::Command(Command::ZoomIn),
        "down" | "-" => Action::Command(Command::ZoomOut),
        "q" | "quit" => Action::Command(Command::Quit),
        "f5" | "y" => Action::Command(Command::LumaOnly),
        "f6" | "cb" => Action::Command(Command::CbOnly),
        "f7" | "cr" => Action::Command(Command::CrOnly),
        "f8" | "all" => Action::Command(Command::AllPlanes),
        "space" | "play" => Action::Play,
        "g" | "grid" => Action::ToggleGrid,
        "m" | "mb" => Action::ToggleMacroblocks,
        "h" | "hist" => Action::ToggleHistogram,
        "f1" => Action::SetRole(Role::Originator),
        "f2" => Action::SetRole(Role::Follower),
        "f3" => Action::SetRole(Role::Inactive),
        "role" => Action::SetRole(words.next()?.parse().ok()?),
        "click" => {
            let x = words.next()?.parse().ok()?;
            let y = words.next()?.parse().ok()?;
            Action::Inspect { x, y }
        }
        "expose" => Action::Expose,
        "close" => Action::Close,
        _ => return None,
    };
    Some(action)
}

/// Line-oriented input from stdin.
///
/// A reader thread turns lines into actions so the player can wait on them
/// with a timeout. End of input closes the viewer.
pub struct TerminalInput {
    rx: Receiver<Action>,
}

impl TerminalInput {
    pub fn spawn() -> Self {
        Self::from_reader(std::io::BufReader::new(std::io::stdin()))
    }

    pub fn from_reader<R: BufRead + Send + 'static>(reader: R) -> Self {
        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || {
            for line in reader.lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(e) => {
                        tracing::warn!(error = %e, "failed to read input");
                        break;
                    }
                };
                if line.trim().is_empty() {
                    continue;
                }
                match parse_action(&line) {
                    Some(action) => {
                        if tx.send(action).is_err() {
                            return;
                        }
                    }
                    None => tracing::warn!(input = %line.trim(), "unrecognized input"),
                }
            }
            let _ = tx.send(Action::Close);
        });
        Self { rx }
    }
}

impl InputSource for TerminalInput {
    fn next_action(&mut self, timeout: Option<Duration>) -> Result<Option<Action>> {
        let action = match timeout {
            None => self.rx.recv().unwrap_or(Action::Close),
            Some(t) if t.is_zero() => match self.rx.try_recv() {
                Ok(action) => action,
                Err(TryRecvError::Empty) => return Ok(None),
                Err(TryRecvError::Disconnected) => Action::Close,
            },
            Some(t) => match self.rx.recv_timeout(t) {
                Ok(action) => action,
                Err(RecvTimeoutError::Timeout) => return Ok(None),
                Err(RecvTimeoutError::Disconnected) => Action::Close,
            },
        };
        Ok(Some(action))
    }
}
