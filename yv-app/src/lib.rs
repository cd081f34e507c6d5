//! Viewer state machine, display and input boundaries, and settings for `yv`.

pub mod input;
pub mod player;
pub mod settings;
pub mod sink;
pub mod view;

pub use input::{parse_action, Action, InputSource, TerminalInput};
pub use player::{Flow, Origin, Player, PlayerConfig, Sources};
pub use settings::Settings;
pub use sink::{DisplayRect, DisplaySink, LogSink};
pub use view::ViewState;
