//! Navigation and view commands replicated between viewer processes.
//!
//! Every command travels as a single byte drawn from a fixed ten-symbol
//! alphabet (`a`..=`j`).

use thiserror::Error;

/// A replicated navigation or view command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Step to the next frame.
    Advance,
    /// Step to the previous frame.
    Retreat,
    /// Jump back to the first frame.
    Rewind,
    ZoomIn,
    ZoomOut,
    Quit,
    /// Show the luma plane only.
    LumaOnly,
    /// Show the Cb plane only.
    CbOnly,
    /// Show the Cr plane only.
    CrOnly,
    /// Show all planes again.
    AllPlanes,
}

/// Errors when decoding protocol values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("unrecognized command byte 0x{0:02x}")]
    UnknownByte(u8),
    #[error("empty command message")]
    Empty,
    #[error("unknown role '{0}'")]
    UnknownRole(String),
}

impl Command {
    /// Every command, in wire order.
    pub const ALL: [Command; 10] = [
        Command::Advance,
        Command::Retreat,
        Command::Rewind,
        Command::ZoomIn,
        Command::ZoomOut,
        Command::Quit,
        Command::LumaOnly,
        Command::CbOnly,
        Command::CrOnly,
        Command::AllPlanes,
    ];

    /// The wire byte for this command.
    pub fn to_byte(self) -> u8 {
        match self {
            Command::Advance => b'a',
            Command::Retreat => b'b',
            Command::Rewind => b'c',
            Command::ZoomIn => b'd',
            Command::ZoomOut => b'e',
            Command::Quit => b'f',
            Command::LumaOnly => b'g',
            Command::CbOnly => b'h',
            Command::CrOnly => b'i',
            Command::AllPlanes => b'j',
        }
    }

    /// Map a wire byte back to a command.
    pub fn from_byte(byte: u8) -> Result<Self, CommandError> {
        match byte {
            b'a' => Ok(Command::Advance),
            b'b' => Ok(Command::Retreat),
            b'c' => Ok(Command::Rewind),
            b'd' => Ok(Command::ZoomIn),
            b'e' => Ok(Command::ZoomOut),
            b'f' => Ok(Command::Quit),
            b'g' => Ok(Command::LumaOnly),
            b'h' => Ok(Command::CbOnly),
            b'i' => Ok(Command::CrOnly),
            b'j' => Ok(Command::AllPlanes),
            other => Err(CommandError::UnknownByte(other)),
        }
    }

    /// Short name for logging.
    pub fn name(self) -> &'static str {
        match self {
            Command::Advance => "advance",
            Command::Retreat => "retreat",
            Command::Rewind => "rewind",
            Command::ZoomIn => "zoom-in",
            Command::ZoomOut => "zoom-out",
            Command::Quit => "quit",
            Command::LumaOnly => "luma-only",
            Command::CbOnly => "cb-only",
            Command::CrOnly => "cr-only",
            Command::AllPlanes => "all-planes",
        }
    }
}

impl TryFrom<u8> for Command {
    type Error = CommandError;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        Self::from_byte(byte)
    }
}

impl From<Command> for u8 {
    fn from(cmd: Command) -> u8 {
        cmd.to_byte()
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Serialize a `Command` into its one-byte message.
pub fn encode_command(cmd: Command) -> [u8; 1] {
    [cmd.to_byte()]
}

/// Deserialize a `Command` from a message. Only the first byte is significant.
pub fn decode_command(data: &[u8]) -> Result<Command, CommandError> {
    let first = data.first().ok_or(CommandError::Empty)?;
    Command::from_byte(*first)
}
