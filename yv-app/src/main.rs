use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use yv_app::{LogSink, Player, PlayerConfig, Settings, Sources, TerminalInput};
use yv_media::source::open_file;
use yv_media::{ByteSource, FormatDescriptor, PixelFormat};
use yv_net::{socket_dir, CommandSync, UnixTransport};

#[derive(Parser)]
#[command(name = "yv", about = "Raw YUV viewer with synchronized playback")]
struct Args {
    /// Raw YUV file to show
    file: PathBuf,

    /// Frame width in pixels
    width: u32,

    /// Frame height in pixels
    height: u32,

    /// Pixel format: YV12, IYUV, YUY2, UYVY or YVYU
    format: String,

    /// Second file to compare against (difference mode)
    diff_file: Option<PathBuf>,

    /// Read settings from this directory instead of the user config dir
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let settings = match &args.config {
        Some(dir) => Settings::load_from_dir(dir.clone()),
        None => Settings::load(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&settings.log_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("yv starting");

    let format: PixelFormat = args
        .format
        .parse()
        .with_context(|| format!("unsupported format {:?}", args.format))?;
    let descriptor = FormatDescriptor::new(format, args.width, args.height)
        .context("invalid frame geometry")?;

    let mut primary = open_file(&args.file)
        .with_context(|| format!("failed to open {}", args.file.display()))?;
    let secondary = args
        .diff_file
        .as_ref()
        .map(|path| {
            open_file(path).with_context(|| format!("failed to open {}", path.display()))
        })
        .transpose()?;

    let stream_len = primary.total_len().ok();
    for warning in descriptor.check_input(stream_len) {
        tracing::warn!(%warning, "input check");
    }

    let transport = UnixTransport::new(socket_dir(settings.channel_dir.as_deref()));
    let sync = CommandSync::new(Box::new(transport), settings.channel_key.clone());

    let sources = Sources {
        primary: Box::new(primary),
        secondary: secondary.map(|file| Box::new(file) as Box<dyn ByteSource>),
    };

    let mut player = Player::new(
        descriptor,
        sources,
        sync,
        LogSink::new(),
        TerminalInput::spawn(),
        std::io::stdout(),
        PlayerConfig::from(&settings),
    )
    .context("failed to allocate frame buffers")?;

    player.run()
}
