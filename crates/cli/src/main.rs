use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;

use cinematic_core::media::infrastructure::directory_file_system::DirectoryFileSystem;
use cinematic_core::media::infrastructure::ffmpeg_engine::FfmpegEngine;
use cinematic_core::media::subsystem;
use cinematic_core::playback::cinematic_player::CinematicPlayer;
use cinematic_core::rendering::infrastructure::image_factory::{
    create_image_factory, ImageBackend,
};
use cinematic_core::shared::config::{AssetMode, PlayerConfig};
use cinematic_core::shared::frame_payload::FrameStatus;

/// Plays a cinematic through the playback core against a simulated clock
/// and reports what a renderer would receive.
#[derive(Parser)]
#[command(name = "cinematic-probe")]
struct Cli {
    /// Video file, relative to --root unless absolute.
    input: PathBuf,

    /// Directory that relative inputs are resolved against.
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// JSON player configuration; flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Let the engine open the file instead of loading it into memory.
    #[arg(long)]
    file_backed: bool,

    /// Open the cinematic as looping.
    #[arg(long = "loop")]
    looping: bool,

    /// Stop after this many frames.
    #[arg(long)]
    max_frames: Option<u32>,

    /// Simulated clock step per frame request, in milliseconds.
    #[arg(long, default_value = "33")]
    step_ms: i32,

    /// Staging buffer size for memory-backed reads, in bytes.
    #[arg(long)]
    io_buffer_size: Option<usize>,

    /// Ask the decoder for speed over conformance.
    #[arg(long)]
    fast_decode: bool,

    /// Keep plane images in host memory even when a GPU is available.
    #[arg(long)]
    cpu: bool,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;
    let config = build_config(&cli)?;

    subsystem::init_subsystem()?;
    let backend = if cli.cpu {
        ImageBackend::Cpu
    } else {
        ImageBackend::Auto
    };
    let images = create_image_factory(backend);

    let mut player = CinematicPlayer::new(
        Box::new(FfmpegEngine::new()),
        Box::new(DirectoryFileSystem::new(&cli.root)),
        images.as_ref(),
        config,
    );
    player.open(&cli.input, cli.looping)?;

    println!("length: {} ms", player.animation_length());
    println!("frame rate: {:.3} fps", player.frame_rate());

    let summary = play(&mut player, cli.step_ms, cli.max_frames);
    eprintln!();
    player.close();
    subsystem::shutdown_subsystem();

    println!("frames: {}", summary.frames);
    if let Some((width, height)) = summary.size {
        println!("size: {width}x{height}");
    }
    println!("final status: {:?}", summary.status);
    if summary.status == FrameStatus::Error {
        return Err("playback stopped on a decode error".into());
    }
    Ok(())
}

struct PlaySummary {
    frames: u32,
    size: Option<(u32, u32)>,
    status: FrameStatus,
}

fn play(player: &mut CinematicPlayer, step_ms: i32, max_frames: Option<u32>) -> PlaySummary {
    player.reset_time(0);
    let mut clock = player.start_time();
    let mut summary = PlaySummary {
        frames: 0,
        size: None,
        status: FrameStatus::Idle,
    };

    loop {
        if max_frames.is_some_and(|max| summary.frames >= max) {
            break;
        }
        let payload = player.image_for_time(clock);
        summary.status = payload.status;
        if payload.status != FrameStatus::Ready {
            break;
        }
        summary.frames += 1;
        summary.size = Some((payload.width, payload.height));
        eprint!("\rFrame {} at {clock} ms", summary.frames);
        clock = clock.saturating_add(step_ms);
    }
    summary
}

fn build_config(cli: &Cli) -> Result<PlayerConfig, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => PlayerConfig::from_json_file(path)?,
        None => PlayerConfig::default(),
    };
    if cli.file_backed {
        config.asset_mode = AssetMode::File;
    }
    if let Some(size) = cli.io_buffer_size {
        config.io_buffer_size = size;
    }
    if cli.fast_decode {
        config.fast_decode = true;
    }
    log::debug!("Player config: {config:?}");
    Ok(config)
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let resolved = resolve(&cli.root, &cli.input);
    if !resolved.exists() {
        return Err(format!("Input file not found: {}", resolved.display()).into());
    }
    if cli.step_ms < 0 {
        return Err(format!("Step must not be negative, got {}", cli.step_ms).into());
    }
    if cli.max_frames == Some(0) {
        return Err("--max-frames must be at least 1".into());
    }
    Ok(())
}

fn resolve(root: &Path, input: &Path) -> PathBuf {
    if input.is_absolute() {
        input.to_path_buf()
    } else {
        root.join(input)
    }
}
