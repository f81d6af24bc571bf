#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app;
mod context;
mod helpers;
mod modules;
mod theme;

use std::path::PathBuf;

use anyhow::{bail, Context as _};
use clap::Parser;
use mimalloc::MiMalloc;
use tracing::info;

use vidsnap_capture::FfprobeCli;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Browse a folder of videos and save still frames as PNG.
#[derive(Parser, Debug)]
#[command(name = "vidsnap", disable_version_flag = true)]
struct Cli {
    /// Print version information for vidsnap, FFmpeg and ffprobe, then exit.
    #[arg(short = 'v', long = "version")]
    version: bool,

    /// Video to open on startup. Its folder becomes the library.
    #[arg(value_name = "VIDEO")]
    video: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.version {
        println!("vidsnap {}", env!("CARGO_PKG_VERSION"));
        println!("FFmpeg  {}", vidsnap_media::ffmpeg_version());
        match FfprobeCli::default().version() {
            Some(v) => println!("ffprobe {v}"),
            None    => println!("ffprobe not found on PATH (rotation and colour metadata disabled)"),
        }
        return Ok(());
    }

    if let Some(video) = &cli.video {
        if !video.is_file() {
            bail!("no such video: {}", video.display());
        }
    }

    helpers::log::init();
    vidsnap_media::init().context("FFmpeg init failed")?;
    info!("[app] vidsnap {} starting", env!("CARGO_PKG_VERSION"));

    let native_options = eframe::NativeOptions {
        centered: true,
        viewport: egui::ViewportBuilder::default()
            .with_title(vidsnap_core::controller::APP_TITLE)
            .with_inner_size([1180.0, 760.0])
            .with_min_inner_size([720.0, 480.0])
            .with_resizable(true),
        ..Default::default()
    };

    let initial = cli.video;
    eframe::run_native(
        "VidSnap",
        native_options,
        Box::new(move |cc| Ok(Box::new(app::VidSnapApp::new(cc, initial)))),
    )
    .map_err(|e| anyhow::anyhow!("window: {e}"))
}
