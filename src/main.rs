use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use orbitlab::{AppConfig, CameraKind, TextureOptions, WrapMode};

#[derive(Parser)]
#[command(name = "orbitlab", about = "Textured cube with a drag-to-orbit camera")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Window width in pixels
    #[arg(long, default_value_t = 800)]
    width: u32,

    /// Window height in pixels
    #[arg(long, default_value_t = 600)]
    height: u32,

    /// Window title prefix
    #[arg(long, default_value = "Lab")]
    title: String,

    /// Frame rate cap (0 for uncapped)
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Image applied to every face
    #[arg(long, default_value = "wall.jpg")]
    texture: PathBuf,

    /// Texture addressing outside [0, 1]
    #[arg(long, value_enum, default_value_t = WrapArg::Repeat)]
    wrap: WrapArg,

    /// Keep the image rows in file order
    #[arg(long)]
    no_flip: bool,

    /// Camera strategy
    #[arg(long, value_enum, default_value_t = CameraArg::Orbit)]
    camera: CameraArg,
}

#[derive(Clone, Copy, ValueEnum)]
enum WrapArg {
    Repeat,
    Clamp,
}

impl From<WrapArg> for WrapMode {
    fn from(arg: WrapArg) -> Self {
        match arg {
            WrapArg::Repeat => WrapMode::Repeat,
            WrapArg::Clamp => WrapMode::Clamp,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum CameraArg {
    Orbit,
    Static,
}

impl From<CameraArg> for CameraKind {
    fn from(arg: CameraArg) -> Self {
        match arg {
            CameraArg::Orbit => CameraKind::Orbit,
            CameraArg::Static => CameraKind::Static,
        }
    }
}

impl Cli {
    fn into_config(self) -> AppConfig {
        AppConfig::new()
            .title(self.title)
            .size(self.width, self.height)
            .frame_rate(self.fps)
            .texture_path(self.texture)
            .texture_options(TextureOptions {
                wrap: self.wrap.into(),
                flip_vertical: !self.no_flip,
            })
            .camera(self.camera.into())
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = cli.into_config();
    tracing::info!(texture = %config.texture_path.display(), camera = ?config.camera, "orbitlab starting");

    let texture = config.texture_path.clone();
    orbitlab::run(config).with_context(|| format!("running scene with {}", texture.display()))?;

    Ok(())
}
