use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use prismbox::{AppConfig, DemoKind, ShadingProgram};

#[derive(Parser)]
#[command(name = "prismbox", about = "Cube-map prism rendering demo")]
struct Cli {
    /// Scene to run
    #[arg(long, value_enum, default_value_t = Demo::Prism)]
    demo: Demo,

    /// Prism shading variant
    #[arg(long, value_enum, default_value_t = Shading::Lit)]
    shading: Shading,

    /// Cube-map face edge length in pixels
    #[arg(long, default_value_t = prismbox::DEFAULT_FACE_SIZE, allow_negative_numbers = true)]
    face_size: i64,

    /// TrueType/OpenType font for the face labels
    #[arg(long)]
    font: Option<PathBuf>,

    /// Stop after this many frames
    #[arg(long)]
    frames: Option<u64>,

    /// Write the six cube-map faces as PNG into this directory and exit
    #[arg(long, value_name = "DIR")]
    export_faces: Option<PathBuf>,

    /// Initial window width
    #[arg(long, default_value_t = 800)]
    width: u32,

    /// Initial window height
    #[arg(long, default_value_t = 600)]
    height: u32,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Demo {
    Prism,
    Quad,
}

#[derive(Clone, Copy, ValueEnum)]
enum Shading {
    ReflectRefract,
    Lit,
}

impl Cli {
    fn config(&self) -> AppConfig {
        let mut config = AppConfig::new()
            .size(self.width, self.height)
            .face_size(self.face_size)
            .demo(match self.demo {
                Demo::Prism => DemoKind::Prism,
                Demo::Quad => DemoKind::Quad,
            })
            .prism_program(match self.shading {
                Shading::ReflectRefract => ShadingProgram::ReflectRefract,
                Shading::Lit => ShadingProgram::ReflectRefractLit,
            });
        if let Some(font) = &self.font {
            config = config.label_font(font);
        }
        if let Some(frames) = self.frames {
            config = config.max_frames(frames);
        }
        config
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    let config = cli.config();

    if let Some(dir) = &cli.export_faces {
        prismbox::export_faces(&config, dir)?;
        return Ok(());
    }

    prismbox::run(config)?;
    Ok(())
}
