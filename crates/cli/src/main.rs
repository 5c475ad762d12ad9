#![deny(unsafe_code)]
//! CLI binary for the noisy-gradient generator.
//!
//! Subcommands:
//! - `render` builds a composition and exports it as SVG or PNG
//! - `show` prints the resolved configuration as JSON
//! - `palettes` lists the curated palettes

mod error;

use clap::{Args, Parser, Subcommand, ValueEnum};
use error::CliError;
use noisy_gradient_core::generate::DEFAULT_BLOB_COUNT;
use noisy_gradient_core::{Configuration, Palette};
use noisy_gradient_export::{DownloadRequest, Session};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::process;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "noisy-gradient", about = "Blurred gradient blobs under a noise overlay")]
struct Cli {
    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a composition and write it to disk.
    Render {
        #[command(flatten)]
        scene: SceneArgs,

        /// Output format.
        #[arg(short, long, value_enum, default_value_t = Format::Svg)]
        format: Format,

        /// Raster scale factor (PNG only).
        #[arg(long, default_value_t = 1.0)]
        scale: f64,

        /// Directory the exported file is written into.
        #[arg(short, long, default_value = ".")]
        out: PathBuf,
    },
    /// Print the resolved configuration as JSON.
    Show {
        #[command(flatten)]
        scene: SceneArgs,
    },
    /// List the curated palettes.
    Palettes,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Svg,
    Png,
}

#[derive(Args)]
struct SceneArgs {
    /// Full configuration file (JSON) to start from.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Keep the blobs from --config instead of generating new ones.
    #[arg(long)]
    keep_blobs: bool,

    /// Number of blobs to generate.
    #[arg(long, default_value_t = DEFAULT_BLOB_COUNT)]
    blobs: usize,

    /// PRNG seed. Defaults to the current time.
    #[arg(long)]
    seed: Option<u64>,

    /// Canvas width in pixels.
    #[arg(short = 'W', long)]
    width: Option<u32>,

    /// Canvas height in pixels.
    #[arg(short = 'H', long)]
    height: Option<u32>,

    /// Background color.
    #[arg(long)]
    background: Option<String>,

    /// Blur spread applied to the blobs.
    #[arg(long)]
    blur: Option<f64>,

    /// Noise base frequency.
    #[arg(long)]
    base_frequency: Option<f64>,

    /// Noise octave count.
    #[arg(long)]
    octaves: Option<u32>,

    /// Noise overlay opacity.
    #[arg(long)]
    noise_opacity: Option<f64>,

    /// Noise type (fractalNoise, turbulence).
    #[arg(long)]
    noise_type: Option<String>,

    /// Blend mode of the noise overlay (overlay, multiply, screen, soft-light).
    #[arg(long)]
    blend_mode: Option<String>,

    /// Extra parameters as a JSON object, coerced like control-panel input.
    #[arg(long, default_value = "{}")]
    set: String,
}

impl SceneArgs {
    /// Collects the individual flags into one loosely-typed patch object.
    fn flag_params(&self) -> Value {
        let mut params = Map::new();
        let mut noise = Map::new();
        put(&mut params, "width", self.width.map(Value::from));
        put(&mut params, "height", self.height.map(Value::from));
        put(&mut params, "backgroundColor", self.background.clone().map(Value::from));
        put(&mut params, "blur", self.blur.map(Value::from));
        put(&mut noise, "baseFrequency", self.base_frequency.map(Value::from));
        put(&mut noise, "numOctaves", self.octaves.map(Value::from));
        put(&mut noise, "opacity", self.noise_opacity.map(Value::from));
        put(&mut noise, "type", self.noise_type.clone().map(Value::from));
        put(&mut noise, "blendMode", self.blend_mode.clone().map(Value::from));
        if !noise.is_empty() {
            params.insert("noise".into(), Value::Object(noise));
        }
        Value::Object(params)
    }

    fn set_params(&self) -> Result<Value, CliError> {
        let value: Value = serde_json::from_str(&self.set)
            .map_err(|e| CliError::Input(format!("invalid --set JSON: {e}")))?;
        if !value.is_object() {
            return Err(CliError::Input("--set must be a JSON object".into()));
        }
        Ok(value)
    }
}

fn put(map: &mut Map<String, Value>, key: &str, value: Option<Value>) {
    if let Some(value) = value {
        map.insert(key.to_string(), value);
    }
}

fn load_config(path: &Path) -> Result<Configuration, CliError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| CliError::Io(format!("cannot read {}: {e}", path.display())))?;
    let config: Configuration = serde_json::from_str(&text)
        .map_err(|e| CliError::Input(format!("invalid configuration {}: {e}", path.display())))?;
    config.validate()?;
    Ok(config)
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default()
}

/// Builds a session from the scene arguments and renders it.
fn build_session(args: &SceneArgs) -> Result<Session, CliError> {
    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => Configuration::default(),
    };
    let set = args.set_params()?;
    let seed = args.seed.unwrap_or_else(clock_seed);
    info!(seed, "seeding composition");

    let mut session = Session::with_config(config, seed, |message: &str| eprintln!("{message}"));
    session.set_blob_count(args.blobs);
    if !(args.keep_blobs && args.config.is_some()) {
        session.regenerate();
    }
    session.update_from_params(&args.flag_params());
    session.update_from_params(&set);
    session.render();
    Ok(session)
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Palettes => {
            let palettes: Vec<_> = Palette::all().iter().map(Palette::colors).collect();
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&palettes)?);
            } else {
                println!("Palettes:");
                for (i, colors) in palettes.iter().enumerate() {
                    println!("  {i}: {}", colors.join(" "));
                }
            }
        }
        Command::Show { scene } => {
            let session = build_session(&scene)?;
            println!("{}", serde_json::to_string_pretty(session.config())?);
        }
        Command::Render {
            scene,
            format,
            scale,
            out,
        } => {
            let session = build_session(&scene)?;
            let request = match format {
                Format::Svg => DownloadRequest::vector(),
                Format::Png => DownloadRequest::raster(scale),
            };
            let file = futures::executor::block_on(session.try_download(request))?
                .ok_or_else(|| CliError::Export("no scene to export".into()))?;
            std::fs::create_dir_all(&out)
                .map_err(|e| CliError::Io(format!("cannot create {}: {e}", out.display())))?;
            let path = file.save_in(&out)?;

            if cli.json {
                let info = serde_json::json!({
                    "output": path.display().to_string(),
                    "format": file.format.extension(),
                    "width": file.width,
                    "height": file.height,
                    "bytes": file.bytes.len(),
                    "blobs": session.config().blobs.len(),
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                eprintln!(
                    "rendered {}x{} {} ({} blobs) -> {}",
                    file.width,
                    file.height,
                    file.format.extension(),
                    session.config().blobs.len(),
                    path.display()
                );
            }
        }
    }

    Ok(())
}

fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    initialise_tracing();
    let cli = Cli::parse();
    let json_mode = cli.json;
    if let Err(e) = run(cli) {
        if json_mode {
            let j = serde_json::json!({"error": e.to_string(), "exit_code": e.exit_code()});
            eprintln!("{}", serde_json::to_string_pretty(&j).unwrap_or_default());
        } else {
            eprintln!("error: {e}");
        }
        process::exit(e.exit_code());
    }
}
