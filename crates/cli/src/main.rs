#![deny(unsafe_code)]
//! CLI binary for the driftlines wave background.
//!
//! Subcommands:
//! - `render`: run the animation loop headlessly for N frames, write PNG
//! - `config`: print the default configuration and its schema

mod error;

use clap::{Parser, Subcommand, ValueEnum};
use driftlines_core::{AnimationLoop, DVec2, FrameOutcome, ManualScheduler, WaveConfig};
use driftlines_raster::PixelSurface;
use error::CliError;
use std::f64::consts::TAU;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

/// Host frame period used to synthesize timestamps (60 Hz).
const HOST_FRAME_MS: f64 = 1000.0 / 60.0;

#[derive(Parser)]
#[command(name = "driftlines", about = "Flowing-lines ambient background renderer")]
struct Cli {
    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the animation for N frames and write a PNG snapshot.
    Render {
        /// Surface width in pixels.
        #[arg(short = 'W', long, default_value_t = 640)]
        width: usize,

        /// Surface height in pixels.
        #[arg(short = 'H', long, default_value_t = 360)]
        height: usize,

        /// Number of host frames to simulate.
        #[arg(short, long, default_value_t = 240)]
        frames: usize,

        /// Noise seed. Fractions in (0, 1) are scaled to 16 bits.
        #[arg(long, default_value_t = 0.42)]
        seed: f64,

        /// Synthetic pointer path fed to the simulation.
        #[arg(short, long, value_enum, default_value_t = PointerPath::Sweep)]
        pointer: PointerPath,

        /// Wave parameters as a JSON string.
        #[arg(long, default_value = "{}")]
        params: String,

        /// Output file path.
        #[arg(short, long, default_value = "output.png")]
        output: PathBuf,
    },
    /// Print the default configuration and parameter schema.
    Config,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum PointerPath {
    /// No pointer input; only the ambient motion.
    None,
    /// Left-to-right pass across the middle with a gentle vertical wobble.
    Sweep,
    /// One circle around the surface center.
    Orbit,
}

impl PointerPath {
    /// Pointer position at progress `t` in `[0, 1]` on a `width` x `height`
    /// surface, or `None` when the path feeds no input.
    fn position(self, t: f64, width: f64, height: f64) -> Option<DVec2> {
        match self {
            PointerPath::None => None,
            PointerPath::Sweep => Some(DVec2::new(
                width * t,
                height * (0.5 + 0.15 * (t * TAU * 2.0).sin()),
            )),
            PointerPath::Orbit => {
                let radius = width.min(height) * 0.3;
                let angle = t * TAU;
                Some(DVec2::new(
                    width * 0.5 + radius * angle.cos(),
                    height * 0.5 + radius * angle.sin(),
                ))
            }
        }
    }
}

fn render(
    width: usize,
    height: usize,
    frames: usize,
    seed: f64,
    pointer: PointerPath,
    config: WaveConfig,
) -> Result<(PixelSurface, usize), CliError> {
    let surface = PixelSurface::new(width, height, config.background_color)?;
    let mut anim = AnimationLoop::new(Some(surface), ManualScheduler::new(), config, seed);
    anim.start();

    let (w, h) = (width as f64, height as f64);
    let mut rendered = 0;
    for i in 0..frames {
        let t = if frames > 1 {
            i as f64 / (frames - 1) as f64
        } else {
            0.0
        };
        if let Some(p) = pointer.position(t, w, h) {
            anim.on_pointer(p, DVec2::ZERO);
        }
        if anim.scheduler_mut().fire().is_none() {
            break;
        }
        if anim.on_frame(i as f64 * HOST_FRAME_MS) == FrameOutcome::Rendered {
            rendered += 1;
        }
    }
    anim.stop();
    tracing::debug!(frames, rendered, "headless run finished");

    let surface = anim
        .into_surface()
        .ok_or_else(|| CliError::Input("surface rejected by animation loop".into()))?;
    Ok((surface, rendered))
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Config => {
            let info = serde_json::json!({
                "defaults": WaveConfig::default().to_json(),
                "schema": WaveConfig::schema(),
            });
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("Defaults:");
                println!("{}", serde_json::to_string_pretty(&info["defaults"])?);
                println!("Schema:");
                println!("{}", serde_json::to_string_pretty(&info["schema"])?);
            }
        }
        Command::Render {
            width,
            height,
            frames,
            seed,
            pointer,
            params,
            output,
        } => {
            let params: serde_json::Value = serde_json::from_str(&params)
                .map_err(|e| CliError::Input(format!("invalid --params JSON: {e}")))?;
            let config = WaveConfig::from_json(&params);

            let (surface, rendered) = render(width, height, frames, seed, pointer, config)?;
            driftlines_raster::snapshot::write_png(&surface, &output)?;

            if cli.json {
                let info = serde_json::json!({
                    "width": width,
                    "height": height,
                    "frames": frames,
                    "rendered": rendered,
                    "seed": seed,
                    "pointer": format!("{pointer:?}").to_lowercase(),
                    "output": output.display().to_string(),
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                eprintln!(
                    "rendered {rendered}/{frames} frames ({width}x{height}, seed {seed}) -> {}",
                    output.display()
                );
            }
        }
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("warn,driftlines_core=info,driftlines_raster=info,driftlines_cli=info")
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_path_feeds_no_input() {
        assert_eq!(PointerPath::None.position(0.5, 640.0, 360.0), None);
    }

    #[test]
    fn sweep_crosses_the_surface() {
        let start = PointerPath::Sweep.position(0.0, 640.0, 360.0).unwrap();
        let end = PointerPath::Sweep.position(1.0, 640.0, 360.0).unwrap();
        assert_eq!(start.x, 0.0);
        assert_eq!(end.x, 640.0);
        for i in 0..=20 {
            let p = PointerPath::Sweep.position(i as f64 / 20.0, 640.0, 360.0).unwrap();
            assert!(p.y > 0.0 && p.y < 360.0);
        }
    }

    #[test]
    fn orbit_stays_on_its_circle() {
        let center = DVec2::new(320.0, 180.0);
        for i in 0..=20 {
            let p = PointerPath::Orbit.position(i as f64 / 20.0, 640.0, 360.0).unwrap();
            assert!((p.distance(center) - 108.0).abs() < 1e-9);
        }
    }

    #[test]
    fn render_at_60hz_draws_every_frame() {
        let (surface, rendered) = render(
            96,
            64,
            30,
            0.42,
            PointerPath::Orbit,
            WaveConfig::default(),
        )
        .unwrap();
        assert_eq!(rendered, 30);
        assert_eq!(surface.width(), 96);
        assert!(surface.pixels().chunks_exact(4).any(|px| px[3] > 0));
    }

    #[test]
    fn render_rejects_zero_size() {
        let err = render(0, 64, 10, 0.0, PointerPath::None, WaveConfig::default())
            .err()
            .unwrap();
        assert_eq!(err.exit_code(), 10);
    }

    #[test]
    fn cli_parses_render_defaults() {
        let cli = Cli::try_parse_from(["driftlines", "render"]).unwrap();
        match cli.command {
            Command::Render {
                width,
                height,
                frames,
                pointer,
                ..
            } => {
                assert_eq!((width, height, frames), (640, 360, 240));
                assert_eq!(pointer, PointerPath::Sweep);
            }
            Command::Config => panic!("expected render"),
        }
    }
}
