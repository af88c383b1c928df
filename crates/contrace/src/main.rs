//! contrace: trace the contours of one color in a `P3` pixmap, mark their
//! corners, and write the painted result.
//!
//! Reads a pixmap from a file (or stdin), traces every boundary of the
//! target color, detects corners along each boundary, and writes the
//! painted raster as `P3` to a file (or stdout). Optional outputs are an
//! SVG overlay, a JSON dump of contours and diagnostics, and a per-stage
//! timing report.
//!
//! # Usage
//!
//! ```text
//! contrace [OPTIONS] [INPUT]
//! contrace square.ppm --output traced.ppm --svg traced.svg --report
//! ```
//!
//! Log verbosity follows `RUST_LOG` (default `info`); logs go to stderr.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::Parser;
use contrace_pipeline::diagnostics::{Clock, PipelineDiagnostics};
use contrace_pipeline::{Color, Contour, CornerMark, Dimensions, TraceConfig};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

/// Trace single-color contours in a P3 pixmap and mark their corners.
///
/// Contours are painted in a cycling palette and corners in red unless
/// `--no-paint` is given.
#[derive(Parser)]
#[command(name = "contrace", version)]
struct Cli {
    /// Input pixmap. Reads stdin when omitted or `-`.
    input: Option<PathBuf>,

    /// Write the painted pixmap here instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Color to trace, as `R,G,B` (default `0,0,0`).
    #[arg(long)]
    target_color: Option<Color>,

    /// Corner window width in contour points (odd, at least 3).
    #[arg(long, default_value_t = TraceConfig::DEFAULT_CORNER_WINDOW)]
    corner_window: usize,

    /// Largest included angle, in degrees, reported as a corner.
    #[arg(long, default_value_t = TraceConfig::DEFAULT_CORNER_ANGLE_DEG)]
    corner_angle: f64,

    /// Leave the raster unpainted.
    #[arg(long)]
    no_paint: bool,

    /// Write an SVG overlay of contours and corners to this file.
    #[arg(long)]
    svg: Option<PathBuf>,

    /// Print contours, corners and diagnostics as JSON on stdout.
    ///
    /// The pixmap is then only written when `--output` is given.
    #[arg(long)]
    json: bool,

    /// Print the per-stage diagnostics report on stderr.
    #[arg(long)]
    report: bool,

    /// Full trace config as a JSON string.
    ///
    /// When provided, all other trace parameter flags are ignored.
    /// The JSON must be a valid `TraceConfig` serialization; missing
    /// fields take their defaults.
    #[arg(long)]
    config_json: Option<String>,
}

/// JSON document printed by `--json`.
#[derive(Serialize)]
struct JsonOutput<'a> {
    dimensions: Dimensions,
    contours: &'a [Contour],
    corners: &'a [CornerMark],
    diagnostics: &'a PipelineDiagnostics,
}

/// Build a [`TraceConfig`] from CLI arguments.
///
/// If `--config-json` is provided, the JSON is parsed directly and all
/// individual parameter flags are ignored. Otherwise, a config is
/// assembled from the individual flags.
fn config_from_cli(cli: &Cli) -> Result<TraceConfig, String> {
    if let Some(ref json) = cli.config_json {
        return serde_json::from_str(json).map_err(|e| format!("Error parsing --config-json: {e}"));
    }

    Ok(TraceConfig {
        target_color: cli.target_color.unwrap_or(TraceConfig::DEFAULT_TARGET_COLOR),
        corner_window: cli.corner_window,
        corner_angle_deg: cli.corner_angle,
        paint: !cli.no_paint,
        ..TraceConfig::default()
    })
}

/// The input path, or `None` for stdin.
fn input_path(cli: &Cli) -> Option<&Path> {
    cli.input
        .as_deref()
        .filter(|path| path.as_os_str() != "-")
}

fn read_input(path: Option<&Path>) -> std::io::Result<Vec<u8>> {
    match path {
        Some(path) => std::fs::read(path),
        None => {
            let mut bytes = Vec::new();
            std::io::stdin().lock().read_to_end(&mut bytes)?;
            Ok(bytes)
        }
    }
}

fn write_output(path: Option<&Path>, bytes: &[u8]) -> std::io::Result<()> {
    match path {
        Some(path) => std::fs::write(path, bytes),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(bytes)?;
            stdout.flush()
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    let config = match config_from_cli(&cli) {
        Ok(c) => c,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    let input = input_path(&cli);
    let source_name = input.map_or_else(|| "<stdin>".to_string(), |p| p.display().to_string());
    let bytes = match read_input(input) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("Error reading {source_name}: {e}");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!(source = %source_name, bytes = bytes.len(), "read input");
    tracing::debug!(?config, "trace config");

    let (result, diagnostics) =
        match contrace_pipeline::diagnostics::process_with_diagnostics(&bytes, &config, &StdClock) {
            Ok(out) => out,
            Err(e) => {
                eprintln!("Pipeline error: {e}");
                return ExitCode::FAILURE;
            }
        };

    tracing::info!(
        contours = result.contours.len(),
        corners = result.corners.len(),
        "tracing complete"
    );
    for (index, contour) in result.contours.iter().enumerate() {
        tracing::info!(
            index,
            len = contour.len(),
            closure = ?contour.closure(),
            "contour"
        );
    }

    if cli.report {
        eprintln!("{}", diagnostics.report());
    }

    if let Some(ref svg_path) = cli.svg {
        let title = input
            .and_then(Path::file_stem)
            .and_then(|s| s.to_str())
            .unwrap_or("contrace");
        let config_json = serde_json::to_string(&config).ok();
        let metadata = contrace_export::SvgMetadata {
            title: Some(title),
            description: None,
            config_json: config_json.as_deref(),
        };
        let style = contrace_export::SvgStyle {
            palette: &config.trace_palette,
            corner_color: config.corner_color,
            ..contrace_export::SvgStyle::default()
        };
        let svg = contrace_export::to_svg_with(
            &result.contours,
            &result.corners,
            result.dimensions,
            &style,
            &metadata,
        );
        match std::fs::write(svg_path, &svg) {
            Ok(()) => {
                tracing::info!(path = %svg_path.display(), bytes = svg.len(), "SVG written");
            }
            Err(e) => {
                eprintln!("Error writing SVG to {}: {e}", svg_path.display());
                return ExitCode::FAILURE;
            }
        }
    }

    if cli.json {
        let doc = JsonOutput {
            dimensions: result.dimensions,
            contours: &result.contours,
            corners: &result.corners,
            diagnostics: &diagnostics,
        };
        match serde_json::to_string_pretty(&doc) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error serializing JSON: {e}");
                return ExitCode::FAILURE;
            }
        }
    }

    // With --json the pixmap goes only to an explicit --output.
    if cli.json && cli.output.is_none() {
        return ExitCode::SUCCESS;
    }

    let ppm = match contrace_export::to_ppm(&result.image) {
        Ok(ppm) => ppm,
        Err(e) => {
            eprintln!("Error encoding output: {e}");
            return ExitCode::FAILURE;
        }
    };
    let output = cli.output.as_deref();
    if let Err(e) = write_output(output, &ppm) {
        let target = output.map_or_else(|| "<stdout>".to_string(), |p| p.display().to_string());
        eprintln!("Error writing {target}: {e}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

/// [`Clock`] implementation backed by [`std::time::Instant`].
struct StdClock;

impl Clock for StdClock {
    type Instant = Instant;

    fn now(&self) -> Instant {
        Instant::now()
    }

    fn elapsed(&self, since: &Instant) -> Duration {
        since.elapsed()
    }
}
