//! CLI binary for tikz-render.
//!
//! A thin shim over the library crate that maps CLI flags to `RenderConfig`,
//! renders every input and writes PNGs (or tool-response JSON).

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tikz_render::{
    write_png, RenderConfig, RenderOutcome, RenderProgressCallback, Renderer, ToolResponse,
};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Progress bar for batch runs. Items finish out of order when
/// `--concurrency` > 1, so lines are printed as they complete.
struct CliProgressCallback {
    bar: ProgressBar,
    names: Vec<String>,
}

impl CliProgressCallback {
    fn new(names: Vec<String>) -> Arc<Self> {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {pos:>3}/{len}  ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        let bar = ProgressBar::new(names.len() as u64);
        bar.set_style(style);
        bar.set_prefix("Rendering");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar, names })
    }

    fn name(&self, index: usize) -> &str {
        self.names.get(index).map(String::as_str).unwrap_or("?")
    }
}

impl RenderProgressCallback for CliProgressCallback {
    fn on_item_complete(&self, index: usize, _total: usize, png_bytes: usize) {
        self.bar.println(format!(
            "  {} {}  {}",
            green("✓"),
            self.name(index),
            dim(&format!("{png_bytes} bytes")),
        ));
        self.bar.inc(1);
    }

    fn on_item_error(&self, index: usize, _total: usize, error: String) {
        let first = error.lines().next().unwrap_or("").to_string();
        self.bar
            .println(format!("  {} {}  {}", red("✗"), self.name(index), red(&first)));
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, _total: usize, _success_count: usize) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Render a fragment file (writes diagram.png next to it)
  tikz2png diagram.tex

  # Render from stdin to an explicit path
  echo '\begin{tikzpicture}\fill[red] (0,0) rectangle (1,1);\end{tikzpicture}' | tikz2png - -o red.png

  # Batch, four at a time, into a directory
  tikz2png figures/*.tex --out-dir build/png -c 4

  # Emit the tool response (text + base64 image/png) as JSON
  tikz2png --json diagram.tex

  # Only check that pdflatex and convert are installed
  tikz2png --check

INPUT:
  A file without \documentclass is treated as a fragment and wrapped in a
  standalone preamble (tikz, pgfplots, amsmath, amssymb, xcolor, common
  TikZ libraries, pgfplots compat=1.18). A file with \documentclass is
  compiled as-is.

ENVIRONMENT VARIABLES:
  TIKZ2PNG_COMPILER     LaTeX compiler (default: pdflatex)
  TIKZ2PNG_CONVERTER    ImageMagick convert (default: convert)
  TIKZ2PNG_TIMEOUT      Per-tool timeout in seconds
  RUST_LOG              Override log filter
"#;

/// Render TikZ diagrams to PNG via pdflatex and ImageMagick.
#[derive(Parser, Debug)]
#[command(
    name = "tikz2png",
    version,
    about = "Render TikZ diagrams to PNG via pdflatex and ImageMagick",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// TikZ fragment or LaTeX document files; `-` reads stdin.
    #[arg(required_unless_present = "check")]
    inputs: Vec<String>,

    /// Write the PNG here (single input only).
    #[arg(short, long, conflicts_with = "out_dir")]
    output: Option<PathBuf>,

    /// Directory for PNGs (default: next to each input).
    #[arg(long, env = "TIKZ2PNG_OUT_DIR")]
    out_dir: Option<PathBuf>,

    /// Print the tool response as JSON instead of writing files.
    #[arg(long, env = "TIKZ2PNG_JSON")]
    json: bool,

    /// Probe the external tools and exit.
    #[arg(long)]
    check: bool,

    /// LaTeX compiler program.
    #[arg(long, env = "TIKZ2PNG_COMPILER", default_value = "pdflatex")]
    compiler: PathBuf,

    /// ImageMagick convert program.
    #[arg(long, env = "TIKZ2PNG_CONVERTER", default_value = "convert")]
    converter: PathBuf,

    /// Rasterisation density in DPI (72–1200).
    #[arg(long, env = "TIKZ2PNG_DENSITY", default_value_t = 300,
          value_parser = clap::value_parser!(u32).range(72..=1200))]
    density: u32,

    /// PNG quality (1–100).
    #[arg(long, env = "TIKZ2PNG_QUALITY", default_value_t = 90,
          value_parser = clap::value_parser!(u32).range(1..=100))]
    quality: u32,

    /// Kill pdflatex/convert after this many seconds.
    #[arg(long, env = "TIKZ2PNG_TIMEOUT")]
    timeout: Option<u64>,

    /// Number of inputs rendered at once.
    #[arg(short, long, env = "TIKZ2PNG_CONCURRENCY", default_value_t = 4)]
    concurrency: usize,

    /// Disable progress bar.
    #[arg(long, env = "TIKZ2PNG_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "TIKZ2PNG_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "TIKZ2PNG_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && cli.inputs.len() > 1;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let progress: Option<Arc<CliProgressCallback>> =
        show_progress.then(|| CliProgressCallback::new(cli.inputs.clone()));
    let renderer = Renderer::new(build_config(&cli, progress.clone())?);

    // ── Check-only mode ──────────────────────────────────────────────────
    if cli.check {
        renderer.ensure_tools().await.context("Tool check failed")?;
        if !cli.quiet {
            eprintln!(
                "{} {} and {} are available",
                green("✔"),
                bold(&cli.compiler.display().to_string()),
                bold(&cli.converter.display().to_string()),
            );
        }
        return Ok(());
    }

    if cli.output.is_some() && cli.inputs.len() > 1 {
        anyhow::bail!("--output accepts a single input; use --out-dir for batches");
    }
    if !cli.json && cli.output.is_none() && cli.inputs.iter().any(|i| i == "-") {
        anyhow::bail!("stdin input needs --output or --json");
    }

    // ── Read inputs ──────────────────────────────────────────────────────
    let mut markups = Vec::with_capacity(cli.inputs.len());
    for input in &cli.inputs {
        markups.push(read_input(input).await?);
    }

    // ── Render ───────────────────────────────────────────────────────────
    let outcomes = renderer.render_many(markups).await;

    if cli.json {
        let responses: Vec<ToolResponse> = outcomes.iter().map(ToolResponse::from_outcome).collect();
        let json = if responses.len() == 1 {
            serde_json::to_string_pretty(&responses[0])
        } else {
            serde_json::to_string_pretty(&responses)
        }
        .context("Failed to serialise response")?;
        println!("{json}");
    } else {
        for (input, outcome) in cli.inputs.iter().zip(&outcomes) {
            match outcome {
                RenderOutcome::Success(image) => {
                    let dest = destination(&cli, input);
                    write_png(image, &dest)
                        .await
                        .with_context(|| format!("Failed to write {}", dest.display()))?;
                    if !cli.quiet && progress.is_none() {
                        let size = match (image.width, image.height) {
                            (Some(w), Some(h)) => format!("{w}×{h}"),
                            _ => "?".to_string(),
                        };
                        eprintln!(
                            "{} {} → {}  {}",
                            green("✔"),
                            input,
                            bold(&dest.display().to_string()),
                            dim(&format!("{size}  {}ms", image.stats.total_duration_ms)),
                        );
                    }
                }
                RenderOutcome::Failure { reason, .. } => {
                    eprintln!("{} {}\n{}", red("✘"), bold(input), reason);
                }
            }
        }
    }

    let failed = outcomes.iter().filter(|o| !o.is_success()).count();
    if failed > 0 {
        anyhow::bail!("{failed} of {} inputs failed", outcomes.len());
    }
    Ok(())
}

/// Map CLI args to `RenderConfig`.
fn build_config(cli: &Cli, progress: Option<Arc<CliProgressCallback>>) -> Result<RenderConfig> {
    let mut builder = RenderConfig::builder()
        .compiler(&cli.compiler)
        .converter(&cli.converter)
        .density(cli.density)
        .quality(cli.quality)
        .concurrency(cli.concurrency);

    if let Some(secs) = cli.timeout {
        builder = builder.tool_timeout_secs(secs);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

async fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        tokio::task::spawn_blocking(|| {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf).map(|_| buf)
        })
        .await
        .context("stdin reader panicked")?
        .context("Failed to read stdin")
    } else {
        tokio::fs::read_to_string(input)
            .await
            .with_context(|| format!("Failed to read {input}"))
    }
}

/// Where the PNG for `input` goes.
fn destination(cli: &Cli, input: &str) -> PathBuf {
    if let Some(ref out) = cli.output {
        return out.clone();
    }
    let path = Path::new(input);
    match cli.out_dir {
        Some(ref dir) => {
            let stem = path.file_stem().unwrap_or(path.as_os_str());
            dir.join(format!("{}.png", stem.to_string_lossy()))
        }
        None => path.with_extension("png"),
    }
}
