//! # tikz-render
//!
//! Render TikZ diagrams to PNG by driving `pdflatex` and ImageMagick.
//!
//! The interesting part is not the rendering itself but what happens when
//! it fails: a pdflatex log for a three-line diagram is easily a few hundred
//! lines of font loading and package banners. This crate turns such a log
//! into a short excerpt that points at the actual error (see
//! [`pipeline::diagnose`]).
//!
//! ## Pipeline Overview
//!
//! ```text
//! markup
//!  │
//!  ├─ 1. Probe      pdflatex / convert answer --version (cached)
//!  ├─ 2. Normalize  fragments wrapped in a fixed standalone preamble
//!  ├─ 3. Compile    pdflatex -interaction=nonstopmode in a scratch dir
//!  ├─ 4. Diagnose   on failure, ≤20-line excerpt of the compiler log
//!  ├─ 5. Rasterize  convert -density 300 -quality 90 → PNG
//!  └─ 6. Encode     base64 image/png content block
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tikz_render::{RenderConfig, RenderOutcome, Renderer};
//!
//! #[tokio::main]
//! async fn main() {
//!     let renderer = Renderer::new(RenderConfig::default());
//!     match renderer.render(r"\begin{tikzpicture}\fill (0,0) rectangle (1,1);\end{tikzpicture}").await {
//!         RenderOutcome::Success(png) => println!("{} bytes", png.bytes.len()),
//!         RenderOutcome::Failure { reason, .. } => eprintln!("{reason}"),
//!     }
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `tikz2png` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! ## External Requirements
//!
//! A TeX distribution providing `pdflatex` with the `standalone`, `tikz`,
//! `pgfplots` and AMS packages, and ImageMagick's `convert` with a working
//! PDF delegate (Ghostscript).

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod render;
pub mod request;
pub mod response;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{RenderConfig, RenderConfigBuilder};
pub use error::{ErrorKind, RenderError};
pub use output::{RasterImage, RenderOutcome, RenderStats};
pub use pipeline::diagnose::{DiagnosticReport, ReportSource};
pub use progress::{NoopProgressCallback, ProgressCallback, RenderProgressCallback};
pub use render::{render, render_sync, render_to_file, write_png, Renderer};
pub use request::RenderRequest;
pub use response::{Content, ToolResponse};
