//! Pipeline orchestrator: markup in, PNG or a single failure reason out.
//!
//! ```text
//! Probing ─▶ Normalizing ─▶ Compiling ─┬─▶ Rasterizing ─┬─▶ Done
//!    │                          │      │                └─▶ RasterFailed
//!    └─▶ ToolMissing            │      └─▶ CompileFailed
//!                               └─▶ (workspace torn down on every exit)
//! ```
//!
//! Any stage failure is terminal: no retries, no resumption. Validation and
//! the tool probe run before a workspace exists. Each run owns its own
//! [`Workspace`], so concurrent runs never share mutable state.

use crate::config::RenderConfig;
use crate::error::RenderError;
use crate::output::{RasterImage, RenderOutcome, RenderStats};
use crate::pipeline::workspace::Workspace;
use crate::pipeline::{compile, diagnose, normalize, probe, rasterize};
use crate::request::RenderRequest;
use crate::response::ToolResponse;
use futures::stream::{self, StreamExt};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

/// Reusable renderer holding a config and a cached tool probe.
///
/// The probe runs on the first request and is remembered only if it
/// succeeds, so installing a missing tool fixes later requests without a
/// restart.
#[derive(Debug)]
pub struct Renderer {
    config: RenderConfig,
    probed: OnceCell<()>,
}

impl Renderer {
    pub fn new(config: RenderConfig) -> Self {
        Self {
            config,
            probed: OnceCell::new(),
        }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Probe the external tools once per renderer.
    pub async fn ensure_tools(&self) -> Result<(), RenderError> {
        self.probed
            .get_or_try_init(|| probe::probe_tools(&self.config))
            .await
            .map(|_| ())
    }

    /// Render `markup`, returning the typed error on failure.
    pub async fn try_render(&self, markup: &str) -> Result<RasterImage, RenderError> {
        let request = RenderRequest::new(markup)?;
        self.ensure_tools().await?;
        self.run(request.markup()).await
    }

    /// Render `markup` into a finished outcome. Never panics, never pends.
    pub async fn render(&self, markup: &str) -> RenderOutcome {
        let outcome: RenderOutcome = self.try_render(markup).await.into();
        if let RenderOutcome::Failure { kind, reason } = &outcome {
            warn!(?kind, "Render failed: {}", reason.lines().next().unwrap_or(""));
        }
        outcome
    }

    /// Handle raw `render_tikz` tool arguments and shape the response.
    pub async fn handle_arguments(&self, arguments: Option<&Value>) -> ToolResponse {
        match RenderRequest::from_arguments(arguments) {
            Ok(request) => ToolResponse::from_outcome(&self.render(request.markup()).await),
            Err(err) => {
                debug!("Rejected tool call: {}", err);
                ToolResponse::invalid_input()
            }
        }
    }

    /// Render several inputs, up to `config.concurrency` at once.
    ///
    /// Outcomes are returned in input order.
    pub async fn render_many(&self, inputs: Vec<String>) -> Vec<RenderOutcome> {
        let total = inputs.len();
        let cb = self.config.progress_callback.clone();
        if let Some(ref cb) = cb {
            cb.on_batch_start(total);
        }

        let outcomes: Vec<RenderOutcome> = stream::iter(inputs.into_iter().enumerate().map(
            |(index, markup)| {
                let cb = cb.clone();
                async move {
                    if let Some(ref cb) = cb {
                        cb.on_item_start(index, total);
                    }
                    let outcome = self.render(&markup).await;
                    if let Some(ref cb) = cb {
                        match &outcome {
                            RenderOutcome::Success(img) => {
                                cb.on_item_complete(index, total, img.bytes.len())
                            }
                            RenderOutcome::Failure { reason, .. } => {
                                cb.on_item_error(index, total, reason.clone())
                            }
                        }
                    }
                    outcome
                }
            },
        ))
        .buffered(self.config.concurrency)
        .collect()
        .await;

        let success = outcomes.iter().filter(|o| o.is_success()).count();
        info!("Rendered {}/{} inputs", success, total);
        if let Some(ref cb) = cb {
            cb.on_batch_complete(total, success);
        }
        outcomes
    }

    /// Normalize → compile → rasterize inside one scratch workspace.
    async fn run(&self, markup: &str) -> Result<RasterImage, RenderError> {
        let started = Instant::now();
        let full_document = normalize::is_full_document(markup);
        let document = normalize::normalize(markup);
        debug!(full_document, bytes = document.len(), "Normalized input");

        let workspace = Workspace::create(self.config.scratch_root.as_deref())?;
        debug!(workspace = %workspace.path().display(), "Created workspace");

        let result = self.run_in(&document, &workspace).await;

        let dir = workspace.path().to_path_buf();
        if let Err(e) = workspace.close() {
            warn!(workspace = %dir.display(), "Failed to remove workspace: {}", e);
        }

        result.map(|(bytes, mut stats)| {
            stats.full_document = full_document;
            stats.total_duration_ms = started.elapsed().as_millis() as u64;
            info!(
                png_bytes = bytes.len(),
                total_ms = stats.total_duration_ms,
                "Render complete"
            );
            RasterImage::from_png(bytes, stats)
        })
    }

    async fn run_in(
        &self,
        document: &str,
        workspace: &Workspace,
    ) -> Result<(Vec<u8>, RenderStats), RenderError> {
        // ── Compile ──────────────────────────────────────────────────────
        let compiled = compile::compile(document, workspace, &self.config).await?;
        let artifact: PathBuf = match compiled.artifact() {
            Some(path) => {
                if !compiled.ok {
                    warn!(
                        exit_code = compiled.exit_code.unwrap_or(-1),
                        "Compiler exited non-zero but produced a PDF; continuing"
                    );
                }
                path.to_path_buf()
            }
            None if !compiled.ok => {
                let log = compiled.read_log().await;
                let report = diagnose::diagnose(log.as_deref(), &compiled.stderr);
                debug!(source = ?report.source(), lines = report.len(), "Diagnosed compile failure");
                return Err(RenderError::CompilationFailed { report });
            }
            None => return Err(RenderError::ArtifactNotProduced),
        };

        // ── Rasterize ────────────────────────────────────────────────────
        let raster_start = Instant::now();
        let bytes = rasterize::rasterize(&artifact, &workspace.raster_path(), &self.config).await?;

        let stats = RenderStats {
            compiler_exit_tolerated: !compiled.ok,
            compile_duration_ms: compiled.elapsed_ms,
            raster_duration_ms: raster_start.elapsed().as_millis() as u64,
            ..RenderStats::default()
        };
        Ok((bytes, stats))
    }
}

/// Render `markup` with a one-off [`Renderer`].
pub async fn render(markup: impl AsRef<str>, config: &RenderConfig) -> RenderOutcome {
    Renderer::new(config.clone()).render(markup.as_ref()).await
}

/// Synchronous wrapper around [`Renderer::try_render`].
///
/// Creates a temporary tokio runtime internally.
pub fn render_sync(
    markup: impl AsRef<str>,
    config: &RenderConfig,
) -> Result<RasterImage, RenderError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| RenderError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(Renderer::new(config.clone()).try_render(markup.as_ref()))
}

/// Render `markup` and write the PNG to `output_path`.
///
/// Uses atomic write (temp file + rename) to prevent partial files.
pub async fn render_to_file(
    markup: impl AsRef<str>,
    output_path: impl AsRef<Path>,
    config: &RenderConfig,
) -> Result<RenderStats, RenderError> {
    let image = Renderer::new(config.clone())
        .try_render(markup.as_ref())
        .await?;
    write_png(&image, output_path.as_ref()).await?;
    Ok(image.stats)
}

/// Atomically write a rendered image to `path`.
pub async fn write_png(image: &RasterImage, path: &Path) -> Result<(), RenderError> {
    let write_err = |source| RenderError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
        }
    }

    let tmp_path = path.with_extension("png.tmp");
    tokio::fs::write(&tmp_path, &image.bytes)
        .await
        .map_err(write_err)?;
    tokio::fs::rename(&tmp_path, path).await.map_err(write_err)?;
    debug!(path = %path.display(), bytes = image.bytes.len(), "Wrote PNG");
    Ok(())
}
