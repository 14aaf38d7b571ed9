//! Error types for the tikz-render library.
//!
//! Every stage of the pipeline reports failure through [`RenderError`]. The
//! orchestrator in [`crate::render`] never lets a raw tool exit code or I/O
//! error escape uninterpreted: each stage converts its failure into one of
//! these variants at its own boundary, and the caller sees either the typed
//! error ([`crate::Renderer::try_render`]) or its Display text inside
//! [`crate::output::RenderOutcome::Failure`].
//!
//! Only [`RenderError::ToolMissing`] is raised before a scratch workspace
//! exists. Everything else is per-request and leaves the renderer usable.

use crate::pipeline::diagnose::DiagnosticReport;
use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the tikz-render library.
#[derive(Debug, Error)]
pub enum RenderError {
    // ── Environment ───────────────────────────────────────────────────────
    /// A required external program could not be invoked.
    #[error("{tool} not found. {hint}")]
    ToolMissing { tool: String, hint: String },

    // ── Compile stage ─────────────────────────────────────────────────────
    /// The compiler failed and produced no page description.
    #[error("LaTeX compilation failed:\n\n{report}")]
    CompilationFailed { report: DiagnosticReport },

    /// The compiler exited successfully but the PDF is missing.
    #[error("PDF file was not generated")]
    ArtifactNotProduced,

    // ── Raster stage ──────────────────────────────────────────────────────
    /// The image-conversion tool exited with an error.
    #[error("Image conversion failed: {detail}")]
    RasterizationFailed { detail: String },

    /// The image-conversion tool exited successfully but wrote no PNG.
    #[error("PNG file was not generated")]
    RasterNotProduced,

    // ── Input / config ────────────────────────────────────────────────────
    /// The request was rejected before the pipeline started.
    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Process / I/O ─────────────────────────────────────────────────────
    /// An external tool ran longer than the configured timeout and was killed.
    #[error("{tool} timed out after {secs}s and was terminated")]
    Timeout { tool: String, secs: u64 },

    /// The scratch workspace could not be created or written.
    #[error("Scratch workspace error: {source}")]
    Workspace {
        #[source]
        source: std::io::Error,
    },

    /// Could not create or write the output PNG file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Payload-free discriminant of [`RenderError`].
///
/// Carried by [`crate::output::RenderOutcome::Failure`] so callers can branch
/// on the failure class without holding the full error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    ToolMissing,
    CompilationFailed,
    ArtifactNotProduced,
    RasterizationFailed,
    RasterNotProduced,
    InvalidInput,
    InvalidConfig,
    Timeout,
    Workspace,
    OutputWriteFailed,
    Internal,
}

impl RenderError {
    /// The failure class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            RenderError::ToolMissing { .. } => ErrorKind::ToolMissing,
            RenderError::CompilationFailed { .. } => ErrorKind::CompilationFailed,
            RenderError::ArtifactNotProduced => ErrorKind::ArtifactNotProduced,
            RenderError::RasterizationFailed { .. } => ErrorKind::RasterizationFailed,
            RenderError::RasterNotProduced => ErrorKind::RasterNotProduced,
            RenderError::InvalidInput { .. } => ErrorKind::InvalidInput,
            RenderError::InvalidConfig(_) => ErrorKind::InvalidConfig,
            RenderError::Timeout { .. } => ErrorKind::Timeout,
            RenderError::Workspace { .. } => ErrorKind::Workspace,
            RenderError::OutputWriteFailed { .. } => ErrorKind::OutputWriteFailed,
            RenderError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Wrap an I/O failure on the scratch workspace.
    pub(crate) fn workspace(source: std::io::Error) -> Self {
        RenderError::Workspace { source }
    }
}
