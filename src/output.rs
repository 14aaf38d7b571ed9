//! Result types produced by the orchestrator.

use crate::error::{ErrorKind, RenderError};
use crate::pipeline::encode::{encode_png, png_dimensions, PNG_MIME_TYPE};
use serde::{Deserialize, Serialize};

/// Timings and flags for one successful render.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderStats {
    /// `true` when the input carried its own `\documentclass`.
    pub full_document: bool,
    /// The compiler exited non-zero but still produced a PDF.
    pub compiler_exit_tolerated: bool,
    pub compile_duration_ms: u64,
    pub raster_duration_ms: u64,
    pub total_duration_ms: u64,
}

/// A rendered PNG.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    /// Raw PNG bytes.
    pub bytes: Vec<u8>,
    /// Pixel width, when the PNG header could be read.
    pub width: Option<u32>,
    /// Pixel height, when the PNG header could be read.
    pub height: Option<u32>,
    pub stats: RenderStats,
}

impl RasterImage {
    /// Wrap PNG bytes, reading dimensions from the header when possible.
    pub fn from_png(bytes: Vec<u8>, stats: RenderStats) -> Self {
        let (width, height) = match png_dimensions(&bytes) {
            Some((w, h)) => (Some(w), Some(h)),
            None => (None, None),
        };
        Self {
            bytes,
            width,
            height,
            stats,
        }
    }

    pub fn mime_type(&self) -> &'static str {
        PNG_MIME_TYPE
    }

    /// Base64 transport encoding of the PNG.
    pub fn to_base64(&self) -> String {
        encode_png(&self.bytes)
    }
}

/// Exactly one of these is produced per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    Success(RasterImage),
    Failure {
        kind: ErrorKind,
        /// Human-readable reason (the error's Display text).
        reason: String,
    },
}

impl RenderOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RenderOutcome::Success(_))
    }

    pub fn image(&self) -> Option<&RasterImage> {
        match self {
            RenderOutcome::Success(img) => Some(img),
            RenderOutcome::Failure { .. } => None,
        }
    }

    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            RenderOutcome::Success(_) => None,
            RenderOutcome::Failure { kind, .. } => Some(*kind),
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            RenderOutcome::Success(_) => None,
            RenderOutcome::Failure { reason, .. } => Some(reason),
        }
    }
}

impl From<RenderError> for RenderOutcome {
    fn from(err: RenderError) -> Self {
        RenderOutcome::Failure {
            kind: err.kind(),
            reason: err.to_string(),
        }
    }
}

impl From<Result<RasterImage, RenderError>> for RenderOutcome {
    fn from(result: Result<RasterImage, RenderError>) -> Self {
        match result {
            Ok(img) => RenderOutcome::Success(img),
            Err(err) => err.into(),
        }
    }
}
