//! Tool response shape handed back to the surrounding service.
//!
//! A success is a short status line followed by a base64 `image/png` block;
//! a failure is a single text block prefixed so the caller can tell it is an
//! error. Wire framing (JSON-RPC envelopes, ids) is the shell's business.

use crate::error::ErrorKind;
use crate::output::RenderOutcome;
use serde::{Deserialize, Serialize};

/// Status line sent with every successful render.
pub const SUCCESS_TEXT: &str = "TikZ diagram rendered successfully";

/// Message sent when the request failed validation.
pub const INVALID_INPUT_TEXT: &str = "Error: Valid TikZ code is required";

/// Prefix of every pipeline failure message.
pub const FAILURE_PREFIX: &str = "Compilation Error: ";

/// One block of tool output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Content {
    Text {
        text: String,
    },
    Image {
        /// Base64-encoded image bytes.
        data: String,
        #[serde(rename = "mimeType")]
        mime_type: String,
    },
}

/// Complete response to one `render_tikz` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResponse {
    pub content: Vec<Content>,
    #[serde(default)]
    pub is_error: bool,
}

impl ToolResponse {
    pub fn from_outcome(outcome: &RenderOutcome) -> Self {
        match outcome {
            RenderOutcome::Success(img) => Self {
                content: vec![
                    Content::Text {
                        text: SUCCESS_TEXT.to_string(),
                    },
                    Content::Image {
                        data: img.to_base64(),
                        mime_type: img.mime_type().to_string(),
                    },
                ],
                is_error: false,
            },
            RenderOutcome::Failure {
                kind: ErrorKind::InvalidInput,
                ..
            } => Self::invalid_input(),
            RenderOutcome::Failure { reason, .. } => Self::error(format!("{FAILURE_PREFIX}{reason}")),
        }
    }

    pub fn invalid_input() -> Self {
        Self::error(INVALID_INPUT_TEXT.to_string())
    }

    fn error(text: String) -> Self {
        Self {
            content: vec![Content::Text { text }],
            is_error: true,
        }
    }

    /// Concatenated text of all text blocks.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|c| match c {
                Content::Text { text } => Some(text.as_str()),
                Content::Image { .. } => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
