//! Request validation for the `render_tikz` tool.
//!
//! The only rule is that the markup is a non-empty string. Anything else is
//! rejected here with [`RenderError::InvalidInput`] before a probe runs or a
//! workspace is created.

use crate::error::RenderError;
use serde_json::Value;

/// Tool name under which the renderer is exposed.
pub const TOOL_NAME: &str = "render_tikz";

/// Argument key holding the markup.
pub const MARKUP_ARGUMENT: &str = "tikz_code";

/// Validated, immutable render input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderRequest {
    markup: String,
}

impl RenderRequest {
    /// Accept `markup` if it is non-empty.
    pub fn new(markup: impl Into<String>) -> Result<Self, RenderError> {
        let markup = markup.into();
        if markup.is_empty() {
            return Err(invalid("TikZ code must be a non-empty string"));
        }
        Ok(Self { markup })
    }

    /// Validate tool-call arguments of the form `{"tikz_code": "..."}`.
    pub fn from_arguments(arguments: Option<&Value>) -> Result<Self, RenderError> {
        let value = arguments
            .and_then(|args| args.get(MARKUP_ARGUMENT))
            .ok_or_else(|| invalid(&format!("missing required argument '{MARKUP_ARGUMENT}'")))?;
        let markup = value
            .as_str()
            .ok_or_else(|| invalid(&format!("argument '{MARKUP_ARGUMENT}' must be a string")))?;
        Self::new(markup)
    }

    pub fn markup(&self) -> &str {
        &self.markup
    }

    pub fn into_markup(self) -> String {
        self.markup
    }
}

/// JSON schema advertised for the tool's input.
pub fn input_schema() -> Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            MARKUP_ARGUMENT: {
                "type": "string",
                "description": "TikZ/LaTeX code to render. Can include \\begin{tikzpicture}...\\end{tikzpicture} or a full LaTeX document with \\documentclass."
            }
        },
        "required": [MARKUP_ARGUMENT]
    })
}

fn invalid(reason: &str) -> RenderError {
    RenderError::InvalidInput {
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    #[test]
    fn empty_markup_rejected() {
        let err = RenderRequest::new("").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn whitespace_markup_accepted() {
        assert!(RenderRequest::new("  ").is_ok());
    }

    #[test]
    fn missing_arguments_rejected() {
        assert_eq!(
            RenderRequest::from_arguments(None).unwrap_err().kind(),
            ErrorKind::InvalidInput
        );
        assert_eq!(
            RenderRequest::from_arguments(Some(&json!({}))).unwrap_err().kind(),
            ErrorKind::InvalidInput
        );
        assert_eq!(
            RenderRequest::from_arguments(Some(&json!({ "tikz_code": null })))
                .unwrap_err()
                .kind(),
            ErrorKind::InvalidInput
        );
    }

    #[test]
    fn non_string_argument_rejected() {
        let err = RenderRequest::from_arguments(Some(&json!({ "tikz_code": 42 }))).unwrap_err();
        assert!(err.to_string().contains("must be a string"), "got: {err}");
    }

    #[test]
    fn valid_arguments_accepted() {
        let req = RenderRequest::from_arguments(Some(&json!({ "tikz_code": "\\draw (0,0);" }))).unwrap();
        assert_eq!(req.markup(), "\\draw (0,0);");
    }

    #[test]
    fn schema_requires_markup() {
        let schema = input_schema();
        assert_eq!(schema["required"][0], MARKUP_ARGUMENT);
        assert_eq!(schema["properties"][MARKUP_ARGUMENT]["type"], "string");
    }
}
