//! Configuration types for TikZ rendering.
//!
//! All rendering behaviour is controlled through [`RenderConfig`], built via
//! its [`RenderConfigBuilder`]. The fragment preamble is not configurable;
//! see [`crate::pipeline::normalize::PREAMBLE`].

use crate::error::RenderError;
use crate::progress::ProgressCallback;
use std::fmt;
use std::path::PathBuf;

/// Default typesetting compiler.
pub const DEFAULT_COMPILER: &str = "pdflatex";

/// Default image-conversion tool (ImageMagick).
pub const DEFAULT_CONVERTER: &str = "convert";

/// Configuration for a render.
///
/// Built via [`RenderConfig::builder()`] or using [`RenderConfig::default()`].
///
/// # Example
/// ```rust
/// use tikz_render::RenderConfig;
///
/// let config = RenderConfig::builder()
///     .density(150)
///     .tool_timeout_secs(30)
///     .build()
///     .unwrap();
/// assert_eq!(config.quality, 90);
/// ```
#[derive(Clone)]
pub struct RenderConfig {
    /// Program name or path of the LaTeX compiler. Default: `pdflatex`.
    pub compiler: PathBuf,

    /// Program name or path of the ImageMagick converter. Default: `convert`.
    pub converter: PathBuf,

    /// Rasterisation density in DPI passed as `-density`. Range: 72–1200. Default: 300.
    pub density: u32,

    /// PNG quality passed as `-quality`. Range: 1–100. Default: 90.
    pub quality: u32,

    /// Kill an external tool that runs longer than this many seconds.
    /// Default: `None` (wait indefinitely).
    pub tool_timeout_secs: Option<u64>,

    /// Directory under which per-request workspaces are created.
    /// Default: `None` (the system temp directory).
    pub scratch_root: Option<PathBuf>,

    /// Number of pipelines run at once by [`crate::Renderer::render_many`]. Default: 4.
    pub concurrency: usize,

    /// Optional progress callback for batch renders.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            compiler: PathBuf::from(DEFAULT_COMPILER),
            converter: PathBuf::from(DEFAULT_CONVERTER),
            density: 300,
            quality: 90,
            tool_timeout_secs: None,
            scratch_root: None,
            concurrency: 4,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for RenderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderConfig")
            .field("compiler", &self.compiler)
            .field("converter", &self.converter)
            .field("density", &self.density)
            .field("quality", &self.quality)
            .field("tool_timeout_secs", &self.tool_timeout_secs)
            .field("scratch_root", &self.scratch_root)
            .field("concurrency", &self.concurrency)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn RenderProgressCallback>"),
            )
            .finish()
    }
}

impl RenderConfig {
    /// Create a new builder for `RenderConfig`.
    pub fn builder() -> RenderConfigBuilder {
        RenderConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`RenderConfig`].
#[derive(Debug)]
pub struct RenderConfigBuilder {
    config: RenderConfig,
}

impl RenderConfigBuilder {
    pub fn compiler(mut self, program: impl Into<PathBuf>) -> Self {
        self.config.compiler = program.into();
        self
    }

    pub fn converter(mut self, program: impl Into<PathBuf>) -> Self {
        self.config.converter = program.into();
        self
    }

    pub fn density(mut self, dpi: u32) -> Self {
        self.config.density = dpi.clamp(72, 1200);
        self
    }

    pub fn quality(mut self, quality: u32) -> Self {
        self.config.quality = quality.clamp(1, 100);
        self
    }

    pub fn tool_timeout_secs(mut self, secs: u64) -> Self {
        self.config.tool_timeout_secs = Some(secs);
        self
    }

    pub fn scratch_root(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.scratch_root = Some(dir.into());
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n.max(1);
        self
    }

    /// Set a progress callback to receive per-item batch events.
    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<RenderConfig, RenderError> {
        let c = &self.config;
        if c.compiler.as_os_str().is_empty() {
            return Err(RenderError::InvalidConfig("compiler must not be empty".into()));
        }
        if c.converter.as_os_str().is_empty() {
            return Err(RenderError::InvalidConfig(
                "converter must not be empty".into(),
            ));
        }
        if c.tool_timeout_secs == Some(0) {
            return Err(RenderError::InvalidConfig(
                "tool timeout must be ≥ 1 second".into(),
            ));
        }
        if let Some(ref root) = c.scratch_root {
            if !root.is_dir() {
                return Err(RenderError::InvalidConfig(format!(
                    "scratch root '{}' is not a directory",
                    root.display()
                )));
            }
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_fixed_raster_settings() {
        let c = RenderConfig::default();
        assert_eq!(c.density, 300);
        assert_eq!(c.quality, 90);
        assert_eq!(c.compiler, PathBuf::from("pdflatex"));
        assert_eq!(c.converter, PathBuf::from("convert"));
        assert!(c.tool_timeout_secs.is_none());
    }

    #[test]
    fn builder_clamps_ranges() {
        let c = RenderConfig::builder()
            .density(5)
            .quality(500)
            .concurrency(0)
            .build()
            .unwrap();
        assert_eq!(c.density, 72);
        assert_eq!(c.quality, 100);
        assert_eq!(c.concurrency, 1);
    }

    #[test]
    fn zero_timeout_rejected() {
        let err = RenderConfig::builder().tool_timeout_secs(0).build().unwrap_err();
        assert!(err.to_string().contains("timeout"), "got: {err}");
    }

    #[test]
    fn missing_scratch_root_rejected() {
        let err = RenderConfig::builder()
            .scratch_root("/definitely/not/a/real/dir")
            .build()
            .unwrap_err();
        assert!(matches!(err, RenderError::InvalidConfig(_)));
    }

    #[test]
    fn debug_hides_callback() {
        let s = format!("{:?}", RenderConfig::default());
        assert!(s.contains("density: 300"), "got: {s}");
    }
}
