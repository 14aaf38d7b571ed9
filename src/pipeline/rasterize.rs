//! PDF → PNG via ImageMagick.
//!
//! Invocation: `<converter> -density <dpi> -quality <q> <pdf> <png>`, run in
//! the workspace. Like the compile stage, success requires the PNG to exist
//! on disk; a clean exit is not enough.

use crate::config::RenderConfig;
use crate::error::RenderError;
use crate::pipeline::tool::{run_tool, tool_name, ToolRole};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Convert `artifact` into `target` and return the PNG bytes.
pub async fn rasterize(
    artifact: &Path,
    target: &Path,
    config: &RenderConfig,
) -> Result<Vec<u8>, RenderError> {
    let args: [OsString; 6] = [
        "-density".into(),
        config.density.to_string().into(),
        "-quality".into(),
        config.quality.to_string().into(),
        artifact.as_os_str().to_owned(),
        target.as_os_str().to_owned(),
    ];
    let out = run_tool(
        ToolRole::Converter,
        &config.converter,
        &args,
        target.parent(),
        config.tool_timeout_secs,
    )
    .await?;

    if !out.success {
        let detail = failure_detail(&config.converter, out.exit_code, &out.stderr);
        warn!(detail = %detail, "Image conversion failed");
        return Err(RenderError::RasterizationFailed { detail });
    }

    let produced = locate_output(target).ok_or(RenderError::RasterNotProduced)?;
    let bytes = tokio::fs::read(&produced)
        .await
        .map_err(RenderError::workspace)?;
    info!(
        density = config.density,
        png_bytes = bytes.len(),
        elapsed_ms = out.elapsed_ms,
        "Rasterised PDF"
    );
    Ok(bytes)
}

/// The PNG ImageMagick actually wrote.
///
/// A multi-page PDF makes `convert` emit `name-0.png`, `name-1.png`, …
/// instead of `name.png`; in that case the first page is used.
fn locate_output(target: &Path) -> Option<PathBuf> {
    if target.is_file() {
        return Some(target.to_path_buf());
    }
    let stem = target.file_stem()?.to_string_lossy();
    let first_page = target.with_file_name(format!("{stem}-0.png"));
    if first_page.is_file() {
        warn!(
            path = %first_page.display(),
            "Document produced several pages; using the first"
        );
        return Some(first_page);
    }
    None
}

fn failure_detail(program: &Path, exit_code: Option<i32>, stderr: &str) -> String {
    let status = match exit_code {
        Some(code) => format!("exit status {code}"),
        None => "signal termination".to_string(),
    };
    let stderr = stderr.trim();
    if stderr.is_empty() {
        format!("{} failed with {status}", tool_name(program))
    } else {
        format!("{} failed with {status}: {stderr}", tool_name(program))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn locate_prefers_exact_target() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("diagram.png");
        assert!(locate_output(&target).is_none());

        std::fs::write(dir.path().join("diagram-0.png"), b"first").unwrap();
        assert_eq!(
            locate_output(&target),
            Some(dir.path().join("diagram-0.png"))
        );

        std::fs::write(&target, b"png").unwrap();
        assert_eq!(locate_output(&target), Some(target));
    }

    #[test]
    fn failure_detail_includes_stderr_when_present() {
        let d = failure_detail(Path::new("/usr/bin/convert"), Some(1), "no decode delegate\n");
        assert_eq!(d, "convert failed with exit status 1: no decode delegate");

        let d = failure_detail(Path::new("convert"), None, "");
        assert_eq!(d, "convert failed with signal termination");
    }
}
