//! LaTeX compilation inside the scratch workspace.
//!
//! The exit status is recorded but never trusted on its own: pdflatex in
//! `nonstopmode` can exit non-zero on recoverable errors yet still write a
//! usable PDF, and a zero exit without a PDF is still a failure. The
//! orchestrator decides using both [`CompileResult::ok`] and
//! [`CompileResult::artifact`].

use crate::config::RenderConfig;
use crate::error::RenderError;
use crate::pipeline::tool::{run_tool, ToolRole};
use crate::pipeline::workspace::Workspace;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// What the compiler left behind.
#[derive(Debug, Clone)]
pub struct CompileResult {
    /// Compiler exit status was zero.
    pub ok: bool,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub log_path: PathBuf,
    pub artifact_path: PathBuf,
    pub elapsed_ms: u64,
}

impl CompileResult {
    /// The PDF path, only if the file is physically present.
    pub fn artifact(&self) -> Option<&Path> {
        self.artifact_path
            .is_file()
            .then_some(self.artifact_path.as_path())
    }

    /// Read the compiler log, if one was written. Invalid UTF-8 is replaced.
    pub async fn read_log(&self) -> Option<String> {
        tokio::fs::read(&self.log_path)
            .await
            .ok()
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Write `document` into the workspace and run the compiler on it.
///
/// Invocation: `<compiler> -interaction=nonstopmode -output-directory <ws> <ws>/diagram.tex`
/// with the workspace as working directory, so relative `\input` paths
/// resolve inside it.
pub async fn compile(
    document: &str,
    workspace: &Workspace,
    config: &RenderConfig,
) -> Result<CompileResult, RenderError> {
    let source = workspace.source_path();
    tokio::fs::write(&source, document)
        .await
        .map_err(RenderError::workspace)?;
    debug!(path = %source.display(), bytes = document.len(), "Wrote LaTeX source");

    let args = [
        OsStr::new("-interaction=nonstopmode"),
        OsStr::new("-output-directory"),
        workspace.path().as_os_str(),
        source.as_os_str(),
    ];
    let out = run_tool(
        ToolRole::Compiler,
        &config.compiler,
        args,
        Some(workspace.path()),
        config.tool_timeout_secs,
    )
    .await?;

    let result = CompileResult {
        ok: out.success,
        exit_code: out.exit_code,
        stdout: out.stdout,
        stderr: out.stderr,
        log_path: workspace.log_path(),
        artifact_path: workspace.artifact_path(),
        elapsed_ms: out.elapsed_ms,
    };
    info!(
        ok = result.ok,
        exit_code = result.exit_code.unwrap_or(-1),
        artifact = result.artifact().is_some(),
        elapsed_ms = result.elapsed_ms,
        "Compiled LaTeX"
    );
    Ok(result)
}
