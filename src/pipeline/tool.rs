//! External program invocation shared by every stage that shells out.
//!
//! Each call runs with stdin closed and both output streams captured. The
//! child is spawned with `kill_on_drop(true)`, so when a configured timeout
//! elapses and the `output()` future is dropped, the process is killed
//! rather than left running in the background.

use crate::error::RenderError;
use std::ffi::OsStr;
use std::io::ErrorKind as IoErrorKind;
use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tracing::{debug, warn};

/// Which external dependency a program fulfils.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolRole {
    /// The LaTeX compiler (`pdflatex`).
    Compiler,
    /// The PDF → PNG converter (ImageMagick `convert`).
    Converter,
}

impl ToolRole {
    /// Installation advice shown when the tool is missing.
    pub fn hint(self) -> &'static str {
        match self {
            ToolRole::Compiler => "Please install TeX Live or MiKTeX.",
            ToolRole::Converter => "Please install ImageMagick.",
        }
    }
}

/// Captured result of one program run.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// `true` when the process exited with status 0.
    pub success: bool,
    /// Exit code, `None` when terminated by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub elapsed_ms: u64,
}

/// Short display name for a program path (`/usr/bin/pdflatex` → `pdflatex`).
pub fn tool_name(program: &Path) -> String {
    program
        .file_name()
        .unwrap_or(program.as_os_str())
        .to_string_lossy()
        .into_owned()
}

/// Run `program` with `args`, optionally inside `cwd`, and capture its output.
///
/// A non-zero exit is *not* an error here; callers decide what it means.
/// Errors are limited to spawn failures and timeouts.
pub async fn run_tool<I, S>(
    role: ToolRole,
    program: &Path,
    args: I,
    cwd: Option<&Path>,
    timeout_secs: Option<u64>,
) -> Result<ToolOutput, RenderError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let tool = tool_name(program);
    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }

    let started = Instant::now();
    let output = match timeout_secs {
        Some(secs) => match tokio::time::timeout(Duration::from_secs(secs), cmd.output()).await {
            Ok(result) => result,
            Err(_) => {
                warn!(tool = %tool, secs, "External tool timed out; killed");
                return Err(RenderError::Timeout { tool, secs });
            }
        },
        None => cmd.output().await,
    }
    .map_err(|e| spawn_error(role, &tool, e))?;

    let elapsed_ms = started.elapsed().as_millis() as u64;
    let result = ToolOutput {
        success: output.status.success(),
        exit_code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        elapsed_ms,
    };
    debug!(
        tool = %tool,
        exit_code = result.exit_code.unwrap_or(-1),
        elapsed_ms,
        "External tool finished"
    );
    Ok(result)
}

fn spawn_error(role: ToolRole, tool: &str, err: std::io::Error) -> RenderError {
    match err.kind() {
        IoErrorKind::NotFound | IoErrorKind::PermissionDenied => RenderError::ToolMissing {
            tool: tool.to_string(),
            hint: role.hint().to_string(),
        },
        _ => RenderError::Internal(format!("failed to run {tool}: {err}")),
    }
}
