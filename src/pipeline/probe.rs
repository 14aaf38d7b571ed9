//! Environment probe: confirm both external tools answer `--version`.
//!
//! Runs before any workspace is created so a missing installation fails fast
//! without touching the filesystem. [`crate::Renderer`] caches a successful
//! probe for its lifetime; a failed probe is retried on the next request.

use crate::config::RenderConfig;
use crate::error::RenderError;
use crate::pipeline::tool::{run_tool, tool_name, ToolRole};
use std::path::Path;
use tracing::{debug, info};

/// Probe the compiler, then the converter.
pub async fn probe_tools(config: &RenderConfig) -> Result<(), RenderError> {
    probe_tool(ToolRole::Compiler, &config.compiler, config.tool_timeout_secs).await?;
    probe_tool(ToolRole::Converter, &config.converter, config.tool_timeout_secs).await?;
    info!(
        compiler = %config.compiler.display(),
        converter = %config.converter.display(),
        "External tools available"
    );
    Ok(())
}

async fn probe_tool(
    role: ToolRole,
    program: &Path,
    timeout_secs: Option<u64>,
) -> Result<(), RenderError> {
    let missing = || RenderError::ToolMissing {
        tool: tool_name(program),
        hint: role.hint().to_string(),
    };

    let out = run_tool(role, program, ["--version"], None, timeout_secs)
        .await
        .map_err(|_| missing())?;
    if !out.success {
        return Err(missing());
    }

    debug!(
        tool = %tool_name(program),
        version = out.stdout.lines().next().unwrap_or("").trim(),
        "Probed tool"
    );
    Ok(())
}
