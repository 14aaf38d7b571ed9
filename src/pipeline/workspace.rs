//! Per-request scratch directory.
//!
//! A [`Workspace`] wraps a [`TempDir`], so the directory and everything the
//! tools wrote into it is removed when the value is dropped, on every exit
//! path including `?` early returns, panics and cancelled futures. The
//! orchestrator calls [`Workspace::close`] on the normal path to surface
//! removal errors in the log.

use crate::error::RenderError;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Name of the document written for the compiler.
pub const SOURCE_FILE: &str = "diagram.tex";
/// Compiler log, derived from [`SOURCE_FILE`] by pdflatex.
pub const LOG_FILE: &str = "diagram.log";
/// Compiled page description.
pub const ARTIFACT_FILE: &str = "diagram.pdf";
/// Rasterised output.
pub const RASTER_FILE: &str = "diagram.png";

const PREFIX: &str = "tikz-render-";

/// Exclusively-owned scratch directory for one render attempt.
#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    /// Create a fresh directory under `root`, or the system temp dir.
    pub fn create(root: Option<&Path>) -> Result<Self, RenderError> {
        let dir = match root {
            Some(root) => tempfile::Builder::new().prefix(PREFIX).tempdir_in(root),
            None => tempfile::Builder::new().prefix(PREFIX).tempdir(),
        }
        .map_err(RenderError::workspace)?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn source_path(&self) -> PathBuf {
        self.path().join(SOURCE_FILE)
    }

    pub fn log_path(&self) -> PathBuf {
        self.path().join(LOG_FILE)
    }

    pub fn artifact_path(&self) -> PathBuf {
        self.path().join(ARTIFACT_FILE)
    }

    pub fn raster_path(&self) -> PathBuf {
        self.path().join(RASTER_FILE)
    }

    /// Remove the directory now, reporting any failure.
    pub fn close(self) -> Result<(), RenderError> {
        self.dir.close().map_err(RenderError::workspace)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_in_root_and_close_removes_everything() {
        let root = TempDir::new().unwrap();
        let ws = Workspace::create(Some(root.path())).unwrap();
        let dir = ws.path().to_path_buf();
        assert!(dir.starts_with(root.path()));
        std::fs::write(ws.log_path(), "log").unwrap();
        std::fs::write(ws.artifact_path(), "%PDF").unwrap();

        ws.close().unwrap();
        assert!(!dir.exists());
    }

    #[test]
    fn drop_removes_directory() {
        let root = TempDir::new().unwrap();
        let dir = {
            let ws = Workspace::create(Some(root.path())).unwrap();
            std::fs::write(ws.source_path(), "x").unwrap();
            ws.path().to_path_buf()
        };
        assert!(!dir.exists());
    }

    #[test]
    fn workspaces_are_never_shared() {
        let a = Workspace::create(None).unwrap();
        let b = Workspace::create(None).unwrap();
        assert_ne!(a.path(), b.path());
        assert_eq!(a.raster_path().file_name().unwrap(), "diagram.png");
    }
}
