//! Progress-callback trait for batch render events.
//!
//! Inject an [`Arc<dyn RenderProgressCallback>`] via
//! [`crate::config::RenderConfigBuilder::progress_callback`] to receive events
//! as [`crate::Renderer::render_many`] works through its inputs.
//!
//! # Example
//!
//! ```rust
//! use tikz_render::{RenderConfig, RenderProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     completed: AtomicUsize,
//! }
//!
//! impl RenderProgressCallback for CountingCallback {
//!     fn on_item_complete(&self, index: usize, total: usize, png_bytes: usize) {
//!         let done = self.completed.fetch_add(1, Ordering::SeqCst) + 1;
//!         eprintln!("{done}/{total}: item {index} → {png_bytes} bytes");
//!     }
//! }
//!
//! let config = RenderConfig::builder()
//!     .progress_callback(Arc::new(CountingCallback { completed: AtomicUsize::new(0) }))
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the orchestrator as a batch of inputs is rendered.
///
/// Items run concurrently, so every method may be called from different
/// tasks at once. All methods default to no-ops.
pub trait RenderProgressCallback: Send + Sync {
    /// Called once before any item starts.
    fn on_batch_start(&self, total: usize) {
        let _ = total;
    }

    /// Called when an item's pipeline starts. `index` is 0-based input order.
    fn on_item_start(&self, index: usize, total: usize) {
        let _ = (index, total);
    }

    /// Called when an item produced a PNG of `png_bytes` bytes.
    fn on_item_complete(&self, index: usize, total: usize, png_bytes: usize) {
        let _ = (index, total, png_bytes);
    }

    /// Called when an item failed.
    fn on_item_error(&self, index: usize, total: usize, error: String) {
        let _ = (index, total, error);
    }

    /// Called once after every item finished.
    fn on_batch_complete(&self, total: usize, success_count: usize) {
        let _ = (total, success_count);
    }
}

/// Shared handle to a progress callback.
pub type ProgressCallback = Arc<dyn RenderProgressCallback>;

/// A no-op implementation, handy as a placeholder.
pub struct NoopProgressCallback;

impl RenderProgressCallback for NoopProgressCallback {}
