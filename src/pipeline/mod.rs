//! Pipeline stages for TikZ-to-PNG rendering.
//!
//! Each submodule implements exactly one step. The orchestrator in
//! [`crate::render`] sequences them; no stage calls another.
//!
//! ## Data Flow
//!
//! ```text
//! probe ──▶ normalize ──▶ compile ──┬──▶ rasterize ──▶ encode
//! (tools)   (template)   (pdflatex) │    (convert)     (base64)
//!                                   └──▶ diagnose (log excerpt)
//! ```
//!
//! 1. [`probe`]     check `pdflatex` and `convert` answer `--version`
//! 2. [`normalize`] wrap fragments in the fixed standalone preamble
//! 3. [`workspace`] single-use scratch directory removed on drop
//! 4. [`compile`]   run the compiler non-interactively in the workspace
//! 5. [`diagnose`]  turn a failed compile's log into a short report
//! 6. [`rasterize`] PDF → PNG at fixed density and quality
//! 7. [`encode`]    base64 and PNG header helpers
//!
//! [`tool`] holds the process runner shared by stages 1, 4 and 6.

pub mod compile;
pub mod diagnose;
pub mod encode;
pub mod normalize;
pub mod probe;
pub mod rasterize;
pub mod tool;
pub mod workspace;
