//! Compiler-log diagnostics: cut a short, actionable excerpt out of a
//! pdflatex log that may run to thousands of lines.
//!
//! ## Strategy
//!
//! The log is scanned once, top to bottom, by a two-state machine:
//!
//! ```text
//!            trigger                      blank line (≥1 error line)
//!   Idle ─────────────▶ InErrorSection ───────────────────────────▶ stop
//!                         │      ▲
//!                         └──────┘ trigger / continuation line
//! ```
//!
//! A *trigger* is any line containing (case-insensitively) `"! "`, `"error:"`,
//! `"undefined"` or `"missing"`. On a trigger the line goes into the error
//! lines and up to two non-blank lines above it go into the context lines.
//! Inside the section a non-blank line is kept when it looks like part of
//! the TeX error message (`l.<N>` marker, mentions "line", carries `^`/`?`
//! or a backslash command), or unconditionally while fewer than ten error
//! lines have been collected.
//!
//! The excerpt is `context + "--- Error Details ---" + errors`, capped at
//! [`MAX_REPORT_LINES`]. If nothing triggered, the last non-blank lines of
//! the log are used instead; if the log is empty too, stderr or a fixed
//! sentinel.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Hard cap on report length, for every source.
pub const MAX_REPORT_LINES: usize = 20;

/// Separator between context and error lines in a structured report.
pub const SECTION_SEPARATOR: &str = "--- Error Details ---";

/// Used when a log exists but yields no lines at all.
pub const UNKNOWN_FAILURE: &str = "LaTeX compilation failed with unknown error";

/// Used when the compiler wrote no log.
pub const NO_LOG_FAILURE: &str = "LaTeX compilation failed - no log file generated";

const TRIGGERS: [&str; 4] = ["! ", "error:", "undefined", "missing"];
const CONTEXT_LOOKBEHIND: usize = 2;
const ERROR_LINE_BUDGET: usize = 10;
const TAIL_WINDOW: usize = 50;
const TAIL_KEEP: usize = 15;

static RE_LINE_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^l\.(\d+)").unwrap());

/// Where the lines of a [`DiagnosticReport`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportSource {
    /// Marker-triggered extraction from the log.
    Structured,
    /// Last non-blank lines of the log.
    LogTail,
    /// Compiler standard error.
    Stderr,
    /// Fixed message; nothing better was available.
    Sentinel,
}

/// Bounded, ordered explanation of a compile failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticReport {
    lines: Vec<String>,
    source: ReportSource,
}

impl DiagnosticReport {
    /// Build a report, truncating to [`MAX_REPORT_LINES`].
    pub fn new(mut lines: Vec<String>, source: ReportSource) -> Self {
        lines.truncate(MAX_REPORT_LINES);
        Self { lines, source }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn source(&self) -> ReportSource {
        self.source
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Lines after the separator for a structured report, otherwise all lines.
    pub fn error_details(&self) -> &[String] {
        match self.lines.iter().position(|l| l == SECTION_SEPARATOR) {
            Some(idx) => &self.lines[idx + 1..],
            None => &self.lines,
        }
    }

    /// Input line number from the first `l.<N>` marker, if any.
    pub fn source_line(&self) -> Option<u32> {
        self.lines.iter().find_map(|l| {
            RE_LINE_MARKER
                .captures(l)
                .and_then(|caps| caps[1].parse().ok())
        })
    }
}

impl fmt::Display for DiagnosticReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.lines.join("\n"))
    }
}

/// Produce the best available report for a failed compile.
///
/// `log` is `None` when the compiler wrote no log file.
pub fn diagnose(log: Option<&str>, stderr: &str) -> DiagnosticReport {
    match log {
        Some(log) => extract_structured(log)
            .or_else(|| extract_tail(log))
            .unwrap_or_else(|| from_stderr(stderr, UNKNOWN_FAILURE)),
        None => from_stderr(stderr, NO_LOG_FAILURE),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Idle,
    InErrorSection,
}

/// Marker-triggered extraction. `None` when no line triggered.
pub fn extract_structured(log: &str) -> Option<DiagnosticReport> {
    let lines: Vec<&str> = log.split('\n').collect();
    let mut state = ScanState::Idle;
    let mut context: Vec<String> = Vec::new();
    let mut errors: Vec<String> = Vec::new();

    for (i, raw) in lines.iter().enumerate() {
        let clean = raw.trim();

        if is_trigger(raw) {
            state = ScanState::InErrorSection;
            errors.push(clean.to_string());
            for prev in &lines[i.saturating_sub(CONTEXT_LOOKBEHIND)..i] {
                let prev = prev.trim();
                if !prev.is_empty() && !context.iter().any(|c| c == prev) {
                    context.push(prev.to_string());
                }
            }
            continue;
        }

        match state {
            ScanState::Idle => {}
            ScanState::InErrorSection if clean.is_empty() => {
                if !errors.is_empty() {
                    break;
                }
            }
            ScanState::InErrorSection => {
                if is_continuation(raw, clean) || errors.len() < ERROR_LINE_BUDGET {
                    errors.push(clean.to_string());
                }
            }
        }
    }

    if context.is_empty() && errors.is_empty() {
        return None;
    }

    let mut out = context;
    out.push(SECTION_SEPARATOR.to_string());
    out.extend(errors);
    Some(DiagnosticReport::new(out, ReportSource::Structured))
}

/// Last [`TAIL_KEEP`] non-blank lines out of the final [`TAIL_WINDOW`] lines.
pub fn extract_tail(log: &str) -> Option<DiagnosticReport> {
    let lines: Vec<&str> = log.split('\n').collect();
    let window = &lines[lines.len().saturating_sub(TAIL_WINDOW)..];
    let non_blank: Vec<&str> = window
        .iter()
        .copied()
        .filter(|l| !l.trim().is_empty())
        .collect();
    let kept = &non_blank[non_blank.len().saturating_sub(TAIL_KEEP)..];
    if kept.is_empty() {
        return None;
    }
    Some(DiagnosticReport::new(
        kept.iter().map(|l| l.trim_end().to_string()).collect(),
        ReportSource::LogTail,
    ))
}

fn from_stderr(stderr: &str, sentinel: &str) -> DiagnosticReport {
    let lines: Vec<&str> = stderr.trim().lines().collect();
    if lines.is_empty() {
        return DiagnosticReport::new(vec![sentinel.to_string()], ReportSource::Sentinel);
    }
    let tail = &lines[lines.len().saturating_sub(MAX_REPORT_LINES)..];
    DiagnosticReport::new(
        tail.iter().map(|l| l.to_string()).collect(),
        ReportSource::Stderr,
    )
}

fn is_trigger(line: &str) -> bool {
    let lower = line.to_lowercase();
    TRIGGERS.iter().any(|t| lower.contains(t))
}

fn is_continuation(raw: &str, clean: &str) -> bool {
    raw.starts_with("l.")
        || raw.to_lowercase().contains("line")
        || raw.contains(['^', '?'])
        || clean.contains('\\')
}

#[cfg(test)]
mod tests {
    use super::*;

    const UNDEFINED_LOG: &str = "\
This is pdfTeX, Version 3.141592653-2.6-1.40.25 (TeX Live 2023)
(./diagram.tex
LaTeX2e <2022-11-01>
(/usr/share/texlive/texmf-dist/tex/latex/standalone/standalone.cls
Document Class: standalone 2022/10/10 v1.3b Class to compile TeX sub-files standalone
)
! Undefined control sequence.
l.12 \\foo

The control sequence at the end of the top line
of your error message was never \\def'ed.

Here is how much of TeX's memory you used:
";

    #[test]
    fn undefined_control_sequence_is_extracted() {
        let report = extract_structured(UNDEFINED_LOG).unwrap();
        assert_eq!(report.source(), ReportSource::Structured);
        let details = report.error_details();
        assert_eq!(details[0], "! Undefined control sequence.");
        assert_eq!(details[1], "l.12 \\foo");
        // The blank line after `l.12` ends the section.
        assert_eq!(details.len(), 2);
        assert!(report.len() <= MAX_REPORT_LINES);
        assert_eq!(report.source_line(), Some(12));
    }

    #[test]
    fn trigger_then_three_related_lines_then_blank() {
        let log = "\
(./diagram.aux)
Preamble done
! Undefined control sequence.
l.7 \\draw \\foo
                (0,0) -- (1,1);
? x
\n\
trailing noise that must not be captured
";
        let report = extract_structured(log).unwrap();
        let details = report.error_details();
        assert_eq!(details[0], "! Undefined control sequence.");
        assert_eq!(details.len(), 4);
        assert!(details.len() - 1 <= 10);
        assert!(!report.to_string().contains("trailing noise"));
        assert_eq!(
            &report.lines()[..2],
            &["(./diagram.aux)".to_string(), "Preamble done".to_string()]
        );
    }

    #[test]
    fn context_lines_are_deduplicated() {
        let log = "\
ctx a
! Missing $ inserted.
! Missing } inserted.
";
        let report = extract_structured(log).unwrap();
        let lines = report.lines();
        let sep = lines.iter().position(|l| l == SECTION_SEPARATOR).unwrap();
        // Second trigger back-fills "ctx a" (already present) and the first
        // error line, which is new to the context accumulator.
        assert_eq!(&lines[..sep], &["ctx a", "! Missing $ inserted."]);
        assert_eq!(
            &lines[sep + 1..],
            &["! Missing $ inserted.", "! Missing } inserted."]
        );
    }

    #[test]
    fn catch_all_stops_at_budget_but_continuations_still_count() {
        let mut log = String::from("! LaTeX Error: something broke.\n");
        for i in 0..15 {
            log.push_str(&format!("plain noise {i}\n"));
        }
        log.push_str("see \\command here\n");
        let report = extract_structured(&log).unwrap();
        let details = report.error_details();
        // trigger + 9 catch-all lines, then only continuation lines.
        assert_eq!(details.len(), 11);
        assert_eq!(details[9], "plain noise 8");
        assert_eq!(details[10], "see \\command here");
    }

    #[test]
    fn report_never_exceeds_cap() {
        let mut log = String::new();
        for i in 0..40 {
            log.push_str(&format!("context {i}\n! Error number {i}\n"));
        }
        let report = diagnose(Some(&log), "");
        assert_eq!(report.len(), MAX_REPORT_LINES);
        assert_eq!(report.source(), ReportSource::Structured);
    }

    #[test]
    fn trigger_is_case_insensitive() {
        let report = extract_structured("Package pgfkeys ERROR: bad key\n").unwrap();
        assert_eq!(report.error_details()[0], "Package pgfkeys ERROR: bad key");
    }

    #[test]
    fn lines_before_trigger_are_ignored_when_idle() {
        let report = extract_structured("noise one\nnoise two\nnoise three\n! Boom\n").unwrap();
        assert_eq!(
            report.lines(),
            &["noise two", "noise three", SECTION_SEPARATOR, "! Boom"]
        );
    }

    #[test]
    fn no_trigger_falls_back_to_tail() {
        let mut log = String::new();
        for i in 0..100 {
            log.push_str(&format!("info line {i}\n\n"));
        }
        let report = diagnose(Some(&log), "stderr text");
        assert_eq!(report.source(), ReportSource::LogTail);
        // Last 50 raw lines hold 24 non-blank ones; keep the final 15.
        assert_eq!(report.len(), 15);
        assert_eq!(report.lines()[0], "info line 85");
        assert_eq!(report.lines()[14], "info line 99");
    }

    #[test]
    fn blank_log_uses_stderr() {
        let report = diagnose(Some("\n  \n\n"), "fatal: out of cheese\n");
        assert_eq!(report.source(), ReportSource::Stderr);
        assert_eq!(report.to_string(), "fatal: out of cheese");
    }

    #[test]
    fn blank_log_and_stderr_use_sentinel() {
        let report = diagnose(Some(""), "   ");
        assert_eq!(report.source(), ReportSource::Sentinel);
        assert_eq!(report.to_string(), UNKNOWN_FAILURE);
    }

    #[test]
    fn missing_log_uses_stderr_or_sentinel() {
        assert_eq!(diagnose(None, "").to_string(), NO_LOG_FAILURE);
        assert_eq!(diagnose(None, "boom").source(), ReportSource::Stderr);
    }

    #[test]
    fn long_stderr_keeps_last_lines_within_cap() {
        let stderr: String = (0..50).map(|i| format!("err {i}\n")).collect();
        let report = diagnose(None, &stderr);
        assert_eq!(report.len(), MAX_REPORT_LINES);
        assert_eq!(report.lines()[0], "err 30");
    }

    #[test]
    fn source_line_absent_without_marker() {
        let report = DiagnosticReport::new(vec!["! Boom".into()], ReportSource::Structured);
        assert_eq!(report.source_line(), None);
        assert_eq!(report.error_details(), &["! Boom"]);
    }
}
