//! Progress reporting for TTY and non-TTY environments.
//!
//! TTY mode: one count bar per batch stage.
//! Non-TTY mode: bars are hidden and progress goes through the log.

use std::io::IsTerminal;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

fn count_style() -> Option<ProgressStyle> {
    ProgressStyle::with_template(
        "{prefix:<10.cyan.bold} {bar:30.green/dim} {pos:>5}/{len:5} {eta:>4} {wide_msg:.dim}",
    )
    .ok()
    .map(|style| style.progress_chars("--"))
}

/// Central progress context owning the `MultiProgress`.
pub struct ProgressContext {
    multi: MultiProgress,
    is_tty: bool,
}

impl ProgressContext {
    /// Create a context, detecting a TTY on stderr.
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            is_tty: std::io::stderr().is_terminal(),
        }
    }

    /// Bar counting `total` items (residents, papers). Hidden off a TTY.
    pub fn count_bar(&self, stage: &str, total: usize) -> ProgressBar {
        if !self.is_tty {
            return ProgressBar::hidden();
        }
        let pb = self.multi.add(ProgressBar::new(total as u64));
        if let Some(style) = count_style() {
            pb.set_style(style);
        }
        pb.set_prefix(stage.to_string());
        pb
    }

    pub fn is_tty(&self) -> bool {
        self.is_tty
    }

    /// `MultiProgress` for the log bridge.
    pub fn multi(&self) -> &MultiProgress {
        &self.multi
    }
}

impl Default for ProgressContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Format number with thousand separators.
pub fn fmt_num(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

/// `found/total (pct%)` as printed in batch summaries.
pub fn fmt_ratio(found: usize, total: usize) -> String {
    let pct = if total == 0 {
        0.0
    } else {
        found as f64 * 100.0 / total as f64
    };
    format!("{}/{} ({pct:.1}%)", fmt_num(found), fmt_num(total))
}
