//! Progress reporting for TTY and non-TTY environments.
//!
//! TTY mode: an indicatif page bar for fetch and spinner lines per stage.
//! Non-TTY mode: hidden bars, logs carry the progress.

use std::io::IsTerminal;
use std::sync::Arc;
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

fn page_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{prefix:<12.dim} {bar:30.green/dim} {pos:>3}/{len:3} pages {elapsed:>4} {wide_msg:.dim}")
        .expect("invalid template")
        .progress_chars("--")
}

/// Central progress context managing multi-progress bars.
pub struct ProgressContext {
    multi: MultiProgress,
    is_tty: bool,
}

impl ProgressContext {
    /// Create new context, detecting TTY automatically.
    pub fn new() -> Self {
        Self::with_tty(std::io::stderr().is_terminal())
    }

    /// Create a context with TTY mode forced on or off.
    pub fn with_tty(is_tty: bool) -> Self {
        Self {
            multi: MultiProgress::new(),
            is_tty,
        }
    }

    /// Bar counting fetched pages. Hidden in non-TTY mode.
    pub fn page_bar(&self, label: &str, total_pages: u64) -> ProgressBar {
        if !self.is_tty {
            return ProgressBar::hidden();
        }
        let pb = self.multi.add(ProgressBar::new(total_pages));
        pb.set_style(page_style());
        pb.set_prefix(label.chars().take(12).collect::<String>());
        pb
    }

    /// Spinner line for a pipeline stage.
    ///
    /// Update with `pb.set_message(...)`, stop with `pb.finish_and_clear()`.
    pub fn stage_line(&self, name: &str) -> ProgressBar {
        if !self.is_tty {
            return ProgressBar::hidden();
        }
        let pb = self.multi.add(ProgressBar::new(0));
        pb.set_style(
            ProgressStyle::with_template("{spinner:.green} {prefix:<10.cyan.bold} {wide_msg}")
                .expect("invalid template"),
        );
        pb.set_prefix(name.to_string());
        pb.enable_steady_tick(Duration::from_millis(80));
        pb
    }

    /// Print a line above managed progress bars.
    pub fn println(&self, msg: impl AsRef<str>) {
        if self.is_tty {
            let _ = self.multi.println(msg);
        } else {
            eprintln!("{}", msg.as_ref());
        }
    }

    pub fn is_tty(&self) -> bool {
        self.is_tty
    }

    /// Get reference to `MultiProgress` for the log bridge.
    pub fn multi(&self) -> &MultiProgress {
        &self.multi
    }
}

impl Default for ProgressContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Thread-safe wrapper for `ProgressContext`.
pub type SharedProgress = Arc<ProgressContext>;

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

/// Percentage of `part` in `total` with one decimal, `0.0` for an empty total.
pub fn fmt_pct(part: usize, total: usize) -> String {
    if total == 0 {
        return "0.0".to_string();
    }
    format!("{:.1}", part as f64 / total as f64 * 100.0)
}
