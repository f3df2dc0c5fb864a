// src/progress.rs
//! Progress display for the fetch and check phases

use indicatif::{ProgressBar, ProgressStyle};

/// Progress bar counting completed tasks of one phase
///
/// A hidden bar is used when progress output is disabled, so callers never
/// need to branch on it.
pub struct PhaseProgress {
    bar: ProgressBar,
}

impl PhaseProgress {
    pub fn new(label: &str, total: usize, visible: bool) -> Self {
        let bar = if visible {
            let bar = ProgressBar::new(total as u64);
            if let Ok(style) = ProgressStyle::default_bar()
                .template("{msg} ({pos}/{len}) [{bar:40.green/dim}] {percent}%")
            {
                bar.set_style(style.progress_chars("##-"));
            }
            bar
        } else {
            ProgressBar::hidden()
        };
        bar.set_message(label.to_string());
        Self { bar }
    }

    /// Record one finished task
    pub fn complete(&self) {
        self.bar.inc(1);
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hidden_progress_counts() {
        let progress = PhaseProgress::new("Fetching", 3, false);
        progress.complete();
        progress.complete();
        assert_eq!(progress.bar.position(), 2);
        progress.finish();
    }
}
