//! Step progress for the orchestrator
//!
//! One bar counts finished steps. Announcements go above the bar when it is
//! drawn and straight to stdout when it is hidden.

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

/// Overall step counter plus the line printer that goes with it
#[derive(Debug)]
pub struct StepProgress {
    bar: ProgressBar,
}

impl StepProgress {
    /// Create a bar over `total` steps; hidden unless `show`
    pub fn new(total: usize, show: bool) -> Self {
        let bar = if show {
            create_step_bar(total as u64)
        } else {
            ProgressBar::hidden()
        };
        Self { bar }
    }

    /// Print a line without tearing the bar
    pub fn println(&self, line: impl AsRef<str>) {
        if self.bar.is_hidden() {
            println!("{}", line.as_ref());
        } else {
            self.bar.println(line.as_ref());
        }
    }

    /// Announce a step: blank line, bold label, then the command
    pub fn begin(&self, label: &str, command: &str) {
        self.bar.set_message(label.to_string());
        self.println(format!("\n{}", label.bold()));
        self.println(command.dimmed().to_string());
    }

    pub fn complete_step(&self) {
        self.bar.inc(1);
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }

    /// Leave the bar where it stopped
    pub fn abandon(&self) {
        self.bar.abandon();
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }
}

fn create_step_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    if let Ok(style) =
        ProgressStyle::default_bar().template("{spinner:.green} {msg} [{bar:30.cyan/blue}] {pos}/{len}")
    {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_hidden_progress_counts_steps() {
        let progress = StepProgress::new(7, false);
        progress.complete_step();
        progress.complete_step();
        assert_eq!(progress.position(), 2);
        progress.finish();
    }

    #[test]
    fn test_visible_bar_length() {
        let progress = StepProgress::new(7, true);
        assert_eq!(progress.bar.length(), Some(7));
        progress.abandon();
    }
}
