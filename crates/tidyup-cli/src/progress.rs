use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::cell::RefCell;
use std::path::Path;
use std::time::Duration;
use tidyup_core::{Category, Outcome, ProgressReporter};

const TICK_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// CLI progress reporter using indicatif progress bars.
///
/// - Scan phase: spinner (unknown total files upfront)
/// - Hash phase: progress bar (total files known from scan)
/// - Execution: one coloured line per outcome on stdout
pub struct CliReporter {
    bar: RefCell<Option<ProgressBar>>,
}

impl CliReporter {
    pub fn new() -> Self {
        Self {
            bar: RefCell::new(None),
        }
    }

    fn set_bar(&self, pb: ProgressBar) {
        if let Some(old) = self.bar.borrow_mut().replace(pb) {
            old.finish_and_clear();
        }
    }

    fn finish_bar(&self) {
        if let Some(pb) = self.bar.borrow_mut().take() {
            pb.finish_and_clear();
        }
    }

    fn spinner(message: &'static str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_chars(TICK_CHARS),
        );
        pb.set_message(message);
        pb.enable_steady_tick(Duration::from_millis(80));
        pb
    }
}

impl ProgressReporter for CliReporter {
    fn on_scan_start(&self) {
        self.set_bar(Self::spinner("Scanning files..."));
    }

    fn on_scan_progress(&self, files_found: usize, _current_path: &Path) {
        if let Some(pb) = self.bar.borrow().as_ref() {
            pb.set_message(format!("Scanning... {} files found", files_found));
        }
    }

    fn on_scan_complete(&self, total_files: usize, duration_secs: f64) {
        self.finish_bar();
        eprintln!(
            "  {} Scan complete: {} files in {:.2}s",
            "✓".green(),
            total_files,
            duration_secs
        );
    }

    fn on_hash_start(&self) {
        // Length is set on the first on_hash_progress call.
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::with_template(
                "  {spinner:.cyan} Hashing [{bar:30.cyan/dim}] {pos}/{len} files ({eta} remaining)",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("━╸─")
            .tick_chars(TICK_CHARS),
        );
        pb.enable_steady_tick(Duration::from_millis(80));
        self.set_bar(pb);
    }

    fn on_hash_progress(&self, files_hashed: usize, total_files: usize) {
        if let Some(pb) = self.bar.borrow().as_ref() {
            if pb.length() != Some(total_files as u64) {
                pb.set_length(total_files as u64);
            }
            pb.set_position(files_hashed as u64);
        }
    }

    fn on_hash_complete(&self, total_dupes: usize, duration_secs: f64) {
        self.finish_bar();
        eprintln!(
            "  {} Hash complete: {} duplicate groups in {:.2}s",
            "✓".green(),
            total_dupes,
            duration_secs
        );
    }

    fn on_outcome(&self, category: Category, outcome: &Outcome) {
        let line = outcome.to_string();
        let line = match outcome {
            Outcome::Failed { .. } => line.red(),
            Outcome::Skipped { .. } => line.yellow(),
            Outcome::Kept { .. } => line.normal(),
            _ => line.green(),
        };
        println!("[{}] {}", category.as_str().dimmed(), line);
    }

    fn on_snapshot_saved(&self, path: &Path) {
        println!("Saved actions to {}", path.display().to_string().cyan());
    }
}
