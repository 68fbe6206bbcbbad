use crate::executor::Outcome;
use crate::model::Category;
use std::path::Path;

/// Trait for reporting scan progress and the per-action result stream.
///
/// CLI implements with indicatif and coloured output lines.
/// All methods have default no-op implementations.
pub trait ProgressReporter {
    fn on_scan_start(&self) {}
    fn on_scan_progress(&self, _files_found: usize, _current_path: &Path) {}
    fn on_scan_complete(&self, _total_files: usize, _duration_secs: f64) {}
    fn on_hash_start(&self) {}
    fn on_hash_progress(&self, _files_hashed: usize, _total_files: usize) {}
    fn on_hash_complete(&self, _total_dupes: usize, _duration_secs: f64) {}
    fn on_outcome(&self, _category: Category, _outcome: &Outcome) {}
    fn on_snapshot_saved(&self, _path: &Path) {}
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}
