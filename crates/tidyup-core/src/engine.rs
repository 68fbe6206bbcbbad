use crate::config::{self, AppConfig};
use crate::hasher;
use crate::model::{DuplicateIndex, FileRecord};
use crate::progress::ProgressReporter;
use crate::scanner;
use std::time::{Duration, Instant};
use tracing::{debug, info};

pub struct ScanEngine {
    config: AppConfig,
}

/// Everything the classifier needs, recomputed on every non-replay run.
#[derive(Debug)]
pub struct Inventory {
    pub files: Vec<FileRecord>,
    pub duplicates: DuplicateIndex,
    pub scan_duration: Duration,
    pub hash_duration: Duration,
}

impl Inventory {
    pub fn duplicate_groups(&self) -> usize {
        self.duplicates.groups().count()
    }
}

impl ScanEngine {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Run the inventory pipeline:
    /// 1. Walk every scan root, collecting metadata
    /// 2. Hash each file's content and build the duplicate index
    ///
    /// Per-file failures are logged and the file is left out; the scan itself
    /// does not fail.
    pub fn scan(&self, reporter: &dyn ProgressReporter) -> Inventory {
        let roots = config::non_overlapping_directories(&self.config.scan_dirs);
        info!("Processing directories: {:?}", roots);

        // Phase 1: Walk
        reporter.on_scan_start();
        let scan_start = Instant::now();
        let files = scanner::collect_files(
            &roots,
            &self.config.ignore_patterns,
            |found, path| reporter.on_scan_progress(found, path),
        );
        let scan_duration = scan_start.elapsed();
        reporter.on_scan_complete(files.len(), scan_duration.as_secs_f64());
        debug!(
            "Walk completed in {:.2}s: {} files",
            scan_duration.as_secs_f64(),
            files.len(),
        );

        // Phase 2: Hash
        reporter.on_hash_start();
        let hash_start = Instant::now();
        let (files, duplicates) = hasher::build_duplicate_index(files, |done, total| {
            reporter.on_hash_progress(done, total)
        });
        let hash_duration = hash_start.elapsed();

        let inventory = Inventory {
            files,
            duplicates,
            scan_duration,
            hash_duration,
        };
        let dupe_group_count = inventory.duplicate_groups();
        reporter.on_hash_complete(dupe_group_count, hash_duration.as_secs_f64());
        debug!(
            "Hash completed in {:.2}s: {} duplicate groups",
            hash_duration.as_secs_f64(),
            dupe_group_count,
        );

        inventory
    }
}
