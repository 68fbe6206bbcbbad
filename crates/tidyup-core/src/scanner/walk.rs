use crate::model::FileRecord;
use crate::platform;
use glob::Pattern;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, error, warn};
use walkdir::WalkDir;

/// Sequential directory traversal over every scan root, in root order.
/// Roots that do not exist are skipped. Entries are visited in file-name
/// order so repeated scans of the same tree list files identically.
/// A path reached through two roots is recorded once. Paths that are not
/// valid UTF-8 are skipped: their names cannot be compared or saved faithfully.
pub fn collect_files(
    root_paths: &[PathBuf],
    ignore_globs: &[String],
    mut on_file: impl FnMut(usize, &Path),
) -> Vec<FileRecord> {
    let ignore_patterns: Vec<Pattern> = ignore_globs
        .iter()
        .filter_map(|glob| match Pattern::new(glob) {
            Ok(p) => Some(p),
            Err(e) => {
                error!("Invalid glob pattern '{}': {}", glob, e);
                None
            }
        })
        .collect();

    let mut files = Vec::new();
    let mut seen = HashSet::new();
    for root in root_paths {
        if !root.is_dir() {
            debug!("Scan root {} does not exist, skipping", root.display());
            continue;
        }
        visit_root(root, &ignore_patterns, &mut seen, &mut files, &mut on_file);
    }
    files
}

fn visit_root(
    root: &Path,
    ignore_patterns: &[Pattern],
    seen: &mut HashSet<PathBuf>,
    files: &mut Vec<FileRecord>,
    on_file: &mut impl FnMut(usize, &Path),
) {
    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            !ignore_patterns
                .iter()
                .any(|pattern| pattern.matches_path(entry.path()))
        });

    for entry_result in walker {
        let entry = match entry_result {
            Ok(entry) => entry,
            Err(err) => {
                warn!("Error walking {}: {}", root.display(), err);
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let name = match (path.to_str(), entry.file_name().to_str()) {
            (Some(_), Some(name)) => name.to_string(),
            _ => {
                warn!("Skipping {}: path is not valid UTF-8", path.display());
                continue;
            }
        };
        if seen.contains(path) {
            debug!("{} already scanned through another root", path.display());
            continue;
        }
        let metadata = match entry.metadata() {
            Ok(metadata) => metadata,
            Err(err) => {
                warn!("Error getting metadata for {}: {}", path.display(), err);
                continue;
            }
        };
        let modified = match metadata.modified() {
            Ok(modified) => modified,
            Err(err) => {
                warn!("No modification time for {}: {}", path.display(), err);
                continue;
            }
        };

        seen.insert(path.to_path_buf());
        files.push(FileRecord {
            path: path.to_path_buf(),
            name,
            modified,
            size: metadata.len(),
            mode: platform::permission_bits(&metadata),
            source_dir: root.to_path_buf(),
        });
        on_file(files.len(), path);
    }
}
