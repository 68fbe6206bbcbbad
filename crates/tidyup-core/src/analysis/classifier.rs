use crate::config::AppConfig;
use crate::model::{Action, ActionGroups, ActionKind, Category, DuplicateIndex, FileRecord};
use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::debug;

/// Turn an inventory into proposed actions, grouped by category.
///
/// Pure: reads nothing from disk. A file may show up in several categories,
/// except that an empty file only ever shows up under `empty`.
pub fn classify(
    files: &[FileRecord],
    duplicates: &DuplicateIndex,
    config: &AppConfig,
) -> ActionGroups {
    let mut groups = ActionGroups::new();

    let mut non_empty: Vec<&FileRecord> = Vec::with_capacity(files.len());
    for file in files {
        if file.is_empty() {
            groups.push(
                Category::Empty,
                Action::new(&file.path, ActionKind::Delete, "Empty file"),
            );
        } else {
            non_empty.push(file);
        }
    }

    for file in &non_empty {
        if is_temporary(&file.path, &config.temp_extensions) {
            groups.push(
                Category::Temporary,
                Action::new(&file.path, ActionKind::Delete, "Temporary file"),
            );
        }

        if has_bad_chars(&file.name, config) {
            let new_name = sanitize_filename(&file.name, config);
            let new_path = match file.path.parent() {
                Some(parent) => parent.join(new_name),
                None => new_name.into(),
            };
            groups.push(
                Category::BadChars,
                Action::new(
                    &file.path,
                    ActionKind::Rename { new_path },
                    "Problematic characters in name",
                ),
            );
        }

        if file.mode != config.canonical_mode {
            groups.push(
                Category::NonstandardPerms,
                Action::new(
                    &file.path,
                    ActionKind::Chmod {
                        new_mode: config.canonical_mode,
                    },
                    format!("Non-standard permissions ({:o})", file.mode),
                ),
            );
        }
    }

    propose_same_name(&non_empty, &mut groups);
    propose_duplicates(&non_empty, duplicates, &mut groups);

    let primary = config.primary_dir();
    for file in &non_empty {
        if file.path.parent() != Some(primary) {
            groups.push(
                Category::MoveToX,
                Action::new(
                    &file.path,
                    ActionKind::Move {
                        new_path: primary.join(&file.name),
                    },
                    format!("Move to {}", primary.display()),
                ),
            );
        }
    }

    debug!(
        "Classified {} files into {} proposed actions",
        files.len(),
        groups.total()
    );
    groups
}

/// Keep the newest file of each name, propose deleting the others.
fn propose_same_name(files: &[&FileRecord], groups: &mut ActionGroups) {
    let mut by_name: BTreeMap<&str, Vec<&FileRecord>> = BTreeMap::new();
    for file in files {
        by_name.entry(file.name.as_str()).or_default().push(file);
    }

    for (name, mut members) in by_name {
        if members.len() < 2 {
            continue;
        }
        members.sort_by(|a, b| {
            Reverse(a.modified)
                .cmp(&Reverse(b.modified))
                .then_with(|| a.path.cmp(&b.path))
        });
        let newest = members[0];
        for older in &members[1..] {
            groups.push(
                Category::SameName,
                Action::new(
                    &older.path,
                    ActionKind::Delete,
                    format!(
                        "Older version of {}, newer exists at {}",
                        name,
                        newest.path.display()
                    ),
                ),
            );
        }
    }
}

/// Keep the oldest copy of each content hash, propose deleting the others.
/// Equal timestamps fall back to path order.
fn propose_duplicates(
    files: &[&FileRecord],
    duplicates: &DuplicateIndex,
    groups: &mut ActionGroups,
) {
    let by_path: HashMap<&Path, &FileRecord> =
        files.iter().map(|file| (file.path.as_path(), *file)).collect();

    for (_, paths) in duplicates.groups() {
        let mut members: Vec<&FileRecord> = paths
            .iter()
            .filter_map(|path| by_path.get(path.as_path()).copied())
            .collect();
        if members.len() < 2 {
            continue;
        }
        members.sort_by(|a, b| a.modified.cmp(&b.modified).then_with(|| a.path.cmp(&b.path)));
        let oldest = members[0];
        for copy in &members[1..] {
            groups.push(
                Category::Duplicates,
                Action::new(
                    &copy.path,
                    ActionKind::Delete,
                    format!("Duplicate of {}", oldest.path.display()),
                ),
            );
        }
    }
}

pub fn is_temporary(path: &Path, temp_extensions: &[String]) -> bool {
    let path = path.to_string_lossy();
    temp_extensions.iter().any(|ext| path.ends_with(ext.as_str()))
}

pub fn has_bad_chars(name: &str, config: &AppConfig) -> bool {
    name.chars().any(|c| config.is_bad_char(c))
}

/// Replace every disallowed character with the replacement character.
pub fn sanitize_filename(name: &str, config: &AppConfig) -> String {
    name.chars()
        .map(|c| {
            if config.is_bad_char(c) {
                config.replace_char
            } else {
                c
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    fn at(secs: u64) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(1_700_000_000 + secs)
    }

    fn record(root: &str, rel: &str, size: u64, modified: SystemTime) -> FileRecord {
        let path = Path::new(root).join(rel);
        FileRecord {
            name: path.file_name().unwrap().to_string_lossy().into_owned(),
            path,
            modified,
            size,
            mode: 0o644,
            source_dir: PathBuf::from(root),
        }
    }

    fn paths(actions: &[Action]) -> Vec<PathBuf> {
        actions.iter().map(|a| a.path.clone()).collect()
    }

    #[test]
    fn test_sanitize_filename() {
        let config = AppConfig::default();
        assert_eq!(sanitize_filename("test:file*.txt", &config), "test_file_.txt");
        assert_eq!(sanitize_filename("doc space.txt", &config), "doc_space.txt");
        assert_eq!(sanitize_filename("plain.txt", &config), "plain.txt");
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        let config = AppConfig::default();
        for name in ["a:b*c?.txt", "photo#album.jpg", "<>|\"", "ok"] {
            let once = sanitize_filename(name, &config);
            assert_eq!(sanitize_filename(&once, &config), once);
            assert!(!has_bad_chars(&once, &config));
        }
    }

    #[test]
    fn test_empty_file_only_in_empty_group() {
        let config = AppConfig::default();
        // Empty, temporary, badly named, wrong mode and outside the primary dir.
        let mut file = record("y1", "bad name.tmp", 0, at(0));
        file.mode = 0o777;
        let files = vec![file];

        let groups = classify(&files, &DuplicateIndex::new(), &config);
        assert_eq!(groups.empty.len(), 1);
        assert_eq!(groups.empty[0].kind, ActionKind::Delete);
        assert_eq!(groups.total(), 1);
    }

    #[test]
    fn test_empty_files_are_not_duplicates_of_each_other() {
        let config = AppConfig::default();
        let files = vec![record("x", "a", 0, at(0)), record("x", "b", 0, at(1))];
        let mut index = DuplicateIndex::new();
        for file in &files {
            index.insert("empty-hash".into(), file.path.clone());
        }

        let groups = classify(&files, &index, &config);
        assert_eq!(groups.empty.len(), 2);
        assert!(groups.duplicates.is_empty());
    }

    #[test]
    fn test_same_name_keeps_newest() {
        let config = AppConfig::default();
        let files = vec![
            record("x", "doc.txt", 5, at(0)),
            record("y1", "doc.txt", 5, at(1800)),
            record("y2", "doc.txt", 5, at(3600)),
        ];

        let groups = classify(&files, &DuplicateIndex::new(), &config);
        assert_eq!(
            paths(&groups.same_name),
            vec![PathBuf::from("y1/doc.txt"), PathBuf::from("x/doc.txt")]
        );
        assert!(groups
            .same_name
            .iter()
            .all(|a| a.kind == ActionKind::Delete && a.reason.contains("y2/doc.txt")));
    }

    #[test]
    fn test_duplicates_keep_oldest() {
        let config = AppConfig::default();
        let files = vec![
            record("x", "original.txt", 10, at(0)),
            record("y1", "copy.txt", 10, at(100)),
        ];
        let mut index = DuplicateIndex::new();
        index.insert("h".into(), PathBuf::from("y1/copy.txt"));
        index.insert("h".into(), PathBuf::from("x/original.txt"));

        let groups = classify(&files, &index, &config);
        assert_eq!(groups.duplicates.len(), 1);
        assert_eq!(groups.duplicates[0].path, PathBuf::from("y1/copy.txt"));
        assert_eq!(groups.duplicates[0].reason, "Duplicate of x/original.txt");
    }

    #[test]
    fn test_duplicate_tie_breaks_on_path() {
        let config = AppConfig::default();
        let files = vec![
            record("y2", "b.txt", 3, at(7)),
            record("y1", "a.txt", 3, at(7)),
        ];
        let mut index = DuplicateIndex::new();
        for file in &files {
            index.insert("h".into(), file.path.clone());
        }

        let groups = classify(&files, &index, &config);
        assert_eq!(paths(&groups.duplicates), vec![PathBuf::from("y2/b.txt")]);
    }

    #[test]
    fn test_per_file_rules() {
        let config = AppConfig::default();
        let mut wide_open = record("x", "run.txt", 3, at(0));
        wide_open.mode = 0o777;
        let files = vec![
            record("y2", "note.txt~", 3, at(0)),
            record("y1", "test:file*.txt", 3, at(0)),
            wide_open,
            record("x", "sub/deep.txt", 3, at(0)),
        ];

        let groups = classify(&files, &DuplicateIndex::new(), &config);
        assert_eq!(paths(&groups.temporary), vec![PathBuf::from("y2/note.txt~")]);
        assert_eq!(
            groups.bad_chars[0].kind,
            ActionKind::Rename {
                new_path: PathBuf::from("y1/test_file_.txt")
            }
        );
        assert_eq!(
            groups.nonstandard_perms[0].kind,
            ActionKind::Chmod { new_mode: 0o644 }
        );
        assert_eq!(
            paths(&groups.move_to_x),
            vec![
                PathBuf::from("y2/note.txt~"),
                PathBuf::from("y1/test:file*.txt"),
                PathBuf::from("x/sub/deep.txt"),
            ]
        );
        assert_eq!(
            groups.move_to_x[1].kind,
            ActionKind::Move {
                new_path: PathBuf::from("x/test:file*.txt")
            }
        );
    }

    #[test]
    fn test_classification_is_deterministic() {
        let config = AppConfig::default();
        let files = vec![
            record("x", "doc.txt", 5, at(0)),
            record("y1", "doc.txt", 5, at(9)),
            record("y2", "a#b", 5, at(3)),
        ];
        let mut index = DuplicateIndex::new();
        for file in &files {
            index.insert("same".into(), file.path.clone());
        }
        assert_eq!(
            classify(&files, &index, &config),
            classify(&files, &index, &config)
        );
    }
}
