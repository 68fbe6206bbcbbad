#![allow(dead_code)]

use filetime::{set_file_mtime, FileTime};
use std::collections::HashMap;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tidyup_core::{Action, AppConfig, Category, Choice, Chooser, Error};

pub const NOW: i64 = 1_700_000_000;
pub const NEWER: i64 = NOW - 1800;
pub const OLDER: i64 = NOW - 3600;

pub struct Fixture {
    pub root: PathBuf,
    pub config: AppConfig,
}

impl Fixture {
    pub fn x(&self, name: &str) -> PathBuf {
        self.root.join("x").join(name)
    }

    pub fn y1(&self, name: &str) -> PathBuf {
        self.root.join("y1").join(name)
    }

    pub fn y2(&self, name: &str) -> PathBuf {
        self.root.join("y2").join(name)
    }
}

pub fn create_file(path: &Path, content: &str, mtime: i64, mode: u32) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
    fs::set_permissions(path, fs::Permissions::from_mode(mode)).unwrap();
    set_file_mtime(path, FileTime::from_unix_time(mtime, 0)).unwrap();
}

/// Three folders, `x` primary, holding one or more files for every category.
///
/// ```text
/// x/   doc.txt  original.txt  photo#album.jpg  temp.tmp
/// y1/  copy.txt  doc.txt  empty.txt  executable.txt  file.bak  normal1.txt  test:file*.txt
/// y2/  doc space.txt  doc.txt  duplicate.txt  normal2.txt  note.txt~  write_all.txt  zero.txt
/// ```
pub fn create_fixture_tree(root: &Path) -> Fixture {
    let dirs: Vec<PathBuf> = ["x", "y1", "y2"].iter().map(|d| root.join(d)).collect();
    for dir in &dirs {
        fs::create_dir_all(dir).unwrap();
    }
    let fixture = Fixture {
        root: root.to_path_buf(),
        config: AppConfig {
            scan_dirs: dirs,
            actions_file: root.join("actions.json"),
            ..AppConfig::default()
        },
    };

    // Empty
    create_file(&fixture.y1("empty.txt"), "", NOW, 0o644);
    create_file(&fixture.y2("zero.txt"), "", OLDER, 0o644);

    // Temporary
    create_file(&fixture.y1("file.bak"), "Temp file", NOW, 0o644);
    create_file(&fixture.x("temp.tmp"), "Temporary content", OLDER, 0o644);
    create_file(&fixture.y2("note.txt~"), "Backup note", NEWER, 0o644);

    // Problematic characters
    create_file(&fixture.y1("test:file*.txt"), "File with bad chars", NOW, 0o644);
    create_file(&fixture.y2("doc space.txt"), "File with space", OLDER, 0o644);
    create_file(&fixture.x("photo#album.jpg"), "Photo file", NEWER, 0o644);

    // Non-standard permissions
    create_file(&fixture.y1("executable.txt"), "Executable file", NOW, 0o777);
    create_file(&fixture.y2("write_all.txt"), "All write access", OLDER, 0o777);

    // Same name, different modification times
    create_file(&fixture.x("doc.txt"), "Document in x", OLDER, 0o644);
    create_file(&fixture.y1("doc.txt"), "Document in y1", NEWER, 0o644);
    create_file(&fixture.y2("doc.txt"), "Document in y2", NOW, 0o644);

    // Same content, different names
    let duplicate_content = "This is a duplicate file content.";
    create_file(&fixture.x("original.txt"), duplicate_content, OLDER, 0o644);
    create_file(&fixture.y1("copy.txt"), duplicate_content, NEWER, 0o644);
    create_file(&fixture.y2("duplicate.txt"), duplicate_content, NOW, 0o644);

    // Plain files outside the primary folder
    create_file(&fixture.y1("normal1.txt"), "Normal file 1", NOW, 0o644);
    create_file(&fixture.y2("normal2.txt"), "Normal file 2", OLDER, 0o644);

    fixture
}

pub fn mode_of(path: &Path) -> u32 {
    fs::metadata(path).unwrap().permissions().mode() & 0o7777
}

pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .flatten()
        .filter(|e| e.path().is_file())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// Answers from a script and remembers what it was asked.
#[derive(Default)]
pub struct ScriptedChooser {
    /// Per-file answers by category; categories not listed get the proposed kind.
    pub file_answers: HashMap<Category, Choice>,
    pub groups: Vec<Category>,
    pub group_answers: HashMap<Category, Choice>,
    pub asked_files: Vec<(Category, Action)>,
    pub asked_groups: Vec<(Category, Vec<Action>)>,
}

impl Chooser for ScriptedChooser {
    fn choose_for_file(
        &mut self,
        category: Category,
        action: &Action,
        offered: &[Choice],
    ) -> Result<Choice, Error> {
        self.asked_files.push((category, action.clone()));
        Ok(self
            .file_answers
            .get(&category)
            .copied()
            .unwrap_or(offered[0]))
    }

    fn choose_for_group(
        &mut self,
        category: Category,
        actions: &[Action],
        _offered: &[Choice],
    ) -> Result<Choice, Error> {
        self.asked_groups.push((category, actions.to_vec()));
        Ok(self
            .group_answers
            .get(&category)
            .copied()
            .unwrap_or(Choice::Skip))
    }

    fn select_groups(&mut self, _available: &[(Category, usize)]) -> Result<Vec<Category>, Error> {
        Ok(self.groups.clone())
    }
}
