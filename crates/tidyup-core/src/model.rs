use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// A file as it existed when the scan saw it. The path may go stale once the
/// executor starts renaming and moving things.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub path: PathBuf,
    pub name: String,
    pub modified: SystemTime,
    pub size: u64,
    pub mode: u32,
    /// The scan root this file was found under.
    pub source_dir: PathBuf,
}

impl FileRecord {
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }
}

/// Content hash → paths sharing it. Singleton entries are kept; the
/// classifier decides what counts as a duplicate group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DuplicateIndex {
    by_hash: BTreeMap<String, Vec<PathBuf>>,
}

impl DuplicateIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, hash: String, path: PathBuf) {
        let paths = self.by_hash.entry(hash).or_default();
        if !paths.contains(&path) {
            paths.push(path);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[PathBuf])> {
        self.by_hash
            .iter()
            .map(|(hash, paths)| (hash.as_str(), paths.as_slice()))
    }

    /// Only the hashes shared by more than one path.
    pub fn groups(&self) -> impl Iterator<Item = (&str, &[PathBuf])> {
        self.iter().filter(|(_, paths)| paths.len() > 1)
    }

    pub fn len(&self) -> usize {
        self.by_hash.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_hash.is_empty()
    }
}

/// The seven fixed classification buckets, in rule and execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Empty,
    Temporary,
    BadChars,
    NonstandardPerms,
    SameName,
    Duplicates,
    MoveToX,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Empty,
        Category::Temporary,
        Category::BadChars,
        Category::NonstandardPerms,
        Category::SameName,
        Category::Duplicates,
        Category::MoveToX,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Empty => "empty",
            Category::Temporary => "temporary",
            Category::BadChars => "bad_chars",
            Category::NonstandardPerms => "nonstandard_perms",
            Category::SameName => "same_name",
            Category::Duplicates => "duplicates",
            Category::MoveToX => "move_to_x",
        }
    }

    /// "bad_chars" → "Bad Chars"
    pub fn title(self) -> String {
        self.as_str()
            .split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                }
            })
            .collect::<Vec<String>>()
            .join(" ")
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What to do with a file. Each kind carries only the fields it needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum ActionKind {
    Delete,
    Move { new_path: PathBuf },
    Rename { new_path: PathBuf },
    Chmod { new_mode: u32 },
    Keep,
}

impl ActionKind {
    pub fn name(&self) -> &'static str {
        match self {
            ActionKind::Delete => "delete",
            ActionKind::Move { .. } => "move",
            ActionKind::Rename { .. } => "rename",
            ActionKind::Chmod { .. } => "chmod",
            ActionKind::Keep => "keep",
        }
    }

    pub fn destination(&self) -> Option<&Path> {
        match self {
            ActionKind::Move { new_path } | ActionKind::Rename { new_path } => Some(new_path),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub path: PathBuf,
    #[serde(flatten)]
    pub kind: ActionKind,
    pub reason: String,
}

impl Action {
    pub fn new(path: impl Into<PathBuf>, kind: ActionKind, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind,
            reason: reason.into(),
        }
    }

    /// Same action aimed at a different file.
    pub fn with_path(&self, path: PathBuf) -> Self {
        Self {
            path,
            ..self.clone()
        }
    }

    pub fn with_kind(&self, kind: ActionKind) -> Self {
        Self {
            kind,
            ..self.clone()
        }
    }
}

/// Category → ordered proposed actions. This is also the snapshot layout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionGroups {
    pub empty: Vec<Action>,
    pub temporary: Vec<Action>,
    pub bad_chars: Vec<Action>,
    pub nonstandard_perms: Vec<Action>,
    pub same_name: Vec<Action>,
    pub duplicates: Vec<Action>,
    pub move_to_x: Vec<Action>,
}

impl ActionGroups {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, category: Category) -> &[Action] {
        match category {
            Category::Empty => &self.empty,
            Category::Temporary => &self.temporary,
            Category::BadChars => &self.bad_chars,
            Category::NonstandardPerms => &self.nonstandard_perms,
            Category::SameName => &self.same_name,
            Category::Duplicates => &self.duplicates,
            Category::MoveToX => &self.move_to_x,
        }
    }

    pub fn get_mut(&mut self, category: Category) -> &mut Vec<Action> {
        match category {
            Category::Empty => &mut self.empty,
            Category::Temporary => &mut self.temporary,
            Category::BadChars => &mut self.bad_chars,
            Category::NonstandardPerms => &mut self.nonstandard_perms,
            Category::SameName => &mut self.same_name,
            Category::Duplicates => &mut self.duplicates,
            Category::MoveToX => &mut self.move_to_x,
        }
    }

    pub fn push(&mut self, category: Category, action: Action) {
        self.get_mut(category).push(action);
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, &[Action])> {
        Category::ALL
            .into_iter()
            .map(move |category| (category, self.get(category)))
    }

    /// Categories that have at least one action, with their sizes.
    pub fn non_empty(&self) -> Vec<(Category, usize)> {
        self.iter()
            .filter(|(_, actions)| !actions.is_empty())
            .map(|(category, actions)| (category, actions.len()))
            .collect()
    }

    pub fn total(&self) -> usize {
        self.iter().map(|(_, actions)| actions.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}
