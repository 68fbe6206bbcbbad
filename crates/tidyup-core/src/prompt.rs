use crate::error::Error;
use crate::model::{Action, ActionKind, Category};
use std::fmt;

/// An answer to "what should happen to this file (or group)?".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Choice {
    Delete,
    Move,
    Rename,
    Chmod,
    Keep,
    Skip,
}

impl Choice {
    pub fn for_kind(kind: &ActionKind) -> Choice {
        match kind {
            ActionKind::Delete => Choice::Delete,
            ActionKind::Move { .. } => Choice::Move,
            ActionKind::Rename { .. } => Choice::Rename,
            ActionKind::Chmod { .. } => Choice::Chmod,
            ActionKind::Keep => Choice::Keep,
        }
    }

    pub fn key(self) -> char {
        match self {
            Choice::Delete => 'd',
            Choice::Move => 'm',
            Choice::Rename => 'r',
            Choice::Chmod => 'c',
            Choice::Keep => 'k',
            Choice::Skip => 's',
        }
    }

    pub fn from_key(key: &str) -> Option<Choice> {
        match key.trim().to_lowercase().as_str() {
            "d" | "delete" => Some(Choice::Delete),
            "m" | "move" => Some(Choice::Move),
            "r" | "rename" => Some(Choice::Rename),
            "c" | "chmod" => Some(Choice::Chmod),
            "k" | "keep" => Some(Choice::Keep),
            "s" | "skip" => Some(Choice::Skip),
            _ => None,
        }
    }

    /// The kinds proposed for `actions`, followed by keep and skip.
    pub fn offered_for(actions: &[Action]) -> Vec<Choice> {
        let mut offered: Vec<Choice> = Vec::new();
        for choice in [Choice::Delete, Choice::Move, Choice::Rename, Choice::Chmod] {
            if actions.iter().any(|a| Choice::for_kind(&a.kind) == choice) {
                offered.push(choice);
            }
        }
        offered.push(Choice::Keep);
        offered.push(Choice::Skip);
        offered
    }

    /// What `action` becomes under this choice. `None` means leave the file
    /// alone: an explicit skip, or a kind this action was never proposed with.
    pub fn apply(self, action: &Action) -> Option<Action> {
        match self {
            Choice::Skip => None,
            Choice::Keep => Some(action.with_kind(ActionKind::Keep)),
            choice if choice == Choice::for_kind(&action.kind) => Some(action.clone()),
            _ => None,
        }
    }
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Choice::Delete => "delete",
            Choice::Move => "move",
            Choice::Rename => "rename",
            Choice::Chmod => "chmod",
            Choice::Keep => "keep",
            Choice::Skip => "skip",
        };
        write!(f, "{}: {}", self.key(), label)
    }
}

/// The "ask the user" capability the interactive modes depend on.
///
/// The CLI implements this over stdin; tests script the answers. Every
/// method must return one of the options it was offered.
pub trait Chooser {
    /// One proposed action, already resolved to the file's current path.
    fn choose_for_file(
        &mut self,
        category: Category,
        action: &Action,
        offered: &[Choice],
    ) -> Result<Choice, Error>;

    /// One decision applied to every action in the group.
    fn choose_for_group(
        &mut self,
        category: Category,
        actions: &[Action],
        offered: &[Choice],
    ) -> Result<Choice, Error>;

    /// Which of the non-empty groups to work through.
    fn select_groups(&mut self, available: &[(Category, usize)]) -> Result<Vec<Category>, Error>;
}
