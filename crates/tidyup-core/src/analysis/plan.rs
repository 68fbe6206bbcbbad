use crate::model::{Action, ActionGroups, ActionKind, Category};
use crate::tracker::RunState;
use std::path::{Path, PathBuf};
use tracing::debug;

/// An action after its target has been checked against the run state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rebound {
    Ready(Action),
    /// The file is already gone this run; carries the resolved path.
    Deleted(PathBuf),
}

/// Point `action` at the file's current path. Destinations are left as stored.
pub fn resolve_target(action: &Action, state: &RunState) -> Rebound {
    let current = state.resolve(&action.path);
    if state.is_deleted(&action.path) {
        return Rebound::Deleted(current);
    }
    Rebound::Ready(action.with_path(current))
}

/// Like [`resolve_target`], and a `move_to_x` move is re-aimed at
/// `primary/<current name>` so an earlier rename carries through to the
/// destination.
pub fn rebind(category: Category, action: &Action, state: &RunState, primary: &Path) -> Rebound {
    let ready = match resolve_target(action, state) {
        Rebound::Ready(ready) => ready,
        deleted => return deleted,
    };

    match (&ready.kind, category) {
        (ActionKind::Move { .. }, Category::MoveToX) => match ready.path.file_name() {
            Some(name) => {
                let kind = ActionKind::Move {
                    new_path: primary.join(name),
                };
                Rebound::Ready(ready.with_kind(kind))
            }
            None => Rebound::Ready(ready),
        },
        _ => Rebound::Ready(ready),
    }
}

/// Fold the planned renames and deletions into the `move_to_x` group without
/// touching the disk: moves pick up sanitized names, and files that another
/// group already deletes are not moved at all.
pub fn reconcile(groups: &ActionGroups, primary: &Path) -> ActionGroups {
    let mut simulated = RunState::new();
    for action in groups.get(Category::BadChars) {
        if let ActionKind::Rename { new_path } = &action.kind {
            simulated.record_rename(&action.path, new_path);
        }
    }
    for category in [
        Category::Empty,
        Category::Temporary,
        Category::SameName,
        Category::Duplicates,
    ] {
        for action in groups.get(category) {
            if action.kind == ActionKind::Delete {
                simulated.record_delete(&action.path);
            }
        }
    }

    let mut reconciled = groups.clone();
    reconciled.move_to_x = groups
        .get(Category::MoveToX)
        .iter()
        .filter_map(
            |action| match rebind(Category::MoveToX, action, &simulated, primary) {
                Rebound::Ready(ready) => Some(ready),
                Rebound::Deleted(path) => {
                    debug!("Not moving {}: planned for deletion", path.display());
                    None
                }
            },
        )
        .collect();
    reconciled
}
