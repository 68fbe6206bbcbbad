use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::trace;

/// Run-scoped record of what the executor has already done to the tree:
/// which paths are gone and where renamed files now live.
///
/// Entries are stamped with the order they happened in, so a file moved onto
/// a path that was deleted earlier is not mistaken for the deleted one.
/// Only updated after a confirmed successful action. Never persisted.
#[derive(Debug, Default, Clone)]
pub struct RunState {
    deleted: HashMap<PathBuf, u64>,
    renames: HashMap<PathBuf, (PathBuf, u64)>,
    clock: u64,
}

impl RunState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Follow the rename map until the path no longer maps anywhere.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        self.walk(path).0
    }

    /// Whether the file that started out at `path` has been deleted this run.
    /// A path reached through a rename only counts as deleted when the delete
    /// came after the file arrived there.
    pub fn is_deleted(&self, path: &Path) -> bool {
        let (current, arrived_at) = self.walk(path);
        match (self.deleted.get(&current), arrived_at) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some(&deleted_at), Some(arrived_at)) => deleted_at > arrived_at,
        }
    }

    pub fn record_delete(&mut self, path: &Path) {
        let resolved = self.resolve(path);
        trace!("Tracking deletion of {}", resolved.display());
        let stamp = self.tick();
        self.deleted.insert(resolved, stamp);
    }

    /// `from` is the path the action targeted (original or already resolved).
    pub fn record_rename(&mut self, from: &Path, to: &Path) {
        if from == to {
            return;
        }
        trace!("Tracking rename {} -> {}", from.display(), to.display());
        let stamp = self.tick();
        self.renames
            .insert(from.to_path_buf(), (to.to_path_buf(), stamp));
    }

    pub fn deleted_count(&self) -> usize {
        self.deleted.len()
    }

    pub fn rename_count(&self) -> usize {
        self.renames.len()
    }

    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    /// Current path plus the stamp of the last hop taken. A cycle in the map
    /// cannot loop forever: the walk stops after as many hops as there are
    /// entries.
    fn walk(&self, path: &Path) -> (PathBuf, Option<u64>) {
        let mut current = path;
        let mut arrived_at = None;
        for _ in 0..=self.renames.len() {
            match self.renames.get(current) {
                Some((next, stamp)) if next != current => {
                    current = next;
                    arrived_at = Some(*stamp);
                }
                _ => break,
            }
        }
        (current.to_path_buf(), arrived_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_unknown_path_is_identity() {
        let state = RunState::new();
        assert_eq!(state.resolve(Path::new("y1/a")), PathBuf::from("y1/a"));
        assert!(!state.is_deleted(Path::new("y1/a")));
    }

    #[test]
    fn test_resolve_follows_chain_to_fixed_point() {
        let mut state = RunState::new();
        state.record_rename(Path::new("y1/a b"), Path::new("y1/a_b"));
        state.record_rename(Path::new("y1/a_b"), Path::new("x/a_b"));

        let resolved = state.resolve(Path::new("y1/a b"));
        assert_eq!(resolved, PathBuf::from("x/a_b"));
        assert_eq!(state.resolve(&resolved), resolved);
    }

    #[test]
    fn test_resolve_terminates_on_cycle() {
        let mut state = RunState::new();
        state.record_rename(Path::new("a"), Path::new("b"));
        state.record_rename(Path::new("b"), Path::new("a"));
        let resolved = state.resolve(Path::new("a"));
        assert!(resolved == PathBuf::from("a") || resolved == PathBuf::from("b"));
    }

    #[test]
    fn test_deleted_through_rename() {
        let mut state = RunState::new();
        state.record_rename(Path::new("y1/t:f"), Path::new("y1/t_f"));
        state.record_delete(Path::new("y1/t_f"));

        assert!(state.is_deleted(Path::new("y1/t:f")));
        assert!(state.is_deleted(Path::new("y1/t_f")));
        assert_eq!(state.deleted_count(), 1);
    }

    #[test]
    fn test_delete_via_original_path_records_resolved() {
        let mut state = RunState::new();
        state.record_rename(Path::new("old"), Path::new("new"));
        state.record_delete(Path::new("old"));
        assert!(state.is_deleted(Path::new("new")));
    }

    #[test]
    fn test_file_moved_onto_deleted_path_is_live() {
        let mut state = RunState::new();
        state.record_delete(Path::new("x/doc.txt"));
        state.record_rename(Path::new("y2/doc.txt"), Path::new("x/doc.txt"));

        assert_eq!(state.resolve(Path::new("y2/doc.txt")), PathBuf::from("x/doc.txt"));
        assert!(!state.is_deleted(Path::new("y2/doc.txt")));
        // The file that used to live there is still gone.
        assert!(state.is_deleted(Path::new("x/doc.txt")));
        assert_eq!(state.rename_count(), 1);

        // Deleting the newcomer through its original path marks it deleted.
        state.record_delete(Path::new("y2/doc.txt"));
        assert!(state.is_deleted(Path::new("y2/doc.txt")));
        assert_eq!(state.deleted_count(), 1);
    }
}
