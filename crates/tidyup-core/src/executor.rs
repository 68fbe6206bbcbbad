use crate::model::{Action, ActionKind};
use crate::platform;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, error};

/// Result of dispatching (or declining to dispatch) one action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Deleted { path: PathBuf },
    Moved { from: PathBuf, to: PathBuf },
    Renamed { from: PathBuf, to: PathBuf },
    ModeChanged { path: PathBuf, mode: u32 },
    Kept { path: PathBuf },
    /// Never sent to the filesystem.
    Skipped { path: PathBuf, reason: String },
    Failed { path: PathBuf, error: String },
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, Outcome::Failed { .. } | Outcome::Skipped { .. })
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failed { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Outcome::Skipped { .. })
    }

    pub fn path(&self) -> &Path {
        match self {
            Outcome::Deleted { path }
            | Outcome::ModeChanged { path, .. }
            | Outcome::Kept { path }
            | Outcome::Skipped { path, .. }
            | Outcome::Failed { path, .. } => path,
            Outcome::Moved { from, .. } | Outcome::Renamed { from, .. } => from,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Deleted { path } => write!(f, "Deleted: {}", path.display()),
            Outcome::Moved { from, to } => {
                write!(f, "Moved: {} to {}", from.display(), to.display())
            }
            Outcome::Renamed { from, to } => {
                write!(f, "Renamed: {} to {}", from.display(), to.display())
            }
            Outcome::ModeChanged { path, mode } => {
                write!(f, "Changed permissions: {} to {:o}", path.display(), mode)
            }
            Outcome::Kept { path } => write!(f, "Kept unchanged: {}", path.display()),
            Outcome::Skipped { path, reason } => {
                write!(f, "Skipped {}: {}", path.display(), reason)
            }
            Outcome::Failed { path, error } => {
                write!(f, "Error processing {}: {}", path.display(), error)
            }
        }
    }
}

/// Apply one action to the filesystem. Errors never escape: they come back
/// as `Outcome::Failed` so the rest of the batch keeps going.
pub fn execute(action: &Action) -> Outcome {
    let path = action.path.clone();
    let result = match &action.kind {
        ActionKind::Delete => fs::remove_file(&path).map(|()| Outcome::Deleted {
            path: path.clone(),
        }),
        ActionKind::Move { new_path } => move_file(&path, new_path).map(|()| Outcome::Moved {
            from: path.clone(),
            to: new_path.clone(),
        }),
        ActionKind::Rename { new_path } => {
            rename_file(&path, new_path).map(|()| Outcome::Renamed {
                from: path.clone(),
                to: new_path.clone(),
            })
        }
        ActionKind::Chmod { new_mode } => {
            platform::set_permission_bits(&path, *new_mode).map(|()| Outcome::ModeChanged {
                path: path.clone(),
                mode: *new_mode,
            })
        }
        ActionKind::Keep => Ok(Outcome::Kept { path: path.clone() }),
    };

    match result {
        Ok(outcome) => {
            debug!("{}", outcome);
            outcome
        }
        Err(e) => {
            error!("Failed to {} '{}': {}", action.kind.name(), path.display(), e);
            Outcome::Failed {
                path,
                error: e.to_string(),
            }
        }
    }
}

fn rename_file(from: &Path, to: &Path) -> io::Result<()> {
    ensure_vacant(to)?;
    fs::rename(from, to)
}

/// Rename across directories, creating the destination directory first and
/// falling back to copy + remove when a plain rename is refused (for example
/// across filesystems).
fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    move_with(from, to, |from, to| fs::rename(from, to))
}

fn move_with(
    from: &Path,
    to: &Path,
    rename: impl FnOnce(&Path, &Path) -> io::Result<()>,
) -> io::Result<()> {
    if !from.is_file() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("{} does not exist", from.display()),
        ));
    }
    ensure_vacant(to)?;
    if let Some(parent) = to.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    match rename(from, to) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(e),
        Err(e) => {
            debug!(
                "rename {} -> {} failed ({}), copying instead",
                from.display(),
                to.display(),
                e
            );
            fs::copy(from, to)?;
            fs::remove_file(from)
        }
    }
}

fn ensure_vacant(to: &Path) -> io::Result<()> {
    if to.exists() {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("destination {} already exists", to.display()),
        ));
    }
    Ok(())
}
