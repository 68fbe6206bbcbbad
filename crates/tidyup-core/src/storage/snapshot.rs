use crate::error::Error;
use crate::model::ActionGroups;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// JSON snapshot of categorized actions, the one artifact that outlives a run.
pub struct ActionStore {
    path: PathBuf,
}

impl ActionStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Overwrite the snapshot. Written to a sibling temp file first, then
    /// renamed over the old one, so a crash never leaves half a document.
    pub fn save(&self, groups: &ActionGroups) -> Result<(), Error> {
        let tmp_path = self.path.with_extension("json.tmp");
        let io_err = |source: io::Error| Error::SnapshotIo {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let file = File::create(&tmp_path).map_err(io_err)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, groups).map_err(|source| Error::Snapshot {
            path: self.path.clone(),
            source,
        })?;
        writer.write_all(b"\n").map_err(io_err)?;
        writer.flush().map_err(io_err)?;
        drop(writer);

        fs::rename(&tmp_path, &self.path).map_err(io_err)?;
        info!(
            "Saved {} actions to {}",
            groups.total(),
            self.path.display()
        );
        Ok(())
    }

    /// `Ok(None)` when no snapshot has been written yet; any other read or
    /// parse problem is an error.
    pub fn load(&self) -> Result<Option<ActionGroups>, Error> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No snapshot at {}", self.path.display());
                return Ok(None);
            }
            Err(source) => {
                return Err(Error::SnapshotIo {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let groups: ActionGroups =
            serde_json::from_reader(BufReader::new(file)).map_err(|source| Error::Snapshot {
                path: self.path.clone(),
                source,
            })?;
        debug!(
            "Loaded {} actions from {}",
            groups.total(),
            self.path.display()
        );
        Ok(Some(groups))
    }
}
