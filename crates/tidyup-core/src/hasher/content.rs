use crate::model::{DuplicateIndex, FileRecord};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

const CHUNK_LENGTH: usize = 8192; // 8KB

/// Hash every file and index the results by content hash.
///
/// Files that cannot be read are dropped from the returned list as well,
/// so the inventory only ever describes files that were fully hashed.
pub fn build_duplicate_index(
    files: Vec<FileRecord>,
    mut on_progress: impl FnMut(usize, usize),
) -> (Vec<FileRecord>, DuplicateIndex) {
    let total = files.len();
    let mut index = DuplicateIndex::new();
    let mut hashed = Vec::with_capacity(total);

    for (done, file) in files.into_iter().enumerate() {
        match hash_file(&file.path) {
            Ok(hash) => {
                index.insert(hash, file.path.clone());
                hashed.push(file);
            }
            Err(e) => {
                tracing::warn!("Error hashing file '{}': {}", file.path.display(), e);
            }
        }
        on_progress(done + 1, total);
    }

    (hashed, index)
}

/// BLAKE3 of the file contents, read in fixed-size chunks, as lowercase hex.
pub fn hash_file(file: &Path) -> io::Result<String> {
    let mut f = File::open(file)?;
    let mut hasher = blake3::Hasher::new();
    let mut buffer = [0u8; CHUNK_LENGTH];
    loop {
        let bytes_read = match f.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buffer[..bytes_read]);
    }
    Ok(hasher.finalize().to_hex().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_streamed_hash_matches_one_shot() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("big.bin");
        // Spans several chunks and ends mid-chunk.
        let data: Vec<u8> = (0..(CHUNK_LENGTH * 3 + 17)).map(|i| (i % 251) as u8).collect();
        fs::write(&path, &data).unwrap();

        let one_shot = blake3::hash(&data).to_hex().to_string();
        assert_eq!(hash_file(&path).unwrap(), one_shot);
    }

    #[test]
    fn test_unreadable_file_is_dropped() {
        let tmp = tempdir().unwrap();
        let present = tmp.path().join("a.txt");
        fs::write(&present, "a").unwrap();
        let record = |path: &Path| FileRecord {
            path: path.to_path_buf(),
            name: path.file_name().unwrap().to_string_lossy().into_owned(),
            modified: std::time::SystemTime::UNIX_EPOCH,
            size: 1,
            mode: 0o644,
            source_dir: tmp.path().to_path_buf(),
        };
        let files = vec![record(&present), record(&tmp.path().join("gone.txt"))];

        let (files, index) = build_duplicate_index(files, |_, _| {});
        assert_eq!(files.len(), 1);
        assert_eq!(index.len(), 1);
    }
}
