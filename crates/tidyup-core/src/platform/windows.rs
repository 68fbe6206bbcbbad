use std::fs::{self, Metadata};
use std::io;
use std::path::Path;

const OWNER_WRITE: u32 = 0o200;

// Only the read-only flag exists here; report it as the closest Unix mode.
pub fn permission_bits(metadata: &Metadata) -> u32 {
    if metadata.permissions().readonly() {
        0o444
    } else {
        0o644
    }
}

pub fn set_permission_bits(path: &Path, mode: u32) -> io::Result<()> {
    let mut permissions = fs::metadata(path)?.permissions();
    permissions.set_readonly(mode & OWNER_WRITE == 0);
    fs::set_permissions(path, permissions)
}
