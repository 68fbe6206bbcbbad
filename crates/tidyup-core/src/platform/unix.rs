use std::fs::{self, Metadata, Permissions};
use std::io;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

const MODE_MASK: u32 = 0o7777;

pub fn permission_bits(metadata: &Metadata) -> u32 {
    metadata.permissions().mode() & MODE_MASK
}

pub fn set_permission_bits(path: &Path, mode: u32) -> io::Result<()> {
    fs::set_permissions(path, Permissions::from_mode(mode & MODE_MASK))
}
