#[cfg(unix)]
mod unix;
#[cfg(not(unix))]
mod windows;

use std::fs::Metadata;
use std::io;
use std::path::Path;

/// Permission bits of a file, including setuid/setgid/sticky.
#[cfg(unix)]
pub fn permission_bits(metadata: &Metadata) -> u32 {
    unix::permission_bits(metadata)
}

#[cfg(not(unix))]
pub fn permission_bits(metadata: &Metadata) -> u32 {
    windows::permission_bits(metadata)
}

#[cfg(unix)]
pub fn set_permission_bits(path: &Path, mode: u32) -> io::Result<()> {
    unix::set_permission_bits(path, mode)
}

#[cfg(not(unix))]
pub fn set_permission_bits(path: &Path, mode: u32) -> io::Result<()> {
    windows::set_permission_bits(path, mode)
}
