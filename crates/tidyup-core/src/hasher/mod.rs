pub mod content;

pub use content::{build_duplicate_index, hash_file};
