pub mod classifier;
pub mod plan;

pub use classifier::{classify, sanitize_filename};
pub use plan::{rebind, reconcile, resolve_target, Rebound};
