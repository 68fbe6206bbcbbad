pub mod analysis;
pub mod config;
pub mod engine;
pub mod error;
pub mod executor;
pub mod hasher;
pub mod model;
pub mod orchestrator;
pub mod platform;
pub mod progress;
pub mod prompt;
pub mod scanner;
pub mod storage;
pub mod tracker;

pub use config::AppConfig;
pub use engine::{Inventory, ScanEngine};
pub use error::Error;
pub use executor::Outcome;
pub use model::{Action, ActionGroups, ActionKind, Category, DuplicateIndex, FileRecord};
pub use orchestrator::{Mode, Orchestrator, Phase, RunReport};
pub use progress::{ProgressReporter, SilentReporter};
pub use prompt::{Choice, Chooser};
pub use storage::ActionStore;
pub use tracker::RunState;
