use clap::{Parser, ValueEnum};
use tidyup_core::Mode;

#[derive(Debug, Parser)]
#[command(name = "tidyup")]
#[command(about = "Inventory a fixed set of folders and clean them up", long_about = None)]
pub struct Cli {
    /// How proposed actions are chosen and applied
    #[arg(value_enum, default_value = "analyze")]
    pub mode: ModeArg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// Interactive: confirm every file
    Analyze,
    /// Apply the automatic policy without asking
    Auto,
    /// Execute the actions saved by an earlier run
    Replay,
    /// Interactive: pick groups, one answer per group
    Select,
    /// Only write the proposed actions to the snapshot file
    Json,
}

impl From<ModeArg> for Mode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Analyze => Mode::Analyze,
            ModeArg::Auto => Mode::Auto,
            ModeArg::Replay => Mode::Replay,
            ModeArg::Select => Mode::Select,
            ModeArg::Json => Mode::Json,
        }
    }
}
