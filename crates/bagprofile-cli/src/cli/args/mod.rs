use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod common;
pub use common::*;

#[derive(Parser)]
#[command(
    name = "bagprofile",
    version,
    about = "Validate archival bags against the bag profile"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Validate a bag directory or a .tar.gz/.tgz archive holding one bag
    Validate(ValidateArgs),
    /// List the rules of the built-in profile
    Rules(RulesArgs),
    Version,
}

#[derive(Parser, Debug, Clone)]
pub struct ValidateArgs {
    /// Bag directory, or archive containing a single top-level bag directory
    pub bag: PathBuf,

    #[arg(long, value_enum, default_value_t = VariantArg::Standard)]
    pub variant: VariantArg,

    #[arg(long, value_enum, default_value_t = ContextArg::Standalone)]
    pub context: ContextArg,

    /// Configuration file (YAML). Defaults to ./bagprofile.yaml when present
    #[arg(long, env = "BAGPROFILE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Repository snapshot (YAML) used by the with-external-context rules
    #[arg(long, env = "BAGPROFILE_REPOSITORY")]
    pub repository: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Abort the validation after this many seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}

#[derive(Parser, Debug, Clone)]
pub struct RulesArgs {
    /// Only rules active for this variant
    #[arg(long, value_enum)]
    pub variant: Option<VariantArg>,

    /// Only rules active in this context
    #[arg(long, value_enum)]
    pub context: Option<ContextArg>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}
