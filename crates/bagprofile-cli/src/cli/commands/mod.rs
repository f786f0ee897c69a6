use super::args::*;

pub mod rules;
pub mod validate;

use crate::exit_codes::COMPLIANT;

pub async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    match cli.cmd {
        Command::Validate(args) => validate::run(args).await,
        Command::Rules(args) => rules::run(args),
        Command::Version => {
            println!(
                "{} (profile {})",
                env!("CARGO_PKG_VERSION"),
                bagprofile_core::PROFILE_VERSION
            );
            Ok(COMPLIANT)
        }
    }
}
