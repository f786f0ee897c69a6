//! Shared argument types used across multiple commands.

use bagprofile_core::{PackageVariant, ValidationContext};
use clap::ValueEnum;

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
pub enum VariantArg {
    Standard,
    LegacyMigration,
}

impl From<VariantArg> for PackageVariant {
    fn from(v: VariantArg) -> Self {
        match v {
            VariantArg::Standard => PackageVariant::Standard,
            VariantArg::LegacyMigration => PackageVariant::LegacyMigration,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
pub enum ContextArg {
    Standalone,
    WithExternalContext,
}

impl From<ContextArg> for ValidationContext {
    fn from(c: ContextArg) -> Self {
        match c {
            ContextArg::Standalone => ValidationContext::Standalone,
            ContextArg::WithExternalContext => ValidationContext::WithExternalContext,
        }
    }
}
