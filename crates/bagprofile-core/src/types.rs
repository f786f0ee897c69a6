//! Request-level types shared by the catalog, engine and reporter.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Version of the bag profile implemented by the built-in catalog.
pub const PROFILE_VERSION: &str = "1.0.0";

/// Which profile dialect applies to a bag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PackageVariant {
    /// Bags produced by the current submission process.
    Standard,
    /// Bags produced by a migration from a legacy archive.
    LegacyMigration,
}

impl PackageVariant {
    pub const ALL: [PackageVariant; 2] = [PackageVariant::Standard, PackageVariant::LegacyMigration];
}

impl std::fmt::Display for PackageVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PackageVariant::Standard => write!(f, "standard"),
            PackageVariant::LegacyMigration => write!(f, "legacy-migration"),
        }
    }
}

/// Whether repository lookups are available while validating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValidationContext {
    Standalone,
    WithExternalContext,
}

impl ValidationContext {
    pub const ALL: [ValidationContext; 2] = [
        ValidationContext::Standalone,
        ValidationContext::WithExternalContext,
    ];
}

impl std::fmt::Display for ValidationContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationContext::Standalone => write!(f, "standalone"),
            ValidationContext::WithExternalContext => write!(f, "with-external-context"),
        }
    }
}

/// A validation request against an already extracted bag directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationRequest {
    pub bag_dir: PathBuf,
    pub variant: PackageVariant,
    pub context: ValidationContext,
}

impl ValidationRequest {
    pub fn new(bag_dir: impl Into<PathBuf>) -> Self {
        Self {
            bag_dir: bag_dir.into(),
            variant: PackageVariant::Standard,
            context: ValidationContext::Standalone,
        }
    }

    pub fn with_variant(mut self, variant: PackageVariant) -> Self {
        self.variant = variant;
        self
    }

    pub fn with_context(mut self, context: ValidationContext) -> Self {
        self.context = context;
        self
    }

    /// Display name of the bag: the last component of its directory.
    pub fn bag_name(&self) -> String {
        self.bag_dir
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.bag_dir.display().to_string())
    }
}
