//! Bag profile validation.
//!
//! Checks an archival bag against a versioned profile: a catalog of numbered
//! rules with dependencies, scoped by package variant and validation context,
//! executed in dependency order by [`RuleEngine`] and reduced to a
//! [`ValidationReport`].

pub mod bag;
pub mod engine;
pub mod fs;
pub mod report;
pub mod repository;
pub mod rules;
pub mod settings;
pub mod types;
pub mod validator;
pub mod validators;
pub mod xml;

// Convenience re-exports
pub use engine::{EngineError, EvaluationStatus, RuleEngine, RuleEvaluation};
pub use fs::{FileAccess, FsError, LocalFileAccess};
pub use report::{build_report, EvaluationSummary, RuleViolation, ValidationReport};
pub use repository::{MetadataRepository, RepositoryError, SnapshotRepository};
pub use rules::{
    ConfigError, NumberedRule, RuleCatalog, RuleContext, RuleOutcome,
};
pub use settings::ProfileSettings;
pub use types::{PackageVariant, ValidationContext, ValidationRequest, PROFILE_VERSION};
pub use validator::{BagValidator, ValidateError};
