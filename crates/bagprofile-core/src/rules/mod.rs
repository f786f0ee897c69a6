//! Numbered rules: the unit the engine schedules.
//!
//! A [`NumberedRule`] wraps one body function with a requirement number,
//! the numbers it depends on, and where it applies (package variant and
//! validation context). Rules are collected into a [`RuleCatalog`], which is
//! checked for consistency once at construction and then shared read-only.

pub mod bodies;
pub mod catalog;
pub mod config_check;
pub mod profile;

pub use catalog::RuleCatalog;
pub use config_check::{check_catalog, ConfigError, ConfigProblem};

use crate::bag::{read_bag_info, TagFile};
use crate::fs::FileAccess;
use crate::repository::MetadataRepository;
use crate::settings::ProfileSettings;
use crate::types::{PackageVariant, ValidationContext};
use crate::xml::{XmlDocument, XmlReader};
use anyhow::Context;
use std::path::{Path, PathBuf};

/// Rule body: a predicate over the bag.
///
/// `Ok` carries the designed outcome of the check; `Err` is reserved for
/// unexpected faults (I/O, collaborator failures) and is recorded by the
/// engine as a failure of this rule only.
pub type RuleBody = fn(&RuleContext<'_>) -> anyhow::Result<RuleOutcome>;

/// Result of running one rule body.
#[derive(Debug)]
pub enum RuleOutcome {
    Success,
    Error {
        messages: Vec<String>,
        cause: Option<anyhow::Error>,
    },
    /// Success, but every transitive dependent is skipped.
    SkipDependents,
}

impl RuleOutcome {
    pub fn error(message: impl Into<String>) -> Self {
        RuleOutcome::Error {
            messages: vec![message.into()],
            cause: None,
        }
    }

    /// `Success` when `problems` is empty, `Error` listing them otherwise.
    pub fn from_problems(problems: Vec<String>) -> Self {
        if problems.is_empty() {
            RuleOutcome::Success
        } else {
            RuleOutcome::Error {
                messages: problems,
                cause: None,
            }
        }
    }

    pub fn with_cause(self, cause: anyhow::Error) -> Self {
        match self {
            RuleOutcome::Error { messages, .. } => RuleOutcome::Error {
                messages,
                cause: Some(cause),
            },
            other => other,
        }
    }
}

/// Where a rule applies along one dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Applicability<T> {
    Unrestricted,
    Only(T),
}

impl<T: Copy + PartialEq> Applicability<T> {
    pub fn matches(&self, value: T) -> bool {
        match self {
            Applicability::Unrestricted => true,
            Applicability::Only(v) => *v == value,
        }
    }
}

impl<T: std::fmt::Display> std::fmt::Display for Applicability<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Applicability::Unrestricted => write!(f, "all"),
            Applicability::Only(v) => write!(f, "{}", v),
        }
    }
}

pub type VariantScope = Applicability<PackageVariant>;
pub type ContextScope = Applicability<ValidationContext>;

/// A requirement of the profile, bound to the function that checks it.
#[derive(Clone)]
pub struct NumberedRule {
    number: String,
    description: &'static str,
    body: RuleBody,
    dependencies: Vec<String>,
    variant: VariantScope,
    context: ContextScope,
}

impl NumberedRule {
    pub fn new(number: impl Into<String>, description: &'static str, body: RuleBody) -> Self {
        Self {
            number: number.into(),
            description,
            body,
            dependencies: Vec::new(),
            variant: Applicability::Unrestricted,
            context: Applicability::Unrestricted,
        }
    }

    pub fn depends_on(mut self, numbers: &[&str]) -> Self {
        self.dependencies = numbers.iter().map(|n| n.to_string()).collect();
        self
    }

    pub fn only_for(mut self, variant: PackageVariant) -> Self {
        self.variant = Applicability::Only(variant);
        self
    }

    pub fn only_in(mut self, context: ValidationContext) -> Self {
        self.context = Applicability::Only(context);
        self
    }

    pub fn number(&self) -> &str {
        &self.number
    }

    pub fn description(&self) -> &'static str {
        self.description
    }

    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    pub fn variant(&self) -> VariantScope {
        self.variant
    }

    pub fn context(&self) -> ContextScope {
        self.context
    }

    pub fn applies_to(&self, variant: PackageVariant, context: ValidationContext) -> bool {
        self.variant.matches(variant) && self.context.matches(context)
    }

    pub(crate) fn run(&self, ctx: &RuleContext<'_>) -> anyhow::Result<RuleOutcome> {
        (self.body)(ctx)
    }
}

impl std::fmt::Debug for NumberedRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NumberedRule")
            .field("number", &self.number)
            .field("dependencies", &self.dependencies)
            .field("variant", &self.variant)
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}

/// Everything a rule body may look at.
pub struct RuleContext<'a> {
    pub bag_dir: &'a Path,
    pub variant: PackageVariant,
    pub context: ValidationContext,
    pub files: &'a dyn FileAccess,
    pub xml: &'a dyn XmlReader,
    pub repository: Option<&'a dyn MetadataRepository>,
    pub settings: &'a ProfileSettings,
}

impl RuleContext<'_> {
    /// Path of a slash separated bag-relative path.
    pub fn path(&self, rel: &str) -> PathBuf {
        crate::bag::bag_path(self.bag_dir, rel)
    }

    pub fn bag_info(&self) -> anyhow::Result<TagFile> {
        read_bag_info(self.files, self.bag_dir).context("reading bag-info.txt")
    }

    pub fn read_xml(&self, rel: &str) -> anyhow::Result<XmlDocument> {
        let path = self.path(rel);
        let bytes = self
            .files
            .read_bytes(&path)
            .with_context(|| format!("reading {}", rel))?;
        Ok(self.xml.parse(&path, &bytes)?)
    }

    pub fn repository(&self) -> anyhow::Result<&dyn MetadataRepository> {
        self.repository
            .context("no metadata repository available in this validation context")
    }
}
