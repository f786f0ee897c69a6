//! Validation entry point: checks a request, runs the engine and builds the report.

use crate::engine::{EngineError, RuleEngine, RuleEvaluation};
use crate::fs::{FileAccess, FsError, LocalFileAccess};
use crate::report::{build_report, EvaluationSummary, ValidationReport};
use crate::repository::MetadataRepository;
use crate::rules::{RuleCatalog, RuleContext};
use crate::settings::ProfileSettings;
use crate::types::{ValidationContext, ValidationRequest};
use crate::xml::{StructuralSchemas, XmlReader};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Reasons a request is rejected or a run is aborted.
#[derive(Debug, thiserror::Error)]
pub enum ValidateError {
    #[error("bag not found: {}", path.display())]
    BagNotFound { path: PathBuf },

    #[error("bag cannot be read: {0}")]
    BagUnreadable(#[source] FsError),

    #[error("validation context {context} requires a metadata repository, none is configured")]
    ContextUnavailable { context: ValidationContext },

    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Validates bags against one catalog. Cheap to clone; clones share the
/// catalog and collaborators.
#[derive(Clone)]
pub struct BagValidator {
    catalog: Arc<RuleCatalog>,
    files: Arc<dyn FileAccess>,
    xml: Arc<dyn XmlReader>,
    repository: Option<Arc<dyn MetadataRepository>>,
    settings: ProfileSettings,
}

impl BagValidator {
    /// Validator over the local filesystem with the structural schema checker.
    pub fn new(catalog: Arc<RuleCatalog>) -> Self {
        Self {
            catalog,
            files: Arc::new(LocalFileAccess),
            xml: Arc::new(StructuralSchemas),
            repository: None,
            settings: ProfileSettings::default(),
        }
    }

    pub fn with_repository(mut self, repository: Arc<dyn MetadataRepository>) -> Self {
        self.repository = Some(repository);
        self
    }

    pub fn with_settings(mut self, settings: ProfileSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_file_access(mut self, files: Arc<dyn FileAccess>) -> Self {
        self.files = files;
        self
    }

    pub fn with_xml_reader(mut self, xml: Arc<dyn XmlReader>) -> Self {
        self.xml = xml;
        self
    }

    pub fn catalog(&self) -> &RuleCatalog {
        &self.catalog
    }

    /// Per-rule evaluations for `request`, in catalog order.
    pub fn evaluate(&self, request: &ValidationRequest) -> Result<Vec<RuleEvaluation>, ValidateError> {
        self.check_request(request)?;

        let ctx = RuleContext {
            bag_dir: &request.bag_dir,
            variant: request.variant,
            context: request.context,
            files: self.files.as_ref(),
            xml: self.xml.as_ref(),
            repository: self.repository.as_deref(),
            settings: &self.settings,
        };
        Ok(RuleEngine::new(&self.catalog).evaluate(&ctx)?)
    }

    /// Validate one bag.
    pub fn validate(&self, request: &ValidationRequest) -> Result<ValidationReport, ValidateError> {
        let evaluations = self.evaluate(request)?;
        let summary = EvaluationSummary::of(&evaluations);
        let report = build_report(request, &evaluations);

        info!(
            bag = %report.bag_name,
            variant = %request.variant,
            context = %request.context,
            compliant = report.is_compliant,
            succeeded = summary.succeeded,
            failed = summary.failed,
            skipped = summary.skipped,
            "bag validated"
        );
        Ok(report)
    }

    fn check_request(&self, request: &ValidationRequest) -> Result<(), ValidateError> {
        if request.context == ValidationContext::WithExternalContext && self.repository.is_none() {
            return Err(ValidateError::ContextUnavailable {
                context: request.context,
            });
        }
        if !self.files.is_directory(&request.bag_dir) {
            return Err(ValidateError::BagNotFound {
                path: request.bag_dir.clone(),
            });
        }
        match self.files.list_files_recursively(&request.bag_dir) {
            Ok(_) => Ok(()),
            Err(FsError::NotFound { path }) => Err(ValidateError::BagNotFound { path }),
            Err(e) => Err(ValidateError::BagUnreadable(e)),
        }
    }
}

impl std::fmt::Debug for BagValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BagValidator")
            .field("rules", &self.catalog.len())
            .field("repository", &self.repository.is_some())
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
