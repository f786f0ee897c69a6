//! Metadata repository collaborator.
//!
//! Rules restricted to the with-external-context validation context look up
//! datasets, role assignments and the embargo limit here. Lookups fail with
//! [`RepositoryError::NotFound`] or [`RepositoryError::Io`]; they never
//! return an empty record in place of a failure.

use serde::Deserialize;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("not found in repository: {what}")]
    NotFound { what: String },

    #[error("repository I/O failure: {message}")]
    Io { message: String },
}

/// A dataset as registered in the repository.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DatasetRecord {
    /// The `urn:uuid:` identifying the dataset's version series.
    pub is_version_of: String,
    pub persistent_id: String,
    #[serde(default)]
    pub organizational_identifier: Option<String>,
    #[serde(default)]
    pub role_assignments: Vec<RoleAssignment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RoleAssignment {
    pub user: String,
    pub role: String,
}

/// Read-only repository lookups.
pub trait MetadataRepository: Send + Sync {
    fn find_dataset(&self, is_version_of: &str) -> Result<DatasetRecord, RepositoryError>;

    fn role_assignments(&self, persistent_id: &str) -> Result<Vec<RoleAssignment>, RepositoryError>;

    /// Maximum embargo period, in months from today.
    fn max_embargo_months(&self) -> Result<u32, RepositoryError>;
}

/// Repository backed by a YAML snapshot.
///
/// ```yaml
/// max_embargo_months: 18
/// datasets:
///   - is_version_of: urn:uuid:6d1b5ba3-7f5c-4a23-9ff1-4b0b6a3b1e33
///     persistent_id: doi:10.5072/FK2/ABCDEF
///     organizational_identifier: ORG-42
///     role_assignments:
///       - { user: user001, role: contributorplus }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SnapshotRepository {
    #[serde(default)]
    pub max_embargo_months: Option<u32>,
    #[serde(default)]
    pub datasets: Vec<DatasetRecord>,
}

impl SnapshotRepository {
    pub fn from_yaml(text: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        use anyhow::Context;
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading repository snapshot {}", path.display()))?;
        Self::from_yaml(&text)
            .with_context(|| format!("parsing repository snapshot {}", path.display()))
    }
}

impl MetadataRepository for SnapshotRepository {
    fn find_dataset(&self, is_version_of: &str) -> Result<DatasetRecord, RepositoryError> {
        self.datasets
            .iter()
            .find(|d| d.is_version_of.eq_ignore_ascii_case(is_version_of))
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound {
                what: format!("dataset with Is-Version-Of {}", is_version_of),
            })
    }

    fn role_assignments(&self, persistent_id: &str) -> Result<Vec<RoleAssignment>, RepositoryError> {
        self.datasets
            .iter()
            .find(|d| d.persistent_id == persistent_id)
            .map(|d| d.role_assignments.clone())
            .ok_or_else(|| RepositoryError::NotFound {
                what: format!("dataset {}", persistent_id),
            })
    }

    fn max_embargo_months(&self) -> Result<u32, RepositoryError> {
        self.max_embargo_months
            .ok_or_else(|| RepositoryError::NotFound {
                what: "setting max_embargo_months".to_string(),
            })
    }
}
