//! `bagprofile.yaml` loading.

use anyhow::Context;
use bagprofile_core::ProfileSettings;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::archive::{ExtractLimits, ExtractLimitsOverrides};

pub const DEFAULT_CONFIG_FILE: &str = "bagprofile.yaml";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CliConfig {
    /// Accepted license URIs. Built-in list when absent.
    #[serde(default)]
    pub licenses: Option<Vec<String>>,

    /// Roles allowed to update an existing dataset. Built-in list when absent.
    #[serde(default)]
    pub update_roles: Option<Vec<String>>,

    /// Repository snapshot; relative paths resolve against the config file.
    #[serde(default)]
    pub repository: Option<PathBuf>,

    /// Overrides for archive extraction limits.
    #[serde(default)]
    pub archive_limits: ExtractLimitsOverrides,
}

impl CliConfig {
    /// Load `explicit`, or `bagprofile.yaml` in the working directory when it exists.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))
            }
            None => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let mut config: CliConfig = serde_yaml::from_str(&text)
            .with_context(|| format!("failed to parse config {}", path.display()))?;

        if let (Some(repository), Some(base)) = (config.repository.as_mut(), path.parent()) {
            if repository.is_relative() {
                *repository = base.join(&*repository);
            }
        }
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn settings(&self) -> ProfileSettings {
        let defaults = ProfileSettings::default();
        ProfileSettings {
            licenses: self.licenses.clone().unwrap_or(defaults.licenses),
            update_roles: self.update_roles.clone().unwrap_or(defaults.update_roles),
        }
    }

    pub fn extract_limits(&self) -> ExtractLimits {
        ExtractLimits::default().apply(self.archive_limits)
    }
}
