//! Section 2: directory layout.

use super::{DATASET_XML, FILES_XML};
use crate::bag::{payload_files, relative_path, METADATA_DIR};
use crate::rules::{RuleContext, RuleOutcome};

const PROVENANCE_XML: &str = "metadata/provenance.xml";

const STANDARD_METADATA_FILES: &[&str] = &[DATASET_XML, FILES_XML];

const MIGRATION_METADATA_FILES: &[&str] = &[
    DATASET_XML,
    FILES_XML,
    PROVENANCE_XML,
    "metadata/amd.xml",
    "metadata/emd.xml",
];

const MIGRATION_METADATA_DIRS: &[&str] = &["metadata/original/"];

/// Characters not allowed in payload paths.
const FORBIDDEN_PATH_CHARS: &[char] = &[':', '*', '?', '"', '<', '>', '|', ';', '#'];

fn require_file(ctx: &RuleContext<'_>, rel: &str) -> RuleOutcome {
    if ctx.files.is_file(&ctx.path(rel)) {
        RuleOutcome::Success
    } else {
        RuleOutcome::error(format!("{} is missing", rel))
    }
}

/// 2.1
pub fn has_metadata_dir(ctx: &RuleContext<'_>) -> anyhow::Result<RuleOutcome> {
    if ctx.files.is_directory(&ctx.path(METADATA_DIR)) {
        Ok(RuleOutcome::Success)
    } else {
        Ok(RuleOutcome::error(format!(
            "bag has no '{}' directory",
            METADATA_DIR
        )))
    }
}

/// 2.2(a)
pub fn has_dataset_xml(ctx: &RuleContext<'_>) -> anyhow::Result<RuleOutcome> {
    Ok(require_file(ctx, DATASET_XML))
}

/// 2.2(b)
pub fn has_files_xml(ctx: &RuleContext<'_>) -> anyhow::Result<RuleOutcome> {
    Ok(require_file(ctx, FILES_XML))
}

fn metadata_contains_only(
    ctx: &RuleContext<'_>,
    files: &[&str],
    dirs: &[&str],
) -> anyhow::Result<RuleOutcome> {
    let unexpected: Vec<String> = ctx
        .files
        .list_files_recursively(&ctx.path(METADATA_DIR))?
        .iter()
        .map(|p| relative_path(ctx.bag_dir, p))
        .filter(|rel| !files.contains(&rel.as_str()))
        .filter(|rel| !dirs.iter().any(|d| rel.starts_with(d)))
        .collect();

    if unexpected.is_empty() {
        Ok(RuleOutcome::Success)
    } else {
        Ok(RuleOutcome::error(format!(
            "'{}' contains files not allowed by the profile: {}",
            METADATA_DIR,
            unexpected.join(", ")
        )))
    }
}

/// 2.3 (standard)
pub fn metadata_contains_only_standard_files(
    ctx: &RuleContext<'_>,
) -> anyhow::Result<RuleOutcome> {
    metadata_contains_only(ctx, STANDARD_METADATA_FILES, &[])
}

/// 2.3 (legacy-migration)
pub fn metadata_contains_only_migration_files(
    ctx: &RuleContext<'_>,
) -> anyhow::Result<RuleOutcome> {
    metadata_contains_only(ctx, MIGRATION_METADATA_FILES, MIGRATION_METADATA_DIRS)
}

/// 2.4
pub fn payload_paths_allowed(ctx: &RuleContext<'_>) -> anyhow::Result<RuleOutcome> {
    let offending: Vec<String> = payload_files(ctx.files, ctx.bag_dir)?
        .into_iter()
        .filter(|p| p.contains(FORBIDDEN_PATH_CHARS))
        .collect();

    if offending.is_empty() {
        Ok(RuleOutcome::Success)
    } else {
        Ok(RuleOutcome::error(format!(
            "payload paths contain forbidden characters ({}): {}",
            FORBIDDEN_PATH_CHARS.iter().collect::<String>(),
            offending.join(", ")
        )))
    }
}

/// 2.5 (legacy-migration)
pub fn has_provenance_xml(ctx: &RuleContext<'_>) -> anyhow::Result<RuleOutcome> {
    Ok(require_file(ctx, PROVENANCE_XML))
}
