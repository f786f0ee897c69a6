//! Section 3.2: file metadata (`metadata/files.xml`).

use super::{parse_document, FILES_XML};
use crate::bag::{payload_files, PAYLOAD_DIR};
use crate::rules::{RuleContext, RuleOutcome};
use crate::xml::{ns, SchemaName, XmlDocument};
use std::collections::{BTreeMap, BTreeSet};

/// 3.2.1
pub fn conforms_to_files_schema(ctx: &RuleContext<'_>) -> anyhow::Result<RuleOutcome> {
    let document = match parse_document(ctx, FILES_XML)? {
        Ok(d) => d,
        Err(e) => return Ok(RuleOutcome::error(e.to_string())),
    };
    let violations = ctx.xml.conforms_to_schema(&document, SchemaName::Files);
    Ok(RuleOutcome::from_problems(
        violations
            .into_iter()
            .map(|v| {
                format!(
                    "{} does not conform to {}: {}",
                    FILES_XML,
                    SchemaName::Files.location(),
                    v
                )
            })
            .collect(),
    ))
}

/// `filepath` attributes in document order, trimmed, without leading `/`.
fn described_paths(document: &XmlDocument) -> Vec<String> {
    document
        .root
        .children_named(ns::FILES, "file")
        .filter_map(|f| f.attribute(None, "filepath"))
        .map(|p| p.trim().trim_start_matches('/').to_string())
        .collect()
}

/// 3.2.2
pub fn filepaths_exist(ctx: &RuleContext<'_>) -> anyhow::Result<RuleOutcome> {
    let document = ctx.read_xml(FILES_XML)?;
    let payload: BTreeSet<String> = payload_files(ctx.files, ctx.bag_dir)?.into_iter().collect();
    let prefix = format!("{}/", PAYLOAD_DIR);

    let missing: Vec<String> = described_paths(&document)
        .into_iter()
        .filter(|p| !p.starts_with(&prefix) || !payload.contains(p))
        .collect();

    if missing.is_empty() {
        Ok(RuleOutcome::Success)
    } else {
        Ok(RuleOutcome::error(format!(
            "{} describes files not found in the payload: {}",
            FILES_XML,
            missing.join(", ")
        )))
    }
}

/// 3.2.3
pub fn payload_is_described(ctx: &RuleContext<'_>) -> anyhow::Result<RuleOutcome> {
    let document = ctx.read_xml(FILES_XML)?;
    let described: BTreeSet<String> = described_paths(&document).into_iter().collect();

    let undescribed: Vec<String> = payload_files(ctx.files, ctx.bag_dir)?
        .into_iter()
        .filter(|p| !described.contains(p))
        .collect();

    if undescribed.is_empty() {
        Ok(RuleOutcome::Success)
    } else {
        Ok(RuleOutcome::error(format!(
            "payload files not described in {}: {}",
            FILES_XML,
            undescribed.join(", ")
        )))
    }
}

/// 3.2.4
pub fn no_duplicate_filepaths(ctx: &RuleContext<'_>) -> anyhow::Result<RuleOutcome> {
    let document = ctx.read_xml(FILES_XML)?;
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for path in described_paths(&document) {
        *counts.entry(path).or_default() += 1;
    }

    let duplicates: Vec<String> = counts
        .into_iter()
        .filter(|(_, n)| *n > 1)
        .map(|(p, _)| p)
        .collect();

    if duplicates.is_empty() {
        Ok(RuleOutcome::Success)
    } else {
        Ok(RuleOutcome::error(format!(
            "{} describes these filepaths more than once: {}",
            FILES_XML,
            duplicates.join(", ")
        )))
    }
}
