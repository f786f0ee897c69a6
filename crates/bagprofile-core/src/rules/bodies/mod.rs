//! Rule body library: one function per profile requirement.
//!
//! Bodies return `Ok(RuleOutcome::Error { .. })` for violations found in the
//! bag and `Err` only for faults reading it.

pub mod bagit;
pub mod dataset;
pub mod files;
pub mod repository;
pub mod structure;

use super::RuleContext;
use crate::bag::{TagFile, BAG_INFO_TXT};
use crate::xml::{XmlDocument, XmlError};

pub const DATASET_XML: &str = "metadata/dataset.xml";
pub const FILES_XML: &str = "metadata/files.xml";

/// `bag-info.txt`, or `None` when the bag has none.
fn optional_bag_info(ctx: &RuleContext<'_>) -> anyhow::Result<Option<TagFile>> {
    if !ctx.files.is_file(&ctx.path(BAG_INFO_TXT)) {
        return Ok(None);
    }
    ctx.bag_info().map(Some)
}

/// Single value of a bag-info label; `None` when absent.
fn bag_info_value(ctx: &RuleContext<'_>, label: &str) -> anyhow::Result<Option<String>> {
    Ok(optional_bag_info(ctx)?.and_then(|info| info.first(label).map(String::from)))
}

/// Parse a metadata document, separating malformed XML (a violation) from
/// read failures (a fault).
fn parse_document(
    ctx: &RuleContext<'_>,
    rel: &str,
) -> anyhow::Result<Result<XmlDocument, XmlError>> {
    let path = ctx.path(rel);
    let bytes = ctx.files.read_bytes(&path)?;
    Ok(ctx.xml.parse(&path, &bytes))
}
