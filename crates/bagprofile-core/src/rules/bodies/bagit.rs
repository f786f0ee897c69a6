//! Section 1: BagIt container and `bag-info.txt` requirements.

use super::optional_bag_info;
use crate::bag::{verify_bag, ChecksumAlgorithm, BAG_INFO_TXT};
use crate::rules::{RuleContext, RuleOutcome};

pub const CREATED: &str = "Created";
pub const IS_VERSION_OF: &str = "Is-Version-Of";
pub const HAS_ORGANIZATIONAL_IDENTIFIER: &str = "Has-Organizational-Identifier";
pub const DATA_STATION_USER_ACCOUNT: &str = "Data-Station-User-Account";

/// 1.1.1
pub fn bag_is_valid(ctx: &RuleContext<'_>) -> anyhow::Result<RuleOutcome> {
    let problems = verify_bag(ctx.files, ctx.bag_dir)?;
    Ok(RuleOutcome::from_problems(problems))
}

/// 1.2.1
pub fn created_is_iso8601(ctx: &RuleContext<'_>) -> anyhow::Result<RuleOutcome> {
    let Some(info) = optional_bag_info(ctx)? else {
        return Ok(RuleOutcome::error(format!("{} is missing", BAG_INFO_TXT)));
    };

    let values = info.values(CREATED);
    let [created] = values.as_slice() else {
        return Ok(RuleOutcome::error(format!(
            "{} must contain exactly one {} element; found {}",
            BAG_INFO_TXT,
            CREATED,
            values.len()
        )));
    };

    match chrono::DateTime::parse_from_rfc3339(created) {
        Ok(_) => Ok(RuleOutcome::Success),
        Err(e) => Ok(RuleOutcome::error(format!(
            "{} value '{}' is not an ISO 8601 date-time with time zone: {}",
            CREATED, created, e
        ))),
    }
}

fn at_most_one(ctx: &RuleContext<'_>, label: &str) -> anyhow::Result<RuleOutcome> {
    let count = optional_bag_info(ctx)?.map_or(0, |info| info.values(label).len());
    if count > 1 {
        Ok(RuleOutcome::error(format!(
            "{} may contain at most one {} element; found {}",
            BAG_INFO_TXT, label, count
        )))
    } else {
        Ok(RuleOutcome::Success)
    }
}

/// 1.2.2(a)
pub fn at_most_one_is_version_of(ctx: &RuleContext<'_>) -> anyhow::Result<RuleOutcome> {
    at_most_one(ctx, IS_VERSION_OF)
}

/// 1.2.2(b)
pub fn is_version_of_is_urn_uuid(ctx: &RuleContext<'_>) -> anyhow::Result<RuleOutcome> {
    let Some(value) = super::bag_info_value(ctx, IS_VERSION_OF)? else {
        return Ok(RuleOutcome::Success);
    };

    let valid = value
        .strip_prefix("urn:uuid:")
        .is_some_and(|id| uuid::Uuid::parse_str(id).is_ok());
    if valid {
        Ok(RuleOutcome::Success)
    } else {
        Ok(RuleOutcome::error(format!(
            "{} value '{}' is not a valid urn:uuid",
            IS_VERSION_OF, value
        )))
    }
}

/// 1.2.3
pub fn at_most_one_organizational_identifier(
    ctx: &RuleContext<'_>,
) -> anyhow::Result<RuleOutcome> {
    at_most_one(ctx, HAS_ORGANIZATIONAL_IDENTIFIER)
}

/// 1.2.4
pub fn at_most_one_user_account(ctx: &RuleContext<'_>) -> anyhow::Result<RuleOutcome> {
    at_most_one(ctx, DATA_STATION_USER_ACCOUNT)
}

/// 1.3.1
pub fn has_sha1_manifest(ctx: &RuleContext<'_>) -> anyhow::Result<RuleOutcome> {
    let name = ChecksumAlgorithm::Sha1.manifest_name();
    if ctx.files.is_file(&ctx.path(&name)) {
        Ok(RuleOutcome::Success)
    } else {
        Ok(RuleOutcome::error(format!("bag has no {}", name)))
    }
}
