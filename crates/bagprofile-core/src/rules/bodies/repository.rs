//! Section 4: checks against the metadata repository.
//!
//! These rules only run in the with-external-context validation context.
//! A record the repository does not know is a violation; a repository that
//! cannot answer is a fault.

use super::bagit::{DATA_STATION_USER_ACCOUNT, HAS_ORGANIZATIONAL_IDENTIFIER, IS_VERSION_OF};
use super::{bag_info_value, DATASET_XML};
use crate::repository::{DatasetRecord, RepositoryError};
use crate::rules::{RuleContext, RuleOutcome};
use crate::xml::ns;
use crate::xml::schema::parse_date_like;
use anyhow::Context;
use chrono::{Months, NaiveDate, Utc};

/// The dataset the bag updates, `Ok(None)` for a new dataset, or the
/// violation when the repository does not know it.
fn target_dataset(ctx: &RuleContext<'_>) -> anyhow::Result<Option<Result<DatasetRecord, String>>> {
    let Some(is_version_of) = bag_info_value(ctx, IS_VERSION_OF)? else {
        return Ok(None);
    };
    match ctx.repository()?.find_dataset(&is_version_of) {
        Ok(record) => Ok(Some(Ok(record))),
        Err(RepositoryError::NotFound { what }) => Ok(Some(Err(format!(
            "{} refers to a dataset that does not exist ({})",
            IS_VERSION_OF, what
        )))),
        Err(e) => Err(e).context("looking up target dataset"),
    }
}

/// 4.1
pub fn target_dataset_exists(ctx: &RuleContext<'_>) -> anyhow::Result<RuleOutcome> {
    match target_dataset(ctx)? {
        None => Ok(RuleOutcome::SkipDependents),
        Some(Ok(_)) => Ok(RuleOutcome::Success),
        Some(Err(violation)) => Ok(RuleOutcome::error(violation)),
    }
}

/// Dataset for rules that only run once 4.1 succeeded.
fn existing_dataset(ctx: &RuleContext<'_>) -> anyhow::Result<DatasetRecord> {
    match target_dataset(ctx)? {
        Some(Ok(record)) => Ok(record),
        Some(Err(violation)) => Err(anyhow::anyhow!(violation)),
        None => anyhow::bail!("bag has no {}", IS_VERSION_OF),
    }
}

/// 4.2
pub fn user_may_update_dataset(ctx: &RuleContext<'_>) -> anyhow::Result<RuleOutcome> {
    let Some(user) = bag_info_value(ctx, DATA_STATION_USER_ACCOUNT)? else {
        return Ok(RuleOutcome::error(format!(
            "an update requires a {} in bag-info.txt",
            DATA_STATION_USER_ACCOUNT
        )));
    };
    let dataset = existing_dataset(ctx)?;

    let assignments = match ctx.repository()?.role_assignments(&dataset.persistent_id) {
        Ok(a) => a,
        Err(RepositoryError::NotFound { .. }) => Vec::new(),
        Err(e) => return Err(e).context("looking up role assignments"),
    };

    let allowed = assignments
        .iter()
        .any(|a| a.user == user && ctx.settings.is_update_role(&a.role));
    if allowed {
        Ok(RuleOutcome::Success)
    } else {
        Ok(RuleOutcome::error(format!(
            "user '{}' has no role on {} that allows updating it",
            user, dataset.persistent_id
        )))
    }
}

/// 4.3
pub fn organizational_identifier_matches(ctx: &RuleContext<'_>) -> anyhow::Result<RuleOutcome> {
    let Some(in_bag) = bag_info_value(ctx, HAS_ORGANIZATIONAL_IDENTIFIER)? else {
        return Ok(RuleOutcome::Success);
    };
    let dataset = existing_dataset(ctx)?;

    match dataset.organizational_identifier.as_deref() {
        Some(registered) if registered == in_bag => Ok(RuleOutcome::Success),
        Some(registered) => Ok(RuleOutcome::error(format!(
            "{} '{}' does not match '{}' registered on {}",
            HAS_ORGANIZATIONAL_IDENTIFIER, in_bag, registered, dataset.persistent_id
        ))),
        None => Ok(RuleOutcome::error(format!(
            "{} '{}' given, but {} has no organizational identifier",
            HAS_ORGANIZATIONAL_IDENTIFIER, in_bag, dataset.persistent_id
        ))),
    }
}

/// Latest date an embargo may end when counted from `today`.
fn embargo_limit(today: NaiveDate, max_months: u32) -> Option<NaiveDate> {
    today.checked_add_months(Months::new(max_months))
}

/// 4.4
pub fn embargo_within_limit(ctx: &RuleContext<'_>) -> anyhow::Result<RuleOutcome> {
    let document = ctx.read_xml(DATASET_XML)?;
    let available = document
        .root
        .children_named(ns::DDM, "profile")
        .flat_map(|p| p.children_named(ns::DDM, "available"))
        .find_map(|el| parse_date_like(el.text()));
    let Some(available) = available else {
        return Ok(RuleOutcome::Success);
    };

    let max_months = ctx
        .repository()?
        .max_embargo_months()
        .context("looking up maximum embargo period")?;
    let today = Utc::now().date_naive();
    let limit = embargo_limit(today, max_months)
        .with_context(|| format!("embargo limit of {} months overflows", max_months))?;

    if available > limit {
        Ok(RuleOutcome::error(format!(
            "ddm:available {} lies more than {} months in the future (limit {})",
            available, max_months, limit
        )))
    } else {
        Ok(RuleOutcome::Success)
    }
}
