//! The validated, immutable rule catalog.

use super::config_check::{check_catalog, ConfigError};
use super::profile::builtin_rules;
use super::NumberedRule;
use crate::types::{PackageVariant, ValidationContext};

/// Ordered rules, checked for consistency at construction.
///
/// Built once at startup and shared read-only by every validation run.
#[derive(Debug)]
pub struct RuleCatalog {
    rules: Vec<NumberedRule>,
}

impl RuleCatalog {
    /// Validate and wrap `rules`. Catalog order is reporting order.
    pub fn new(rules: Vec<NumberedRule>) -> Result<Self, ConfigError> {
        check_catalog(&rules)?;
        tracing::debug!(rules = rules.len(), "rule catalog validated");
        Ok(Self { rules })
    }

    /// The profile's built-in catalog.
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::new(builtin_rules())
    }

    pub fn rules(&self) -> &[NumberedRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rules applicable to a request, in catalog order.
    pub fn active(&self, variant: PackageVariant, context: ValidationContext) -> Vec<&NumberedRule> {
        self.rules
            .iter()
            .filter(|r| r.applies_to(variant, context))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{RuleContext, RuleOutcome};

    fn ok(_: &RuleContext<'_>) -> anyhow::Result<RuleOutcome> {
        Ok(RuleOutcome::Success)
    }

    #[test]
    fn builtin_catalog_is_consistent() {
        let catalog = RuleCatalog::builtin().unwrap();
        assert!(!catalog.is_empty());
    }

    #[test]
    fn catalog_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RuleCatalog>();
    }

    #[test]
    fn active_filters_on_variant_and_context() {
        let catalog = RuleCatalog::new(vec![
            NumberedRule::new("1", "all", ok),
            NumberedRule::new("2", "standard", ok).only_for(PackageVariant::Standard),
            NumberedRule::new("3", "context", ok).only_in(ValidationContext::WithExternalContext),
        ])
        .unwrap();

        let numbers = |v, c| {
            catalog
                .active(v, c)
                .iter()
                .map(|r| r.number().to_string())
                .collect::<Vec<_>>()
        };
        assert_eq!(
            numbers(PackageVariant::Standard, ValidationContext::Standalone),
            vec!["1", "2"]
        );
        assert_eq!(
            numbers(
                PackageVariant::LegacyMigration,
                ValidationContext::WithExternalContext
            ),
            vec!["1", "3"]
        );
    }

    #[test]
    fn invalid_catalog_is_rejected() {
        let err = RuleCatalog::new(vec![NumberedRule::new("1", "dangling", ok).depends_on(&["0"])])
            .unwrap_err();
        assert_eq!(err.rule_numbers(), vec!["1"]);
    }
}
