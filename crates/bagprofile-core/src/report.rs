//! Reduce per-rule evaluations to the result surface handed to callers.

use crate::engine::{EvaluationStatus, RuleEvaluation};
use crate::types::{PackageVariant, ValidationContext, ValidationRequest, PROFILE_VERSION};
use serde::Serialize;
use std::fmt::Write as _;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleViolation {
    pub rule: String,
    pub violation: String,
}

/// Verdict for one bag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub bag_location: String,
    pub bag_name: String,
    pub profile_version: String,
    pub info_package_type: PackageVariant,
    pub validation_context: ValidationContext,
    pub is_compliant: bool,
    pub rule_violations: Vec<RuleViolation>,
}

/// Counts per evaluation status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EvaluationSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl EvaluationSummary {
    pub fn of(evaluations: &[RuleEvaluation]) -> Self {
        evaluations
            .iter()
            .fold(Self::default(), |mut acc, e| {
                acc.total += 1;
                match e.status {
                    EvaluationStatus::Success => acc.succeeded += 1,
                    EvaluationStatus::Failure(_) => acc.failed += 1,
                    EvaluationStatus::Skipped => acc.skipped += 1,
                }
                acc
            })
    }
}

/// Build the report for `request`. Only failures are reported as violations;
/// skipped rules are not violations.
pub fn build_report(request: &ValidationRequest, evaluations: &[RuleEvaluation]) -> ValidationReport {
    let rule_violations: Vec<RuleViolation> = evaluations
        .iter()
        .filter_map(|e| match &e.status {
            EvaluationStatus::Failure(message) => Some(RuleViolation {
                rule: e.rule.clone(),
                violation: message.clone(),
            }),
            _ => None,
        })
        .collect();

    ValidationReport {
        bag_location: request.bag_dir.display().to_string(),
        bag_name: request.bag_name(),
        profile_version: PROFILE_VERSION.to_string(),
        info_package_type: request.variant,
        validation_context: request.context,
        is_compliant: rule_violations.is_empty(),
        rule_violations,
    }
}

impl ValidationReport {
    /// Violation message for `rule`, if it failed.
    pub fn violation(&self, rule: &str) -> Option<&str> {
        self.rule_violations
            .iter()
            .find(|v| v.rule == rule)
            .map(|v| v.violation.as_str())
    }

    /// Human-readable rendering.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Bag:              {}", self.bag_name);
        let _ = writeln!(out, "Location:         {}", self.bag_location);
        let _ = writeln!(out, "Profile version:  {}", self.profile_version);
        let _ = writeln!(out, "Package type:     {}", self.info_package_type);
        let _ = writeln!(out, "Context:          {}", self.validation_context);
        let _ = writeln!(
            out,
            "Compliant:        {}",
            if self.is_compliant { "yes" } else { "no" }
        );
        if !self.rule_violations.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "Rule violations:");
            for v in &self.rule_violations {
                let _ = writeln!(out, "  [{}] {}", v.rule, v.violation);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(rule: &str, status: EvaluationStatus) -> RuleEvaluation {
        RuleEvaluation {
            rule: rule.into(),
            status,
        }
    }

    #[test]
    fn only_failures_are_violations() {
        let request = ValidationRequest::new("/bags/b1");
        let evaluations = vec![
            eval("1.1", EvaluationStatus::Success),
            eval("1.2", EvaluationStatus::Failure("missing".into())),
            eval("1.3", EvaluationStatus::Skipped),
        ];
        let report = build_report(&request, &evaluations);

        assert!(!report.is_compliant);
        assert_eq!(
            report.rule_violations,
            vec![RuleViolation {
                rule: "1.2".into(),
                violation: "missing".into()
            }]
        );
        assert_eq!(report.violation("1.3"), None);
        assert_eq!(report.profile_version, PROFILE_VERSION);
    }

    #[test]
    fn skipped_only_run_is_compliant() {
        let request = ValidationRequest::new("/bags/b1");
        let report = build_report(&request, &[eval("1.1", EvaluationStatus::Skipped)]);
        assert!(report.is_compliant);
    }

    #[test]
    fn json_uses_camel_case_keys() {
        let request = ValidationRequest::new("/bags/b1")
            .with_variant(PackageVariant::LegacyMigration);
        let json = serde_json::to_value(build_report(&request, &[])).unwrap();
        assert_eq!(json["bagName"], "b1");
        assert_eq!(json["isCompliant"], true);
        assert_eq!(json["infoPackageType"], "legacy-migration");
        assert_eq!(json["ruleViolations"], serde_json::json!([]));
    }

    #[test]
    fn summary_counts_each_status() {
        let summary = EvaluationSummary::of(&[
            eval("1", EvaluationStatus::Success),
            eval("2", EvaluationStatus::Failure("x".into())),
            eval("3", EvaluationStatus::Skipped),
            eval("4", EvaluationStatus::Skipped),
        ]);
        assert_eq!(
            summary,
            EvaluationSummary {
                total: 4,
                succeeded: 1,
                failed: 1,
                skipped: 2
            }
        );
    }

    #[test]
    fn text_lists_violations() {
        let request = ValidationRequest::new("/bags/b1");
        let report = build_report(
            &request,
            &[eval("2.2(a)", EvaluationStatus::Failure("no dataset.xml".into()))],
        );
        let text = report.to_text();
        assert!(text.contains("Compliant:        no"));
        assert!(text.contains("[2.2(a)] no dataset.xml"));
    }
}
