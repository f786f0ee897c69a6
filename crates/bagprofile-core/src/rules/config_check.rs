//! Static consistency check of a rule catalog.
//!
//! Runs once, before any bag is validated. Every problem is collected;
//! a catalog with problems must never be used.

use super::{Applicability, NumberedRule};
use crate::types::{PackageVariant, ValidationContext};
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigProblem {
    /// The number is used by rules whose variant applicability overlaps.
    Duplicate { number: String },
    /// A dependency is absent from the active rule set in some combination
    /// in which the dependent is active.
    UnresolvedDependency {
        number: String,
        dependency: String,
        combinations: Vec<(PackageVariant, ValidationContext)>,
    },
}

impl std::fmt::Display for ConfigProblem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigProblem::Duplicate { number } => write!(
                f,
                "rule {} is defined more than once with overlapping applicability",
                number
            ),
            ConfigProblem::UnresolvedDependency {
                number,
                dependency,
                combinations,
            } => {
                let combos: Vec<String> = combinations
                    .iter()
                    .map(|(v, c)| format!("{}/{}", v, c))
                    .collect();
                write!(
                    f,
                    "rule {} depends on {}, which is not active under {}",
                    number,
                    dependency,
                    combos.join(", ")
                )
            }
        }
    }
}

/// Catalog configuration error listing every problem found.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid rule configuration: {}", render(.problems))]
pub struct ConfigError {
    pub problems: Vec<ConfigProblem>,
}

fn render(problems: &[ConfigProblem]) -> String {
    problems
        .iter()
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl ConfigError {
    /// Numbers of the rules named by any problem, in report order.
    pub fn rule_numbers(&self) -> Vec<&str> {
        self.problems
            .iter()
            .map(|p| match p {
                ConfigProblem::Duplicate { number } => number.as_str(),
                ConfigProblem::UnresolvedDependency { number, .. } => number.as_str(),
            })
            .collect()
    }
}

/// Check duplicate numbers and dependency satisfiability.
pub fn check_catalog(rules: &[NumberedRule]) -> Result<(), ConfigError> {
    let mut problems = find_duplicates(rules);
    problems.extend(find_unresolved_dependencies(rules));

    if problems.is_empty() {
        Ok(())
    } else {
        Err(ConfigError { problems })
    }
}

/// Reuse of a number is only allowed for pairwise disjoint, restricted variants.
fn find_duplicates(rules: &[NumberedRule]) -> Vec<ConfigProblem> {
    let mut groups: BTreeMap<&str, Vec<&NumberedRule>> = BTreeMap::new();
    let mut order: Vec<&str> = Vec::new();
    for rule in rules {
        let group = groups.entry(rule.number()).or_default();
        if group.is_empty() {
            order.push(rule.number());
        }
        group.push(rule);
    }

    order
        .into_iter()
        .filter(|number| {
            let group = &groups[number];
            group.iter().enumerate().any(|(i, a)| {
                group[i + 1..]
                    .iter()
                    .any(|b| !disjoint_variants(a.variant(), b.variant()))
            })
        })
        .map(|number| ConfigProblem::Duplicate {
            number: number.to_string(),
        })
        .collect()
}

fn disjoint_variants(
    a: Applicability<PackageVariant>,
    b: Applicability<PackageVariant>,
) -> bool {
    matches!((a, b), (Applicability::Only(x), Applicability::Only(y)) if x != y)
}

/// For every variant x context combination, each active rule's dependencies
/// must be active too.
fn find_unresolved_dependencies(rules: &[NumberedRule]) -> Vec<ConfigProblem> {
    let mut unresolved: Vec<ConfigProblem> = Vec::new();

    for variant in PackageVariant::ALL {
        for context in ValidationContext::ALL {
            let active: Vec<&NumberedRule> = rules
                .iter()
                .filter(|r| r.applies_to(variant, context))
                .collect();
            let numbers: HashSet<&str> = active.iter().map(|r| r.number()).collect();

            for rule in &active {
                for dependency in rule.dependencies() {
                    if numbers.contains(dependency.as_str()) {
                        continue;
                    }
                    record_unresolved(&mut unresolved, rule.number(), dependency, (variant, context));
                }
            }
        }
    }

    unresolved
}

fn record_unresolved(
    problems: &mut Vec<ConfigProblem>,
    number: &str,
    dependency: &str,
    combination: (PackageVariant, ValidationContext),
) {
    for problem in problems.iter_mut() {
        if let ConfigProblem::UnresolvedDependency {
            number: n,
            dependency: d,
            combinations,
        } = problem
        {
            if n.as_str() == number && d.as_str() == dependency {
                if !combinations.contains(&combination) {
                    combinations.push(combination);
                }
                return;
            }
        }
    }
    problems.push(ConfigProblem::UnresolvedDependency {
        number: number.to_string(),
        dependency: dependency.to_string(),
        combinations: vec![combination],
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{RuleContext, RuleOutcome};

    fn ok(_: &RuleContext<'_>) -> anyhow::Result<RuleOutcome> {
        Ok(RuleOutcome::Success)
    }

    fn rule(number: &str) -> NumberedRule {
        NumberedRule::new(number, "test rule", ok)
    }

    #[test]
    fn valid_catalog_passes() {
        let rules = vec![rule("1.1"), rule("1.2").depends_on(&["1.1"])];
        assert_eq!(check_catalog(&rules), Ok(()));
    }

    #[test]
    fn unrestricted_duplicate_is_reported() {
        let rules = vec![rule("1.1"), rule("1.1")];
        let err = check_catalog(&rules).unwrap_err();
        assert_eq!(
            err.problems,
            vec![ConfigProblem::Duplicate {
                number: "1.1".into()
            }]
        );
        assert!(err.to_string().contains("1.1"));
    }

    #[test]
    fn restricted_and_unrestricted_duplicate_is_reported() {
        let rules = vec![rule("2.3").only_for(PackageVariant::Standard), rule("2.3")];
        assert_eq!(check_catalog(&rules).unwrap_err().rule_numbers(), vec!["2.3"]);
    }

    #[test]
    fn same_variant_duplicate_is_reported() {
        let rules = vec![
            rule("2.3").only_for(PackageVariant::Standard),
            rule("2.3").only_for(PackageVariant::Standard),
        ];
        assert!(check_catalog(&rules).is_err());
    }

    #[test]
    fn disjoint_variant_duplicate_is_allowed() {
        let rules = vec![
            rule("2.3").only_for(PackageVariant::Standard),
            rule("2.3").only_for(PackageVariant::LegacyMigration),
        ];
        assert_eq!(check_catalog(&rules), Ok(()));
    }

    #[test]
    fn missing_dependency_is_reported_for_every_combination() {
        let rules = vec![rule("1.2").depends_on(&["9.9"])];
        let err = check_catalog(&rules).unwrap_err();
        match &err.problems[..] {
            [ConfigProblem::UnresolvedDependency {
                number,
                dependency,
                combinations,
            }] => {
                assert_eq!(number, "1.2");
                assert_eq!(dependency, "9.9");
                assert_eq!(combinations.len(), 4);
            }
            other => panic!("unexpected problems: {:?}", other),
        }
    }

    #[test]
    fn dependency_restricted_to_one_variant_is_unsatisfiable_for_unrestricted_dependent() {
        let rules = vec![
            rule("1.1").only_for(PackageVariant::Standard),
            rule("1.2").depends_on(&["1.1"]),
        ];
        let err = check_catalog(&rules).unwrap_err();
        assert_eq!(err.rule_numbers(), vec!["1.2"]);
        match &err.problems[0] {
            ConfigProblem::UnresolvedDependency { combinations, .. } => {
                assert!(combinations
                    .iter()
                    .all(|(v, _)| *v == PackageVariant::LegacyMigration));
                assert_eq!(combinations.len(), 2);
            }
            other => panic!("unexpected problem: {:?}", other),
        }
    }

    #[test]
    fn dependency_restricted_to_context_is_unsatisfiable_outside_it() {
        let rules = vec![
            rule("4.1").only_in(ValidationContext::WithExternalContext),
            rule("4.2").depends_on(&["4.1"]),
        ];
        let err = check_catalog(&rules).unwrap_err();
        assert_eq!(err.rule_numbers(), vec!["4.2"]);
    }

    #[test]
    fn dependent_restricted_like_its_dependency_is_satisfiable() {
        let rules = vec![
            rule("4.1")
                .only_for(PackageVariant::Standard)
                .only_in(ValidationContext::WithExternalContext),
            rule("4.2")
                .depends_on(&["4.1"])
                .only_for(PackageVariant::Standard)
                .only_in(ValidationContext::WithExternalContext),
        ];
        assert_eq!(check_catalog(&rules), Ok(()));
    }

    #[test]
    fn every_problem_is_reported() {
        let rules = vec![
            rule("1.1"),
            rule("1.1"),
            rule("1.2").depends_on(&["8.8"]),
            rule("1.3").depends_on(&["9.9"]),
        ];
        let err = check_catalog(&rules).unwrap_err();
        assert_eq!(err.rule_numbers(), vec!["1.1", "1.2", "1.3"]);
    }
}
