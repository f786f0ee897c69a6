use anyhow::Context;
use bagprofile_core::{NumberedRule, RuleCatalog, PROFILE_VERSION};
use serde::Serialize;

use crate::cli::args::{OutputFormat, RulesArgs};
use crate::exit_codes;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RuleListing<'a> {
    number: &'a str,
    description: &'a str,
    depends_on: &'a [String],
    variant: String,
    context: String,
}

impl<'a> From<&'a NumberedRule> for RuleListing<'a> {
    fn from(rule: &'a NumberedRule) -> Self {
        Self {
            number: rule.number(),
            description: rule.description(),
            depends_on: rule.dependencies(),
            variant: rule.variant().to_string(),
            context: rule.context().to_string(),
        }
    }
}

pub fn run(args: RulesArgs) -> anyhow::Result<i32> {
    let catalog = RuleCatalog::builtin().context("built-in rule catalog is inconsistent")?;

    let listing: Vec<RuleListing<'_>> = catalog
        .rules()
        .iter()
        .filter(|r| {
            args.variant.map_or(true, |v| r.variant().matches(v.into()))
                && args.context.map_or(true, |c| r.context().matches(c.into()))
        })
        .map(RuleListing::from)
        .collect();

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&listing)?),
        OutputFormat::Text => {
            println!("Profile version {}", PROFILE_VERSION);
            for rule in &listing {
                let deps = if rule.depends_on.is_empty() {
                    String::new()
                } else {
                    format!(" [after {}]", rule.depends_on.join(", "))
                };
                println!(
                    "{:<10} {:<17} {:<22} {}{}",
                    rule.number, rule.variant, rule.context, rule.description, deps
                );
            }
        }
    }
    Ok(exit_codes::COMPLIANT)
}
