//! Schema names and the built-in structural schema checker.

use super::document::{XmlDocument, XmlElement};
use super::{ns, XmlError, XmlReader};
use std::path::Path;

/// Schemas referenced by the profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaName {
    /// Dataset metadata (`metadata/dataset.xml`).
    Ddm,
    /// File metadata (`metadata/files.xml`).
    Files,
}

impl SchemaName {
    pub fn location(&self) -> &'static str {
        match self {
            SchemaName::Ddm => "https://easy.dans.knaw.nl/schemas/md/ddm/ddm.xsd",
            SchemaName::Files => "https://easy.dans.knaw.nl/schemas/bag/metadata/files/files.xsd",
        }
    }
}

impl std::fmt::Display for SchemaName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaName::Ddm => write!(f, "ddm"),
            SchemaName::Files => write!(f, "files"),
        }
    }
}

/// Cardinality constraint on a child element.
struct Child {
    ns: &'static str,
    local: &'static str,
    min: usize,
    max: Option<usize>,
}

const fn child(ns: &'static str, local: &'static str, min: usize, max: Option<usize>) -> Child {
    Child { ns, local, min, max }
}

const DDM_PROFILE: &[Child] = &[
    child(ns::DC, "title", 1, None),
    child(ns::DCTERMS, "description", 1, None),
    child(ns::DDM, "created", 1, Some(1)),
    child(ns::DDM, "available", 1, Some(1)),
    child(ns::DDM, "audience", 1, None),
    child(ns::DDM, "accessRights", 1, Some(1)),
];

/// [`XmlReader`] backed by `roxmltree`, checking the structural core of each
/// schema: root element, required children and their cardinality, and the
/// lexical form of date elements.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralSchemas;

impl XmlReader for StructuralSchemas {
    fn parse(&self, path: &Path, bytes: &[u8]) -> Result<XmlDocument, XmlError> {
        let text = std::str::from_utf8(bytes).map_err(|e| XmlError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        XmlDocument::parse_str(path, text)
    }

    fn conforms_to_schema(&self, document: &XmlDocument, schema: SchemaName) -> Vec<String> {
        match schema {
            SchemaName::Ddm => check_ddm(&document.root),
            SchemaName::Files => check_files(&document.root),
        }
    }
}

fn check_ddm(root: &XmlElement) -> Vec<String> {
    if !root.is(ns::DDM, "DDM") {
        return vec![format!("root element must be ddm:DDM, found {}", root.name)];
    }

    let mut violations = Vec::new();
    let profiles: Vec<_> = root.children_named(ns::DDM, "profile").collect();
    if profiles.len() != 1 {
        violations.push(format!(
            "ddm:DDM must contain exactly one ddm:profile, found {}",
            profiles.len()
        ));
    }
    let metadata_count = root.children_named(ns::DDM, "dcmiMetadata").count();
    if metadata_count > 1 {
        violations.push(format!(
            "ddm:DDM may contain at most one ddm:dcmiMetadata, found {}",
            metadata_count
        ));
    }

    if let Some(profile) = profiles.first() {
        violations.extend(check_children(profile, "ddm:profile", DDM_PROFILE));

        let creators = profile.children_named(ns::DC, "creator").count()
            + profile.children_named(ns::DCX_DAI, "creatorDetails").count();
        if creators == 0 {
            violations.push(
                "ddm:profile must contain dc:creator or dcx-dai:creatorDetails".to_string(),
            );
        }

        for local in ["created", "available"] {
            for el in profile.children_named(ns::DDM, local) {
                if !is_xs_date_like(el.text()) {
                    violations.push(format!(
                        "ddm:{} value '{}' is not a valid date",
                        local,
                        el.text()
                    ));
                }
            }
        }
    }

    violations
}

fn check_files(root: &XmlElement) -> Vec<String> {
    if !root.is(ns::FILES, "files") {
        return vec![format!("root element must be files, found {}", root.name)];
    }

    let mut violations = Vec::new();
    for (idx, el) in root.children.iter().enumerate() {
        if !el.is(ns::FILES, "file") {
            violations.push(format!("unexpected element {} at position {}", el.name, idx + 1));
            continue;
        }
        match el.attribute(None, "filepath") {
            Some(p) if !p.trim().is_empty() => {}
            _ => violations.push(format!(
                "file element at position {} lacks a filepath attribute",
                idx + 1
            )),
        }
    }
    violations
}

fn check_children(parent: &XmlElement, parent_name: &str, rules: &[Child]) -> Vec<String> {
    rules
        .iter()
        .filter_map(|c| {
            let count = parent.children_named(c.ns, c.local).count();
            if count < c.min {
                Some(format!("{} is missing required element {}", parent_name, c.local))
            } else if c.max.is_some_and(|max| count > max) {
                Some(format!(
                    "{} contains {} {} elements, at most {} allowed",
                    parent_name,
                    count,
                    c.local,
                    c.max.unwrap_or_default()
                ))
            } else {
                None
            }
        })
        .collect()
}

/// `YYYY`, `YYYY-MM`, `YYYY-MM-DD` or an RFC 3339 date-time.
pub(crate) fn is_xs_date_like(value: &str) -> bool {
    parse_date_like(value).is_some()
}

/// First day of the period denoted by a date-like value.
pub(crate) fn parse_date_like(value: &str) -> Option<chrono::NaiveDate> {
    use chrono::NaiveDate;
    let value = value.trim();
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(value) {
        return Some(dt.date_naive());
    }
    if let Ok(d) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(d);
    }
    let parts: Vec<&str> = value.split('-').collect();
    match parts.as_slice() {
        [y] if y.len() == 4 => NaiveDate::from_ymd_opt(y.parse().ok()?, 1, 1),
        [y, m] if y.len() == 4 && m.len() == 2 => {
            NaiveDate::from_ymd_opt(y.parse().ok()?, m.parse().ok()?, 1)
        }
        _ => None,
    }
}
