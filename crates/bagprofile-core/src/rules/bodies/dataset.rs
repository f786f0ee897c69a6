//! Section 3.1: dataset metadata (`metadata/dataset.xml`).

use super::{parse_document, DATASET_XML};
use crate::rules::{RuleContext, RuleOutcome};
use crate::validators::{is_valid_identifier, validate_pos_list, IdentifierKind};
use crate::xml::{ns, SchemaName, XmlElement};

/// RD (EPSG:28992) bounds for points in the Netherlands.
const RD_X_RANGE: (f64, f64) = (-7_000.0, 300_000.0);
const RD_Y_RANGE: (f64, f64) = (289_000.0, 629_000.0);

/// 3.1.1
pub fn conforms_to_ddm(ctx: &RuleContext<'_>) -> anyhow::Result<RuleOutcome> {
    let document = match parse_document(ctx, DATASET_XML)? {
        Ok(d) => d,
        Err(e) => return Ok(RuleOutcome::error(e.to_string())),
    };
    let violations = ctx.xml.conforms_to_schema(&document, SchemaName::Ddm);
    Ok(RuleOutcome::from_problems(
        violations
            .into_iter()
            .map(|v| format!("{} does not conform to {}: {}", DATASET_XML, SchemaName::Ddm.location(), v))
            .collect(),
    ))
}

/// `dcterms:license` elements typed `dcterms:URI`.
fn uri_licenses(root: &XmlElement) -> Vec<&XmlElement> {
    root.descendants_named(ns::DCTERMS, "license")
        .into_iter()
        .filter(|el| {
            el.attribute(Some(ns::XSI), "type")
                .and_then(|t| el.resolve_qname(t))
                .is_some_and(|q| q.is(ns::DCTERMS, "URI"))
        })
        .collect()
}

fn check_licenses(ctx: &RuleContext<'_>, min: usize) -> anyhow::Result<RuleOutcome> {
    let document = ctx.read_xml(DATASET_XML)?;
    let licenses = uri_licenses(&document.root);

    if licenses.len() < min || licenses.len() > 1 {
        let expected = if min == 1 { "exactly one" } else { "at most one" };
        return Ok(RuleOutcome::error(format!(
            "{} must contain {} dcterms:license with xsi:type dcterms:URI; found {}",
            DATASET_XML,
            expected,
            licenses.len()
        )));
    }

    Ok(RuleOutcome::from_problems(
        licenses
            .iter()
            .filter(|l| !ctx.settings.is_allowed_license(l.text()))
            .map(|l| format!("license '{}' is not on the list of accepted licenses", l.text()))
            .collect(),
    ))
}

/// 3.1.2 (standard)
pub fn has_exactly_one_license(ctx: &RuleContext<'_>) -> anyhow::Result<RuleOutcome> {
    check_licenses(ctx, 1)
}

/// 3.1.2 (legacy-migration)
pub fn has_at_most_one_license(ctx: &RuleContext<'_>) -> anyhow::Result<RuleOutcome> {
    check_licenses(ctx, 0)
}

fn check_identifiers(
    ctx: &RuleContext<'_>,
    local: &str,
    kind: IdentifierKind,
) -> anyhow::Result<RuleOutcome> {
    let document = ctx.read_xml(DATASET_XML)?;
    Ok(RuleOutcome::from_problems(
        document
            .root
            .descendants_named(ns::DCX_DAI, local)
            .into_iter()
            .filter(|el| !is_valid_identifier(kind, el.text()))
            .map(|el| format!("invalid {}: '{}'", kind, el.text()))
            .collect(),
    ))
}

/// 3.1.3(a)
pub fn dais_are_valid(ctx: &RuleContext<'_>) -> anyhow::Result<RuleOutcome> {
    check_identifiers(ctx, "DAI", IdentifierKind::Dai)
}

/// 3.1.3(b)
pub fn isnis_are_valid(ctx: &RuleContext<'_>) -> anyhow::Result<RuleOutcome> {
    check_identifiers(ctx, "ISNI", IdentifierKind::Isni)
}

/// 3.1.3(c)
pub fn orcids_are_valid(ctx: &RuleContext<'_>) -> anyhow::Result<RuleOutcome> {
    check_identifiers(ctx, "ORCID", IdentifierKind::Orcid)
}

fn has_text_child(el: &XmlElement, local: &str) -> bool {
    el.children_named(ns::DCX_DAI, local)
        .any(|c| !c.text().is_empty())
}

/// 3.1.4
pub fn authors_are_named(ctx: &RuleContext<'_>) -> anyhow::Result<RuleOutcome> {
    let document = ctx.read_xml(DATASET_XML)?;
    let problems = document
        .root
        .descendants_named(ns::DCX_DAI, "author")
        .into_iter()
        .enumerate()
        .filter(|(_, author)| {
            let named_organization = author
                .children_named(ns::DCX_DAI, "organization")
                .any(|org| has_text_child(org, "name"));
            !has_text_child(author, "surname") && !named_organization
        })
        .map(|(idx, _)| {
            format!(
                "author {} has neither a surname nor an organization name",
                idx + 1
            )
        })
        .collect();
    Ok(RuleOutcome::from_problems(problems))
}

/// 3.1.5
pub fn polygons_are_closed(ctx: &RuleContext<'_>) -> anyhow::Result<RuleOutcome> {
    let document = ctx.read_xml(DATASET_XML)?;
    let problems = document
        .root
        .descendants_named(ns::GML, "posList")
        .into_iter()
        .enumerate()
        .filter_map(|(idx, el)| {
            validate_pos_list(el.text())
                .err()
                .map(|e| format!("gml:posList {}: {}", idx + 1, e))
        })
        .collect();
    Ok(RuleOutcome::from_problems(problems))
}

fn is_rd(srs_name: Option<&str>) -> bool {
    srs_name.is_some_and(|s| s.contains("28992"))
}

fn check_point(point: &XmlElement) -> Option<String> {
    let pos = point
        .children_named(ns::GML, "pos")
        .next()
        .map(|p| p.text().to_string())
        .unwrap_or_default();

    let coordinates: Option<Vec<f64>> = pos.split_whitespace().map(|v| v.parse().ok()).collect();
    let Some(&[x, y]) = coordinates.as_deref() else {
        return Some(format!("gml:pos '{}' must hold two numeric coordinates", pos));
    };

    if is_rd(point.attribute(None, "srsName")) {
        let in_x = (RD_X_RANGE.0..=RD_X_RANGE.1).contains(&x);
        let in_y = (RD_Y_RANGE.0..=RD_Y_RANGE.1).contains(&y);
        if !(in_x && in_y) {
            return Some(format!(
                "RD point ({} {}) lies outside x [{}, {}], y [{}, {}]",
                x, y, RD_X_RANGE.0, RD_X_RANGE.1, RD_Y_RANGE.0, RD_Y_RANGE.1
            ));
        }
    }
    None
}

/// 3.1.6
pub fn points_are_in_range(ctx: &RuleContext<'_>) -> anyhow::Result<RuleOutcome> {
    let document = ctx.read_xml(DATASET_XML)?;
    let problems = document
        .root
        .descendants_named(ns::GML, "Point")
        .into_iter()
        .filter_map(check_point)
        .collect();
    Ok(RuleOutcome::from_problems(problems))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::XmlDocument;
    use std::path::Path;

    fn point(xml: &str) -> Option<String> {
        let doc = XmlDocument::parse_str(Path::new("p.xml"), xml).unwrap();
        check_point(&doc.root)
    }

    #[test]
    fn rd_point_in_range() {
        assert_eq!(
            point(r#"<gml:Point xmlns:gml="http://www.opengis.net/gml" srsName="urn:ogc:def:crs:EPSG::28992"><gml:pos>155000 463000</gml:pos></gml:Point>"#),
            None
        );
    }

    #[test]
    fn rd_point_out_of_range() {
        let problem = point(r#"<gml:Point xmlns:gml="http://www.opengis.net/gml" srsName="urn:ogc:def:crs:EPSG::28992"><gml:pos>52.1 5.3</gml:pos></gml:Point>"#);
        assert!(problem.unwrap().contains("outside"));
    }

    #[test]
    fn non_numeric_point() {
        let problem = point(r#"<gml:Point xmlns:gml="http://www.opengis.net/gml"><gml:pos>a b</gml:pos></gml:Point>"#);
        assert!(problem.unwrap().contains("two numeric coordinates"));
    }

    #[test]
    fn wgs84_point_is_not_range_checked() {
        assert_eq!(
            point(r#"<gml:Point xmlns:gml="http://www.opengis.net/gml"><gml:pos>52.1 5.3</gml:pos></gml:Point>"#),
            None
        );
    }
}
