//! Check digit validation for person and organization identifiers.
//!
//! DAI, ORCID and ISNI share the mod-11-2 family of check digits. ORCID and
//! ISNI use ISO 7064 MOD 11-2 over 16 characters; DAI weights the reversed
//! digits with a cycling 2..=9 pattern over 11 characters.
//!
//! Identifiers may be given bare (`0000-0002-1825-0097`), as a URN
//! (`info:eu-repo/dai/nl/123456789`), as a URI (`https://orcid.org/...`) or as
//! host + path without scheme (`orcid.org/...`). A URI whose host is not
//! recognized for the identifier type is invalid regardless of its digits.

use url::Url;

/// Identifier families sharing the mod-11-2 check digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierKind {
    Dai,
    Orcid,
    Isni,
}

impl IdentifierKind {
    fn urn_prefixes(&self) -> &'static [&'static str] {
        match self {
            IdentifierKind::Dai => &["info:eu-repo/dai/nl/", "info:eu-repo/dai/"],
            IdentifierKind::Orcid => &[],
            IdentifierKind::Isni => &["urn:isni:"],
        }
    }

    fn hosts(&self) -> &'static [&'static str] {
        match self {
            IdentifierKind::Dai => &[],
            IdentifierKind::Orcid => &["orcid.org", "www.orcid.org", "sandbox.orcid.org"],
            IdentifierKind::Isni => &["isni.org", "www.isni.org", "isni.oclc.org"],
        }
    }

    fn path_prefixes(&self) -> &'static [&'static str] {
        match self {
            IdentifierKind::Isni => &["isni/"],
            _ => &[],
        }
    }

    fn expected_len(&self) -> usize {
        match self {
            IdentifierKind::Dai => 11,
            IdentifierKind::Orcid | IdentifierKind::Isni => 16,
        }
    }
}

impl std::fmt::Display for IdentifierKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IdentifierKind::Dai => write!(f, "DAI"),
            IdentifierKind::Orcid => write!(f, "ORCID"),
            IdentifierKind::Isni => write!(f, "ISNI"),
        }
    }
}

/// Validate an identifier's check digit. Malformed input is invalid, never an error.
pub fn is_valid_identifier(kind: IdentifierKind, value: &str) -> bool {
    let Some(bare) = strip_prefix(kind, value.trim()) else {
        return false;
    };

    // Separators go; only digits and the 'X' check character remain.
    let cleaned: Vec<char> = bare
        .chars()
        .map(|c| c.to_ascii_uppercase())
        .filter(|c| c.is_ascii_digit() || *c == 'X')
        .collect();

    if cleaned.len() != kind.expected_len() {
        return false;
    }

    let (body, check) = cleaned.split_at(cleaned.len() - 1);
    let Some(digits) = body
        .iter()
        .map(|c| c.to_digit(10))
        .collect::<Option<Vec<u32>>>()
    else {
        return false;
    };

    let expected = match kind {
        IdentifierKind::Dai => dai_check_char(&digits),
        IdentifierKind::Orcid | IdentifierKind::Isni => iso7064_check_char(&digits),
    };
    check[0] == expected
}

/// Remove a URN prefix, a URI, or a scheme-less host + path form.
///
/// Returns `None` when the value is a URI that does not parse or whose host
/// is not recognized for `kind`.
fn strip_prefix(kind: IdentifierKind, value: &str) -> Option<String> {
    let lower = value.to_ascii_lowercase();

    for prefix in kind.urn_prefixes() {
        if lower.starts_with(prefix) {
            return Some(value[prefix.len()..].to_string());
        }
    }

    if value.contains("://") {
        let url = Url::parse(value).ok()?;
        let host = url.host_str()?.to_ascii_lowercase();
        if !kind.hosts().contains(&host.as_str()) {
            return None;
        }
        return Some(strip_path_prefix(kind, url.path().trim_start_matches('/')));
    }

    for host in kind.hosts() {
        if let Some(rest) = lower.strip_prefix(&format!("{}/", host)) {
            let offset = value.len() - rest.len();
            return Some(strip_path_prefix(kind, &value[offset..]));
        }
    }

    Some(value.to_string())
}

fn strip_path_prefix(kind: IdentifierKind, path: &str) -> String {
    for prefix in kind.path_prefixes() {
        if let Some(rest) = path.strip_prefix(prefix) {
            return rest.to_string();
        }
    }
    path.to_string()
}

/// ISO 7064 MOD 11-2.
fn iso7064_check_char(digits: &[u32]) -> char {
    let total = digits.iter().fold(0u32, |acc, d| ((acc + d) * 2) % 11);
    to_check_char((12 - total % 11) % 11)
}

/// Reversed digits weighted 2, 3, .., 9, 2, 3, ..
fn dai_check_char(digits: &[u32]) -> char {
    let sum: u32 = digits
        .iter()
        .rev()
        .zip((2..=9u32).cycle())
        .map(|(d, w)| d * w)
        .sum();
    to_check_char((11 - sum % 11) % 11)
}

fn to_check_char(value: u32) -> char {
    match value {
        10 => 'X',
        v => char::from_digit(v, 10).unwrap_or('?'),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dai_check_digit() {
        assert!(is_valid_identifier(IdentifierKind::Dai, "12345678900"));
        for last in "123456789X".chars() {
            let value = format!("1234567890{}", last);
            assert!(
                !is_valid_identifier(IdentifierKind::Dai, &value),
                "{} should be invalid",
                value
            );
        }
    }

    #[test]
    fn dai_with_urn_prefix() {
        assert!(is_valid_identifier(
            IdentifierKind::Dai,
            "info:eu-repo/dai/nl/12345678900"
        ));
    }

    #[test]
    fn dai_rejects_uri_form() {
        assert!(!is_valid_identifier(
            IdentifierKind::Dai,
            "https://example.org/12345678900"
        ));
    }

    #[test]
    fn orcid_uri() {
        assert!(is_valid_identifier(
            IdentifierKind::Orcid,
            "https://orcid.org/0000-0002-1825-0097"
        ));
        assert!(!is_valid_identifier(
            IdentifierKind::Orcid,
            "https://orcid.org/0000-0002-1825-0098"
        ));
    }

    #[test]
    fn orcid_bare_and_host_path() {
        assert!(is_valid_identifier(IdentifierKind::Orcid, "0000-0002-1825-0097"));
        assert!(is_valid_identifier(
            IdentifierKind::Orcid,
            "orcid.org/0000-0002-1825-0097"
        ));
    }

    #[test]
    fn unrecognized_host_is_invalid() {
        assert!(!is_valid_identifier(
            IdentifierKind::Orcid,
            "https://example.com/0000-0002-1825-0097"
        ));
    }

    #[test]
    fn isni_with_x_check_char() {
        assert!(is_valid_identifier(IdentifierKind::Isni, "000000012281955X"));
        assert!(is_valid_identifier(
            IdentifierKind::Isni,
            "http://isni.org/isni/000000012281955X"
        ));
        assert!(is_valid_identifier(
            IdentifierKind::Isni,
            "urn:isni:000000012281955X"
        ));
        assert!(!is_valid_identifier(IdentifierKind::Isni, "0000000122819551"));
    }

    #[test]
    fn malformed_input_is_invalid() {
        assert!(!is_valid_identifier(IdentifierKind::Orcid, ""));
        assert!(!is_valid_identifier(IdentifierKind::Orcid, "0000-0002-1825"));
        assert!(!is_valid_identifier(IdentifierKind::Orcid, "0000-000A-1825-0097"));
        assert!(!is_valid_identifier(IdentifierKind::Orcid, "https://"));
    }

    #[test]
    fn any_non_digit_separator_is_stripped() {
        assert!(is_valid_identifier(IdentifierKind::Orcid, "0000 0002.1825/0097"));
        assert!(is_valid_identifier(IdentifierKind::Isni, "0000 0001 2281 955x"));
        assert!(is_valid_identifier(IdentifierKind::Dai, "123.456.789-00"));
    }

    #[test]
    fn short_dai_is_invalid_without_padding() {
        // 123456789 padded to 00123456789 would carry a valid check digit.
        assert!(!is_valid_identifier(IdentifierKind::Dai, "123456789"));
        assert!(!is_valid_identifier(IdentifierKind::Dai, "0123456789"));
    }
}
