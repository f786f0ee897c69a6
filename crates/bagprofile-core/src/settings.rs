//! Profile settings supplied by configuration.

use serde::Deserialize;
use url::Url;

/// License URIs accepted when no list is configured.
pub const DEFAULT_LICENSES: &[&str] = &[
    "http://creativecommons.org/publicdomain/zero/1.0",
    "http://creativecommons.org/licenses/by/4.0",
    "http://creativecommons.org/licenses/by-sa/4.0",
    "http://creativecommons.org/licenses/by-nc/4.0",
    "http://creativecommons.org/licenses/by-nc-sa/4.0",
    "http://creativecommons.org/licenses/by-nd/4.0",
    "http://creativecommons.org/licenses/by-nc-nd/4.0",
    "http://opensource.org/licenses/MIT",
    "http://www.apache.org/licenses/LICENSE-2.0",
    "http://dans.knaw.nl/en/about/organisation-and-policy/legal-information/DANSLicence.pdf",
];

/// Roles allowed to deposit a new version of an existing dataset.
pub const DEFAULT_UPDATE_ROLES: &[&str] = &["contributorplus", "curator", "swordupdater"];

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProfileSettings {
    pub licenses: Vec<String>,
    pub update_roles: Vec<String>,
}

impl Default for ProfileSettings {
    fn default() -> Self {
        Self {
            licenses: DEFAULT_LICENSES.iter().map(|s| s.to_string()).collect(),
            update_roles: DEFAULT_UPDATE_ROLES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl ProfileSettings {
    /// Whether `uri` is on the license list. Scheme (http/https), host case
    /// and a trailing slash are ignored.
    pub fn is_allowed_license(&self, uri: &str) -> bool {
        let Some(wanted) = normalize_uri(uri) else {
            return false;
        };
        self.licenses
            .iter()
            .filter_map(|l| normalize_uri(l))
            .any(|l| l == wanted)
    }

    pub fn is_update_role(&self, role: &str) -> bool {
        self.update_roles.iter().any(|r| r.eq_ignore_ascii_case(role))
    }
}

fn normalize_uri(uri: &str) -> Option<String> {
    let url = Url::parse(uri.trim()).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    let host = url.host_str()?.to_ascii_lowercase();
    let path = url.path().trim_end_matches('/');
    Some(format!("{}{}", host, path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn license_match_ignores_scheme_and_trailing_slash() {
        let settings = ProfileSettings::default();
        assert!(settings.is_allowed_license("https://creativecommons.org/licenses/by/4.0/"));
        assert!(settings.is_allowed_license(" http://CreativeCommons.org/licenses/by/4.0 "));
        assert!(!settings.is_allowed_license("http://example.com/my-license"));
        assert!(!settings.is_allowed_license("not a uri"));
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let settings: ProfileSettings =
            serde_yaml::from_str("licenses: [\"http://example.com/l\"]\n").unwrap();
        assert_eq!(settings.licenses, vec!["http://example.com/l"]);
        assert!(settings.is_update_role("Curator"));
    }
}
