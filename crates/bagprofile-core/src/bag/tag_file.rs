//! `Label: value` tag files (`bagit.txt`, `bag-info.txt`).

/// Tag file parse errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TagFileError {
    #[error("line {line}: missing ':' separator")]
    MissingSeparator { line: usize },

    #[error("line {line}: continuation line without a preceding label")]
    DanglingContinuation { line: usize },
}

/// Parsed tag file, preserving element order and repeated labels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagFile {
    entries: Vec<(String, String)>,
}

impl TagFile {
    /// Parse a tag file. Lines starting with whitespace continue the previous value.
    pub fn parse(text: &str) -> Result<Self, TagFileError> {
        let mut entries: Vec<(String, String)> = Vec::new();

        for (idx, raw) in text.lines().enumerate() {
            let line = idx + 1;
            if raw.trim().is_empty() {
                continue;
            }

            if raw.starts_with(' ') || raw.starts_with('\t') {
                let (_, value) = entries
                    .last_mut()
                    .ok_or(TagFileError::DanglingContinuation { line })?;
                value.push(' ');
                value.push_str(raw.trim());
                continue;
            }

            let (label, value) = raw
                .split_once(':')
                .ok_or(TagFileError::MissingSeparator { line })?;
            entries.push((label.trim().to_string(), value.trim().to_string()));
        }

        Ok(Self { entries })
    }

    /// All values for `label` (case-insensitive), in file order.
    pub fn values(&self, label: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(l, _)| l.eq_ignore_ascii_case(label))
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn first(&self, label: &str) -> Option<&str> {
        self.values(label).into_iter().next()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
