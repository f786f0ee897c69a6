use super::XmlError;
use std::path::Path;

/// Namespace-qualified name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    pub namespace: Option<String>,
    pub local: String,
}

impl QName {
    pub fn new(namespace: Option<&str>, local: &str) -> Self {
        Self {
            namespace: namespace.map(String::from),
            local: local.to_string(),
        }
    }

    pub fn is(&self, namespace: &str, local: &str) -> bool {
        self.namespace.as_deref() == Some(namespace) && self.local == local
    }
}

impl std::fmt::Display for QName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{{{}}}{}", ns, self.local),
            None => write!(f, "{}", self.local),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlAttribute {
    pub name: QName,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    pub name: QName,
    pub attributes: Vec<XmlAttribute>,
    /// In-scope namespace declarations: (prefix, uri). The default namespace has no prefix.
    pub namespaces: Vec<(Option<String>, String)>,
    pub children: Vec<XmlElement>,
    /// Concatenated direct text content.
    pub text: String,
}

impl XmlElement {
    pub fn is(&self, namespace: &str, local: &str) -> bool {
        self.name.is(namespace, local)
    }

    pub fn attribute(&self, namespace: Option<&str>, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name.namespace.as_deref() == namespace && a.name.local == local)
            .map(|a| a.value.as_str())
    }

    pub fn text(&self) -> &str {
        self.text.trim()
    }

    pub fn children_named<'a>(
        &'a self,
        namespace: &'a str,
        local: &'a str,
    ) -> impl Iterator<Item = &'a XmlElement> + 'a {
        self.children.iter().filter(move |c| c.is(namespace, local))
    }

    /// This element and all its descendants, in document order.
    pub fn descendants(&self) -> Vec<&XmlElement> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(el) = stack.pop() {
            out.push(el);
            stack.extend(el.children.iter().rev());
        }
        out
    }

    pub fn descendants_named(&self, namespace: &str, local: &str) -> Vec<&XmlElement> {
        self.descendants()
            .into_iter()
            .filter(|e| e.is(namespace, local))
            .collect()
    }

    /// Resolve a prefixed value such as `dcterms:URI` against the in-scope namespaces.
    pub fn resolve_qname(&self, value: &str) -> Option<QName> {
        let (prefix, local) = match value.trim().split_once(':') {
            Some((p, l)) => (Some(p), l),
            None => (None, value.trim()),
        };
        let uri = self
            .namespaces
            .iter()
            .find(|(p, _)| p.as_deref() == prefix)
            .map(|(_, uri)| uri.as_str());
        match (prefix, uri) {
            (Some(_), None) => None,
            (_, uri) => Some(QName::new(uri, local)),
        }
    }
}

/// Parsed metadata document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDocument {
    pub root: XmlElement,
}

impl XmlDocument {
    pub fn parse_str(path: &Path, text: &str) -> Result<Self, XmlError> {
        let doc = roxmltree::Document::parse(text).map_err(|e| XmlError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(Self {
            root: copy_element(doc.root_element()),
        })
    }
}

fn copy_element(node: roxmltree::Node<'_, '_>) -> XmlElement {
    let mut text = String::new();
    let mut children = Vec::new();
    for child in node.children() {
        if child.is_element() {
            children.push(copy_element(child));
        } else if child.is_text() {
            text.push_str(child.text().unwrap_or_default());
        }
    }

    XmlElement {
        name: QName::new(node.tag_name().namespace(), node.tag_name().name()),
        attributes: node
            .attributes()
            .map(|a| XmlAttribute {
                name: QName::new(a.namespace(), a.name()),
                value: a.value().to_string(),
            })
            .collect(),
        namespaces: node
            .namespaces()
            .map(|n| (n.name().map(String::from), n.uri().to_string()))
            .collect(),
        children,
        text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::ns;

    const SAMPLE: &str = r#"<?xml version="1.0"?>
<ddm:DDM xmlns:ddm="http://easy.dans.knaw.nl/schemas/md/ddm/"
         xmlns:dcterms="http://purl.org/dc/terms/"
         xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
  <ddm:dcmiMetadata>
    <dcterms:license xsi:type="dcterms:URI"> http://creativecommons.org/licenses/by/4.0 </dcterms:license>
  </ddm:dcmiMetadata>
</ddm:DDM>"#;

    #[test]
    fn copies_names_text_and_attributes() {
        let doc = XmlDocument::parse_str(Path::new("dataset.xml"), SAMPLE).unwrap();
        assert!(doc.root.is(ns::DDM, "DDM"));

        let licenses = doc.root.descendants_named(ns::DCTERMS, "license");
        assert_eq!(licenses.len(), 1);
        assert_eq!(licenses[0].text(), "http://creativecommons.org/licenses/by/4.0");

        let xsi_type = licenses[0].attribute(Some(ns::XSI), "type").unwrap();
        let resolved = licenses[0].resolve_qname(xsi_type).unwrap();
        assert!(resolved.is(ns::DCTERMS, "URI"));
    }

    #[test]
    fn unknown_prefix_does_not_resolve() {
        let doc = XmlDocument::parse_str(Path::new("dataset.xml"), SAMPLE).unwrap();
        assert_eq!(doc.root.resolve_qname("nope:URI"), None);
    }

    #[test]
    fn malformed_xml_is_a_parse_error() {
        let err = XmlDocument::parse_str(Path::new("files.xml"), "<files>").unwrap_err();
        assert!(err.to_string().contains("files.xml"));
    }
}
