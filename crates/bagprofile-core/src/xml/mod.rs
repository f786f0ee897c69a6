//! XML collaborator: owned element trees and schema conformance.
//!
//! Parsing is delegated to `roxmltree`; the resulting tree is copied into an
//! owned [`XmlElement`] so documents can outlive the source text and be handed
//! across rule bodies.

pub mod document;
pub mod schema;

pub use document::{QName, XmlDocument, XmlElement};
pub use schema::{SchemaName, StructuralSchemas};

use std::path::{Path, PathBuf};

/// Namespaces used by the profile's metadata documents.
pub mod ns {
    pub const DDM: &str = "http://easy.dans.knaw.nl/schemas/md/ddm/";
    pub const DC: &str = "http://purl.org/dc/elements/1.1/";
    pub const DCTERMS: &str = "http://purl.org/dc/terms/";
    pub const DCX_DAI: &str = "http://easy.dans.knaw.nl/schemas/dcx/dai/";
    pub const DCX_GML: &str = "http://easy.dans.knaw.nl/schemas/dcx/gml/";
    pub const GML: &str = "http://www.opengis.net/gml";
    pub const XSI: &str = "http://www.w3.org/2001/XMLSchema-instance";
    pub const FILES: &str = "http://easy.dans.knaw.nl/schemas/bag/metadata/files/";
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum XmlError {
    #[error("{}: not well-formed XML: {message}", path.display())]
    Parse { path: PathBuf, message: String },
}

/// Parses metadata documents and checks them against the profile's schemas.
pub trait XmlReader: Send + Sync {
    fn parse(&self, path: &Path, bytes: &[u8]) -> Result<XmlDocument, XmlError>;

    /// Schema violations of `document`; empty means conformant.
    fn conforms_to_schema(&self, document: &XmlDocument, schema: SchemaName) -> Vec<String>;
}
