//! Pure validators used as building blocks by rule bodies.
//!
//! - [`identifier`]: mod-11-2 check digits for DAI, ORCID and ISNI
//! - [`polygon`]: closed-ring coordinate lists (`gml:posList`)

pub mod identifier;
pub mod polygon;

pub use identifier::{is_valid_identifier, IdentifierKind};
pub use polygon::{validate_pos_list, PolygonError};
