//! Saneamiento de documentos Office 2007+ (OOXML) basados en ZIP.

mod bleach;
pub mod constants;
pub mod package;
pub mod policy;
mod xml;

pub use bleach::OoxmlBleach;
pub use package::{Package, Part, Relationship, RelationshipSource, TargetMode};
pub use policy::{ContentTypePolicy, ContentTypeVerdict, RelationshipPolicy, RelationshipVerdict};
