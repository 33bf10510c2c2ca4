use std::io::Cursor;

use xmltree::{Element, EmitterConfig, Namespace, XMLNode};

use crate::error::{BleachError, Result};

use super::constants::{CONTENT_TYPES_NS, RELATIONSHIPS_NS};
use super::package::{Relationship, TargetMode, name_key};

/// Contenido de `[Content_Types].xml`: tipos por extensión y por nombre de parte.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct ContentTypeManifest {
    pub(crate) defaults: Vec<(String, String)>,
    pub(crate) overrides: Vec<(String, String)>,
}

impl ContentTypeManifest {
    /// Tipo declarado para `part_name`: primero su `Override`, luego el `Default` de su extensión.
    pub(crate) fn content_type_for(&self, part_name: &str) -> Option<String> {
        let key = name_key(part_name);
        if let Some((_, content_type)) = self
            .overrides
            .iter()
            .find(|(name, _)| name_key(name) == key)
        {
            return Some(content_type.clone());
        }

        let extension = part_extension(part_name)?;
        self.defaults
            .iter()
            .find(|(ext, _)| ext.eq_ignore_ascii_case(extension))
            .map(|(_, content_type)| content_type.clone())
    }
}

/// Extensión del último segmento de un nombre de parte, sin el punto.
pub(crate) fn part_extension(part_name: &str) -> Option<&str> {
    let file_name = part_name.rsplit('/').next()?;
    let (_, extension) = file_name.rsplit_once('.')?;
    (!extension.is_empty()).then_some(extension)
}

pub(crate) fn parse_content_types(contents: &[u8]) -> Result<ContentTypeManifest> {
    let root = Element::parse(Cursor::new(contents)).map_err(|e| {
        BleachError::StructuralParse(format!("[Content_Types].xml ilegible: {}", e))
    })?;

    if root.name != "Types" {
        return Err(BleachError::StructuralParse(format!(
            "[Content_Types].xml con raíz inesperada '{}'",
            root.name
        )));
    }

    let mut manifest = ContentTypeManifest::default();
    for child in child_elements(&root) {
        match child.name.as_str() {
            "Default" => {
                let extension = required_attribute(child, "Extension")
                    .map_err(BleachError::StructuralParse)?;
                let content_type = required_attribute(child, "ContentType")
                    .map_err(BleachError::StructuralParse)?;
                manifest.defaults.push((extension, content_type));
            }
            "Override" => {
                let part_name = required_attribute(child, "PartName")
                    .map_err(BleachError::StructuralParse)?;
                let content_type = required_attribute(child, "ContentType")
                    .map_err(BleachError::StructuralParse)?;
                manifest.overrides.push((part_name, content_type));
            }
            other => tracing::debug!(element = other, "elemento ignorado en [Content_Types].xml"),
        }
    }

    Ok(manifest)
}

pub(crate) fn render_content_types(manifest: &ContentTypeManifest) -> Result<Vec<u8>> {
    let mut root = root_element("Types", CONTENT_TYPES_NS);

    for (extension, content_type) in &manifest.defaults {
        let mut default = Element::new("Default");
        default
            .attributes
            .insert("Extension".to_string(), extension.clone());
        default
            .attributes
            .insert("ContentType".to_string(), content_type.clone());
        root.children.push(XMLNode::Element(default));
    }

    for (part_name, content_type) in &manifest.overrides {
        let mut override_element = Element::new("Override");
        override_element
            .attributes
            .insert("PartName".to_string(), part_name.clone());
        override_element
            .attributes
            .insert("ContentType".to_string(), content_type.clone());
        root.children.push(XMLNode::Element(override_element));
    }

    write_document(&root)
}

/// Interpreta un manifiesto `.rels`; cualquier defecto es un error duro.
pub(crate) fn parse_relationships(manifest: &str, contents: &[u8]) -> Result<Vec<Relationship>> {
    let root = Element::parse(Cursor::new(contents))
        .map_err(|e| BleachError::malformed_manifest(manifest, format!("XML ilegible: {}", e)))?;

    if root.name != "Relationships" {
        return Err(BleachError::malformed_manifest(
            manifest,
            format!("raíz inesperada '{}'", root.name),
        ));
    }

    let mut relationships: Vec<Relationship> = Vec::new();
    for child in child_elements(&root) {
        if child.name != "Relationship" {
            continue;
        }

        let attribute = |name: &str| {
            required_attribute(child, name)
                .map_err(|reason| BleachError::malformed_manifest(manifest, reason))
        };
        let id = attribute("Id")?;
        let relationship_type = attribute("Type")?;
        let target = attribute("Target")?;

        let target_mode = match child.attributes.get("TargetMode").map(String::as_str) {
            None => TargetMode::Internal,
            Some(mode) if mode.eq_ignore_ascii_case("Internal") => TargetMode::Internal,
            Some(mode) if mode.eq_ignore_ascii_case("External") => TargetMode::External,
            Some(mode) => {
                return Err(BleachError::malformed_manifest(
                    manifest,
                    format!("TargetMode desconocido '{}'", mode),
                ));
            }
        };

        if relationships.iter().any(|existing| existing.id == id) {
            return Err(BleachError::malformed_manifest(
                manifest,
                format!("Id de relación duplicado '{}'", id),
            ));
        }

        relationships.push(Relationship {
            id,
            relationship_type,
            target,
            target_mode,
        });
    }

    Ok(relationships)
}

pub(crate) fn render_relationships<'a, I>(relationships: I) -> Result<Vec<u8>>
where
    I: IntoIterator<Item = &'a Relationship>,
{
    let mut root = root_element("Relationships", RELATIONSHIPS_NS);

    for relationship in relationships {
        let mut element = Element::new("Relationship");
        element
            .attributes
            .insert("Id".to_string(), relationship.id.clone());
        element
            .attributes
            .insert("Type".to_string(), relationship.relationship_type.clone());
        element
            .attributes
            .insert("Target".to_string(), relationship.target.clone());
        if relationship.target_mode == TargetMode::External {
            element
                .attributes
                .insert("TargetMode".to_string(), "External".to_string());
        }
        root.children.push(XMLNode::Element(element));
    }

    write_document(&root)
}

fn root_element(name: &str, namespace: &str) -> Element {
    let mut root = Element::new(name);
    let mut namespaces = Namespace::empty();
    namespaces.put("", namespace);
    root.namespace = Some(namespace.to_string());
    root.namespaces = Some(namespaces);
    root
}

fn write_document(root: &Element) -> Result<Vec<u8>> {
    let mut output = Vec::new();
    let mut config = EmitterConfig::new();
    config.perform_indent = false;
    config.write_document_declaration = true;
    root.write_with_config(&mut output, config)
        .map_err(|e| BleachError::Serialization(format!("Error escribiendo XML: {}", e)))?;
    Ok(output)
}

fn child_elements(root: &Element) -> impl Iterator<Item = &Element> {
    root.children.iter().filter_map(|node| match node {
        XMLNode::Element(child) => Some(child),
        _ => None,
    })
}

fn required_attribute(element: &Element, name: &str) -> std::result::Result<String, String> {
    element
        .attributes
        .get(name)
        .cloned()
        .ok_or_else(|| format!("<{}> sin atributo '{}'", element.name, name))
}
