//! Modelo en memoria de un paquete OPC: partes, tipos de contenido y grafo de relaciones.
//!
//! Las relaciones apuntan a las partes por nombre. Eliminar una parte solo la
//! marca como borrada; las aristas que quedan colgando se descartan al guardar.

use std::borrow::Cow;
use std::collections::HashMap;
use std::io::{Cursor, Read, Seek, Write};

use zip::write::FileOptions;
use zip::{CompressionMethod, DateTime, ZipArchive, ZipWriter};

use crate::config::PackageLimits;
use crate::error::{BleachError, Result};

use super::constants::{
    CONTENT_TYPES_ENTRY, RELATIONSHIPS_DIR, RELATIONSHIPS_EXTENSION, ROOT_RELATIONSHIPS_ENTRY,
};
use super::xml::{self, ContentTypeManifest, part_extension};

/// Origen de un conjunto de relaciones.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum RelationshipSource {
    /// Relaciones del documento (`_rels/.rels`).
    Package,
    Part(String),
}

impl RelationshipSource {
    pub fn name(&self) -> &str {
        match self {
            RelationshipSource::Package => "/",
            RelationshipSource::Part(name) => name,
        }
    }

    /// Entrada ZIP del manifiesto de relaciones de esta fuente.
    pub fn manifest_entry(&self) -> String {
        match self {
            RelationshipSource::Package => ROOT_RELATIONSHIPS_ENTRY.to_string(),
            RelationshipSource::Part(name) => {
                let name = name.trim_start_matches('/');
                match name.rsplit_once('/') {
                    Some((dir, file)) => format!(
                        "{}/{}/{}.{}",
                        dir, RELATIONSHIPS_DIR, file, RELATIONSHIPS_EXTENSION
                    ),
                    None => format!("{}/{}.{}", RELATIONSHIPS_DIR, name, RELATIONSHIPS_EXTENSION),
                }
            }
        }
    }

    /// Inverso de [`RelationshipSource::manifest_entry`]; `None` si la entrada no es un manifiesto.
    pub fn from_manifest_entry(entry: &str) -> Option<Self> {
        let (dir, file) = entry.rsplit_once('/')?;
        let suffix = format!(".{}", RELATIONSHIPS_EXTENSION);
        let split = file.len().checked_sub(suffix.len())?;
        let (stem, extension) = (file.get(..split)?, file.get(split..)?);
        if !extension.eq_ignore_ascii_case(&suffix) {
            return None;
        }

        let parent = if dir.eq_ignore_ascii_case(RELATIONSHIPS_DIR) {
            ""
        } else {
            let (parent, rels_dir) = dir.rsplit_once('/')?;
            if !rels_dir.eq_ignore_ascii_case(RELATIONSHIPS_DIR) {
                return None;
            }
            parent
        };

        match (parent.is_empty(), stem.is_empty()) {
            (true, true) => Some(RelationshipSource::Package),
            (false, true) => None,
            (true, false) => Some(RelationshipSource::Part(format!("/{}", stem))),
            (false, false) => Some(RelationshipSource::Part(format!("/{}/{}", parent, stem))),
        }
    }

    /// Directorio contra el que se resuelven los destinos relativos.
    fn base_dir(&self) -> &str {
        match self {
            RelationshipSource::Package => "/",
            RelationshipSource::Part(name) => match name.rfind('/') {
                Some(index) => &name[..=index],
                None => "/",
            },
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TargetMode {
    Internal,
    External,
}

/// Arista tipada desde una fuente hacia una parte o un recurso externo.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Relationship {
    pub id: String,
    pub relationship_type: String,
    pub target: String,
    pub target_mode: TargetMode,
}

impl Relationship {
    /// Esquema URI del destino (`https`, `file`, `ooxWord`...), si lo tiene.
    pub fn target_scheme(&self) -> Option<&str> {
        let (scheme, _) = self.target.split_once(':')?;
        let mut chars = scheme.chars();
        let first = chars.next()?;
        let valid = first.is_ascii_alphabetic()
            && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
        valid.then_some(scheme)
    }
}

/// Opciones ZIP originales de una entrada, conservadas al reescribir.
#[derive(Clone, Copy, Debug)]
struct EntryOptions {
    compression: CompressionMethod,
    last_modified: Option<DateTime>,
    unix_mode: Option<u32>,
}

impl EntryOptions {
    /// Solo `Stored` se conserva; el resto se reescribe con `Deflated`.
    fn new(
        compression: CompressionMethod,
        last_modified: Option<DateTime>,
        unix_mode: Option<u32>,
    ) -> Self {
        let compression = match compression {
            CompressionMethod::Stored => CompressionMethod::Stored,
            _ => CompressionMethod::Deflated,
        };
        Self {
            compression,
            last_modified,
            unix_mode,
        }
    }

    /// Opciones fijas para los manifiestos regenerados, para que dos ejecuciones coincidan byte a byte.
    fn generated() -> Self {
        Self {
            compression: CompressionMethod::Deflated,
            last_modified: Some(DateTime::default()),
            unix_mode: None,
        }
    }
}

/// Entrada lógica del paquete.
#[derive(Clone, Debug)]
pub struct Part {
    name: String,
    content_type: Option<String>,
    data: Vec<u8>,
    deleted: bool,
    options: EntryOptions,
}

impl Part {
    /// Nombre de parte, siempre con `/` inicial.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `None` para partes sin entrada en `[Content_Types].xml`.
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    fn entry_name(&self) -> &str {
        &self.name[1..]
    }
}

#[derive(Clone, Debug)]
struct RelationshipManifest {
    source: RelationshipSource,
    entry_name: String,
    relationships: Vec<Relationship>,
    deleted: bool,
}

#[derive(Clone, Copy, Debug)]
enum Entry {
    Part(usize),
    Manifest(usize),
}

struct RawEntry {
    name: String,
    data: Vec<u8>,
    options: EntryOptions,
}

/// Paquete OPC decodificado y mutable.
#[derive(Clone, Debug)]
pub struct Package {
    parts: Vec<Part>,
    part_index: HashMap<String, usize>,
    manifests: Vec<RelationshipManifest>,
    manifest_index: HashMap<String, usize>,
    entries: Vec<Entry>,
    defaults: Vec<(String, String)>,
}

impl Package {
    pub fn open(bytes: &[u8]) -> Result<Self> {
        Self::open_with_limits(bytes, &PackageLimits::default())
    }

    /// Decodifica el ZIP y construye el grafo de partes y relaciones.
    ///
    /// `bytes` solo se toma prestado: el llamador conserva la entrada intacta
    /// por si necesita copiarla tal cual.
    pub fn open_with_limits(bytes: &[u8], limits: &PackageLimits) -> Result<Self> {
        let raw_entries = read_entries(bytes, limits)?;

        let mut content_types = None;
        let mut remaining = Vec::with_capacity(raw_entries.len());
        for entry in raw_entries {
            if entry.name.eq_ignore_ascii_case(CONTENT_TYPES_ENTRY) && content_types.is_none() {
                content_types = Some(xml::parse_content_types(&entry.data)?);
            } else {
                remaining.push(entry);
            }
        }
        let content_types = content_types.ok_or_else(|| {
            BleachError::StructuralParse(format!("falta {}", CONTENT_TYPES_ENTRY))
        })?;

        let mut package = Package {
            parts: Vec::new(),
            part_index: HashMap::new(),
            manifests: Vec::new(),
            manifest_index: HashMap::new(),
            entries: Vec::new(),
            defaults: content_types.defaults.clone(),
        };

        for entry in remaining {
            if let Some(source) = RelationshipSource::from_manifest_entry(&entry.name) {
                let relationships = xml::parse_relationships(&entry.name, &entry.data)?;
                let key = name_key(source.name());
                if package.manifest_index.contains_key(&key) {
                    return Err(BleachError::StructuralParse(format!(
                        "manifiesto de relaciones duplicado '{}'",
                        entry.name
                    )));
                }
                package.manifest_index.insert(key, package.manifests.len());
                package.entries.push(Entry::Manifest(package.manifests.len()));
                package.manifests.push(RelationshipManifest {
                    source,
                    entry_name: entry.name,
                    relationships,
                    deleted: false,
                });
            } else {
                let name = format!("/{}", entry.name);
                let key = name_key(&name);
                if package.part_index.contains_key(&key) {
                    return Err(BleachError::StructuralParse(format!(
                        "parte duplicada '{}'",
                        name
                    )));
                }
                let content_type = content_types.content_type_for(&name);
                if content_type.is_none() {
                    tracing::warn!(part = %name, "parte sin tipo de contenido declarado");
                }
                package.part_index.insert(key, package.parts.len());
                package.entries.push(Entry::Part(package.parts.len()));
                package.parts.push(Part {
                    name,
                    content_type,
                    data: entry.data,
                    deleted: false,
                    options: entry.options,
                });
            }
        }

        tracing::trace!(
            parts = package.parts.len(),
            manifests = package.manifests.len(),
            "paquete abierto"
        );
        Ok(package)
    }

    /// Partes vivas en el orden del archivo original.
    pub fn parts(&self) -> impl Iterator<Item = &Part> {
        self.parts.iter().filter(|part| !part.deleted)
    }

    pub fn part_names(&self) -> Vec<String> {
        self.parts().map(|part| part.name.clone()).collect()
    }

    pub fn live_part_count(&self) -> usize {
        self.parts().count()
    }

    /// Parte viva con ese nombre (sin distinguir mayúsculas).
    pub fn part(&self, name: &str) -> Option<&Part> {
        self.part_index
            .get(&name_key(name))
            .map(|&index| &self.parts[index])
            .filter(|part| !part.deleted)
    }

    pub fn contains_part(&self, name: &str) -> bool {
        self.part(name).is_some()
    }

    /// Indica si existe un manifiesto de relaciones vivo para `source`.
    pub fn has_relationship_manifest(&self, source: &RelationshipSource) -> bool {
        self.manifest(source)
            .is_some_and(|manifest| self.is_manifest_live(manifest))
    }

    pub fn relationships(&self, source: &RelationshipSource) -> &[Relationship] {
        match self.manifest(source) {
            Some(manifest) if self.is_manifest_live(manifest) => &manifest.relationships[..],
            _ => &[],
        }
    }

    /// Relaciones que sobrevivirían a [`Package::save`]: sin aristas colgantes.
    pub fn live_relationships(&self, source: &RelationshipSource) -> Vec<&Relationship> {
        self.relationships(source)
            .iter()
            .filter(|relationship| !self.is_dangling(source, relationship))
            .collect()
    }

    /// Fuentes con manifiesto vivo, en el orden del archivo.
    pub fn relationship_sources(&self) -> Vec<RelationshipSource> {
        self.manifests
            .iter()
            .filter(|manifest| self.is_manifest_live(manifest))
            .map(|manifest| manifest.source.clone())
            .collect()
    }

    /// Nombre de parte al que apunta una relación interna, si lo tiene.
    pub fn resolve_target(
        &self,
        source: &RelationshipSource,
        relationship: &Relationship,
    ) -> Option<String> {
        if relationship.target_mode == TargetMode::External {
            return None;
        }
        resolve_part_name(source.base_dir(), &relationship.target)
    }

    /// Marca la parte como eliminada junto con su manifiesto de relaciones.
    pub fn remove_part(&mut self, name: &str) -> bool {
        let key = name_key(name);
        let Some(&index) = self.part_index.get(&key) else {
            return false;
        };
        if self.parts[index].deleted {
            return false;
        }
        self.parts[index].deleted = true;

        if let Some(&manifest) = self.manifest_index.get(&key) {
            self.manifests[manifest].deleted = true;
        }
        true
    }

    pub fn remove_relationship(
        &mut self,
        source: &RelationshipSource,
        id: &str,
    ) -> Option<Relationship> {
        let &index = self.manifest_index.get(&name_key(source.name()))?;
        let manifest = &mut self.manifests[index];
        let position = manifest
            .relationships
            .iter()
            .position(|relationship| relationship.id == id)?;
        Some(manifest.relationships.remove(position))
    }

    pub fn set_content_type(&mut self, name: &str, content_type: &str) -> bool {
        let Some(&index) = self.part_index.get(&name_key(name)) else {
            return false;
        };
        let part = &mut self.parts[index];
        if part.deleted {
            return false;
        }
        part.content_type = Some(content_type.to_string());
        true
    }

    /// Serializa el grafo vivo en un ZIP nuevo.
    ///
    /// `[Content_Types].xml` y los manifiestos `.rels` se regeneran desde el
    /// grafo; las partes conservan sus bytes y opciones originales.
    pub fn save(&self) -> Result<Vec<u8>> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

        let content_types = xml::render_content_types(&self.content_type_manifest())?;
        write_entry(
            &mut writer,
            CONTENT_TYPES_ENTRY,
            &content_types,
            EntryOptions::generated(),
        )?;

        for entry in &self.entries {
            match *entry {
                Entry::Part(index) => {
                    let part = &self.parts[index];
                    if part.deleted {
                        continue;
                    }
                    write_entry(&mut writer, part.entry_name(), &part.data, part.options)?;
                }
                Entry::Manifest(index) => {
                    let manifest = &self.manifests[index];
                    if !self.is_manifest_live(manifest) {
                        continue;
                    }
                    let data = xml::render_relationships(self.live_relationships(&manifest.source))?;
                    write_entry(
                        &mut writer,
                        &manifest.entry_name,
                        &data,
                        EntryOptions::generated(),
                    )?;
                }
            }
        }

        let cursor = writer
            .finish()
            .map_err(|e| BleachError::Serialization(format!("Error finalizando ZIP: {}", e)))?;
        Ok(cursor.into_inner())
    }

    fn manifest(&self, source: &RelationshipSource) -> Option<&RelationshipManifest> {
        self.manifest_index
            .get(&name_key(source.name()))
            .map(|&index| &self.manifests[index])
    }

    fn is_manifest_live(&self, manifest: &RelationshipManifest) -> bool {
        if manifest.deleted {
            return false;
        }
        match &manifest.source {
            RelationshipSource::Package => true,
            RelationshipSource::Part(name) => self.contains_part(name),
        }
    }

    /// Una relación interna cuelga cuando su destino es una parte eliminada en esta ejecución.
    fn is_dangling(&self, source: &RelationshipSource, relationship: &Relationship) -> bool {
        self.resolve_target(source, relationship)
            .and_then(|target| self.part_index.get(&target.to_ascii_lowercase()))
            .is_some_and(|&index| self.parts[index].deleted)
    }

    fn content_type_manifest(&self) -> ContentTypeManifest {
        let mut used = vec![false; self.defaults.len()];
        let mut overrides = Vec::new();

        for part in self.parts() {
            let Some(content_type) = part.content_type.as_deref() else {
                continue;
            };
            let default = part_extension(&part.name).and_then(|extension| {
                self.defaults
                    .iter()
                    .position(|(ext, _)| ext.eq_ignore_ascii_case(extension))
            });
            match default {
                Some(index) if self.defaults[index].1 == content_type => used[index] = true,
                _ => overrides.push((part.name.clone(), content_type.to_string())),
            }
        }

        let writes_manifests = self
            .manifests
            .iter()
            .any(|manifest| self.is_manifest_live(manifest));
        if writes_manifests {
            for (index, (extension, _)) in self.defaults.iter().enumerate() {
                if extension.eq_ignore_ascii_case(RELATIONSHIPS_EXTENSION) {
                    used[index] = true;
                }
            }
        }

        let defaults = self
            .defaults
            .iter()
            .zip(used)
            .filter(|(_, used)| *used)
            .map(|(default, _)| default.clone())
            .collect();

        ContentTypeManifest {
            defaults,
            overrides,
        }
    }
}

/// Clave de búsqueda de una parte: nombre canónico sin distinguir mayúsculas.
pub(crate) fn name_key(name: &str) -> String {
    canonical_part_name(name)
        .unwrap_or_else(|| "/".to_string())
        .to_ascii_lowercase()
}

/// Forma canónica de un nombre de parte: decodificado una sola vez, absoluto
/// y sin segmentos vacíos, `.` ni `..`.
pub(crate) fn canonical_part_name(name: &str) -> Option<String> {
    let decoded = urlencoding::decode(name).unwrap_or(Cow::Borrowed(name));

    let mut segments: Vec<&str> = Vec::new();
    for segment in decoded.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    if segments.is_empty() {
        return None;
    }
    Some(format!("/{}", segments.join("/")))
}

fn read_entries(bytes: &[u8], limits: &PackageLimits) -> Result<Vec<RawEntry>> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| BleachError::StructuralParse(format!("ZIP inválido: {}", e)))?;

    if archive.len() > limits.max_entries {
        return Err(BleachError::LimitExceeded(format!(
            "{} entradas (máximo {})",
            archive.len(),
            limits.max_entries
        )));
    }

    let mut entries = Vec::with_capacity(archive.len());
    let mut total: u64 = 0;
    for index in 0..archive.len() {
        let mut file = archive
            .by_index(index)
            .map_err(|e| BleachError::StructuralParse(format!("Error leyendo entrada ZIP: {}", e)))?;
        if file.is_dir() {
            continue;
        }

        let name = file.name().trim_start_matches('/').to_string();
        if file.size() > limits.max_part_bytes {
            return Err(BleachError::LimitExceeded(format!(
                "'{}' ocupa {} bytes descomprimido",
                name,
                file.size()
            )));
        }

        let options =
            EntryOptions::new(file.compression(), file.last_modified(), file.unix_mode());
        let mut data = Vec::new();
        (&mut file)
            .take(limits.max_part_bytes + 1)
            .read_to_end(&mut data)
            .map_err(|e| {
                BleachError::StructuralParse(format!("Error leyendo '{}': {}", name, e))
            })?;

        let size = data.len() as u64;
        if size > limits.max_part_bytes {
            return Err(BleachError::LimitExceeded(format!(
                "'{}' supera {} bytes",
                name, limits.max_part_bytes
            )));
        }
        total += size;
        if total > limits.max_total_bytes {
            return Err(BleachError::LimitExceeded(format!(
                "el paquete supera {} bytes descomprimido",
                limits.max_total_bytes
            )));
        }

        entries.push(RawEntry {
            name,
            data,
            options,
        });
    }

    Ok(entries)
}

fn write_entry<W: Write + Seek>(
    writer: &mut ZipWriter<W>,
    name: &str,
    data: &[u8],
    entry_options: EntryOptions,
) -> Result<()> {
    let mut options =
        FileOptions::<'_, ()>::default().compression_method(entry_options.compression);
    if let Some(mode) = entry_options.unix_mode {
        options = options.unix_permissions(mode);
    }
    options = options.last_modified_time(entry_options.last_modified.unwrap_or_default());

    writer
        .start_file(name, options)
        .map_err(|e| BleachError::Serialization(format!("Error creando '{}': {}", name, e)))?;
    writer
        .write_all(data)
        .map_err(|e| BleachError::Serialization(format!("Error escribiendo '{}': {}", name, e)))?;
    Ok(())
}

/// Resuelve un destino relativo a `base_dir` en un nombre de parte absoluto.
fn resolve_part_name(base_dir: &str, target: &str) -> Option<String> {
    let target = target.split('#').next().unwrap_or_default();
    if target.is_empty() {
        return None;
    }

    if target.starts_with('/') {
        canonical_part_name(target)
    } else {
        canonical_part_name(&format!("{}{}", base_dir, target))
    }
}
