//! Limpieza previa de archivos ZIP genéricos por extensión.

use std::io::{Cursor, Read, Write};

use zip::write::FileOptions;
use zip::{ZipArchive, ZipWriter};

use crate::error::{BleachError, Result};

/// ZIP reescrito y nombres de las entradas descartadas.
#[derive(Clone, Debug)]
pub struct PurgeOutcome {
    pub data: Vec<u8>,
    pub removed: Vec<String>,
}

/// Extensión en minúsculas del último componente de la ruta.
///
/// Los nombres que empiezan por punto (`.bashrc`) no tienen extensión.
pub fn entry_extension(name: &str) -> Option<String> {
    let file = name.rsplit('/').next().unwrap_or(name);
    match file.rfind('.') {
        Some(index) if index > 0 => Some(file[index + 1..].to_lowercase()),
        _ => None,
    }
}

/// Reescribe el ZIP sin las entradas cuya extensión figura en `denylist`.
///
/// `denylist` se compara sin distinguir mayúsculas. Las entradas conservadas
/// mantienen compresión, permisos y fecha.
pub fn purge_zip_entries<S: AsRef<str>>(bytes: &[u8], denylist: &[S]) -> Result<PurgeOutcome> {
    let is_blacklisted = |name: &str| {
        entry_extension(name).is_some_and(|extension| {
            denylist
                .iter()
                .any(|denied| denied.as_ref().eq_ignore_ascii_case(&extension))
        })
    };

    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| BleachError::StructuralParse(format!("Prefiltro: ZIP inválido: {}", e)))?;
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let mut removed = Vec::new();

    for i in 0..archive.len() {
        let mut file = archive
            .by_index(i)
            .map_err(|e| BleachError::StructuralParse(format!("Prefiltro: entrada {} ilegible: {}", i, e)))?;
        let name = file.name().to_string();

        let mut options = FileOptions::<'_, ()>::default().compression_method(file.compression());
        if let Some(mode) = file.unix_mode() {
            options = options.unix_permissions(mode);
        }
        if let Some(time) = file.last_modified() {
            options = options.last_modified_time(time);
        }

        if file.is_dir() {
            writer
                .add_directory(name, options)
                .map_err(|e| BleachError::Serialization(format!("Prefiltro: no se pudo copiar el directorio: {}", e)))?;
            continue;
        }

        if is_blacklisted(&name) {
            tracing::info!(entry = %name, "entrada eliminada del ZIP por extensión prohibida");
            removed.push(name);
            continue;
        }

        let mut contents = Vec::new();
        file.read_to_end(&mut contents)
            .map_err(|e| BleachError::StructuralParse(format!("Prefiltro: no se pudo leer '{}': {}", name, e)))?;

        writer
            .start_file(name.as_str(), options)
            .map_err(|e| BleachError::Serialization(format!("Prefiltro: no se pudo copiar '{}': {}", name, e)))?;
        writer
            .write_all(&contents)
            .map_err(|e| BleachError::Serialization(format!("Prefiltro: no se pudo copiar '{}': {}", name, e)))?;
    }

    let data = writer
        .finish()
        .map_err(|e| BleachError::Serialization(format!("Prefiltro: no se pudo cerrar el ZIP depurado: {}", e)))?
        .into_inner();

    Ok(PurgeOutcome { data, removed })
}
