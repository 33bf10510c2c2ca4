//! Configuración del motor, cargada desde un archivo JSON opcional.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{BleachError, Result};

pub const MAX_PART_BYTES: u64 = 256 * 1024 * 1024; // 256 MiB
pub const MAX_TOTAL_BYTES: u64 = 512 * 1024 * 1024; // 512 MiB
pub const MAX_ENTRIES: usize = 10_000;

/// Esquema que delata una relación "externa" que en realidad apunta al propio documento.
pub const SPOOFED_EXTERNAL_SCHEME: &str = "ooxWord";

const DEFAULT_BLACKLISTED_EXTENSIONS: [&str; 17] = [
    "exe", "dll", "bat", "cmd", "com", "scr", "vbs", "vbe", "js", "jse", "wsf", "wsh", "ps1",
    "msi", "jar", "hta", "lnk",
];

/// Límites aplicados al descomprimir un paquete en memoria.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageLimits {
    pub max_part_bytes: u64,
    pub max_total_bytes: u64,
    pub max_entries: usize,
}

impl Default for PackageLimits {
    fn default() -> Self {
        Self {
            max_part_bytes: MAX_PART_BYTES,
            max_total_bytes: MAX_TOTAL_BYTES,
            max_entries: MAX_ENTRIES,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BleachConfig {
    /// Extensiones eliminadas de los ZIP genéricos antes del saneamiento.
    pub blacklisted_extensions: Vec<String>,
    pub spoofed_external_scheme: String,
    pub limits: PackageLimits,
}

impl Default for BleachConfig {
    fn default() -> Self {
        Self {
            blacklisted_extensions: DEFAULT_BLACKLISTED_EXTENSIONS
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            spoofed_external_scheme: SPOOFED_EXTERNAL_SCHEME.to_string(),
            limits: PackageLimits::default(),
        }
    }
}

impl BleachConfig {
    /// Lee la configuración desde `path`; los campos ausentes toman su valor por defecto.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            BleachError::Config(format!("No se pudo leer {}: {}", path.display(), e))
        })?;
        Self::from_json(&contents)
    }

    pub fn from_json(contents: &str) -> Result<Self> {
        let mut config: Self = serde_json::from_str(contents)
            .map_err(|e| BleachError::Config(format!("JSON inválido: {}", e)))?;
        config.normalize();
        Ok(config)
    }

    fn normalize(&mut self) {
        for ext in &mut self.blacklisted_extensions {
            *ext = ext.trim().trim_start_matches('.').to_lowercase();
        }
        self.blacklisted_extensions.retain(|ext| !ext.is_empty());
    }

    pub fn is_blacklisted_extension(&self, extension: &str) -> bool {
        self.blacklisted_extensions
            .iter()
            .any(|ext| ext.eq_ignore_ascii_case(extension))
    }
}
