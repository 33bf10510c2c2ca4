//! Errores del motor de saneamiento.

use std::io;

/// Resultado con el error del motor como variante de fallo.
pub type Result<T> = std::result::Result<T, BleachError>;

/// Fallos posibles durante el saneamiento de un documento.
#[derive(Debug, thiserror::Error)]
pub enum BleachError {
    /// La entrada no es un paquete OOXML (ZIP inválido, manifiesto ausente o dañado).
    ///
    /// El orquestador la recupera copiando la entrada sin cambios.
    #[error("No es un paquete OOXML válido: {0}")]
    StructuralParse(String),

    /// Un manifiesto de relaciones dentro de un paquete válido no se pudo interpretar.
    #[error("Manifiesto de relaciones inválido en '{manifest}': {reason}")]
    MalformedRelationshipManifest { manifest: String, reason: String },

    /// El saneamiento dejó el documento vacío.
    #[error("El documento saneado está vacío")]
    EmptyOutput,

    /// Fallo al reconstruir el contenedor.
    #[error("Error escribiendo el paquete saneado: {0}")]
    Serialization(String),

    /// El paquete supera los límites configurados de tamaño o entradas.
    #[error("El paquete supera el límite permitido: {0}")]
    LimitExceeded(String),

    /// La configuración no se pudo leer o no es válida.
    #[error("Configuración inválida: {0}")]
    Config(String),

    #[error("Error de E/S: {0}")]
    Io(#[from] io::Error),
}

impl BleachError {
    pub(crate) fn malformed_manifest(manifest: &str, reason: impl Into<String>) -> Self {
        Self::MalformedRelationshipManifest {
            manifest: manifest.to_string(),
            reason: reason.into(),
        }
    }

    /// Indica si el error solo significa "esto no es un paquete OOXML".
    pub fn is_structural(&self) -> bool {
        matches!(self, Self::StructuralParse(_))
    }
}
