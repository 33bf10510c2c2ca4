//! Detección de tipos MIME mediante inferencia heurística.

use infer::Infer;

pub const ZIP_MIME: &str = "application/zip";

/// Intenta detectar el tipo MIME a partir de los primeros bytes del contenido.
///
/// Los documentos OOXML se reconocen por su tipo concreto (`.docx`, `.xlsx`...);
/// solo los ZIP genéricos devuelven [`ZIP_MIME`].
pub fn detect_mime(bytes: &[u8]) -> Option<String> {
    let infer = Infer::new();
    infer.get(bytes).map(|kind| kind.mime_type().to_string())
}

pub fn is_plain_zip(bytes: &[u8]) -> bool {
    detect_mime(bytes).is_some_and(|mime| mime == ZIP_MIME)
}
