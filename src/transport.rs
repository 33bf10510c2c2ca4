//! Sobre JSON de petición y respuesta para integrar el motor en un servicio.
//!
//! Las claves van en PascalCase para ser compatibles con los clientes
//! existentes del servicio de saneamiento.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::bleach::BleachRegistry;
use crate::config::BleachConfig;
use crate::error::BleachError;
use crate::mime;
use crate::prefilter;
use crate::session::BleachSession;

pub const HTTP_BAD_REQUEST: u16 = 400;
pub const INTERNAL_SERVER_ERROR: u16 = 500;

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SanitizeRequest {
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub original_file_size: Option<u64>,
    #[serde(default)]
    pub base64_size: Option<u64>,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub message_id: Option<String>,
    #[serde(default)]
    pub file: Option<String>,
}

impl SanitizeRequest {
    pub fn is_valid(&self) -> bool {
        let present = |value: &Option<String>| value.as_deref().is_some_and(|v| !v.is_empty());
        present(&self.file) && present(&self.message_id)
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct SanitizeResponse {
    pub status: bool,
    /// Resumen legible; el nombre del campo se mantiene por compatibilidad.
    pub error: String,
    pub file: String,
    pub original_file_size: usize,
    pub base64_size: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Petición inválida: {0}")]
    BadRequest(String),

    #[error("Fallo de saneamiento: {0}")]
    Sanitization(#[from] BleachError),
}

impl TransportError {
    pub fn status_code(&self) -> u16 {
        match self {
            TransportError::BadRequest(_) => HTTP_BAD_REQUEST,
            TransportError::Sanitization(_) => INTERNAL_SERVER_ERROR,
        }
    }
}

/// Atiende peticiones con una configuración y un registro fijos.
pub struct RequestHandler {
    config: BleachConfig,
    registry: BleachRegistry,
}

impl RequestHandler {
    pub fn new(config: BleachConfig) -> Self {
        let registry = BleachRegistry::from_config(&config);
        Self { config, registry }
    }

    pub fn with_registry(config: BleachConfig, registry: BleachRegistry) -> Self {
        Self { config, registry }
    }

    pub fn handle(&self, body: &str) -> Result<SanitizeResponse, TransportError> {
        handle_request(body, &self.config, &self.registry)
    }

    /// Igual que [`RequestHandler::handle`], con la respuesta ya serializada.
    pub fn handle_to_json(&self, body: &str) -> Result<String, TransportError> {
        let response = self.handle(body)?;
        serde_json::to_string_pretty(&response).map_err(|e| {
            TransportError::Sanitization(BleachError::Serialization(format!(
                "Error serializando respuesta: {}",
                e
            )))
        })
    }
}

/// Decodifica la petición, sanea el archivo y construye la respuesta.
pub fn handle_request(
    body: &str,
    config: &BleachConfig,
    registry: &BleachRegistry,
) -> Result<SanitizeResponse, TransportError> {
    let request: SanitizeRequest = serde_json::from_str(body)
        .map_err(|e| TransportError::BadRequest(format!("JSON inválido: {}", e)))?;
    if !request.is_valid() {
        return Err(TransportError::BadRequest(
            "faltan los campos File o MessageId".to_string(),
        ));
    }

    let message_id = request.message_id.as_deref().unwrap_or_default();
    tracing::info!(message_id, "procesando petición");

    let encoded = request.file.as_deref().unwrap_or_default();
    let decoded = STANDARD
        .decode(encoded)
        .map_err(|e| TransportError::BadRequest(format!("Base64 inválido: {}", e)))?;

    let mut input = decoded;
    if mime::is_plain_zip(&input) {
        tracing::info!("archivo ZIP detectado");
        input = prefilter::purge_zip_entries(&input, config.blacklisted_extensions.as_slice())?.data;
    }

    let mut session = BleachSession::new();
    let mut output = Vec::new();
    registry
        .sanitize_bytes(&input, &mut output, &mut session)
        .inspect_err(|error| tracing::warn!(%error, message_id, "fallo de saneamiento"))?;

    if output.is_empty() {
        return Err(BleachError::EmptyOutput.into());
    }

    let file = STANDARD.encode(&output);
    let response = SanitizeResponse {
        status: true,
        error: session.summary(),
        original_file_size: output.len(),
        base64_size: file.len(),
        file,
    };
    tracing::info!(message_id, "{}", response.error);
    Ok(response)
}
