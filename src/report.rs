//! Resumen serializable de una ejecución de saneamiento.

use serde::Serialize;

use crate::hashing::sha256_hex;
use crate::session::BleachSession;
use crate::threat::{Threat, ThreatSeverity};

#[derive(Clone, Debug, Serialize)]
pub struct FileDigest {
    pub path: String,
    pub size: u64,
    pub sha256: String,
}

impl FileDigest {
    pub fn new(path: impl Into<String>, contents: &[u8]) -> Self {
        Self {
            path: path.into(),
            size: contents.len() as u64,
            sha256: sha256_hex(contents),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct SanitizeReport {
    pub input: FileDigest,
    pub output: FileDigest,
    pub threats: Vec<Threat>,
    pub highest_severity: Option<ThreatSeverity>,
    pub summary: String,
}

impl SanitizeReport {
    pub fn new(input: FileDigest, output: FileDigest, session: &BleachSession) -> Self {
        Self {
            input,
            output,
            threats: session.threats().cloned().collect(),
            highest_severity: session.highest_severity(),
            summary: session.summary(),
        }
    }

    /// Indica si la salida es idéntica a la entrada.
    pub fn unchanged(&self) -> bool {
        self.input.sha256 == self.output.sha256
    }
}
