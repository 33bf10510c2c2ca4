//! Sesión de saneamiento: registro de amenazas de un único documento.

use crate::threat::{Threat, ThreatSeverity};

/// Registro de amenazas de una ejecución.
///
/// Se crea uno por documento y se pasa por referencia a cada paso del
/// recorrido. Solo admite añadir hallazgos.
#[derive(Debug, Default)]
pub struct BleachSession {
    threats: Vec<Threat>,
}

impl BleachSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_threat(&mut self, threat: Threat) {
        tracing::debug!(%threat, "amenaza registrada");
        self.threats.push(threat);
    }

    pub fn threat_count(&self) -> usize {
        self.threats.len()
    }

    pub fn threats(&self) -> impl Iterator<Item = &Threat> {
        self.threats.iter()
    }

    /// Severidad más alta encontrada, si hubo hallazgos.
    pub fn highest_severity(&self) -> Option<ThreatSeverity> {
        self.threats.iter().map(Threat::severity).max()
    }

    /// Resumen legible para el usuario final.
    pub fn summary(&self) -> String {
        match self.threat_count() {
            0 => "The file was already safe, so I've just copied it over".to_string(),
            count => format!(
                "Sanitized file has been saved, {} potential threat(s) removed.",
                count
            ),
        }
    }
}
