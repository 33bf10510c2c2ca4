//! Hallazgos registrados durante el saneamiento.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ThreatType {
    /// Macros, objetos OLE, controles ActiveX.
    ActiveContent,
    /// Recursos externos enlazados desde el documento.
    ExternalContent,
    /// Contenido desconocido o declarado de forma sospechosa.
    UnrecognizedContent,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ThreatSeverity {
    Low,
    High,
    Extreme,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ThreatAction {
    /// El elemento se eliminó por completo.
    Remove,
    /// El contenido se conserva y solo se neutraliza su declaración.
    Disarm,
}

impl fmt::Display for ThreatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ThreatType::ActiveContent => "ACTIVE_CONTENT",
            ThreatType::ExternalContent => "EXTERNAL_CONTENT",
            ThreatType::UnrecognizedContent => "UNRECOGNIZED_CONTENT",
        };
        f.write_str(label)
    }
}

impl fmt::Display for ThreatSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ThreatSeverity::Low => "LOW",
            ThreatSeverity::High => "HIGH",
            ThreatSeverity::Extreme => "EXTREME",
        };
        f.write_str(label)
    }
}

impl fmt::Display for ThreatAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ThreatAction::Remove => "REMOVE",
            ThreatAction::Disarm => "DISARM",
        };
        f.write_str(label)
    }
}

/// Registro inmutable de una amenaza encontrada y de la acción aplicada.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Threat {
    #[serde(rename = "type")]
    threat_type: ThreatType,
    severity: ThreatSeverity,
    action: ThreatAction,
    location: String,
    details: String,
}

impl Threat {
    pub fn builder(threat_type: ThreatType) -> ThreatBuilder {
        ThreatBuilder::new(threat_type)
    }

    pub fn threat_type(&self) -> ThreatType {
        self.threat_type
    }

    pub fn severity(&self) -> ThreatSeverity {
        self.severity
    }

    pub fn action(&self) -> ThreatAction {
        self.action
    }

    /// Parte o fuente de relaciones a la que aplica el hallazgo.
    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn details(&self) -> &str {
        &self.details
    }
}

impl fmt::Display for Threat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}/{}] {} en '{}': {}",
            self.severity, self.action, self.threat_type, self.location, self.details
        )
    }
}

/// Construye un [`Threat`]; severidad `High` y acción `Remove` por defecto.
#[derive(Clone, Debug)]
pub struct ThreatBuilder {
    threat_type: ThreatType,
    severity: ThreatSeverity,
    action: ThreatAction,
    location: String,
    details: String,
}

impl ThreatBuilder {
    pub fn new(threat_type: ThreatType) -> Self {
        Self {
            threat_type,
            severity: ThreatSeverity::High,
            action: ThreatAction::Remove,
            location: String::new(),
            details: String::new(),
        }
    }

    pub fn severity(mut self, severity: ThreatSeverity) -> Self {
        self.severity = severity;
        self
    }

    pub fn action(mut self, action: ThreatAction) -> Self {
        self.action = action;
        self
    }

    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn details(mut self, details: impl Into<String>) -> Self {
        self.details = details.into();
        self
    }

    pub fn build(self) -> Threat {
        Threat {
            threat_type: self.threat_type,
            severity: self.severity,
            action: self.action,
            location: self.location,
            details: self.details,
        }
    }
}
