//! Motor CDR (desarme y reconstrucción de contenido) para documentos Office.
//!
//! Un documento entra como bytes, cada [`Bleach`] registrado comprueba su
//! cabecera y el primero que lo reconoce lo reescribe sin contenido activo,
//! anotando cada hallazgo en una [`BleachSession`].

pub mod bleach;
pub mod config;
pub mod error;
pub mod hashing;
pub mod mime;
pub mod ooxml;
pub mod prefilter;
pub mod report;
pub mod session;
pub mod threat;
pub mod transport;

pub use bleach::{Bleach, BleachRegistry, MAGIC_PEEK_LEN};
pub use config::{BleachConfig, PackageLimits};
pub use error::{BleachError, Result};
pub use ooxml::OoxmlBleach;
pub use report::{FileDigest, SanitizeReport};
pub use session::BleachSession;
pub use threat::{Threat, ThreatAction, ThreatSeverity, ThreatType};
pub use transport::{RequestHandler, SanitizeRequest, SanitizeResponse, TransportError};
