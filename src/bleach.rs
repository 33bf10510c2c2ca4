//! Despacho de saneadores por formato.

use std::io::{Read, Write};

use crate::config::BleachConfig;
use crate::error::Result;
use crate::ooxml::OoxmlBleach;
use crate::session::BleachSession;

/// Bytes iniciales que se entregan a [`Bleach::handles_magic`].
pub const MAGIC_PEEK_LEN: usize = 8;

/// Saneador de un formato concreto.
pub trait Bleach: Send + Sync {
    /// Comprobación barata, sin consumir la entrada, de si el flujo parece de este formato.
    fn handles_magic(&self, header: &[u8]) -> bool;

    fn name(&self) -> &str;

    /// Escribe en `output` la versión saneada de `input` y registra los hallazgos en `session`.
    fn sanitize(
        &self,
        input: &[u8],
        output: &mut dyn Write,
        session: &mut BleachSession,
    ) -> Result<()>;
}

/// Lista ordenada de saneadores; el primero que reconoce la cabecera se queda el documento.
pub struct BleachRegistry {
    bleaches: Vec<Box<dyn Bleach>>,
}

impl Default for BleachRegistry {
    fn default() -> Self {
        Self::empty().with(OoxmlBleach::default())
    }
}

impl BleachRegistry {
    pub fn empty() -> Self {
        Self {
            bleaches: Vec::new(),
        }
    }

    pub fn from_config(config: &BleachConfig) -> Self {
        Self::empty().with(OoxmlBleach::from_config(config))
    }

    pub fn with<B: Bleach + 'static>(mut self, bleach: B) -> Self {
        self.bleaches.push(Box::new(bleach));
        self
    }

    pub fn names(&self) -> Vec<&str> {
        self.bleaches.iter().map(|bleach| bleach.name()).collect()
    }

    pub fn find(&self, header: &[u8]) -> Option<&dyn Bleach> {
        let header = &header[..header.len().min(MAGIC_PEEK_LEN)];
        self.bleaches
            .iter()
            .find(|bleach| bleach.handles_magic(header))
            .map(|bleach| bleach.as_ref())
    }

    /// Lee la entrada completa antes de escribir nada en la salida.
    pub fn sanitize<R: Read, W: Write>(
        &self,
        mut input: R,
        mut output: W,
        session: &mut BleachSession,
    ) -> Result<()> {
        let mut buffer = Vec::new();
        input.read_to_end(&mut buffer)?;
        self.sanitize_bytes(&buffer, &mut output, session)
    }

    /// Sin saneador compatible, la entrada se copia tal cual.
    pub fn sanitize_bytes(
        &self,
        input: &[u8],
        output: &mut dyn Write,
        session: &mut BleachSession,
    ) -> Result<()> {
        match self.find(input) {
            Some(bleach) => {
                tracing::debug!(bleach = bleach.name(), "saneador seleccionado");
                bleach.sanitize(input, output, session)
            }
            None => {
                tracing::debug!("ningún saneador reconoce el archivo; se copia sin cambios");
                output.write_all(input)?;
                Ok(())
            }
        }
    }
}
