//! Huellas SHA-256 para comparar la entrada con la salida saneada.

use sha2::{Digest, Sha256};

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut sha256 = Sha256::new();
    sha256.update(bytes);
    format!("{:x}", sha256.finalize())
}
