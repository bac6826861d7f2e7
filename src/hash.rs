// hash.rs — Hash primitive behind the certificate digest
//
// The digest is SHA-256 over canonical bytes, rendered as lowercase hex.
// The primitive sits behind `ContentHasher` so a runtime that cannot provide
// it reports an environment error instead of a bogus "tampered" verdict.

use sha2::{Digest, Sha256};

use crate::error::IntegrityError;

/// Length of a hex-encoded SHA-256 digest.
pub const DIGEST_HEX_LEN: usize = 64;

/// A cryptographic hash over raw bytes, returning lowercase hex.
pub trait ContentHasher: Send + Sync {
    /// Algorithm name, used in log lines only.
    fn algorithm(&self) -> &'static str;

    fn digest_hex(&self, data: &[u8]) -> Result<String, IntegrityError>;
}

/// The SHA-256 primitive from `sha2`. Always available.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Hasher;

impl ContentHasher for Sha256Hasher {
    fn algorithm(&self) -> &'static str {
        "sha256"
    }

    fn digest_hex(&self, data: &[u8]) -> Result<String, IntegrityError> {
        Ok(sha256_hex(data))
    }
}

/// Compute SHA-256 hex digest of a byte slice.
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex_encode(&hasher.finalize())
}

/// True if `s` has the shape of a digest this crate produces.
pub fn is_digest_hex(s: &str) -> bool {
    s.len() == DIGEST_HEX_LEN && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

pub(crate) fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
