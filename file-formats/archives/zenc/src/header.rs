//! Container header metadata
//!
//! The header is a JSON document carried between the fixed framing and the
//! ciphertext. Field names are kept short on the wire (`v`, `kdf`); the
//! decoded form exposes them under descriptive names.

use crate::{Error, KDF_PBKDF2_SHA256, NONCE_SIZE, Result, SUPPORTED_VERSION};
use base64::{Engine, engine::general_purpose::STANDARD as B64};
use serde::{Deserialize, Serialize};

/// Header exactly as it appears on the wire
#[derive(Debug, Serialize, Deserialize)]
struct RawHeader {
    v: u32,
    kdf: String,
    iterations: u32,
    salt: String,
    nonce: String,
}

/// The fields every header version carries, read before anything else
#[derive(Debug, Deserialize)]
struct Preamble {
    v: u32,
    #[serde(default)]
    kdf: Option<String>,
}

/// Decoded and validated container header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerHeader {
    /// Header version, always [`SUPPORTED_VERSION`] after validation
    pub version: u32,
    /// Key derivation identifier, normalized to lowercase
    pub kdf_algorithm: String,
    /// PBKDF2 iteration count taken verbatim from the file
    pub iterations: u32,
    /// KDF salt
    pub salt: Vec<u8>,
    /// AES-GCM nonce
    pub nonce: [u8; NONCE_SIZE],
}

impl ContainerHeader {
    /// Build a header for sealing
    pub fn new(iterations: u32, salt: Vec<u8>, nonce: [u8; NONCE_SIZE]) -> Self {
        Self {
            version: SUPPORTED_VERSION,
            kdf_algorithm: KDF_PBKDF2_SHA256.to_string(),
            iterations,
            salt,
            nonce,
        }
    }

    /// Parse and validate the JSON header block
    ///
    /// Version and KDF are checked before the remaining fields are even
    /// deserialized, so a container from a newer tool with a different field
    /// set reports as stale rather than malformed.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let preamble: Preamble = serde_json::from_slice(bytes)
            .map_err(|e| Error::format(format!("invalid header: {e}")))?;
        if preamble.v != SUPPORTED_VERSION {
            return Err(Error::unsupported(format!("header version {}", preamble.v)));
        }
        if let Some(kdf) = &preamble.kdf {
            if !kdf.eq_ignore_ascii_case(KDF_PBKDF2_SHA256) {
                return Err(Error::unsupported(format!("key derivation '{kdf}'")));
            }
        }

        let raw: RawHeader = serde_json::from_slice(bytes)
            .map_err(|e| Error::format(format!("invalid header: {e}")))?;
        if raw.iterations == 0 {
            return Err(Error::format("iteration count must be at least 1"));
        }

        let salt = B64
            .decode(raw.salt.as_bytes())
            .map_err(|e| Error::format(format!("salt is not valid base64: {e}")))?;
        if salt.is_empty() {
            return Err(Error::format("salt is empty"));
        }

        let nonce_bytes = B64
            .decode(raw.nonce.as_bytes())
            .map_err(|e| Error::format(format!("nonce is not valid base64: {e}")))?;
        let nonce: [u8; NONCE_SIZE] = nonce_bytes.as_slice().try_into().map_err(|_| {
            Error::format(format!(
                "nonce must be {NONCE_SIZE} bytes, got {}",
                nonce_bytes.len()
            ))
        })?;

        Ok(Self {
            version: raw.v,
            kdf_algorithm: raw.kdf.to_ascii_lowercase(),
            iterations: raw.iterations,
            salt,
            nonce,
        })
    }

    /// Serialize to the wire JSON form
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let raw = RawHeader {
            v: self.version,
            kdf: self.kdf_algorithm.clone(),
            iterations: self.iterations,
            salt: B64.encode(&self.salt),
            nonce: B64.encode(self.nonce),
        };
        serde_json::to_vec(&raw).map_err(|e| Error::format(format!("cannot encode header: {e}")))
    }
}
