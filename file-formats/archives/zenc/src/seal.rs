//! Container sealing (the inverse of [`crate::decrypt_container`])

use crate::{
    ASSOCIATED_DATA, ContainerHeader, DEFAULT_ITERATIONS, EncryptedContainer, Error, NONCE_SIZE,
    Result, SALT_SIZE, derive_key,
};
use aes_gcm::aead::{AeadInPlace, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use secrecy::SecretString;
use zeroize::Zeroizing;

/// Parameters for sealing a payload
///
/// Salt and nonce are generated randomly unless set explicitly. Fixed values
/// are only meant for reproducible fixtures.
#[derive(Debug, Clone)]
pub struct SealOptions {
    /// PBKDF2 iteration count written to the header
    pub iterations: u32,
    /// Explicit salt (random when `None`)
    pub salt: Option<Vec<u8>>,
    /// Explicit nonce (random when `None`)
    pub nonce: Option<[u8; NONCE_SIZE]>,
}

impl Default for SealOptions {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            salt: None,
            nonce: None,
        }
    }
}

impl SealOptions {
    /// Create new default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the iteration count
    pub fn iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    /// Use a fixed salt
    pub fn salt(mut self, salt: Vec<u8>) -> Self {
        self.salt = Some(salt);
        self
    }

    /// Use a fixed nonce
    pub fn nonce(mut self, nonce: [u8; NONCE_SIZE]) -> Self {
        self.nonce = Some(nonce);
        self
    }
}

/// Encrypt `plaintext` under `password` into a new container.
pub fn seal(
    password: &SecretString,
    plaintext: &[u8],
    options: &SealOptions,
) -> Result<EncryptedContainer> {
    if options.iterations == 0 {
        return Err(Error::format("iteration count must be at least 1"));
    }

    let salt = match &options.salt {
        Some(salt) if salt.is_empty() => return Err(Error::format("salt is empty")),
        Some(salt) => salt.clone(),
        None => rand::random::<[u8; SALT_SIZE]>().to_vec(),
    };
    let nonce = options
        .nonce
        .unwrap_or_else(rand::random::<[u8; NONCE_SIZE]>);

    let header = ContainerHeader::new(options.iterations, salt, nonce);
    let key = derive_key(password, &header.salt, header.iterations);
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()));

    let mut buffer = Zeroizing::new(plaintext.to_vec());
    let tag = cipher
        .encrypt_in_place_detached(Nonce::from_slice(&nonce), ASSOCIATED_DATA, buffer.as_mut_slice())
        .map_err(|_| Error::format("payload too large to seal"))?;

    let mut body = Vec::with_capacity(buffer.len() + tag.len());
    body.extend_from_slice(&buffer);
    body.extend_from_slice(&tag);

    log::debug!(
        "Sealed {} bytes with {} iterations",
        plaintext.len(),
        options.iterations
    );
    EncryptedContainer::new(header, body)
}
