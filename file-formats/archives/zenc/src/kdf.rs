//! Key derivation: password → AES-256 key via PBKDF2-HMAC-SHA256

use crate::KEY_SIZE;
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A 256-bit key derived for a single decrypt or seal operation.
///
/// Zeroized on drop, so every exit path of the caller wipes it.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey {
    bytes: [u8; KEY_SIZE],
}

impl DerivedKey {
    /// Raw key bytes
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// Derive a key from `password` and `salt`.
///
/// `iterations` is used verbatim; callers reading it from an untrusted header
/// inherit whatever cost that header asks for.
pub fn derive_key(password: &SecretString, salt: &[u8], iterations: u32) -> DerivedKey {
    let mut key = DerivedKey {
        bytes: [0u8; KEY_SIZE],
    };
    pbkdf2::pbkdf2_hmac::<Sha256>(
        password.expose_secret().as_bytes(),
        salt,
        iterations,
        &mut key.bytes,
    );
    key
}
