//! # zenc - Encrypted Patch Containers
//!
//! A small, strict implementation of the `zenc` container used to distribute
//! password-protected archive patches.
//!
//! ## Layout
//!
//! ```text
//! offset  field         encoding
//! 0       magic         5 ASCII bytes ("ZENC1")
//! 5       header len L  u32, big-endian
//! 9       header        L bytes of JSON: {"v":1,"kdf":"pbkdf2-sha256",
//!                       "iterations":N,"salt":"<b64>","nonce":"<b64>"}
//! 9+L     ciphertext    variable
//! end-16  tag           16 bytes (AES-256-GCM)
//! ```
//!
//! The key is derived with PBKDF2-HMAC-SHA256 and the payload is sealed with
//! AES-256-GCM using [`ASSOCIATED_DATA`] as additional authenticated data.
//! Decryption never exposes plaintext unless the tag verifies, and every
//! secret buffer is wiped when it goes out of scope.
//!
//! ## Examples
//!
//! ```no_run
//! use secrecy::SecretString;
//!
//! # fn main() -> Result<(), zenc::Error> {
//! let password = SecretString::from("hunter2");
//! let container = zenc::EncryptedContainer::open("patch.zenc")?;
//! let payload = zenc::decrypt_container(&container, &password)?;
//! println!("{} bytes of patch payload", payload.len());
//! # Ok(())
//! # }
//! ```

#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod container;
pub mod decrypt;
pub mod error;
pub mod header;
pub mod kdf;
pub mod seal;

pub use container::EncryptedContainer;
pub use decrypt::{Plaintext, decrypt, decrypt_container};
pub use error::{Error, Result};
pub use header::ContainerHeader;
pub use kdf::{DerivedKey, derive_key};
pub use seal::{SealOptions, seal};

/// Container magic, version family 1
pub const MAGIC: [u8; 5] = *b"ZENC1";

/// Additional authenticated data bound to every container
pub const ASSOCIATED_DATA: &[u8] = b"zenc-v1";

/// The only header version this crate understands
pub const SUPPORTED_VERSION: u32 = 1;

/// The only key derivation identifier this crate understands
pub const KDF_PBKDF2_SHA256: &str = "pbkdf2-sha256";

/// Size of the derived AES-256 key
pub const KEY_SIZE: usize = 32;

/// Size of the AES-GCM nonce
pub const NONCE_SIZE: usize = 12;

/// Size of the GCM authentication tag
pub const TAG_SIZE: usize = 16;

/// Size of a freshly generated salt
pub const SALT_SIZE: usize = 16;

/// Iteration count used when sealing without an explicit value
pub const DEFAULT_ITERATIONS: u32 = 100_000;
