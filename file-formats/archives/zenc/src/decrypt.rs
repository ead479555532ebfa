//! Authenticated decryption of container bodies

use crate::{
    ASSOCIATED_DATA, DerivedKey, EncryptedContainer, Error, NONCE_SIZE, Result, TAG_SIZE,
    derive_key,
};
use aes_gcm::aead::{AeadInPlace, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce, Tag};
use secrecy::SecretString;
use zeroize::Zeroizing;

/// Decrypted payload. Wiped when dropped.
pub type Plaintext = Zeroizing<Vec<u8>>;

/// Verify `tag` and decrypt `ciphertext` with AES-256-GCM.
///
/// Verification happens before any keystream is applied; on a mismatch the
/// working buffer still holds ciphertext and is wiped on return, so no
/// unauthenticated plaintext ever leaves this function.
pub fn decrypt(
    key: &DerivedKey,
    nonce: &[u8; NONCE_SIZE],
    ciphertext: &[u8],
    tag: &[u8],
    associated_data: &[u8],
) -> Result<Plaintext> {
    if tag.len() != TAG_SIZE {
        return Err(Error::format(format!(
            "tag must be {TAG_SIZE} bytes, got {}",
            tag.len()
        )));
    }

    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()));
    let mut buffer = Zeroizing::new(ciphertext.to_vec());

    cipher
        .decrypt_in_place_detached(
            Nonce::from_slice(nonce),
            associated_data,
            buffer.as_mut_slice(),
            Tag::from_slice(tag),
        )
        .map_err(|_| Error::Authentication)?;

    Ok(buffer)
}

/// Derive the key for `container` from `password` and decrypt its body.
pub fn decrypt_container(
    container: &EncryptedContainer,
    password: &SecretString,
) -> Result<Plaintext> {
    let header = container.header();
    log::debug!(
        "Deriving key with {} ({} iterations)",
        header.kdf_algorithm,
        header.iterations
    );
    let key = derive_key(password, &header.salt, header.iterations);

    let plaintext = decrypt(
        &key,
        &header.nonce,
        container.ciphertext(),
        container.tag(),
        ASSOCIATED_DATA,
    )?;

    log::info!("Decrypted {} byte patch payload", plaintext.len());
    Ok(plaintext)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{SealOptions, seal};

    fn options() -> SealOptions {
        SealOptions::new()
            .iterations(10)
            .salt(vec![4u8; 16])
            .nonce([8u8; NONCE_SIZE])
    }

    #[test]
    fn test_decrypt_roundtrip() {
        let password = SecretString::from("pw");
        let container = seal(&password, b"payload bytes", &options()).unwrap();
        let plaintext = decrypt_container(&container, &password).unwrap();
        assert_eq!(plaintext.as_slice(), b"payload bytes");
    }

    #[test]
    fn test_wrong_associated_data_fails() {
        let password = SecretString::from("pw");
        let container = seal(&password, b"payload", &options()).unwrap();
        let header = container.header();
        let key = derive_key(&password, &header.salt, header.iterations);

        let err = decrypt(
            &key,
            &header.nonce,
            container.ciphertext(),
            container.tag(),
            b"zenc-v2",
        )
        .unwrap_err();
        assert!(matches!(err, Error::Authentication));
    }

    #[test]
    fn test_short_tag_is_format_error() {
        let key = derive_key(&SecretString::from("pw"), b"salt", 1);
        let err = decrypt(&key, &[0; NONCE_SIZE], b"abc", &[0; 8], ASSOCIATED_DATA).unwrap_err();
        assert!(matches!(err, Error::Format(_)));
    }
}
