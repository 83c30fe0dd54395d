use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use rand::RngCore;

use crate::aliases::DerivedKey32;
use crate::consts::NONCE_LEN;
use crate::error::CoreError;

/// Encrypt plaintext → `nonce || ciphertext || tag` (in-memory)
///
/// A new random nonce is drawn on every call.
pub fn encrypt_to_vec(plaintext: &[u8], key: &DerivedKey32) -> Result<Vec<u8>, CoreError> {
    let cipher = Aes256Gcm::new_from_slice(key.expose_secret())
        .map_err(|_| CoreError::EncryptionFailure)?;

    let mut nonce_bytes = [0u8; NONCE_LEN];
    rand::rng().fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    // aes-gcm appends the tag to the ciphertext
    let sealed = cipher
        .encrypt(nonce, plaintext)
        .map_err(|_| CoreError::EncryptionFailure)?;

    let mut blob = Vec::with_capacity(NONCE_LEN + sealed.len());
    blob.extend_from_slice(&nonce_bytes);
    blob.extend_from_slice(&sealed);
    Ok(blob)
}
