use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};

use crate::aliases::{DerivedKey32, PlainText};
use crate::consts::{MIN_CIPHERTEXT_LEN, NONCE_LEN};
use crate::error::CoreError;

pub type Result<T> = std::result::Result<T, CoreError>;

/// Decrypt `nonce || ciphertext || tag` → plaintext (in-memory)
///
/// Blobs shorter than nonce + tag are rejected before the cipher is touched.
/// A tag mismatch yields [`CoreError::AuthenticationFailure`] and no plaintext.
pub fn decrypt_to_vec(blob: &[u8], key: &DerivedKey32) -> Result<PlainText> {
    if blob.len() < MIN_CIPHERTEXT_LEN {
        return Err(CoreError::MalformedCiphertext { len: blob.len() });
    }

    let cipher = Aes256Gcm::new_from_slice(key.expose_secret())
        .map_err(|_| CoreError::AuthenticationFailure)?;
    let (nonce, sealed) = blob.split_at(NONCE_LEN);

    let plaintext = cipher
        .decrypt(Nonce::from_slice(nonce), sealed)
        .map_err(|_| CoreError::AuthenticationFailure)?;
    Ok(PlainText::new(plaintext))
}
