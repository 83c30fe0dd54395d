use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;
use zeroize::Zeroize;

use crate::aliases::DerivedKey32;
use crate::consts::{KEY_LEN, SALT_LEN};
use crate::error::CoreError;

pub type Result<T> = std::result::Result<T, CoreError>;

/// Derive the AES-256 key from a password and a 32-byte salt (PBKDF2-HMAC-SHA256)
///
/// Nothing is cached: every container carries its own salt, so the same
/// password never yields the same key twice across containers.
pub fn derive_key(password: &[u8], salt: &[u8], iterations: u32) -> Result<DerivedKey32> {
    if salt.len() != SALT_LEN {
        return Err(CoreError::InvalidSaltLength {
            expected: SALT_LEN,
            actual: salt.len(),
        });
    }
    if iterations == 0 {
        return Err(CoreError::InvalidKdfIterations);
    }

    let mut raw = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha256>(password, salt, iterations, &mut raw);
    let key = DerivedKey32::new(raw);
    raw.zeroize();
    Ok(key)
}

/// Fresh random salt for a re-encrypted container
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    rand::rng().fill_bytes(&mut salt);
    salt
}
