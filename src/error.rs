// src/error.rs
//! Public error type for the entire crate
//!
//! Every variant is file-scoped: the pipeline reports it and moves on to the
//! next container in the batch.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid ARCX: {0}")]
    InvalidContainer(String),

    #[error("not password-encrypted; cannot decrypt")]
    NotPasswordEncrypted,

    #[error("no usable salt in manifest: {0}")]
    MissingOrInvalidSalt(String),

    #[error("expected {expected}-byte salt, got {actual}")]
    InvalidSaltLength { expected: usize, actual: usize },

    #[error("KDF iteration count must be at least 1")]
    InvalidKdfIterations,

    #[error("ciphertext too short ({len} bytes)")]
    MalformedCiphertext { len: usize },

    /// Deliberately silent on whether the password or the data was wrong.
    #[error("decryption failed: wrong password or damaged archive")]
    AuthenticationFailure,

    #[error("encryption failed")]
    EncryptionFailure,

    #[error("corrupt payload: {0}")]
    CorruptPayload(String),

    #[error("configuration error: {0}")]
    Config(String),
}
