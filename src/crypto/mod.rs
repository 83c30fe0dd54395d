//! Pure cryptographic operations (no I/O, no archive handling)
//!
//! All functions work exclusively on in-memory buffers.
//! Ciphertext blobs use the fixed ARCX layout:
//!
//! ```text
//! [12 bytes: random nonce][N bytes: ciphertext][16 bytes: GCM tag]
//! ```
mod decrypt;
mod encrypt;
mod kdf;

pub use decrypt::decrypt_to_vec;
pub use encrypt::encrypt_to_vec;
pub use kdf::{derive_key, generate_salt};
