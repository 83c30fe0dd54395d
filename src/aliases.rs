// src/aliases.rs
//! Re-exports secure-gate's ergonomic secret types
//!
//! These are the canonical secret types used throughout arcx-clean.
//! Everything here zeroizes on drop.

pub use secure_gate::{dynamic_alias, fixed_alias};

// Fixed-size secrets
fixed_alias!(DerivedKey32, 32); // PBKDF2 output, AES-256-GCM key

// Dynamic secrets
dynamic_alias!(ArcxPassword, String); // user password, shared read-only across a batch
dynamic_alias!(PlainText, Vec<u8>); // decrypted or rebuilt payload ZIP
