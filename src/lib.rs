// src/lib.rs
//! arcx-clean: prune short chat sessions from password-encrypted ARCX archives
//!
//! Features:
//! - PBKDF2-HMAC-SHA256 key derivation + AES-256-GCM payloads
//! - Nested ZIP payload rebuild that never touches non-chat entries
//! - Manifest resync (fresh salt, cleared signature, new digest, chat count)
//! - Full secure-gate integration for passwords, keys and plaintext

pub mod aliases;
pub mod config;
pub mod consts;
pub mod container;
pub mod crypto;
pub mod filter;
pub mod manifest;
pub mod payload;
pub mod pipeline;

#[cfg(feature = "cli")]
pub mod file_ops;

pub mod error;

// Re-export everything users need at the crate root
pub use aliases::{ArcxPassword, DerivedKey32, PlainText};
pub use config::load as load_config;
pub use container::ArchiveContainer;
pub use error::CoreError;
pub use filter::{ChatFilter, ChatVerdict};
pub use manifest::Manifest;
pub use payload::{PayloadArchive, Rebuilt};
pub use pipeline::{
    BatchSummary, CleanOptions, CleanReport, CleanedContainer, Cleaner, FileOutcome, Mode, Stage,
};

pub type Result<T> = std::result::Result<T, CoreError>;
