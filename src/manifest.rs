// src/manifest.rs
//! The container manifest (`manifest.json`)
//!
//! Only the keys this tool acts on are typed. Everything else is carried in
//! `extra` so an unrelated manifest round-trips without loss.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::consts::SALT_LEN;
use crate::error::CoreError;

pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_password_encrypted: Option<bool>,

    #[serde(rename = "salt_b64", default, skip_serializing_if = "Option::is_none")]
    pub salt: Option<String>,

    /// Outer `Some` means the key exists, even when its value is `null`.
    #[serde(
        rename = "signature_b64",
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub signature: Option<Option<String>>,

    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub sha256: Option<Option<String>>,

    /// Kept verbatim; only an object gets its `chats_count` updated.
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub scope: Option<Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Marks a key as present regardless of its value
fn present<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl Manifest {
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes)
            .map_err(|e| CoreError::InvalidContainer(format!("unreadable manifest: {e}")))
    }

    /// Compact JSON, as the ARCX writer emits it
    pub fn to_vec(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self)
            .map_err(|e| CoreError::InvalidContainer(format!("manifest serialization: {e}")))
    }

    pub fn is_password_encrypted(&self) -> bool {
        self.is_password_encrypted.unwrap_or(false)
    }

    pub fn chats_count(&self) -> Option<u64> {
        self.scope.as_ref()?.get("chats_count")?.as_u64()
    }

    /// Decode `salt_b64`; anything but exactly 32 bytes is an error
    pub fn salt_bytes(&self) -> Result<[u8; SALT_LEN]> {
        let encoded = self
            .salt
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| CoreError::MissingOrInvalidSalt("salt_b64 missing".into()))?;
        let decoded = STANDARD
            .decode(encoded)
            .map_err(|e| CoreError::MissingOrInvalidSalt(format!("salt_b64 not base64: {e}")))?;
        let len = decoded.len();
        decoded.try_into().map_err(|_| {
            CoreError::MissingOrInvalidSalt(format!("expected {SALT_LEN}-byte salt, got {len}"))
        })
    }

    /// Check the guards for decrypting this container and return its salt
    pub fn require_password_salt(&self) -> Result<[u8; SALT_LEN]> {
        if !self.is_password_encrypted() {
            return Err(CoreError::NotPasswordEncrypted);
        }
        self.salt_bytes()
    }

    /// Produce the manifest for a rebuilt container
    ///
    /// Consumes the original so it cannot be written back by accident. The
    /// new salt always replaces the old one; a present signature is cleared
    /// and a present digest is recomputed over `ciphertext`; `scope.chats_count`
    /// is only set when `scope` is an object, whatever it held before.
    pub fn sync_after_rebuild(
        self,
        new_salt: &[u8; SALT_LEN],
        chats_count: usize,
        ciphertext: &[u8],
    ) -> Manifest {
        let scope = self.scope.map(|mut scope| {
            if let Value::Object(fields) = &mut scope {
                fields.insert("chats_count".into(), Value::from(chats_count));
            }
            scope
        });

        Manifest {
            salt: Some(STANDARD.encode(new_salt)),
            signature: self.signature.map(|_| Some(String::new())),
            sha256: self
                .sha256
                .map(|_| Some(STANDARD.encode(Sha256::digest(ciphertext)))),
            scope,
            ..self
        }
    }
}
