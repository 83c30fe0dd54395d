// tests/common.rs
//! Shared test utilities: logging setup and ARCX fixtures
#![allow(dead_code)] // each test binary uses a different subset

use std::path::{Path, PathBuf};

use arcx_clean::aliases::ArcxPassword;
use arcx_clean::crypto::{decrypt_to_vec, derive_key, encrypt_to_vec, generate_salt};
use arcx_clean::payload::{PayloadArchive, PayloadEntry};
use arcx_clean::{ArchiveContainer, CleanOptions, Manifest};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{json, Value};

#[cfg(feature = "logging")]
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Far below production strength; keeps the suite fast
pub const TEST_KDF_ITERATIONS: u32 = 1_000;

pub const TEST_PASSWORD: &str = "correct horse battery staple";

/// Initialize test-friendly logging (respects RUST_LOG=)
/// Call once at the start of any test that needs logs
pub fn setup() {
    #[cfg(feature = "logging")]
    tracing_subscriber::registry()
        .with(fmt::layer().with_test_writer())
        .with(EnvFilter::from_default_env())
        .try_init()
        .ok(); // idempotent

    #[cfg(not(feature = "logging"))]
    { /* no-op */ }
}

pub fn password() -> ArcxPassword {
    ArcxPassword::new(TEST_PASSWORD.to_owned())
}

pub fn options(min_assistant_messages: usize) -> CleanOptions {
    CleanOptions {
        min_assistant_messages,
        kdf_iterations: TEST_KDF_ITERATIONS,
    }
}

/// Chat document with `assistant` replies, each preceded by a user turn
pub fn chat_json(assistant: usize) -> Vec<u8> {
    let mut messages = Vec::new();
    for i in 0..assistant {
        messages.push(json!({ "role": "user", "content": format!("question {i}") }));
        messages.push(json!({ "role": "assistant", "content": format!("answer {i}") }));
    }
    messages.push(json!({ "role": "user", "content": "last word" }));
    serde_json::to_vec(&json!({ "id": "session", "messages": messages })).unwrap()
}

pub fn chat_name(i: usize) -> String {
    format!("Chats/chat-{i}.arcx.json")
}

/// Payload with chat records interleaved between unrelated entries
pub fn payload_with_chats(assistant_counts: &[usize]) -> PayloadArchive {
    let mut entries = vec![
        PayloadEntry::new("Journal/entries.json", br#"{"entries":[1,2,3]}"#.to_vec()),
        PayloadEntry::new("Chats/", Vec::new()),
        PayloadEntry::new("Chats/index.json", br#"{"chats":"all"}"#.to_vec()),
    ];
    for (i, count) in assistant_counts.iter().enumerate() {
        entries.push(PayloadEntry::new(chat_name(i), chat_json(*count)));
        entries.push(PayloadEntry::new(
            format!("Media/photo-{i}.jpg"),
            vec![0xFF, 0xD8, i as u8, 0xFF, 0xD9],
        ));
    }
    PayloadArchive::from_entries(entries).unwrap()
}

/// Manifest JSON as the ARCX writer produces it, minus the salt
pub fn base_manifest(chats_count: usize) -> Value {
    json!({
        "version": "1.1",
        "created_at": "2025-11-02T10:00:00Z",
        "is_password_encrypted": true,
        "signature_b64": "c2lnbmF0dXJl",
        "sha256": "b2xkLWRpZ2VzdA==",
        "scope": {
            "chats_count": chats_count,
            "entries_count": 12,
        },
        "export_id": "exp-42",
    })
}

/// Encrypt `payload` under a fresh salt and place it beside `manifest`
pub fn seal(payload: &[u8], mut manifest: Value, password: &ArcxPassword) -> ArchiveContainer {
    let salt = generate_salt();
    let key = derive_key(
        password.expose_secret().as_bytes(),
        &salt,
        TEST_KDF_ITERATIONS,
    )
    .unwrap();
    let ciphertext = encrypt_to_vec(payload, &key).unwrap();
    manifest["salt_b64"] = Value::String(STANDARD.encode(salt));
    let manifest: Manifest = serde_json::from_value(manifest).unwrap();
    ArchiveContainer::new(manifest, ciphertext)
}

/// Container whose payload holds chats with the given assistant counts
pub fn container_with_chats(assistant_counts: &[usize]) -> ArchiveContainer {
    let payload = payload_with_chats(assistant_counts).to_bytes().unwrap();
    seal(
        payload.expose_secret(),
        base_manifest(assistant_counts.len()),
        &password(),
    )
}

pub fn write_container(dir: &Path, name: &str, container: &ArchiveContainer) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, container.to_bytes().unwrap()).unwrap();
    path
}

/// Decrypt a container's payload with the test password
pub fn open_payload(container: &ArchiveContainer) -> PayloadArchive {
    let salt = container.manifest.salt_bytes().unwrap();
    let key = derive_key(TEST_PASSWORD.as_bytes(), &salt, TEST_KDF_ITERATIONS).unwrap();
    let plaintext = decrypt_to_vec(&container.ciphertext, &key).unwrap();
    PayloadArchive::open(plaintext.expose_secret()).unwrap()
}

pub fn chat_names(payload: &PayloadArchive) -> Vec<String> {
    payload
        .chat_records()
        .map(|e| e.name().to_owned())
        .collect()
}
