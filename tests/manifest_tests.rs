// tests/manifest_tests.rs
use arcx_clean::error::CoreError;
use arcx_clean::Manifest;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};

mod common;
use common::base_manifest;

fn manifest(value: Value) -> Manifest {
    serde_json::from_value(value).unwrap()
}

fn as_json(manifest: &Manifest) -> Value {
    serde_json::from_slice(&manifest.to_vec().unwrap()).unwrap()
}

fn with_salt(mut value: Value, salt: &[u8]) -> Value {
    value["salt_b64"] = Value::String(STANDARD.encode(salt));
    value
}

#[test]
fn test_salt_bytes_decodes_32_byte_salt() {
    let m = manifest(with_salt(base_manifest(1), &[9u8; 32]));
    assert_eq!(m.salt_bytes().unwrap(), [9u8; 32]);
    assert_eq!(m.require_password_salt().unwrap(), [9u8; 32]);
}

#[test]
fn test_salt_of_wrong_length_is_rejected() {
    for len in [0usize, 16, 31, 33, 48] {
        let m = manifest(with_salt(base_manifest(1), &vec![1u8; len]));
        assert!(
            matches!(m.salt_bytes(), Err(CoreError::MissingOrInvalidSalt(_))),
            "{len}-byte salt accepted"
        );
    }
}

#[test]
fn test_missing_or_undecodable_salt_is_rejected() {
    let missing = manifest(base_manifest(1));
    assert!(matches!(
        missing.require_password_salt(),
        Err(CoreError::MissingOrInvalidSalt(_))
    ));

    let mut bad = base_manifest(1);
    bad["salt_b64"] = json!("***not base64***");
    assert!(matches!(
        manifest(bad).salt_bytes(),
        Err(CoreError::MissingOrInvalidSalt(_))
    ));
}

#[test]
fn test_device_key_containers_are_refused() {
    let mut value = with_salt(base_manifest(1), &[0u8; 32]);
    value["is_password_encrypted"] = json!(false);
    assert!(matches!(
        manifest(value.clone()).require_password_salt(),
        Err(CoreError::NotPasswordEncrypted)
    ));

    value.as_object_mut().unwrap().remove("is_password_encrypted");
    assert!(matches!(
        manifest(value).require_password_salt(),
        Err(CoreError::NotPasswordEncrypted)
    ));
}

#[test]
fn test_sync_after_rebuild_updates_every_tracked_field() {
    let old_salt = [1u8; 32];
    let new_salt = [2u8; 32];
    let ciphertext = b"new ciphertext bytes";

    let synced = manifest(with_salt(base_manifest(4), &old_salt)).sync_after_rebuild(
        &new_salt,
        2,
        ciphertext,
    );

    assert_eq!(synced.salt_bytes().unwrap(), new_salt);
    assert_eq!(synced.signature, Some(Some(String::new())));
    assert_eq!(
        synced.sha256,
        Some(Some(STANDARD.encode(Sha256::digest(ciphertext))))
    );
    assert_eq!(synced.chats_count(), Some(2));
}

#[test]
fn test_sync_preserves_unrelated_fields() {
    let before = with_salt(base_manifest(4), &[1u8; 32]);
    let synced = manifest(before.clone()).sync_after_rebuild(&[2u8; 32], 2, b"ct");
    let after = as_json(&synced);

    assert_eq!(after["version"], before["version"]);
    assert_eq!(after["created_at"], before["created_at"]);
    assert_eq!(after["export_id"], before["export_id"]);
    assert_eq!(after["is_password_encrypted"], json!(true));
    assert_eq!(after["scope"]["entries_count"], json!(12));
    assert_eq!(after["scope"]["chats_count"], json!(2));
    assert_eq!(after["signature_b64"], json!(""));
}

#[test]
fn test_sync_does_not_invent_optional_fields() {
    let bare = json!({
        "is_password_encrypted": true,
        "salt_b64": STANDARD.encode([1u8; 32]),
    });
    let synced = manifest(bare).sync_after_rebuild(&[2u8; 32], 5, b"ct");
    let after = as_json(&synced);

    let keys: Vec<&str> = after.as_object().unwrap().keys().map(String::as_str).collect();
    assert_eq!(keys, ["is_password_encrypted", "salt_b64"]);
    assert_eq!(synced.chats_count(), None);
}

#[test]
fn test_null_signature_and_digest_count_as_present() {
    let value = json!({
        "is_password_encrypted": true,
        "salt_b64": STANDARD.encode([1u8; 32]),
        "signature_b64": null,
        "sha256": null,
    });
    let synced = manifest(value).sync_after_rebuild(&[2u8; 32], 0, b"ct");
    let after = as_json(&synced);

    assert_eq!(after["signature_b64"], json!(""));
    assert_eq!(after["sha256"], json!(STANDARD.encode(Sha256::digest(b"ct"))));
}

#[test]
fn test_manifest_round_trips_losslessly() {
    let value = with_salt(base_manifest(3), &[5u8; 32]);
    let parsed = manifest(value.clone());
    assert_eq!(as_json(&parsed), value);
    assert_eq!(Manifest::from_slice(&parsed.to_vec().unwrap()).unwrap(), parsed);
}

#[test]
fn test_unreadable_manifest_is_an_invalid_container() {
    assert!(matches!(
        Manifest::from_slice(b"{not json"),
        Err(CoreError::InvalidContainer(_))
    ));
    assert!(matches!(
        Manifest::from_slice(br#"{"is_password_encrypted":"yes"}"#),
        Err(CoreError::InvalidContainer(_))
    ));
}

#[test]
fn test_non_object_scope_is_carried_through_untouched() {
    for scope in [json!(null), json!("all"), json!(["chats", "journal"]), json!(7)] {
        let value = json!({
            "is_password_encrypted": true,
            "salt_b64": STANDARD.encode([1u8; 32]),
            "scope": scope.clone(),
        });
        let parsed = Manifest::from_slice(&serde_json::to_vec(&value).unwrap()).unwrap();
        let synced = parsed.sync_after_rebuild(&[2u8; 32], 3, b"ct");
        let after = as_json(&synced);

        assert_eq!(after["scope"], scope, "scope {scope} was altered");
        assert!(after.as_object().unwrap().contains_key("scope"));
        assert_eq!(synced.chats_count(), None);
    }
}

#[test]
fn test_unexpected_chats_count_is_overwritten() {
    for stale in [json!("7"), json!(-1), json!(null), json!({"n": 2})] {
        let mut value = with_salt(base_manifest(0), &[1u8; 32]);
        value["scope"]["chats_count"] = stale.clone();

        let parsed = Manifest::from_slice(&serde_json::to_vec(&value).unwrap()).unwrap();
        assert_eq!(parsed.chats_count(), None, "{stale} read as a count");

        let after = as_json(&parsed.sync_after_rebuild(&[2u8; 32], 4, b"ct"));
        assert_eq!(after["scope"]["chats_count"], json!(4));
        assert_eq!(after["scope"]["entries_count"], json!(12));
    }
}
