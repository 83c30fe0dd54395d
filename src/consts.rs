// src/consts.rs
//! Shared constants: security parameters and ARCX layout

/// PBKDF2-HMAC-SHA256 iterations used by the ARCX writer
// 600_000 ≈ 0.5-1 second on a typical CPU
pub const KDF_ITERATIONS: u32 = 600_000;

/// Salt length stored (base64) in the manifest
pub const SALT_LEN: usize = 32;

/// AES-256 key length
pub const KEY_LEN: usize = 32;

/// AES-GCM nonce length, prepended to the ciphertext blob
pub const NONCE_LEN: usize = 12;

/// AES-GCM tag length, appended to the ciphertext blob
pub const TAG_LEN: usize = 16;

/// Anything shorter cannot hold `nonce || tag`
pub const MIN_CIPHERTEXT_LEN: usize = NONCE_LEN + TAG_LEN;

/// Outer container entry holding the manifest JSON
pub const MANIFEST_ENTRY: &str = "manifest.json";

/// Outer container entry holding `nonce || ciphertext || tag`
pub const CIPHERTEXT_ENTRY: &str = "archive.arcx";

/// Chat records live at `Chats/<id>.arcx.json` inside the payload
pub const CHAT_PREFIX: &str = "Chats/";
pub const CHAT_SUFFIX: &str = ".arcx.json";

/// Container file extension (compared case-insensitively)
pub const CONTAINER_EXTENSION: &str = "arcx";

/// Appended to the input stem to name the output container
pub const CLEANED_SUFFIX: &str = "_cleaned";

/// Keep chats with at least this many assistant messages
pub const DEFAULT_MIN_ASSISTANT_MESSAGES: usize = 3;

/// Environment variable consulted for the password
pub const PASSWORD_ENV: &str = "ARCX_PASSWORD";

/// Environment variable pointing at a TOML config file
pub const CONFIG_ENV: &str = "ARCX_CLEAN_CONFIG";

/// Config file picked up from the working directory when present
pub const DEFAULT_CONFIG_FILE: &str = "arcx-clean.toml";
