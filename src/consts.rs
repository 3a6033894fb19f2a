// src/consts.rs
//! Shared constants: security parameters and defaults

/// PBKDF2-HMAC-SHA256 rounds used by `openssl enc -pbkdf2 -iter 100000`.
/// Not recorded in the ciphertext, so it can never change without a migration.
pub const KDF_ITERATIONS: u32 = 100_000;

/// OpenSSL salted-format magic
pub const OPENSSL_MAGIC: &[u8; 8] = b"Salted__";

/// Per-ciphertext salt length in the OpenSSL salted format
pub const OPENSSL_SALT_LEN: usize = 8;

/// Column width of `openssl enc -base64` output
pub const BASE64_LINE_WIDTH: usize = 64;

/// Largest plaintext the Cipher Service accepts
pub const MAX_PLAINTEXT_LEN: usize = 1024 * 1024;

/// Largest master password accepted from input
pub const MAX_PASSWORD_LEN: usize = 1024;

/// Random bytes in the credential salt (hex-encoded when stored)
pub const CREDENTIAL_SALT_LEN: usize = 32;

/// Prefix of the plaintext sentinel stored in the credential record
pub const SENTINEL_PREFIX: &str = "AUTH_VERIFICATION:";

/// Default session lifetime in seconds
pub const DEFAULT_SESSION_TIMEOUT_SECS: u64 = 1800;

/// Total password attempts before the protocol forces a decision
pub const DEFAULT_MAX_ATTEMPTS: u32 = 4;

/// Typed phrase required before wiping every profile
pub const WIPE_CONFIRMATION_PHRASE: &str = "WIPE PROFILES";

/// Typed phrase required before clearing the credential record and all profiles
pub const RESET_CONFIRMATION_PHRASE: &str = "RESET VAULT";

/// Application directory name under the user's config dir
pub const APP_DIR_NAME: &str = "profile-vault";
