// src/error.rs
//! Public error types for the entire crate
//!
//! `CoreError` covers storage, cipher and configuration failures.
//! `AuthError` is the verification taxonomy surfaced to the user.

use thiserror::Error;

/// Failures of the Cipher Service.
///
/// Wrong passwords and damaged ciphertexts are deliberately indistinguishable.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CipherError {
    #[error("decryption failed: wrong password or corrupt ciphertext")]
    WrongPasswordOrCorrupt,

    #[error("plaintext of {len} bytes exceeds the {max}-byte limit")]
    PlaintextTooLarge { len: usize, max: usize },
}

/// Problems with what the user typed (or could not type). Never retried.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputError {
    #[error("password must not be empty")]
    EmptyPassword,

    #[error("password exceeds {max} bytes")]
    PasswordTooLong { max: usize },

    #[error("standard input is not an interactive terminal")]
    NotInteractive,

    #[error("the two entries did not match")]
    ConfirmationMismatch,
}

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Crypto operation failed: {0}")]
    Crypto(#[from] CipherError),

    #[error("Database error: {0}")]
    Sql(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Input(#[from] InputError),

    #[error("master password has not been initialized (run `pvault init`)")]
    NotInitialized,

    #[error("master password is already initialized (use `pvault init --force` to reset)")]
    AlreadyInitialized,

    #[error("profile '{0}' not found")]
    ProfileNotFound(String),

    #[error("profile '{0}' already exists")]
    ProfileExists(String),

    #[error("invalid name '{0}'")]
    InvalidName(String),

    #[error("value for '{0}' must not be empty")]
    EmptyValue(String),

    #[error("could not acquire vault lock: {0}")]
    Lock(std::io::Error),
}

impl CoreError {
    /// Process exit status when this error ends a command
    pub fn exit_code(&self) -> i32 {
        match self {
            CoreError::Input(_) => 64,
            CoreError::NotInitialized => 5,
            _ => 1,
        }
    }
}

impl From<toml::de::Error> for CoreError {
    fn from(err: toml::de::Error) -> Self {
        CoreError::Config(err.to_string())
    }
}

/// Outcome errors of the verification protocol.
///
/// Each variant names the next step the user should take.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error("master password has not been initialized; run `pvault init`")]
    NotInitialized,

    #[error("incorrect master password after {attempts} attempt(s); if it is lost, run `pvault init --force` to reset")]
    AuthMismatch { attempts: u32 },

    #[error("credential record failed its integrity check (storage was modified); run `pvault init --force` to reset, or restore from backup")]
    IntegrityTamper,

    #[error("stored profile data cannot be decrypted with the verified password; restore from backup or re-add the profiles")]
    PayloadCorrupt,

    #[error("cancelled")]
    Cancelled,

    #[error(transparent)]
    Store(#[from] CoreError),
}

impl AuthError {
    /// Process exit status for this outcome.
    pub fn exit_code(&self) -> i32 {
        match self {
            AuthError::AuthMismatch { .. } => 2,
            AuthError::IntegrityTamper => 3,
            AuthError::PayloadCorrupt => 4,
            AuthError::NotInitialized => 5,
            AuthError::Input(_) => 64,
            AuthError::Cancelled => 130,
            AuthError::Store(err) => err.exit_code(),
        }
    }
}

impl From<std::io::Error> for AuthError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::UnexpectedEof | std::io::ErrorKind::Interrupted => {
                AuthError::Cancelled
            }
            _ => AuthError::Store(CoreError::Io(err)),
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
