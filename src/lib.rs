// src/lib.rs
//! profile-vault: named credential profiles encrypted under one master password
//!
//! Features:
//! - `openssl enc -aes-256-cbc -pbkdf2` compatible value encryption
//! - Tamper-evident credential record (salted hash + encrypted sentinel + checksum)
//! - Verification state machine with least-destructive recovery
//! - Short-lived session cache for read-only status paths

pub mod aliases;
pub mod auth;
pub mod cleanup;
pub mod config;
pub mod consts;
pub mod credential;
pub mod crypto;
pub mod db;
pub mod export;
pub mod profiles;
pub mod rotate;
pub mod session;
pub mod vault;

pub mod error;

// Re-export everything users need at the crate root
pub use aliases::MasterPassword;
pub use auth::{Verification, VerifiedPassword, Verifier};
pub use config::{load as load_config, Config};
pub use credential::{CredentialCheck, CredentialRecord};
pub use error::{AuthError, CipherError, CoreError, InputError, Result as CoreResult};
pub use profiles::{Profile, ProfileEnvVar, VarType};
pub use rotate::{change_master_password, RotationSummary};
pub use session::{Session, SessionCache};
pub use vault::Vault;
