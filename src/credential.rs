// src/credential.rs
//! Credential Record Store: the tamper-evident master-password record
//!
//! The record proves knowledge of the master password two ways (salted hash and an
//! encrypted sentinel) and carries a password-independent checksum over both, so storage
//! tampering is detectable before any password is offered.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use tracing::{debug, warn};

use crate::aliases::MasterPassword;
use crate::consts::{CREDENTIAL_SALT_LEN, SENTINEL_PREFIX};
use crate::crypto;
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialRecord {
    pub password_hash: String,
    pub encrypted_sentinel: String,
    pub salt: String,
    pub checksum: String,
    pub created_at: DateTime<Utc>,
}

/// What the stored record says about a candidate password
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialCheck {
    Valid,
    /// No record stored yet
    Missing,
    /// Checksum over the stored fields does not match
    Tampered,
    HashMismatch,
    /// Hash matched but the sentinel did not decrypt to the expected text
    SentinelInvalid,
}

impl CredentialCheck {
    pub fn is_valid(self) -> bool {
        self == CredentialCheck::Valid
    }
}

impl CredentialRecord {
    /// Build a fresh record for `password` with a new random salt
    pub fn generate(password: &MasterPassword) -> Result<Self> {
        let salt = hex::encode(rand::random::<[u8; CREDENTIAL_SALT_LEN]>());
        let created_at = Utc::now();

        let password_hash = hash_password(password, &salt);
        let sentinel = format!("{SENTINEL_PREFIX}{salt}:{}", created_at.timestamp());
        let encrypted_sentinel = crypto::encrypt_str(&sentinel, password)?;
        let checksum = compute_checksum(&password_hash, &encrypted_sentinel, &salt);

        Ok(Self {
            password_hash,
            encrypted_sentinel,
            salt,
            checksum,
            created_at,
        })
    }

    pub fn checksum_valid(&self) -> bool {
        let expected = compute_checksum(&self.password_hash, &self.encrypted_sentinel, &self.salt);
        constant_time_eq(&expected, &self.checksum)
    }

    /// Test `password` against this record; integrity is checked first
    pub fn check(&self, password: &MasterPassword) -> CredentialCheck {
        if !self.checksum_valid() {
            warn!("credential record checksum mismatch");
            return CredentialCheck::Tampered;
        }
        if !constant_time_eq(&hash_password(password, &self.salt), &self.password_hash) {
            return CredentialCheck::HashMismatch;
        }

        let expected_prefix = format!("{SENTINEL_PREFIX}{}", self.salt);
        match crypto::decrypt_str(&self.encrypted_sentinel, password) {
            Ok(text) if text.starts_with(&expected_prefix) => CredentialCheck::Valid,
            _ => CredentialCheck::SentinelInvalid,
        }
    }
}

/// `sha256(password ‖ salt)` as lowercase hex
pub fn hash_password(password: &MasterPassword, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.expose_secret().as_bytes());
    hasher.update(salt.as_bytes());
    hex::encode(hasher.finalize())
}

/// `sha256(password_hash ‖ encrypted_sentinel ‖ salt)` as lowercase hex
pub fn compute_checksum(password_hash: &str, encrypted_sentinel: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password_hash.as_bytes());
    hasher.update(encrypted_sentinel.as_bytes());
    hasher.update(salt.as_bytes());
    hex::encode(hasher.finalize())
}

fn constant_time_eq(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Load the singleton record, if any
pub fn load(conn: &Connection) -> Result<Option<CredentialRecord>> {
    let record = conn
        .query_row(
            "SELECT password_hash, encrypted_sentinel, salt, checksum, created_at
             FROM auth WHERE id = 1",
            [],
            |row| {
                Ok(CredentialRecord {
                    password_hash: row.get(0)?,
                    encrypted_sentinel: row.get(1)?,
                    salt: row.get(2)?,
                    checksum: row.get(3)?,
                    created_at: row.get(4)?,
                })
            },
        )
        .optional()?;
    Ok(record)
}

pub fn exists(conn: &Connection) -> Result<bool> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM auth", [], |row| row.get(0))?;
    Ok(count > 0)
}

/// Insert or replace the singleton record in one statement
///
/// A single upsert is atomic in SQLite: readers see the old row or the new row, never a mix.
pub fn store(conn: &Connection, record: &CredentialRecord) -> Result<()> {
    conn.execute(
        r#"
        INSERT INTO auth (id, password_hash, encrypted_sentinel, salt, checksum, created_at)
        VALUES (1, ?1, ?2, ?3, ?4, ?5)
        ON CONFLICT(id) DO UPDATE SET
            password_hash      = excluded.password_hash,
            encrypted_sentinel = excluded.encrypted_sentinel,
            salt               = excluded.salt,
            checksum           = excluded.checksum,
            created_at         = excluded.created_at
        "#,
        params![
            record.password_hash,
            record.encrypted_sentinel,
            record.salt,
            record.checksum,
            record.created_at,
        ],
    )?;
    debug!("credential record stored");
    Ok(())
}

pub fn delete(conn: &Connection) -> Result<bool> {
    let removed = conn.execute("DELETE FROM auth", [])?;
    Ok(removed > 0)
}
