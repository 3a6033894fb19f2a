// src/profiles.rs
//! Profile Payload Store: named profiles and their encrypted environment variables
//!
//! Values are stored as Cipher Service text under the master password. Every entry point
//! that encrypts or decrypts takes a `VerifiedPassword`, which only the verification
//! protocol (or a master-password change) can produce.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::auth::VerifiedPassword;
use crate::crypto;
use crate::error::{CoreError, Result};

/// Kind of value held by an environment variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VarType {
    ApiKey,
    BaseUrl,
    #[default]
    Other,
}

impl VarType {
    pub fn as_str(self) -> &'static str {
        match self {
            VarType::ApiKey => "api_key",
            VarType::BaseUrl => "base_url",
            VarType::Other => "other",
        }
    }
}

impl fmt::Display for VarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VarType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "api_key" => Ok(VarType::ApiKey),
            "base_url" => Ok(VarType::BaseUrl),
            "other" => Ok(VarType::Other),
            other => Err(format!(
                "unknown variable type '{other}' (expected api_key, base_url or other)"
            )),
        }
    }
}

impl ToSql for VarType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for VarType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e: String| FromSqlError::Other(e.into()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileEnvVar {
    pub id: i64,
    pub profile_id: i64,
    pub key: String,
    pub ciphertext: String,
    pub var_type: VarType,
}

fn profile_from_row(row: &Row<'_>) -> rusqlite::Result<Profile> {
    Ok(Profile {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

fn env_var_from_row(row: &Row<'_>) -> rusqlite::Result<ProfileEnvVar> {
    Ok(ProfileEnvVar {
        id: row.get(0)?,
        profile_id: row.get(1)?,
        key: row.get(2)?,
        ciphertext: row.get(3)?,
        var_type: row.get(4)?,
    })
}

const PROFILE_COLUMNS: &str = "id, name, description, created_at, updated_at";
const ENV_VAR_COLUMNS: &str = "id, profile_id, key, value, var_type";

/// Profile names: letters, digits, `_`, `-`, `.`
pub fn validate_profile_name(name: &str) -> Result<()> {
    let ok = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if ok {
        Ok(())
    } else {
        Err(CoreError::InvalidName(name.to_owned()))
    }
}

/// Variable keys must be usable as shell identifiers
pub fn validate_env_key(key: &str) -> Result<()> {
    let mut chars = key.chars();
    let ok = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };
    if ok {
        Ok(())
    } else {
        Err(CoreError::InvalidName(key.to_owned()))
    }
}

pub fn create_profile(conn: &Connection, name: &str, description: Option<&str>) -> Result<Profile> {
    validate_profile_name(name)?;
    if find_profile(conn, name)?.is_some() {
        return Err(CoreError::ProfileExists(name.to_owned()));
    }

    let now = Utc::now();
    conn.execute(
        "INSERT INTO profiles (name, description, created_at, updated_at) VALUES (?1, ?2, ?3, ?3)",
        params![name, description, now],
    )?;
    info!(profile = name, "profile created");

    Ok(Profile {
        id: conn.last_insert_rowid(),
        name: name.to_owned(),
        description: description.map(str::to_owned),
        created_at: now,
        updated_at: now,
    })
}

pub fn find_profile(conn: &Connection, name: &str) -> Result<Option<Profile>> {
    let profile = conn
        .query_row(
            &format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE name = ?1"),
            [name],
            profile_from_row,
        )
        .optional()?;
    Ok(profile)
}

pub fn require_profile(conn: &Connection, name: &str) -> Result<Profile> {
    find_profile(conn, name)?.ok_or_else(|| CoreError::ProfileNotFound(name.to_owned()))
}

pub fn list_profiles(conn: &Connection) -> Result<Vec<Profile>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PROFILE_COLUMNS} FROM profiles ORDER BY name"
    ))?;
    let profiles = stmt
        .query_map([], profile_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(profiles)
}

/// Delete a profile; its variables go with it (ON DELETE CASCADE)
pub fn delete_profile(conn: &Connection, name: &str) -> Result<bool> {
    let removed = conn.execute("DELETE FROM profiles WHERE name = ?1", [name])?;
    if removed > 0 {
        info!(profile = name, "profile deleted");
    }
    Ok(removed > 0)
}

/// Encrypt `value` and insert or replace `key` on `profile`
pub fn set_env_var(
    conn: &Connection,
    verified: &VerifiedPassword,
    profile: &Profile,
    key: &str,
    value: &str,
    var_type: VarType,
) -> Result<()> {
    validate_env_key(key)?;
    if value.is_empty() {
        return Err(CoreError::EmptyValue(key.to_owned()));
    }
    let ciphertext = crypto::encrypt_str(value, verified.password())?;

    let tx = conn.unchecked_transaction()?;
    tx.execute(
        r#"
        INSERT INTO profile_env_vars (profile_id, key, value, var_type)
        VALUES (?1, ?2, ?3, ?4)
        ON CONFLICT(profile_id, key) DO UPDATE SET
            value    = excluded.value,
            var_type = excluded.var_type
        "#,
        params![profile.id, key, ciphertext, var_type],
    )?;
    tx.execute(
        "UPDATE profiles SET updated_at = ?1 WHERE id = ?2",
        params![Utc::now(), profile.id],
    )?;
    tx.commit()?;

    debug!(profile = %profile.name, key, %var_type, "env var stored");
    Ok(())
}

pub fn env_vars(conn: &Connection, profile_id: i64) -> Result<Vec<ProfileEnvVar>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {ENV_VAR_COLUMNS} FROM profile_env_vars WHERE profile_id = ?1 ORDER BY key"
    ))?;
    let vars = stmt
        .query_map([profile_id], env_var_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(vars)
}

pub fn env_var(conn: &Connection, profile_id: i64, key: &str) -> Result<Option<ProfileEnvVar>> {
    let var = conn
        .query_row(
            &format!(
                "SELECT {ENV_VAR_COLUMNS} FROM profile_env_vars WHERE profile_id = ?1 AND key = ?2"
            ),
            params![profile_id, key],
            env_var_from_row,
        )
        .optional()?;
    Ok(var)
}

/// Every stored variable across all profiles
pub fn all_env_vars(conn: &Connection) -> Result<Vec<ProfileEnvVar>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {ENV_VAR_COLUMNS} FROM profile_env_vars ORDER BY id"
    ))?;
    let vars = stmt
        .query_map([], env_var_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(vars)
}

/// Decrypt one variable's value
pub fn reveal(var: &ProfileEnvVar, verified: &VerifiedPassword) -> Result<String> {
    Ok(crypto::decrypt_str(&var.ciphertext, verified.password())?)
}

pub fn count_profiles(conn: &Connection) -> Result<u64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM profiles", [], |row| row.get(0))?;
    Ok(count as u64)
}

pub fn count_env_vars(conn: &Connection) -> Result<u64> {
    let count: i64 =
        conn.query_row("SELECT COUNT(*) FROM profile_env_vars", [], |row| row.get(0))?;
    Ok(count as u64)
}

/// One randomly chosen variable, used as a decryptability health probe
pub fn sample_env_var(conn: &Connection) -> Result<Option<ProfileEnvVar>> {
    let var = conn
        .query_row(
            &format!("SELECT {ENV_VAR_COLUMNS} FROM profile_env_vars ORDER BY RANDOM() LIMIT 1"),
            [],
            env_var_from_row,
        )
        .optional()?;
    Ok(var)
}

/// Remove every profile and variable; returns the number of profiles removed
pub fn wipe_all(conn: &Connection) -> Result<usize> {
    let tx = conn.unchecked_transaction()?;
    tx.execute("DELETE FROM profile_env_vars", [])?;
    let removed = tx.execute("DELETE FROM profiles", [])?;
    tx.commit()?;
    info!(removed, "all profiles wiped");
    Ok(removed)
}
