// src/db/vault_db_conn.rs
//! Relational store connection + schema
//!
//! One row of `auth` (primary key pinned to 1) holds the CredentialRecord; profiles and
//! their encrypted environment variables live in two further tables.

use std::{fs, path::Path, time::Duration};

use rusqlite::Connection;
use tracing::debug;

use crate::error::Result;

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS auth (
        id                 INTEGER PRIMARY KEY CHECK (id = 1),
        password_hash      TEXT NOT NULL,
        encrypted_sentinel TEXT NOT NULL,
        salt               TEXT NOT NULL,
        checksum           TEXT NOT NULL,
        created_at         TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS profiles (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        name        TEXT NOT NULL UNIQUE,
        description TEXT,
        created_at  TEXT NOT NULL,
        updated_at  TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS profile_env_vars (
        id         INTEGER PRIMARY KEY AUTOINCREMENT,
        profile_id INTEGER NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
        key        TEXT NOT NULL,
        value      TEXT NOT NULL,
        var_type   TEXT NOT NULL DEFAULT 'other'
                   CHECK (var_type IN ('api_key', 'base_url', 'other')),
        UNIQUE (profile_id, key)
    );

    CREATE INDEX IF NOT EXISTS idx_env_vars_profile ON profile_env_vars(profile_id);
"#;

/// Open (creating if needed) the vault database at `db_path`
pub fn open_vault_db(db_path: &Path) -> Result<Connection> {
    if let Some(parent) = db_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let conn = Connection::open(db_path)?;
    conn.busy_timeout(Duration::from_secs(5))?;
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.execute_batch(SCHEMA)?;

    debug!(path = %db_path.display(), "opened vault database");
    Ok(conn)
}

/// In-memory database with the same schema
pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.execute_batch(SCHEMA)?;
    Ok(conn)
}
