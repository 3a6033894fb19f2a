// src/vault.rs
//! Store handle: the database connection plus the advisory lock that guards writes
//!
//! Every read-modify-write of the credential record or of profile data takes the lock
//! through [`Vault::lock`]. Methods here never call each other while holding it.

use std::path::{Path, PathBuf};

use rusqlite::Connection;
use tracing::{info, warn};

use crate::aliases::MasterPassword;
use crate::auth::{evidence, validate_password, Evidence};
use crate::config::Config;
use crate::credential::{self, CredentialCheck, CredentialRecord};
use crate::db::{open_vault_db, VaultLock};
use crate::error::{CoreError, Result};
use crate::profiles;

#[derive(Debug)]
pub struct Vault {
    conn: Connection,
    lock_path: PathBuf,
}

impl Vault {
    pub fn open(config: &Config) -> Result<Self> {
        Self::open_at(&config.paths.database, &config.lock_path())
    }

    pub fn open_at(db_path: &Path, lock_path: &Path) -> Result<Self> {
        Ok(Self {
            conn: open_vault_db(db_path)?,
            lock_path: lock_path.to_path_buf(),
        })
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    pub fn lock_path(&self) -> &Path {
        &self.lock_path
    }

    /// Take the exclusive write lock, blocking until it is free
    pub fn lock(&self) -> Result<VaultLock> {
        VaultLock::acquire(&self.lock_path)
    }

    pub fn is_initialized(&self) -> Result<bool> {
        credential::exists(&self.conn)
    }

    pub fn credential(&self) -> Result<Option<CredentialRecord>> {
        credential::load(&self.conn)
    }

    /// Create the credential record for a fresh vault; refuses to replace an existing one
    pub fn init_credential(&self, password: &MasterPassword) -> Result<CredentialRecord> {
        validate_password(password.expose_secret())?;
        let _lock = self.lock()?;
        if credential::exists(&self.conn)? {
            return Err(CoreError::AlreadyInitialized);
        }
        let record = CredentialRecord::generate(password)?;
        credential::store(&self.conn, &record)?;
        info!("credential record initialized");
        Ok(record)
    }

    /// Regenerate the credential record for a password the profile data vouches for
    ///
    /// The new record is kept only if, inside the same transaction, it accepts `password`
    /// and every stored value still decrypts; otherwise the old record stays in place.
    pub(crate) fn repair_credential(&self, password: &MasterPassword) -> Result<Evidence> {
        validate_password(password.expose_secret())?;
        let _lock = self.lock()?;
        let record = CredentialRecord::generate(password)?;

        let tx = self.conn.unchecked_transaction()?;
        credential::store(&tx, &record)?;
        let stored = match credential::load(&tx)? {
            Some(stored) => stored.check(password),
            None => CredentialCheck::Missing,
        };
        let evidence = Evidence::new(stored, evidence::check_all_profiles(&tx, password)?);

        if evidence.authenticated() {
            tx.commit()?;
            info!("credential record regenerated");
        } else {
            tx.rollback()?;
            warn!(credential = ?evidence.credential, profiles = ?evidence.profiles, "credential repair rolled back");
        }
        Ok(evidence)
    }

    /// Remove every profile; the credential record is left alone
    pub(crate) fn wipe_profiles(&self) -> Result<usize> {
        let _lock = self.lock()?;
        profiles::wipe_all(&self.conn)
    }

    /// Clear the credential record and all profile data in one transaction
    pub(crate) fn reset(&self) -> Result<()> {
        let _lock = self.lock()?;
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM profile_env_vars", [])?;
        tx.execute("DELETE FROM profiles", [])?;
        tx.execute("DELETE FROM auth", [])?;
        tx.commit()?;
        info!("vault reset");
        Ok(())
    }

    /// Replace the credential record and drop every profile (`init --force`)
    ///
    /// Profiles encrypted under the previous password could never be read again.
    pub fn reinitialize(&self, password: &MasterPassword) -> Result<CredentialRecord> {
        validate_password(password.expose_secret())?;
        let _lock = self.lock()?;
        let record = CredentialRecord::generate(password)?;

        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM profile_env_vars", [])?;
        tx.execute("DELETE FROM profiles", [])?;
        credential::store(&tx, &record)?;
        tx.commit()?;

        info!("vault reinitialized");
        Ok(record)
    }
}
