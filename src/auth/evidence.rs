// src/auth/evidence.rs
//! The two independent integrity signals for one candidate password

use rusqlite::Connection;
use tracing::debug;

use crate::aliases::MasterPassword;
use crate::credential::{self, CredentialCheck};
use crate::crypto;
use crate::error::Result;
use crate::profiles::{self, ProfileEnvVar};

/// What a sampled profile value says about a candidate password
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileCheck {
    /// No stored values; the signal is uninformative
    NoProfiles,
    Decrypts,
    Undecryptable,
}

impl ProfileCheck {
    pub fn is_ok(self) -> bool {
        matches!(self, ProfileCheck::NoProfiles | ProfileCheck::Decrypts)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evidence {
    pub credential: CredentialCheck,
    pub profiles: ProfileCheck,
}

impl Evidence {
    pub fn new(credential: CredentialCheck, profiles: ProfileCheck) -> Self {
        Self {
            credential,
            profiles,
        }
    }

    pub fn authenticated(&self) -> bool {
        self.credential.is_valid() && self.profiles.is_ok()
    }
}

/// Test `password` against the credential record and the stored profile data
///
/// One random value is enough to back up a valid record. When the record does not accept
/// the password, every value must decrypt before the profile data may vouch for it.
pub fn gather(conn: &Connection, password: &MasterPassword) -> Result<Evidence> {
    let credential = match credential::load(conn)? {
        Some(record) => record.check(password),
        None => CredentialCheck::Missing,
    };

    let profiles = if credential.is_valid() {
        check_sampled_profile(conn, password)?
    } else {
        check_all_profiles(conn, password)?
    };

    let evidence = Evidence::new(credential, profiles);
    if !evidence.authenticated() {
        debug!(credential = ?credential, profiles = ?profiles, "verification attempt failed");
    }
    Ok(evidence)
}

fn check_sampled_profile(conn: &Connection, password: &MasterPassword) -> Result<ProfileCheck> {
    Ok(match profiles::sample_env_var(conn)? {
        None => ProfileCheck::NoProfiles,
        Some(var) if decrypts(&var, password) => ProfileCheck::Decrypts,
        Some(_) => ProfileCheck::Undecryptable,
    })
}

/// `Decrypts` only when every stored value opens under `password`
pub fn check_all_profiles(conn: &Connection, password: &MasterPassword) -> Result<ProfileCheck> {
    let vars = profiles::all_env_vars(conn)?;
    if vars.is_empty() {
        return Ok(ProfileCheck::NoProfiles);
    }
    if vars.iter().all(|var| decrypts(var, password)) {
        Ok(ProfileCheck::Decrypts)
    } else {
        Ok(ProfileCheck::Undecryptable)
    }
}

fn decrypts(var: &ProfileEnvVar, password: &MasterPassword) -> bool {
    match crypto::decrypt_str(&var.ciphertext, password) {
        Ok(value) if !value.is_empty() => true,
        _ => {
            debug!(key = %var.key, profile_id = var.profile_id, "stored value did not decrypt");
            false
        }
    }
}
