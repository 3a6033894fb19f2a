// src/rotate.rs
//! Master-password change: re-encrypt every stored value and replace the credential record
//!
//! All or nothing. The work happens under the vault lock inside one transaction, and any
//! value that fails to decrypt rolls the whole change back.

use rusqlite::params;
use tracing::{info, warn};
use zeroize::Zeroizing;

use crate::aliases::MasterPassword;
use crate::auth::{validate_password, VerifiedPassword};
use crate::credential::{self, CredentialRecord};
use crate::crypto;
use crate::error::{AuthError, CoreError};
use crate::profiles;
use crate::vault::Vault;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationSummary {
    pub re_encrypted: usize,
}

/// Switch the vault to `new_password`, consuming the proof for the old one
pub fn change_master_password(
    vault: &Vault,
    verified: VerifiedPassword,
    new_password: MasterPassword,
) -> Result<(RotationSummary, VerifiedPassword), AuthError> {
    validate_password(new_password.expose_secret())?;
    let _lock = vault.lock()?;
    let tx = vault
        .conn()
        .unchecked_transaction()
        .map_err(CoreError::from)?;

    let vars = profiles::all_env_vars(&tx)?;
    for var in &vars {
        let plaintext = match crypto::decrypt_str(&var.ciphertext, verified.password()) {
            Ok(value) => Zeroizing::new(value),
            Err(_) => {
                warn!(key = %var.key, profile_id = var.profile_id, "value unreadable, password change aborted");
                return Err(AuthError::PayloadCorrupt);
            }
        };
        let ciphertext = crypto::encrypt_str(&plaintext, &new_password).map_err(CoreError::from)?;
        tx.execute(
            "UPDATE profile_env_vars SET value = ?1 WHERE id = ?2",
            params![ciphertext, var.id],
        )
        .map_err(CoreError::from)?;
    }

    let record = CredentialRecord::generate(&new_password)?;
    credential::store(&tx, &record)?;
    tx.commit().map_err(CoreError::from)?;

    let summary = RotationSummary {
        re_encrypted: vars.len(),
    };
    info!(re_encrypted = summary.re_encrypted, "master password changed");
    Ok((summary, VerifiedPassword::new(new_password, None)))
}
