// src/export/json.rs
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde_json::json;
use tempfile::NamedTempFile;
use tracing::info;

use crate::auth::VerifiedPassword;
use crate::cleanup;
use crate::error::{CoreError, Result};
use crate::profiles::{self, Profile};
use crate::session::set_owner_only;
use crate::vault::Vault;

/// Write one profile with its decrypted variables to `path` as pretty JSON.
///
/// SECURITY WARNING: the file holds every value of the profile in cleartext.
/// It is created owner-only and appears at `path` in a single rename.
pub fn export_profile_json(
    vault: &Vault,
    verified: &VerifiedPassword,
    profile: &Profile,
    path: &Path,
) -> Result<usize> {
    let mut variables = Vec::new();
    for var in profiles::env_vars(vault.conn(), profile.id)? {
        let value = profiles::reveal(&var, verified)?;
        variables.push(json!({
            "key": var.key,
            "value": value,
            "type": var.var_type,
        }));
    }

    let count = variables.len();
    let export = json!({
        "export_format": "profile-vault-v1",
        "exported_at": Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
        "exporter_version": env!("CARGO_PKG_VERSION"),
        "warning": "THIS FILE CONTAINS SECRETS IN PLAINTEXT. ENCRYPT OR DELETE IT AFTER USE.",
        "profile": {
            "name": profile.name,
            "description": profile.description,
            "created_at": profile.created_at.to_rfc3339(),
            "updated_at": profile.updated_at.to_rfc3339(),
        },
        "total_variables": count,
        "variables": variables,
    });

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir)?;

    let mut tmp = NamedTempFile::new_in(&dir)?;
    let _queued = cleanup::queue(tmp.path());
    set_owner_only(tmp.as_file())?;
    tmp.write_all(serde_json::to_string_pretty(&export)?.as_bytes())?;
    tmp.write_all(b"\n")?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| CoreError::Io(e.error))?;

    info!(profile = %profile.name, path = %path.display(), count, "profile exported");
    Ok(count)
}
