// src/export/env.rs
//! `export KEY='value'` lines for `eval "$(pvault export <profile>)"`

use crate::auth::VerifiedPassword;
use crate::error::Result;
use crate::profiles::{self, Profile};
use crate::vault::Vault;

/// Render every variable of `profile` as a POSIX shell `export` line
pub fn render(vault: &Vault, verified: &VerifiedPassword, profile: &Profile) -> Result<String> {
    let mut out = String::new();
    for var in profiles::env_vars(vault.conn(), profile.id)? {
        let value = profiles::reveal(&var, verified)?;
        out.push_str(&format!("export {}={}\n", var.key, shell_quote(&value)));
    }
    Ok(out)
}

/// Single-quote `value`; embedded quotes become `'\''`
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}
