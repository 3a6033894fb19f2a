// src/export/mod.rs
//! Export utilities for profile-vault
//!
//! Both formats carry decrypted values in plaintext. Callers must say so loudly.

pub use env::render as render_env;
pub use json::export_profile_json;

pub mod env;
pub mod json;
