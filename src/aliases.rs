// src/aliases.rs
//! Re-exports secure-gate's ergonomic secret types
//!
//! These are the canonical secret types used throughout profile-vault.

pub use secure_gate::dynamic_alias;

// Zeroized on drop, redacted in Debug
dynamic_alias!(MasterPassword, String);
