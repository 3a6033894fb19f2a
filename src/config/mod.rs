// src/config/mod.rs
//! Configuration system for profile-vault
//!
//! TOML file + env overrides, loaded once by the binary and passed down explicitly.

pub use app::{load, load_with, Config, Paths, Security};
pub use app::{CONFIG_ENV, DATABASE_ENV, SESSION_FILE_ENV};

mod app;
mod defaults;
