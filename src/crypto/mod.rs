// src/crypto/mod.rs
//! Cipher Service: pure cryptographic operations, no I/O, no database
//!
//! Ciphertexts are the text produced by
//! `openssl enc -aes-256-cbc -salt -pbkdf2 -iter 100000 -base64`, so values written by
//! earlier shell-based versions of the tool stay readable and vice versa.
mod decrypt;
mod encrypt;
pub mod kdf;

pub use decrypt::{decrypt_from_base64, decrypt_str};
pub use encrypt::{encrypt_str, encrypt_to_base64};
