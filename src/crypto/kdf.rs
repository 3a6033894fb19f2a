// src/crypto/kdf.rs
//! OpenSSL `-pbkdf2` key/IV derivation
//!
//! `openssl enc -pbkdf2` runs PBKDF2-HMAC-SHA256 once for 48 bytes and splits the
//! output into a 256-bit AES key followed by a 128-bit IV.

use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::consts::KDF_ITERATIONS;

pub const KEY_LEN: usize = 32;
pub const IV_LEN: usize = 16;

/// Derived AES-256 key + CBC IV, zeroized on drop
pub struct KeyIv {
    pub key: Zeroizing<[u8; KEY_LEN]>,
    pub iv: Zeroizing<[u8; IV_LEN]>,
}

pub fn derive_key_iv(password: &[u8], salt: &[u8]) -> KeyIv {
    let mut out = Zeroizing::new([0u8; KEY_LEN + IV_LEN]);
    pbkdf2_hmac::<Sha256>(password, salt, KDF_ITERATIONS, out.as_mut_slice());

    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    let mut iv = Zeroizing::new([0u8; IV_LEN]);
    key.copy_from_slice(&out[..KEY_LEN]);
    iv.copy_from_slice(&out[KEY_LEN..]);
    KeyIv { key, iv }
}
