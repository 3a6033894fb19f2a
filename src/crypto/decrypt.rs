// src/crypto/decrypt.rs
use aes::Aes256;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use cbc::cipher::generic_array::GenericArray;
use cbc::cipher::{block_padding::Pkcs7, BlockDecryptMut, KeyIvInit};

use super::kdf::derive_key_iv;
use crate::aliases::MasterPassword;
use crate::consts::{OPENSSL_MAGIC, OPENSSL_SALT_LEN};
use crate::error::CipherError;

type Aes256CbcDec = cbc::Decryptor<Aes256>;

const BLOCK_LEN: usize = 16;

/// Decrypt OpenSSL salted base64 text → plaintext bytes
///
/// CBC cannot authenticate: a wrong key usually fails the PKCS#7 check, but not always.
/// Callers that need certainty must check the shape of the result (see `decrypt_str`).
pub fn decrypt_from_base64(text: &str, password: &MasterPassword) -> Result<Vec<u8>, CipherError> {
    let compact: String = text.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let blob = STANDARD
        .decode(compact.as_bytes())
        .map_err(|_| CipherError::WrongPasswordOrCorrupt)?;

    let header_len = OPENSSL_MAGIC.len() + OPENSSL_SALT_LEN;
    if blob.len() <= header_len || !blob.starts_with(OPENSSL_MAGIC) {
        return Err(CipherError::WrongPasswordOrCorrupt);
    }
    let (salt, body) = blob[OPENSSL_MAGIC.len()..].split_at(OPENSSL_SALT_LEN);
    if body.len() % BLOCK_LEN != 0 {
        return Err(CipherError::WrongPasswordOrCorrupt);
    }

    let derived = derive_key_iv(password.expose_secret().as_bytes(), salt);
    Aes256CbcDec::new(
        GenericArray::from_slice(derived.key.as_slice()),
        GenericArray::from_slice(derived.iv.as_slice()),
    )
    .decrypt_padded_vec_mut::<Pkcs7>(body)
    .map_err(|_| CipherError::WrongPasswordOrCorrupt)
}

/// Decrypt and require valid UTF-8
pub fn decrypt_str(text: &str, password: &MasterPassword) -> Result<String, CipherError> {
    let bytes = decrypt_from_base64(text, password)?;
    String::from_utf8(bytes).map_err(|_| CipherError::WrongPasswordOrCorrupt)
}
