// src/crypto/encrypt.rs
use aes::Aes256;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use cbc::cipher::generic_array::GenericArray;
use cbc::cipher::{block_padding::Pkcs7, BlockEncryptMut, KeyIvInit};

use super::kdf::derive_key_iv;
use crate::aliases::MasterPassword;
use crate::consts::{BASE64_LINE_WIDTH, MAX_PLAINTEXT_LEN, OPENSSL_MAGIC, OPENSSL_SALT_LEN};
use crate::error::CipherError;

type Aes256CbcEnc = cbc::Encryptor<Aes256>;

/// Encrypt plaintext → `openssl enc -aes-256-cbc -salt -pbkdf2 -iter 100000 -base64` text
///
/// A fresh 8-byte salt is drawn for every call, so equal inputs never produce equal output.
pub fn encrypt_to_base64(
    plaintext: &[u8],
    password: &MasterPassword,
) -> Result<String, CipherError> {
    if plaintext.len() > MAX_PLAINTEXT_LEN {
        return Err(CipherError::PlaintextTooLarge {
            len: plaintext.len(),
            max: MAX_PLAINTEXT_LEN,
        });
    }
    let salt: [u8; OPENSSL_SALT_LEN] = rand::random();
    Ok(seal(
        plaintext,
        password.expose_secret().as_bytes(),
        &salt,
    ))
}

/// Encrypt a UTF-8 string
pub fn encrypt_str(plaintext: &str, password: &MasterPassword) -> Result<String, CipherError> {
    encrypt_to_base64(plaintext.as_bytes(), password)
}

pub(crate) fn seal(plaintext: &[u8], password: &[u8], salt: &[u8; OPENSSL_SALT_LEN]) -> String {
    let derived = derive_key_iv(password, salt);
    let body = Aes256CbcEnc::new(
        GenericArray::from_slice(derived.key.as_slice()),
        GenericArray::from_slice(derived.iv.as_slice()),
    )
    .encrypt_padded_vec_mut::<Pkcs7>(plaintext);

    let mut blob = Vec::with_capacity(OPENSSL_MAGIC.len() + salt.len() + body.len());
    blob.extend_from_slice(OPENSSL_MAGIC);
    blob.extend_from_slice(salt);
    blob.extend_from_slice(&body);

    wrap_lines(&STANDARD.encode(blob))
}

/// Break base64 into 64-column lines like `openssl enc -base64` (no trailing newline)
fn wrap_lines(encoded: &str) -> String {
    let mut out = String::with_capacity(encoded.len() + encoded.len() / BASE64_LINE_WIDTH);
    for (i, ch) in encoded.chars().enumerate() {
        if i > 0 && i % BASE64_LINE_WIDTH == 0 {
            out.push('\n');
        }
        out.push(ch);
    }
    out
}
