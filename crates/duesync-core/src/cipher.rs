//! Password encryption for the LMS single-sign-on form.
//!
//! The SSO login page ships a per-session salt; the browser-side script
//! encrypts the password as AES-CBC over a filler-prefixed plaintext,
//! keyed directly by the salt bytes, and submits the base64 ciphertext.
//! The scheme must match bit-for-bit — a deviation in padding, IV, or key
//! length does not raise anything remotely, the login just silently fails.

use aes::cipher::{block_padding::Pkcs7, BlockEncryptMut, KeyIvInit};
use base64::{engine::general_purpose::STANDARD, Engine};

use crate::domain::{AdapterError, Result};

type Aes128CbcEnc = cbc::Encryptor<aes::Aes128>;
type Aes192CbcEnc = cbc::Encryptor<aes::Aes192>;
type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;

/// Fixed 4-byte filler the scheme prepends and uses for the IV.
const FILLER: &[u8; 4] = b"Nu1L";

/// Number of filler repetitions prefixed to the plaintext.
const FILLER_REPEAT: usize = 16;

/// Plaintext handed to the block cipher: filler x16, then the secret.
fn padded_plaintext(secret: &str) -> Vec<u8> {
    let mut plain = FILLER.repeat(FILLER_REPEAT);
    plain.extend_from_slice(secret.as_bytes());
    plain
}

/// IV is the filler repeated to one block.
fn iv() -> [u8; 16] {
    let mut iv = [0u8; 16];
    for (chunk, byte) in iv.chunks_mut(4).zip(std::iter::repeat(FILLER)) {
        chunk.copy_from_slice(byte);
    }
    iv
}

/// Encrypt `secret` under the server-issued `salt`, returning the base64
/// ciphertext the SSO form expects in its password field.
///
/// The salt is used directly as key bytes (no KDF); its length selects
/// AES-128/192/256. Any other length fails with
/// [`AdapterError::Cipher`] before touching the cipher.
pub fn encrypt_password(salt: &str, secret: &str) -> Result<String> {
    let key = salt.as_bytes();
    let iv = iv();
    let plain = padded_plaintext(secret);

    let ciphertext = match key.len() {
        16 => Aes128CbcEnc::new_from_slices(key, &iv)
            .map_err(|e| AdapterError::Cipher(e.to_string()))?
            .encrypt_padded_vec_mut::<Pkcs7>(&plain),
        24 => Aes192CbcEnc::new_from_slices(key, &iv)
            .map_err(|e| AdapterError::Cipher(e.to_string()))?
            .encrypt_padded_vec_mut::<Pkcs7>(&plain),
        32 => Aes256CbcEnc::new_from_slices(key, &iv)
            .map_err(|e| AdapterError::Cipher(e.to_string()))?
            .encrypt_padded_vec_mut::<Pkcs7>(&plain),
        0 => {
            return Err(AdapterError::Cipher(
                "encryption salt is missing".to_string(),
            ))
        }
        n => {
            return Err(AdapterError::Cipher(format!(
                "salt length {n} is not a valid AES key length (16/24/32)"
            )))
        }
    };

    Ok(STANDARD.encode(ciphertext))
}
