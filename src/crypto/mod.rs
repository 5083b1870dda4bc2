//! Cryptographic primitives behind the sealed format.
//!
//! Provides key derivation, AEAD backends and the fragment stream.

pub mod aead;
pub mod kdf;
pub mod stream;

pub use aead::{Cipher, CipherPreference, FragmentCipher, has_native_aes};
pub use kdf::{Kdf, derive_key};
pub use stream::{OpenReader, SealWriter};

use crate::error::{Error, Result};
use getrandom::fill;

/// Length of the salt (32 bytes).
pub const SALT_LEN: usize = 32;
/// Length of the stream nonce carried in the header (8 bytes).
pub const NONCE_LEN: usize = AEAD_NONCE_LEN - SEQ_LEN;
/// Length of the derived key (32 bytes / 256 bits).
pub const KEY_LEN: usize = 32;
/// Length of the per-fragment AEAD nonce (12 bytes for both ciphers).
pub const AEAD_NONCE_LEN: usize = 12;
/// Length of the fragment sequence number appended to the stream nonce.
pub const SEQ_LEN: usize = 4;
/// Length of the authentication tag (16 bytes for both ciphers).
pub const TAG_LEN: usize = 16;

/// Fill buffer with cryptographically secure random bytes
fn secure_random(buf: &mut [u8]) -> Result<()> {
    fill(buf).map_err(|_| Error::Randomness)
}

/// Generate salt
pub fn generate_salt() -> Result<[u8; SALT_LEN]> {
    let mut salt = [0u8; SALT_LEN];
    secure_random(&mut salt)?;
    Ok(salt)
}

/// Generate stream nonce
pub fn generate_nonce() -> Result<[u8; NONCE_LEN]> {
    let mut nonce = [0u8; NONCE_LEN];
    secure_random(&mut nonce)?;
    Ok(nonce)
}
