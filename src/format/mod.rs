//! Wire format of sealed blobs.
//!
//! ```text
//! SALT (32) | ALGORITHM ID (1) | NONCE (8) | FRAGMENT STREAM
//! ```
//! The algorithm id fixes both the key derivation and the cipher; the
//! header carries no other parameters.

use std::fmt;

use crate::crypto::{Cipher, CipherPreference, Kdf};
use crate::error::Error;

pub mod header;

pub use header::Header;

/// Algorithm id of [`Suite::Argon2idAes256Gcm`].
pub const ARGON2ID_AES256GCM: u8 = 0x00;
/// Algorithm id of [`Suite::Argon2idChaCha20Poly1305`].
pub const ARGON2ID_CHACHA20POLY1305: u8 = 0x01;
/// Algorithm id of [`Suite::Pbkdf2Aes256Gcm`].
pub const PBKDF2_AES256GCM: u8 = 0x02;

/// Key derivation and cipher pair named by the algorithm id byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Suite {
    Argon2idAes256Gcm,
    Argon2idChaCha20Poly1305,
    /// Decode-only. Written by older versions of the format; new blobs
    /// never use it.
    Pbkdf2Aes256Gcm,
}

impl Suite {
    /// Selects the suite for a new blob.
    ///
    /// Only ever returns an encode-eligible suite.
    pub fn for_encryption(preference: CipherPreference) -> Self {
        match preference.resolve() {
            Cipher::Aes256Gcm => Suite::Argon2idAes256Gcm,
            Cipher::ChaCha20Poly1305 => Suite::Argon2idChaCha20Poly1305,
        }
    }

    pub fn id(&self) -> u8 {
        match self {
            Suite::Argon2idAes256Gcm => ARGON2ID_AES256GCM,
            Suite::Argon2idChaCha20Poly1305 => ARGON2ID_CHACHA20POLY1305,
            Suite::Pbkdf2Aes256Gcm => PBKDF2_AES256GCM,
        }
    }

    pub fn kdf(&self) -> Kdf {
        match self {
            Suite::Argon2idAes256Gcm | Suite::Argon2idChaCha20Poly1305 => Kdf::Argon2id,
            Suite::Pbkdf2Aes256Gcm => Kdf::Pbkdf2Sha256,
        }
    }

    pub fn cipher(&self) -> Cipher {
        match self {
            Suite::Argon2idAes256Gcm | Suite::Pbkdf2Aes256Gcm => Cipher::Aes256Gcm,
            Suite::Argon2idChaCha20Poly1305 => Cipher::ChaCha20Poly1305,
        }
    }

    pub fn is_decode_only(&self) -> bool {
        matches!(self, Suite::Pbkdf2Aes256Gcm)
    }
}

impl TryFrom<u8> for Suite {
    type Error = Error;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        match id {
            ARGON2ID_AES256GCM => Ok(Suite::Argon2idAes256Gcm),
            ARGON2ID_CHACHA20POLY1305 => Ok(Suite::Argon2idChaCha20Poly1305),
            PBKDF2_AES256GCM => Ok(Suite::Pbkdf2Aes256Gcm),
            other => Err(Error::UnsupportedAlgorithm(other)),
        }
    }
}

impl fmt::Display for Suite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}+{}", self.kdf().name(), self.cipher().name())
    }
}
