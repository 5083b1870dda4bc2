use aes_gcm::Aes256Gcm;
use aes_gcm::aead::consts::{U12, U16};
use aes_gcm::aead::{AeadInPlace, KeyInit, Nonce};
use chacha20poly1305::ChaCha20Poly1305;

use super::{AEAD_NONCE_LEN, KEY_LEN};
use crate::error::{Error, Result};

/// Seal/open of a single stream fragment, in place.
///
/// On success `seal_fragment` leaves `ciphertext || tag` in `buf` and
/// `open_fragment` leaves the plaintext. On failure `buf` is unspecified
/// and must not be used.
pub trait FragmentCipher {
    fn seal_fragment(&self, nonce: &[u8; AEAD_NONCE_LEN], ad: &[u8], buf: &mut Vec<u8>)
    -> Result<()>;

    fn open_fragment(&self, nonce: &[u8; AEAD_NONCE_LEN], ad: &[u8], buf: &mut Vec<u8>)
    -> Result<()>;
}

impl<A> FragmentCipher for A
where
    A: AeadInPlace<NonceSize = U12, TagSize = U16>,
{
    fn seal_fragment(
        &self,
        nonce: &[u8; AEAD_NONCE_LEN],
        ad: &[u8],
        buf: &mut Vec<u8>,
    ) -> Result<()> {
        self.encrypt_in_place(Nonce::<A>::from_slice(nonce), ad, buf)
            .map_err(|_| Error::Encryption)
    }

    fn open_fragment(
        &self,
        nonce: &[u8; AEAD_NONCE_LEN],
        ad: &[u8],
        buf: &mut Vec<u8>,
    ) -> Result<()> {
        self.decrypt_in_place(Nonce::<A>::from_slice(nonce), ad, buf)
            .map_err(|_| Error::AuthenticationFailure)
    }
}

/// AEAD constructions usable for the fragment stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cipher {
    Aes256Gcm,
    ChaCha20Poly1305,
}

impl Cipher {
    pub fn name(&self) -> &'static str {
        match self {
            Cipher::Aes256Gcm => "aes-256-gcm",
            Cipher::ChaCha20Poly1305 => "chacha20-poly1305",
        }
    }

    /// Builds the backend for this cipher under `key`.
    pub fn keyed(&self, key: &[u8; KEY_LEN]) -> Result<Box<dyn FragmentCipher>> {
        match self {
            Cipher::Aes256Gcm => {
                let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| Error::CipherInit)?;
                Ok(Box::new(cipher))
            }
            Cipher::ChaCha20Poly1305 => {
                let cipher =
                    ChaCha20Poly1305::new_from_slice(key).map_err(|_| Error::CipherInit)?;
                Ok(Box::new(cipher))
            }
        }
    }
}

/// Which cipher new blobs should use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CipherPreference {
    /// AES-256-GCM when the CPU accelerates it, ChaCha20-Poly1305 otherwise.
    #[default]
    Auto,
    Aes256Gcm,
    ChaCha20Poly1305,
}

impl CipherPreference {
    pub fn resolve(self) -> Cipher {
        match self {
            CipherPreference::Auto if has_native_aes() => Cipher::Aes256Gcm,
            CipherPreference::Auto => Cipher::ChaCha20Poly1305,
            CipherPreference::Aes256Gcm => Cipher::Aes256Gcm,
            CipherPreference::ChaCha20Poly1305 => Cipher::ChaCha20Poly1305,
        }
    }
}

/// Reports whether this CPU has hardware AES and carry-less multiply,
/// the pair AES-GCM needs to run fast and in constant time.
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
pub fn has_native_aes() -> bool {
    std::arch::is_x86_feature_detected!("aes") && std::arch::is_x86_feature_detected!("pclmulqdq")
}

/// Reports whether this CPU has hardware AES and carry-less multiply,
/// the pair AES-GCM needs to run fast and in constant time.
#[cfg(target_arch = "aarch64")]
pub fn has_native_aes() -> bool {
    std::arch::is_aarch64_feature_detected!("aes")
        && std::arch::is_aarch64_feature_detected!("pmull")
}

#[cfg(not(any(target_arch = "x86", target_arch = "x86_64", target_arch = "aarch64")))]
pub fn has_native_aes() -> bool {
    false
}
