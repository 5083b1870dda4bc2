//! Base64 text transport for sealed blobs.
//!
//! Hosts that can only move strings encode blobs as standard, padded
//! base64. Malformed text is rejected with [`Error::Encoding`] before any
//! decryption is attempted.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use zeroize::Zeroizing;

use crate::error::{Error, Result};

pub fn encode(blob: &[u8]) -> String {
    STANDARD.encode(blob)
}

/// Decodes armored text. Surrounding whitespace is ignored.
pub fn decode(text: &str) -> Result<Vec<u8>> {
    STANDARD.decode(text.trim()).map_err(Error::from)
}

pub fn seal_to_base64(password: &str, plaintext: &[u8]) -> Result<String> {
    crate::encrypt(password, plaintext).map(|blob| encode(&blob))
}

pub fn open_from_base64(password: &str, text: &str) -> Result<Zeroizing<Vec<u8>>> {
    let blob = decode(text)?;
    crate::decrypt(password, &blob)
}

/// String adapter for hosts that signal failure with an absent value.
///
/// Every failure maps to `None`.
pub fn encrypt_text(password: &str, text: &str) -> Option<String> {
    seal_to_base64(password, text.as_bytes()).ok()
}

/// String adapter for hosts that signal failure with an absent value.
///
/// Every failure maps to `None`, including plaintext that is not UTF-8.
pub fn decrypt_text(password: &str, text: &str) -> Option<String> {
    let plaintext = open_from_base64(password, text).ok()?;
    std::str::from_utf8(&plaintext).ok().map(str::to_owned)
}
