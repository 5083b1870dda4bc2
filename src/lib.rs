//! Password-based authenticated encryption for small payloads.
//!
//! [`encrypt`] turns a password and plaintext into a self-describing blob;
//! [`decrypt`] reverses it given the same password. The blob carries its own
//! salt, algorithm id and nonce, so nothing besides the password needs to be
//! shared.

pub mod armor;
pub mod crypto;
mod error;
pub mod format;

use std::io::{Read, Write};

use log::{debug, warn};
use zeroize::Zeroizing;

pub use crate::crypto::CipherPreference;
pub use crate::error::{Error, Result};
pub use crate::format::{Header, Suite};
use crate::crypto::{NONCE_LEN, OpenReader, SALT_LEN, SealWriter};

/// Options for producing new blobs.
#[derive(Debug, Clone, Copy, Default)]
pub struct SealOptions {
    pub cipher: CipherPreference,
}

/// Encrypts `plaintext` under `password` with the default options.
pub fn encrypt(password: &str, plaintext: &[u8]) -> Result<Vec<u8>> {
    encrypt_with(password, plaintext, &SealOptions::default())
}

/// Encrypts `plaintext` under `password`.
///
/// A fresh salt and nonce are drawn for every call, so encrypting the same
/// input twice never yields the same blob.
pub fn encrypt_with(password: &str, plaintext: &[u8], options: &SealOptions) -> Result<Vec<u8>> {
    let suite = Suite::for_encryption(options.cipher);
    let salt = crypto::generate_salt()?;
    let nonce = crypto::generate_nonce()?;

    seal(password.as_bytes(), plaintext, suite, &salt, &nonce)
}

/// Encrypts with caller-chosen parameters.
///
/// This function is ONLY for producing test vectors. It accepts decode-only
/// suites and reused salts/nonces; never use it for real data.
#[doc(hidden)]
pub fn encrypt_deterministic(
    password: &str,
    plaintext: &[u8],
    suite: Suite,
    salt: &[u8; SALT_LEN],
    nonce: &[u8; NONCE_LEN],
) -> Result<Vec<u8>> {
    seal(password.as_bytes(), plaintext, suite, salt, nonce)
}

/// Exact size of the blob produced for `plaintext_len` bytes.
pub fn sealed_len(plaintext_len: usize) -> usize {
    Header::LEN + plaintext_len + crypto::stream::overhead(plaintext_len)
}

fn seal(
    password: &[u8],
    plaintext: &[u8],
    suite: Suite,
    salt: &[u8; SALT_LEN],
    nonce: &[u8; NONCE_LEN],
) -> Result<Vec<u8>> {
    debug!("sealing {} bytes with {suite}", plaintext.len());

    let key = crypto::derive_key(password, salt, suite.kdf())?;
    let cipher = suite.cipher().keyed(&key)?;
    drop(key);

    let mut out = Vec::with_capacity(sealed_len(plaintext.len()));
    out.extend_from_slice(&Header::new(*salt, suite, *nonce).to_bytes());

    let mut writer = SealWriter::new(out, cipher, nonce, &[])?;
    writer.write_all(plaintext).map_err(Error::from_io)?;
    let out = writer.finish()?;

    debug!("sealed blob is {} bytes", out.len());
    Ok(out)
}

/// Decrypts a blob produced by [`encrypt`].
///
/// Either the whole plaintext is returned or an error is; plaintext from a
/// blob that fails authentication anywhere is never exposed.
pub fn decrypt(password: &str, blob: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    decrypt_from(password, blob)
}

/// Decrypts a blob read from `reader` until end of input.
pub fn decrypt_from<R: Read>(password: &str, mut reader: R) -> Result<Zeroizing<Vec<u8>>> {
    let header = Header::read_from(&mut reader)?;
    let suite = header.suite();

    debug!("opening blob sealed with {suite}");
    if suite.is_decode_only() {
        warn!("blob uses legacy suite {suite}; re-encrypt it to upgrade");
    }

    let key = crypto::derive_key(password.as_bytes(), header.salt(), suite.kdf())?;
    let cipher = suite.cipher().keyed(&key)?;
    drop(key);

    OpenReader::new(reader, cipher, header.nonce(), &[])?.read_all()
}

/// Parses the header of `blob` without deriving a key.
pub fn inspect(blob: &[u8]) -> Result<Header> {
    Header::read_from(&mut &blob[..])
}
