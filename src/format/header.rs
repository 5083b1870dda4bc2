use std::io::{self, Read};

use super::Suite;
use crate::crypto::{NONCE_LEN, SALT_LEN};
use crate::error::{Error, Result};

const ID_LEN: usize = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    salt: [u8; SALT_LEN],
    suite: Suite,
    nonce: [u8; NONCE_LEN],
}

impl Header {
    pub const LEN: usize = SALT_LEN + ID_LEN + NONCE_LEN;

    pub fn new(salt: [u8; SALT_LEN], suite: Suite, nonce: [u8; NONCE_LEN]) -> Self {
        Self { salt, suite, nonce }
    }

    pub fn salt(&self) -> &[u8; SALT_LEN] {
        &self.salt
    }

    pub fn suite(&self) -> Suite {
        self.suite
    }

    pub fn nonce(&self) -> &[u8; NONCE_LEN] {
        &self.nonce
    }

    pub fn to_bytes(&self) -> [u8; Self::LEN] {
        let mut buf = [0u8; Self::LEN];
        buf[..SALT_LEN].copy_from_slice(&self.salt);
        buf[SALT_LEN] = self.suite.id();
        buf[SALT_LEN + ID_LEN..].copy_from_slice(&self.nonce);
        buf
    }

    /// Reads exactly one header from `reader`, leaving it positioned at the
    /// start of the fragment stream.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The input ends before the salt, id or nonce is complete
    /// - The algorithm id is not recognized
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let mut salt = [0u8; SALT_LEN];
        read_field(reader, &mut salt, "input likely truncated while reading salt")?;

        let mut id = [0u8; ID_LEN];
        read_field(reader, &mut id, "input likely truncated while reading algorithm id")?;
        let suite = Suite::try_from(id[0])?;

        let mut nonce = [0u8; NONCE_LEN];
        read_field(reader, &mut nonce, "input likely truncated while reading nonce")?;

        Ok(Self { salt, suite, nonce })
    }
}

fn read_field<R: Read>(reader: &mut R, buf: &mut [u8], what: &'static str) -> Result<()> {
    reader.read_exact(buf).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => Error::MalformedInput(what),
        _ => Error::Io(e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Header {
        Header::new([1u8; SALT_LEN], Suite::Argon2idChaCha20Poly1305, [2u8; NONCE_LEN])
    }

    #[test]
    fn header_roundtrip() {
        let header = sample();
        let bytes = header.to_bytes();

        let mut reader = &bytes[..];
        let parsed = Header::read_from(&mut reader).unwrap();

        assert_eq!(parsed, header);
        assert!(reader.is_empty());
    }

    #[test]
    fn header_layout_is_salt_id_nonce() {
        let bytes = sample().to_bytes();

        assert_eq!(Header::LEN, 41);
        assert_eq!(&bytes[..32], &[1u8; 32]);
        assert_eq!(bytes[32], 0x01);
        assert_eq!(&bytes[33..], &[2u8; 8]);
    }

    #[test]
    fn reader_stops_at_payload() {
        let mut data = sample().to_bytes().to_vec();
        data.extend_from_slice(b"payload");

        let mut reader = &data[..];
        Header::read_from(&mut reader).unwrap();
        assert_eq!(reader, b"payload");
    }

    #[test]
    fn header_too_short_fails() {
        let bytes = sample().to_bytes();

        for len in [0, 10, SALT_LEN, SALT_LEN + 1, Header::LEN - 1] {
            let mut reader = &bytes[..len];
            let err = Header::read_from(&mut reader).unwrap_err();
            assert!(matches!(err, Error::MalformedInput(_)), "len {len}");
        }
    }

    #[test]
    fn header_unsupported_id_fails() {
        let mut bytes = sample().to_bytes();
        bytes[SALT_LEN] = 0x03;

        let err = Header::read_from(&mut &bytes[..]).unwrap_err();
        assert!(matches!(err, Error::UnsupportedAlgorithm(0x03)));
    }
}
