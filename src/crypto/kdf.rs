use argon2::{Algorithm, Argon2, Params, Version};
use hmac::Hmac;
use pbkdf2::pbkdf2;
use sha2::Sha256;
use zeroize::Zeroizing;

use super::{KEY_LEN, SALT_LEN};
use crate::error::{Error, Result};

/// Argon2id passes over memory.
pub const ARGON2_TIME_COST: u32 = 1;
/// Argon2id memory in KiB (64 MiB).
pub const ARGON2_MEM_COST_KIB: u32 = 64 * 1024;
/// Argon2id lanes.
pub const ARGON2_PARALLELISM: u32 = 4;
/// PBKDF2-HMAC-SHA256 iterations of the legacy derivation.
pub const PBKDF2_ROUNDS: u32 = 8192;

/// Password-based key derivation algorithms.
///
/// Parameters are fixed per variant. They are part of what an algorithm id
/// means on the wire and never vary per call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kdf {
    /// Argon2id v1.3, t=1, m=64 MiB, p=4.
    Argon2id,
    /// PBKDF2-HMAC-SHA256 with 8192 rounds. Only reachable when opening
    /// blobs written by older versions of the format.
    Pbkdf2Sha256,
}

impl Kdf {
    pub fn name(&self) -> &'static str {
        match self {
            Kdf::Argon2id => "argon2id",
            Kdf::Pbkdf2Sha256 => "pbkdf2-sha256",
        }
    }
}

pub fn derive_key(
    password: &[u8],
    salt: &[u8; SALT_LEN],
    kdf: Kdf,
) -> Result<Zeroizing<[u8; KEY_LEN]>> {
    let mut key = Zeroizing::new([0u8; KEY_LEN]);

    match kdf {
        Kdf::Argon2id => {
            let params = Params::new(
                ARGON2_MEM_COST_KIB,
                ARGON2_TIME_COST,
                ARGON2_PARALLELISM,
                Some(KEY_LEN),
            )
            .map_err(|e| Error::KeyDerivation(format!("invalid argon2 params: {e}")))?;

            Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
                .hash_password_into(password, salt, key.as_mut_slice())
                .map_err(|e| Error::KeyDerivation(format!("argon2: {e}")))?;
        }
        Kdf::Pbkdf2Sha256 => {
            pbkdf2::<Hmac<Sha256>>(password, salt, PBKDF2_ROUNDS, key.as_mut_slice())
                .map_err(|e| Error::KeyDerivation(format!("pbkdf2: {e}")))?;
        }
    }

    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argon2_is_deterministic() {
        let salt = [42u8; SALT_LEN];

        let k1 = derive_key(b"password", &salt, Kdf::Argon2id).unwrap();
        let k2 = derive_key(b"password", &salt, Kdf::Argon2id).unwrap();

        assert_eq!(*k1, *k2);
    }

    #[test]
    fn pbkdf2_is_deterministic() {
        let salt = [42u8; SALT_LEN];

        let k1 = derive_key(b"password", &salt, Kdf::Pbkdf2Sha256).unwrap();
        let k2 = derive_key(b"password", &salt, Kdf::Pbkdf2Sha256).unwrap();

        assert_eq!(*k1, *k2);
    }

    #[test]
    fn algorithms_yield_different_keys() {
        let salt = [7u8; SALT_LEN];

        let argon = derive_key(b"pw", &salt, Kdf::Argon2id).unwrap();
        let pbkdf = derive_key(b"pw", &salt, Kdf::Pbkdf2Sha256).unwrap();

        assert_ne!(*argon, *pbkdf);
    }

    #[test]
    fn salt_affects_output() {
        let k1 = derive_key(b"pw", &[1u8; SALT_LEN], Kdf::Pbkdf2Sha256).unwrap();
        let k2 = derive_key(b"pw", &[2u8; SALT_LEN], Kdf::Pbkdf2Sha256).unwrap();

        assert_ne!(*k1, *k2);
    }

    #[test]
    fn password_affects_output() {
        let salt = [3u8; SALT_LEN];

        let k1 = derive_key(b"correct horse", &salt, Kdf::Argon2id).unwrap();
        let k2 = derive_key(b"wrong password", &salt, Kdf::Argon2id).unwrap();

        assert_ne!(*k1, *k2);
    }

    #[test]
    fn empty_password_is_accepted() {
        let salt = [9u8; SALT_LEN];
        assert!(derive_key(b"", &salt, Kdf::Argon2id).is_ok());
        assert!(derive_key(b"", &salt, Kdf::Pbkdf2Sha256).is_ok());
    }

    #[test]
    fn argon2_parameters_match_format() {
        let params = Params::new(
            ARGON2_MEM_COST_KIB,
            ARGON2_TIME_COST,
            ARGON2_PARALLELISM,
            Some(KEY_LEN),
        )
        .unwrap();

        assert_eq!(params.m_cost(), 65536);
        assert_eq!(params.t_cost(), 1);
        assert_eq!(params.p_cost(), 4);
        assert_eq!(params.output_len(), Some(32));
    }
}
