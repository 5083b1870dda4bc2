use pwseal::crypto::kdf::{Kdf, derive_key};
use pwseal::crypto::stream::BUF_SIZE;
use pwseal::crypto::{Cipher, NONCE_LEN, SALT_LEN, SealWriter};
use pwseal::{CipherPreference, Error, Header, SealOptions, Suite, decrypt, encrypt, encrypt_with};
use std::io::Write;

const PASSWORD: &str = "correct horse";

fn forced(cipher: CipherPreference) -> SealOptions {
    SealOptions { cipher }
}

#[test]
fn concrete_scenario() {
    let blob = encrypt(PASSWORD, b"hello").unwrap();

    assert_eq!(blob.len(), 32 + 1 + 8 + 5 + 16);
    assert_eq!(*decrypt(PASSWORD, &blob).unwrap(), b"hello");
    assert!(matches!(
        decrypt("wrong password", &blob),
        Err(Error::AuthenticationFailure)
    ));
}

#[test]
fn roundtrip_for_both_ciphers() {
    let payloads: [&[u8]; 4] = [b"", b"{}", &[0u8; 1000], &[0xab; BUF_SIZE + 3]];

    for pref in [CipherPreference::Aes256Gcm, CipherPreference::ChaCha20Poly1305] {
        for payload in payloads {
            let blob = encrypt_with("pw", payload, &forced(pref)).unwrap();
            assert_eq!(blob.len(), pwseal::sealed_len(payload.len()));
            assert_eq!(*decrypt("pw", &blob).unwrap(), payload);
        }
    }
}

#[test]
fn empty_payload_roundtrip() {
    let blob = encrypt("", b"").unwrap();
    assert!(decrypt("", &blob).unwrap().is_empty());
}

#[test]
fn wrong_password_fails() {
    for pref in [CipherPreference::Aes256Gcm, CipherPreference::ChaCha20Poly1305] {
        let blob = encrypt_with("pw1", b"secret", &forced(pref)).unwrap();
        let err = decrypt("pw2", &blob).unwrap_err();
        assert!(matches!(err, Error::AuthenticationFailure));
    }
}

#[test]
fn single_bit_flips_in_payload_are_detected() {
    let blob = encrypt(PASSWORD, b"some configuration payload").unwrap();

    for pos in [Header::LEN, Header::LEN + 7, blob.len() - 17, blob.len() - 1] {
        for bit in [0, 3, 7] {
            let mut tampered = blob.clone();
            tampered[pos] ^= 1 << bit;
            assert!(
                matches!(decrypt(PASSWORD, &tampered), Err(Error::AuthenticationFailure)),
                "pos {pos} bit {bit}"
            );
        }
    }
}

#[test]
fn tampered_salt_or_nonce_is_detected() {
    let blob = encrypt(PASSWORD, b"hello").unwrap();

    for pos in [0, SALT_LEN - 1, SALT_LEN + 1, Header::LEN - 1] {
        let mut tampered = blob.clone();
        tampered[pos] ^= 0x01;
        assert!(decrypt(PASSWORD, &tampered).is_err(), "pos {pos}");
    }
}

#[test]
fn switching_cipher_id_is_detected() {
    let mut blob = encrypt_with(PASSWORD, b"hello", &forced(CipherPreference::Aes256Gcm)).unwrap();
    blob[SALT_LEN] = Suite::Argon2idChaCha20Poly1305.id();

    assert!(matches!(
        decrypt(PASSWORD, &blob),
        Err(Error::AuthenticationFailure)
    ));
}

#[test]
fn salt_and_nonce_are_fresh_per_blob() {
    let a = pwseal::inspect(&encrypt(PASSWORD, b"hello").unwrap()).unwrap();
    let b = pwseal::inspect(&encrypt(PASSWORD, b"hello").unwrap()).unwrap();

    assert_ne!(a.salt(), b.salt());
    assert_ne!(a.nonce(), b.nonce());
}

#[test]
fn short_blobs_are_malformed() {
    let blob = encrypt(PASSWORD, b"hello").unwrap();

    for len in [0, 1, SALT_LEN, SALT_LEN + 1, Header::LEN - 1] {
        assert!(
            matches!(decrypt(PASSWORD, &blob[..len]), Err(Error::MalformedInput(_))),
            "len {len}"
        );
    }
}

#[test]
fn header_without_payload_is_malformed() {
    let blob = encrypt(PASSWORD, b"hello").unwrap();
    let err = decrypt(PASSWORD, &blob[..Header::LEN]).unwrap_err();
    assert!(matches!(err, Error::MalformedInput(_)));
}

#[test]
fn unknown_algorithm_id_is_rejected() {
    let blob = encrypt(PASSWORD, b"hello").unwrap();

    for id in [0x03, 0x10, 0x80, 0xff] {
        let mut bad = blob.clone();
        bad[SALT_LEN] = id;
        assert!(matches!(
            decrypt(PASSWORD, &bad),
            Err(Error::UnsupportedAlgorithm(got)) if got == id
        ));
    }
}

#[test]
fn legacy_pbkdf2_blob_decrypts() {
    let salt = [0x42u8; SALT_LEN];
    let nonce = [0x24u8; NONCE_LEN];

    // Assembled by hand from the primitives, the way an older writer did.
    let key = derive_key(PASSWORD.as_bytes(), &salt, Kdf::Pbkdf2Sha256).unwrap();
    let mut blob = Header::new(salt, Suite::Pbkdf2Aes256Gcm, nonce)
        .to_bytes()
        .to_vec();
    let mut writer =
        SealWriter::new(blob, Cipher::Aes256Gcm.keyed(&key).unwrap(), &nonce, &[]).unwrap();
    writer.write_all(b"legacy config").unwrap();
    blob = writer.finish().unwrap();

    assert_eq!(blob[SALT_LEN], 0x02);
    assert_eq!(*decrypt(PASSWORD, &blob).unwrap(), b"legacy config");
    assert!(decrypt("wrong password", &blob).is_err());

    let via_helper = pwseal::encrypt_deterministic(
        PASSWORD,
        b"legacy config",
        Suite::Pbkdf2Aes256Gcm,
        &salt,
        &nonce,
    )
    .unwrap();
    assert_eq!(blob, via_helper);
}

#[test]
fn new_blobs_never_use_legacy_suite() {
    for pref in [
        CipherPreference::Auto,
        CipherPreference::Aes256Gcm,
        CipherPreference::ChaCha20Poly1305,
    ] {
        let blob = encrypt_with("pw", b"x", &forced(pref)).unwrap();
        let suite = pwseal::inspect(&blob).unwrap().suite();
        assert!(!suite.is_decode_only());
        assert!(blob[SALT_LEN] == 0x00 || blob[SALT_LEN] == 0x01);
    }
}

#[test]
fn decryption_ignores_local_hardware() {
    // Whatever this machine prefers, both encode-eligible ids must open.
    for pref in [CipherPreference::Aes256Gcm, CipherPreference::ChaCha20Poly1305] {
        let blob = encrypt_with("pw", b"portable", &forced(pref)).unwrap();
        assert_eq!(*decrypt("pw", &blob).unwrap(), b"portable");
    }
}
