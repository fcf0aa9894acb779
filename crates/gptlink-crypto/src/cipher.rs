//! XSalsa20-Poly1305 (NaCl secretbox) encryption/decryption
//!
//! Ciphertext format matches `nacl.secretbox` in the browser client:
//! ```text
//! [16 bytes: Poly1305 tag][N bytes: XSalsa20 ciphertext]
//! ```
//! The tag is verified before any plaintext is released.

use crypto_secretbox::{
    aead::{Aead, KeyInit},
    XSalsa20Poly1305,
};
use gptlink_core::{LinkError, LinkResult};
use rand::RngCore;

use crate::{KEY_SIZE, NONCE_SIZE, TAG_SIZE};

/// Encrypt `plaintext` under `key` and an already-expanded 24-byte nonce.
///
/// Returns `[16-byte tag][ciphertext]` (plaintext length + 16).
pub fn encrypt(
    plaintext: &[u8],
    key: &[u8; KEY_SIZE],
    nonce: &[u8; NONCE_SIZE],
) -> LinkResult<Vec<u8>> {
    let cipher = XSalsa20Poly1305::new(key.into());
    cipher
        .encrypt(nonce.into(), plaintext)
        .map_err(|e| LinkError::Other(anyhow::anyhow!("secretbox encryption failed: {e}")))
}

/// Decrypt and authenticate `ciphertext`.
///
/// A wrong key and tampered data fail identically with
/// [`LinkError::Authentication`].
pub fn decrypt(
    ciphertext: &[u8],
    key: &[u8; KEY_SIZE],
    nonce: &[u8; NONCE_SIZE],
) -> LinkResult<Vec<u8>> {
    if ciphertext.len() < TAG_SIZE {
        return Err(LinkError::Format(format!(
            "ciphertext too short: {} bytes (minimum {TAG_SIZE})",
            ciphertext.len()
        )));
    }

    let cipher = XSalsa20Poly1305::new(key.into());
    cipher
        .decrypt(nonce.into(), ciphertext)
        .map_err(|_| LinkError::Authentication)
}

/// Encrypt with a random nonce, for records the session persists locally.
///
/// Returns `[24-byte nonce][16-byte tag][ciphertext]`.
pub fn seal(key: &[u8; KEY_SIZE], plaintext: &[u8]) -> LinkResult<Vec<u8>> {
    let mut nonce = [0u8; NONCE_SIZE];
    rand::thread_rng().fill_bytes(&mut nonce);

    let ciphertext = encrypt(plaintext, key, &nonce)?;

    let mut result = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    result.extend_from_slice(&nonce);
    result.extend_from_slice(&ciphertext);
    Ok(result)
}

/// Decrypt a record produced by [`seal`].
pub fn open(key: &[u8; KEY_SIZE], sealed: &[u8]) -> LinkResult<Vec<u8>> {
    if sealed.len() < NONCE_SIZE + TAG_SIZE {
        return Err(LinkError::Format(format!(
            "sealed record too short: {} bytes (minimum {})",
            sealed.len(),
            NONCE_SIZE + TAG_SIZE
        )));
    }

    let (nonce_bytes, ciphertext) = sealed.split_at(NONCE_SIZE);
    let mut nonce = [0u8; NONCE_SIZE];
    nonce.copy_from_slice(nonce_bytes);
    decrypt(ciphertext, key, &nonce)
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: [u8; KEY_SIZE] = [0x42; KEY_SIZE];
    const NONCE: [u8; NONCE_SIZE] = [0x24; NONCE_SIZE];

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let plaintext = b"hello, encrypted world!";

        let ciphertext = encrypt(plaintext, &KEY, &NONCE).unwrap();
        let decrypted = decrypt(&ciphertext, &KEY, &NONCE).unwrap();

        assert_eq!(&decrypted, plaintext);
    }

    #[test]
    fn test_nacl_secretbox_known_answer() {
        // Reference vector from the NaCl/libsodium secretbox tests.
        let key: [u8; KEY_SIZE] =
            hex::decode("1b27556473e985d462cd51197a9a46c76009549eac6474f206c4ee0844f68389")
                .unwrap()
                .try_into()
                .unwrap();
        let nonce: [u8; NONCE_SIZE] =
            hex::decode("69696ee955b62b73cd62bda875fc73d68219e0036b7a0b37")
                .unwrap()
                .try_into()
                .unwrap();
        let message = hex::decode(concat!(
            "be075fc53c81f2d5cf141316ebeb0c7b5228c52a4c62cbd44b66849b64244ffc",
            "e5ecbaaf33bd751a1ac728d45e6c61296cdc3c01233561f41db66cce314adb31",
            "0e3be8250c46f06dceea3a7fa1348057e2f6556ad6b1318a024a838f21af1fde",
            "048977eb48f59ffd4924ca1c60902e52f0a089bc76897040e082f93776384864",
            "5e0705",
        ))
        .unwrap();
        let expected = concat!(
            "f3ffc7703f9400e52a7dfb4b3d3305d9",
            "8e993b9f48681273c29650ba32fc76ce48332ea7164d96a4476fb8c531a1186a",
            "c0dfc17c98dce87b4da7f011ec48c97271d2c20f9b928fe2270d6fb863d51738",
            "b48eeee314a7cc8ab932164548e526ae90224368517acfeabd6bb3732bc0e9da",
            "99832b61ca01b6de56244a9e88d5f9b37973f622a43d14a6599b1f654cb45a74",
            "e355a5",
        );

        let ciphertext = encrypt(&message, &key, &nonce).unwrap();
        // Tag first, then the XSalsa20 stream ciphertext.
        assert_eq!(hex::encode(&ciphertext[..TAG_SIZE]), &expected[..2 * TAG_SIZE]);
        assert_eq!(hex::encode(&ciphertext), expected);
        assert_eq!(decrypt(&ciphertext, &key, &nonce).unwrap(), message);
    }

    #[test]
    fn test_encrypt_decrypt_empty() {
        let ciphertext = encrypt(b"", &KEY, &NONCE).unwrap();
        assert_eq!(ciphertext.len(), TAG_SIZE);

        let decrypted = decrypt(&ciphertext, &KEY, &NONCE).unwrap();
        assert!(decrypted.is_empty());
    }

    #[test]
    fn test_ciphertext_size() {
        let ciphertext = encrypt(&[0u8; 1000], &KEY, &NONCE).unwrap();
        assert_eq!(ciphertext.len(), 1000 + TAG_SIZE);
    }

    #[test]
    fn test_decrypt_wrong_key() {
        let ciphertext = encrypt(b"secret data", &KEY, &NONCE).unwrap();
        let result = decrypt(&ciphertext, &[0x43; KEY_SIZE], &NONCE);

        assert!(matches!(result, Err(LinkError::Authentication)));
    }

    #[test]
    fn test_decrypt_wrong_nonce() {
        let ciphertext = encrypt(b"secret data", &KEY, &NONCE).unwrap();
        let result = decrypt(&ciphertext, &KEY, &[0x25; NONCE_SIZE]);

        assert!(matches!(result, Err(LinkError::Authentication)));
    }

    #[test]
    fn test_tampered_ciphertext() {
        let ciphertext = encrypt(b"secret data", &KEY, &NONCE).unwrap();

        for i in 0..ciphertext.len() {
            let mut tampered = ciphertext.clone();
            tampered[i] ^= 0x01;
            assert!(
                matches!(decrypt(&tampered, &KEY, &NONCE), Err(LinkError::Authentication)),
                "flipping byte {i} must fail authentication"
            );
        }
    }

    #[test]
    fn test_decrypt_too_short_is_format_error() {
        let result = decrypt(&[0u8; TAG_SIZE - 1], &KEY, &NONCE);
        assert!(matches!(result, Err(LinkError::Format(_))));
    }

    #[test]
    fn test_seal_open_roundtrip() {
        let sealed = seal(&KEY, b"persisted record").unwrap();
        assert_eq!(sealed.len(), NONCE_SIZE + TAG_SIZE + b"persisted record".len());

        let opened = open(&KEY, &sealed).unwrap();
        assert_eq!(opened, b"persisted record");
    }

    #[test]
    fn test_seal_uses_fresh_nonce() {
        let a = seal(&KEY, b"same").unwrap();
        let b = seal(&KEY, b"same").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_open_wrong_key() {
        let sealed = seal(&KEY, b"persisted record").unwrap();
        assert!(open(&[0u8; KEY_SIZE], &sealed).unwrap_err().is_authentication());
    }
}
