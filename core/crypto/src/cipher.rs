//! Block cipher transforms selected by a `family/mode/padding` name.
//!
//! Every call builds a fresh cipher instance from a key and an explicit
//! IV. Nothing is cached between calls.

use aes::cipher::{
    block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, InvalidLength, KeyIvInit,
    StreamCipher,
};
use aes::{Aes128, Aes192, Aes256};
use des::{Des, TdesEde3};
use std::fmt;

use crate::keys::{DerivedKey, Iv, KeyAlgorithm};
use sealfield_common::{Error, Result};

/// Block cipher mode of operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CipherMode {
    /// Cipher block chaining with PKCS#5/PKCS#7 padding.
    Cbc,
    /// Big-endian 128-bit counter, no padding.
    Ctr,
}

/// A resolved cipher: algorithm family plus mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CipherSpec {
    family: KeyAlgorithm,
    mode: CipherMode,
}

impl CipherSpec {
    /// Resolve a cipher by its `family/mode/padding` name, ignoring case.
    ///
    /// Modes without an IV (ECB, or a bare family name) are not supported.
    pub fn lookup(name: &str) -> Option<Self> {
        let parts: Vec<String> = name.split('/').map(|p| p.trim().to_ascii_uppercase()).collect();
        let [family, mode, padding] = parts.as_slice() else {
            return None;
        };

        let family = KeyAlgorithm::lookup(family)?;
        let mode = match (mode.as_str(), padding.as_str()) {
            ("CBC", "PKCS5PADDING" | "PKCS7PADDING") => CipherMode::Cbc,
            ("CTR", "NOPADDING") if family == KeyAlgorithm::Aes => CipherMode::Ctr,
            _ => return None,
        };

        Some(Self { family, mode })
    }

    /// Algorithm family the key must belong to.
    pub fn family(&self) -> KeyAlgorithm {
        self.family
    }

    /// Mode of operation.
    pub fn mode(&self) -> CipherMode {
        self.mode
    }

    /// IV length in bytes, equal to the cipher block size.
    pub fn iv_len(&self) -> usize {
        match self.family {
            KeyAlgorithm::Aes => 16,
            KeyAlgorithm::Des | KeyAlgorithm::DesEde => 8,
        }
    }

    /// Initialize an encryption operation with `key` and capture the IV
    /// chosen for it.
    ///
    /// # Errors
    /// - Key family or length cannot initialize this cipher
    pub fn generate_iv(&self, key: &DerivedKey) -> Result<Iv> {
        let iv = Iv::generate(self.iv_len());
        self.encrypt(key, iv.as_bytes(), &[])?;
        Ok(iv)
    }

    /// Encrypt `plaintext` under `key` and `iv`.
    pub fn encrypt(&self, key: &DerivedKey, iv: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
        self.check_family(key).map_err(Error::Encrypt)?;
        let k = key.as_bytes();

        let result = match (self.mode, self.family, k.len()) {
            (CipherMode::Cbc, KeyAlgorithm::Aes, 16) => cbc_encrypt::<cbc::Encryptor<Aes128>>(k, iv, plaintext),
            (CipherMode::Cbc, KeyAlgorithm::Aes, 24) => cbc_encrypt::<cbc::Encryptor<Aes192>>(k, iv, plaintext),
            (CipherMode::Cbc, KeyAlgorithm::Aes, 32) => cbc_encrypt::<cbc::Encryptor<Aes256>>(k, iv, plaintext),
            (CipherMode::Cbc, KeyAlgorithm::Des, 8) => cbc_encrypt::<cbc::Encryptor<Des>>(k, iv, plaintext),
            (CipherMode::Cbc, KeyAlgorithm::DesEde, 24) => cbc_encrypt::<cbc::Encryptor<TdesEde3>>(k, iv, plaintext),
            (CipherMode::Ctr, KeyAlgorithm::Aes, 16) => ctr_apply::<ctr::Ctr128BE<Aes128>>(k, iv, plaintext),
            (CipherMode::Ctr, KeyAlgorithm::Aes, 24) => ctr_apply::<ctr::Ctr128BE<Aes192>>(k, iv, plaintext),
            (CipherMode::Ctr, KeyAlgorithm::Aes, 32) => ctr_apply::<ctr::Ctr128BE<Aes256>>(k, iv, plaintext),
            _ => return Err(Error::Encrypt(self.invalid_key_length(key))),
        };

        result.map_err(|e| Error::Encrypt(format!("Cipher initialization failed: {}", e)))
    }

    /// Decrypt `ciphertext` under `key` and `iv`.
    ///
    /// A wrong key usually shows up here as a padding failure.
    pub fn decrypt(&self, key: &DerivedKey, iv: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>> {
        self.check_family(key).map_err(Error::Decrypt)?;
        let k = key.as_bytes();
        let init_failed = |e: InvalidLength| Error::Decrypt(format!("Cipher initialization failed: {}", e));

        match (self.mode, self.family, k.len()) {
            (CipherMode::Cbc, KeyAlgorithm::Aes, 16) => cbc_decrypt::<cbc::Decryptor<Aes128>>(k, iv, ciphertext),
            (CipherMode::Cbc, KeyAlgorithm::Aes, 24) => cbc_decrypt::<cbc::Decryptor<Aes192>>(k, iv, ciphertext),
            (CipherMode::Cbc, KeyAlgorithm::Aes, 32) => cbc_decrypt::<cbc::Decryptor<Aes256>>(k, iv, ciphertext),
            (CipherMode::Cbc, KeyAlgorithm::Des, 8) => cbc_decrypt::<cbc::Decryptor<Des>>(k, iv, ciphertext),
            (CipherMode::Cbc, KeyAlgorithm::DesEde, 24) => cbc_decrypt::<cbc::Decryptor<TdesEde3>>(k, iv, ciphertext),
            (CipherMode::Ctr, KeyAlgorithm::Aes, 16) => ctr_apply::<ctr::Ctr128BE<Aes128>>(k, iv, ciphertext).map_err(init_failed),
            (CipherMode::Ctr, KeyAlgorithm::Aes, 24) => ctr_apply::<ctr::Ctr128BE<Aes192>>(k, iv, ciphertext).map_err(init_failed),
            (CipherMode::Ctr, KeyAlgorithm::Aes, 32) => ctr_apply::<ctr::Ctr128BE<Aes256>>(k, iv, ciphertext).map_err(init_failed),
            _ => Err(Error::Decrypt(self.invalid_key_length(key))),
        }
    }

    fn check_family(&self, key: &DerivedKey) -> std::result::Result<(), String> {
        if key.algorithm() != self.family {
            return Err(format!("{} key cannot initialize cipher {}", key.algorithm(), self));
        }
        Ok(())
    }

    fn invalid_key_length(&self, key: &DerivedKey) -> String {
        format!("Invalid key length {} bits for cipher {}", key.len_bits(), self)
    }
}

impl fmt::Display for CipherSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mode {
            CipherMode::Cbc => write!(f, "{}/CBC/PKCS5Padding", self.family),
            CipherMode::Ctr => write!(f, "{}/CTR/NoPadding", self.family),
        }
    }
}

fn cbc_encrypt<E>(key: &[u8], iv: &[u8], plaintext: &[u8]) -> std::result::Result<Vec<u8>, InvalidLength>
where
    E: KeyIvInit + BlockEncryptMut,
{
    let encryptor = E::new_from_slices(key, iv)?;
    Ok(encryptor.encrypt_padded_vec_mut::<Pkcs7>(plaintext))
}

fn cbc_decrypt<D>(key: &[u8], iv: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>>
where
    D: KeyIvInit + BlockDecryptMut,
{
    let decryptor = D::new_from_slices(key, iv)
        .map_err(|e| Error::Decrypt(format!("Cipher initialization failed: {}", e)))?;
    decryptor
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| Error::Decrypt("Bad padding, wrong password or corrupted data".to_string()))
}

fn ctr_apply<S>(key: &[u8], iv: &[u8], data: &[u8]) -> std::result::Result<Vec<u8>, InvalidLength>
where
    S: KeyIvInit + StreamCipher,
{
    let mut cipher = S::new_from_slices(key, iv)?;
    let mut buffer = data.to_vec();
    cipher.apply_keystream(&mut buffer);
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aes_key(byte: u8) -> DerivedKey {
        DerivedKey::from_bytes(vec![byte; 32], KeyAlgorithm::Aes)
    }

    #[test]
    fn test_lookup() {
        let spec = CipherSpec::lookup("AES/CBC/PKCS5Padding").unwrap();
        assert_eq!(spec.family(), KeyAlgorithm::Aes);
        assert_eq!(spec.mode(), CipherMode::Cbc);
        assert_eq!(spec.iv_len(), 16);
        assert_eq!(spec.to_string(), "AES/CBC/PKCS5Padding");

        assert_eq!(CipherSpec::lookup("aes/ctr/nopadding").unwrap().mode(), CipherMode::Ctr);
        assert_eq!(CipherSpec::lookup("DES/CBC/PKCS5Padding").unwrap().iv_len(), 8);
    }

    #[test]
    fn test_lookup_rejects_unknown() {
        assert!(CipherSpec::lookup("UnknownCipher").is_none());
        assert!(CipherSpec::lookup("AES").is_none());
        assert!(CipherSpec::lookup("AES/ECB/PKCS5Padding").is_none());
        assert!(CipherSpec::lookup("DES/CTR/NoPadding").is_none());
    }

    #[test]
    fn test_cbc_roundtrip() {
        let spec = CipherSpec::lookup("AES/CBC/PKCS5Padding").unwrap();
        let key = aes_key(42);
        let iv = [7u8; 16];

        let ciphertext = spec.encrypt(&key, &iv, b"Hello, World!").unwrap();
        assert_eq!(ciphertext.len(), 16);

        let decrypted = spec.decrypt(&key, &iv, &ciphertext).unwrap();
        assert_eq!(decrypted, b"Hello, World!");
    }

    #[test]
    fn test_cbc_full_block_gets_padding_block() {
        let spec = CipherSpec::lookup("AES/CBC/PKCS5Padding").unwrap();
        let ciphertext = spec.encrypt(&aes_key(1), &[0u8; 16], &[0u8; 16]).unwrap();
        assert_eq!(ciphertext.len(), 32);
    }

    #[test]
    fn test_ctr_roundtrip_preserves_length() {
        let spec = CipherSpec::lookup("AES/CTR/NoPadding").unwrap();
        let key = aes_key(3);
        let iv = [9u8; 16];

        let ciphertext = spec.encrypt(&key, &iv, b"odd length text").unwrap();
        assert_eq!(ciphertext.len(), 15);
        assert_eq!(spec.decrypt(&key, &iv, &ciphertext).unwrap(), b"odd length text");
    }

    #[test]
    fn test_des_family_roundtrip() {
        let spec = CipherSpec::lookup("DESede/CBC/PKCS5Padding").unwrap();
        let key = DerivedKey::from_bytes(vec![5u8; 24], KeyAlgorithm::DesEde);
        let iv = [1u8; 8];

        let ciphertext = spec.encrypt(&key, &iv, b"triple").unwrap();
        assert_eq!(spec.decrypt(&key, &iv, &ciphertext).unwrap(), b"triple");
    }

    #[test]
    fn test_wrong_iv_length_fails() {
        let spec = CipherSpec::lookup("AES/CBC/PKCS5Padding").unwrap();
        assert!(matches!(spec.encrypt(&aes_key(1), &[0u8; 8], b"x"), Err(Error::Encrypt(_))));
        assert!(matches!(spec.decrypt(&aes_key(1), &[0u8; 8], &[0u8; 16]), Err(Error::Decrypt(_))));
    }

    #[test]
    fn test_family_mismatch_fails() {
        let spec = CipherSpec::lookup("AES/CBC/PKCS5Padding").unwrap();
        let des_key = DerivedKey::from_bytes(vec![1u8; 8], KeyAlgorithm::Des);
        assert!(spec.generate_iv(&des_key).is_err());
    }

    #[test]
    fn test_truncated_ciphertext_fails() {
        let spec = CipherSpec::lookup("AES/CBC/PKCS5Padding").unwrap();
        assert!(matches!(spec.decrypt(&aes_key(1), &[0u8; 16], &[0u8; 10]), Err(Error::Decrypt(_))));
    }

    #[test]
    fn test_generate_iv() {
        let spec = CipherSpec::lookup("AES/CBC/PKCS5Padding").unwrap();
        let iv1 = spec.generate_iv(&aes_key(1)).unwrap();
        let iv2 = spec.generate_iv(&aes_key(1)).unwrap();

        assert_eq!(iv1.as_bytes().len(), 16);
        assert_ne!(iv1, iv2);
    }
}
