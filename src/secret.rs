//! Encrypted at-rest storage for the API token.
//!
//! The token is sealed with AES-256-GCM under a key derived from a user PIN with
//! PBKDF2-HMAC-SHA256. A fresh random salt and IV are drawn per write, so re-encrypting the
//! same token never produces the same blob twice. A wrong PIN fails the GCM tag check and
//! surfaces as a decryption error, never as garbled plaintext.

use aes_gcm::{
    aead::{Aead, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use anyhow::{anyhow, Context};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::path::{Path, PathBuf};

use crate::error::ApiError;
use crate::utils;
use crate::Result;

const KEY_SIZE: usize = 32;
const SALT_SIZE: usize = 16;
const NONCE_SIZE: usize = 12;
const PBKDF2_ROUNDS: u32 = 100_000;

pub(crate) const MIN_PIN_LENGTH: usize = 4;

/// On-disk shape of the sealed token. Field names are part of the format; blobs written by
/// earlier versions must keep reading.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CipherRecord {
    v: u32,
    algo: String,
    salt_b64: String,
    iv_b64: String,
    cipher_b64: String,
}

pub(crate) fn validate_pin(pin: &str) -> std::result::Result<(), ApiError> {
    if pin.chars().count() < MIN_PIN_LENGTH {
        return Err(ApiError::Validation(format!(
            "the PIN must be at least {MIN_PIN_LENGTH} characters"
        )));
    }
    Ok(())
}

fn derive_key(pin: &str, salt: &[u8]) -> [u8; KEY_SIZE] {
    let mut key = [0u8; KEY_SIZE];
    pbkdf2_hmac::<Sha256>(pin.as_bytes(), salt, PBKDF2_ROUNDS, &mut key);
    key
}

fn seal(token: &str, pin: &str) -> Result<CipherRecord> {
    validate_pin(pin)?;
    let mut salt = [0u8; SALT_SIZE];
    OsRng.fill_bytes(&mut salt);
    let mut iv = [0u8; NONCE_SIZE];
    OsRng.fill_bytes(&mut iv);

    let key = derive_key(pin, &salt);
    let cipher = Aes256Gcm::new_from_slice(&key)
        .map_err(|_| anyhow!("unable to initialize the cipher"))?;
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&iv), token.as_bytes())
        .map_err(|_| anyhow!("unable to encrypt the token"))?;

    Ok(CipherRecord {
        v: 1,
        algo: "AES-GCM".to_string(),
        salt_b64: STANDARD.encode(salt),
        iv_b64: STANDARD.encode(iv),
        cipher_b64: STANDARD.encode(&ciphertext),
    })
}

fn open(record: &CipherRecord, pin: &str) -> std::result::Result<String, ApiError> {
    if record.v != 1 || record.algo != "AES-GCM" {
        return Err(ApiError::Decryption);
    }
    let salt = STANDARD.decode(&record.salt_b64).map_err(|_| ApiError::Decryption)?;
    let iv = STANDARD.decode(&record.iv_b64).map_err(|_| ApiError::Decryption)?;
    let ciphertext = STANDARD
        .decode(&record.cipher_b64)
        .map_err(|_| ApiError::Decryption)?;
    if iv.len() != NONCE_SIZE {
        return Err(ApiError::Decryption);
    }

    let key = derive_key(pin, &salt);
    let cipher = Aes256Gcm::new_from_slice(&key).map_err(|_| ApiError::Decryption)?;
    let plaintext = cipher
        .decrypt(Nonce::from_slice(&iv), ciphertext.as_ref())
        .map_err(|_| ApiError::Decryption)?;
    String::from_utf8(plaintext).map_err(|_| ApiError::Decryption)
}

/// The sealed token file and the operations on it.
pub struct SecretStore {
    path: PathBuf,
}

impl SecretStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn exists(&self) -> bool {
        tokio::fs::try_exists(&self.path).await.unwrap_or(false)
    }

    /// Seals and writes the token, creating the parent directory if needed.
    pub async fn store(&self, token: &str, pin: &str) -> Result<()> {
        let record = seal(token, pin)?;
        if let Some(parent) = self.path.parent() {
            utils::make_dir(parent).await?;
        }
        let json = serde_json::to_string_pretty(&record)
            .context("Unable to serialize the sealed token")?;
        utils::write(&self.path, json).await
    }

    /// Reads and unseals the stored token.
    pub async fn load(&self, pin: &str) -> Result<String> {
        let record: CipherRecord = utils::deserialize(&self.path)
            .await
            .context("No stored API token was found, run 'updash auth' first")?;
        let token = open(&record, pin)?;
        Ok(token)
    }

    /// Deletes the stored blob. Returns false when there was nothing to delete.
    pub async fn clear(&self) -> Result<bool> {
        if !self.exists().await {
            return Ok(false);
        }
        tokio::fs::remove_file(&self.path)
            .await
            .with_context(|| format!("Unable to remove {}", self.path.display()))?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const TOKEN: &str = "up:yeah:abc123DEF456xyz";

    #[test]
    fn test_seal_open_round_trip() {
        let record = seal(TOKEN, "1234").unwrap();
        assert_eq!(open(&record, "1234").unwrap(), TOKEN);
    }

    #[test]
    fn test_wrong_pin_is_a_clean_failure() {
        let record = seal(TOKEN, "1234").unwrap();
        assert_eq!(open(&record, "9999").unwrap_err(), ApiError::Decryption);
    }

    #[test]
    fn test_sealing_twice_differs() {
        let first = seal(TOKEN, "1234").unwrap();
        let second = seal(TOKEN, "1234").unwrap();
        // Fresh salt and IV every time, so the blobs never repeat.
        assert_ne!(first.salt_b64, second.salt_b64);
        assert_ne!(first.iv_b64, second.iv_b64);
        assert_ne!(first.cipher_b64, second.cipher_b64);
    }

    #[test]
    fn test_tampered_blob_fails() {
        let mut record = seal(TOKEN, "1234").unwrap();
        record.cipher_b64 = STANDARD.encode(b"tampered bytes here");
        assert_eq!(open(&record, "1234").unwrap_err(), ApiError::Decryption);

        let mut record = seal(TOKEN, "1234").unwrap();
        record.salt_b64 = "not base64 !!!".to_string();
        assert_eq!(open(&record, "1234").unwrap_err(), ApiError::Decryption);
    }

    #[test]
    fn test_unsupported_record_version_fails() {
        let mut record = seal(TOKEN, "1234").unwrap();
        record.v = 2;
        assert_eq!(open(&record, "1234").unwrap_err(), ApiError::Decryption);
    }

    #[test]
    fn test_short_pin_is_rejected() {
        let err = seal(TOKEN, "123").unwrap_err();
        let api = err.downcast::<ApiError>().unwrap();
        assert!(matches!(api, ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn test_store_and_load_from_disk() {
        let dir = TempDir::new().unwrap();
        let store = SecretStore::new(dir.path().join(".secrets").join("token.json"));
        assert!(!store.exists().await);

        store.store(TOKEN, "4321").await.unwrap();
        assert!(store.exists().await);
        assert_eq!(store.load("4321").await.unwrap(), TOKEN);

        // The on-disk field names are part of the format.
        let raw = tokio::fs::read_to_string(store.path()).await.unwrap();
        assert!(raw.contains("\"saltB64\""));
        assert!(raw.contains("\"ivB64\""));
        assert!(raw.contains("\"cipherB64\""));
        assert!(!raw.contains(TOKEN));

        assert!(store.clear().await.unwrap());
        assert!(!store.clear().await.unwrap());
        assert!(!store.exists().await);
    }

    #[tokio::test]
    async fn test_load_with_wrong_pin_from_disk() {
        let dir = TempDir::new().unwrap();
        let store = SecretStore::new(dir.path().join("token.json"));
        store.store(TOKEN, "4321").await.unwrap();

        let err = store.load("0000").await.unwrap_err();
        let api = err.downcast::<ApiError>().unwrap();
        assert_eq!(api, ApiError::Decryption);
    }
}
