use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::signer::Keypair;

/// On-disk TOML representation of an account keypair.
///
/// Only the 32-byte secret is stored; the public key and account identity are
/// re-derived on load.
#[derive(Serialize, Deserialize)]
pub struct KeyFile {
    secret: String,
}

impl KeyFile {
    /// Capture a keypair for persistence.
    pub fn from_keypair(keypair: &Keypair) -> Self {
        Self {
            secret: hex::encode(keypair.as_bytes()),
        }
    }

    /// Reconstruct the keypair.
    pub fn to_keypair(&self) -> Result<Keypair, KeyFileError> {
        let bytes = hex::decode(&self.secret).map_err(|e| KeyFileError::Malformed(e.to_string()))?;
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| KeyFileError::Malformed("expected 32-byte secret".into()))?;
        Ok(Keypair::from_bytes(arr))
    }

    /// Write the key file to disk, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<(), KeyFileError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let body = toml::to_string_pretty(self).map_err(|e| KeyFileError::Malformed(e.to_string()))?;
        fs::write(path, body)?;
        Ok(())
    }

    /// Read a key file from disk.
    pub fn load(path: &Path) -> Result<Self, KeyFileError> {
        let body = fs::read_to_string(path)?;
        toml::from_str(&body).map_err(|e| KeyFileError::Malformed(e.to_string()))
    }
}

/// Load the keypair stored at `path`.
pub fn load_keypair(path: &Path) -> Result<Keypair, KeyFileError> {
    KeyFile::load(path)?.to_keypair()
}

/// Generate a fresh keypair and persist it at `path`.
pub fn generate_keypair(path: &Path) -> Result<Keypair, KeyFileError> {
    let keypair = Keypair::generate();
    KeyFile::from_keypair(&keypair).save(path)?;
    Ok(keypair)
}

/// Errors from key file operations.
#[derive(Debug, thiserror::Error)]
pub enum KeyFileError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed key file: {0}")]
    Malformed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("key.toml");

        let keypair = generate_keypair(&path).unwrap();
        let loaded = load_keypair(&path).unwrap();
        assert_eq!(keypair.account_id(), loaded.account_id());
    }

    #[test]
    fn save_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("key.toml");

        generate_keypair(&path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_keypair(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, KeyFileError::Io(_)));
    }

    #[test]
    fn load_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("key.toml");
        fs::write(&path, "not = valid key material").unwrap();
        assert!(matches!(
            load_keypair(&path),
            Err(KeyFileError::Malformed(_))
        ));
    }

    #[test]
    fn load_rejects_short_secret() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("key.toml");
        fs::write(&path, "secret = \"abcd\"\n").unwrap();
        assert!(matches!(
            load_keypair(&path),
            Err(KeyFileError::Malformed(_))
        ));
    }
}
