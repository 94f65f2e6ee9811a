//! Git settings store
//!
//! Explicit configuration store for the credentials and origin the sync
//! machinery uses: a private-key blob, an optional passphrase and the remote
//! origin URL. Every mutation is persisted immediately (settings screens save
//! on every keystroke), and the private key is mirrored to
//! a fixed `id_rsa` file so the git transport can read it from disk.
//!
//! Invariant: private-key presence in the persisted settings and the
//! materialized key file move together. Deleting one deletes both.

use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, info};

use crate::git::GitCredentials;
use crate::storage::layout::StorageLayout;

/// Error type for settings persistence.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// Persisted git settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct GitSettings {
    /// Remote origin URL, e.g. `git@github.com:username/example.git`.
    pub origin: Option<String>,
    /// SSH key passphrase. Empty means none.
    #[serde(default)]
    pub passphrase: String,
    /// Private key blob, base64 inside the JSON document.
    #[serde(default, with = "key_blob")]
    private_key: Option<Vec<u8>>,
}

impl GitSettings {
    pub fn private_key(&self) -> Option<&[u8]> {
        self.private_key.as_deref()
    }

    pub fn has_private_key(&self) -> bool {
        self.private_key.is_some()
    }
}

mod key_blob {
    use super::BASE64;
    use base64::Engine as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error> {
        value
            .as_ref()
            .map(|bytes| BASE64.encode(bytes))
            .serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Vec<u8>>, D::Error> {
        let encoded = Option::<String>::deserialize(deserializer)?;
        encoded
            .map(|text| BASE64.decode(text.as_bytes()))
            .transpose()
            .map_err(serde::de::Error::custom)
    }
}

/// Filesystem-backed settings store.
///
/// Owns the current [`GitSettings`] and keeps the on-disk document plus the
/// materialized key file in sync with every mutation.
pub struct SettingsStore {
    layout: StorageLayout,
    settings: GitSettings,
}

impl SettingsStore {
    /// Open the store, loading the persisted document if one exists.
    pub async fn open(layout: StorageLayout) -> Result<Self, SettingsError> {
        let path = layout.settings_path();
        let settings = match fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| SettingsError::SerializationError(format!("{}: {}", path.display(), e)))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => GitSettings::default(),
            Err(e) => {
                return Err(SettingsError::IoError(format!(
                    "Failed to read {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        Ok(Self { layout, settings })
    }

    pub fn settings(&self) -> &GitSettings {
        &self.settings
    }

    pub fn layout(&self) -> &StorageLayout {
        &self.layout
    }

    /// Set the remote origin URL. Persists immediately; callers feed the new
    /// value to [`crate::storage::NoteStorage::update_default_origin`].
    pub async fn set_origin(&mut self, origin: Option<String>) -> Result<(), SettingsError> {
        self.settings.origin = origin.filter(|url| !url.trim().is_empty());
        self.save().await
    }

    /// Set the key passphrase. Persists immediately.
    pub async fn set_passphrase(&mut self, passphrase: String) -> Result<(), SettingsError> {
        self.settings.passphrase = passphrase;
        self.save().await
    }

    /// Persist a new private key blob and materialize it at the fixed key path.
    pub async fn set_private_key(&mut self, bytes: Vec<u8>) -> Result<(), SettingsError> {
        self.settings.private_key = Some(bytes);
        self.save().await?;
        self.install_key().await
    }

    /// Clear the private key setting and remove the materialized key file.
    pub async fn delete_private_key(&mut self) -> Result<(), SettingsError> {
        self.settings.private_key = None;
        self.save().await?;

        let rsa_path = self.layout.rsa_key_path();
        match fs::remove_file(&rsa_path).await {
            Ok(()) => info!("Removed key file {}", rsa_path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(SettingsError::IoError(format!(
                    "Failed to remove {}: {}",
                    rsa_path.display(),
                    e
                )));
            }
        }
        Ok(())
    }

    /// (Re)write the key file from the persisted blob, if one is set.
    pub async fn install_key(&self) -> Result<(), SettingsError> {
        let Some(bytes) = self.settings.private_key.as_deref() else {
            return Ok(());
        };

        let rsa_path = self.layout.rsa_key_path();
        if let Some(parent) = rsa_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| SettingsError::IoError(format!("Failed to create {}: {}", parent.display(), e)))?;
        }
        fs::write(&rsa_path, bytes)
            .await
            .map_err(|e| SettingsError::IoError(format!("Failed to write {}: {}", rsa_path.display(), e)))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            // ssh refuses group/world readable keys
            let permissions = std::fs::Permissions::from_mode(0o600);
            fs::set_permissions(&rsa_path, permissions)
                .await
                .map_err(|e| SettingsError::IoError(format!("Failed to chmod {}: {}", rsa_path.display(), e)))?;
        }

        debug!("Installed key file at {}", rsa_path.display());
        Ok(())
    }

    /// Credentials for the git transport, pointing at the materialized key.
    pub fn credentials(&self) -> GitCredentials {
        let ssh_key_path = self
            .settings
            .has_private_key()
            .then(|| self.layout.rsa_key_path());
        let passphrase = (!self.settings.passphrase.is_empty()).then(|| self.settings.passphrase.clone());

        GitCredentials {
            ssh_key_path,
            passphrase,
            ..GitCredentials::default()
        }
    }

    async fn save(&self) -> Result<(), SettingsError> {
        let path = self.layout.settings_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| SettingsError::IoError(format!("Failed to create {}: {}", parent.display(), e)))?;
        }

        let json = serde_json::to_vec_pretty(&self.settings)
            .map_err(|e| SettingsError::SerializationError(e.to_string()))?;
        fs::write(&path, json)
            .await
            .map_err(|e| SettingsError::IoError(format!("Failed to write {}: {}", path.display(), e)))
    }
}

impl std::fmt::Debug for SettingsStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsStore")
            .field("layout", &self.layout)
            .field("origin", &self.settings.origin)
            .field("has_private_key", &self.settings.has_private_key())
            .finish()
    }
}
