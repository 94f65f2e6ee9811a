//! On-disk layout of the application's storage
//!
//! Two roots: a documents directory holding the note tree (the default project
//! at its top level, folders as nested projects) and an application-support
//! directory holding everything the sync machinery needs: the `Repositories`
//! folder (one subdirectory per cloned/initialized repository), the
//! materialized `id_rsa` private key and the persisted settings document.

use std::path::{Path, PathBuf};

/// Reserved repository directory name, excluded from listings.
pub const TMP_REPOSITORY_NAME: &str = "tmp";

/// File name of the materialized private key.
pub const RSA_KEY_FILE: &str = "id_rsa";

/// File name of the persisted settings document.
pub const SETTINGS_FILE: &str = "settings.json";

/// Paths used by the storage and sync subsystems.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageLayout {
    app_support: PathBuf,
    documents: PathBuf,
}

impl StorageLayout {
    pub fn new(app_support: impl AsRef<Path>, documents: impl AsRef<Path>) -> Self {
        Self {
            app_support: app_support.as_ref().to_path_buf(),
            documents: documents.as_ref().to_path_buf(),
        }
    }

    /// Root of the note tree.
    pub fn documents_dir(&self) -> &Path {
        &self.documents
    }

    pub fn app_support_dir(&self) -> &Path {
        &self.app_support
    }

    /// Folder containing one subdirectory per repository.
    pub fn repositories_dir(&self) -> PathBuf {
        self.app_support.join("Repositories")
    }

    /// Git directory for a named repository.
    pub fn repository_path(&self, name: &str) -> PathBuf {
        self.repositories_dir().join(name)
    }

    /// Fixed path of the materialized private key.
    pub fn rsa_key_path(&self) -> PathBuf {
        self.app_support.join(RSA_KEY_FILE)
    }

    pub fn settings_path(&self) -> PathBuf {
        self.app_support.join(SETTINGS_FILE)
    }
}
