//! Durable storage for the Google credential.

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::credential::Credential;
use crate::error::AuthError;

/// Persistence for a single credential record. No locking is provided here;
/// `CredentialProvider` serializes access.
pub trait CredentialStore: Send + Sync {
    fn load(&self) -> Result<Option<Credential>, AuthError>;
    fn save(&self, credential: &Credential) -> Result<(), AuthError>;
}

/// Stores the credential as a TOML file.
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileCredentialStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<Option<Credential>, AuthError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&self.path)?;

        let credential = toml::from_str(&contents).map_err(|e| {
            AuthError::Store(format!(
                "Failed to parse credential from {}: {}",
                self.path.display(),
                e
            ))
        })?;

        Ok(Some(credential))
    }

    fn save(&self, credential: &Credential) -> Result<(), AuthError> {
        let contents = toml::to_string_pretty(credential)
            .map_err(|e| AuthError::Store(format!("Failed to serialize credential: {}", e)))?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // Replaced atomically: write a sibling file, then rename it over the old one.
        let staging = self.staging_path();
        match std::fs::remove_file(&staging) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => return Err(e.into()),
            _ => {}
        }
        let mut file = open_owner_only(&staging)?;
        file.write_all(contents.as_bytes())?;
        file.sync_all()?;
        drop(file);

        std::fs::rename(&staging, &self.path)?;

        Ok(())
    }
}

/// Create `path` readable by the owner only; the file holds OAuth tokens.
fn open_owner_only(path: &Path) -> std::io::Result<std::fs::File> {
    let mut options = std::fs::OpenOptions::new();
    options.write(true).create_new(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    options.open(path)
}
