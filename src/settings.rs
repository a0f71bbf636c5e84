use crate::errors::StoreError;
use crate::models::Settings;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

/// The JSON settings document on disk.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the document, seeding it with defaults first when the file does
    /// not exist. A file that exists but does not parse is an error.
    pub async fn load(&self) -> Result<Settings, StoreError> {
        if !fs::try_exists(&self.path).await? {
            info!(path = %self.path.display(), "settings file missing, writing defaults");
            self.save(&Settings::default()).await?;
        }

        let bytes = fs::read(&self.path).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Overwrites the whole document.
    pub async fn save(&self, settings: &Settings) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let payload = serde_json::to_vec_pretty(settings)?;
        fs::write(&self.path, payload).await?;
        Ok(())
    }
}
