use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::modules::preference::domain::{preference_key, PreferenceStore};
use crate::shared::errors::{AppError, AppResult};

/// Preference store backed by a single JSON object on disk
///
/// The whole file is rewritten on every mutation.
#[derive(Debug)]
pub struct JsonFilePreferenceStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl JsonFilePreferenceStore {
    /// Loads `path`, starting empty when the file does not exist yet.
    pub async fn open(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = match tokio::fs::read_to_string(&path).await {
            Ok(text) if text.trim().is_empty() => BTreeMap::new(),
            Ok(text) => serde_json::from_str(&text).map_err(|e| {
                AppError::SerializationError(format!(
                    "Preference file {} is corrupt: {}",
                    path.display(),
                    e
                ))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No preference file at {}, starting empty", path.display());
                BTreeMap::new()
            }
            Err(e) => return Err(e.into()),
        };

        info!("Loaded {} preference(s) from {}", entries.len(), path.display());
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, entries: &BTreeMap<String, String>) -> AppResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(entries)?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }
}

#[async_trait]
impl PreferenceStore for JsonFilePreferenceStore {
    async fn get(&self, title: &str) -> Option<String> {
        self.entries.lock().await.get(&preference_key(title)).cloned()
    }

    async fn set(&self, title: &str, source_id: &str) -> AppResult<()> {
        let mut entries = self.entries.lock().await;
        entries.insert(preference_key(title), source_id.to_string());
        self.persist(&entries).await
    }

    async fn clear(&self, title: &str) -> AppResult<()> {
        let mut entries = self.entries.lock().await;
        if entries.remove(&preference_key(title)).is_some() {
            self.persist(&entries).await?;
        }
        Ok(())
    }
}
