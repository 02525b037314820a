use async_trait::async_trait;
use dashmap::DashMap;

use crate::modules::preference::domain::{preference_key, PreferenceStore};
use crate::shared::errors::AppResult;

/// Process-lifetime preference store
#[derive(Debug, Default)]
pub struct InMemoryPreferenceStore {
    entries: DashMap<String, String>,
}

impl InMemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl PreferenceStore for InMemoryPreferenceStore {
    async fn get(&self, title: &str) -> Option<String> {
        self.entries
            .get(&preference_key(title))
            .map(|entry| entry.value().clone())
    }

    async fn set(&self, title: &str, source_id: &str) -> AppResult<()> {
        self.entries
            .insert(preference_key(title), source_id.to_string());
        Ok(())
    }

    async fn clear(&self, title: &str) -> AppResult<()> {
        self.entries.remove(&preference_key(title));
        Ok(())
    }
}
