use serde::{Deserialize, Serialize};

/// Default Consumet-compatible API host shared by the built-in providers.
pub const DEFAULT_BASE_URL: &str = "https://consumet-api-yij6.onrender.com";

/// Static description of one upstream content provider
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProviderDescriptor {
    pub key: String,
    /// API base URL; search/episode/watch paths are appended to it
    pub base_search_url: String,
    /// Servers in the order they are tried
    pub servers: Vec<String>,
    /// Categories (sub/dub/raw) in the order they are tried
    pub categories: Vec<String>,
    pub health_probe_url: String,
}

impl ProviderDescriptor {
    pub fn new(key: &str, base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            key: key.to_string(),
            base_search_url: base.to_string(),
            servers: ["hd-1", "vidstreaming", "megacloud"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            categories: ["sub", "dub", "raw"].iter().map(|s| s.to_string()).collect(),
            health_probe_url: format!("{}/anime/{}", base, key),
        }
    }

    pub fn with_servers(mut self, servers: &[&str]) -> Self {
        self.servers = dedup_ordered(servers.iter().map(|s| s.to_string()));
        self
    }

    pub fn with_categories(mut self, categories: &[&str]) -> Self {
        self.categories = dedup_ordered(categories.iter().map(|s| s.to_string()));
        self
    }

    pub fn with_health_probe_url(mut self, url: &str) -> Self {
        self.health_probe_url = url.to_string();
        self
    }

    /// `GET {base}/anime/{key}/{query}?page=1`
    pub fn search_url(&self, query: &str) -> String {
        format!(
            "{}/anime/{}/{}?page=1",
            self.base_search_url,
            self.key,
            urlencoding::encode(query)
        )
    }

    pub fn info_url(&self, id: &str) -> String {
        format!(
            "{}/anime/{}/info/{}",
            self.base_search_url,
            self.key,
            urlencoding::encode(id)
        )
    }

    pub fn episodes_url(&self, id: &str) -> String {
        format!(
            "{}/anime/{}/episodes/{}",
            self.base_search_url,
            self.key,
            urlencoding::encode(id)
        )
    }

    pub fn watch_url(&self, episode_id: &str, server: &str, category: &str) -> String {
        format!(
            "{}/anime/{}/watch/{}?server={}&category={}",
            self.base_search_url,
            self.key,
            urlencoding::encode(episode_id),
            urlencoding::encode(server),
            urlencoding::encode(category)
        )
    }
}

/// Built-in provider catalog, in its fixed order.
pub fn default_catalog(base_url: &str) -> Vec<ProviderDescriptor> {
    ["gogoanime", "animekai", "aniwatch"]
        .iter()
        .map(|key| ProviderDescriptor::new(key, base_url))
        .collect()
}

/// Puts `primary` first and keeps the rest in their original order.
///
/// Unknown or missing primaries fall back to the first entry of `order`.
/// Duplicates in `order` are dropped.
pub fn reorder(order: &[String], primary: Option<&str>) -> Vec<String> {
    let order = dedup_ordered(order.iter().cloned());
    let Some(first) = primary
        .filter(|p| order.iter().any(|k| k == p))
        .map(str::to_string)
        .or_else(|| order.first().cloned())
    else {
        return Vec::new();
    };

    let mut result = Vec::with_capacity(order.len());
    result.push(first.clone());
    result.extend(order.into_iter().filter(|k| *k != first));
    result
}

/// Provider that follows `current` in `order`, wrapping around.
pub fn next_primary(order: &[String], current: Option<&str>) -> Option<String> {
    if order.is_empty() {
        return None;
    }
    let next = match current.and_then(|c| order.iter().position(|k| k == c)) {
        Some(index) => (index + 1) % order.len(),
        None => 0,
    };
    order.get(next).cloned()
}

fn dedup_ordered(items: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    items.filter(|item| seen.insert(item.clone())).collect()
}
