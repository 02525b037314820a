use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

use super::dto::{parse_episodes, parse_search, parse_sources, EpisodeItem, SearchItem};
use crate::modules::provider::domain::entities::{ProviderDescriptor, StreamSource};
use crate::modules::provider::infrastructure::http_client::RequestExecutor;
use crate::shared::utils::logger::LogContext;

/// Sources returned by the first (category, server) pair that had any
#[derive(Debug, Clone)]
pub struct WatchSelection {
    pub category: String,
    pub server: String,
    pub sources: Vec<StreamSource>,
}

/// Typed access to a provider's search, episode and watch endpoints
pub struct ProviderApiClient {
    executor: Arc<RequestExecutor>,
    rate_limiter: Option<DefaultKeyedRateLimiter<String>>,
}

impl ProviderApiClient {
    /// `requests_per_second` paces requests per provider key; `None` or zero
    /// disables pacing.
    pub fn new(executor: Arc<RequestExecutor>, requests_per_second: Option<u32>) -> Self {
        let rate_limiter = requests_per_second
            .and_then(NonZeroU32::new)
            .map(|rate| RateLimiter::keyed(Quota::per_second(rate)));
        Self {
            executor,
            rate_limiter,
        }
    }

    async fn fetch(
        &self,
        provider: &ProviderDescriptor,
        endpoint: &str,
        url: &str,
    ) -> Option<serde_json::Value> {
        if let Some(limiter) = &self.rate_limiter {
            limiter.until_key_ready(&provider.key).await;
        }

        LogContext::api_call(&provider.key, endpoint, "start", None);
        let start = Instant::now();
        let label = format!("{}.{}", provider.key, endpoint);
        let payload = self.executor.get_json(url, &label).await;
        LogContext::api_call(
            &provider.key,
            endpoint,
            if payload.is_some() { "ok" } else { "failed" },
            Some(start.elapsed().as_millis() as u64),
        );
        payload
    }

    pub async fn search(&self, provider: &ProviderDescriptor, query: &str) -> Vec<SearchItem> {
        self.fetch(provider, "search", &provider.search_url(query))
            .await
            .map(|payload| parse_search(&payload))
            .unwrap_or_default()
    }

    /// Episode list from the info endpoint, falling back to the episodes
    /// endpoint when the first yields none.
    pub async fn episodes(&self, provider: &ProviderDescriptor, id: &str) -> Vec<EpisodeItem> {
        let episodes = self
            .fetch(provider, "info", &provider.info_url(id))
            .await
            .map(|payload| parse_episodes(&payload))
            .unwrap_or_default();
        if !episodes.is_empty() {
            return episodes;
        }

        debug!("{}: no episodes in info for {}, trying episodes endpoint", provider.key, id);
        self.fetch(provider, "episodes", &provider.episodes_url(id))
            .await
            .map(|payload| parse_episodes(&payload))
            .unwrap_or_default()
    }

    pub async fn watch(
        &self,
        provider: &ProviderDescriptor,
        episode_id: &str,
        server: &str,
        category: &str,
    ) -> Vec<StreamSource> {
        self.fetch(
            provider,
            "watch",
            &provider.watch_url(episode_id, server, category),
        )
        .await
        .map(|payload| parse_sources(&payload))
        .unwrap_or_default()
    }

    /// Tries categories (outer) then servers (inner), stopping at the first
    /// non-empty source list.
    pub async fn first_sources(
        &self,
        provider: &ProviderDescriptor,
        episode_id: &str,
    ) -> Option<WatchSelection> {
        for category in &provider.categories {
            for server in &provider.servers {
                let sources = self.watch(provider, episode_id, server, category).await;
                if !sources.is_empty() {
                    return Some(WatchSelection {
                        category: category.clone(),
                        server: server.clone(),
                        sources,
                    });
                }
            }
        }
        None
    }
}
