use dashmap::DashMap;
use futures::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::modules::provider::{
    domain::{
        entities::ProviderDescriptor,
        value_objects::{HealthRecord, HealthSnapshot, ProbeStatus},
    },
    infrastructure::http_client::{HttpTransport, TransportError},
};
use crate::shared::errors::{AppError, AppResult};

/// Configuration for health monitoring
#[derive(Debug, Clone)]
pub struct HealthMonitorConfig {
    /// How long a probe result is trusted
    pub ttl: Duration,
    /// Upper bound for a single probe
    pub probe_timeout: Duration,
}

impl Default for HealthMonitorConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(5 * 60),
            probe_timeout: Duration::from_millis(3500),
        }
    }
}

/// TTL-cached availability probe per provider
///
/// The record map is the only place health state lives; every read goes
/// through [`ProviderHealthMonitor::check_health`], which owns the TTL check.
pub struct ProviderHealthMonitor {
    transport: Arc<dyn HttpTransport>,
    providers: HashMap<String, ProviderDescriptor>,
    records: DashMap<String, HealthRecord>,
    config: HealthMonitorConfig,
}

impl ProviderHealthMonitor {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        providers: &[ProviderDescriptor],
        config: HealthMonitorConfig,
    ) -> Self {
        Self {
            transport,
            providers: providers
                .iter()
                .map(|p| (p.key.clone(), p.clone()))
                .collect(),
            records: DashMap::new(),
            config,
        }
    }

    /// Whether `provider_key` should be tried, probing only when the cached
    /// record is missing or older than the TTL.
    pub async fn check_health(&self, provider_key: &str) -> bool {
        let cached = self
            .records
            .get(provider_key)
            .filter(|record| record.is_fresh(self.config.ttl))
            .map(|record| record.available);
        if let Some(available) = cached {
            debug!(
                "Health cache hit for {}: {}",
                provider_key,
                if available { "up" } else { "down" }
            );
            return available;
        }

        let Some(provider) = self.providers.get(provider_key) else {
            warn!("Health check requested for unknown provider {}", provider_key);
            return false;
        };

        let status = self.probe(provider).await;
        let record = HealthRecord::new(status);
        let available = record.available;
        self.records.insert(provider_key.to_string(), record);

        if available {
            debug!("Provider {} is healthy ({:?})", provider_key, status);
        } else {
            warn!("Provider {} is unavailable ({:?})", provider_key, status);
        }
        available
    }

    async fn probe(&self, provider: &ProviderDescriptor) -> ProbeStatus {
        let request = self
            .transport
            .get(&provider.health_probe_url, self.config.probe_timeout);

        match tokio::time::timeout(self.config.probe_timeout, request).await {
            Ok(Ok(response)) => ProbeStatus::Http(response.status),
            Ok(Err(TransportError::Timeout)) | Err(_) => ProbeStatus::Timeout,
            Ok(Err(TransportError::Network(e))) => {
                debug!("Health probe for {} failed: {}", provider.key, e);
                ProbeStatus::NetworkError
            }
        }
    }

    /// Probes every provider in `order` concurrently and keeps the healthy
    /// ones, in their original order.
    pub async fn get_available_providers(
        &self,
        order: &[String],
    ) -> AppResult<Vec<ProviderDescriptor>> {
        let checks = order.iter().map(|key| self.check_health(key));
        let health = join_all(checks).await;

        let available: Vec<ProviderDescriptor> = order
            .iter()
            .zip(health)
            .filter(|(_, healthy)| *healthy)
            .filter_map(|(key, _)| self.providers.get(key).cloned())
            .collect();

        if available.is_empty() {
            return Err(AppError::NoProviderAvailable(format!(
                "none of [{}] passed the health check",
                order.join(", ")
            )));
        }

        info!(
            "{}/{} providers available: {}",
            available.len(),
            order.len(),
            available
                .iter()
                .map(|p| p.key.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
        Ok(available)
    }

    /// Current records, for diagnostics
    pub fn snapshot(&self) -> Vec<HealthSnapshot> {
        let mut snapshots: Vec<HealthSnapshot> = self
            .records
            .iter()
            .map(|entry| entry.value().to_snapshot(entry.key()))
            .collect();
        snapshots.sort_by(|a, b| a.provider.cmp(&b.provider));
        snapshots
    }

    /// Drop the record for one provider so the next check probes again.
    pub fn invalidate(&self, provider_key: &str) {
        if self.records.remove(provider_key).is_some() {
            info!("Invalidated health record for {}", provider_key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::provider::infrastructure::http_client::transport::{
        MockHttpTransport, TransportResponse,
    };
    use async_trait::async_trait;

    fn providers() -> Vec<ProviderDescriptor> {
        vec![
            ProviderDescriptor::new("alpha", "http://alpha.test"),
            ProviderDescriptor::new("beta", "http://beta.test"),
            ProviderDescriptor::new("gamma", "http://gamma.test"),
        ]
    }

    fn monitor(mock: MockHttpTransport) -> ProviderHealthMonitor {
        ProviderHealthMonitor::new(Arc::new(mock), &providers(), HealthMonitorConfig::default())
    }

    fn keys(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn not_found_probe_counts_as_healthy() {
        let mut mock = MockHttpTransport::new();
        mock.expect_get()
            .times(1)
            .returning(|_, _| Ok(TransportResponse::new(404, "not found")));

        assert!(monitor(mock).check_health("alpha").await);
    }

    #[tokio::test]
    async fn server_error_and_timeout_are_unhealthy() {
        let mut mock = MockHttpTransport::new();
        mock.expect_get()
            .withf(|url, _| url.starts_with("http://alpha.test"))
            .times(1)
            .returning(|_, _| Ok(TransportResponse::new(503, "")));
        mock.expect_get()
            .withf(|url, _| url.starts_with("http://beta.test"))
            .times(1)
            .returning(|_, _| Err(TransportError::Timeout));
        mock.expect_get()
            .withf(|url, _| url.starts_with("http://gamma.test"))
            .times(1)
            .returning(|_, _| Err(TransportError::Network("refused".to_string())));

        let monitor = monitor(mock);
        assert!(!monitor.check_health("alpha").await);
        assert!(!monitor.check_health("beta").await);
        assert!(!monitor.check_health("gamma").await);
        assert_eq!(monitor.snapshot().len(), 3);
    }

    #[tokio::test]
    async fn second_check_within_ttl_uses_cache() {
        let mut mock = MockHttpTransport::new();
        mock.expect_get()
            .times(1)
            .returning(|_, _| Ok(TransportResponse::new(200, "{}")));

        let monitor = monitor(mock);
        assert!(monitor.check_health("alpha").await);
        assert!(monitor.check_health("alpha").await);
    }

    #[tokio::test]
    async fn unhealthy_results_are_cached_too() {
        let mut mock = MockHttpTransport::new();
        mock.expect_get()
            .times(1)
            .returning(|_, _| Err(TransportError::Timeout));

        let monitor = monitor(mock);
        assert!(!monitor.check_health("beta").await);
        assert!(!monitor.check_health("beta").await);
    }

    #[tokio::test(start_paused = true)]
    async fn stale_record_triggers_new_probe() {
        let mut mock = MockHttpTransport::new();
        mock.expect_get()
            .times(2)
            .returning(|_, _| Ok(TransportResponse::new(200, "{}")));

        let monitor = monitor(mock);
        assert!(monitor.check_health("alpha").await);
        tokio::time::advance(Duration::from_secs(5 * 60 + 1)).await;
        assert!(monitor.check_health("alpha").await);
    }

    #[tokio::test]
    async fn invalidate_forces_new_probe() {
        let mut mock = MockHttpTransport::new();
        mock.expect_get()
            .times(2)
            .returning(|_, _| Ok(TransportResponse::new(200, "{}")));

        let monitor = monitor(mock);
        assert!(monitor.check_health("alpha").await);
        monitor.invalidate("alpha");
        assert!(monitor.check_health("alpha").await);
    }

    #[tokio::test]
    async fn unknown_provider_is_unhealthy_without_probe() {
        let mut mock = MockHttpTransport::new();
        mock.expect_get().times(0);

        assert!(!monitor(mock).check_health("nope").await);
    }

    #[tokio::test]
    async fn available_providers_keep_order() {
        let mut mock = MockHttpTransport::new();
        mock.expect_get().returning(|url, _| {
            if url.starts_with("http://beta.test") {
                Ok(TransportResponse::new(502, ""))
            } else {
                Ok(TransportResponse::new(200, "{}"))
            }
        });

        let monitor = monitor(mock);
        let available = monitor
            .get_available_providers(&keys(&["gamma", "beta", "alpha"]))
            .await
            .unwrap();
        let available: Vec<&str> = available.iter().map(|p| p.key.as_str()).collect();
        assert_eq!(available, vec!["gamma", "alpha"]);
    }

    #[tokio::test]
    async fn no_available_provider_is_an_error() {
        let mut mock = MockHttpTransport::new();
        mock.expect_get()
            .returning(|_, _| Ok(TransportResponse::new(500, "")));

        let result = monitor(mock)
            .get_available_providers(&keys(&["alpha", "beta"]))
            .await;
        assert!(matches!(result, Err(AppError::NoProviderAvailable(_))));
    }

    struct SlowTransport;

    #[async_trait]
    impl HttpTransport for SlowTransport {
        async fn get(
            &self,
            _url: &str,
            _timeout: Duration,
        ) -> Result<TransportResponse, TransportError> {
            tokio::time::sleep(Duration::from_secs(1)).await;
            Ok(TransportResponse::new(200, "{}"))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn probes_run_concurrently() {
        let monitor = ProviderHealthMonitor::new(
            Arc::new(SlowTransport),
            &providers(),
            HealthMonitorConfig::default(),
        );

        let start = tokio::time::Instant::now();
        let available = monitor
            .get_available_providers(&keys(&["alpha", "beta", "gamma"]))
            .await
            .unwrap();

        assert_eq!(available.len(), 3);
        assert!(start.elapsed() < Duration::from_millis(1500));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_probe_is_cut_off() {
        let monitor = ProviderHealthMonitor::new(
            Arc::new(SlowTransport),
            &providers(),
            HealthMonitorConfig {
                ttl: Duration::from_secs(300),
                probe_timeout: Duration::from_millis(500),
            },
        );

        assert!(!monitor.check_health("alpha").await);
        assert_eq!(monitor.snapshot()[0].status, ProbeStatus::Timeout);
    }
}
