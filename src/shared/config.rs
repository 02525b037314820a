use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use crate::modules::provider::domain::entities::{
    default_catalog, reorder, ProviderDescriptor, DEFAULT_BASE_URL,
};
use crate::modules::provider::domain::services::DEFAULT_SITE_NAME;
use crate::modules::provider::infrastructure::http_client::{RequestHeaders, RetryPolicy};
use crate::modules::provider::infrastructure::monitoring::HealthMonitorConfig;
use crate::shared::errors::{AppError, AppResult};

const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Immutable configuration handed to the resolver at construction
///
/// Feature toggles of the surrounding application are not here: callers
/// decide whether to resolve at all.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ResolverConfig {
    pub request_timeout_ms: u64,
    /// Additional attempts per provider request
    pub max_retries: u32,
    pub retry_base_delay_ms: u64,
    pub retry_step_ms: u64,
    pub retry_max_delay_ms: u64,

    pub health_probe_timeout_ms: u64,
    pub health_ttl_secs: u64,

    /// Search matches inspected per attempt
    pub max_matches_per_search: usize,

    /// Provider tried first; the others keep their configured order
    pub primary_provider: Option<String>,
    pub providers: Vec<ProviderDescriptor>,

    /// Site whose boilerplate ("на {site}", "({site})") is stripped from titles
    pub site_name: String,

    pub user_agent: String,
    pub referer: Option<String>,
    pub origin: Option<String>,

    /// When set, a match without the exact episode contributes nothing
    /// instead of falling back to its first episode.
    pub strict_episode_match: bool,

    /// Per-provider request pacing; `None` disables it
    pub requests_per_second: Option<u32>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: 5000,
            max_retries: 2,
            retry_base_delay_ms: 1000,
            retry_step_ms: 500,
            retry_max_delay_ms: 10_000,
            health_probe_timeout_ms: 3500,
            health_ttl_secs: 5 * 60,
            max_matches_per_search: 3,
            primary_provider: None,
            providers: default_catalog(DEFAULT_BASE_URL),
            site_name: DEFAULT_SITE_NAME.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            referer: Some("https://jut.su/".to_string()),
            origin: Some("https://jut.su".to_string()),
            strict_episode_match: false,
            requests_per_second: None,
        }
    }
}

impl ResolverConfig {
    /// Defaults overridden by `RESOLVER_*` variables (a `.env` file is read first).
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Self::from_env`] with an explicit variable source.
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        let base_url = lookup("RESOLVER_BASE_URL");
        let provider_keys = lookup("RESOLVER_PROVIDERS");
        if base_url.is_some() || provider_keys.is_some() {
            let base = base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
            config.providers = match provider_keys {
                Some(keys) => keys
                    .split(',')
                    .map(str::trim)
                    .filter(|k| !k.is_empty())
                    .map(|k| ProviderDescriptor::new(k, &base))
                    .collect(),
                None => default_catalog(&base),
            };
        }

        if let Some(primary) = lookup("RESOLVER_PRIMARY_PROVIDER") {
            config.primary_provider = Some(primary).filter(|p| !p.trim().is_empty());
        }
        if let Some(site) = lookup("RESOLVER_SITE_NAME") {
            config.site_name = site;
        }
        if let Some(agent) = lookup("RESOLVER_USER_AGENT") {
            config.user_agent = agent;
        }
        if let Some(referer) = lookup("RESOLVER_REFERER") {
            config.referer = Some(referer).filter(|r| !r.is_empty());
        }

        parse_into(&lookup, "RESOLVER_REQUEST_TIMEOUT_MS", &mut config.request_timeout_ms)?;
        parse_into(&lookup, "RESOLVER_MAX_RETRIES", &mut config.max_retries)?;
        parse_into(&lookup, "RESOLVER_HEALTH_TTL_SECS", &mut config.health_ttl_secs)?;
        parse_into(
            &lookup,
            "RESOLVER_HEALTH_PROBE_TIMEOUT_MS",
            &mut config.health_probe_timeout_ms,
        )?;
        parse_into(&lookup, "RESOLVER_MAX_MATCHES", &mut config.max_matches_per_search)?;
        parse_into(&lookup, "RESOLVER_STRICT_EPISODE", &mut config.strict_episode_match)?;

        if let Some(raw) = lookup("RESOLVER_REQUESTS_PER_SECOND") {
            config.requests_per_second = Some(parse_value("RESOLVER_REQUESTS_PER_SECOND", &raw)?);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            AppError::ConfigError(format!("Cannot read {}: {}", path.display(), e))
        })?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.providers.is_empty() {
            return Err(AppError::ConfigError("No providers configured".to_string()));
        }

        let mut seen = HashSet::new();
        for provider in &self.providers {
            if provider.key.trim().is_empty() {
                return Err(AppError::ConfigError("Provider with empty key".to_string()));
            }
            if !seen.insert(provider.key.as_str()) {
                return Err(AppError::ConfigError(format!(
                    "Duplicate provider key: {}",
                    provider.key
                )));
            }
        }

        if self.max_matches_per_search == 0 {
            return Err(AppError::ConfigError(
                "max_matches_per_search must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Configured provider keys with the primary moved to the front.
    pub fn provider_order(&self) -> Vec<String> {
        let keys: Vec<String> = self.providers.iter().map(|p| p.key.clone()).collect();
        reorder(&keys, self.primary_provider.as_deref())
    }

    /// Copy of this config with a different primary provider.
    pub fn with_primary(&self, primary: Option<&str>) -> Self {
        Self {
            primary_provider: primary.map(str::to_string),
            ..self.clone()
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            base_delay: Duration::from_millis(self.retry_base_delay_ms),
            delay_step: Duration::from_millis(self.retry_step_ms),
            max_delay: Duration::from_millis(self.retry_max_delay_ms),
        }
    }

    pub fn health_monitor_config(&self) -> HealthMonitorConfig {
        HealthMonitorConfig {
            ttl: Duration::from_secs(self.health_ttl_secs),
            probe_timeout: Duration::from_millis(self.health_probe_timeout_ms),
        }
    }

    pub fn request_headers(&self) -> RequestHeaders {
        RequestHeaders {
            user_agent: self.user_agent.clone(),
            referer: self.referer.clone(),
            origin: self.origin.clone(),
        }
    }
}

fn parse_value<T: FromStr>(key: &str, raw: &str) -> AppResult<T> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::ConfigError(format!("{} has invalid value '{}'", key, raw)))
}

fn parse_into<F, T>(lookup: &F, key: &str, target: &mut T) -> AppResult<()>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    if let Some(raw) = lookup(key) {
        *target = parse_value(key, &raw)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_engine_constants() {
        let config = ResolverConfig::default();
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
        assert_eq!(config.retry_policy(), RetryPolicy::standard());
        assert_eq!(config.health_monitor_config().ttl, Duration::from_secs(300));
        assert_eq!(
            config.health_monitor_config().probe_timeout,
            Duration::from_millis(3500)
        );
        assert_eq!(config.provider_order(), vec!["gogoanime", "animekai", "aniwatch"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn primary_provider_reorders() {
        let config = ResolverConfig::default().with_primary(Some("aniwatch"));
        assert_eq!(config.provider_order(), vec!["aniwatch", "gogoanime", "animekai"]);
    }

    #[test]
    fn env_overrides_are_applied() {
        let config = ResolverConfig::from_lookup(lookup_from(&[
            ("RESOLVER_BASE_URL", "http://local.test/"),
            ("RESOLVER_PROVIDERS", "zoro, gogoanime"),
            ("RESOLVER_PRIMARY_PROVIDER", "gogoanime"),
            ("RESOLVER_MAX_RETRIES", "4"),
            ("RESOLVER_STRICT_EPISODE", "true"),
            ("RESOLVER_REQUESTS_PER_SECOND", "3"),
        ]))
        .unwrap();

        assert_eq!(config.provider_order(), vec!["gogoanime", "zoro"]);
        assert_eq!(config.providers[0].base_search_url, "http://local.test");
        assert_eq!(config.max_retries, 4);
        assert!(config.strict_episode_match);
        assert_eq!(config.requests_per_second, Some(3));
    }

    #[test]
    fn invalid_env_values_are_rejected() {
        let result = ResolverConfig::from_lookup(lookup_from(&[("RESOLVER_MAX_RETRIES", "many")]));
        assert!(matches!(result, Err(AppError::ConfigError(_))));
    }

    #[test]
    fn duplicate_providers_are_rejected() {
        let mut config = ResolverConfig::default();
        config.providers.push(config.providers[0].clone());
        assert!(matches!(config.validate(), Err(AppError::ConfigError(_))));

        config.providers.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_json_uses_defaults() {
        let config: ResolverConfig =
            serde_json::from_str(r#"{"primary_provider": "animekai", "max_retries": 1}"#).unwrap();
        assert_eq!(config.max_retries, 1);
        assert_eq!(config.request_timeout_ms, 5000);
        assert_eq!(config.provider_order()[0], "animekai");
    }

    #[test]
    fn json_file_is_loaded_and_validated() {
        let dir = std::env::temp_dir().join(format!("resolver-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let good = dir.join("good.json");
        std::fs::write(&good, r#"{"strict_episode_match": true}"#).unwrap();
        let config = ResolverConfig::from_json_file(&good).unwrap();
        assert!(config.strict_episode_match);

        let empty = dir.join("empty-providers.json");
        std::fs::write(&empty, r#"{"providers": []}"#).unwrap();
        assert!(matches!(
            ResolverConfig::from_json_file(&empty),
            Err(AppError::ConfigError(_))
        ));

        assert!(ResolverConfig::from_json_file(dir.join("missing.json")).is_err());
    }
}
