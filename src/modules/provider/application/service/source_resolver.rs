use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::modules::provider::application::dto::{ResolutionOutcome, ResolveRequest, TitleInput};
use crate::modules::provider::domain::entities::{
    reorder, EpisodeContext, ProviderDescriptor, SourceResult,
};
use crate::modules::provider::domain::services::TitleNormalizer;
use crate::modules::provider::infrastructure::external::{EpisodeItem, ProviderApiClient};
use crate::modules::provider::infrastructure::http_client::{
    HttpTransport, ReqwestTransport, RequestExecutor,
};
use crate::modules::provider::infrastructure::monitoring::ProviderHealthMonitor;
use crate::shared::config::ResolverConfig;
use crate::shared::errors::AppResult;
use crate::shared::utils::logger::{LogContext, TimedOperation};

/// Receives progress of a running resolution
pub trait ProgressReporter: Send + Sync {
    /// Called after every search attempt, `attempt` is 1-based.
    fn on_attempt(&self, attempt: usize, total: usize);

    /// Called once when the search loop ends with or without a match.
    fn on_complete(&self, success: bool);
}

/// Reports progress through the log
pub struct LogProgressReporter;

impl ProgressReporter for LogProgressReporter {
    fn on_attempt(&self, attempt: usize, total: usize) {
        debug!("Resolution progress: {}/{}", attempt, total);
    }

    fn on_complete(&self, success: bool) {
        debug!("Resolution complete: success={}", success);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionState {
    Idle,
    CheckingHealth,
    Searching,
    Found,
    Exhausted,
    Aborted,
}

impl fmt::Display for ResolutionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::CheckingHealth => "checking_health",
            Self::Searching => "searching",
            Self::Found => "found",
            Self::Exhausted => "exhausted",
            Self::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

/// Tracks the state of one resolution call
struct StateTracker {
    state: ResolutionState,
}

impl StateTracker {
    fn new() -> Self {
        Self {
            state: ResolutionState::Idle,
        }
    }

    fn advance(&mut self, next: ResolutionState) {
        debug!("Resolution state: {} -> {}", self.state, next);
        self.state = next;
    }
}

/// Selects the episode whose declared number equals `wanted`.
///
/// Without an exact match the first episode is used, unless `strict` is set.
/// With no wanted number the first episode is used.
pub fn pick_episode(episodes: &[EpisodeItem], wanted: Option<u32>, strict: bool) -> Option<&EpisodeItem> {
    let Some(wanted) = wanted else {
        return episodes.first();
    };

    let wanted = wanted.to_string();
    let exact = episodes
        .iter()
        .find(|ep| ep.declared_number().as_deref() == Some(wanted.as_str()));

    match exact {
        Some(episode) => Some(episode),
        None if strict => None,
        None => {
            if !episodes.is_empty() {
                debug!("Episode {} not listed, falling back to the first episode", wanted);
            }
            episodes.first()
        }
    }
}

/// Orchestrates health gating and the provider x title search loop
pub struct SourceResolver {
    config: ResolverConfig,
    normalizer: TitleNormalizer,
    health: Arc<ProviderHealthMonitor>,
    client: ProviderApiClient,
    reporter: Arc<dyn ProgressReporter>,
}

impl SourceResolver {
    /// Resolver talking to the network through `reqwest`.
    pub fn new(config: ResolverConfig) -> AppResult<Self> {
        let transport = Arc::new(ReqwestTransport::new(&config.request_headers())?);
        Self::with_transport(config, transport)
    }

    pub fn with_transport(config: ResolverConfig, transport: Arc<dyn HttpTransport>) -> AppResult<Self> {
        config.validate()?;

        let normalizer = TitleNormalizer::for_site(&config.site_name)?;
        let health = Arc::new(ProviderHealthMonitor::new(
            transport.clone(),
            &config.providers,
            config.health_monitor_config(),
        ));
        let executor = Arc::new(RequestExecutor::new(
            transport,
            config.request_timeout(),
            config.retry_policy(),
        ));
        let client = ProviderApiClient::new(executor, config.requests_per_second);

        Ok(Self {
            config,
            normalizer,
            health,
            client,
            reporter: Arc::new(LogProgressReporter),
        })
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn health_monitor(&self) -> &Arc<ProviderHealthMonitor> {
        &self.health
    }

    /// Title candidates this request will be searched with, in order.
    pub fn candidates_for(&self, request: &ResolveRequest) -> Vec<String> {
        match &request.title {
            TitleInput::Raw(raw) => self.normalizer.generate_candidates(
                Some(raw),
                request.episode.episode,
                request.page_path.as_deref(),
            ),
            TitleInput::Candidates(titles) => {
                let mut seen = HashSet::new();
                titles
                    .iter()
                    .map(|t| t.split_whitespace().collect::<Vec<_>>().join(" "))
                    .filter(|t| !t.is_empty())
                    .filter(|t| seen.insert(t.clone()))
                    .collect()
            }
        }
    }

    /// Runs one resolution to its terminal outcome.
    ///
    /// Providers are tried in order, each with every title candidate, and
    /// the loop stops at the first attempt that yields a playable source.
    pub async fn resolve(&self, request: ResolveRequest) -> ResolutionOutcome {
        let timer = TimedOperation::new("source_resolution");
        let mut tracker = StateTracker::new();

        let titles = self.candidates_for(&request);
        if titles.is_empty() {
            warn!("No usable title candidates for {:?}", request.title);
            tracker.advance(ResolutionState::Aborted);
            return ResolutionOutcome::NoTitle;
        }

        tracker.advance(ResolutionState::CheckingHealth);
        // an override keeps its own order, minus repeated keys
        let order = match &request.provider_order {
            Some(order) => reorder(order, None),
            None => self.config.provider_order(),
        };
        let providers = match self.health.get_available_providers(&order).await {
            Ok(providers) => providers,
            Err(e) => {
                warn!("Resolution aborted: {}", e);
                tracker.advance(ResolutionState::Aborted);
                return ResolutionOutcome::NoProviderAvailable;
            }
        };

        tracker.advance(ResolutionState::Searching);
        let total = titles.len() * providers.len();
        let mut attempts = 0;

        for provider in &providers {
            for title in &titles {
                attempts += 1;
                LogContext::search_attempt(attempts, total, &provider.key, title);

                let results = self.search_attempt(provider, title, &request.episode).await;
                self.reporter.on_attempt(attempts, total);

                if !results.is_empty() {
                    tracker.advance(ResolutionState::Found);
                    self.reporter.on_complete(true);
                    LogContext::resolution_done(true, attempts, Some(&provider.key));
                    timer.finish_with_info(&format!("{} result(s)", results.len()));

                    return ResolutionOutcome::Found {
                        results,
                        used_title: title.clone(),
                        used_provider: provider.key.clone(),
                        attempts,
                    };
                }
            }
        }

        tracker.advance(ResolutionState::Exhausted);
        self.reporter.on_complete(false);
        LogContext::resolution_done(false, attempts, None);
        timer.finish();
        ResolutionOutcome::NotFound { attempts }
    }

    /// Spawns [`Self::resolve`] and hands its outcome to `callback` as
    /// `(results, used_title, used_provider)`.
    pub fn resolve_with_callback<F>(self: &Arc<Self>, request: ResolveRequest, callback: F) -> JoinHandle<()>
    where
        F: FnOnce(Option<Vec<SourceResult>>, Option<String>, Option<String>) + Send + 'static,
    {
        let resolver = Arc::clone(self);
        tokio::spawn(async move {
            let (results, used_title, used_provider) =
                resolver.resolve(request).await.into_callback_args();
            callback(results, used_title, used_provider);
        })
    }

    /// One (provider, title) attempt: playable results of the first
    /// `max_matches_per_search` search matches.
    async fn search_attempt(
        &self,
        provider: &ProviderDescriptor,
        title: &str,
        episode: &EpisodeContext,
    ) -> Vec<SourceResult> {
        let matches = self.client.search(provider, title).await;
        if matches.is_empty() {
            debug!("{}: no matches for '{}'", provider.key, title);
            return Vec::new();
        }

        let mut results = Vec::new();
        for item in matches.iter().take(self.config.max_matches_per_search) {
            let Some(id) = item.id() else {
                continue;
            };

            let episodes = self.client.episodes(provider, &id).await;
            let Some(selected) = pick_episode(&episodes, episode.episode, self.config.strict_episode_match) else {
                debug!("{}: no usable episode for {}", provider.key, id);
                continue;
            };
            let Some(episode_id) = selected.watch_id() else {
                continue;
            };

            let Some(selection) = self.client.first_sources(provider, &episode_id).await else {
                debug!("{}: no sources for {}", provider.key, episode_id);
                continue;
            };

            let result = SourceResult::from_sources(
                &id,
                &item.display_title(),
                &provider.key,
                &selection.sources,
            );
            if result.is_playable() {
                info!(
                    "{}: sources for '{}' via {}/{}",
                    provider.key, id, selection.category, selection.server
                );
                results.push(result);
            }
        }
        results
    }
}
