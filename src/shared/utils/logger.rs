use log::{debug, info};
use std::sync::Once;

static INIT: Once = Once::new();
static INIT_TRACING: Once = Once::new();

/// Initialize the `log` backend.
/// This should be called once at application startup
pub fn init_logger() {
    INIT.call_once(|| {
        let _ = env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info) // Default level
            .filter_module("source_resolver_lib", log::LevelFilter::Debug)
            .filter_module("reqwest", log::LevelFilter::Warn) // Reduce HTTP noise
            .filter_module("hyper", log::LevelFilter::Warn)
            .filter_module("tokio", log::LevelFilter::Warn)
            .format_timestamp_secs()
            .format_target(false)
            .format_module_path(false)
            .try_init();

        info!("Logging system initialized");
    });
}

/// Initialize the `tracing` subscriber used by the network and resolver layers.
pub fn init_tracing(verbose: bool) {
    INIT_TRACING.call_once(|| {
        let level = if verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        };
        let _ = tracing_subscriber::fmt()
            .with_max_level(level)
            .with_target(false)
            .try_init();
    });
}

/// Structured logging helpers for common patterns
pub struct LogContext;

impl LogContext {
    /// Log API calls
    pub fn api_call(provider: &str, endpoint: &str, status: &str, duration_ms: Option<u64>) {
        match duration_ms {
            Some(duration) => debug!(
                "API: {} {} {} in {}ms",
                provider, endpoint, status, duration
            ),
            None => debug!("API: Starting {} {}", provider, endpoint),
        }
    }

    /// Log one provider x title search attempt
    pub fn search_attempt(attempt: usize, total: usize, provider: &str, title: &str) {
        let shown: String = title.chars().take(50).collect();
        let ellipsis = if title.chars().count() > 50 { "..." } else { "" };
        debug!(
            "Search: [{}/{}] '{}{}' via {}",
            attempt, total, shown, ellipsis, provider
        );
    }

    /// Log the end of a resolution
    pub fn resolution_done(found: bool, attempts: usize, provider: Option<&str>) {
        match (found, provider) {
            (true, Some(p)) => info!("Resolution: found sources via {} after {} attempts", p, attempts),
            (true, None) => info!("Resolution: found sources after {} attempts", attempts),
            (false, _) => info!("Resolution: no sources after {} attempts", attempts),
        }
    }

    /// Log performance metrics
    pub fn performance_metric(operation: &str, duration_ms: u64, additional_info: Option<&str>) {
        match additional_info {
            Some(info) => info!(
                "Performance: {} took {}ms ({})",
                operation, duration_ms, info
            ),
            None => info!("Performance: {} took {}ms", operation, duration_ms),
        }
    }
}

/// Helper for timing operations
pub struct TimedOperation {
    start: std::time::Instant,
    operation: String,
}

impl TimedOperation {
    pub fn new(operation: &str) -> Self {
        debug!("Starting: {}", operation);
        Self {
            start: std::time::Instant::now(),
            operation: operation.to_string(),
        }
    }

    pub fn finish(self) -> u64 {
        let duration = self.start.elapsed().as_millis() as u64;
        LogContext::performance_metric(&self.operation, duration, None);
        duration
    }

    pub fn finish_with_info(self, info: &str) -> u64 {
        let duration = self.start.elapsed().as_millis() as u64;
        LogContext::performance_metric(&self.operation, duration, Some(info));
        duration
    }
}
