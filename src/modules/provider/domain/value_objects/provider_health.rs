use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::Instant;

/// What a health probe observed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "code", rename_all = "snake_case")]
pub enum ProbeStatus {
    Http(u16),
    Timeout,
    NetworkError,
}

impl ProbeStatus {
    /// Anything that answered below 500 counts as up; some providers reject
    /// the canned probe query with a 4xx while serving real requests fine.
    pub fn is_available(&self) -> bool {
        matches!(self, ProbeStatus::Http(code) if (200..500).contains(code))
    }
}

/// Result of the latest probe for one provider
#[derive(Debug, Clone)]
pub struct HealthRecord {
    pub available: bool,
    pub status: ProbeStatus,
    /// Wall-clock time of the probe, for diagnostics
    pub checked_at: DateTime<Utc>,
    /// Monotonic time of the probe, for TTL checks
    probed_at: Instant,
}

impl HealthRecord {
    pub fn new(status: ProbeStatus) -> Self {
        Self {
            available: status.is_available(),
            status,
            checked_at: Utc::now(),
            probed_at: Instant::now(),
        }
    }

    pub fn age(&self) -> Duration {
        self.probed_at.elapsed()
    }

    pub fn is_fresh(&self, ttl: Duration) -> bool {
        self.age() < ttl
    }

    pub fn to_snapshot(&self, provider: &str) -> HealthSnapshot {
        HealthSnapshot {
            provider: provider.to_string(),
            available: self.available,
            status: self.status,
            checked_at: self.checked_at.to_rfc3339(),
            age_ms: self.age().as_millis() as u64,
        }
    }
}

/// Serializable view of a [`HealthRecord`]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthSnapshot {
    pub provider: String,
    pub available: bool,
    pub status: ProbeStatus,
    pub checked_at: String, // ISO 8601 timestamp
    pub age_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_boundaries() {
        assert!(ProbeStatus::Http(200).is_available());
        assert!(ProbeStatus::Http(404).is_available());
        assert!(ProbeStatus::Http(499).is_available());
        assert!(!ProbeStatus::Http(500).is_available());
        assert!(!ProbeStatus::Http(503).is_available());
        assert!(!ProbeStatus::Http(199).is_available());
        assert!(!ProbeStatus::Timeout.is_available());
        assert!(!ProbeStatus::NetworkError.is_available());
    }

    #[tokio::test(start_paused = true)]
    async fn record_goes_stale_after_ttl() {
        let record = HealthRecord::new(ProbeStatus::Http(200));
        let ttl = Duration::from_secs(300);
        assert!(record.is_fresh(ttl));

        tokio::time::advance(Duration::from_secs(301)).await;
        assert!(!record.is_fresh(ttl));
    }
}
