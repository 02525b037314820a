use serde::Serialize;

use crate::modules::provider::domain::entities::SourceResult;

/// Arguments handed to a resolution callback:
/// `(results, used_title, used_provider)`
pub type CallbackArgs = (Option<Vec<SourceResult>>, Option<String>, Option<String>);

/// Terminal result of one resolution call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ResolutionOutcome {
    /// Results of the single attempt that succeeded
    Found {
        results: Vec<SourceResult>,
        #[serde(rename = "usedTitle")]
        used_title: String,
        #[serde(rename = "usedProvider")]
        used_provider: String,
        attempts: usize,
    },
    /// Every provider and title combination was tried
    NotFound { attempts: usize },
    /// Aborted: every provider failed its health probe
    NoProviderAvailable,
    /// Aborted: no usable title candidate
    NoTitle,
}

impl ResolutionOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found { .. })
    }

    /// Search attempts made before the outcome was reached
    pub fn attempts(&self) -> usize {
        match self {
            Self::Found { attempts, .. } | Self::NotFound { attempts } => *attempts,
            Self::NoProviderAvailable | Self::NoTitle => 0,
        }
    }

    pub fn results(&self) -> Option<&[SourceResult]> {
        match self {
            Self::Found { results, .. } => Some(results),
            _ => None,
        }
    }

    pub fn into_callback_args(self) -> CallbackArgs {
        match self {
            Self::Found {
                results,
                used_title,
                used_provider,
                ..
            } => (Some(results), Some(used_title), Some(used_provider)),
            _ => (None, None, None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::provider::domain::entities::StreamSource;

    #[test]
    fn found_maps_to_full_callback() {
        let result = SourceResult::from_sources(
            "naruto-1",
            "Naruto",
            "gogoanime",
            &[StreamSource::new("http://x/540p.mp4", Some("540p"))],
        );
        let outcome = ResolutionOutcome::Found {
            results: vec![result.clone()],
            used_title: "Naruto".to_string(),
            used_provider: "gogoanime".to_string(),
            attempts: 1,
        };

        assert!(outcome.is_found());
        assert_eq!(outcome.attempts(), 1);
        assert_eq!(
            outcome.into_callback_args(),
            (
                Some(vec![result]),
                Some("Naruto".to_string()),
                Some("gogoanime".to_string())
            )
        );
    }

    #[test]
    fn failures_map_to_empty_callback() {
        for outcome in [
            ResolutionOutcome::NotFound { attempts: 6 },
            ResolutionOutcome::NoProviderAvailable,
            ResolutionOutcome::NoTitle,
        ] {
            assert!(!outcome.is_found());
            assert!(outcome.results().is_none());
            assert_eq!(outcome.into_callback_args(), (None, None, None));
        }
    }

    #[test]
    fn serializes_with_status_tag() {
        let json = serde_json::to_value(ResolutionOutcome::NotFound { attempts: 4 }).unwrap();
        assert_eq!(json, serde_json::json!({"status": "not_found", "attempts": 4}));

        let json = serde_json::to_value(ResolutionOutcome::NoProviderAvailable).unwrap();
        assert_eq!(json, serde_json::json!({"status": "no_provider_available"}));
    }
}
