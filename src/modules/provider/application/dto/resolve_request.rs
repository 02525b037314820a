use serde::{Deserialize, Serialize};

use crate::modules::provider::domain::entities::EpisodeContext;

/// What the caller knows about the title
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum TitleInput {
    /// Page title as scraped; candidates are generated from it
    Raw(String),
    /// Candidates prepared by the caller, tried as given
    Candidates(Vec<String>),
}

/// Input of one resolution call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveRequest {
    pub title: TitleInput,
    /// Page path, used for the slug candidate
    pub page_path: Option<String>,
    pub episode: EpisodeContext,
    /// Overrides the configured provider order for this call
    pub provider_order: Option<Vec<String>>,
}

impl ResolveRequest {
    pub fn new(title: TitleInput) -> Self {
        Self {
            title,
            page_path: None,
            episode: EpisodeContext::default(),
            provider_order: None,
        }
    }

    pub fn raw(title: &str) -> Self {
        Self::new(TitleInput::Raw(title.to_string()))
    }

    pub fn candidates<S: AsRef<str>>(titles: &[S]) -> Self {
        Self::new(TitleInput::Candidates(
            titles.iter().map(|t| t.as_ref().to_string()).collect(),
        ))
    }

    /// Sets the page path and takes the episode context from it.
    pub fn with_page_path(mut self, path: &str) -> Self {
        self.episode = EpisodeContext::from_path(path);
        self.page_path = Some(path.to_string());
        self
    }

    pub fn with_episode(mut self, episode: EpisodeContext) -> Self {
        self.episode = episode;
        self
    }

    pub fn with_provider_order(mut self, order: Vec<String>) -> Self {
        self.provider_order = Some(order);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_path_sets_episode_context() {
        let request = ResolveRequest::raw("Naruto").with_page_path("/naruto/season-1/episode-7.html");
        assert_eq!(request.episode, EpisodeContext::new(Some(1), Some(7)));
        assert_eq!(request.page_path.as_deref(), Some("/naruto/season-1/episode-7.html"));
    }

    #[test]
    fn explicit_episode_overrides_path() {
        let request = ResolveRequest::candidates(&["Naruto"])
            .with_page_path("/naruto/episode-7.html")
            .with_episode(EpisodeContext::episode(3));
        assert_eq!(request.episode.episode, Some(3));
        assert_eq!(request.title, TitleInput::Candidates(vec!["Naruto".to_string()]));
    }
}
