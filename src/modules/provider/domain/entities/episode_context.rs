use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static SEASON_EPISODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"season-(\d+).*episode-(\d+)").expect("static regex"));
static EPISODE_ONLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"episode-(\d+)").expect("static regex"));

/// Season/episode numbers taken from the page location
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeContext {
    pub season: Option<u32>,
    pub episode: Option<u32>,
}

impl EpisodeContext {
    pub fn new(season: Option<u32>, episode: Option<u32>) -> Self {
        Self { season, episode }
    }

    pub fn episode(episode: u32) -> Self {
        Self {
            season: None,
            episode: Some(episode),
        }
    }

    /// Parses `/show/season-2/episode-5.html` style paths.
    pub fn from_path(path: &str) -> Self {
        if let Some(caps) = SEASON_EPISODE.captures(path) {
            return Self {
                season: caps.get(1).and_then(|m| m.as_str().parse().ok()),
                episode: caps.get(2).and_then(|m| m.as_str().parse().ok()),
            };
        }

        Self {
            season: None,
            episode: EPISODE_ONLY
                .captures(path)
                .and_then(|caps| caps.get(1))
                .and_then(|m| m.as_str().parse().ok()),
        }
    }
}

/// First non-empty path segment, separators turned into spaces, digits removed.
pub fn slug_from_path(path: &str) -> String {
    let segment = path
        .split('/')
        .find(|s| !s.is_empty())
        .unwrap_or_default();

    segment
        .chars()
        .filter(|c| !c.is_ascii_digit())
        .map(|c| if c == '-' || c == '_' { ' ' } else { c })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_season_and_episode() {
        let ctx = EpisodeContext::from_path("/naruto/season-2/episode-15.html");
        assert_eq!(ctx, EpisodeContext::new(Some(2), Some(15)));
    }

    #[test]
    fn parses_episode_only() {
        let ctx = EpisodeContext::from_path("/one-piece/episode-1071.html");
        assert_eq!(ctx, EpisodeContext::new(None, Some(1071)));
    }

    #[test]
    fn no_numbers_yields_empty_context() {
        assert_eq!(EpisodeContext::from_path("/naruto/"), EpisodeContext::default());
    }

    #[test]
    fn slug_strips_digits_and_separators() {
        assert_eq!(slug_from_path("/attack-on-titan2/episode-3.html"), "attack on titan");
        assert_eq!(slug_from_path("/jujutsu_kaisen/"), "jujutsu kaisen");
        assert_eq!(slug_from_path("/"), "");
    }
}
