use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_QUALITY_KEY: &str = "default";
pub const HLS_QUALITY_KEY: &str = "hls";

/// Quality label -> playable URL
pub type UrlMap = BTreeMap<String, String>;

/// One entry of a provider's watch response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamSource {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub quality: Option<String>,
    #[serde(default, rename = "isM3U8")]
    pub is_m3u8: bool,
}

impl StreamSource {
    pub fn new(url: &str, quality: Option<&str>) -> Self {
        Self {
            url: Some(url.to_string()),
            quality: quality.map(str::to_string),
            is_m3u8: false,
        }
    }

    fn usable_url(&self) -> Option<&str> {
        self.url.as_deref().filter(|u| !u.is_empty())
    }

    fn quality_key(&self) -> &str {
        match self.quality.as_deref().filter(|q| !q.is_empty()) {
            Some(quality) => quality,
            None if self.is_m3u8 => HLS_QUALITY_KEY,
            None => DEFAULT_QUALITY_KEY,
        }
    }
}

/// Builds the quality map for a watch response.
///
/// The first source claiming a quality wins. A `default` entry always exists
/// when any source has a URL, taken from the first such source unless a
/// source already claimed `default`.
pub fn build_url_map(sources: &[StreamSource]) -> UrlMap {
    let mut urls = UrlMap::new();
    for source in sources {
        if let Some(url) = source.usable_url() {
            urls.entry(source.quality_key().to_string())
                .or_insert_with(|| url.to_string());
        }
    }

    if !urls.contains_key(DEFAULT_QUALITY_KEY) {
        if let Some(url) = sources.iter().find_map(StreamSource::usable_url) {
            urls.insert(DEFAULT_QUALITY_KEY.to_string(), url.to_string());
        }
    }
    urls
}

/// How a collaborator should play a resolved link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackKind {
    /// Media file or HLS manifest, usable as a `<video>` source
    Direct,
    /// Anything else; has to be embedded as a page
    Embed,
}

/// A playable source resolved for one search match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceResult {
    pub id: String,
    pub title: String,
    pub provider: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub link: Option<String>,
    #[serde(rename = "urlMap")]
    pub url_map: UrlMap,
    pub quality: String,
}

impl SourceResult {
    /// Builds a result from a non-empty watch response.
    pub fn from_sources(id: &str, title: &str, provider: &str, sources: &[StreamSource]) -> Self {
        let url_map = build_url_map(sources);
        let quality = sources
            .first()
            .and_then(|s| s.quality.clone())
            .filter(|q| !q.is_empty())
            .unwrap_or_else(|| "auto".to_string());

        Self {
            id: id.to_string(),
            title: title.to_string(),
            provider: provider.to_string(),
            kind: "stream".to_string(),
            link: url_map.get(DEFAULT_QUALITY_KEY).cloned(),
            url_map,
            quality,
        }
    }

    /// True when the result carries something a player can load.
    pub fn is_playable(&self) -> bool {
        self.link.as_deref().is_some_and(|l| !l.is_empty())
            || self
                .url_map
                .get(DEFAULT_QUALITY_KEY)
                .is_some_and(|l| !l.is_empty())
    }

    pub fn primary_link(&self) -> Option<&str> {
        self.link
            .as_deref()
            .filter(|l| !l.is_empty())
            .or_else(|| self.url_map.get(DEFAULT_QUALITY_KEY).map(String::as_str))
    }

    pub fn playback_kind(&self) -> PlaybackKind {
        let link = self.primary_link().unwrap_or_default().to_lowercase();
        if [".mp4", ".mkv", ".m3u8"].iter().any(|ext| link.contains(ext)) {
            PlaybackKind::Direct
        } else {
            PlaybackKind::Embed
        }
    }

    pub fn mime_type(&self) -> &'static str {
        mime_type_for(self.primary_link().unwrap_or_default())
    }
}

pub fn mime_type_for(url: &str) -> &'static str {
    if url.to_lowercase().contains(".m3u8") {
        "application/x-mpegURL"
    } else {
        "video/mp4"
    }
}
