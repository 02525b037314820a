//! Wire shapes of the provider search/episode/watch endpoints.
//!
//! Providers disagree on field names and on whether ids are strings or
//! numbers, so every field is optional and items are parsed one by one.

use crate::modules::provider::domain::entities::StreamSource;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

/// String-or-number field
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum LooseId {
    Text(String),
    Int(i64),
    Float(f64),
}

impl LooseId {
    /// Renders the value the way it would be compared as text.
    pub fn as_text(&self) -> String {
        match self {
            LooseId::Text(s) => s.clone(),
            LooseId::Int(n) => n.to_string(),
            LooseId::Float(f) if f.is_finite() && f.fract() == 0.0 => (*f as i64).to_string(),
            LooseId::Float(f) => f.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchItem {
    #[serde(default)]
    pub id: Option<LooseId>,
    #[serde(default)]
    pub title: Option<Value>,
    #[serde(default)]
    pub name: Option<String>,
}

impl SearchItem {
    pub fn id(&self) -> Option<String> {
        self.id.as_ref().map(LooseId::as_text).filter(|id| !id.is_empty())
    }

    /// Display title; object titles use their english or romaji entry.
    pub fn display_title(&self) -> String {
        let from_title = match &self.title {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Object(map)) => ["english", "romaji", "userPreferred", "native"]
                .iter()
                .find_map(|k| map.get(*k).and_then(Value::as_str).map(str::to_string)),
            _ => None,
        };
        from_title
            .or_else(|| self.name.clone())
            .or_else(|| self.id())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EpisodeItem {
    #[serde(default)]
    pub id: Option<LooseId>,
    #[serde(default, rename = "episodeId")]
    pub episode_id: Option<LooseId>,
    #[serde(default)]
    pub number: Option<LooseId>,
    #[serde(default)]
    pub episode: Option<LooseId>,
    #[serde(default, rename = "episodeNumber")]
    pub episode_number: Option<LooseId>,
}

impl EpisodeItem {
    /// `id`, else `episodeId`
    pub fn watch_id(&self) -> Option<String> {
        [&self.id, &self.episode_id]
            .into_iter()
            .flatten()
            .map(LooseId::as_text)
            .find(|id| !id.is_empty())
    }

    /// `number`, else `episode`, else `episodeNumber`
    pub fn declared_number(&self) -> Option<String> {
        self.number
            .as_ref()
            .or(self.episode.as_ref())
            .or(self.episode_number.as_ref())
            .map(LooseId::as_text)
    }
}

fn parse_items<T: DeserializeOwned>(values: &[Value], label: &str) -> Vec<T> {
    values
        .iter()
        .filter_map(|value| match serde_json::from_value::<T>(value.clone()) {
            Ok(item) => Some(item),
            Err(e) => {
                debug!("{}: skipping unparseable item: {}", label, e);
                None
            }
        })
        .collect()
}

fn array_field<'a>(payload: &'a Value, field: &str) -> &'a [Value] {
    payload
        .get(field)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// `{ results: [...] }`
pub fn parse_search(payload: &Value) -> Vec<SearchItem> {
    parse_items(array_field(payload, "results"), "search")
}

/// `{ episodes: [...] }` or a bare array
pub fn parse_episodes(payload: &Value) -> Vec<EpisodeItem> {
    match payload {
        Value::Array(items) => parse_items(items, "episodes"),
        _ => parse_items(array_field(payload, "episodes"), "episodes"),
    }
}

/// `{ sources: [...] }`
pub fn parse_sources(payload: &Value) -> Vec<StreamSource> {
    parse_items(array_field(payload, "sources"), "watch")
}
