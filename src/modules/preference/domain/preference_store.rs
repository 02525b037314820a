use async_trait::async_trait;

use crate::modules::provider::domain::entities::SourceResult;
use crate::shared::errors::AppResult;

pub const PREFERENCE_KEY_PREFIX: &str = "alisa_src_";

/// Lower-cased title with every non-alphanumeric character replaced by `_`.
pub fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}

/// Storage key for the preferred source of `title`
pub fn preference_key(title: &str) -> String {
    format!("{}{}", PREFERENCE_KEY_PREFIX, sanitize_title(title))
}

/// Persists the source id a user chose for a title
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    async fn get(&self, title: &str) -> Option<String>;

    async fn set(&self, title: &str, source_id: &str) -> AppResult<()>;

    async fn clear(&self, title: &str) -> AppResult<()>;
}

/// The stored preference when it is among `results`, else the first result.
pub async fn select_preferred<'a>(
    results: &'a [SourceResult],
    store: &dyn PreferenceStore,
    title: &str,
) -> Option<&'a SourceResult> {
    if let Some(saved) = store.get(title).await {
        if let Some(result) = results.iter().find(|r| r.id == saved) {
            return Some(result);
        }
        log::debug!("Saved source '{}' for '{}' is not in the results", saved, title);
    }
    results.first()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_title() {
        assert_eq!(sanitize_title("Naruto: Shippuden"), "naruto__shippuden");
        assert_eq!(sanitize_title("One Piece 1000"), "one_piece_1000");
        assert_eq!(sanitize_title("Наруто"), "______");
    }

    #[test]
    fn test_preference_key_is_deterministic() {
        assert_eq!(preference_key("Naruto"), "alisa_src_naruto");
        assert_eq!(preference_key("Naruto"), preference_key("NARUTO"));
    }
}
