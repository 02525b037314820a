pub mod episode_context;
pub mod provider_config;
pub mod source_result;

pub use episode_context::{slug_from_path, EpisodeContext};
pub use provider_config::{
    default_catalog, next_primary, reorder, ProviderDescriptor, DEFAULT_BASE_URL,
};
pub use source_result::{build_url_map, PlaybackKind, SourceResult, StreamSource, UrlMap};
