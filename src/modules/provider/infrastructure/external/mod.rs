pub mod client;
pub mod dto;

pub use client::{ProviderApiClient, WatchSelection};
pub use dto::{EpisodeItem, LooseId, SearchItem};
