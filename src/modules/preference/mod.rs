pub mod domain;
pub mod infrastructure;

pub use domain::{preference_key, sanitize_title, select_preferred, PreferenceStore};
pub use infrastructure::{InMemoryPreferenceStore, JsonFilePreferenceStore};
