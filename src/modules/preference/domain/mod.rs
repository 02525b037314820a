pub mod preference_store;

pub use preference_store::{
    preference_key, sanitize_title, select_preferred, PreferenceStore, PREFERENCE_KEY_PREFIX,
};
