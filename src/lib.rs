pub mod modules;
pub mod shared;

pub use modules::preference::{
    select_preferred, InMemoryPreferenceStore, JsonFilePreferenceStore, PreferenceStore,
};
pub use modules::provider::{
    EpisodeContext, ProgressReporter, ResolutionOutcome, ResolveRequest, SourceResolver,
    SourceResult, TitleInput,
};
pub use shared::errors::{AppError, AppResult};
pub use shared::ResolverConfig;
