pub mod application;
pub mod domain;
pub mod infrastructure;

// Re-exports for easy external access
pub use application::{
    ProgressReporter, ResolutionOutcome, ResolveRequest, SourceResolver, TitleInput,
};
pub use domain::{EpisodeContext, ProviderDescriptor, SourceResult, TitleNormalizer};
pub use infrastructure::{HttpTransport, ProviderHealthMonitor};
