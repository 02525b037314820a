pub mod source_resolver;

pub use source_resolver::{
    pick_episode, LogProgressReporter, ProgressReporter, ResolutionState, SourceResolver,
};
