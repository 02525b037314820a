// Shared kernel: error types, configuration and logging used by every module

pub mod config;
pub mod errors;
pub mod utils;

pub use config::ResolverConfig;
