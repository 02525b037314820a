pub mod provider_health;

pub use provider_health::*;
