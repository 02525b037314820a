pub mod preference;
pub mod provider;
