pub mod resolution_outcome;
pub mod resolve_request;

pub use resolution_outcome::*;
pub use resolve_request::*;
