pub mod title_normalizer;

pub use title_normalizer::{TitleNormalizer, TitleTransformation, DEFAULT_SITE_NAME};
