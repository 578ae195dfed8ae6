pub mod classify;
pub mod engine;
pub mod extract;
pub mod lemmatizer;
pub mod normalize;
pub mod pipeline;
pub mod prompt;
pub mod stopwords;

pub use crate::domain::ports::{ClassificationService, ConfigProvider, Lemmatizer, Pipeline};
pub use crate::utils::error::Result;
