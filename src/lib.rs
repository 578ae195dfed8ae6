pub mod adapters;
#[cfg(feature = "server")]
pub mod api;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{cli::LocalDocumentSource, CliConfig};

pub use config::toml_config::{ServiceSettings, TomlConfig};
pub use crate::core::{engine::TriageEngine, normalize::Normalizer, pipeline::TriagePipeline};
pub use domain::model::{
    Category, Classification, ClassificationResult, Locale, NormalizedText, RawInput,
    ResponseEnvelope,
};
pub use utils::error::{ClassificationError, Result, TriageError};
