#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli_config::CliConfig;

#[cfg(feature = "cli")]
mod cli_config {
    use super::toml_config::{ServiceSettings, TomlConfig};
    use crate::domain::model::Locale;
    use crate::utils::error::{Result, TriageError};
    use crate::utils::validation::{self, Validate};
    use clap::Parser;
    use std::fmt;
    use std::path::PathBuf;

    #[derive(Clone, Parser)]
    #[command(name = "mail-triage")]
    #[command(about = "Classify an email as actionable or not and draft a reply")]
    pub struct CliConfig {
        #[arg(long, conflicts_with = "file", help = "Email text to classify")]
        pub text: Option<String>,

        #[arg(long, help = "Read the email from a .txt or .pdf file")]
        pub file: Option<PathBuf>,

        #[arg(short, long, help = "TOML configuration file")]
        pub config: Option<PathBuf>,

        #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
        pub api_key: Option<String>,

        #[arg(long, help = "Override the model name")]
        pub model: Option<String>,

        #[arg(long, help = "Prompt and label language (en, pt-BR)")]
        pub locale: Option<Locale>,

        #[arg(long, help = "Pretty-print the JSON result")]
        pub pretty: bool,

        #[arg(short, long, help = "Enable verbose output")]
        pub verbose: bool,
    }

    impl CliConfig {
        /// 設定檔為底，命令列參數覆蓋
        pub fn load_toml(&self) -> Result<TomlConfig> {
            match &self.config {
                Some(path) => {
                    tracing::debug!("Loading configuration from {}", path.display());
                    let toml = TomlConfig::from_file(path)?;
                    toml.validate()?;
                    Ok(toml)
                }
                None => Ok(TomlConfig::default()),
            }
        }

        pub fn service_settings(&self) -> Result<ServiceSettings> {
            let settings = self
                .load_toml()?
                .service_settings()
                .with_api_key(self.api_key.clone())
                .with_model(self.model.clone())
                .with_locale(self.locale);
            settings.validate()?;
            Ok(settings)
        }
    }

    impl Validate for CliConfig {
        fn validate(&self) -> Result<()> {
            if self.text.is_none() && self.file.is_none() {
                return Err(TriageError::ConfigValidationError {
                    field: "input".to_string(),
                    message: "Pass --text or --file".to_string(),
                });
            }
            if let Some(file) = &self.file {
                validation::validate_path("file", &file.to_string_lossy())?;
            }
            if let Some(config) = &self.config {
                validation::validate_path("config", &config.to_string_lossy())?;
            }
            if let Some(model) = &self.model {
                validation::validate_non_empty_string("model", model)?;
            }
            Ok(())
        }
    }

    impl fmt::Debug for CliConfig {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.debug_struct("CliConfig")
                .field("text_chars", &self.text.as_ref().map(|t| t.chars().count()))
                .field("file", &self.file)
                .field("config", &self.config)
                .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
                .field("model", &self.model)
                .field("locale", &self.locale)
                .field("pretty", &self.pretty)
                .field("verbose", &self.verbose)
                .finish()
        }
    }

}
