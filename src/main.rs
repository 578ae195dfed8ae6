use clap::Parser;
use mail_triage::domain::model::RawInput;
use mail_triage::utils::error::{ErrorSeverity, TriageError};
use mail_triage::utils::{logger, validation::Validate};
use mail_triage::{CliConfig, LocalDocumentSource, TriageEngine, TriagePipeline};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting mail-triage CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    match run(&config).await {
        Ok(output) => {
            println!("{}", output);
        }
        Err(e) => {
            // 記錄詳細錯誤信息
            tracing::error!(
                "❌ Triage failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );

            // 輸出用戶友好的錯誤信息
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());

            // 根據錯誤嚴重程度決定退出碼
            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,    // 輸入錯誤
                ErrorSeverity::High => 1,      // 處理或配置錯誤
                ErrorSeverity::Critical => 3,  // 系統錯誤
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

async fn run(config: &CliConfig) -> Result<String, TriageError> {
    let settings = config.service_settings()?;
    let engine = TriageEngine::new(TriagePipeline::from_config(&settings)?);

    let input = match (&config.text, &config.file) {
        (Some(text), _) => RawInput::inline_text(text.clone()),
        (None, Some(path)) => {
            LocalDocumentSource::default()
                .load(&path.to_string_lossy())
                .await?
        }
        (None, None) => RawInput::default(),
    };

    let envelope = engine.handle(input).await?;
    if let Some(error) = envelope.classification.error() {
        tracing::warn!("⚠️ Classification unavailable: {}", error);
    }

    let output = if config.pretty {
        serde_json::to_string_pretty(&envelope)?
    } else {
        serde_json::to_string(&envelope)?
    };
    Ok(output)
}
