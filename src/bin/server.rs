use anyhow::Context;
use clap::Parser;
use mail_triage::config::toml_config::TomlConfig;
use mail_triage::utils::{logger, validation::Validate};
use mail_triage::{api, TriageEngine, TriagePipeline};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Parser)]
#[command(name = "triage-server")]
#[command(about = "HTTP service that classifies emails and drafts replies")]
struct ServerArgs {
    #[arg(short, long, help = "TOML configuration file")]
    config: Option<PathBuf>,

    #[arg(long, help = "Listen address, overrides [server].bind")]
    bind: Option<String>,

    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = ServerArgs::parse();

    let toml = match &args.config {
        Some(path) => TomlConfig::from_file(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => TomlConfig::default(),
    };

    logger::init_server_logger(toml.log_level(), toml.json_logs());

    if let Err(e) = toml.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        return Err(e.into());
    }

    let settings = toml.service_settings().with_api_key(args.api_key.clone());
    settings.validate()?;

    let pipeline = TriagePipeline::from_config(&settings)?;
    let engine = Arc::new(TriageEngine::new(pipeline));
    let app = api::router(engine, toml.max_body_bytes());

    let bind = args.bind.as_deref().unwrap_or(toml.bind());
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("failed to bind {}", bind))?;

    tracing::info!(
        "🚀 triage-server listening on {} (model {}, locale {})",
        listener.local_addr()?,
        settings.model,
        settings.locale
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("👋 triage-server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
