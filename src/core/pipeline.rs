use crate::adapters::gemini::GeminiClient;
use crate::core::classify::Classifier;
use crate::core::extract;
use crate::core::normalize::Normalizer;
use crate::domain::model::{ClassificationResult, DocumentKind, HealthReport, NormalizedText};
use crate::domain::ports::{ConfigProvider, Pipeline};
use crate::utils::error::{Result, TriageError};
use std::sync::Arc;

/// 擷取 → 正規化 → 分類 的預設實作
pub struct TriagePipeline {
    normalizer: Normalizer,
    classifier: Classifier,
}

impl TriagePipeline {
    pub fn new(normalizer: Normalizer, classifier: Classifier) -> Self {
        Self {
            normalizer,
            classifier,
        }
    }

    /// 依設定建立 Gemini 客戶端與預設的雙語正規化器
    pub fn from_config<C: ConfigProvider + ?Sized>(config: &C) -> Result<Self> {
        let client = Arc::new(GeminiClient::from_config(config)?);
        let classifier = Classifier::new(client, config);

        if !classifier.credential_configured() {
            tracing::warn!("⚠️ No API key configured, every classification will report a missing credential");
        }

        Ok(Self::new(Normalizer::default(), classifier))
    }
}

#[async_trait::async_trait]
impl Pipeline for TriagePipeline {
    async fn extract(&self, kind: DocumentKind, bytes: Vec<u8>) -> Result<String> {
        tracing::debug!("Extracting {:?} document ({} bytes)", kind, bytes.len());

        // PDF 解析是 CPU 密集的同步工作
        let text = tokio::task::spawn_blocking(move || extract::extract(kind, &bytes))
            .await
            .map_err(|e| TriageError::InternalError {
                message: format!("extraction task failed: {}", e),
            })??;

        Ok(text)
    }

    async fn normalize(&self, text: &str) -> NormalizedText {
        self.normalizer.normalize(text)
    }

    async fn classify(&self, original_text: &str, clean_text: &str) -> ClassificationResult {
        self.classifier.classify(original_text, clean_text).await
    }

    fn health(&self) -> HealthReport {
        HealthReport {
            credential_configured: self.classifier.credential_configured(),
            model: self.classifier.model_name().to_string(),
        }
    }
}
