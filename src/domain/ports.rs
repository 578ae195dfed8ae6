use crate::domain::model::{
    ClassificationResult, DocumentKind, GenerationRequest, HealthReport, Locale, NormalizedText,
};
use crate::utils::error::{ClassificationError, Result};
use async_trait::async_trait;
use std::time::Duration;

/// 讀取本機或其他來源的原始文件位元組
pub trait DocumentSource: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn endpoint(&self) -> &str;
    fn model(&self) -> &str;
    /// 沒有設定金鑰時回傳 None，絕不使用內建預設值
    fn credential(&self) -> Option<&str>;
    fn locale(&self) -> Locale;
    fn max_output_tokens(&self) -> u32;
    fn request_timeout(&self) -> Duration;
}

/// 外部語言模型服務。回傳模型產生的原始 JSON 文字。
#[async_trait]
pub trait ClassificationService: Send + Sync {
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> std::result::Result<String, ClassificationError>;

    fn model_name(&self) -> &str;
}

pub trait Lemmatizer: Send + Sync {
    fn lemmatize(&self, token: &str) -> String;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self, kind: DocumentKind, bytes: Vec<u8>) -> Result<String>;
    async fn normalize(&self, text: &str) -> NormalizedText;
    async fn classify(&self, original_text: &str, clean_text: &str) -> ClassificationResult;
    fn health(&self) -> HealthReport;
}
