use crate::core::prompt;
use crate::domain::model::{
    Classification, ClassificationResult, GenerationRequest, Locale,
};
use crate::domain::ports::{ClassificationService, ConfigProvider};
use crate::utils::error::ClassificationError;
use std::sync::Arc;

/// 分類協調器：組 prompt、呼叫外部服務、驗證回覆。
///
/// 任何失敗都以 `ClassificationResult::Failed` 回傳，不會往外拋，也不重試。
pub struct Classifier {
    service: Arc<dyn ClassificationService>,
    credential_configured: bool,
    locale: Locale,
    max_output_tokens: u32,
}

impl Classifier {
    pub fn new<C: ConfigProvider + ?Sized>(service: Arc<dyn ClassificationService>, config: &C) -> Self {
        Self {
            service,
            credential_configured: config.credential().is_some_and(|k| !k.trim().is_empty()),
            locale: config.locale(),
            max_output_tokens: config.max_output_tokens(),
        }
    }

    pub fn credential_configured(&self) -> bool {
        self.credential_configured
    }

    pub fn model_name(&self) -> &str {
        self.service.model_name()
    }

    pub fn build_request(&self, original_text: &str, clean_text: &str) -> GenerationRequest {
        GenerationRequest {
            system_instruction: prompt::system_instruction(self.locale),
            user_prompt: prompt::user_prompt(self.locale, original_text, clean_text),
            temperature: 0.0,
            max_output_tokens: self.max_output_tokens,
            response_schema: prompt::response_schema(self.locale),
        }
    }

    pub async fn classify(&self, original_text: &str, clean_text: &str) -> ClassificationResult {
        if !self.credential_configured {
            tracing::warn!("⚠️ No service credential configured, skipping classification");
            return ClassificationResult::failed(ClassificationError::MissingCredential);
        }

        let request = self.build_request(original_text, clean_text);
        tracing::debug!(
            "Calling {} (prompt {} chars, max {} tokens)",
            self.service.model_name(),
            request.user_prompt.chars().count(),
            request.max_output_tokens
        );

        match self.service.generate(&request).await.and_then(|raw| parse_reply(&raw)) {
            Ok(classification) => {
                tracing::info!(
                    "🏷️ Classified as {:?} (confidence {:.2})",
                    classification.category,
                    classification.confidence
                );
                ClassificationResult::Classified(classification)
            }
            Err(e) => {
                tracing::warn!("❌ Classification failed: {}", e);
                ClassificationResult::failed(e)
            }
        }
    }
}

/// 把服務回覆解析成固定的四欄位結構
pub fn parse_reply(raw: &str) -> Result<Classification, ClassificationError> {
    let body = strip_code_fence(raw.trim());
    if body.is_empty() {
        return Err(ClassificationError::EmptyReply);
    }

    let classification: Classification =
        serde_json::from_str(body).map_err(|e| ClassificationError::Schema(e.to_string()))?;

    if !(0.0..=1.0).contains(&classification.confidence) {
        return Err(ClassificationError::Schema(format!(
            "confidence {} is outside [0, 1]",
            classification.confidence
        )));
    }

    Ok(classification)
}

/// 有些模型即使指定 JSON 輸出仍會包上 ```json 區塊
fn strip_code_fence(text: &str) -> &str {
    let Some(inner) = text.strip_prefix("```") else {
        return text;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::toml_config::ServiceSettings;
    use crate::domain::model::Category;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// 記錄呼叫次數與最後一次請求的假服務
    pub(crate) struct FakeService {
        reply: std::result::Result<String, ClassificationError>,
        pub calls: AtomicUsize,
        pub last_request: Mutex<Option<GenerationRequest>>,
    }

    impl FakeService {
        pub(crate) fn replying(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                calls: AtomicUsize::new(0),
                last_request: Mutex::new(None),
            }
        }

        pub(crate) fn failing(error: ClassificationError) -> Self {
            Self {
                reply: Err(error),
                calls: AtomicUsize::new(0),
                last_request: Mutex::new(None),
            }
        }

        pub(crate) fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ClassificationService for FakeService {
        async fn generate(
            &self,
            request: &GenerationRequest,
        ) -> std::result::Result<String, ClassificationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_request.lock().unwrap() = Some(request.clone());
            self.reply.clone()
        }

        fn model_name(&self) -> &str {
            "fake-model"
        }
    }

    pub(crate) const VALID_REPLY: &str = r#"{
        "category": "Actionable",
        "confidence": 0.92,
        "rationale": "The sender asks for a status update on an open ticket.",
        "suggested_response": "Hello, we are looking into your request and will reply shortly."
    }"#;

    pub(crate) fn settings_with_key() -> ServiceSettings {
        ServiceSettings::default().with_api_key(Some("test-key".to_string()))
    }

    #[tokio::test]
    async fn test_missing_credential_returns_error_without_calling_service() {
        let service = Arc::new(FakeService::replying(VALID_REPLY));
        let classifier = Classifier::new(service.clone(), &ServiceSettings::default());

        let result = classifier.classify("text", "text").await;

        assert_eq!(result.error(), Some("missing credential"));
        assert_eq!(service.call_count(), 0);
    }

    #[tokio::test]
    async fn test_blank_credential_counts_as_missing() {
        let service = Arc::new(FakeService::replying(VALID_REPLY));
        let settings = ServiceSettings::default().with_api_key(Some("   ".to_string()));
        let classifier = Classifier::new(service.clone(), &settings);

        assert!(!classifier.credential_configured());
        assert_eq!(
            classifier.classify("a", "b").await.error(),
            Some("missing credential")
        );
        assert_eq!(service.call_count(), 0);
    }

    #[tokio::test]
    async fn test_valid_reply_is_parsed() {
        let service = Arc::new(FakeService::replying(VALID_REPLY));
        let classifier = Classifier::new(service.clone(), &settings_with_key());

        let result = classifier.classify("Can you check ticket 42?", "check ticket").await;

        let classification = result.classification().expect("classified");
        assert_eq!(classification.category, Category::Actionable);
        assert!((classification.confidence - 0.92).abs() < f64::EPSILON);
        assert_eq!(service.call_count(), 1);
    }

    #[tokio::test]
    async fn test_request_is_deterministic_and_schema_constrained() {
        let service = Arc::new(FakeService::replying(VALID_REPLY));
        let classifier = Classifier::new(service.clone(), &settings_with_key());

        classifier.classify("Original TEXT!", "original text").await;

        let request = service.last_request.lock().unwrap().clone().unwrap();
        assert_eq!(request.temperature, 0.0);
        assert_eq!(request.max_output_tokens, 2048);
        assert!(request.user_prompt.contains("Original TEXT!"));
        assert!(request.user_prompt.contains("original text"));
        assert_eq!(
            request.response_schema["required"],
            serde_json::json!(prompt::REPLY_FIELDS)
        );
    }

    #[tokio::test]
    async fn test_reply_missing_field_is_error_value() {
        let reply = r#"{"category": "Actionable", "confidence": 0.8, "rationale": "needs reply"}"#;
        let service = Arc::new(FakeService::replying(reply));
        let classifier = Classifier::new(service, &settings_with_key());

        let result = classifier.classify("a", "b").await;

        let error = result.error().expect("error value");
        assert!(error.contains("suggested_response"), "got: {error}");
    }

    #[tokio::test]
    async fn test_transport_failure_is_error_value() {
        let service = Arc::new(FakeService::failing(ClassificationError::Transport(
            "connection refused".to_string(),
        )));
        let classifier = Classifier::new(service.clone(), &settings_with_key());

        let result = classifier.classify("a", "b").await;

        assert!(result.error().unwrap().contains("connection refused"));
        // 不重試
        assert_eq!(service.call_count(), 1);
    }

    #[test]
    fn test_parse_reply_accepts_portuguese_labels() {
        let reply = r#"{"category":"Improdutivo","confidence":0.7,"rationale":"Mensagem de felicitações.","suggested_response":"Obrigado!"}"#;
        let classification = parse_reply(reply).unwrap();
        assert_eq!(classification.category, Category::NonActionable);
    }

    #[test]
    fn test_parse_reply_rejects_unknown_category_and_confidence_range() {
        let unknown = r#"{"category":"Spam","confidence":0.7,"rationale":"r","suggested_response":"s"}"#;
        assert!(matches!(parse_reply(unknown), Err(ClassificationError::Schema(_))));

        let too_high = r#"{"category":"Actionable","confidence":1.5,"rationale":"r","suggested_response":"s"}"#;
        assert!(matches!(parse_reply(too_high), Err(ClassificationError::Schema(_))));
    }

    #[test]
    fn test_parse_reply_handles_code_fence_and_empty() {
        let fenced = format!("```json\n{}\n```", VALID_REPLY);
        assert!(parse_reply(&fenced).is_ok());
        assert_eq!(parse_reply("   "), Err(ClassificationError::EmptyReply));
        assert!(matches!(parse_reply("not json"), Err(ClassificationError::Schema(_))));
    }
}
