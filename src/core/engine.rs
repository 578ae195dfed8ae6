use crate::domain::model::{DocumentKind, HealthReport, RawInput, ResolvedInput, ResponseEnvelope};
use crate::domain::ports::Pipeline;
use crate::utils::error::{InputError, Result};

/// 單一請求的協調者：決定輸入來源，依序跑完整條管線。
///
/// 不保留任何請求之間的狀態。
pub struct TriageEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> TriageEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub fn health(&self) -> HealthReport {
        self.pipeline.health()
    }

    /// 套用優先順序：JSON 文字 > 表單文字 > 上傳檔案
    pub fn resolve(input: RawInput) -> Result<ResolvedInput> {
        let RawInput {
            json_text,
            form_text,
            document,
        } = input;

        if let Some(text) = non_blank(json_text).or_else(|| non_blank(form_text)) {
            return Ok(ResolvedInput::Text(text));
        }

        let Some(document) = document else {
            return Err(InputError::NothingReceived.into());
        };

        if document.filename.trim().is_empty() {
            return Err(InputError::EmptyFilename.into());
        }

        let kind = DocumentKind::from_filename(&document.filename).ok_or_else(|| {
            InputError::UnsupportedKind {
                filename: document.filename.clone(),
            }
        })?;

        Ok(ResolvedInput::Document {
            kind,
            bytes: document.bytes,
        })
    }

    pub async fn handle(&self, input: RawInput) -> Result<ResponseEnvelope> {
        let text = match Self::resolve(input)? {
            ResolvedInput::Text(text) => {
                tracing::debug!("📝 Using inline text ({} chars)", text.chars().count());
                text
            }
            ResolvedInput::Document { kind, bytes } => {
                tracing::debug!("📄 Using uploaded {:?} document", kind);
                self.pipeline.extract(kind, bytes).await?
            }
        };

        if text.trim().is_empty() {
            return Err(InputError::NothingReceived.into());
        }

        let preprocessed = self.pipeline.normalize(&text).await;
        tracing::debug!("🧹 Normalized into {} tokens", preprocessed.tokens.len());

        let classification = self
            .pipeline
            .classify(&text, &preprocessed.clean_text)
            .await;

        Ok(ResponseEnvelope::new(&text, preprocessed, classification))
    }
}

fn non_blank(text: Option<String>) -> Option<String> {
    text.filter(|t| !t.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::toml_config::ServiceSettings;
    use crate::core::classify::tests::{settings_with_key, FakeService, VALID_REPLY};
    use crate::core::classify::Classifier;
    use crate::core::normalize::Normalizer;
    use crate::core::pipeline::TriagePipeline;
    use crate::domain::model::{Category, UploadedDocument, SNIPPET_CHARS};
    use crate::utils::error::{ClassificationError, TriageError};
    use std::sync::Arc;

    fn engine_with(
        service: Arc<FakeService>,
        settings: &ServiceSettings,
    ) -> TriageEngine<TriagePipeline> {
        TriageEngine::new(TriagePipeline::new(
            Normalizer::default(),
            Classifier::new(service, settings),
        ))
    }

    #[test]
    fn test_resolve_precedence() {
        let input = RawInput {
            json_text: Some("from json".to_string()),
            form_text: Some("from form".to_string()),
            document: Some(UploadedDocument {
                filename: "mail.txt".to_string(),
                bytes: b"from file".to_vec(),
            }),
        };
        assert_eq!(
            TriageEngine::<TriagePipeline>::resolve(input).unwrap(),
            ResolvedInput::Text("from json".to_string())
        );

        let blank_json = RawInput {
            json_text: Some("   ".to_string()),
            form_text: Some("from form".to_string()),
            document: None,
        };
        assert_eq!(
            TriageEngine::<TriagePipeline>::resolve(blank_json).unwrap(),
            ResolvedInput::Text("from form".to_string())
        );

        let only_file = RawInput {
            form_text: Some("\n".to_string()),
            ..RawInput::document("MAIL.PDF", vec![1, 2, 3])
        };
        assert_eq!(
            TriageEngine::<TriagePipeline>::resolve(only_file).unwrap(),
            ResolvedInput::Document {
                kind: DocumentKind::Pdf,
                bytes: vec![1, 2, 3]
            }
        );
    }

    #[test]
    fn test_resolve_rejects_bad_documents() {
        let err = TriageEngine::<TriagePipeline>::resolve(RawInput::document("", vec![1]))
            .unwrap_err();
        assert!(matches!(err, TriageError::Input(InputError::EmptyFilename)));

        let err = TriageEngine::<TriagePipeline>::resolve(RawInput::document("report.csv", vec![1]))
            .unwrap_err();
        assert!(matches!(
            err,
            TriageError::Input(InputError::UnsupportedKind { .. })
        ));
    }

    #[tokio::test]
    async fn test_no_input_is_input_error_without_service_call() {
        let service = Arc::new(FakeService::replying(VALID_REPLY));
        let engine = engine_with(service.clone(), &settings_with_key());

        let err = engine.handle(RawInput::default()).await.unwrap_err();

        assert!(matches!(err, TriageError::Input(InputError::NothingReceived)));
        assert_eq!(service.call_count(), 0);
    }

    #[tokio::test]
    async fn test_csv_upload_is_rejected_before_extraction() {
        let service = Arc::new(FakeService::replying(VALID_REPLY));
        let engine = engine_with(service.clone(), &settings_with_key());

        // 內容不是合法的任何格式，若有進到擷取階段會得到不同的錯誤
        let err = engine
            .handle(RawInput::document("export.csv", b"%PDF-garbage".to_vec()))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            TriageError::Input(InputError::UnsupportedKind { .. })
        ));
        assert_eq!(service.call_count(), 0);
    }

    #[tokio::test]
    async fn test_whitespace_only_file_is_nothing_received() {
        let service = Arc::new(FakeService::replying(VALID_REPLY));
        let engine = engine_with(service.clone(), &settings_with_key());

        let err = engine
            .handle(RawInput::document("empty.txt", b" \n\t ".to_vec()))
            .await
            .unwrap_err();

        assert!(matches!(err, TriageError::Input(InputError::NothingReceived)));
        assert_eq!(service.call_count(), 0);
    }

    #[tokio::test]
    async fn test_handle_text_produces_envelope() {
        let service = Arc::new(FakeService::replying(VALID_REPLY));
        let engine = engine_with(service.clone(), &settings_with_key());

        let envelope = engine
            .handle(RawInput::inline_text(
                "Contact me at a@b.com or visit https://x.com NOW!!! 123",
            ))
            .await
            .unwrap();

        assert_eq!(envelope.preprocessed.tokens, vec!["contact", "visit"]);
        assert_eq!(
            envelope.original_text_snippet,
            "Contact me at a@b.com or visit https://x.com NOW!!! 123"
        );
        let classification = envelope.classification.classification().unwrap();
        assert_eq!(classification.category, Category::Actionable);

        let request = service.last_request.lock().unwrap().clone().unwrap();
        assert!(request.user_prompt.contains("contact visit"));
    }

    #[tokio::test]
    async fn test_snippet_is_capped() {
        let service = Arc::new(FakeService::replying(VALID_REPLY));
        let engine = engine_with(service, &settings_with_key());
        let long_text = "relatório ".repeat(100);

        let envelope = engine
            .handle(RawInput::inline_text(long_text.clone()))
            .await
            .unwrap();

        assert_eq!(envelope.original_text_snippet.chars().count(), SNIPPET_CHARS);
        assert!(long_text.starts_with(&envelope.original_text_snippet));
    }

    #[tokio::test]
    async fn test_classification_failure_stays_inside_envelope() {
        let service = Arc::new(FakeService::failing(ClassificationError::Service {
            status: 500,
            message: "backend unavailable".to_string(),
        }));
        let engine = engine_with(service, &settings_with_key());

        let envelope = engine
            .handle(RawInput::form_text("Please reset my password"))
            .await
            .unwrap();

        assert!(envelope.classification.error().unwrap().contains("backend unavailable"));
        assert_eq!(envelope.preprocessed.tokens, vec!["please", "reset", "password"]);
    }

    #[tokio::test]
    async fn test_missing_credential_envelope() {
        let service = Arc::new(FakeService::replying(VALID_REPLY));
        let engine = engine_with(service.clone(), &ServiceSettings::default());

        let envelope = engine
            .handle(RawInput::inline_text("Status of ticket 42?"))
            .await
            .unwrap();

        assert_eq!(envelope.classification.error(), Some("missing credential"));
        assert_eq!(service.call_count(), 0);
        assert!(!engine.health().credential_configured);
    }
}
