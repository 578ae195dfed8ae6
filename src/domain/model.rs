use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// 回傳給呼叫者的原文片段長度（Unicode code points）
pub const SNIPPET_CHARS: usize = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    PlainText,
    Pdf,
}

impl DocumentKind {
    pub const ALLOWED_EXTENSIONS: [&'static str; 2] = ["txt", "pdf"];

    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "txt" => Some(DocumentKind::PlainText),
            "pdf" => Some(DocumentKind::Pdf),
            _ => None,
        }
    }

    pub fn from_filename(filename: &str) -> Option<Self> {
        Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedDocument {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// 一次請求的原始輸入。
///
/// 三個來源可以同時出現，但只會使用其中一個：
/// JSON 文字 > 表單文字 > 上傳檔案。空白文字視為不存在。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawInput {
    pub json_text: Option<String>,
    pub form_text: Option<String>,
    pub document: Option<UploadedDocument>,
}

impl RawInput {
    pub fn inline_text(text: impl Into<String>) -> Self {
        Self {
            json_text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn form_text(text: impl Into<String>) -> Self {
        Self {
            form_text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn document(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            document: Some(UploadedDocument {
                filename: filename.into(),
                bytes,
            }),
            ..Self::default()
        }
    }
}

/// 決定好的單一輸入來源
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedInput {
    Text(String),
    Document { kind: DocumentKind, bytes: Vec<u8> },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedText {
    pub clean_text: String,
    pub tokens: Vec<String>,
}

impl NormalizedText {
    pub fn empty() -> Self {
        Self::default()
    }

    /// clean_text 只由 tokens 決定
    pub fn from_tokens(tokens: Vec<String>) -> Self {
        Self {
            clean_text: tokens.join(" "),
            tokens,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Locale {
    #[default]
    #[serde(rename = "en")]
    En,
    #[serde(rename = "pt-BR", alias = "pt")]
    PtBr,
}

impl Locale {
    pub fn code(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::PtBr => "pt-BR",
        }
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "en-us" | "en-gb" => Ok(Locale::En),
            "pt" | "pt-br" => Ok(Locale::PtBr),
            other => Err(format!("unsupported locale '{}' (expected en or pt-BR)", other)),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Category {
    Actionable,
    NonActionable,
}

impl Category {
    pub fn label(&self, locale: Locale) -> &'static str {
        match (self, locale) {
            (Category::Actionable, Locale::En) => "Actionable",
            (Category::NonActionable, Locale::En) => "Non-Actionable",
            (Category::Actionable, Locale::PtBr) => "Produtivo",
            (Category::NonActionable, Locale::PtBr) => "Improdutivo",
        }
    }

    /// 接受任一語系的標籤，不分大小寫
    pub fn parse(label: &str) -> Option<Self> {
        let normalized = label.trim().to_lowercase().replace(['_', ' '], "-");
        match normalized.as_str() {
            "actionable" | "produtivo" => Some(Category::Actionable),
            "non-actionable" | "nonactionable" | "improdutivo" => Some(Category::NonActionable),
            _ => None,
        }
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        category.label(Locale::En).to_string()
    }
}

impl TryFrom<String> for Category {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Category::parse(&value).ok_or_else(|| format!("unknown category '{}'", value))
    }
}

/// 服務回覆的固定格式：剛好四個必填欄位
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Classification {
    pub category: Category,
    pub confidence: f64,
    pub rationale: String,
    pub suggested_response: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClassificationResult {
    Classified(Classification),
    Failed { error: String },
}

impl ClassificationResult {
    pub fn failed(error: impl fmt::Display) -> Self {
        ClassificationResult::Failed {
            error: error.to_string(),
        }
    }

    pub fn classification(&self) -> Option<&Classification> {
        match self {
            ClassificationResult::Classified(c) => Some(c),
            ClassificationResult::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ClassificationResult::Classified(_) => None,
            ClassificationResult::Failed { error } => Some(error),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub original_text_snippet: String,
    pub preprocessed: NormalizedText,
    pub classification: ClassificationResult,
}

impl ResponseEnvelope {
    pub fn new(
        original_text: &str,
        preprocessed: NormalizedText,
        classification: ClassificationResult,
    ) -> Self {
        Self {
            original_text_snippet: snippet(original_text),
            preprocessed,
            classification,
        }
    }
}

pub fn snippet(text: &str) -> String {
    text.chars().take(SNIPPET_CHARS).collect()
}

/// 送往分類服務的一次請求
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationRequest {
    pub system_instruction: String,
    pub user_prompt: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub response_schema: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    pub credential_configured: bool,
    pub model: String,
}
