use crate::core::lemmatizer::EnglishLemmatizer;
use crate::core::stopwords::StopwordSet;
use crate::domain::model::NormalizedText;
use crate::domain::ports::Lemmatizer;
use regex::Regex;
use std::sync::{Arc, LazyLock};

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\S+@\S+").expect("email pattern"));
static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://\S+|www\.\S+").expect("url pattern"));
// 小寫拉丁字母、葡萄牙文重音字母與空白之外的字元全部移除（含數字與標點）
static NON_LETTER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zãâáàêéíóôõúüçñ\s]").expect("letter pattern"));
static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern"));

/// 純函式的文字正規化：不做 I/O，也不會失敗。
///
/// 步驟順序會影響結果，不可調換：
/// 小寫 → 移除 email → 移除 URL → 移除非字母 → 壓縮空白 → 斷詞
/// → 去停用詞與單字元 → 詞形還原。
#[derive(Clone)]
pub struct Normalizer {
    stopwords: Arc<StopwordSet>,
    lemmatizer: Arc<dyn Lemmatizer>,
}

impl Normalizer {
    pub fn new(stopwords: Arc<StopwordSet>, lemmatizer: Arc<dyn Lemmatizer>) -> Self {
        Self {
            stopwords,
            lemmatizer,
        }
    }

    pub fn normalize(&self, text: &str) -> NormalizedText {
        if text.is_empty() {
            return NormalizedText::empty();
        }

        let cleaned = clean(text);
        let tokens: Vec<String> = tokenize(&cleaned)
            .filter(|token| !self.is_noise(token))
            .map(|token| self.lemma_for(token))
            .collect();

        NormalizedText::from_tokens(tokens)
    }

    pub fn normalize_optional(&self, text: Option<&str>) -> NormalizedText {
        text.map(|t| self.normalize(t)).unwrap_or_default()
    }

    fn is_noise(&self, token: &str) -> bool {
        token.chars().count() <= 1 || self.stopwords.contains(token)
    }

    /// 還原結果若變成停用詞或單字元就保留原詞，確保第二次正規化結果不變
    fn lemma_for(&self, token: &str) -> String {
        let lemma = self.lemmatizer.lemmatize(token);
        if self.is_noise(&lemma) {
            token.to_string()
        } else {
            lemma
        }
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(
            Arc::new(StopwordSet::bilingual()),
            Arc::new(EnglishLemmatizer::new()),
        )
    }
}

/// 第 1 到 5 步
fn clean(text: &str) -> String {
    let lowered = text.to_lowercase();
    let without_emails = EMAIL_RE.replace_all(&lowered, " ");
    let without_urls = URL_RE.replace_all(&without_emails, " ");
    let letters_only = NON_LETTER_RE.replace_all(&without_urls, " ");
    WHITESPACE_RE
        .replace_all(&letters_only, " ")
        .trim()
        .to_string()
}

/// 清理後只剩字母與單一空白，詞層級的切分等同以空白切開
fn tokenize(cleaned: &str) -> impl Iterator<Item = &str> {
    cleaned.split_whitespace()
}
