use crate::domain::ports::Lemmatizer;
use std::collections::HashMap;

/// 依序比對的名詞複數規則 (suffix, replacement)
const SUFFIX_RULES: &[(&str, &str)] = &[
    ("sses", "ss"),
    ("ies", "y"),
    ("xes", "x"),
    ("zes", "z"),
    ("ches", "ch"),
    ("shes", "sh"),
];

/// 結尾是這些時不去掉 -s
const KEEP_TRAILING_S: &[&str] = &["ss", "us", "is"];

const IRREGULAR: &[(&str, &str)] = &[
    ("men", "man"),
    ("women", "woman"),
    ("children", "child"),
    ("feet", "foot"),
    ("teeth", "tooth"),
    ("geese", "goose"),
    ("mice", "mouse"),
    ("data", "datum"),
    ("analyses", "analysis"),
    ("crises", "crisis"),
    ("theses", "thesis"),
    ("series", "series"),
    ("species", "species"),
    ("news", "news"),
];

const MIN_RULE_LEN: usize = 4;
const MAX_PASSES: usize = 8;

/// 與語言無關的英文名詞詞形還原。
///
/// 一次只處理一個 token；對葡萄牙文只是盡力而為。
/// 規則會重複套用直到不再變化，所以結果再還原一次不會改變。
#[derive(Debug, Clone)]
pub struct EnglishLemmatizer {
    irregular: HashMap<&'static str, &'static str>,
}

impl EnglishLemmatizer {
    pub fn new() -> Self {
        Self {
            irregular: IRREGULAR.iter().copied().collect(),
        }
    }

    fn step(&self, word: &str) -> Option<String> {
        if let Some(&lemma) = self.irregular.get(word) {
            return (lemma != word).then(|| lemma.to_string());
        }

        if word.chars().count() < MIN_RULE_LEN {
            return None;
        }

        for (suffix, replacement) in SUFFIX_RULES {
            if let Some(stem) = word.strip_suffix(suffix) {
                return Some(format!("{}{}", stem, replacement));
            }
        }

        if word.ends_with('s') && !KEEP_TRAILING_S.iter().any(|s| word.ends_with(s)) {
            return word.strip_suffix('s').map(str::to_string);
        }

        None
    }
}

impl Default for EnglishLemmatizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Lemmatizer for EnglishLemmatizer {
    fn lemmatize(&self, token: &str) -> String {
        let mut current = token.to_string();
        for _ in 0..MAX_PASSES {
            match self.step(&current) {
                Some(next) if next != current => current = next,
                _ => break,
            }
        }
        current
    }
}
