use crate::domain::model::{Category, Locale};
use serde_json::json;

pub const REPLY_FIELDS: [&str; 4] = ["category", "confidence", "rationale", "suggested_response"];

pub fn system_instruction(locale: Locale) -> String {
    let actionable = Category::Actionable.label(locale);
    let non_actionable = Category::NonActionable.label(locale);

    match locale {
        Locale::En => format!(
            "You are an assistant that sorts emails into exactly two categories: \
             '{actionable}' (the email needs a specific action or reply) or \
             '{non_actionable}' (no immediate action is needed). \
             Answer with valid JSON containing the keys: category, confidence (0-1), \
             rationale (one sentence) and suggested_response (the reply text)."
        ),
        Locale::PtBr => format!(
            "Você é um assistente que classifica emails em exatamente duas categorias: \
             '{actionable}' (o email exige uma ação ou resposta específica) ou \
             '{non_actionable}' (não precisa de ação imediata). \
             Responda em JSON válido com as chaves: category, confidence (0-1), \
             rationale (uma frase) e suggested_response (texto da resposta)."
        ),
    }
}

/// 原文與正規化文字都原封不動放進去，長度限制交給服務端
pub fn user_prompt(locale: Locale, original_text: &str, clean_text: &str) -> String {
    let actionable = Category::Actionable.label(locale);
    let non_actionable = Category::NonActionable.label(locale);

    match locale {
        Locale::En => format!(
            "Original email text:\n-----\n{original_text}\n-----\n\n\
             Preprocessed text:\n-----\n{clean_text}\n-----\n\n\
             Classify only as '{actionable}' or '{non_actionable}'.\n\
             Give an approximate confidence (e.g. 0.85).\n\
             Write a short, clear and professional automatic reply in English.\n\
             Answer ONLY with valid JSON.\n"
        ),
        Locale::PtBr => format!(
            "Texto original do email:\n-----\n{original_text}\n-----\n\n\
             Texto pré-processado:\n-----\n{clean_text}\n-----\n\n\
             Classifique apenas como '{actionable}' ou '{non_actionable}'.\n\
             Informe uma confiança aproximada (ex: 0.85).\n\
             Escreva uma resposta automática curta, clara e profissional em português.\n\
             Responda SOMENTE em JSON válido.\n"
        ),
    }
}

/// Gemini responseSchema (OpenAPI 子集)
pub fn response_schema(locale: Locale) -> serde_json::Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "category": {
                "type": "STRING",
                "enum": [
                    Category::Actionable.label(locale),
                    Category::NonActionable.label(locale),
                ],
            },
            "confidence": { "type": "NUMBER" },
            "rationale": { "type": "STRING" },
            "suggested_response": { "type": "STRING" },
        },
        "required": REPLY_FIELDS,
        "propertyOrdering": REPLY_FIELDS,
    })
}
