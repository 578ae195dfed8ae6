use mail_triage::core::stopwords::StopwordSet;
use mail_triage::domain::ports::Lemmatizer;
use mail_triage::{NormalizedText, Normalizer};
use std::sync::Arc;

const EMAILS: [&str; 6] = [
    "Hi team,\n\nThe billing server has been DOWN since 09:00. Can someone restart it? \
     Logs: https://logs.example.com/billing?id=77 -- ops@example.com",
    "Prezados, segue em anexo o relatório mensal. Favor confirmar o recebimento até sexta-feira.",
    "Merry Christmas and a happy new year to all of you!!! 🎄🎉",
    "Olá! Só passando para agradecer pelo ótimo trabalho na última entrega.",
    "RE: RE: FW: invoices #2231, #2232 & #2240 (see www.vendor.io/invoices)",
    "",
];

#[test]
fn test_clean_text_is_always_the_joined_tokens() {
    let normalizer = Normalizer::default();
    for email in EMAILS {
        let result = normalizer.normalize(email);
        assert_eq!(result.clean_text, result.tokens.join(" "));
        assert!(result.tokens.iter().all(|t| t.chars().count() > 1));
        assert!(result
            .tokens
            .iter()
            .all(|t| !t.contains(char::is_whitespace) && !t.is_empty()));
    }
}

#[test]
fn test_normalization_is_idempotent() {
    let normalizer = Normalizer::default();
    for email in EMAILS {
        let once = normalizer.normalize(email);
        let twice = normalizer.normalize(&once.clean_text);
        assert_eq!(once, twice, "second pass changed {:?}", email);
    }
}

#[test]
fn test_no_digits_urls_or_addresses_survive() {
    let result = Normalizer::default().normalize(EMAILS[0]);

    assert!(!result.clean_text.chars().any(|c| c.is_ascii_digit()));
    for residue in ["https", "logs", "example", "ops", "com"] {
        assert!(
            !result.tokens.iter().any(|t| t == residue),
            "{} survived in {:?}",
            residue,
            result.tokens
        );
    }
    assert!(result.tokens.contains(&"billing".to_string()));
    assert!(result.tokens.contains(&"restart".to_string()));
}

#[test]
fn test_addresses_and_shouting_are_dropped() {
    let result =
        Normalizer::default().normalize("Contact me at a@b.com or visit https://x.com NOW!!! 123");
    assert_eq!(result.tokens, vec!["contact", "visit"]);
}

#[test]
fn test_absent_and_empty_inputs() {
    let normalizer = Normalizer::default();
    assert_eq!(normalizer.normalize_optional(None), NormalizedText::empty());
    assert_eq!(normalizer.normalize(""), NormalizedText::empty());
    assert!(normalizer.normalize("!!! 123 ... ???").is_empty());
}

struct IdentityLemmatizer;

impl Lemmatizer for IdentityLemmatizer {
    fn lemmatize(&self, token: &str) -> String {
        token.to_string()
    }
}

#[test]
fn test_custom_resources_are_injected() {
    let normalizer = Normalizer::new(
        Arc::new(StopwordSet::from_words(["invoice"])),
        Arc::new(IdentityLemmatizer),
    );

    let result = normalizer.normalize("Invoice invoices attached");
    assert_eq!(result.tokens, vec!["invoices", "attached"]);
}
