use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::debug;

use crate::error::ServiceError;
use crate::types::{GrammarIssue, IssueCategory};

use super::{GrammarChecker, GRAMMAR};

/// Fragments of rule ids or messages that mark a match as stylistic rather
/// than grammatical. Spoken transcripts carry no reliable spelling,
/// punctuation, or casing, so those findings never cost points.
const STYLISTIC_MARKERS: &[&str] = &[
    "hyphen",
    "compound",
    "joined",
    "whitespace",
    "comma",
    "punctuation",
    "spelling",
    "typo",
    "morfologik",
    "uppercase",
    "capitalization",
    "repetition",
    "consecutive",
    "successive",
    "same word",
    "style",
    "wordiness",
    "sentence start",
    "rewording",
    "thesaurus",
];

#[derive(Debug, Deserialize)]
struct CheckResponse {
    #[serde(default)]
    matches: Vec<RawMatch>,
}

#[derive(Debug, Deserialize)]
struct RawMatch {
    #[serde(default)]
    message: String,
    offset: usize,
    length: usize,
    #[serde(default)]
    replacements: Vec<RawReplacement>,
    #[serde(default)]
    rule: Option<RawRule>,
}

#[derive(Debug, Deserialize)]
struct RawReplacement {
    value: String,
}

#[derive(Debug, Deserialize)]
struct RawRule {
    id: String,
    #[serde(default)]
    category: Option<RawCategory>,
}

#[derive(Debug, Deserialize)]
struct RawCategory {
    #[serde(default)]
    id: String,
}

/// Grammar checker backed by a LanguageTool HTTP server (`/v2/check`).
#[derive(Debug, Clone)]
pub struct LanguageToolChecker {
    client: Client,
    endpoint: String,
    language: String,
    timeout: Duration,
}

impl LanguageToolChecker {
    pub fn new(
        base_url: &str,
        language: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| ServiceError::unavailable(GRAMMAR, err))?;
        Ok(Self {
            client,
            endpoint: format!("{}/v2/check", base_url.trim_end_matches('/')),
            language: language.into(),
            timeout,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl GrammarChecker for LanguageToolChecker {
    fn check(&self, text: &str) -> Result<Vec<GrammarIssue>, ServiceError> {
        debug!(endpoint = %self.endpoint, chars = text.len(), "requesting grammar check");
        let response = self
            .client
            .post(&self.endpoint)
            .form(&[("text", text), ("language", self.language.as_str())])
            .send()
            .map_err(|err| {
                if err.is_timeout() {
                    ServiceError::timeout(GRAMMAR, self.timeout)
                } else {
                    ServiceError::unavailable(GRAMMAR, err)
                }
            })?
            .error_for_status()
            .map_err(|err| ServiceError::unavailable(GRAMMAR, err))?;
        let body: CheckResponse = response
            .json()
            .map_err(|err| ServiceError::malformed(GRAMMAR, err.to_string()))?;
        Ok(convert_matches(text, body.matches))
    }
}

/// Parses a raw `/v2/check` JSON body. Exposed for offline use and tests.
pub fn parse_response(text: &str, body: &str) -> Result<Vec<GrammarIssue>, ServiceError> {
    let parsed: CheckResponse =
        serde_json::from_str(body).map_err(|err| ServiceError::malformed(GRAMMAR, err.to_string()))?;
    Ok(convert_matches(text, parsed.matches))
}

/// LanguageTool reports spans in UTF-16 code units; issues carry byte spans.
fn convert_matches(text: &str, matches: Vec<RawMatch>) -> Vec<GrammarIssue> {
    matches
        .into_iter()
        .map(|raw| {
            let offset = utf16_to_byte(text, raw.offset);
            let length = utf16_to_byte(text, raw.offset + raw.length) - offset;
            let replacements: Vec<String> =
                raw.replacements.into_iter().map(|r| r.value).collect();
            let (rule_id, category_id) = raw
                .rule
                .map(|rule| (rule.id, rule.category.map(|c| c.id).unwrap_or_default()))
                .unwrap_or_default();
            let category = classify(
                text,
                &rule_id,
                &category_id,
                &raw.message,
                offset,
                length,
                &replacements,
            );
            GrammarIssue {
                category,
                rule_id,
                message: raw.message,
                offset,
                length,
                replacements,
            }
        })
        .collect()
}

/// Byte index of the char starting at `units` UTF-16 code units into `text`.
/// Positions past the end clamp to `text.len()`.
fn utf16_to_byte(text: &str, units: usize) -> usize {
    let mut seen = 0;
    for (index, ch) in text.char_indices() {
        if seen >= units {
            return index;
        }
        seen += ch.len_utf16();
    }
    text.len()
}

/// Decides whether a checker match counts against the speaker.
pub fn classify(
    text: &str,
    rule_id: &str,
    category_id: &str,
    message: &str,
    offset: usize,
    length: usize,
    replacements: &[String],
) -> IssueCategory {
    if only_hyphen_missing(text, offset, length, replacements) {
        return IssueCategory::Stylistic;
    }
    let haystacks = [
        rule_id.to_lowercase(),
        category_id.to_lowercase(),
        message.to_lowercase(),
    ];
    let stylistic = STYLISTIC_MARKERS
        .iter()
        .any(|marker| haystacks.iter().any(|hay| hay.contains(marker)));
    if stylistic {
        IssueCategory::Stylistic
    } else {
        IssueCategory::Critical
    }
}

fn only_hyphen_missing(text: &str, offset: usize, length: usize, replacements: &[String]) -> bool {
    let Some(top) = replacements.first() else {
        return false;
    };
    let flagged = text.get(offset..offset + length).unwrap_or_default();
    top.contains('-') && top.replace('-', "") == flagged.replace(' ', "")
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"{
        "software": {"name": "LanguageTool"},
        "matches": [
            {
                "message": "The verb 'are' does not agree with the subject 'He'.",
                "offset": 0,
                "length": 6,
                "replacements": [{"value": "He is"}],
                "rule": {"id": "HE_VERB_AGR", "category": {"id": "GRAMMAR", "name": "Grammar"}}
            },
            {
                "message": "Possible spelling mistake found.",
                "offset": 22,
                "length": 5,
                "replacements": [{"value": "Priya"}],
                "rule": {"id": "MORFOLOGIK_RULE_EN_US", "category": {"id": "TYPOS"}}
            },
            {
                "message": "This word is normally spelled with a hyphen.",
                "offset": 31,
                "length": 9,
                "replacements": [{"value": "well-known"}],
                "rule": {"id": "EN_COMPOUNDS", "category": {"id": "MISC"}}
            }
        ]
    }"#;

    #[test]
    fn parses_and_classifies_matches() {
        let text = "He are my friend. Hi, Priia is well known.";
        let issues = parse_response(text, BODY).unwrap();
        assert_eq!(issues.len(), 3);
        assert_eq!(issues[0].category, IssueCategory::Critical);
        assert_eq!(issues[0].rule_id, "HE_VERB_AGR");
        assert_eq!(issues[1].category, IssueCategory::Stylistic);
        assert_eq!(issues[2].category, IssueCategory::Stylistic);
    }

    #[test]
    fn hyphen_only_suggestion_is_stylistic_even_without_marker() {
        let text = "a well known place";
        let replacements = vec!["well-known".to_string()];
        let category = classify(text, "SOME_RULE", "MISC", "Consider this.", 2, 10, &replacements);
        assert_eq!(category, IssueCategory::Stylistic);
    }

    #[test]
    fn spans_are_converted_from_utf16_units() {
        let body = r#"{"matches": [{
            "message": "Did you mean this?",
            "offset": 6,
            "length": 10,
            "replacements": [{"value": "well-known"}],
            "rule": {"id": "SOME_RULE", "category": {"id": "MISC"}}
        }]}"#;
        for text in ["I’m a well known singer", "I'm a well known singer"] {
            let issues = parse_response(text, body).unwrap();
            assert_eq!(issues[0].category, IssueCategory::Stylistic, "{text:?}");
            assert_eq!(issues[0].context(text, 0), "well known", "{text:?}");
        }
    }

    #[test]
    fn astral_chars_count_as_two_units() {
        let text = "😀 He are here";
        assert_eq!(utf16_to_byte(text, 0), 0);
        assert_eq!(utf16_to_byte(text, 3), 5);
        assert_eq!(utf16_to_byte(text, 99), text.len());
    }

    #[test]
    fn malformed_body_is_reported() {
        let err = parse_response("text", "{not json").unwrap_err();
        assert!(matches!(err, ServiceError::Malformed { .. }));
    }

    #[test]
    fn endpoint_is_normalized() {
        let checker =
            LanguageToolChecker::new("http://localhost:8081/", "en-US", Duration::from_secs(1))
                .unwrap();
        assert_eq!(checker.endpoint(), "http://localhost:8081/v2/check");
    }
}
