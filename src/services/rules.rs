use crate::error::ServiceError;
use crate::lexical::{token_spans, TokenSpan};
use crate::types::{GrammarIssue, IssueCategory};

use super::GrammarChecker;

/// (subject, verb that disagrees, agreeing verb)
const AGREEMENT: &[(&str, &str, &str)] = &[
    ("i", "is", "am"),
    ("i", "are", "am"),
    ("i", "has", "have"),
    ("i", "does", "do"),
    ("he", "are", "is"),
    ("she", "are", "is"),
    ("it", "are", "is"),
    ("he", "have", "has"),
    ("she", "have", "has"),
    ("he", "don't", "doesn't"),
    ("she", "don't", "doesn't"),
    ("it", "don't", "doesn't"),
    ("we", "is", "are"),
    ("they", "is", "are"),
    ("you", "is", "are"),
    ("we", "was", "were"),
    ("they", "was", "were"),
    ("you", "was", "were"),
    ("we", "has", "have"),
    ("they", "has", "have"),
    ("you", "has", "have"),
];

const NEGATORS: &[&str] = &[
    "don't", "doesn't", "didn't", "can't", "won't", "isn't", "aren't", "never", "not",
];
const NEGATIVE_OBJECTS: &[&str] = &["no", "nothing", "nobody", "none", "nowhere"];
const NEGATION_WINDOW: usize = 3;

// Words whose spelling and pronunciation disagree on a leading vowel sound.
const VOWEL_LETTER_CONSONANT_SOUND: &[&str] = &[
    "one", "once", "unique", "university", "uniform", "union", "unit", "user", "useful", "usual",
    "european", "euro",
];
const SILENT_H: &[&str] = &["hour", "hours", "honest", "honour", "honor", "heir"];

/// Small in-process checker covering the mistakes most common in spoken
/// introductions. Agreement, article, and double-negative findings are
/// critical; repetition and capitalization are stylistic.
#[derive(Debug, Default, Clone)]
pub struct RuleGrammarChecker {}

impl RuleGrammarChecker {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GrammarChecker for RuleGrammarChecker {
    fn check(&self, text: &str) -> Result<Vec<GrammarIssue>, ServiceError> {
        let spans = token_spans(text);
        let mut issues = Vec::new();
        for (index, span) in spans.iter().enumerate() {
            if is_lowercase_pronoun(text, span) {
                issues.push(issue(
                    IssueCategory::Stylistic,
                    "I_LOWERCASE",
                    "The pronoun 'I' should be uppercase.",
                    span,
                    span,
                    vec![uppercase_pronoun(&text[span.start..span.end])],
                ));
            }
            let Some(next) = spans.get(index + 1) else {
                continue;
            };
            if let Some(found) = repeated_word(span, next) {
                issues.push(found);
            }
            if let Some(found) = article_mismatch(span, next) {
                issues.push(found);
            }
            if let Some(found) = agreement_mismatch(span, next) {
                issues.push(found);
            }
            if let Some(found) = double_negative(&spans, index) {
                issues.push(found);
            }
        }
        issues.sort_by_key(|issue| issue.offset);
        Ok(issues)
    }
}

fn issue(
    category: IssueCategory,
    rule_id: &str,
    message: impl Into<String>,
    first: &TokenSpan,
    last: &TokenSpan,
    replacements: Vec<String>,
) -> GrammarIssue {
    GrammarIssue {
        category,
        rule_id: rule_id.to_string(),
        message: message.into(),
        offset: first.start,
        length: last.end - first.start,
        replacements,
    }
}

fn is_lowercase_pronoun(text: &str, span: &TokenSpan) -> bool {
    let raw = &text[span.start..span.end];
    raw == "i" || raw.starts_with("i'") || raw.starts_with("i\u{2019}")
}

fn uppercase_pronoun(raw: &str) -> String {
    let mut fixed = String::with_capacity(raw.len());
    fixed.push('I');
    fixed.push_str(&raw[1..]);
    fixed
}

fn repeated_word(current: &TokenSpan, next: &TokenSpan) -> Option<GrammarIssue> {
    let alphabetic = current.text.chars().all(char::is_alphabetic);
    (alphabetic && current.text == next.text).then(|| {
        issue(
            IssueCategory::Stylistic,
            "ENGLISH_WORD_REPEAT_RULE",
            "Possible typo: you repeated a word.",
            current,
            next,
            vec![current.text.clone()],
        )
    })
}

fn article_mismatch(article: &TokenSpan, next: &TokenSpan) -> Option<GrammarIssue> {
    let word = next.text.as_str();
    let first = word.chars().next()?;
    if !first.is_alphabetic() {
        return None;
    }
    let vowel_letter = matches!(first, 'a' | 'e' | 'i' | 'o' | 'u');
    let vowel_sound = if vowel_letter {
        !VOWEL_LETTER_CONSONANT_SOUND.contains(&word)
    } else {
        SILENT_H.contains(&word)
    };
    let expected = match (article.text.as_str(), vowel_sound) {
        ("a", true) => "an",
        ("an", false) => "a",
        _ => return None,
    };
    Some(issue(
        IssueCategory::Critical,
        "EN_A_VS_AN",
        format!("Use '{expected}' instead of '{}' before '{word}'.", article.text),
        article,
        next,
        vec![format!("{expected} {word}")],
    ))
}

fn agreement_mismatch(subject: &TokenSpan, verb: &TokenSpan) -> Option<GrammarIssue> {
    AGREEMENT
        .iter()
        .find(|(s, v, _)| *s == subject.text && *v == verb.text)
        .map(|(s, v, fix)| {
            issue(
                IssueCategory::Critical,
                "SUBJECT_VERB_AGREEMENT",
                format!("'{s} {v}' does not agree; did you mean '{s} {fix}'?"),
                subject,
                verb,
                vec![format!("{s} {fix}")],
            )
        })
}

fn double_negative(spans: &[TokenSpan], index: usize) -> Option<GrammarIssue> {
    let negator = &spans[index];
    if !NEGATORS.contains(&negator.text.as_str()) {
        return None;
    }
    spans
        .iter()
        .skip(index + 1)
        .take(NEGATION_WINDOW)
        .find(|span| NEGATIVE_OBJECTS.contains(&span.text.as_str()))
        .map(|object| {
            issue(
                IssueCategory::Critical,
                "DOUBLE_NEGATIVE",
                format!(
                    "Double negative: '{}' combined with '{}'.",
                    negator.text, object.text
                ),
                negator,
                object,
                Vec::new(),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule_ids(text: &str) -> Vec<String> {
        RuleGrammarChecker::new()
            .check(text)
            .unwrap()
            .into_iter()
            .map(|issue| issue.rule_id)
            .collect()
    }

    #[test]
    fn clean_sentence_has_no_issues() {
        assert!(rule_ids("My name is Asha and I am fifteen years old.").is_empty());
    }

    #[test]
    fn flags_subject_verb_disagreement_as_critical() {
        let issues = RuleGrammarChecker::new().check("He are my best friend.").unwrap();
        assert_eq!(issues.len(), 1);
        assert!(issues[0].is_critical());
        assert_eq!(issues[0].offset, 0);
        assert_eq!(issues[0].length, "He are".len());
        assert_eq!(issues[0].replacements, vec!["he is".to_string()]);
    }

    #[test]
    fn article_rule_knows_common_exceptions() {
        assert_eq!(rule_ids("I ate a apple"), vec!["EN_A_VS_AN"]);
        assert!(rule_ids("I go to a university near an hour away").is_empty());
        assert_eq!(rule_ids("She is an doctor"), vec!["EN_A_VS_AN"]);
    }

    #[test]
    fn repetition_and_lowercase_pronoun_are_stylistic() {
        let issues = RuleGrammarChecker::new().check("i like the the park").unwrap();
        assert_eq!(issues.len(), 2);
        assert!(issues.iter().all(|issue| !issue.is_critical()));
        assert_eq!(issues[0].replacements, vec!["I".to_string()]);
    }

    #[test]
    fn detects_double_negative() {
        assert_eq!(rule_ids("I don't have no pets"), vec!["DOUBLE_NEGATIVE"]);
        assert!(rule_ids("I do not like football but I have no regrets").is_empty());
    }
}
