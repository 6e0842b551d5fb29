use tracing::warn;

use crate::config::{GrammarConfig, Rubric};
use crate::services::NlpServices;
use crate::types::{Dimension, DimensionScore, GrammarIssue};

const LISTED_ISSUES: usize = 3;
const CONTEXT_TRAILING: usize = 20;

#[derive(Debug, Clone, PartialEq)]
pub struct GrammarOutcome {
    pub score: DimensionScore,
    /// Every issue the checker returned, critical and stylistic.
    pub issues: Vec<GrammarIssue>,
}

/// Critical errors per 100 words. Zero words means zero density.
pub fn error_density(critical: usize, words: usize) -> f64 {
    if words == 0 {
        return 0.0;
    }
    critical as f64 / (words as f64 / 100.0)
}

/// Walks the step table; the first band whose ceiling holds the density wins.
pub fn grammar_points(density: f64, config: &GrammarConfig) -> (u32, &str) {
    config
        .bands
        .iter()
        .find(|band| density <= band.max_density)
        .map(|band| (band.points, band.label.as_str()))
        .unwrap_or((config.floor_points, config.floor_label.as_str()))
}

pub fn score_grammar(
    text: &str,
    word_count: usize,
    services: &NlpServices,
    rubric: &Rubric,
) -> GrammarOutcome {
    let config = &rubric.config().grammar;
    let max = rubric.max_for(Dimension::Grammar);
    let issues = match services.check_grammar(text) {
        Ok(issues) => issues,
        Err(err) => {
            warn!(
                service = err.service(),
                error = %err,
                "grammar check failed, awarding neutral score"
            );
            let score = DimensionScore::new(
                Dimension::Grammar,
                config.degraded_points,
                max,
                "Grammar unverified: checker unavailable.",
            )
            .degraded(format!("grammar unverified ({err})"));
            return GrammarOutcome {
                score,
                issues: Vec::new(),
            };
        }
    };

    let (critical, ignored): (Vec<&GrammarIssue>, Vec<&GrammarIssue>) =
        issues.iter().partition(|issue| issue.is_critical());
    let density = error_density(critical.len(), word_count);
    let (points, label) = grammar_points(density, config);

    let mut feedback = format!(
        "{label}: {} critical error(s), {density:.2} per 100 words. Spelling, hyphenation, punctuation and style are not penalized.",
        critical.len()
    );
    if !critical.is_empty() {
        feedback.push_str(" Errors: ");
        feedback.push_str(&describe(text, &critical));
        feedback.push('.');
    }
    if !ignored.is_empty() {
        feedback.push_str(&format!(
            " Ignored {} stylistic issue(s): {}.",
            ignored.len(),
            describe(text, &ignored)
        ));
    }

    GrammarOutcome {
        score: DimensionScore::new(Dimension::Grammar, points, max, feedback),
        issues,
    }
}

fn describe(text: &str, issues: &[&GrammarIssue]) -> String {
    issues
        .iter()
        .take(LISTED_ISSUES)
        .map(|issue| {
            format!(
                "{} (\"{}\")",
                issue.message,
                issue.context(text, CONTEXT_TRAILING).trim()
            )
        })
        .collect::<Vec<_>>()
        .join("; ")
}
