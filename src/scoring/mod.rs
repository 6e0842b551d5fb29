//! Rubric scorers and the composer that runs them.

pub mod content;
pub mod flow;
pub mod grammar;
pub mod rate;
pub mod salutation;
pub mod similarity;
pub mod vocabulary;

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::Rubric;
use crate::error::ValidationError;
use crate::lexical::{sentences, tokenize};
use crate::services::NlpServices;
use crate::types::{EvaluationInput, ScoreReport};

pub use content::{score_content, ContentOutcome};
pub use flow::score_flow_sentiment;
pub use grammar::{score_grammar, GrammarOutcome};
pub use rate::score_rate;
pub use salutation::score_salutation;
pub use vocabulary::score_vocabulary_clarity;

/// Runs every dimension scorer over one transcript and assembles the report.
///
/// Holds only shared, read-only state, so one composer can serve any number
/// of evaluations (including concurrently from several threads).
#[derive(Debug, Clone)]
pub struct RubricComposer {
    rubric: Arc<Rubric>,
    services: NlpServices,
}

impl RubricComposer {
    pub fn new(rubric: Arc<Rubric>, services: NlpServices) -> Self {
        Self { rubric, services }
    }

    pub fn rubric(&self) -> &Rubric {
        &self.rubric
    }

    /// Validates the input and scores it. Service failures never surface
    /// here; they show up as degraded dimensions in the report.
    pub fn evaluate(
        &self,
        transcript: &str,
        duration_minutes: f64,
    ) -> Result<ScoreReport, ValidationError> {
        let input = EvaluationInput::new(transcript, duration_minutes)?;
        self.evaluate_input(&input)
    }

    pub fn evaluate_input(&self, input: &EvaluationInput) -> Result<ScoreReport, ValidationError> {
        let rubric = self.rubric.as_ref();
        let text = input.transcript();
        let tokens = tokenize(text);
        let word_count = tokens.len();
        let wpm = rate::words_per_minute(word_count, input.duration_minutes())?;
        info!(
            word_count,
            wpm,
            timeout_ms = self.services.timeout().as_millis() as u64,
            "evaluating transcript"
        );

        let salutation = score_salutation(&tokens, rubric);
        let content = score_content(text, &sentences(text), &self.services, rubric);
        let speech_rate = score_rate(word_count, input.duration_minutes(), rubric)?;
        let grammar = score_grammar(text, word_count, &self.services, rubric);
        let vocabulary = score_vocabulary_clarity(&tokens, rubric);
        let flow = score_flow_sentiment(text, &tokens, &self.services, rubric);

        let dimensions = vec![
            salutation,
            content.score,
            speech_rate,
            grammar.score,
            vocabulary,
            flow,
        ];
        let total = dimensions.iter().map(|score| score.awarded).sum();
        let report = ScoreReport {
            total,
            max_total: rubric.config().maxima.total(),
            word_count,
            words_per_minute: wpm,
            dimensions,
            topics: content.coverage,
            grammar_issues: grammar.issues,
        };

        if report.is_degraded() {
            warn!(
                total = report.total,
                degraded = ?report.degraded_dimensions(),
                "evaluation finished with degraded dimensions"
            );
        } else {
            info!(total = report.total, "evaluation finished");
        }
        Ok(report)
    }
}
