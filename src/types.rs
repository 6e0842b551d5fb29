//! Core types for the introduction scoring pipeline

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::lexical;

/// Validated evaluation request: transcript text plus spoken duration.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationInput {
    transcript: String,
    duration_minutes: f64,
}

impl EvaluationInput {
    pub fn new(
        transcript: impl Into<String>,
        duration_minutes: f64,
    ) -> Result<Self, ValidationError> {
        let transcript = transcript.into();
        if lexical::word_count(&transcript) == 0 {
            return Err(ValidationError::EmptyTranscript);
        }
        if !duration_minutes.is_finite() {
            return Err(ValidationError::NonFiniteDuration(duration_minutes));
        }
        if duration_minutes <= 0.0 {
            return Err(ValidationError::NonPositiveDuration(duration_minutes));
        }
        Ok(Self {
            transcript,
            duration_minutes,
        })
    }

    /// Builds an input from a duration measured in seconds.
    pub fn from_seconds(
        transcript: impl Into<String>,
        duration_seconds: f64,
    ) -> Result<Self, ValidationError> {
        Self::new(transcript, duration_seconds / 60.0)
    }

    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    pub fn duration_minutes(&self) -> f64 {
        self.duration_minutes
    }
}

/// One scored category of the rubric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Salutation,
    Content,
    SpeechRate,
    Grammar,
    VocabularyClarity,
    FlowSentiment,
}

impl Dimension {
    pub const ALL: [Dimension; 6] = [
        Dimension::Salutation,
        Dimension::Content,
        Dimension::SpeechRate,
        Dimension::Grammar,
        Dimension::VocabularyClarity,
        Dimension::FlowSentiment,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Dimension::Salutation => "Salutation",
            Dimension::Content => "Content & Structure",
            Dimension::SpeechRate => "Speech Rate",
            Dimension::Grammar => "Grammar",
            Dimension::VocabularyClarity => "Vocabulary & Clarity",
            Dimension::FlowSentiment => "Flow & Sentiment",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Points awarded for a single dimension along with its feedback text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DimensionScore {
    pub dimension: Dimension,
    pub awarded: u32,
    pub max: u32,
    pub feedback: String,
    /// Set when a backing service failed and a fallback heuristic produced the score.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degraded: Option<String>,
}

impl DimensionScore {
    pub fn new(dimension: Dimension, awarded: u32, max: u32, feedback: impl Into<String>) -> Self {
        Self {
            dimension,
            awarded: awarded.min(max),
            max,
            feedback: feedback.into(),
            degraded: None,
        }
    }

    pub fn degraded(mut self, reason: impl Into<String>) -> Self {
        self.degraded = Some(reason.into());
        self
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded.is_some()
    }
}

/// How a topic was (or was not) detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchSource {
    Keyword,
    Semantic,
    Missed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicCoverage {
    pub topic: String,
    /// Best similarity in [0, 1]; keyword hits report 1.0.
    pub score: f32,
    pub covered: bool,
    pub source: MatchSource,
    /// Bonus topics are reported but do not contribute content points.
    pub bonus: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCategory {
    Critical,
    Stylistic,
}

/// A single rule violation reported by a grammar checker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrammarIssue {
    pub category: IssueCategory,
    pub rule_id: String,
    pub message: String,
    /// Byte offset into the transcript.
    pub offset: usize,
    /// Byte length of the flagged span.
    pub length: usize,
    #[serde(default)]
    pub replacements: Vec<String>,
}

impl GrammarIssue {
    pub fn is_critical(&self) -> bool {
        self.category == IssueCategory::Critical
    }

    /// Text around the flagged span, clipped to valid char boundaries.
    pub fn context<'t>(&self, text: &'t str, trailing: usize) -> &'t str {
        let start = floor_char_boundary(text, self.offset.min(text.len()));
        let end = floor_char_boundary(text, (self.offset + self.length + trailing).min(text.len()));
        &text[start..end.max(start)]
    }
}

fn floor_char_boundary(text: &str, mut index: usize) -> usize {
    while index > 0 && !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

/// Full evaluation output, owned by the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreReport {
    pub total: u32,
    pub max_total: u32,
    pub word_count: usize,
    pub words_per_minute: f64,
    pub dimensions: Vec<DimensionScore>,
    pub topics: Vec<TopicCoverage>,
    pub grammar_issues: Vec<GrammarIssue>,
}

impl ScoreReport {
    pub fn dimension(&self, dimension: Dimension) -> Option<&DimensionScore> {
        self.dimensions
            .iter()
            .find(|score| score.dimension == dimension)
    }

    pub fn is_degraded(&self) -> bool {
        self.dimensions.iter().any(DimensionScore::is_degraded)
    }

    pub fn degraded_dimensions(&self) -> Vec<Dimension> {
        self.dimensions
            .iter()
            .filter(|score| score.is_degraded())
            .map(|score| score.dimension)
            .collect()
    }
}
