//! Rubric configuration: raw serde shape, validation, and the compiled form
//! handed to the composer.

use std::path::Path;
use std::time::Duration;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::lexical::{tokenize, FillerVocabulary};
use crate::types::Dimension;

const BUNDLED_RUBRIC: &str = include_str!("../../assets/rubric.json");

/// Points every dimension maxima set must add up to.
pub const TOTAL_POINTS: u32 = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RubricConfig {
    pub maxima: DimensionMaxima,
    pub salutation: SalutationConfig,
    pub content: ContentConfig,
    pub speech_rate: SpeechRateConfig,
    pub grammar: GrammarConfig,
    pub vocabulary: VocabularyConfig,
    pub flow: FlowConfig,
    #[serde(default)]
    pub services: ServiceConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DimensionMaxima {
    pub salutation: u32,
    pub content: u32,
    pub speech_rate: u32,
    pub grammar: u32,
    pub vocabulary_clarity: u32,
    pub flow_sentiment: u32,
}

impl DimensionMaxima {
    pub fn get(&self, dimension: Dimension) -> u32 {
        match dimension {
            Dimension::Salutation => self.salutation,
            Dimension::Content => self.content,
            Dimension::SpeechRate => self.speech_rate,
            Dimension::Grammar => self.grammar,
            Dimension::VocabularyClarity => self.vocabulary_clarity,
            Dimension::FlowSentiment => self.flow_sentiment,
        }
    }

    pub fn total(&self) -> u32 {
        Dimension::ALL.iter().map(|d| self.get(*d)).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SalutationConfig {
    pub formal: Vec<String>,
    pub casual: Vec<String>,
    pub basic: Vec<String>,
    pub formal_points: u32,
    pub casual_points: u32,
    pub basic_points: u32,
}

/// A named topic with canonical phrases and an optional fast-path pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TopicTarget {
    pub name: String,
    #[serde(default)]
    pub phrases: Vec<String>,
    /// Regex matched against the raw transcript.
    #[serde(default)]
    pub keywords: Option<String>,
    /// Compile `keywords` as written instead of case-insensitively, for
    /// patterns that need to see capitalization. Use `(?i:...)` groups for
    /// the parts that should still ignore case.
    #[serde(default)]
    pub case_sensitive: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContentConfig {
    pub threshold: f32,
    pub topics: Vec<TopicTarget>,
    #[serde(default)]
    pub bonus_topics: Vec<TopicTarget>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpeechRateConfig {
    pub ideal_min: f64,
    pub ideal_max: f64,
    pub acceptable_min: f64,
    pub acceptable_max: f64,
    pub ideal_points: u32,
    pub acceptable_points: u32,
    pub poor_points: u32,
}

/// Grammar step: densities up to `max_density` errors per 100 words earn `points`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DensityBand {
    pub max_density: f64,
    pub points: u32,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GrammarConfig {
    pub bands: Vec<DensityBand>,
    pub floor_points: u32,
    pub floor_label: String,
    pub degraded_points: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VocabularyConfig {
    pub vocabulary_max: u32,
    pub clarity_max: u32,
    /// Token count below which the type-token ratio is scaled down.
    pub min_tokens: usize,
    pub ttr_floor: f64,
    pub ttr_ceiling: f64,
    /// Filler ratio at which clarity reaches zero.
    pub filler_saturation: f64,
    pub fillers: Vec<String>,
}

/// Sentiment step: normalized polarity at or above `min_polarity` earns `points`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PolarityBand {
    pub min_polarity: f64,
    pub points: u32,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnchorPhrases {
    pub intro: Vec<String>,
    pub body: Vec<String>,
    pub closing: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FlowConfig {
    pub flow_max: u32,
    pub sentiment_max: u32,
    pub anchor_threshold: f32,
    pub anchors: AnchorPhrases,
    pub sentiment_bands: Vec<PolarityBand>,
    pub sentiment_floor_points: u32,
    pub sentiment_floor_label: String,
    pub degraded_sentiment_points: u32,
    #[serde(default)]
    pub enthusiasm_keywords: Vec<String>,
    /// Normalized polarity ceiling applied when no enthusiasm keyword appears.
    pub enthusiasm_cap: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConfig {
    pub timeout_ms: u64,
    pub language: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language_tool_url: Option<String>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 5_000,
            language: "en-US".to_string(),
            language_tool_url: None,
        }
    }
}

impl ServiceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl RubricConfig {
    /// The rubric shipped with the crate.
    pub fn bundled() -> Result<Self, ConfigError> {
        Self::from_json(BUNDLED_RUBRIC, "parsing bundled rubric")
    }

    pub fn from_json(raw: &str, context: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(raw).map_err(|source| ConfigError::json(context, source))
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let canonical = path
            .canonicalize()
            .map_err(|source| ConfigError::io(format!("resolving {:?}", path), source))?;
        if !canonical.is_file() {
            return Err(ConfigError::invalid(format!(
                "rubric path {:?} is not a file",
                canonical
            )));
        }
        let raw = std::fs::read_to_string(&canonical)
            .map_err(|source| ConfigError::io(format!("reading {:?}", canonical), source))?;
        Self::from_json(&raw, &format!("parsing {:?}", canonical))
    }

    /// Checks every structural invariant the scorers rely on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let total = self.maxima.total();
        if total != TOTAL_POINTS {
            return Err(ConfigError::invalid(format!(
                "dimension maxima sum to {total}, expected {TOTAL_POINTS}"
            )));
        }
        self.validate_salutation()?;
        self.validate_content()?;
        self.validate_speech_rate()?;
        self.validate_grammar()?;
        self.validate_vocabulary()?;
        self.validate_flow()?;
        if self.services.timeout_ms == 0 {
            return Err(ConfigError::invalid("service timeout must be positive"));
        }
        Ok(())
    }

    fn validate_salutation(&self) -> Result<(), ConfigError> {
        let s = &self.salutation;
        ensure_config(
            s.formal_points <= self.maxima.salutation,
            "formal salutation points exceed the dimension maximum",
        )?;
        ensure_config(
            s.formal_points >= s.casual_points && s.casual_points >= s.basic_points,
            "salutation tiers must be ordered formal >= casual >= basic",
        )?;
        ensure_config(
            !(s.formal.is_empty() && s.casual.is_empty() && s.basic.is_empty()),
            "salutation vocabulary is empty",
        )
    }

    fn validate_content(&self) -> Result<(), ConfigError> {
        let content = &self.content;
        ensure_config(!content.topics.is_empty(), "content topic list is empty")?;
        ensure_config(
            (0.0..=1.0).contains(&content.threshold),
            "content threshold must lie in [0, 1]",
        )?;
        for topic in content.topics.iter().chain(&content.bonus_topics) {
            ensure_config(
                !topic.phrases.is_empty() || topic.keywords.is_some(),
                format!("topic \"{}\" has neither phrases nor keywords", topic.name),
            )?;
        }
        Ok(())
    }

    fn validate_speech_rate(&self) -> Result<(), ConfigError> {
        let rate = &self.speech_rate;
        ensure_config(
            rate.acceptable_min <= rate.ideal_min
                && rate.ideal_min <= rate.ideal_max
                && rate.ideal_max <= rate.acceptable_max,
            "ideal speech-rate band must sit inside the acceptable band",
        )?;
        ensure_config(
            rate.ideal_points <= self.maxima.speech_rate
                && rate.ideal_points >= rate.acceptable_points
                && rate.acceptable_points >= rate.poor_points,
            "speech-rate points must be ordered ideal >= acceptable >= poor within the maximum",
        )
    }

    fn validate_grammar(&self) -> Result<(), ConfigError> {
        let grammar = &self.grammar;
        ensure_config(!grammar.bands.is_empty(), "grammar band table is empty")?;
        let mut previous: Option<&DensityBand> = None;
        for band in &grammar.bands {
            ensure_config(
                band.points <= self.maxima.grammar,
                "grammar band points exceed the dimension maximum",
            )?;
            if let Some(prev) = previous {
                ensure_config(
                    band.max_density > prev.max_density && band.points <= prev.points,
                    "grammar bands must have increasing densities and non-increasing points",
                )?;
            }
            previous = Some(band);
        }
        let last = previous.map(|band| band.points).unwrap_or(0);
        ensure_config(
            grammar.floor_points <= last,
            "grammar floor points exceed the last band",
        )?;
        ensure_config(
            grammar.degraded_points <= self.maxima.grammar,
            "degraded grammar points exceed the dimension maximum",
        )
    }

    fn validate_vocabulary(&self) -> Result<(), ConfigError> {
        let vocab = &self.vocabulary;
        ensure_config(
            vocab.vocabulary_max + vocab.clarity_max == self.maxima.vocabulary_clarity,
            "vocabulary and clarity sub-ranges must add up to the dimension maximum",
        )?;
        ensure_config(vocab.min_tokens > 0, "min_tokens must be positive")?;
        ensure_config(
            0.0 <= vocab.ttr_floor && vocab.ttr_floor < vocab.ttr_ceiling && vocab.ttr_ceiling <= 1.0,
            "type-token ratio floor/ceiling must satisfy 0 <= floor < ceiling <= 1",
        )?;
        ensure_config(
            vocab.filler_saturation > 0.0,
            "filler saturation must be positive",
        )
    }

    fn validate_flow(&self) -> Result<(), ConfigError> {
        let flow = &self.flow;
        ensure_config(
            flow.flow_max <= self.maxima.flow_sentiment
                && flow.sentiment_max <= self.maxima.flow_sentiment,
            "flow and sentiment sub-ranges must fit inside the dimension maximum",
        )?;
        ensure_config(
            (0.0..=1.0).contains(&flow.anchor_threshold),
            "anchor threshold must lie in [0, 1]",
        )?;
        let anchors = &flow.anchors;
        ensure_config(
            !anchors.intro.is_empty() && !anchors.body.is_empty() && !anchors.closing.is_empty(),
            "every flow anchor group needs at least one phrase",
        )?;
        ensure_config(
            !flow.sentiment_bands.is_empty(),
            "sentiment band table is empty",
        )?;
        let mut previous: Option<&PolarityBand> = None;
        for band in &flow.sentiment_bands {
            ensure_config(
                band.points <= flow.sentiment_max,
                "sentiment band points exceed the sentiment maximum",
            )?;
            if let Some(prev) = previous {
                ensure_config(
                    band.min_polarity < prev.min_polarity && band.points <= prev.points,
                    "sentiment bands must have decreasing polarities and non-increasing points",
                )?;
            }
            previous = Some(band);
        }
        let last = previous.map(|band| band.points).unwrap_or(0);
        ensure_config(
            flow.sentiment_floor_points <= last,
            "sentiment floor points exceed the last band",
        )?;
        ensure_config(
            flow.degraded_sentiment_points <= flow.sentiment_max,
            "degraded sentiment points exceed the sentiment maximum",
        )
    }
}

fn ensure_config(condition: bool, message: impl Into<String>) -> Result<(), ConfigError> {
    if condition {
        Ok(())
    } else {
        Err(ConfigError::invalid(message))
    }
}

/// Topic with its fast-path pattern compiled.
#[derive(Debug, Clone)]
pub struct CompiledTopic {
    pub name: String,
    pub phrases: Vec<String>,
    pub keywords: Option<Regex>,
}

impl CompiledTopic {
    fn compile(target: &TopicTarget) -> Result<Self, ConfigError> {
        let keywords = target
            .keywords
            .as_deref()
            .map(|pattern| {
                RegexBuilder::new(pattern)
                    .case_insensitive(!target.case_sensitive)
                    .build()
                    .map_err(|source| ConfigError::Pattern {
                        topic: target.name.clone(),
                        source,
                    })
            })
            .transpose()?;
        Ok(Self {
            name: target.name.clone(),
            phrases: target.phrases.clone(),
            keywords,
        })
    }

    pub fn keyword_match(&self, text: &str) -> bool {
        self.keywords
            .as_ref()
            .is_some_and(|pattern| pattern.is_match(text))
    }
}

/// Greeting phrases pre-tokenized per tier.
#[derive(Debug, Clone)]
pub struct GreetingTiers {
    pub formal: Vec<Vec<String>>,
    pub casual: Vec<Vec<String>>,
    pub basic: Vec<Vec<String>>,
}

/// Validated, read-only rubric shared by every evaluation.
#[derive(Debug, Clone)]
pub struct Rubric {
    config: RubricConfig,
    topics: Vec<CompiledTopic>,
    bonus_topics: Vec<CompiledTopic>,
    greetings: GreetingTiers,
    fillers: FillerVocabulary,
    enthusiasm: Vec<Vec<String>>,
}

impl Rubric {
    pub fn bundled() -> Result<Self, ConfigError> {
        Self::from_config(RubricConfig::bundled()?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Self::from_config(RubricConfig::load(path)?)
    }

    pub fn from_config(config: RubricConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let topics = compile_topics(&config.content.topics)?;
        let bonus_topics = compile_topics(&config.content.bonus_topics)?;
        let greetings = GreetingTiers {
            formal: tokenize_all(&config.salutation.formal),
            casual: tokenize_all(&config.salutation.casual),
            basic: tokenize_all(&config.salutation.basic),
        };
        let fillers = FillerVocabulary::new(&config.vocabulary.fillers);
        let enthusiasm = tokenize_all(&config.flow.enthusiasm_keywords);
        Ok(Self {
            config,
            topics,
            bonus_topics,
            greetings,
            fillers,
            enthusiasm,
        })
    }

    pub fn config(&self) -> &RubricConfig {
        &self.config
    }

    pub fn max_for(&self, dimension: Dimension) -> u32 {
        self.config.maxima.get(dimension)
    }

    pub fn topics(&self) -> &[CompiledTopic] {
        &self.topics
    }

    pub fn bonus_topics(&self) -> &[CompiledTopic] {
        &self.bonus_topics
    }

    pub fn greetings(&self) -> &GreetingTiers {
        &self.greetings
    }

    pub fn fillers(&self) -> &FillerVocabulary {
        &self.fillers
    }

    pub fn enthusiasm_keywords(&self) -> &[Vec<String>] {
        &self.enthusiasm
    }

    pub fn service_timeout(&self) -> Duration {
        self.config.services.timeout()
    }
}

fn compile_topics(targets: &[TopicTarget]) -> Result<Vec<CompiledTopic>, ConfigError> {
    targets.iter().map(CompiledTopic::compile).collect()
}

fn tokenize_all(phrases: &[String]) -> Vec<Vec<String>> {
    phrases
        .iter()
        .map(|phrase| tokenize(phrase))
        .filter(|tokens| !tokens.is_empty())
        .collect()
}
