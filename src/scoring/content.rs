//! Topic coverage: keyword fast path first, sentence-embedding similarity for
//! whatever the keywords missed.

use ndarray::Array1;
use tracing::{debug, warn};

use super::similarity::best_similarity;
use crate::config::{CompiledTopic, Rubric};
use crate::error::ServiceError;
use crate::services::NlpServices;
use crate::types::{Dimension, DimensionScore, MatchSource, TopicCoverage};

#[derive(Debug, Clone, PartialEq)]
pub struct ContentOutcome {
    pub score: DimensionScore,
    /// Required topics in rubric order, followed by bonus topics.
    pub coverage: Vec<TopicCoverage>,
}

pub fn score_content(
    text: &str,
    sentences: &[String],
    services: &NlpServices,
    rubric: &Rubric,
) -> ContentOutcome {
    let threshold = rubric.config().content.threshold;
    let topics: Vec<(&CompiledTopic, bool)> = rubric
        .topics()
        .iter()
        .map(|topic| (topic, false))
        .chain(rubric.bonus_topics().iter().map(|topic| (topic, true)))
        .collect();

    let mut coverage: Vec<TopicCoverage> = topics
        .iter()
        .map(|(topic, bonus)| keyword_pass(topic, *bonus, text))
        .collect();

    let pending: Vec<usize> = coverage
        .iter()
        .enumerate()
        .filter(|(index, entry)| !entry.covered && !topics[*index].0.phrases.is_empty())
        .map(|(index, _)| index)
        .collect();

    let mut degraded = None;
    if !pending.is_empty() && !sentences.is_empty() {
        let pending_topics: Vec<&CompiledTopic> =
            pending.iter().map(|index| topics[*index].0).collect();
        match semantic_pass(sentences, &pending_topics, services) {
            Ok(similarities) => {
                for (index, similarity) in pending.iter().zip(similarities) {
                    let entry = &mut coverage[*index];
                    entry.score = similarity;
                    if similarity > threshold {
                        entry.covered = true;
                        entry.source = MatchSource::Semantic;
                    }
                }
            }
            Err(err) => {
                warn!(
                    service = err.service(),
                    error = %err,
                    "semantic topic check failed, using keywords only"
                );
                degraded = Some(format!("keyword-only, semantic check unavailable ({err})"));
            }
        }
    }

    let required = rubric.topics().len();
    let covered = coverage
        .iter()
        .filter(|entry| !entry.bonus && entry.covered)
        .count();
    let max = rubric.max_for(Dimension::Content);
    let points = (covered as f64 / required as f64 * max as f64).round() as u32;
    debug!(covered, required, points, "content coverage");

    let mut score = DimensionScore::new(Dimension::Content, points, max, rationale(&coverage));
    if let Some(reason) = degraded {
        score = score.degraded(reason);
    }
    ContentOutcome { score, coverage }
}

fn keyword_pass(topic: &CompiledTopic, bonus: bool, text: &str) -> TopicCoverage {
    let hit = topic.keyword_match(text);
    TopicCoverage {
        topic: topic.name.clone(),
        score: if hit { 1.0 } else { 0.0 },
        covered: hit,
        source: if hit {
            MatchSource::Keyword
        } else {
            MatchSource::Missed
        },
        bonus,
    }
}

/// Embeds sentences and reference phrases in one batch and returns, per
/// topic, the best sentence/phrase similarity clamped to [0, 1].
fn semantic_pass(
    sentences: &[String],
    topics: &[&CompiledTopic],
    services: &NlpServices,
) -> Result<Vec<f32>, ServiceError> {
    let mut texts = sentences.to_vec();
    for topic in topics {
        texts.extend(topic.phrases.iter().cloned());
    }
    let vectors = services.embed_batch(texts)?;
    let (sentence_vectors, mut rest): (&[Array1<f32>], &[Array1<f32>]) =
        vectors.split_at(sentences.len());
    let mut similarities = Vec::with_capacity(topics.len());
    for topic in topics {
        let (phrase_vectors, remaining) = rest.split_at(topic.phrases.len());
        rest = remaining;
        let best = best_similarity(sentence_vectors, phrase_vectors).unwrap_or(0.0);
        similarities.push(best.clamp(0.0, 1.0));
    }
    Ok(similarities)
}

fn rationale(coverage: &[TopicCoverage]) -> String {
    let required = coverage
        .iter()
        .filter(|entry| !entry.bonus)
        .map(|entry| {
            let mark = if entry.covered { '+' } else { '-' };
            format!("[{mark}] {}", entry.topic)
        })
        .collect::<Vec<_>>()
        .join(", ");
    let bonus: Vec<&str> = coverage
        .iter()
        .filter(|entry| entry.bonus && entry.covered)
        .map(|entry| entry.topic.as_str())
        .collect();
    if bonus.is_empty() {
        required
    } else {
        format!("{required}. Bonus: {}", bonus.join(", "))
    }
}
