//! Narrative flow (opening, body, closing in order) and overall tone.

use tracing::{debug, warn};

use super::similarity::best_similarity;
use crate::config::{FlowConfig, Rubric};
use crate::error::ServiceError;
use crate::lexical::{contains_phrase, contains_phrase_prefix, thirds, tokenize};
use crate::services::NlpServices;
use crate::types::{Dimension, DimensionScore};

const SEGMENTS: [&str; 3] = ["opening", "body", "closing"];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowResult {
    pub matched: [bool; 3],
    pub points: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SentimentResult {
    pub compound: f32,
    /// Compound mapped onto [0, 1], after the enthusiasm cap.
    pub polarity: f64,
    pub points: u32,
}

pub fn score_flow_sentiment(
    text: &str,
    tokens: &[String],
    services: &NlpServices,
    rubric: &Rubric,
) -> DimensionScore {
    let config = &rubric.config().flow;
    let max = rubric.max_for(Dimension::FlowSentiment);
    let mut degraded = Vec::new();

    let flow = match semantic_flow(tokens, services, config) {
        Ok(flow) => flow,
        Err(err) => {
            warn!(
                service = err.service(),
                error = %err,
                "semantic flow check failed, matching anchor phrases"
            );
            degraded.push(format!("flow matched by anchor keywords ({err})"));
            keyword_flow(tokens, config)
        }
    };

    let mut feedback = format!(
        "Flow {}/{}: {}.",
        flow.points,
        config.flow_max,
        describe_segments(&flow.matched)
    );

    match services.analyze_sentiment(text) {
        Ok(compound) => {
            let sentiment = sentiment_from_compound(compound, tokens, rubric);
            let (_, label) = sentiment_points(sentiment.polarity, config);
            feedback.push_str(&format!(
                " Sentiment {}/{}: {label} (polarity {:.2}).",
                sentiment.points, config.sentiment_max, sentiment.polarity
            ));
            let total = (flow.points + sentiment.points).min(max);
            debug!(flow = flow.points, sentiment = sentiment.points, "flow and sentiment");
            finish(total, max, feedback, degraded)
        }
        Err(err) => {
            warn!(
                service = err.service(),
                error = %err,
                "sentiment analysis failed, awarding neutral score"
            );
            degraded.push(format!("sentiment unverified ({err})"));
            feedback.push_str(&format!(
                " Sentiment {}/{}: unverified.",
                config.degraded_sentiment_points, config.sentiment_max
            ));
            let total = (flow.points + config.degraded_sentiment_points).min(max);
            finish(total, max, feedback, degraded)
        }
    }
}

fn finish(total: u32, max: u32, feedback: String, degraded: Vec<String>) -> DimensionScore {
    let score = DimensionScore::new(Dimension::FlowSentiment, total, max, feedback);
    if degraded.is_empty() {
        score
    } else {
        score.degraded(degraded.join("; "))
    }
}

fn flow_points(matched: &[bool; 3], config: &FlowConfig) -> u32 {
    let count = matched.iter().filter(|hit| **hit).count();
    (count as f64 / 3.0 * config.flow_max as f64).round() as u32
}

/// Embeds the three positional segments alongside every anchor phrase. A
/// segment matches when its own anchor group scores at least as high as the
/// other groups and clears the threshold.
pub fn semantic_flow(
    tokens: &[String],
    services: &NlpServices,
    config: &FlowConfig,
) -> Result<FlowResult, ServiceError> {
    let segments: Vec<String> = thirds(tokens)
        .iter()
        .map(|segment| segment.join(" "))
        .collect();
    let groups = [
        &config.anchors.intro,
        &config.anchors.body,
        &config.anchors.closing,
    ];
    let mut texts = segments.clone();
    for group in groups {
        texts.extend(group.iter().cloned());
    }
    let vectors = services.embed_batch(texts)?;
    let (segment_vectors, mut rest) = vectors.split_at(segments.len());
    let mut group_vectors = Vec::with_capacity(groups.len());
    for group in groups {
        let (head, tail) = rest.split_at(group.len());
        group_vectors.push(head);
        rest = tail;
    }

    let mut matched = [false; 3];
    for (index, segment) in segments.iter().enumerate() {
        if segment.is_empty() {
            continue;
        }
        let candidate = std::slice::from_ref(&segment_vectors[index]);
        let similarities: Vec<f32> = group_vectors
            .iter()
            .map(|anchors| best_similarity(candidate, anchors).unwrap_or(0.0))
            .collect();
        let own = similarities[index];
        let best_other = similarities
            .iter()
            .enumerate()
            .filter(|(group, _)| *group != index)
            .map(|(_, similarity)| *similarity)
            .fold(f32::MIN, f32::max);
        matched[index] = own >= config.anchor_threshold && own >= best_other;
    }
    Ok(FlowResult {
        matched,
        points: flow_points(&matched, config),
    })
}

/// Fallback when no embedder is reachable: a segment matches when it contains
/// one of its group's anchor phrases verbatim.
pub fn keyword_flow(tokens: &[String], config: &FlowConfig) -> FlowResult {
    let groups = [
        &config.anchors.intro,
        &config.anchors.body,
        &config.anchors.closing,
    ];
    let segments = thirds(tokens);
    let mut matched = [false; 3];
    for (index, (segment, group)) in segments.iter().zip(groups).enumerate() {
        matched[index] = group
            .iter()
            .any(|phrase| contains_phrase(segment, &tokenize(phrase)));
    }
    FlowResult {
        matched,
        points: flow_points(&matched, config),
    }
}

/// Maps a compound score in [-1, 1] to sentiment points. Without an
/// enthusiasm keyword the polarity cannot reach the top band.
pub fn sentiment_from_compound(compound: f32, tokens: &[String], rubric: &Rubric) -> SentimentResult {
    let config = &rubric.config().flow;
    let mut polarity = (f64::from(compound) + 1.0) / 2.0;
    let top = config
        .sentiment_bands
        .first()
        .map(|band| band.min_polarity)
        .unwrap_or(1.0);
    if polarity >= top {
        let enthusiastic = rubric
            .enthusiasm_keywords()
            .iter()
            .any(|keyword| contains_phrase_prefix(tokens, keyword));
        if !enthusiastic {
            polarity = polarity.min(config.enthusiasm_cap);
        }
    }
    let (points, _) = sentiment_points(polarity, config);
    SentimentResult {
        compound,
        polarity,
        points,
    }
}

pub fn sentiment_points(polarity: f64, config: &FlowConfig) -> (u32, &str) {
    config
        .sentiment_bands
        .iter()
        .find(|band| polarity >= band.min_polarity)
        .map(|band| (band.points, band.label.as_str()))
        .unwrap_or((
            config.sentiment_floor_points,
            config.sentiment_floor_label.as_str(),
        ))
}

fn describe_segments(matched: &[bool; 3]) -> String {
    SEGMENTS
        .iter()
        .zip(matched)
        .map(|(name, hit)| {
            if *hit {
                format!("{name} on track")
            } else {
                format!("{name} unclear")
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}
