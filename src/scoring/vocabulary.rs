use std::collections::HashSet;

use crate::config::{Rubric, VocabularyConfig};
use crate::types::{Dimension, DimensionScore};

/// Distinct tokens over total tokens; zero for an empty stream.
pub fn type_token_ratio(tokens: &[String]) -> f64 {
    if tokens.is_empty() {
        return 0.0;
    }
    let distinct: HashSet<&str> = tokens.iter().map(String::as_str).collect();
    distinct.len() as f64 / tokens.len() as f64
}

/// Scales the raw ratio down for transcripts shorter than `min_tokens`, where
/// almost every word is trivially unique.
pub fn effective_ttr(tokens: &[String], config: &VocabularyConfig) -> f64 {
    let coverage = (tokens.len() as f64 / config.min_tokens as f64).min(1.0);
    type_token_ratio(tokens) * coverage
}

pub fn vocabulary_points(effective: f64, config: &VocabularyConfig) -> u32 {
    let span = config.ttr_ceiling - config.ttr_floor;
    let fraction = ((effective - config.ttr_floor) / span).clamp(0.0, 1.0);
    (config.vocabulary_max as f64 * fraction).round() as u32
}

pub fn clarity_points(filler_ratio: f64, config: &VocabularyConfig) -> u32 {
    let penalty = (filler_ratio / config.filler_saturation).min(1.0);
    (config.clarity_max as f64 * (1.0 - penalty)).round() as u32
}

pub fn score_vocabulary_clarity(tokens: &[String], rubric: &Rubric) -> DimensionScore {
    let config = &rubric.config().vocabulary;
    let ttr = type_token_ratio(tokens);
    let effective = effective_ttr(tokens, config);
    let fillers = rubric.fillers().scan(tokens);
    let vocabulary = vocabulary_points(effective, config);
    let clarity = clarity_points(fillers.ratio(), config);

    let mut feedback = format!(
        "Vocabulary {vocabulary}/{}: type-token ratio {ttr:.2}",
        config.vocabulary_max
    );
    if tokens.len() < config.min_tokens {
        feedback.push_str(&format!(
            " (scaled to {effective:.2}, only {} words)",
            tokens.len()
        ));
    }
    feedback.push_str(&format!(
        ". Clarity {clarity}/{}: {} filler word(s), {:.1}% of words.",
        config.clarity_max,
        fillers.occurrences,
        fillers.ratio() * 100.0
    ));

    DimensionScore::new(
        Dimension::VocabularyClarity,
        vocabulary + clarity,
        rubric.max_for(Dimension::VocabularyClarity),
        feedback,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexical::tokenize;
    use approx::assert_relative_eq;

    fn config() -> VocabularyConfig {
        Rubric::bundled().unwrap().config().vocabulary.clone()
    }

    #[test]
    fn ttr_counts_distinct_words() {
        assert_relative_eq!(type_token_ratio(&tokenize("the cat the dog")), 0.75);
        assert_eq!(type_token_ratio(&[]), 0.0);
    }

    #[test]
    fn short_transcripts_do_not_earn_full_vocabulary_marks() {
        let rubric = Rubric::bundled().unwrap();
        let score = score_vocabulary_clarity(&tokenize("I am Tom"), &rubric);
        // raw ratio 1.0, scaled to 0.1, below the floor
        assert_eq!(score.awarded, 10);
        assert!(score.feedback.contains("only 3 words"), "{}", score.feedback);
    }

    #[test]
    fn vocabulary_points_are_linear_between_floor_and_ceiling() {
        let config = config();
        assert_eq!(vocabulary_points(0.2, &config), 0);
        assert_eq!(vocabulary_points(0.55, &config), 8);
        assert_eq!(vocabulary_points(0.8, &config), 15);
        assert_eq!(vocabulary_points(0.95, &config), 15);
    }

    #[test]
    fn clarity_falls_with_fillers() {
        let config = config();
        assert_eq!(clarity_points(0.0, &config), 10);
        assert_eq!(clarity_points(0.06, &config), 5);
        assert_eq!(clarity_points(0.5, &config), 0);
    }

    #[test]
    fn filler_heavy_speech_loses_clarity() {
        let rubric = Rubric::bundled().unwrap();
        let clean = tokenize("My name is Ravi and I enjoy painting with my younger brother");
        let messy = tokenize("Um my name is uh Ravi and like I um enjoy you know painting");
        let clean_score = score_vocabulary_clarity(&clean, &rubric);
        let messy_score = score_vocabulary_clarity(&messy, &rubric);
        assert!(messy_score.awarded < clean_score.awarded);
        assert!(messy_score.feedback.contains("5 filler word(s)"), "{}", messy_score.feedback);
    }
}
