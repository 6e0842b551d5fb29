use std::sync::Arc;

use anyhow::Result;
use introscore::config::TOTAL_POINTS;
use introscore::scoring::rate::rate_points;
use introscore::{Dimension, NlpServices, Rubric, RubricComposer, ValidationError};

const FULL_INTRO: &str = "Good morning everyone. My name is Kavya and I am thirteen years old. \
    I study in class eight at Sunrise Public School. I live with my parents and my elder sister, \
    who is very kind to me. My hobby is playing the guitar and I also enjoy reading mystery \
    novels. My dream is to become a scientist. Thank you for listening.";

fn composer() -> Result<RubricComposer> {
    Ok(RubricComposer::new(
        Arc::new(Rubric::bundled()?),
        NlpServices::local(),
    ))
}

#[test]
fn maxima_sum_to_one_hundred() -> Result<()> {
    let rubric = Rubric::bundled()?;
    let total: u32 = Dimension::ALL.iter().map(|d| rubric.max_for(*d)).sum();
    assert_eq!(total, TOTAL_POINTS);
    Ok(())
}

#[test]
fn speech_rate_boundaries() -> Result<()> {
    let rubric = Rubric::bundled()?;
    let config = &rubric.config().speech_rate;
    for (wpm, expected) in [(110.0, 6), (111.0, 10), (140.0, 10), (141.0, 6), (160.0, 6), (161.0, 2)] {
        assert_eq!(rate_points(wpm, config).0, expected, "wpm {wpm}");
    }
    Ok(())
}

#[test]
fn total_stays_within_bounds_for_assorted_inputs() -> Result<()> {
    let composer = composer()?;
    let inputs = [
        (FULL_INTRO, 0.6),
        ("Hi", 0.05),
        ("um uh um like you know um", 0.1),
        ("I hate this. It is bad, terrible and boring!", 2.0),
        (FULL_INTRO, 0.01),
        ("the the the the the the the the", 5.0),
    ];
    for (text, minutes) in inputs {
        let report = composer.evaluate(text, minutes)?;
        assert!(report.total <= 100, "{text:?} scored {}", report.total);
        assert_eq!(report.max_total, 100);
        for score in &report.dimensions {
            assert!(score.awarded <= score.max, "{:?} over max", score.dimension);
        }
    }
    Ok(())
}

#[test]
fn salutation_examples() -> Result<()> {
    let composer = composer()?;
    let points = |text: &str| -> Result<u32> {
        let report = composer.evaluate(text, 0.1)?;
        Ok(report.dimension(Dimension::Salutation).map_or(0, |s| s.awarded))
    };
    assert_eq!(points("Good morning everyone, I am Dev.")?, 5);
    assert_eq!(points("Hi")?, 2);
    assert_eq!(points("My name is Dev.")?, 0);
    Ok(())
}

#[test]
fn three_word_transcript_misses_full_vocabulary_marks() -> Result<()> {
    let report = composer()?.evaluate("I am Dev", 0.02)?;
    let vocabulary = report
        .dimension(Dimension::VocabularyClarity)
        .expect("vocabulary dimension present");
    assert!(vocabulary.awarded < vocabulary.max);
    Ok(())
}

#[test]
fn grammar_points_fall_as_errors_accumulate() -> Result<()> {
    let composer = composer()?;
    let clean = "My friend is tall. He is kind. She is funny. They are happy. We are ready.";
    let some = "My friend is tall. He are kind. She is funny. They are happy. We are ready.";
    let many = "My friend is tall. He are kind. She are funny. They is happy. We is ready.";
    let grammar = |text: &str| -> Result<u32> {
        let report = composer.evaluate(text, 0.15)?;
        Ok(report.dimension(Dimension::Grammar).map_or(0, |s| s.awarded))
    };
    let (clean, some, many) = (grammar(clean)?, grammar(some)?, grammar(many)?);
    assert_eq!(clean, 10);
    assert!(clean >= some && some >= many, "{clean} {some} {many}");
    assert!(many < clean);
    Ok(())
}

#[test]
fn identical_input_yields_identical_report() -> Result<()> {
    let composer = composer()?;
    let first = composer.evaluate(FULL_INTRO, 0.6)?;
    let second = composer.evaluate(FULL_INTRO, 0.6)?;
    assert_eq!(first, second);
    Ok(())
}

#[test]
fn strong_introduction_scores_well() -> Result<()> {
    let report = composer()?.evaluate(FULL_INTRO, 0.6)?;
    assert!(!report.is_degraded());
    assert_eq!(report.dimension(Dimension::Salutation).map(|s| s.awarded), Some(5));
    assert_eq!(report.dimension(Dimension::Content).map(|s| s.awarded), Some(30));
    assert!(report.topics.iter().any(|t| t.bonus && t.topic == "Ambition" && t.covered));
    assert!(report.total >= 70, "total {}", report.total);
    Ok(())
}

#[test]
fn invalid_inputs_are_rejected() -> Result<()> {
    let composer = composer()?;
    assert_eq!(
        composer.evaluate("", 1.0).unwrap_err(),
        ValidationError::EmptyTranscript
    );
    assert!(matches!(
        composer.evaluate(FULL_INTRO, -2.0),
        Err(ValidationError::NonPositiveDuration(_))
    ));
    assert!(matches!(
        composer.evaluate(FULL_INTRO, f64::INFINITY),
        Err(ValidationError::NonFiniteDuration(_))
    ));
    Ok(())
}

#[test]
fn report_serializes_to_json() -> Result<()> {
    let report = composer()?.evaluate(FULL_INTRO, 0.6)?;
    let value = serde_json::to_value(&report)?;
    assert_eq!(value["max_total"], 100);
    assert_eq!(value["dimensions"][0]["dimension"], "salutation");
    assert!(value["dimensions"][0].get("degraded").is_none());
    Ok(())
}
