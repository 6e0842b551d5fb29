use crate::config::{Rubric, SpeechRateConfig};
use crate::error::ValidationError;
use crate::types::{Dimension, DimensionScore};

pub fn words_per_minute(word_count: usize, duration_minutes: f64) -> Result<f64, ValidationError> {
    if !duration_minutes.is_finite() {
        return Err(ValidationError::NonFiniteDuration(duration_minutes));
    }
    if duration_minutes <= 0.0 {
        return Err(ValidationError::NonPositiveDuration(duration_minutes));
    }
    Ok(word_count as f64 / duration_minutes)
}

/// Maps a speaking rate onto the rubric bands. Bounds are inclusive; a rate
/// outside the ideal band but inside the acceptable one earns acceptable points.
pub fn rate_points(wpm: f64, config: &SpeechRateConfig) -> (u32, &'static str) {
    if (config.ideal_min..=config.ideal_max).contains(&wpm) {
        (config.ideal_points, "Ideal")
    } else if (config.acceptable_min..=config.acceptable_max).contains(&wpm) {
        if wpm < config.ideal_min {
            (config.acceptable_points, "Acceptable, slightly slow")
        } else {
            (config.acceptable_points, "Acceptable, slightly fast")
        }
    } else if wpm > config.acceptable_max {
        (config.poor_points, "Too fast")
    } else {
        (config.poor_points, "Too slow")
    }
}

pub fn score_rate(
    word_count: usize,
    duration_minutes: f64,
    rubric: &Rubric,
) -> Result<DimensionScore, ValidationError> {
    let wpm = words_per_minute(word_count, duration_minutes)?;
    let (points, label) = rate_points(wpm, &rubric.config().speech_rate);
    Ok(DimensionScore::new(
        Dimension::SpeechRate,
        points,
        rubric.max_for(Dimension::SpeechRate),
        format!("{label} ({} WPM)", wpm.round() as u64),
    ))
}
