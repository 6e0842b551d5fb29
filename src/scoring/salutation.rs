use crate::config::Rubric;
use crate::lexical::contains_phrase;
use crate::types::{Dimension, DimensionScore};

/// Awards the highest greeting tier found anywhere in the transcript.
pub fn score_salutation(tokens: &[String], rubric: &Rubric) -> DimensionScore {
    let config = &rubric.config().salutation;
    let max = rubric.max_for(Dimension::Salutation);
    let greetings = rubric.greetings();
    let tiers = [
        (&greetings.formal, config.formal_points, "Excellent"),
        (&greetings.casual, config.casual_points, "Good"),
        (&greetings.basic, config.basic_points, "Basic"),
    ];
    for (phrases, points, grade) in tiers {
        if let Some(phrase) = phrases
            .iter()
            .find(|phrase| contains_phrase(tokens, phrase))
        {
            let mut feedback = format!("{grade} salutation used: '{}'.", phrase.join(" "));
            if points < max {
                feedback.push_str(" A more formal greeting would score higher.");
            }
            return DimensionScore::new(Dimension::Salutation, points, max, feedback);
        }
    }
    DimensionScore::new(Dimension::Salutation, 0, max, "No salutation found.")
}
