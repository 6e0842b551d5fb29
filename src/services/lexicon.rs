use std::collections::HashMap;

use crate::error::ServiceError;
use crate::lexical::tokenize;

use super::SentimentAnalyzer;

const NORMALIZATION_ALPHA: f32 = 15.0;
const BOOSTER_INCREMENT: f32 = 0.293;
const NEGATION_SCALAR: f32 = -0.74;
const NEGATION_LOOKBACK: usize = 3;
const EXCLAMATION_INCREMENT: f32 = 0.292;
const MAX_EXCLAMATIONS: usize = 4;

const VALENCES: &[(&str, f32)] = &[
    ("love", 3.2),
    ("loves", 3.0),
    ("like", 1.5),
    ("enjoy", 2.2),
    ("enjoys", 2.2),
    ("happy", 2.7),
    ("glad", 2.0),
    ("excited", 2.4),
    ("great", 3.1),
    ("good", 1.9),
    ("wonderful", 2.7),
    ("amazing", 2.8),
    ("fantastic", 2.6),
    ("excellent", 2.7),
    ("fun", 2.3),
    ("favorite", 2.0),
    ("favourite", 2.0),
    ("proud", 2.1),
    ("passionate", 2.4),
    ("grateful", 2.0),
    ("thankful", 2.0),
    ("thank", 1.5),
    ("thanks", 1.9),
    ("kind", 2.4),
    ("best", 3.2),
    ("nice", 1.8),
    ("beautiful", 2.9),
    ("friendly", 2.2),
    ("interesting", 1.7),
    ("awesome", 3.1),
    ("delighted", 2.9),
    ("thrilled", 2.6),
    ("pleasure", 2.5),
    ("honor", 2.2),
    ("honour", 2.2),
    ("hope", 1.9),
    ("dream", 1.0),
    ("confident", 2.2),
    ("smile", 1.5),
    ("win", 2.8),
    ("won", 2.7),
    ("success", 2.7),
    ("enthusiastic", 2.4),
    ("energetic", 1.8),
    ("cheerful", 2.5),
    ("helpful", 1.9),
    ("caring", 2.1),
    ("inspired", 2.2),
    ("hate", -2.7),
    ("hates", -2.7),
    ("sad", -2.1),
    ("bad", -2.5),
    ("boring", -1.3),
    ("bored", -1.1),
    ("angry", -2.3),
    ("terrible", -2.1),
    ("awful", -2.0),
    ("worst", -3.1),
    ("tired", -1.9),
    ("afraid", -2.0),
    ("scared", -1.9),
    ("nervous", -1.1),
    ("worried", -1.2),
    ("lonely", -2.0),
    ("annoying", -1.7),
    ("upset", -1.6),
    ("fail", -2.5),
    ("failed", -2.3),
    ("poor", -2.1),
    ("unhappy", -1.8),
    ("dislike", -1.6),
    ("pain", -2.3),
    ("sick", -1.6),
    ("problem", -1.7),
    ("cry", -2.1),
];

const BOOSTERS: &[&str] = &[
    "very", "really", "so", "extremely", "super", "truly", "absolutely", "incredibly",
];
const DAMPENERS: &[&str] = &["slightly", "somewhat", "barely", "hardly", "little"];
const NEGATIONS: &[&str] = &[
    "not", "no", "never", "don't", "doesn't", "didn't", "isn't", "wasn't", "aren't", "can't",
    "won't", "nor", "without",
];

/// Valence-lexicon sentiment analyzer in the style of VADER.
///
/// Sums word valences (adjusted for boosters, dampeners, and preceding
/// negations), adds exclamation emphasis, and squashes the sum into (-1, 1).
#[derive(Debug, Clone)]
pub struct LexiconSentiment {
    valences: HashMap<&'static str, f32>,
}

impl Default for LexiconSentiment {
    fn default() -> Self {
        Self {
            valences: VALENCES.iter().copied().collect(),
        }
    }
}

impl LexiconSentiment {
    pub fn new() -> Self {
        Self::default()
    }

    fn valence_sum(&self, tokens: &[String]) -> f32 {
        let mut total = 0.0;
        for (index, token) in tokens.iter().enumerate() {
            let Some(&base) = self.valences.get(token.as_str()) else {
                continue;
            };
            let mut valence = base;
            if let Some(previous) = index.checked_sub(1).map(|i| tokens[i].as_str()) {
                if BOOSTERS.contains(&previous) {
                    valence += BOOSTER_INCREMENT * base.signum();
                } else if DAMPENERS.contains(&previous) {
                    valence -= BOOSTER_INCREMENT * base.signum();
                }
            }
            let window = &tokens[index.saturating_sub(NEGATION_LOOKBACK)..index];
            if window
                .iter()
                .any(|word| NEGATIONS.contains(&word.as_str()))
            {
                valence *= NEGATION_SCALAR;
            }
            total += valence;
        }
        total
    }
}

impl SentimentAnalyzer for LexiconSentiment {
    fn analyze(&self, text: &str) -> Result<f32, ServiceError> {
        let tokens = tokenize(text);
        let mut total = self.valence_sum(&tokens);
        if total != 0.0 {
            let exclamations = text.matches('!').count().min(MAX_EXCLAMATIONS);
            total += total.signum() * EXCLAMATION_INCREMENT * exclamations as f32;
        }
        Ok(normalize(total))
    }
}

fn normalize(score: f32) -> f32 {
    let compound = score / (score * score + NORMALIZATION_ALPHA).sqrt();
    compound.clamp(-1.0, 1.0)
}
