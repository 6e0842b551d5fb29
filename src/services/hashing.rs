use ndarray::Array1;

use crate::error::ServiceError;
use crate::lexical::tokenize;

use super::Embedder;

const DEFAULT_DIMENSIONS: usize = 512;
const STOPWORD_WEIGHT: f32 = 0.25;
const BIGRAM_WEIGHT: f32 = 0.5;

const STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "but", "by", "for", "from", "i", "i'm", "in", "is",
    "it", "me", "my", "of", "on", "or", "so", "that", "the", "this", "to", "was", "we", "with",
    "you",
];

/// Deterministic bag-of-words embedder using signed feature hashing.
///
/// Unigrams (lightly stemmed) and adjacent-word bigrams are hashed into a
/// fixed number of buckets and the result is L2-normalized. Function words
/// contribute at reduced weight so overlap is driven by content words.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimensions: usize,
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self {
            dimensions: DEFAULT_DIMENSIONS,
        }
    }
}

impl HashingEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    fn accumulate(&self, vector: &mut Array1<f32>, feature: &str, weight: f32) {
        let hash = fnv1a(feature.as_bytes());
        let bucket = (hash % self.dimensions as u64) as usize;
        let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
        vector[bucket] += sign * weight;
    }
}

impl Embedder for HashingEmbedder {
    fn embed(&self, text: &str) -> Result<Array1<f32>, ServiceError> {
        let mut vector = Array1::zeros(self.dimensions);
        let stems: Vec<String> = tokenize(text).iter().map(|token| stem(token)).collect();
        for stem in &stems {
            let weight = if is_stopword(stem) { STOPWORD_WEIGHT } else { 1.0 };
            self.accumulate(&mut vector, stem, weight);
        }
        for pair in stems.windows(2) {
            if is_stopword(&pair[0]) && is_stopword(&pair[1]) {
                continue;
            }
            self.accumulate(&mut vector, &format!("{} {}", pair[0], pair[1]), BIGRAM_WEIGHT);
        }
        let norm = vector.dot(&vector).sqrt();
        if norm > f32::EPSILON {
            vector.mapv_inplace(|value| value / norm);
        }
        Ok(vector)
    }
}

fn is_stopword(token: &str) -> bool {
    STOPWORDS.contains(&token)
}

/// Strips a few common English suffixes so "hobbies" and "hobby" collide.
fn stem(token: &str) -> String {
    if token.len() > 4 {
        if let Some(base) = token.strip_suffix("ies") {
            return format!("{base}y");
        }
        if let Some(base) = token.strip_suffix("ing") {
            if base.len() >= 3 {
                return base.to_string();
            }
        }
    }
    if token.len() > 3 && token.ends_with('s') && !token.ends_with("ss") && !token.ends_with('\'') {
        return token[..token.len() - 1].to_string();
    }
    token.to_string()
}

fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in bytes {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x0100_0000_01b3);
    }
    hash
}
