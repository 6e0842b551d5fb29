//! Word-level helpers shared by the scorers.
//!
//! Everything here is pure: identical input always yields identical output.

/// Splits text into lowercase word tokens with punctuation removed.
///
/// Apostrophes inside words survive ("i'm"), curly apostrophes are folded to
/// ASCII, and hyphenated compounds split into their parts.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|ch: char| !is_word_char(ch))
        .filter_map(normalize_token)
        .collect()
}

pub fn word_count(text: &str) -> usize {
    text.split(|ch: char| !is_word_char(ch))
        .filter(|raw| normalize_token(raw).is_some())
        .count()
}

/// Normalizes a raw token by removing punctuation and lowercasing.
pub fn normalize_token(token: &str) -> Option<String> {
    let mut normalized = String::with_capacity(token.len());
    for ch in token.chars() {
        match ch {
            '\'' | '\u{2019}' => normalized.push('\''),
            _ if ch.is_alphanumeric() => normalized.extend(ch.to_lowercase()),
            _ => continue,
        }
    }
    let trimmed = normalized.trim_matches('\'');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '\'' || ch == '\u{2019}'
}

/// A normalized token with the byte range it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenSpan {
    pub text: String,
    pub start: usize,
    pub end: usize,
}

/// Like [`tokenize`], but keeps byte offsets into the source text.
pub fn token_spans(text: &str) -> Vec<TokenSpan> {
    let mut spans = Vec::new();
    let mut run_start: Option<usize> = None;
    let mut push = |start: usize, end: usize| {
        if let Some(normalized) = normalize_token(&text[start..end]) {
            spans.push(TokenSpan {
                text: normalized,
                start,
                end,
            });
        }
    };
    for (index, ch) in text.char_indices() {
        match (is_word_char(ch), run_start) {
            (true, None) => run_start = Some(index),
            (false, Some(start)) => {
                push(start, index);
                run_start = None;
            }
            _ => {}
        }
    }
    if let Some(start) = run_start {
        push(start, text.len());
    }
    spans
}

/// Splits text into trimmed sentences, dropping fragments without words.
pub fn sentences(text: &str) -> Vec<String> {
    text.split(['.', '!', '?', '\n'])
        .map(str::trim)
        .filter(|sentence| word_count(sentence) > 0)
        .map(str::to_string)
        .collect()
}

/// Partitions `len` items into `parts` contiguous ranges of near-equal size.
///
/// Earlier ranges absorb the remainder. Ranges may be empty when `len < parts`.
pub fn partition(len: usize, parts: usize) -> Vec<(usize, usize)> {
    if parts == 0 {
        return Vec::new();
    }
    let base = len / parts;
    let remainder = len % parts;
    let mut ranges = Vec::with_capacity(parts);
    let mut start = 0;
    for index in 0..parts {
        let end = start + base + usize::from(index < remainder);
        ranges.push((start, end));
        start = end;
    }
    ranges
}

/// Splits tokens into opening, middle and closing thirds by position.
pub fn thirds(tokens: &[String]) -> [&[String]; 3] {
    let ranges = partition(tokens.len(), 3);
    [
        &tokens[ranges[0].0..ranges[0].1],
        &tokens[ranges[1].0..ranges[1].1],
        &tokens[ranges[2].0..ranges[2].1],
    ]
}

/// True when `phrase` appears as a contiguous token run inside `tokens`.
pub fn contains_phrase(tokens: &[String], phrase: &[String]) -> bool {
    if phrase.is_empty() || phrase.len() > tokens.len() {
        return false;
    }
    tokens.windows(phrase.len()).any(|window| window == phrase)
}

/// Like [`contains_phrase`], but each token only has to start with the
/// matching phrase token, so "love" also finds "loved" and "lovely".
pub fn contains_phrase_prefix(tokens: &[String], phrase: &[String]) -> bool {
    if phrase.is_empty() || phrase.len() > tokens.len() {
        return false;
    }
    tokens.windows(phrase.len()).any(|window| {
        window
            .iter()
            .zip(phrase)
            .all(|(token, part)| token.starts_with(part.as_str()))
    })
}

/// Fixed set of verbal disfluencies, single or multi-word.
#[derive(Debug, Clone, PartialEq)]
pub struct FillerVocabulary {
    // longest phrases first so "you know" wins over a bare "you"
    phrases: Vec<Vec<String>>,
}

/// Result of scanning a token stream for fillers.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FillerStats {
    /// Number of filler occurrences ("you know" counts once).
    pub occurrences: usize,
    /// Number of tokens covered by filler occurrences.
    pub covered_tokens: usize,
    pub total_tokens: usize,
}

impl FillerStats {
    /// Fraction of tokens that are fillers; zero for an empty stream.
    pub fn ratio(&self) -> f64 {
        if self.total_tokens == 0 {
            0.0
        } else {
            self.covered_tokens as f64 / self.total_tokens as f64
        }
    }
}

impl FillerVocabulary {
    pub fn new<I>(entries: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut phrases: Vec<Vec<String>> = entries
            .into_iter()
            .map(|entry| tokenize(entry.as_ref()))
            .filter(|phrase| !phrase.is_empty())
            .collect();
        phrases.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        phrases.dedup();
        Self { phrases }
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }

    pub fn scan(&self, tokens: &[String]) -> FillerStats {
        let mut stats = FillerStats {
            total_tokens: tokens.len(),
            ..FillerStats::default()
        };
        let mut index = 0;
        while index < tokens.len() {
            let matched = self
                .phrases
                .iter()
                .find(|phrase| tokens[index..].starts_with(phrase.as_slice()));
            match matched {
                Some(phrase) => {
                    stats.occurrences += 1;
                    stats.covered_tokens += phrase.len();
                    index += phrase.len();
                }
                None => index += 1,
            }
        }
        stats
    }
}

pub fn filler_ratio(tokens: &[String], vocabulary: &FillerVocabulary) -> f64 {
    vocabulary.scan(tokens).ratio()
}
