//! Capability interfaces for the external NLP services and the bounded-call
//! wrapper the scorers go through.

pub mod hashing;
pub mod language_tool;
pub mod lexicon;
pub mod rules;

use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use ndarray::Array1;
use tracing::debug;

use crate::error::ServiceError;
use crate::types::GrammarIssue;

pub use hashing::HashingEmbedder;
pub use language_tool::LanguageToolChecker;
pub use lexicon::LexiconSentiment;
pub use rules::RuleGrammarChecker;

pub const EMBEDDER: &str = "embedding service";
pub const GRAMMAR: &str = "grammar service";
pub const SENTIMENT: &str = "sentiment service";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Produces fixed-length vectors; identical text must yield identical vectors.
pub trait Embedder: Send + Sync {
    fn embed(&self, text: &str) -> Result<Array1<f32>, ServiceError>;

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Array1<f32>>, ServiceError> {
        texts.iter().map(|text| self.embed(text)).collect()
    }
}

pub trait GrammarChecker: Send + Sync {
    fn check(&self, text: &str) -> Result<Vec<GrammarIssue>, ServiceError>;
}

/// Returns a compound polarity in [-1, 1].
pub trait SentimentAnalyzer: Send + Sync {
    fn analyze(&self, text: &str) -> Result<f32, ServiceError>;
}

/// The three services an evaluation needs, each call bounded by `timeout`.
#[derive(Clone)]
pub struct NlpServices {
    embedder: Arc<dyn Embedder>,
    grammar: Arc<dyn GrammarChecker>,
    sentiment: Arc<dyn SentimentAnalyzer>,
    timeout: Duration,
}

impl NlpServices {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        grammar: Arc<dyn GrammarChecker>,
        sentiment: Arc<dyn SentimentAnalyzer>,
    ) -> Self {
        Self {
            embedder,
            grammar,
            sentiment,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// In-process implementations that need no model download or network.
    pub fn local() -> Self {
        Self::new(
            Arc::new(HashingEmbedder::default()),
            Arc::new(RuleGrammarChecker::new()),
            Arc::new(LexiconSentiment::new()),
        )
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_grammar(mut self, grammar: Arc<dyn GrammarChecker>) -> Self {
        self.grammar = grammar;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn embed_batch(&self, texts: Vec<String>) -> Result<Vec<Array1<f32>>, ServiceError> {
        let expected = texts.len();
        let embedder = Arc::clone(&self.embedder);
        let vectors = call_with_timeout(EMBEDDER, self.timeout, move || {
            embedder.embed_batch(&texts)
        })?;
        validate_embeddings(&vectors, expected)?;
        Ok(vectors)
    }

    pub fn check_grammar(&self, text: &str) -> Result<Vec<GrammarIssue>, ServiceError> {
        let grammar = Arc::clone(&self.grammar);
        let owned = text.to_string();
        call_with_timeout(GRAMMAR, self.timeout, move || grammar.check(&owned))
    }

    pub fn analyze_sentiment(&self, text: &str) -> Result<f32, ServiceError> {
        let sentiment = Arc::clone(&self.sentiment);
        let owned = text.to_string();
        let compound = call_with_timeout(SENTIMENT, self.timeout, move || {
            sentiment.analyze(&owned)
        })?;
        if !compound.is_finite() || !(-1.0..=1.0).contains(&compound) {
            return Err(ServiceError::malformed(
                SENTIMENT,
                format!("compound score {compound} outside [-1, 1]"),
            ));
        }
        Ok(compound)
    }
}

impl std::fmt::Debug for NlpServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NlpServices")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// Runs `call` on a worker thread and gives up after `timeout`.
///
/// A timed-out worker is detached; its eventual result is dropped.
pub fn call_with_timeout<T, F>(
    service: &'static str,
    timeout: Duration,
    call: F,
) -> Result<T, ServiceError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, ServiceError> + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    thread::Builder::new()
        .name(format!("{}-call", service.replace(' ', "-")))
        .spawn(move || {
            let _ = tx.send(call());
        })
        .map_err(|err| ServiceError::unavailable(service, err))?;
    match rx.recv_timeout(timeout) {
        Ok(result) => result,
        Err(RecvTimeoutError::Timeout) => {
            debug!(service, timeout_ms = timeout.as_millis() as u64, "service call timed out");
            Err(ServiceError::timeout(service, timeout))
        }
        Err(RecvTimeoutError::Disconnected) => Err(ServiceError::unavailable(
            service,
            "worker exited without a response",
        )),
    }
}

fn validate_embeddings(vectors: &[Array1<f32>], expected: usize) -> Result<(), ServiceError> {
    if vectors.len() != expected {
        return Err(ServiceError::malformed(
            EMBEDDER,
            format!("expected {expected} vectors, got {}", vectors.len()),
        ));
    }
    let Some(first) = vectors.first() else {
        return Ok(());
    };
    let dims = first.len();
    if dims == 0 {
        return Err(ServiceError::malformed(EMBEDDER, "zero-length embedding"));
    }
    for vector in vectors {
        if vector.len() != dims {
            return Err(ServiceError::malformed(
                EMBEDDER,
                format!("mixed embedding lengths {dims} and {}", vector.len()),
            ));
        }
        if vector.iter().any(|value| !value.is_finite()) {
            return Err(ServiceError::malformed(EMBEDDER, "non-finite embedding value"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Ragged;

    impl Embedder for Ragged {
        fn embed(&self, text: &str) -> Result<Array1<f32>, ServiceError> {
            Ok(Array1::ones(text.len().max(1)))
        }
    }

    struct OutOfRange;

    impl SentimentAnalyzer for OutOfRange {
        fn analyze(&self, _text: &str) -> Result<f32, ServiceError> {
            Ok(3.5)
        }
    }

    #[test]
    fn call_with_timeout_returns_fast_results() {
        let value = call_with_timeout("test", Duration::from_secs(1), || Ok(7)).unwrap();
        assert_eq!(value, 7);
    }

    #[test]
    fn call_with_timeout_gives_up_on_slow_calls() {
        let err = call_with_timeout("test", Duration::from_millis(20), || {
            thread::sleep(Duration::from_millis(500));
            Ok(())
        })
        .unwrap_err();
        assert!(matches!(err, ServiceError::Timeout { service: "test", .. }));
        assert_eq!(err.service(), "test");
    }

    #[test]
    fn timeout_is_configurable() {
        let services = NlpServices::local().with_timeout(Duration::from_millis(250));
        assert_eq!(services.timeout(), Duration::from_millis(250));
    }

    #[test]
    fn call_with_timeout_reports_panicking_worker() {
        let err = call_with_timeout::<(), _>("test", Duration::from_secs(1), || {
            panic!("model crashed")
        })
        .unwrap_err();
        assert!(matches!(err, ServiceError::Unavailable { .. }));
        assert_eq!(err.service(), "test");
    }

    #[test]
    fn rejects_ragged_embeddings() {
        let services = NlpServices::local().with_timeout(Duration::from_secs(1));
        let services = NlpServices {
            embedder: Arc::new(Ragged),
            ..services
        };
        let err = services
            .embed_batch(vec!["a".to_string(), "abc".to_string()])
            .unwrap_err();
        assert!(matches!(err, ServiceError::Malformed { .. }));
    }

    #[test]
    fn rejects_out_of_range_sentiment() {
        let services = NlpServices {
            sentiment: Arc::new(OutOfRange),
            ..NlpServices::local()
        };
        assert!(matches!(
            services.analyze_sentiment("fine"),
            Err(ServiceError::Malformed { .. })
        ));
    }
}
