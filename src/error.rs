use std::time::Duration;

use thiserror::Error;

/// Rejected evaluation input. The only error class that aborts scoring.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("transcript is empty")]
    EmptyTranscript,
    #[error("duration must be positive, got {0}")]
    NonPositiveDuration(f64),
    #[error("duration must be a finite number, got {0}")]
    NonFiniteDuration(f64),
}

/// Failure of an external NLP service. Contained by the scorer that made the call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ServiceError {
    #[error("{service} unavailable: {message}")]
    Unavailable {
        service: &'static str,
        message: String,
    },
    #[error("{service} timed out after {}ms", after.as_millis())]
    Timeout {
        service: &'static str,
        after: Duration,
    },
    #[error("{service} returned malformed output: {message}")]
    Malformed {
        service: &'static str,
        message: String,
    },
}

impl ServiceError {
    pub fn unavailable(service: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Unavailable {
            service,
            message: err.to_string(),
        }
    }

    pub fn malformed(service: &'static str, message: impl Into<String>) -> Self {
        Self::Malformed {
            service,
            message: message.into(),
        }
    }

    pub fn timeout(service: &'static str, after: Duration) -> Self {
        Self::Timeout { service, after }
    }

    pub fn service(&self) -> &'static str {
        match self {
            Self::Unavailable { service, .. }
            | Self::Timeout { service, .. }
            | Self::Malformed { service, .. } => service,
        }
    }
}

/// Broken rubric configuration. Fatal at startup, never raised per request.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error while {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON parse error while {context}: {source}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid keyword pattern for topic \"{topic}\": {source}")]
    Pattern {
        topic: String,
        #[source]
        source: regex::Error,
    },
    #[error("invalid rubric: {message}")]
    Invalid { message: String },
}

impl ConfigError {
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    pub(crate) fn json(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Json {
            context: context.into(),
            source,
        }
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }
}
