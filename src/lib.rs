//! Rubric scoring for spoken self-introductions.
//!
//! [`RubricComposer`] turns a transcript plus its spoken duration into a
//! [`ScoreReport`] across six dimensions worth 100 points in total.

pub mod cli;
pub mod config;
pub mod error;
pub mod lexical;
pub mod scoring;
pub mod services;
pub mod types;

pub use config::{Rubric, RubricConfig};
pub use error::{ConfigError, ServiceError, ValidationError};
pub use scoring::RubricComposer;
pub use services::NlpServices;
pub use types::{Dimension, DimensionScore, EvaluationInput, ScoreReport};
