//! Error handling and error types for bagging ensembles.
//!
//! Every fallible operation in the crate returns [`Result`]. Errors are never
//! retried or recovered internally: a failing batch aborts the surrounding
//! `fit` or `predict` call and the error is handed to the caller unchanged.

use std::io;
use thiserror::Error;

/// Main error type for the bagging library.
#[derive(Error, Debug)]
pub enum BaggingError {
    /// Configuration and validation errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Invalid input parameters
    #[error("Invalid parameter: {parameter} = {value}, {reason}")]
    InvalidParameter {
        parameter: String,
        value: String,
        reason: String,
    },

    /// Dimension mismatch errors
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: String, actual: String },

    /// Batch stream errors (empty batches, empty evaluation streams)
    #[error("Dataset error: {message}")]
    Dataset { message: String },

    /// Training-related errors
    #[error("Training error: {message}")]
    Training { message: String },

    /// Numerical computation errors (overflow, NaN, infinity)
    #[error("Numerical error: {message}")]
    Numerical { message: String },

    /// Checkpoint serialization/deserialization errors
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// File I/O errors
    #[error("I/O error: {source}")]
    IO {
        #[from]
        source: io::Error,
    },

    /// JSON serialization errors
    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },

    /// TOML parsing errors
    #[error("TOML error: {source}")]
    Toml {
        #[from]
        source: toml::de::Error,
    },

    /// Bincode serialization errors
    #[error("Bincode error: {source}")]
    Bincode {
        #[from]
        source: bincode::Error,
    },

    /// Not implemented functionality
    #[error("Not implemented: {feature}")]
    NotImplemented { feature: String },
}

/// Type alias for Results using BaggingError
pub type Result<T> = std::result::Result<T, BaggingError>;

impl BaggingError {
    /// Create a configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        BaggingError::Config {
            message: message.into(),
        }
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter<P, V, R>(parameter: P, value: V, reason: R) -> Self
    where
        P: Into<String>,
        V: Into<String>,
        R: Into<String>,
    {
        BaggingError::InvalidParameter {
            parameter: parameter.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a dimension mismatch error
    pub fn dimension_mismatch<E, A>(expected: E, actual: A) -> Self
    where
        E: Into<String>,
        A: Into<String>,
    {
        BaggingError::DimensionMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create a dataset error
    pub fn dataset<S: Into<String>>(message: S) -> Self {
        BaggingError::Dataset {
            message: message.into(),
        }
    }

    /// Create a training error
    pub fn training<S: Into<String>>(message: S) -> Self {
        BaggingError::Training {
            message: message.into(),
        }
    }

    /// Create a numerical error
    pub fn numerical<S: Into<String>>(message: S) -> Self {
        BaggingError::Numerical {
            message: message.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization<S: Into<String>>(message: S) -> Self {
        BaggingError::Serialization {
            message: message.into(),
        }
    }

    /// Create a not implemented error
    pub fn not_implemented<S: Into<String>>(feature: S) -> Self {
        BaggingError::NotImplemented {
            feature: feature.into(),
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            BaggingError::Config { .. } => "config",
            BaggingError::InvalidParameter { .. } => "invalid_parameter",
            BaggingError::DimensionMismatch { .. } => "dimension_mismatch",
            BaggingError::Dataset { .. } => "dataset",
            BaggingError::Training { .. } => "training",
            BaggingError::Numerical { .. } => "numerical",
            BaggingError::Serialization { .. } => "serialization",
            BaggingError::IO { .. } => "io",
            BaggingError::Json { .. } => "json",
            BaggingError::Toml { .. } => "toml",
            BaggingError::Bincode { .. } => "bincode",
            BaggingError::NotImplemented { .. } => "not_implemented",
        }
    }
}
