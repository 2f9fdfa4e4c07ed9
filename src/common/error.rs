use std::fmt;

use thiserror::Error;

use crate::common::types::{RetrievalResult, VariantFailure};

/// Failures of a single logical GET, redirects included.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("invalid URI '{uri}': {reason}")]
    InvalidUri { uri: String, reason: String },

    #[error("connection to {host} failed: {reason}")]
    Connection { host: String, reason: String },

    #[error("request to {uri} timed out")]
    Timeout { uri: String },

    #[error("request to {uri} returned status {status}")]
    Status { uri: String, status: u16 },

    #[error("failed reading body from {uri}: {reason}")]
    Body { uri: String, reason: String },
}

impl TransportError {
    /// HTTP status carried by the failure, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Failures of a catalog load. Cloneable so that every caller sharing a
/// single in-flight load receives the same outcome.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("invalid catalog format: {0}")]
    InvalidFormat(String),
}

/// Variant batch that finished with at least one failed variant.
#[derive(Debug, Clone)]
pub struct PartialFailure {
    pub family: String,
    pub succeeded: Vec<RetrievalResult>,
    pub failures: Vec<VariantFailure>,
}

impl PartialFailure {
    pub fn failed_count(&self) -> usize {
        self.failures.len()
    }
}

impl fmt::Display for PartialFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} variant(s) of {} failed ({} succeeded)",
            self.failures.len(),
            self.family,
            self.succeeded.len()
        )?;
        for failure in &self.failures {
            write!(f, "; {}: {}", failure.variant, failure.reason)?;
        }
        Ok(())
    }
}

#[derive(Error, Debug)]
pub enum FontError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("font detail for '{family}' unavailable: {reason}")]
    Detail { family: String, reason: String },

    #[error("{0}")]
    Corrupted(String),

    #[error("{0}")]
    PartialFailure(PartialFailure),

    #[error("no system font directory available on this platform")]
    NoSystemFontDir,

    #[error("font registration failed for {path}: {reason}")]
    Registration { path: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FontError {
    /// Successful results attached to a partial batch failure.
    pub fn partial_results(&self) -> Option<&[RetrievalResult]> {
        match self {
            FontError::PartialFailure(partial) => Some(&partial.succeeded),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, FontError>;
