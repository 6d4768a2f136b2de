//! Error types for the triage engine.
//!
//! `ClinicalError` covers per-score and per-protocol failures. These never
//! abort a pass; they are attached to the result as flags or logged.
//! `EngineError` covers failures at the registry and configuration boundary.

use serde::Serialize;
use thiserror::Error;

use crate::core::protocols::Trigger;
use crate::models::vitals::VitalField;

/// Failures local to a single score, alert or protocol lookup.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClinicalError {
    /// A mandatory vital is absent from the sample.
    #[error("insufficient data: {field} is required")]
    InsufficientData { field: VitalField },

    /// Division by a non-positive denominator.
    #[error("undefined ratio: {numerator}/{denominator} with {denominator} = {value}")]
    UndefinedRatio {
        numerator: VitalField,
        denominator: VitalField,
        value: i32,
    },

    /// An alert or predicted need has no protocol table entry.
    #[error("no protocol registered for {trigger}")]
    UnknownProtocol { trigger: Trigger },
}

/// Failures at the ingestion and coordination boundary.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("unknown patient: {0}")]
    UnknownPatient(String),

    #[error("patient already registered: {0}")]
    DuplicatePatient(String),

    #[error("invalid vitals sample: {0}")]
    InvalidSample(#[from] validator::ValidationErrors),

    #[error("malformed payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

pub type Result<T> = std::result::Result<T, EngineError>;
