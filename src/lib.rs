//! Noah Triage core library
//!
//! Pre-arrival clinical scoring and ER readiness for patients in transit.
//! Every vitals or symptom update for a patient runs one full pass:
//! scores, severity, alerts, predicted interventions and protocol
//! activations. Arrival issues a handoff summary once, and the registry can
//! forecast hospital-wide resource demand on request.

pub mod config;
pub mod core;
pub mod error;
pub mod logging;
pub mod models;
pub mod registry;
pub mod simulation;

pub use crate::config::{load_config, Config};
pub use crate::core::handoff::{HandoffComposer, HandoffSummary, MissingInfo};
pub use crate::core::protocols::{Protocol, ProtocolActivation, ProtocolActivator};
pub use crate::core::resources::{ResourceAggregator, ResourceDemand, Shortfall};
pub use crate::core::scoring::ClinicalScorer;
pub use crate::core::triage::{RuleBasedTriage, TriageModel};
pub use crate::error::{ClinicalError, EngineError};
pub use crate::registry::PatientRegistry;
