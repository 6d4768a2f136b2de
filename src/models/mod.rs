//! Data model shared by the scoring, triage and coordination layers.

pub mod assessment;
pub mod patient;
pub mod scores;
pub mod symptoms;
pub mod vitals;

pub use assessment::{
    Alert, AlertSet, Intervention, InterventionPrediction, PatientAssessment, Severity,
    SeverityLevel, VitalWarning, WarningLevel,
};
pub use patient::{EmsTreatment, EmsTreatments, Medication, PatientInfo, PatientRecord, TransportStatus};
pub use scores::{ClinicalScores, ScoreFlag, ScoreInterpretation, ScoreKind};
pub use symptoms::{SymptomSet, SymptomValue};
pub use vitals::{VitalField, VitalsSample, VitalsTrend};
