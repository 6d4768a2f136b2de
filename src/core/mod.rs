//! Scoring, prediction and coordination engine.

pub mod data;
pub mod handoff;
pub mod interpretation;
pub mod protocols;
pub mod resources;
pub mod scoring;
pub mod triage;

use chrono::Utc;

use crate::models::{PatientAssessment, SymptomSet, VitalsSample, VitalsTrend};
use protocols::ProtocolActivator;
use scoring::ClinicalScorer;
use triage::{TriageInputs, TriageModel, SEVERITY_FACTORS};

/// One complete pass over a patient's current inputs.
///
/// `vitals` is the latest sample; it is expected to already be the last
/// entry of `trend`.
pub fn assess(
    model: &dyn TriageModel,
    vitals: &VitalsSample,
    symptoms: &SymptomSet,
    trend: &VitalsTrend,
) -> PatientAssessment {
    let scores = ClinicalScorer::compute(vitals, symptoms, trend);
    let severity = model.predict_severity(vitals, symptoms, &scores);
    let alerts = model.predict_active_alerts(vitals, symptoms, &scores);
    let interventions = model.predict_interventions(vitals, symptoms, &scores);
    let protocols = ProtocolActivator::activate(&alerts, &interventions);

    let inputs = TriageInputs {
        vitals,
        symptoms,
        scores: &scores,
        severity,
    };
    let contributing_factors = triage::contributing_factors(&SEVERITY_FACTORS, &inputs);
    let interpretations = interpretation::interpret(&scores, vitals, symptoms, trend);

    PatientAssessment {
        computed_at: Utc::now(),
        vital_warnings: data::critical_vital_warnings(vitals),
        scores,
        severity,
        contributing_factors,
        interpretations,
        alerts,
        interventions,
        protocols,
    }
}
