use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::assessment::PatientAssessment;
use super::symptoms::SymptomSet;
use super::vitals::VitalsTrend;
use crate::config::TrendConfig;
use crate::core::handoff::HandoffSummary;

/// Identity and history reported for the patient by the crew.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientInfo {
    pub age: Option<u8>,
    pub sex: Option<String>,
    pub chief_complaint: Option<String>,
    pub allergies: Option<Vec<String>>,
    pub medications: Option<Vec<String>>,
}

/// A medication given by the crew en route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Medication {
    pub name: String,
    pub dose: String,
    pub route: String,
    pub administered_at: Option<DateTime<Utc>>,
}

/// Everything the crew has done so far, in the order it was reported.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmsTreatments {
    pub medications: Vec<Medication>,
    pub interventions: Vec<String>,
    pub cpr: bool,
    pub defibrillation: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmsTreatment {
    Medication(Medication),
    Intervention(String),
    Cpr,
    Defibrillation,
}

impl EmsTreatments {
    pub fn record(&mut self, treatment: EmsTreatment) {
        match treatment {
            EmsTreatment::Medication(medication) => self.medications.push(medication),
            EmsTreatment::Intervention(name) => self.interventions.push(name),
            EmsTreatment::Cpr => self.cpr = true,
            EmsTreatment::Defibrillation => self.defibrillation = true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransportStatus {
    EnRoute,
    Arrived,
}

/// State for one tracked patient, from registration until discharge.
///
/// The trend and the issued handoff are the only state carried between
/// passes; everything in `assessment` is recomputed on each ingestion.
#[derive(Debug, Clone)]
pub struct PatientRecord {
    pub patient_id: String,
    pub ambulance_id: String,
    pub info: PatientInfo,
    pub symptoms: SymptomSet,
    pub treatments: EmsTreatments,
    pub status: TransportStatus,
    pub eta_minutes: Option<u32>,
    pub registered_at: DateTime<Utc>,
    pub(crate) trend: VitalsTrend,
    pub(crate) assessment: Option<PatientAssessment>,
    pub(crate) handoff: Option<Arc<HandoffSummary>>,
}

impl PatientRecord {
    pub fn new(
        patient_id: impl Into<String>,
        ambulance_id: impl Into<String>,
        info: PatientInfo,
        trend: &TrendConfig,
    ) -> Self {
        Self {
            patient_id: patient_id.into(),
            ambulance_id: ambulance_id.into(),
            info,
            symptoms: SymptomSet::default(),
            treatments: EmsTreatments::default(),
            status: TransportStatus::EnRoute,
            eta_minutes: None,
            registered_at: Utc::now(),
            trend: VitalsTrend::from_config(trend),
            assessment: None,
            handoff: None,
        }
    }

    pub fn with_eta(mut self, minutes: u32) -> Self {
        self.eta_minutes = Some(minutes);
        self
    }

    pub fn trend(&self) -> &VitalsTrend {
        &self.trend
    }

    pub fn assessment(&self) -> Option<&PatientAssessment> {
        self.assessment.as_ref()
    }

    pub fn handoff(&self) -> Option<&Arc<HandoffSummary>> {
        self.handoff.as_ref()
    }

    pub fn has_arrived(&self) -> bool {
        self.status == TransportStatus::Arrived
    }
}
