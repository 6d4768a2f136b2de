//! Tracked patients and the per-update triage pass.
//!
//! Each record sits behind its own mutex inside a concurrent map. Passes for
//! different patients run in parallel; passes for the same patient are
//! serialized by its lock, and the assessment is swapped in whole, so a
//! reader never sees scores from one pass next to alerts from another.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

use crate::config::Config;
use crate::core::data::{parse_symptoms, parse_vitals};
use crate::core::handoff::{HandoffComposer, HandoffSummary};
use crate::core::resources::{ResourceAggregator, ResourceDemand, Shortfall};
use crate::core::triage::{RuleBasedTriage, TriageModel};
use crate::core::assess;
use crate::error::{EngineError, Result};
use crate::models::{
    EmsTreatment, PatientAssessment, PatientInfo, PatientRecord, SymptomSet, TransportStatus,
    VitalsSample,
};

type SharedRecord = Arc<Mutex<PatientRecord>>;

fn lock(record: &Mutex<PatientRecord>) -> MutexGuard<'_, PatientRecord> {
    record.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct PatientRegistry {
    records: DashMap<String, SharedRecord>,
    model: Arc<dyn TriageModel>,
    composer: HandoffComposer,
    config: Config,
}

impl PatientRegistry {
    pub fn new(config: Config) -> Self {
        Self::with_model(config, Arc::new(RuleBasedTriage::new()))
    }

    pub fn with_model(config: Config, model: Arc<dyn TriageModel>) -> Self {
        Self {
            records: DashMap::new(),
            model,
            composer: HandoffComposer::new(config.handoff.clone()),
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn record(&self, patient_id: &str) -> Result<SharedRecord> {
        self.records
            .get(patient_id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| EngineError::UnknownPatient(patient_id.to_string()))
    }

    /// Start tracking a patient. The record starts EN_ROUTE with no vitals.
    #[instrument(skip(self, info), fields(patient_id = %patient_id, ambulance_id = %ambulance_id))]
    pub fn register(
        &self,
        patient_id: &str,
        ambulance_id: &str,
        info: PatientInfo,
        eta_minutes: Option<u32>,
    ) -> Result<()> {
        match self.records.entry(patient_id.to_string()) {
            Entry::Occupied(_) => Err(EngineError::DuplicatePatient(patient_id.to_string())),
            Entry::Vacant(slot) => {
                let mut record =
                    PatientRecord::new(patient_id, ambulance_id, info, &self.config.trend);
                record.eta_minutes = eta_minutes;
                slot.insert(Arc::new(Mutex::new(record)));
                info!("Patient registered");
                Ok(())
            }
        }
    }

    /// Append a monitor sample and run a full pass.
    ///
    /// Out-of-range samples are rejected before they touch the trend.
    #[instrument(skip(self, sample), fields(patient_id = %patient_id))]
    pub fn ingest_vitals(&self, patient_id: &str, sample: VitalsSample) -> Result<PatientAssessment> {
        let shared = self.record(patient_id)?;
        if let Err(errors) = sample.validate() {
            warn!(%errors, "Rejected vitals sample");
            return Err(errors.into());
        }

        let mut record = lock(&shared);
        record.trend.append(sample);
        Ok(self.run_pass(&mut record))
    }

    /// Replace the patient's symptoms wholesale and run a full pass.
    #[instrument(skip(self, symptoms), fields(patient_id = %patient_id))]
    pub fn ingest_symptoms(
        &self,
        patient_id: &str,
        symptoms: SymptomSet,
    ) -> Result<PatientAssessment> {
        let shared = self.record(patient_id)?;
        let mut record = lock(&shared);
        record.symptoms = symptoms;
        Ok(self.run_pass(&mut record))
    }

    /// Parse a telemetry payload and ingest it.
    pub fn ingest_vitals_json(&self, patient_id: &str, raw: &str) -> Result<PatientAssessment> {
        let sample = parse_vitals(raw)?;
        self.ingest_vitals(patient_id, sample)
    }

    /// Parse a voice-note extraction payload and ingest it.
    pub fn ingest_symptoms_json(&self, patient_id: &str, raw: &str) -> Result<PatientAssessment> {
        let symptoms = parse_symptoms(raw)?;
        self.ingest_symptoms(patient_id, symptoms)
    }

    fn run_pass(&self, record: &mut PatientRecord) -> PatientAssessment {
        let empty;
        let vitals = match record.trend.latest() {
            Some(latest) => latest,
            None => {
                empty = VitalsSample::empty(Utc::now());
                &empty
            }
        };

        let assessment = assess(self.model.as_ref(), vitals, &record.symptoms, &record.trend);
        debug!(
            severity = assessment.severity.score,
            level = %assessment.severity.level,
            alerts = assessment.alerts.len(),
            flagged = assessment.scores.flags.len(),
            "Triage pass complete"
        );
        record.assessment = Some(assessment.clone());
        assessment
    }

    #[instrument(skip(self, treatment), fields(patient_id = %patient_id))]
    pub fn record_treatment(&self, patient_id: &str, treatment: EmsTreatment) -> Result<()> {
        let shared = self.record(patient_id)?;
        lock(&shared).treatments.record(treatment);
        Ok(())
    }

    /// Update the ETA. Reaching zero marks the patient arrived and issues the
    /// handoff. Updates after arrival are ignored.
    #[instrument(skip(self), fields(patient_id = %patient_id))]
    pub fn update_eta(
        &self,
        patient_id: &str,
        minutes: u32,
    ) -> Result<Option<Arc<HandoffSummary>>> {
        let shared = self.record(patient_id)?;
        let mut record = lock(&shared);

        if record.has_arrived() {
            warn!(minutes, "Ignoring ETA update for arrived patient");
            return Ok(record.handoff.clone());
        }

        record.eta_minutes = Some(minutes);
        if minutes == 0 {
            return Ok(Some(self.arrive(&mut record)));
        }
        Ok(None)
    }

    /// Explicit arrival. Idempotent: an arrived patient keeps its summary.
    #[instrument(skip(self), fields(patient_id = %patient_id))]
    pub fn mark_arrived(&self, patient_id: &str) -> Result<Arc<HandoffSummary>> {
        let shared = self.record(patient_id)?;
        let mut record = lock(&shared);
        Ok(self.arrive(&mut record))
    }

    fn arrive(&self, record: &mut PatientRecord) -> Arc<HandoffSummary> {
        if !record.has_arrived() {
            record.status = TransportStatus::Arrived;
            record.eta_minutes = Some(0);
            info!("Patient arrived");
        }
        self.composer.generate_handoff_summary(record)
    }

    pub fn handoff(&self, patient_id: &str) -> Result<Option<Arc<HandoffSummary>>> {
        let shared = self.record(patient_id)?;
        let record = lock(&shared);
        Ok(record.handoff.clone())
    }

    pub fn assessment(&self, patient_id: &str) -> Result<Option<PatientAssessment>> {
        let shared = self.record(patient_id)?;
        let record = lock(&shared);
        Ok(record.assessment.clone())
    }

    pub fn status(&self, patient_id: &str) -> Result<TransportStatus> {
        let shared = self.record(patient_id)?;
        let status = lock(&shared).status;
        Ok(status)
    }

    /// Stop tracking a patient and return its final record.
    #[instrument(skip(self), fields(patient_id = %patient_id))]
    pub fn discharge(&self, patient_id: &str) -> Result<PatientRecord> {
        let (_, shared) = self
            .records
            .remove(patient_id)
            .ok_or_else(|| EngineError::UnknownPatient(patient_id.to_string()))?;
        let record = lock(&shared).clone();
        info!("Patient discharged");
        Ok(record)
    }

    fn snapshot(&self) -> Vec<PatientAssessment> {
        let shared: Vec<SharedRecord> = self
            .records
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        shared
            .iter()
            .filter_map(|record| lock(record).assessment.clone())
            .collect()
    }

    /// Hospital-wide demand, recomputed from every tracked patient.
    pub fn forecast(&self) -> ResourceDemand {
        ResourceAggregator::forecast(&self.snapshot())
    }

    pub fn shortfalls(&self) -> Vec<Shortfall> {
        self.forecast().shortfalls(&self.config.capacity)
    }

    pub fn patient_ids(&self) -> Vec<String> {
        let mut ids: Vec<_> = self.records.iter().map(|entry| entry.key().clone()).collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Default for PatientRegistry {
    fn default() -> Self {
        Self::new(Config::default())
    }
}
