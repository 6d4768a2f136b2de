//! Handoff summary issued to the receiving team at arrival.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::config::HandoffConfig;
use crate::models::{Alert, Intervention, PatientRecord, Severity, VitalsSample};

/// Required information the crew has not obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MissingInfo {
    Allergies,
    Medications,
    Vitals,
}

impl fmt::Display for MissingInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MissingInfo::Allergies => "Allergies",
            MissingInfo::Medications => "Medications",
            MissingInfo::Vitals => "Vitals",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictedNeed {
    pub need: Intervention,
    pub confidence: f64,
}

/// Snapshot of a patient at arrival. Never modified after it is issued.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HandoffSummary {
    pub summary_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub patient_id: String,
    pub ambulance_id: String,
    pub age: Option<u8>,
    pub sex: Option<String>,
    pub chief_complaint: Option<String>,
    pub vitals: Option<VitalsSample>,
    pub alerts: Vec<Alert>,
    pub severity: Option<Severity>,
    pub predicted_needs: Vec<PredictedNeed>,
    pub ems_treatments: Vec<String>,
    pub missing_info: Vec<MissingInfo>,
    pub eta_minutes: Option<u32>,
}

fn joined<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for HandoffSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let age = self.age.map_or_else(|| "?".to_string(), |age| age.to_string());
        writeln!(
            f,
            "PATIENT: {} | {}yo {}",
            self.patient_id,
            age,
            self.sex.as_deref().unwrap_or("?")
        )?;
        writeln!(
            f,
            "CHIEF COMPLAINT: {}",
            self.chief_complaint.as_deref().unwrap_or("Not specified")
        )?;

        if let Some(vitals) = &self.vitals {
            let reading = |v: Option<i32>| v.map_or_else(|| "?".to_string(), |v| v.to_string());
            writeln!(
                f,
                "VITALS: HR {}, BP {}, SpO2 {}%",
                reading(vitals.heart_rate.map(|hr| hr as i32)),
                vitals.blood_pressure(),
                reading(vitals.spo2.map(i32::from))
            )?;
        }
        if !self.alerts.is_empty() {
            writeln!(f, "ACTIVE ALERTS: {}", joined(&self.alerts))?;
        }
        if let Some(severity) = &self.severity {
            writeln!(f, "SEVERITY: {} (Score: {})", severity.level, severity.score)?;
        }
        if !self.predicted_needs.is_empty() {
            let titles: Vec<_> = self.predicted_needs.iter().map(|p| p.need.title()).collect();
            writeln!(f, "PREDICTED NEEDS: {}", titles.join(", "))?;
        }
        if !self.ems_treatments.is_empty() {
            writeln!(f, "EMS TREATMENTS: {}", self.ems_treatments.join(", "))?;
        }
        if !self.missing_info.is_empty() {
            writeln!(f, "MISSING INFO: {}", joined(&self.missing_info))?;
        }
        match self.eta_minutes {
            Some(eta) => write!(f, "ETA: {} minutes", eta),
            None => write!(f, "ETA: ? minutes"),
        }
    }
}

pub struct HandoffComposer {
    config: HandoffConfig,
}

impl HandoffComposer {
    pub fn new(config: HandoffConfig) -> Self {
        Self { config }
    }

    /// Return the patient's summary, composing and storing it on first call.
    /// Later calls return the stored summary even if the record has changed.
    pub fn generate_handoff_summary(&self, record: &mut PatientRecord) -> Arc<HandoffSummary> {
        if let Some(summary) = &record.handoff {
            return Arc::clone(summary);
        }
        let summary = Arc::new(self.compose(record));
        record.handoff = Some(Arc::clone(&summary));
        summary
    }

    /// Build a fresh summary from the record's current state.
    pub fn compose(&self, record: &PatientRecord) -> HandoffSummary {
        let assessment = record.assessment();

        let predicted_needs = assessment
            .map(|a| {
                a.interventions
                    .ranked()
                    .into_iter()
                    .take(self.config.top_needs)
                    .map(|(need, confidence)| PredictedNeed { need, confidence })
                    .collect()
            })
            .unwrap_or_default();

        HandoffSummary {
            summary_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            patient_id: record.patient_id.clone(),
            ambulance_id: record.ambulance_id.clone(),
            age: record.info.age,
            sex: record.info.sex.clone(),
            chief_complaint: record.info.chief_complaint.clone(),
            vitals: record.trend().latest().cloned(),
            alerts: assessment
                .map(|a| a.alerts.iter().copied().collect())
                .unwrap_or_default(),
            severity: assessment.map(|a| a.severity),
            predicted_needs,
            ems_treatments: Self::treatment_list(record),
            missing_info: self.missing_info(record),
            eta_minutes: record.eta_minutes,
        }
    }

    fn treatment_list(record: &PatientRecord) -> Vec<String> {
        let treatments = &record.treatments;
        let mut list: Vec<String> = treatments
            .medications
            .iter()
            .map(|m| m.name.clone())
            .collect();
        list.extend(treatments.interventions.iter().take(3).cloned());
        if treatments.cpr {
            list.push("CPR".to_string());
        }
        if treatments.defibrillation {
            list.push("Defibrillation".to_string());
        }
        list
    }

    fn missing_info(&self, record: &PatientRecord) -> Vec<MissingInfo> {
        let mut missing = Vec::new();
        if !self.is_obtained(record.info.allergies.as_deref()) {
            missing.push(MissingInfo::Allergies);
        }
        if !self.is_obtained(record.info.medications.as_deref()) {
            missing.push(MissingInfo::Medications);
        }
        if record.trend().is_empty() {
            missing.push(MissingInfo::Vitals);
        }
        missing
    }

    /// A list counts as obtained when it holds at least one real entry.
    /// `Some(vec![])` is treated the same as never asked.
    fn is_obtained(&self, entries: Option<&[String]>) -> bool {
        entries.map_or(false, |entries| {
            entries.iter().any(|entry| {
                let entry = entry.trim();
                !entry.is_empty()
                    && !self
                        .config
                        .unknown_sentinels
                        .iter()
                        .any(|sentinel| sentinel.eq_ignore_ascii_case(entry))
            })
        })
    }
}

impl Default for HandoffComposer {
    fn default() -> Self {
        Self::new(HandoffConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TrendConfig;
    use crate::core::assess;
    use crate::core::triage::RuleBasedTriage;
    use crate::models::symptoms::names;
    use crate::models::{EmsTreatment, Medication, PatientInfo, SymptomSet};

    fn stemi_record() -> PatientRecord {
        let info = PatientInfo {
            age: Some(62),
            sex: Some("M".into()),
            chief_complaint: Some("Chest pain".into()),
            allergies: Some(vec!["Unknown".into()]),
            medications: Some(vec!["Metoprolol".into()]),
        };
        let mut record = PatientRecord::new("P-001", "AMB-7", info, &TrendConfig::default()).with_eta(0);
        record.symptoms = SymptomSet::new()
            .flag(names::CHEST_PAIN)
            .flag(names::RADIATING_PAIN)
            .flag(names::DIAPHORESIS)
            .flag(names::ECG_ST_ELEVATION);
        let vitals = VitalsSample::new(125, 90, 88, 55);
        record.trend.append(vitals.clone());
        record.assessment = Some(assess(
            &RuleBasedTriage::new(),
            &vitals,
            &record.symptoms,
            &record.trend,
        ));
        record
    }

    #[test]
    fn test_summary_contents() {
        let summary = HandoffComposer::default().compose(&stemi_record());
        assert_eq!(summary.alerts, vec![Alert::Stemi]);
        assert_eq!(summary.predicted_needs[0].need, Intervention::LikelyStemi);
        assert_eq!(summary.missing_info, vec![MissingInfo::Allergies]);
        assert_eq!(summary.vitals.as_ref().and_then(|v| v.heart_rate), Some(125));
    }

    #[test]
    fn test_second_call_returns_issued_summary() {
        let composer = HandoffComposer::default();
        let mut record = stemi_record();
        let first = composer.generate_handoff_summary(&mut record);

        record.trend.append(VitalsSample::new(60, 99, 130, 85));
        record.info.chief_complaint = Some("Changed".into());

        let second = composer.generate_handoff_summary(&mut record);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(
            serde_json::to_string(&*first).unwrap(),
            serde_json::to_string(&*second).unwrap()
        );
    }

    #[test]
    fn test_empty_and_absent_lists_are_missing() {
        let info = PatientInfo {
            allergies: Some(vec![]),
            medications: None,
            ..PatientInfo::default()
        };
        let record = PatientRecord::new("P-002", "AMB-1", info, &TrendConfig::default());
        let summary = HandoffComposer::default().compose(&record);
        assert_eq!(
            summary.missing_info,
            vec![MissingInfo::Allergies, MissingInfo::Medications, MissingInfo::Vitals]
        );
        assert!(summary.severity.is_none());
        assert!(summary.predicted_needs.is_empty());
    }

    #[test]
    fn test_top_needs_truncated() {
        let composer = HandoffComposer::new(HandoffConfig {
            top_needs: 1,
            ..HandoffConfig::default()
        });
        let summary = composer.compose(&stemi_record());
        assert_eq!(summary.predicted_needs.len(), 1);
    }

    #[test]
    fn test_treatment_list_order() {
        let mut record = stemi_record();
        for treatment in [
            EmsTreatment::Intervention("IV access".into()),
            EmsTreatment::Medication(Medication {
                name: "Aspirin".into(),
                dose: "324 mg".into(),
                route: "PO".into(),
                administered_at: None,
            }),
            EmsTreatment::Intervention("12-lead ECG".into()),
            EmsTreatment::Intervention("Oxygen".into()),
            EmsTreatment::Intervention("Cardiac monitor".into()),
            EmsTreatment::Defibrillation,
        ] {
            record.treatments.record(treatment);
        }
        let summary = HandoffComposer::default().compose(&record);
        assert_eq!(
            summary.ems_treatments,
            vec!["Aspirin", "IV access", "12-lead ECG", "Oxygen", "Defibrillation"]
        );
    }

    #[test]
    fn test_rendered_sheet() {
        let sheet = HandoffComposer::default().compose(&stemi_record()).to_string();
        let lines: Vec<_> = sheet.lines().collect();
        assert_eq!(lines[0], "PATIENT: P-001 | 62yo M");
        assert_eq!(lines[1], "CHIEF COMPLAINT: Chest pain");
        assert_eq!(lines[2], "VITALS: HR 125, BP 88/55, SpO2 90%");
        assert_eq!(lines[3], "ACTIVE ALERTS: STEMI");
        assert_eq!(lines[4], "SEVERITY: CRITICAL (Score: 77)");
        assert!(lines[5].starts_with("PREDICTED NEEDS: Likely Stemi"));
        assert_eq!(lines[6], "MISSING INFO: Allergies");
        assert_eq!(lines[7], "ETA: 0 minutes");
    }
}
