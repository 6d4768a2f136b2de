//! Canned patients and synthetic telemetry for the demo harness and benches.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use rand::Rng;

use crate::models::symptoms::names;
use crate::models::{EmsTreatment, Medication, PatientInfo, SymptomSet, VitalsSample};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    Stemi,
    Stroke,
    Trauma,
    Sepsis,
    Stable,
}

impl Scenario {
    pub const ALL: [Scenario; 5] = [
        Scenario::Stemi,
        Scenario::Stroke,
        Scenario::Trauma,
        Scenario::Sepsis,
        Scenario::Stable,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Scenario::Stemi => "stemi",
            Scenario::Stroke => "stroke",
            Scenario::Trauma => "trauma",
            Scenario::Sepsis => "sepsis",
            Scenario::Stable => "stable",
        }
    }

    pub fn case(&self) -> ScenarioCase {
        match self {
            Scenario::Stemi => ScenarioCase {
                info: PatientInfo {
                    age: Some(58),
                    sex: Some("F".into()),
                    chief_complaint: Some("Crushing chest pain radiating to left arm".into()),
                    allergies: None,
                    medications: Some(vec!["Nitroglycerin".into()]),
                },
                vitals: vec![(100, 97, 120, 80), (110, 95, 105, 70), (125, 90, 88, 55)]
                    .into_iter()
                    .map(|(hr, spo2, sbp, dbp)| VitalsSample::new(hr, spo2, sbp, dbp))
                    .collect(),
                symptoms: SymptomSet::new()
                    .flag(names::CHEST_PAIN)
                    .flag(names::RADIATING_PAIN)
                    .flag(names::DIAPHORESIS)
                    .flag(names::ECG_ST_ELEVATION),
                treatments: vec![
                    medication("Aspirin", "325 mg", "PO"),
                    EmsTreatment::Intervention("Oxygen 4L".into()),
                    EmsTreatment::Intervention("12-lead ECG".into()),
                    EmsTreatment::Intervention("IV access".into()),
                ],
                eta_minutes: 8,
            },
            Scenario::Stroke => ScenarioCase {
                info: PatientInfo {
                    age: Some(71),
                    sex: Some("M".into()),
                    chief_complaint: Some("Sudden right-sided weakness".into()),
                    allergies: Some(vec!["Penicillin".into()]),
                    medications: Some(vec!["unknown".into()]),
                },
                vitals: vec![VitalsSample::new(88, 96, 172, 95).with_gcs(13)],
                symptoms: SymptomSet::new()
                    .graded(names::FACIAL_DROOP, 2)
                    .graded(names::ARM_WEAKNESS_RIGHT, 3)
                    .graded(names::LEG_WEAKNESS_RIGHT, 2)
                    .graded(names::APHASIA, 2)
                    .graded(names::DYSARTHRIA, 1),
                treatments: vec![EmsTreatment::Intervention("Glucose check".into())],
                eta_minutes: 12,
            },
            Scenario::Trauma => ScenarioCase {
                info: PatientInfo {
                    age: Some(34),
                    sex: Some("M".into()),
                    chief_complaint: Some("Motor vehicle collision, chest and abdominal trauma".into()),
                    allergies: None,
                    medications: None,
                },
                vitals: vec![
                    VitalsSample::new(118, 94, 98, 60).with_gcs(10).with_respiratory_rate(26),
                    VitalsSample::new(130, 92, 80, 48).with_gcs(9).with_respiratory_rate(30),
                    VitalsSample::new(142, 88, 62, 38).with_gcs(8).with_respiratory_rate(32),
                ],
                symptoms: SymptomSet::new().flag(names::ALTERED_MENTAL_STATUS),
                treatments: vec![
                    EmsTreatment::Intervention("Two large-bore IVs".into()),
                    EmsTreatment::Intervention("Normal saline bolus".into()),
                    EmsTreatment::Intervention("Cervical collar".into()),
                    EmsTreatment::Intervention("Pelvic binder".into()),
                ],
                eta_minutes: 10,
            },
            Scenario::Sepsis => ScenarioCase {
                info: PatientInfo {
                    age: Some(80),
                    sex: Some("F".into()),
                    chief_complaint: Some("Fever and confusion".into()),
                    allergies: Some(vec!["Sulfa".into()]),
                    medications: Some(vec!["Metformin".into(), "Lisinopril".into()]),
                },
                vitals: vec![VitalsSample::new(118, 91, 92, 55)
                    .with_respiratory_rate(26)
                    .with_gcs(14)],
                symptoms: SymptomSet::new()
                    .flag(names::RESPIRATORY_DISTRESS)
                    .flag(names::ALTERED_MENTAL_STATUS)
                    .flag("fever"),
                treatments: vec![EmsTreatment::Intervention("IV access".into())],
                eta_minutes: 15,
            },
            Scenario::Stable => ScenarioCase {
                info: PatientInfo {
                    age: Some(45),
                    sex: Some("F".into()),
                    chief_complaint: Some("Ankle injury".into()),
                    allergies: Some(vec!["None known".into()]),
                    medications: Some(vec!["None".into()]),
                },
                vitals: vec![VitalsSample::new(78, 98, 124, 80)
                    .with_respiratory_rate(16)
                    .with_gcs(15)],
                symptoms: SymptomSet::new().flag("ankle_pain"),
                treatments: vec![EmsTreatment::Intervention("Splint".into())],
                eta_minutes: 20,
            },
        }
    }
}

fn medication(name: &str, dose: &str, route: &str) -> EmsTreatment {
    EmsTreatment::Medication(Medication {
        name: name.into(),
        dose: dose.into(),
        route: route.into(),
        administered_at: Some(Utc::now()),
    })
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Scenario {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Scenario::ALL
            .into_iter()
            .find(|scenario| scenario.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                let known: Vec<_> = Scenario::ALL.iter().map(Scenario::name).collect();
                format!("unknown scenario '{}', expected one of: {}", s, known.join(", "))
            })
    }
}

/// Inputs for one canned patient. Vitals are oldest first.
#[derive(Debug, Clone)]
pub struct ScenarioCase {
    pub info: PatientInfo,
    pub vitals: Vec<VitalsSample>,
    pub symptoms: SymptomSet,
    pub treatments: Vec<EmsTreatment>,
    pub eta_minutes: u32,
}

impl ScenarioCase {
    /// Restamp the vitals `interval` apart, the last one at `end`.
    pub fn stamped(mut self, end: DateTime<Utc>, interval: Duration) -> Self {
        let count = self.vitals.len() as i32;
        for (i, sample) in self.vitals.iter_mut().enumerate() {
            sample.timestamp = end - interval * (count - 1 - i as i32);
        }
        self
    }
}

/// Physiological state driving the synthetic monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    Stable,
    Critical,
    Deteriorating,
}

impl Condition {
    pub const ALL: [Condition; 3] = [Condition::Critical, Condition::Deteriorating, Condition::Stable];

    /// One randomized monitor reading.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R, timestamp: DateTime<Utc>) -> VitalsSample {
        let (hr, spo2, sbp, dbp) = match self {
            Condition::Critical => (95..=135, 88..=94, 85..=110, 50..=70),
            Condition::Deteriorating => (110..=145, 85..=91, 75..=95, 45..=60),
            Condition::Stable => (60..=90, 95..=99, 110..=130, 70..=85),
        };
        VitalsSample::new(
            rng.gen_range(hr),
            rng.gen_range(spo2),
            rng.gen_range(sbp),
            rng.gen_range(dbp),
        )
        .at(timestamp)
    }

    /// What the crew reports for this condition.
    pub fn symptoms(&self) -> SymptomSet {
        match self {
            Condition::Critical => SymptomSet::new()
                .flag(names::CHEST_PAIN)
                .flag(names::RADIATING_PAIN)
                .flag(names::DIAPHORESIS)
                .flag(names::NAUSEA),
            Condition::Deteriorating => SymptomSet::new()
                .flag(names::RESPIRATORY_DISTRESS)
                .flag(names::ALTERED_MENTAL_STATUS),
            Condition::Stable => SymptomSet::new(),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Condition::Stable => "stable",
            Condition::Critical => "critical",
            Condition::Deteriorating => "deteriorating",
        };
        f.write_str(name)
    }
}
