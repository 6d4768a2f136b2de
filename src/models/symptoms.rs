use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Symptom names recognized by the scorer and predictor.
pub mod names {
    pub const CHEST_PAIN: &str = "chest_pain";
    pub const RADIATING_PAIN: &str = "radiating_pain";
    pub const DIAPHORESIS: &str = "diaphoresis";
    pub const ECG_ST_ELEVATION: &str = "ecg_st_elevation";
    pub const NAUSEA: &str = "nausea";

    pub const RESPIRATORY_DISTRESS: &str = "respiratory_distress";
    pub const ALTERED_MENTAL_STATUS: &str = "altered_mental_status";
    pub const AIRWAY_OBSTRUCTION: &str = "airway_obstruction";
    pub const FAST_POSITIVE: &str = "fast_positive";

    // NIHSS items
    pub const CONSCIOUSNESS_LEVEL: &str = "consciousness_level";
    pub const LOC_QUESTIONS: &str = "loc_questions";
    pub const LOC_COMMANDS: &str = "loc_commands";
    pub const GAZE_DEVIATION: &str = "gaze_deviation";
    pub const VISUAL_FIELD_LOSS: &str = "visual_field_loss";
    pub const FACIAL_DROOP: &str = "facial_droop";
    pub const ARM_WEAKNESS_LEFT: &str = "arm_weakness_left";
    pub const ARM_WEAKNESS_RIGHT: &str = "arm_weakness_right";
    pub const LEG_WEAKNESS_LEFT: &str = "leg_weakness_left";
    pub const LEG_WEAKNESS_RIGHT: &str = "leg_weakness_right";
    pub const LIMB_ATAXIA: &str = "limb_ataxia";
    pub const SENSORY_LOSS: &str = "sensory_loss";
    pub const APHASIA: &str = "aphasia";
    pub const DYSARTHRIA: &str = "dysarthria";
    pub const EXTINCTION: &str = "extinction";
}

/// Presence flag or graded severity for one symptom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SymptomValue {
    Flag(bool),
    Severity(u8),
}

impl SymptomValue {
    pub fn is_present(&self) -> bool {
        match *self {
            SymptomValue::Flag(present) => present,
            SymptomValue::Severity(grade) => grade > 0,
        }
    }

    /// A bare flag grades as 1.
    pub fn severity(&self) -> u8 {
        match *self {
            SymptomValue::Flag(present) => u8::from(present),
            SymptomValue::Severity(grade) => grade,
        }
    }
}

impl From<bool> for SymptomValue {
    fn from(present: bool) -> Self {
        SymptomValue::Flag(present)
    }
}

impl From<u8> for SymptomValue {
    fn from(grade: u8) -> Self {
        SymptomValue::Severity(grade)
    }
}

/// Symptoms extracted from the latest redacted voice note.
///
/// Replaced wholesale on every voice-note update; never merged.
/// Absent names read as not present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymptomSet(BTreeMap<String, SymptomValue>);

impl SymptomSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn flag(mut self, name: &str) -> Self {
        self.0.insert(name.to_string(), SymptomValue::Flag(true));
        self
    }

    pub fn graded(mut self, name: &str, grade: u8) -> Self {
        self.0.insert(name.to_string(), SymptomValue::Severity(grade));
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<SymptomValue>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn is_present(&self, name: &str) -> bool {
        self.0.get(name).map_or(false, SymptomValue::is_present)
    }

    pub fn severity(&self, name: &str) -> u8 {
        self.0.get(name).map_or(0, SymptomValue::severity)
    }

    pub fn any_present(&self, names: &[&str]) -> bool {
        names.iter().any(|name| self.is_present(name))
    }

    /// Number of symptoms reported present, recognized or not.
    pub fn present_count(&self) -> usize {
        self.0.values().filter(|v| v.is_present()).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SymptomValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<SymptomValue>> FromIterator<(K, V)> for SymptomSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
