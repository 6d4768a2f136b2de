use std::collections::VecDeque;
use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::config::TrendConfig;
use crate::error::ClinicalError;

/// Names of the individual vitals carried by a [`VitalsSample`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VitalField {
    HeartRate,
    Spo2,
    SystolicBp,
    DiastolicBp,
    RespiratoryRate,
    Gcs,
}

impl VitalField {
    pub fn as_str(&self) -> &'static str {
        match self {
            VitalField::HeartRate => "heart_rate",
            VitalField::Spo2 => "spo2",
            VitalField::SystolicBp => "systolic_bp",
            VitalField::DiastolicBp => "diastolic_bp",
            VitalField::RespiratoryRate => "respiratory_rate",
            VitalField::Gcs => "gcs",
        }
    }
}

impl fmt::Display for VitalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One monitor reading from the ambulance. Immutable once recorded.
///
/// Every vital is optional on the wire; scores that need a missing vital
/// report it instead of failing the whole pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct VitalsSample {
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
    #[validate(range(max = 300))]
    pub heart_rate: Option<u32>,
    #[validate(range(max = 100))]
    pub spo2: Option<u8>,
    #[validate(range(min = 0, max = 300))]
    pub systolic_bp: Option<i32>,
    #[validate(range(min = 0, max = 200))]
    pub diastolic_bp: Option<i32>,
    #[validate(range(max = 80))]
    pub respiratory_rate: Option<u32>,
    #[validate(range(min = 3, max = 15))]
    pub gcs: Option<u8>,
}

impl VitalsSample {
    /// Sample with the four monitor vitals, stamped now.
    pub fn new(heart_rate: u32, spo2: u8, systolic_bp: i32, diastolic_bp: i32) -> Self {
        Self {
            timestamp: Utc::now(),
            heart_rate: Some(heart_rate),
            spo2: Some(spo2),
            systolic_bp: Some(systolic_bp),
            diastolic_bp: Some(diastolic_bp),
            respiratory_rate: None,
            gcs: None,
        }
    }

    /// Sample with nothing measured yet.
    pub fn empty(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            heart_rate: None,
            spo2: None,
            systolic_bp: None,
            diastolic_bp: None,
            respiratory_rate: None,
            gcs: None,
        }
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_respiratory_rate(mut self, rate: u32) -> Self {
        self.respiratory_rate = Some(rate);
        self
    }

    pub fn with_gcs(mut self, gcs: u8) -> Self {
        self.gcs = Some(gcs);
        self
    }

    /// Value of a vital, if measured.
    pub fn get(&self, field: VitalField) -> Option<i32> {
        match field {
            VitalField::HeartRate => self.heart_rate.map(|v| v as i32),
            VitalField::Spo2 => self.spo2.map(i32::from),
            VitalField::SystolicBp => self.systolic_bp,
            VitalField::DiastolicBp => self.diastolic_bp,
            VitalField::RespiratoryRate => self.respiratory_rate.map(|v| v as i32),
            VitalField::Gcs => self.gcs.map(i32::from),
        }
    }

    /// Value of a mandatory vital.
    pub fn require(&self, field: VitalField) -> Result<i32, ClinicalError> {
        self.get(field)
            .ok_or(ClinicalError::InsufficientData { field })
    }

    /// "120/80" style pressure, or "?" parts when unmeasured.
    pub fn blood_pressure(&self) -> String {
        let part = |v: Option<i32>| v.map_or_else(|| "?".to_string(), |v| v.to_string());
        format!("{}/{}", part(self.systolic_bp), part(self.diastolic_bp))
    }
}

/// Recent samples for one patient, in arrival order.
///
/// Bounded by sample count and by an age window measured back from the
/// newest timestamp held. A late sample stamped earlier than that window is
/// dropped on arrival; otherwise it becomes [`latest`](Self::latest) like
/// any other append.
#[derive(Debug, Clone)]
pub struct VitalsTrend {
    samples: VecDeque<VitalsSample>,
    max_samples: usize,
    window: Duration,
}

impl VitalsTrend {
    pub fn new(max_samples: usize, window: Duration) -> Self {
        let max_samples = max_samples.max(1);
        Self {
            samples: VecDeque::with_capacity(max_samples.min(1024)),
            max_samples,
            window,
        }
    }

    pub fn from_config(config: &TrendConfig) -> Self {
        Self::new(
            config.max_samples,
            Duration::minutes(i64::from(config.window_minutes)),
        )
    }

    /// Append a sample and evict whatever falls outside the window.
    ///
    /// When the window cannot be subtracted from the newest timestamp
    /// without leaving chrono's range, only the count bound applies.
    pub fn append(&mut self, sample: VitalsSample) {
        self.samples.push_back(sample);

        while self.samples.len() > self.max_samples {
            self.samples.pop_front();
        }
        if let Some(cutoff) = self.cutoff() {
            self.samples.retain(|s| s.timestamp >= cutoff);
        }
    }

    fn cutoff(&self) -> Option<DateTime<Utc>> {
        self.samples
            .iter()
            .map(|s| s.timestamp)
            .max()?
            .checked_sub_signed(self.window)
    }

    pub fn latest(&self) -> Option<&VitalsSample> {
        self.samples.back()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &VitalsSample> {
        self.samples.iter()
    }

    /// Measured values of one vital in insertion order, skipping gaps.
    pub fn series(&self, field: VitalField) -> Vec<f64> {
        self.samples
            .iter()
            .filter_map(|s| s.get(field))
            .map(f64::from)
            .collect()
    }
}

impl Default for VitalsTrend {
    fn default() -> Self {
        Self::from_config(&TrendConfig::default())
    }
}
