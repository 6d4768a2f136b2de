use serde_json::Value;

use crate::error::Result;
use crate::models::{SymptomSet, VitalField, VitalWarning, VitalsSample, WarningLevel};

/// Parse a telemetry payload, either `{"vitals": {...}}` or the bare object.
pub fn parse_vitals(raw_data: &str) -> Result<VitalsSample> {
    let data: Value = serde_json::from_str(raw_data)?;
    let sample = match data.get("vitals") {
        Some(vitals) => serde_json::from_value(vitals.clone())?,
        None => serde_json::from_value(data)?,
    };
    Ok(sample)
}

/// Parse a redacted voice-note extraction, either `{"symptoms": {...}}` or
/// the bare mapping.
pub fn parse_symptoms(raw_data: &str) -> Result<SymptomSet> {
    let data: Value = serde_json::from_str(raw_data)?;
    let symptoms = match data.get("symptoms") {
        Some(symptoms) => serde_json::from_value(symptoms.clone())?,
        None => serde_json::from_value(data)?,
    };
    Ok(symptoms)
}

struct WarningBand {
    field: VitalField,
    label: &'static str,
    unit: &'static str,
    critical_low: Option<i32>,
    warning_low: Option<i32>,
    warning_high: Option<i32>,
    critical_high: Option<i32>,
}

const WARNING_BANDS: [WarningBand; 3] = [
    WarningBand {
        field: VitalField::HeartRate,
        label: "heart rate",
        unit: " bpm",
        critical_low: Some(40),
        warning_low: Some(50),
        warning_high: Some(120),
        critical_high: Some(150),
    },
    WarningBand {
        field: VitalField::Spo2,
        label: "oxygen saturation",
        unit: "%",
        critical_low: Some(85),
        warning_low: Some(90),
        warning_high: None,
        critical_high: None,
    },
    WarningBand {
        field: VitalField::SystolicBp,
        label: "systolic pressure",
        unit: " mmHg",
        critical_low: Some(70),
        warning_low: Some(90),
        warning_high: None,
        critical_high: None,
    },
];

impl WarningBand {
    fn check(&self, value: i32) -> Option<(WarningLevel, &'static str)> {
        let below = |limit: Option<i32>| limit.map_or(false, |limit| value < limit);
        let above = |limit: Option<i32>| limit.map_or(false, |limit| value > limit);

        if below(self.critical_low) {
            Some((WarningLevel::Critical, "Critically low"))
        } else if above(self.critical_high) {
            Some((WarningLevel::Critical, "Critically high"))
        } else if below(self.warning_low) {
            Some((WarningLevel::Warning, "Low"))
        } else if above(self.warning_high) {
            Some((WarningLevel::Warning, "High"))
        } else {
            None
        }
    }
}

/// Out-of-range readings in the latest sample. Unmeasured vitals are skipped.
pub fn critical_vital_warnings(vitals: &VitalsSample) -> Vec<VitalWarning> {
    WARNING_BANDS
        .iter()
        .filter_map(|band| {
            let value = vitals.get(band.field)?;
            let (level, prefix) = band.check(value)?;
            Some(VitalWarning {
                field: band.field,
                value,
                level,
                message: format!("{} {}: {}{}", prefix, band.label, value, band.unit),
            })
        })
        .collect()
}
