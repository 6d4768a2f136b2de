//! Output records of one triage pass.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::{DateTime, Utc};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use super::scores::{ClinicalScores, ScoreInterpretation};
use super::vitals::VitalField;
use crate::core::protocols::ProtocolActivation;

/// Triage level derived from the severity score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SeverityLevel {
    NonEmergent,
    Urgent,
    Emergent,
    Critical,
}

impl SeverityLevel {
    /// CRITICAL ≥ 75, EMERGENT 50–74, URGENT 25–49, NON_EMERGENT < 25.
    pub fn from_score(score: u8) -> Self {
        match score {
            75..=u8::MAX => SeverityLevel::Critical,
            50..=74 => SeverityLevel::Emergent,
            25..=49 => SeverityLevel::Urgent,
            _ => SeverityLevel::NonEmergent,
        }
    }

    pub fn priority(&self) -> &'static str {
        match self {
            SeverityLevel::Critical => "Resuscitation",
            SeverityLevel::Emergent => "Immediate",
            SeverityLevel::Urgent => "Within 30 min",
            SeverityLevel::NonEmergent => "Standard",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            SeverityLevel::Critical => "red",
            SeverityLevel::Emergent => "orange",
            SeverityLevel::Urgent => "yellow",
            SeverityLevel::NonEmergent => "green",
        }
    }
}

impl fmt::Display for SeverityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SeverityLevel::Critical => "CRITICAL",
            SeverityLevel::Emergent => "EMERGENT",
            SeverityLevel::Urgent => "URGENT",
            SeverityLevel::NonEmergent => "NON_EMERGENT",
        };
        f.write_str(name)
    }
}

/// Severity score and level. Serializes with the level's priority and color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Severity {
    pub score: u8,
    pub level: SeverityLevel,
}

impl Severity {
    /// Clamps to [0, 100] and derives the level.
    pub fn from_score(raw: f64) -> Self {
        let score = if raw.is_nan() {
            0
        } else {
            raw.round().clamp(0.0, 100.0) as u8
        };
        Self {
            score,
            level: SeverityLevel::from_score(score),
        }
    }
}

impl Serialize for Severity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Severity", 4)?;
        state.serialize_field("score", &self.score)?;
        state.serialize_field("level", &self.level)?;
        state.serialize_field("priority", self.level.priority())?;
        state.serialize_field("color", self.level.color())?;
        state.end()
    }
}

/// Clinical alert. Ordering is the fixed display order, most severe first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Alert {
    CardiacArrestRisk,
    Stemi,
    Stroke,
    Trauma,
    Sepsis,
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Alert::CardiacArrestRisk => "CARDIAC_ARREST_RISK",
            Alert::Stemi => "STEMI",
            Alert::Stroke => "STROKE",
            Alert::Trauma => "TRAUMA",
            Alert::Sepsis => "SEPSIS",
        };
        f.write_str(name)
    }
}

/// Active alerts; iteration yields display order.
pub type AlertSet = BTreeSet<Alert>;

/// Predicted intervention need. Ordering is the fixed label order used to
/// break confidence ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Intervention {
    CardiacArrestImminent,
    NeedsIntubation,
    NeedsIcu,
    NeedsOr,
    LikelyStroke,
    LikelyStemi,
    LikelySepsis,
}

impl Intervention {
    pub fn label(&self) -> &'static str {
        match self {
            Intervention::CardiacArrestImminent => "cardiac_arrest_imminent",
            Intervention::NeedsIntubation => "needs_intubation",
            Intervention::NeedsIcu => "needs_icu",
            Intervention::NeedsOr => "needs_or",
            Intervention::LikelyStroke => "likely_stroke",
            Intervention::LikelyStemi => "likely_stemi",
            Intervention::LikelySepsis => "likely_sepsis",
        }
    }

    /// "Needs Intubation" style heading for the handoff sheet.
    pub fn title(&self) -> String {
        self.label()
            .split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for Intervention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Triggered needs with their confidence. Untriggered needs are absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct InterventionPrediction(BTreeMap<Intervention, f64>);

impl InterventionPrediction {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a trigger; repeated triggers keep the highest confidence.
    pub fn record(&mut self, need: Intervention, confidence: f64) {
        self.0
            .entry(need)
            .and_modify(|current| *current = current.max(confidence))
            .or_insert(confidence);
    }

    pub fn confidence(&self, need: Intervention) -> Option<f64> {
        self.0.get(&need).copied()
    }

    pub fn contains(&self, need: Intervention) -> bool {
        self.0.contains_key(&need)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Intervention, f64)> + '_ {
        self.0.iter().map(|(need, confidence)| (*need, *confidence))
    }

    /// Confidence descending, ties in fixed label order.
    pub fn ranked(&self) -> Vec<(Intervention, f64)> {
        let mut ranked: Vec<_> = self.iter().collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        ranked
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WarningLevel {
    Warning,
    Critical,
}

/// Out-of-range monitor reading, independent of the clinical scores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VitalWarning {
    pub field: VitalField,
    pub value: i32,
    pub level: WarningLevel,
    pub message: String,
}

/// Everything one pass produces for one patient. Replaced as a whole.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatientAssessment {
    pub computed_at: DateTime<Utc>,
    pub scores: ClinicalScores,
    pub severity: Severity,
    pub contributing_factors: Vec<&'static str>,
    pub interpretations: Vec<ScoreInterpretation>,
    pub alerts: AlertSet,
    pub interventions: InterventionPrediction,
    pub protocols: ProtocolActivation,
    pub vital_warnings: Vec<VitalWarning>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(0 => SeverityLevel::NonEmergent)]
    #[test_case(24 => SeverityLevel::NonEmergent)]
    #[test_case(25 => SeverityLevel::Urgent)]
    #[test_case(49 => SeverityLevel::Urgent)]
    #[test_case(50 => SeverityLevel::Emergent)]
    #[test_case(74 => SeverityLevel::Emergent)]
    #[test_case(75 => SeverityLevel::Critical)]
    #[test_case(100 => SeverityLevel::Critical)]
    fn test_level_thresholds(score: u8) -> SeverityLevel {
        SeverityLevel::from_score(score)
    }

    #[test]
    fn test_level_is_monotonic() {
        let levels: Vec<_> = (0..=100).map(SeverityLevel::from_score).collect();
        assert!(levels.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_severity_clamps() {
        assert_eq!(Severity::from_score(140.0).score, 100);
        assert_eq!(Severity::from_score(-3.0).score, 0);
        assert_eq!(Severity::from_score(74.4).level, SeverityLevel::Emergent);
    }

    #[test]
    fn test_severity_serializes_priority_and_color() {
        let json = serde_json::to_value(Severity::from_score(77.0)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "score": 77,
                "level": "CRITICAL",
                "priority": "Resuscitation",
                "color": "red"
            })
        );
    }

    #[test_case(SeverityLevel::Emergent => ("Immediate", "orange"))]
    #[test_case(SeverityLevel::Urgent => ("Within 30 min", "yellow"))]
    #[test_case(SeverityLevel::NonEmergent => ("Standard", "green"))]
    fn test_level_priority_and_color(level: SeverityLevel) -> (&'static str, &'static str) {
        (level.priority(), level.color())
    }

    #[test]
    fn test_alert_display_order() {
        let alerts: AlertSet = [Alert::Sepsis, Alert::Stemi, Alert::CardiacArrestRisk]
            .into_iter()
            .collect();
        let ordered: Vec<_> = alerts.into_iter().collect();
        assert_eq!(
            ordered,
            vec![Alert::CardiacArrestRisk, Alert::Stemi, Alert::Sepsis]
        );
    }

    #[test]
    fn test_record_keeps_maximum() {
        let mut prediction = InterventionPrediction::new();
        prediction.record(Intervention::NeedsIcu, 0.6);
        prediction.record(Intervention::NeedsIcu, 0.8);
        prediction.record(Intervention::NeedsIcu, 0.7);
        assert_eq!(prediction.confidence(Intervention::NeedsIcu), Some(0.8));
        assert_eq!(prediction.len(), 1);
    }

    #[test]
    fn test_ranked_breaks_ties_by_label_order() {
        let mut prediction = InterventionPrediction::new();
        prediction.record(Intervention::LikelyStemi, 0.90);
        prediction.record(Intervention::NeedsIcu, 0.80);
        prediction.record(Intervention::NeedsIntubation, 0.90);
        let order: Vec<_> = prediction.ranked().into_iter().map(|(n, _)| n).collect();
        assert_eq!(
            order,
            vec![
                Intervention::NeedsIntubation,
                Intervention::LikelyStemi,
                Intervention::NeedsIcu
            ]
        );
    }

    #[test]
    fn test_title_case_label() {
        assert_eq!(Intervention::NeedsIntubation.title(), "Needs Intubation");
    }

    #[test]
    fn test_prediction_serializes_by_label() {
        let mut prediction = InterventionPrediction::new();
        prediction.record(Intervention::LikelySepsis, 0.75);
        let json = serde_json::to_string(&prediction).unwrap();
        assert_eq!(json, r#"{"likely_sepsis":0.75}"#);
    }
}
