//! Severity, alerts and intervention predictions derived from the scores.
//!
//! Alert and intervention triggers are plain tables of predicates, so they
//! can be tested on their own and the whole model can be swapped behind
//! [`TriageModel`]. A predicate whose input is unavailable evaluates false.

use crate::models::symptoms::names;
use crate::models::{
    Alert, AlertSet, ClinicalScores, Intervention, InterventionPrediction, ScoreKind, Severity,
    SymptomSet, VitalField, VitalsSample,
};

// Severity weights, summing to 100
const VITAL_WEIGHT: f64 = 40.0;
const SCORE_WEIGHT: f64 = 45.0;
const SYMPTOM_WEIGHT: f64 = 15.0;

const SHOCK_SHARE: f64 = 0.6;
const HYPOXIA_SHARE: f64 = 0.4;
const SHOCK_INDEX_NORMAL: f64 = 0.7;
const SHOCK_INDEX_SPAN: f64 = 0.6;
const SPO2_TARGET: f64 = 95.0;
const SPO2_SPAN: f64 = 15.0;
const SYMPTOM_CAP: usize = 5;

const FAST_SIGNS: [&str; 6] = [
    names::FAST_POSITIVE,
    names::FACIAL_DROOP,
    names::ARM_WEAKNESS_LEFT,
    names::ARM_WEAKNESS_RIGHT,
    names::APHASIA,
    names::DYSARTHRIA,
];

/// Prediction backend used by the registry for every pass.
#[cfg_attr(test, mockall::automock)]
pub trait TriageModel: Send + Sync {
    fn predict_severity(
        &self,
        vitals: &VitalsSample,
        symptoms: &SymptomSet,
        scores: &ClinicalScores,
    ) -> Severity;

    fn predict_active_alerts(
        &self,
        vitals: &VitalsSample,
        symptoms: &SymptomSet,
        scores: &ClinicalScores,
    ) -> AlertSet;

    fn predict_interventions(
        &self,
        vitals: &VitalsSample,
        symptoms: &SymptomSet,
        scores: &ClinicalScores,
    ) -> InterventionPrediction;
}

/// What a trigger predicate gets to look at.
pub struct TriageInputs<'a> {
    pub vitals: &'a VitalsSample,
    pub symptoms: &'a SymptomSet,
    pub scores: &'a ClinicalScores,
    pub severity: Severity,
}

impl TriageInputs<'_> {
    fn score(&self, kind: ScoreKind) -> Option<f64> {
        self.scores.value(kind)
    }

    fn vital(&self, field: VitalField) -> Option<i32> {
        self.vitals.get(field)
    }
}

pub type Predicate = fn(&TriageInputs<'_>) -> bool;

pub struct AlertRule {
    pub alert: Alert,
    pub trigger: Predicate,
}

pub struct InterventionRule {
    pub need: Intervention,
    pub confidence: f64,
    pub trigger: Predicate,
}

pub static ALERT_RULES: [AlertRule; 6] = [
    AlertRule {
        alert: Alert::Stemi,
        trigger: stemi_positive,
    },
    AlertRule {
        alert: Alert::Stroke,
        trigger: stroke_positive,
    },
    AlertRule {
        alert: Alert::Trauma,
        trigger: major_trauma,
    },
    AlertRule {
        alert: Alert::Sepsis,
        trigger: sepsis_positive,
    },
    AlertRule {
        alert: Alert::CardiacArrestRisk,
        trigger: shock_with_deterioration,
    },
    AlertRule {
        alert: Alert::CardiacArrestRisk,
        trigger: unresponsive_and_collapsing,
    },
];

pub static INTERVENTION_RULES: [InterventionRule; 9] = [
    InterventionRule {
        need: Intervention::CardiacArrestImminent,
        confidence: 0.85,
        trigger: shock_with_deterioration,
    },
    InterventionRule {
        need: Intervention::CardiacArrestImminent,
        confidence: 0.85,
        trigger: unresponsive_and_profoundly_hypotensive,
    },
    InterventionRule {
        need: Intervention::NeedsIntubation,
        confidence: 0.90,
        trigger: airway_compromised,
    },
    InterventionRule {
        need: Intervention::NeedsIntubation,
        confidence: 0.90,
        trigger: cannot_protect_airway,
    },
    InterventionRule {
        need: Intervention::NeedsIcu,
        confidence: 0.80,
        trigger: icu_level_severity,
    },
    InterventionRule {
        need: Intervention::NeedsOr,
        confidence: 0.75,
        trigger: surgical_trauma,
    },
    InterventionRule {
        need: Intervention::LikelyStroke,
        confidence: 0.85,
        trigger: stroke_positive,
    },
    InterventionRule {
        need: Intervention::LikelyStemi,
        confidence: 0.90,
        trigger: stemi_positive,
    },
    InterventionRule {
        need: Intervention::LikelySepsis,
        confidence: 0.75,
        trigger: sepsis_positive,
    },
];

/// A reason listed next to the severity score.
pub struct SeverityFactor {
    pub label: &'static str,
    pub present: Predicate,
}

pub static SEVERITY_FACTORS: [SeverityFactor; 12] = [
    SeverityFactor {
        label: "Abnormal Heart Rate",
        present: abnormal_heart_rate,
    },
    SeverityFactor {
        label: "Critical Hypoxia",
        present: critical_hypoxia,
    },
    SeverityFactor {
        label: "Moderate Hypoxia",
        present: moderate_hypoxia,
    },
    SeverityFactor {
        label: "Hypotension/Shock",
        present: hypotension,
    },
    SeverityFactor {
        label: "Severely Altered Mental Status",
        present: cannot_protect_airway,
    },
    SeverityFactor {
        label: "Altered Mental Status",
        present: altered_mental_status,
    },
    SeverityFactor {
        label: "Chest Pain",
        present: chest_pain,
    },
    SeverityFactor {
        label: "ST Elevation",
        present: st_elevation,
    },
    SeverityFactor {
        label: "Shock State",
        present: shock_state,
    },
    SeverityFactor {
        label: "Positive Sepsis Screen",
        present: sepsis_positive,
    },
    SeverityFactor {
        label: "Stroke Signs",
        present: stroke_positive,
    },
    SeverityFactor {
        label: "Deteriorating Trend",
        present: deteriorating,
    },
];

fn abnormal_heart_rate(inputs: &TriageInputs<'_>) -> bool {
    inputs
        .vital(VitalField::HeartRate)
        .map_or(false, |hr| hr > 120 || hr < 50)
}

fn critical_hypoxia(inputs: &TriageInputs<'_>) -> bool {
    inputs.vital(VitalField::Spo2).map_or(false, |spo2| spo2 < 90)
}

fn moderate_hypoxia(inputs: &TriageInputs<'_>) -> bool {
    inputs
        .vital(VitalField::Spo2)
        .map_or(false, |spo2| (90..94).contains(&spo2))
}

fn hypotension(inputs: &TriageInputs<'_>) -> bool {
    inputs.vital(VitalField::SystolicBp).map_or(false, |sbp| sbp < 90)
}

fn altered_mental_status(inputs: &TriageInputs<'_>) -> bool {
    inputs
        .vital(VitalField::Gcs)
        .map_or(false, |gcs| (9..13).contains(&gcs))
}

fn chest_pain(inputs: &TriageInputs<'_>) -> bool {
    inputs.symptoms.is_present(names::CHEST_PAIN)
}

fn st_elevation(inputs: &TriageInputs<'_>) -> bool {
    inputs.symptoms.is_present(names::ECG_ST_ELEVATION)
}

fn shock_state(inputs: &TriageInputs<'_>) -> bool {
    inputs.score(ScoreKind::ShockIndex).map_or(false, |si| si > 1.0)
}

fn deteriorating(inputs: &TriageInputs<'_>) -> bool {
    inputs
        .score(ScoreKind::DeteriorationIndex)
        .map_or(false, |index| index >= 2.0)
}

fn stemi_positive(inputs: &TriageInputs<'_>) -> bool {
    inputs
        .score(ScoreKind::StemiChecklist)
        .map_or(false, |count| count >= 3.0)
}

fn stroke_positive(inputs: &TriageInputs<'_>) -> bool {
    inputs.score(ScoreKind::Nihss).map_or(false, |nihss| nihss > 7.0)
        || inputs.symptoms.any_present(&FAST_SIGNS)
}

fn major_trauma(inputs: &TriageInputs<'_>) -> bool {
    inputs.score(ScoreKind::Rts).map_or(false, |rts| rts < 5.0)
}

fn surgical_trauma(inputs: &TriageInputs<'_>) -> bool {
    inputs.score(ScoreKind::Rts).map_or(false, |rts| rts < 4.0)
}

fn sepsis_positive(inputs: &TriageInputs<'_>) -> bool {
    inputs.score(ScoreKind::Qsofa).map_or(false, |qsofa| qsofa >= 2.0)
}

fn shock_with_deterioration(inputs: &TriageInputs<'_>) -> bool {
    let shock = inputs.score(ScoreKind::ShockIndex).map_or(false, |si| si > 1.3);
    let deteriorating = inputs
        .score(ScoreKind::DeteriorationIndex)
        .map_or(false, |index| index >= 3.0);
    shock && deteriorating
}

fn unresponsive_and_collapsing(inputs: &TriageInputs<'_>) -> bool {
    let unresponsive = inputs.vital(VitalField::Gcs).map_or(false, |gcs| gcs < 5);
    let collapsing = inputs.vital(VitalField::SystolicBp).map_or(false, |sbp| sbp < 70)
        || inputs.vital(VitalField::Spo2).map_or(false, |spo2| spo2 < 80);
    unresponsive && collapsing
}

fn unresponsive_and_profoundly_hypotensive(inputs: &TriageInputs<'_>) -> bool {
    inputs.vital(VitalField::Gcs).map_or(false, |gcs| gcs < 5)
        && inputs.vital(VitalField::SystolicBp).map_or(false, |sbp| sbp < 60)
}

fn airway_compromised(inputs: &TriageInputs<'_>) -> bool {
    inputs.score(ScoreKind::AirwayRisk).map_or(false, |risk| risk >= 4.0)
}

fn cannot_protect_airway(inputs: &TriageInputs<'_>) -> bool {
    inputs.vital(VitalField::Gcs).map_or(false, |gcs| gcs < 9)
}

fn icu_level_severity(inputs: &TriageInputs<'_>) -> bool {
    inputs.severity.score >= 60
}

/// Evaluate every alert rule independently.
pub fn evaluate_alerts(rules: &[AlertRule], inputs: &TriageInputs<'_>) -> AlertSet {
    rules
        .iter()
        .filter(|rule| (rule.trigger)(inputs))
        .map(|rule| rule.alert)
        .collect()
}

/// Evaluate every intervention rule; a need triggered twice keeps the
/// higher confidence.
pub fn evaluate_interventions(
    rules: &[InterventionRule],
    inputs: &TriageInputs<'_>,
) -> InterventionPrediction {
    let mut prediction = InterventionPrediction::new();
    for rule in rules.iter().filter(|rule| (rule.trigger)(inputs)) {
        prediction.record(rule.need, rule.confidence);
    }
    prediction
}

/// Labels of the factors present, in table order.
pub fn contributing_factors(
    factors: &[SeverityFactor],
    inputs: &TriageInputs<'_>,
) -> Vec<&'static str> {
    factors
        .iter()
        .filter(|factor| (factor.present)(inputs))
        .map(|factor| factor.label)
        .collect()
}

/// Fixed-weight rule model.
pub struct RuleBasedTriage {
    alert_rules: &'static [AlertRule],
    intervention_rules: &'static [InterventionRule],
}

impl RuleBasedTriage {
    pub fn new() -> Self {
        Self::with_rules(&ALERT_RULES, &INTERVENTION_RULES)
    }

    pub fn with_rules(
        alert_rules: &'static [AlertRule],
        intervention_rules: &'static [InterventionRule],
    ) -> Self {
        Self {
            alert_rules,
            intervention_rules,
        }
    }

    fn severity_score(vitals: &VitalsSample, symptoms: &SymptomSet, scores: &ClinicalScores) -> f64 {
        let shock = scores.value(ScoreKind::ShockIndex).map_or(0.0, |si| {
            ((si - SHOCK_INDEX_NORMAL) / SHOCK_INDEX_SPAN).clamp(0.0, 1.0)
        });
        let hypoxia = vitals.spo2.map_or(0.0, |spo2| {
            ((SPO2_TARGET - f64::from(spo2)) / SPO2_SPAN).clamp(0.0, 1.0)
        });
        let vital_abnormality = SHOCK_SHARE * shock + HYPOXIA_SHARE * hypoxia;

        let normalized = |kind: ScoreKind, max: f64| scores.value(kind).map_or(0.0, |v| v / max);
        let score_abnormality = [
            normalized(ScoreKind::Qsofa, 3.0),
            normalized(ScoreKind::StemiChecklist, 5.0),
            normalized(ScoreKind::Nihss, 42.0),
            normalized(ScoreKind::DeteriorationIndex, 5.0),
        ]
        .into_iter()
        .fold(0.0, f64::max);

        let symptom_load = symptoms.present_count().min(SYMPTOM_CAP) as f64 / SYMPTOM_CAP as f64;

        VITAL_WEIGHT * vital_abnormality
            + SCORE_WEIGHT * score_abnormality
            + SYMPTOM_WEIGHT * symptom_load
    }
}

impl Default for RuleBasedTriage {
    fn default() -> Self {
        Self::new()
    }
}

impl TriageModel for RuleBasedTriage {
    fn predict_severity(
        &self,
        vitals: &VitalsSample,
        symptoms: &SymptomSet,
        scores: &ClinicalScores,
    ) -> Severity {
        Severity::from_score(Self::severity_score(vitals, symptoms, scores))
    }

    fn predict_active_alerts(
        &self,
        vitals: &VitalsSample,
        symptoms: &SymptomSet,
        scores: &ClinicalScores,
    ) -> AlertSet {
        let inputs = TriageInputs {
            vitals,
            symptoms,
            scores,
            severity: self.predict_severity(vitals, symptoms, scores),
        };
        evaluate_alerts(self.alert_rules, &inputs)
    }

    fn predict_interventions(
        &self,
        vitals: &VitalsSample,
        symptoms: &SymptomSet,
        scores: &ClinicalScores,
    ) -> InterventionPrediction {
        let inputs = TriageInputs {
            vitals,
            symptoms,
            scores,
            severity: self.predict_severity(vitals, symptoms, scores),
        };
        evaluate_interventions(self.intervention_rules, &inputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scoring::ClinicalScorer;
    use crate::error::ClinicalError;
    use crate::models::{SeverityLevel, VitalsTrend};
    use chrono::Utc;

    fn stemi_case() -> (VitalsSample, SymptomSet) {
        (
            VitalsSample::new(125, 90, 88, 55),
            SymptomSet::new()
                .flag(names::CHEST_PAIN)
                .flag(names::RADIATING_PAIN)
                .flag(names::DIAPHORESIS)
                .flag(names::ECG_ST_ELEVATION),
        )
    }

    fn scores_for(vitals: &VitalsSample, symptoms: &SymptomSet) -> ClinicalScores {
        ClinicalScorer::compute(vitals, symptoms, &VitalsTrend::default())
    }

    #[test]
    fn test_stemi_case_is_critical() {
        let (vitals, symptoms) = stemi_case();
        let scores = scores_for(&vitals, &symptoms);
        let severity = RuleBasedTriage::new().predict_severity(&vitals, &symptoms, &scores);
        assert_eq!(severity.level, SeverityLevel::Critical);
        assert_eq!(severity.score, 77);
    }

    #[test]
    fn test_stemi_case_factors() {
        let (vitals, symptoms) = stemi_case();
        let scores = scores_for(&vitals, &symptoms);
        let inputs = TriageInputs {
            vitals: &vitals,
            symptoms: &symptoms,
            scores: &scores,
            severity: Severity::from_score(77.0),
        };
        assert_eq!(
            contributing_factors(&SEVERITY_FACTORS, &inputs),
            vec![
                "Abnormal Heart Rate",
                "Moderate Hypoxia",
                "Hypotension/Shock",
                "Chest Pain",
                "ST Elevation",
                "Shock State"
            ]
        );
    }

    #[test]
    fn test_stable_patient_has_no_factors() {
        let vitals = VitalsSample::new(78, 98, 124, 80).with_gcs(15);
        let symptoms = SymptomSet::new().flag("headache");
        let scores = scores_for(&vitals, &symptoms);
        let inputs = TriageInputs {
            vitals: &vitals,
            symptoms: &symptoms,
            scores: &scores,
            severity: Severity::from_score(5.0),
        };
        assert!(contributing_factors(&SEVERITY_FACTORS, &inputs).is_empty());
    }

    #[test]
    fn test_stable_patient_is_non_emergent() {
        let vitals = VitalsSample::new(78, 98, 124, 80);
        let symptoms = SymptomSet::new().flag("headache");
        let scores = scores_for(&vitals, &symptoms);
        let severity = RuleBasedTriage::new().predict_severity(&vitals, &symptoms, &scores);
        assert_eq!(severity.level, SeverityLevel::NonEmergent);
    }

    #[test]
    fn test_alerts_co_trigger() {
        let vitals = VitalsSample::new(118, 93, 92, 60).with_respiratory_rate(26);
        let symptoms = SymptomSet::new()
            .flag(names::CHEST_PAIN)
            .flag(names::DIAPHORESIS)
            .flag(names::NAUSEA)
            .graded(names::FACIAL_DROOP, 2);
        let scores = scores_for(&vitals, &symptoms);
        let alerts = RuleBasedTriage::new().predict_active_alerts(&vitals, &symptoms, &scores);
        let expected: AlertSet = [Alert::Stemi, Alert::Stroke, Alert::Sepsis].into_iter().collect();
        assert_eq!(alerts, expected);
    }

    #[test]
    fn test_flagged_score_never_triggers() {
        let vitals = VitalsSample::new(125, 90, 88, 55);
        let mut scores = scores_for(&vitals, &SymptomSet::new());
        scores.rts = 2.0;
        scores.flag(
            ScoreKind::Rts,
            ClinicalError::InsufficientData {
                field: VitalField::SystolicBp,
            },
        );
        let alerts =
            RuleBasedTriage::new().predict_active_alerts(&vitals, &SymptomSet::new(), &scores);
        assert!(!alerts.contains(&Alert::Trauma));
    }

    #[test]
    fn test_untriggered_needs_are_absent() {
        let vitals = VitalsSample::new(80, 98, 120, 80);
        let symptoms = SymptomSet::new();
        let scores = scores_for(&vitals, &symptoms);
        let prediction = RuleBasedTriage::new().predict_interventions(&vitals, &symptoms, &scores);
        assert!(prediction.is_empty());
        assert_eq!(prediction.confidence(Intervention::NeedsIntubation), None);
    }

    #[test]
    fn test_intubation_confidence_constant() {
        let vitals = VitalsSample::new(100, 86, 110, 70).with_gcs(8);
        let symptoms = SymptomSet::new();
        let scores = scores_for(&vitals, &symptoms);
        let prediction = RuleBasedTriage::new().predict_interventions(&vitals, &symptoms, &scores);
        assert_eq!(prediction.confidence(Intervention::NeedsIntubation), Some(0.90));
    }

    #[test]
    fn test_collapse_without_trend_raises_arrest_risk() {
        let vitals = VitalsSample::new(40, 75, 55, 30).with_gcs(3);
        let symptoms = SymptomSet::new();
        let scores = scores_for(&vitals, &symptoms);
        let triage = RuleBasedTriage::new();
        assert!(triage
            .predict_active_alerts(&vitals, &symptoms, &scores)
            .contains(&Alert::CardiacArrestRisk));
        assert_eq!(
            triage
                .predict_interventions(&vitals, &symptoms, &scores)
                .confidence(Intervention::CardiacArrestImminent),
            Some(0.85)
        );
    }

    fn always(_: &TriageInputs<'_>) -> bool {
        true
    }

    static SPLIT_RULES: [InterventionRule; 2] = [
        InterventionRule {
            need: Intervention::NeedsIcu,
            confidence: 0.55,
            trigger: always,
        },
        InterventionRule {
            need: Intervention::NeedsIcu,
            confidence: 0.80,
            trigger: always,
        },
    ];

    #[test]
    fn test_multiple_triggers_take_maximum() {
        let vitals = VitalsSample::empty(Utc::now());
        let symptoms = SymptomSet::new();
        let scores = ClinicalScores::default();
        let inputs = TriageInputs {
            vitals: &vitals,
            symptoms: &symptoms,
            scores: &scores,
            severity: Severity::from_score(0.0),
        };
        let prediction = evaluate_interventions(&SPLIT_RULES, &inputs);
        assert_eq!(prediction.confidence(Intervention::NeedsIcu), Some(0.80));
    }

    #[test]
    fn test_custom_tables_replace_defaults() {
        static NO_ALERTS: [AlertRule; 0] = [];
        let triage = RuleBasedTriage::with_rules(&NO_ALERTS, &SPLIT_RULES);
        let (vitals, symptoms) = stemi_case();
        let scores = scores_for(&vitals, &symptoms);
        assert!(triage.predict_active_alerts(&vitals, &symptoms, &scores).is_empty());
        assert_eq!(
            triage.predict_interventions(&vitals, &symptoms, &scores).len(),
            1
        );
    }
}
