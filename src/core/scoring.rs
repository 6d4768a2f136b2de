//! Clinical scores computed from the current sample, symptoms and trend.
//!
//! Each score is computed on its own. A score that needs a vital the sample
//! does not carry is flagged on the result and left at its neutral default;
//! the other scores are unaffected.

use tracing::debug;

use crate::error::ClinicalError;
use crate::models::symptoms::names;
use crate::models::{ClinicalScores, ScoreKind, SymptomSet, VitalField, VitalsSample, VitalsTrend};

/// NIHSS items with their published maximum.
const NIHSS_ITEMS: [(&str, u8); 15] = [
    (names::CONSCIOUSNESS_LEVEL, 3),
    (names::LOC_QUESTIONS, 2),
    (names::LOC_COMMANDS, 2),
    (names::GAZE_DEVIATION, 2),
    (names::VISUAL_FIELD_LOSS, 3),
    (names::FACIAL_DROOP, 3),
    (names::ARM_WEAKNESS_LEFT, 4),
    (names::ARM_WEAKNESS_RIGHT, 4),
    (names::LEG_WEAKNESS_LEFT, 4),
    (names::LEG_WEAKNESS_RIGHT, 4),
    (names::LIMB_ATAXIA, 2),
    (names::SENSORY_LOSS, 2),
    (names::APHASIA, 3),
    (names::DYSARTHRIA, 2),
    (names::EXTINCTION, 2),
];

/// Cardiac-ischemia indicators with the label listed when present.
const STEMI_INDICATORS: [(&str, &str); 5] = [
    (names::CHEST_PAIN, "Chest Pain Present"),
    (names::RADIATING_PAIN, "Radiating Pain"),
    (names::DIAPHORESIS, "Diaphoresis"),
    (names::ECG_ST_ELEVATION, "ST Elevation on ECG"),
    (names::NAUSEA, "Nausea/Vomiting"),
];

/// A finding that adds points to a score and is listed with it.
struct Criterion {
    label: &'static str,
    points: u8,
    met: fn(&VitalsSample, &SymptomSet) -> bool,
}

const QSOFA_CRITERIA: [Criterion; 3] = [
    Criterion {
        label: "Hypotension (SBP ≤100)",
        points: 1,
        met: hypotensive,
    },
    Criterion {
        label: "Tachypnea (RR ≥22) or Respiratory Distress",
        points: 1,
        met: tachypneic,
    },
    Criterion {
        label: "Altered Mental Status (GCS <15)",
        points: 1,
        met: altered_mentation,
    },
];

// Mentation and hypoxia tiers are exclusive; the most severe one applies.
const AIRWAY_FACTORS: [Criterion; 6] = [
    Criterion {
        label: "Severely Altered Mental Status (GCS <9)",
        points: 3,
        met: gcs_below_9,
    },
    Criterion {
        label: "Altered Mental Status (GCS <13)",
        points: 1,
        met: gcs_9_to_12,
    },
    Criterion {
        label: "Severe Hypoxia (SpO2 <88%)",
        points: 2,
        met: spo2_below_88,
    },
    Criterion {
        label: "Hypoxia (SpO2 <92%)",
        points: 1,
        met: spo2_88_to_91,
    },
    Criterion {
        label: "Abnormal Respiratory Rate",
        points: 2,
        met: abnormal_respiration,
    },
    Criterion {
        label: "Airway Obstruction Present",
        points: 3,
        met: airway_obstructed,
    },
];

fn hypotensive(vitals: &VitalsSample, _: &SymptomSet) -> bool {
    vitals.systolic_bp.map_or(false, |sbp| sbp <= 100)
}

fn tachypneic(vitals: &VitalsSample, symptoms: &SymptomSet) -> bool {
    symptoms.is_present(names::RESPIRATORY_DISTRESS)
        || vitals.respiratory_rate.map_or(false, |rr| rr >= 22)
}

fn altered_mentation(vitals: &VitalsSample, symptoms: &SymptomSet) -> bool {
    symptoms.is_present(names::ALTERED_MENTAL_STATUS) || vitals.gcs.map_or(false, |gcs| gcs < 15)
}

fn gcs_below_9(vitals: &VitalsSample, _: &SymptomSet) -> bool {
    vitals.gcs.map_or(false, |gcs| gcs < 9)
}

fn gcs_9_to_12(vitals: &VitalsSample, _: &SymptomSet) -> bool {
    vitals.gcs.map_or(false, |gcs| (9..13).contains(&gcs))
}

fn spo2_below_88(vitals: &VitalsSample, _: &SymptomSet) -> bool {
    vitals.spo2.map_or(false, |spo2| spo2 < 88)
}

fn spo2_88_to_91(vitals: &VitalsSample, _: &SymptomSet) -> bool {
    vitals.spo2.map_or(false, |spo2| (88..92).contains(&spo2))
}

fn abnormal_respiration(vitals: &VitalsSample, _: &SymptomSet) -> bool {
    vitals.respiratory_rate.map_or(false, |rr| rr < 8 || rr > 30)
}

fn airway_obstructed(_: &VitalsSample, symptoms: &SymptomSet) -> bool {
    symptoms.is_present(names::AIRWAY_OBSTRUCTION)
}

// Revised Trauma Score coefficients
const RTS_GCS_WEIGHT: f64 = 0.9368;
const RTS_SBP_WEIGHT: f64 = 0.7326;
const RTS_RR_WEIGHT: f64 = 0.2908;
const RTS_NORMAL_CODE: u8 = 4;

const DETERIORATION_CAP: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Rising,
    Falling,
}

/// A vital whose movement across the window counts toward deterioration.
struct TrendRule {
    field: VitalField,
    adverse: Direction,
    threshold: f64,
    label: &'static str,
}

const TREND_RULES: [TrendRule; 3] = [
    TrendRule {
        field: VitalField::HeartRate,
        adverse: Direction::Rising,
        threshold: 10.0,
        label: "Increasing HR",
    },
    TrendRule {
        field: VitalField::Spo2,
        adverse: Direction::Falling,
        threshold: 3.0,
        label: "Decreasing SpO2",
    },
    TrendRule {
        field: VitalField::SystolicBp,
        adverse: Direction::Falling,
        threshold: 15.0,
        label: "Decreasing BP",
    },
];

pub struct ClinicalScorer;

impl ClinicalScorer {
    /// Compute every score. Never fails; unavailable scores are flagged.
    pub fn compute(
        vitals: &VitalsSample,
        symptoms: &SymptomSet,
        trend: &VitalsTrend,
    ) -> ClinicalScores {
        let mut scores = ClinicalScores {
            nihss: Self::nihss(symptoms),
            stemi_checklist: Self::stemi_checklist(symptoms),
            deterioration_index: Self::deterioration_index(trend),
            ..ClinicalScores::default()
        };

        settle(&mut scores, ScoreKind::Rts, Self::revised_trauma_score(vitals), |s, v| {
            s.rts = v
        });
        settle(&mut scores, ScoreKind::Qsofa, Self::qsofa(vitals, symptoms), |s, v| {
            s.qsofa = v
        });
        settle(
            &mut scores,
            ScoreKind::AirwayRisk,
            Self::airway_risk(vitals, symptoms),
            |s, v| s.airway_risk = v,
        );
        settle(&mut scores, ScoreKind::ShockIndex, Self::shock_index(vitals), |s, v| {
            s.shock_index = v
        });

        scores
    }

    /// NIHSS, 0–42. Each item clamped to its maximum before summing.
    pub fn nihss(symptoms: &SymptomSet) -> u8 {
        NIHSS_ITEMS
            .iter()
            .map(|(item, max)| symptoms.severity(item).min(*max))
            .sum()
    }

    /// Revised Trauma Score, 0–7.84, rounded to two decimals.
    ///
    /// Systolic pressure is required. Missing GCS or respiratory rate are
    /// coded as normal.
    pub fn revised_trauma_score(vitals: &VitalsSample) -> Result<f64, ClinicalError> {
        let sbp = vitals.require(VitalField::SystolicBp)?;
        let gcs_code = vitals.gcs.map_or(RTS_NORMAL_CODE, |gcs| gcs_code(i32::from(gcs)));
        let rr_code = vitals
            .respiratory_rate
            .map_or(RTS_NORMAL_CODE, |rr| respiratory_code(rr as i32));

        let rts = RTS_GCS_WEIGHT * f64::from(gcs_code)
            + RTS_SBP_WEIGHT * f64::from(systolic_code(sbp))
            + RTS_RR_WEIGHT * f64::from(rr_code);
        Ok((rts * 100.0).round() / 100.0)
    }

    /// qSOFA, 0–3. Systolic pressure is required.
    pub fn qsofa(vitals: &VitalsSample, symptoms: &SymptomSet) -> Result<u8, ClinicalError> {
        vitals.require(VitalField::SystolicBp)?;
        Ok(tally(&QSOFA_CRITERIA, vitals, symptoms).min(3))
    }

    /// Count of cardiac-ischemia indicators present, 0–5.
    pub fn stemi_checklist(symptoms: &SymptomSet) -> u8 {
        let count = STEMI_INDICATORS
            .iter()
            .filter(|(name, _)| symptoms.is_present(name))
            .count();
        count.min(5) as u8
    }

    /// Airway risk, 0–10. SpO2 is required.
    pub fn airway_risk(vitals: &VitalsSample, symptoms: &SymptomSet) -> Result<u8, ClinicalError> {
        vitals.require(VitalField::Spo2)?;
        Ok(tally(&AIRWAY_FACTORS, vitals, symptoms).min(10))
    }

    /// Heart rate over systolic pressure.
    pub fn shock_index(vitals: &VitalsSample) -> Result<f64, ClinicalError> {
        let hr = vitals.require(VitalField::HeartRate)?;
        let sbp = vitals.require(VitalField::SystolicBp)?;
        if sbp <= 0 {
            return Err(ClinicalError::UndefinedRatio {
                numerator: VitalField::HeartRate,
                denominator: VitalField::SystolicBp,
                value: sbp,
            });
        }
        Ok(f64::from(hr) / f64::from(sbp))
    }

    /// One point per vital trending adverse over the window, 0–5.
    ///
    /// Fewer than two samples means the trend is unknown, which scores 0.
    pub fn deterioration_index(trend: &VitalsTrend) -> u8 {
        if trend.len() < 2 {
            return 0;
        }
        let points = TREND_RULES
            .iter()
            .filter(|rule| is_adverse(&trend.series(rule.field), rule))
            .count();
        points.min(DETERIORATION_CAP) as u8
    }

    /// Labels of the findings behind a score: qSOFA criteria, STEMI
    /// indicators, airway risk factors or adverse trends. Other scores list
    /// nothing.
    pub fn findings(
        kind: ScoreKind,
        vitals: &VitalsSample,
        symptoms: &SymptomSet,
        trend: &VitalsTrend,
    ) -> Vec<&'static str> {
        match kind {
            ScoreKind::Qsofa => met_labels(&QSOFA_CRITERIA, vitals, symptoms),
            ScoreKind::AirwayRisk => met_labels(&AIRWAY_FACTORS, vitals, symptoms),
            ScoreKind::StemiChecklist => STEMI_INDICATORS
                .iter()
                .filter(|(name, _)| symptoms.is_present(name))
                .map(|(_, label)| *label)
                .collect(),
            ScoreKind::DeteriorationIndex if trend.len() >= 2 => TREND_RULES
                .iter()
                .filter(|rule| is_adverse(&trend.series(rule.field), rule))
                .map(|rule| rule.label)
                .collect(),
            _ => Vec::new(),
        }
    }
}

fn settle<T>(
    scores: &mut ClinicalScores,
    kind: ScoreKind,
    result: Result<T, ClinicalError>,
    assign: fn(&mut ClinicalScores, T),
) {
    match result {
        Ok(value) => assign(scores, value),
        Err(error) => {
            debug!(score = %kind, %error, "score unavailable");
            scores.flag(kind, error);
        }
    }
}

fn tally(criteria: &[Criterion], vitals: &VitalsSample, symptoms: &SymptomSet) -> u8 {
    criteria
        .iter()
        .filter(|criterion| (criterion.met)(vitals, symptoms))
        .map(|criterion| criterion.points)
        .sum()
}

fn met_labels(
    criteria: &[Criterion],
    vitals: &VitalsSample,
    symptoms: &SymptomSet,
) -> Vec<&'static str> {
    criteria
        .iter()
        .filter(|criterion| (criterion.met)(vitals, symptoms))
        .map(|criterion| criterion.label)
        .collect()
}

fn gcs_code(gcs: i32) -> u8 {
    match gcs {
        13..=15 => 4,
        9..=12 => 3,
        6..=8 => 2,
        4..=5 => 1,
        _ => 0,
    }
}

fn systolic_code(sbp: i32) -> u8 {
    match sbp {
        s if s > 89 => 4,
        76..=89 => 3,
        50..=75 => 2,
        1..=49 => 1,
        _ => 0,
    }
}

fn respiratory_code(rr: i32) -> u8 {
    match rr {
        10..=29 => 4,
        r if r > 29 => 3,
        6..=9 => 2,
        1..=5 => 1,
        _ => 0,
    }
}

/// Least-squares line over the series, indexed by insertion order.
fn is_adverse(values: &[f64], rule: &TrendRule) -> bool {
    if values.len() < 2 {
        return false;
    }
    let n = values.len() as f64;
    let mean_x = (n - 1.0) / 2.0;
    let mean_y = values.iter().sum::<f64>() / n;

    let (mut covariance, mut variance) = (0.0, 0.0);
    for (i, y) in values.iter().enumerate() {
        let dx = i as f64 - mean_x;
        covariance += dx * (y - mean_y);
        variance += dx * dx;
    }
    let slope = covariance / variance;
    let projected = slope * (n - 1.0);
    let latest = values[values.len() - 1];

    match rule.adverse {
        Direction::Rising => projected > rule.threshold && latest > mean_y,
        Direction::Falling => projected < -rule.threshold && latest < mean_y,
    }
}
