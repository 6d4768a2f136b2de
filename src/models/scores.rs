use std::fmt;

use serde::Serialize;

use crate::error::ClinicalError;

/// Identifies one field of [`ClinicalScores`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreKind {
    Nihss,
    Rts,
    Qsofa,
    StemiChecklist,
    AirwayRisk,
    ShockIndex,
    DeteriorationIndex,
}

impl ScoreKind {
    pub const ALL: [ScoreKind; 7] = [
        ScoreKind::Nihss,
        ScoreKind::Rts,
        ScoreKind::Qsofa,
        ScoreKind::StemiChecklist,
        ScoreKind::AirwayRisk,
        ScoreKind::ShockIndex,
        ScoreKind::DeteriorationIndex,
    ];

    /// Documented closed range; shock index has no upper bound.
    pub fn range(&self) -> (f64, f64) {
        match self {
            ScoreKind::Nihss => (0.0, 42.0),
            ScoreKind::Rts => (0.0, 7.84),
            ScoreKind::Qsofa => (0.0, 3.0),
            ScoreKind::StemiChecklist => (0.0, 5.0),
            ScoreKind::AirwayRisk => (0.0, 10.0),
            ScoreKind::ShockIndex => (0.0, f64::INFINITY),
            ScoreKind::DeteriorationIndex => (0.0, 5.0),
        }
    }
}

impl fmt::Display for ScoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScoreKind::Nihss => "nihss",
            ScoreKind::Rts => "rts",
            ScoreKind::Qsofa => "qsofa",
            ScoreKind::StemiChecklist => "stemi_checklist",
            ScoreKind::AirwayRisk => "airway_risk",
            ScoreKind::ShockIndex => "shock_index",
            ScoreKind::DeteriorationIndex => "deterioration_index",
        };
        f.write_str(name)
    }
}

/// A score that could not be computed on this pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreFlag {
    pub score: ScoreKind,
    pub error: ClinicalError,
}

/// Full set of clinical scores for one pass.
///
/// Fields that failed hold their neutral default and carry a [`ScoreFlag`];
/// use [`ClinicalScores::value`] to read a field only when it was computed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClinicalScores {
    pub nihss: u8,
    pub rts: f64,
    pub qsofa: u8,
    pub stemi_checklist: u8,
    pub airway_risk: u8,
    pub shock_index: f64,
    pub deterioration_index: u8,
    pub flags: Vec<ScoreFlag>,
}

impl Default for ClinicalScores {
    fn default() -> Self {
        Self {
            nihss: 0,
            rts: 7.84,
            qsofa: 0,
            stemi_checklist: 0,
            airway_risk: 0,
            shock_index: 0.0,
            deterioration_index: 0,
            flags: Vec::new(),
        }
    }
}

impl ClinicalScores {
    pub fn is_flagged(&self, kind: ScoreKind) -> bool {
        self.flags.iter().any(|flag| flag.score == kind)
    }

    /// Field value, or `None` if it was flagged on this pass.
    pub fn value(&self, kind: ScoreKind) -> Option<f64> {
        if self.is_flagged(kind) {
            return None;
        }
        Some(match kind {
            ScoreKind::Nihss => f64::from(self.nihss),
            ScoreKind::Rts => self.rts,
            ScoreKind::Qsofa => f64::from(self.qsofa),
            ScoreKind::StemiChecklist => f64::from(self.stemi_checklist),
            ScoreKind::AirwayRisk => f64::from(self.airway_risk),
            ScoreKind::ShockIndex => self.shock_index,
            ScoreKind::DeteriorationIndex => f64::from(self.deterioration_index),
        })
    }

    pub(crate) fn flag(&mut self, score: ScoreKind, error: ClinicalError) {
        self.flags.push(ScoreFlag { score, error });
    }
}

/// Clinical reading of one computed score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreInterpretation {
    pub score: ScoreKind,
    pub value: f64,
    pub interpretation: &'static str,
    pub recommendation: &'static str,
    /// Criteria met, risk factors or adverse trends behind the value.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub findings: Vec<&'static str>,
}
