//! Interpretation and recommendation attached to each computed score.

use super::scoring::ClinicalScorer;
use crate::models::{
    ClinicalScores, ScoreInterpretation, ScoreKind, SymptomSet, VitalsSample, VitalsTrend,
};

#[derive(Debug, Clone, Copy)]
enum Cut {
    Above(f64),
    AtLeast(f64),
    Below(f64),
}

impl Cut {
    fn admits(self, value: f64) -> bool {
        match self {
            Cut::Above(limit) => value > limit,
            Cut::AtLeast(limit) => value >= limit,
            Cut::Below(limit) => value < limit,
        }
    }
}

struct Band {
    when: Cut,
    reading: &'static str,
}

/// Bands are checked in order; the first that admits the value wins.
struct ScoreGuide {
    score: ScoreKind,
    bands: &'static [Band],
    otherwise: &'static str,
    escalate: Cut,
    escalation: &'static str,
    routine: &'static str,
}

impl ScoreGuide {
    fn reading(&self, value: f64) -> &'static str {
        self.bands
            .iter()
            .find(|band| band.when.admits(value))
            .map_or(self.otherwise, |band| band.reading)
    }

    fn recommendation(&self, value: f64) -> &'static str {
        if self.escalate.admits(value) {
            self.escalation
        } else {
            self.routine
        }
    }
}

const INSUFFICIENT_TREND: &str = "Insufficient Data";

static SCORE_GUIDES: [ScoreGuide; 7] = [
    ScoreGuide {
        score: ScoreKind::Nihss,
        bands: &[
            Band {
                when: Cut::Above(15.0),
                reading: "Moderate to Severe Stroke",
            },
            Band {
                when: Cut::Above(5.0),
                reading: "Moderate Stroke",
            },
        ],
        otherwise: "Minor or No Stroke",
        escalate: Cut::Above(7.0),
        escalation: "Immediate CT and Neuro consult",
        routine: "Monitor",
    },
    ScoreGuide {
        score: ScoreKind::Rts,
        bands: &[
            Band {
                when: Cut::Above(7.0),
                reading: "Minor Trauma",
            },
            Band {
                when: Cut::Above(5.0),
                reading: "Moderate Trauma",
            },
        ],
        otherwise: "Severe Trauma",
        escalate: Cut::Below(5.0),
        escalation: "Trauma Team Activation",
        routine: "Standard Trauma Protocol",
    },
    ScoreGuide {
        score: ScoreKind::Qsofa,
        bands: &[
            Band {
                when: Cut::AtLeast(2.0),
                reading: "High Sepsis Risk",
            },
            Band {
                when: Cut::AtLeast(1.0),
                reading: "Moderate Risk",
            },
        ],
        otherwise: "Low Risk",
        escalate: Cut::AtLeast(2.0),
        escalation: "Immediate Sepsis Protocol",
        routine: "Monitor for Sepsis",
    },
    ScoreGuide {
        score: ScoreKind::StemiChecklist,
        bands: &[
            Band {
                when: Cut::AtLeast(3.0),
                reading: "STEMI Likely",
            },
            Band {
                when: Cut::AtLeast(1.0),
                reading: "Possible ACS",
            },
        ],
        otherwise: "Unlikely STEMI",
        escalate: Cut::AtLeast(3.0),
        escalation: "Activate Cath Lab Immediately",
        routine: "Troponin and Monitor",
    },
    ScoreGuide {
        score: ScoreKind::AirwayRisk,
        bands: &[
            Band {
                when: Cut::AtLeast(4.0),
                reading: "High Risk - Intubate",
            },
            Band {
                when: Cut::AtLeast(2.0),
                reading: "Moderate Risk - Prepare",
            },
        ],
        otherwise: "Low Risk",
        escalate: Cut::AtLeast(4.0),
        escalation: "Prepare for Emergency Intubation",
        routine: "Monitor Airway Closely",
    },
    ScoreGuide {
        score: ScoreKind::ShockIndex,
        bands: &[
            Band {
                when: Cut::Above(1.0),
                reading: "Shock State",
            },
            Band {
                when: Cut::Above(0.9),
                reading: "Pre-Shock / Compensated",
            },
        ],
        otherwise: "Normal",
        escalate: Cut::Above(1.0),
        escalation: "Immediate Resuscitation",
        routine: "Monitor",
    },
    ScoreGuide {
        score: ScoreKind::DeteriorationIndex,
        bands: &[
            Band {
                when: Cut::AtLeast(3.0),
                reading: "Rapidly Deteriorating",
            },
            Band {
                when: Cut::AtLeast(2.0),
                reading: "Deteriorating",
            },
            Band {
                when: Cut::AtLeast(1.0),
                reading: "Concerning Trend",
            },
        ],
        otherwise: "Stable",
        escalate: Cut::AtLeast(3.0),
        escalation: "Escalate Care Immediately",
        routine: "Monitor Closely",
    },
];

/// Read every computed score. Flagged scores have no value and are skipped.
pub fn interpret(
    scores: &ClinicalScores,
    vitals: &VitalsSample,
    symptoms: &SymptomSet,
    trend: &VitalsTrend,
) -> Vec<ScoreInterpretation> {
    SCORE_GUIDES
        .iter()
        .filter_map(|guide| {
            let value = scores.value(guide.score)?;
            let interpretation = match guide.score {
                ScoreKind::DeteriorationIndex if trend.len() < 2 => INSUFFICIENT_TREND,
                _ => guide.reading(value),
            };
            Some(ScoreInterpretation {
                score: guide.score,
                value,
                interpretation,
                recommendation: guide.recommendation(value),
                findings: ClinicalScorer::findings(guide.score, vitals, symptoms, trend),
            })
        })
        .collect()
}
