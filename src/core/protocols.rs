//! Mapping from alerts and predicted needs to hospital prep protocols.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::error::ClinicalError;
use crate::models::{Alert, AlertSet, Intervention, InterventionPrediction};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Protocol {
    StemiProtocol,
    StrokeProtocol,
    TraumaProtocol,
    SepsisProtocol,
    AirwayPrep,
    CodeBluePrep,
}

impl Protocol {
    pub const ALL: [Protocol; 6] = [
        Protocol::StemiProtocol,
        Protocol::StrokeProtocol,
        Protocol::TraumaProtocol,
        Protocol::SepsisProtocol,
        Protocol::AirwayPrep,
        Protocol::CodeBluePrep,
    ];

    /// Ordered prep steps for the receiving team.
    pub fn actions(&self) -> &'static [&'static str] {
        match self {
            Protocol::StemiProtocol => &STEMI_ACTIONS,
            Protocol::StrokeProtocol => &STROKE_ACTIONS,
            Protocol::TraumaProtocol => &TRAUMA_ACTIONS,
            Protocol::SepsisProtocol => &SEPSIS_ACTIONS,
            Protocol::AirwayPrep => &AIRWAY_ACTIONS,
            Protocol::CodeBluePrep => &CODE_BLUE_ACTIONS,
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Protocol::StemiProtocol => "STEMI_PROTOCOL",
            Protocol::StrokeProtocol => "STROKE_PROTOCOL",
            Protocol::TraumaProtocol => "TRAUMA_PROTOCOL",
            Protocol::SepsisProtocol => "SEPSIS_PROTOCOL",
            Protocol::AirwayPrep => "AIRWAY_PREP",
            Protocol::CodeBluePrep => "CODE_BLUE_PREP",
        };
        f.write_str(name)
    }
}

static STEMI_ACTIONS: [&str; 5] = [
    "ACTIVATE CATHETER LAB - Door-to-balloon <90 min",
    "Page Interventional Cardiology",
    "Prepare: Aspirin, Clopidogrel, Heparin, Nitroglycerin",
    "STAT Labs: Troponin, CBC, BMP, Coag panel",
    "Designate Cath Lab bed",
];

static STROKE_ACTIONS: [&str; 6] = [
    "ACTIVATE STROKE TEAM",
    "Reserve CT Scanner immediately",
    "Page Neurology",
    "Document Last Known Well time",
    "Prepare tPA if within window",
    "STAT Labs: CBC, Coag, Glucose",
];

static TRAUMA_ACTIONS: [&str; 6] = [
    "ACTIVATE TRAUMA TEAM",
    "Prepare Trauma Bay",
    "Page Surgery, Anesthesia",
    "Type & Cross, MTP if needed",
    "CT scanner on standby",
    "Notify OR",
];

static SEPSIS_ACTIONS: [&str; 6] = [
    "INITIATE SEPSIS BUNDLE",
    "Blood cultures BEFORE antibiotics",
    "Broad-spectrum antibiotics within 1 hour",
    "Aggressive fluid resuscitation 30ml/kg",
    "STAT Lactate",
    "Consider ICU",
];

static AIRWAY_ACTIONS: [&str; 5] = [
    "PREPARE FOR INTUBATION",
    "Page Anesthesia",
    "RSI medications ready",
    "Ventilator on standby",
    "Difficult airway cart available",
];

static CODE_BLUE_ACTIONS: [&str; 5] = [
    "CODE BLUE PREPARATION",
    "Crash cart at bedside",
    "Emergency medications ready",
    "Rapid response team notified",
    "Defibrillator ready",
];

/// Something that can activate a protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    Alert(Alert),
    Need(Intervention),
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trigger::Alert(alert) => write!(f, "alert {}", alert),
            Trigger::Need(need) => write!(f, "predicted need {}", need),
        }
    }
}

/// Look up the protocol a trigger activates.
pub fn protocol_for(trigger: Trigger) -> Result<Protocol, ClinicalError> {
    let protocol = match trigger {
        Trigger::Alert(Alert::Stemi) | Trigger::Need(Intervention::LikelyStemi) => {
            Protocol::StemiProtocol
        }
        Trigger::Alert(Alert::Stroke) | Trigger::Need(Intervention::LikelyStroke) => {
            Protocol::StrokeProtocol
        }
        Trigger::Alert(Alert::Trauma) => Protocol::TraumaProtocol,
        Trigger::Alert(Alert::Sepsis) | Trigger::Need(Intervention::LikelySepsis) => {
            Protocol::SepsisProtocol
        }
        Trigger::Need(Intervention::NeedsIntubation) => Protocol::AirwayPrep,
        Trigger::Alert(Alert::CardiacArrestRisk)
        | Trigger::Need(Intervention::CardiacArrestImminent) => Protocol::CodeBluePrep,
        Trigger::Need(Intervention::NeedsIcu) | Trigger::Need(Intervention::NeedsOr) => {
            return Err(ClinicalError::UnknownProtocol { trigger })
        }
    };
    Ok(protocol)
}

/// Activated protocols with their ordered actions.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ProtocolActivation(BTreeMap<Protocol, &'static [&'static str]>);

impl ProtocolActivation {
    pub fn contains(&self, protocol: Protocol) -> bool {
        self.0.contains_key(&protocol)
    }

    pub fn actions(&self, protocol: Protocol) -> Option<&'static [&'static str]> {
        self.0.get(&protocol).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn protocols(&self) -> impl Iterator<Item = Protocol> + '_ {
        self.0.keys().copied()
    }

    fn activate(&mut self, protocol: Protocol) {
        self.0.entry(protocol).or_insert_with(|| protocol.actions());
    }
}

pub struct ProtocolActivator;

impl ProtocolActivator {
    /// Union of the protocols activated by every alert and predicted need.
    /// Triggers without a table entry are skipped.
    pub fn activate(alerts: &AlertSet, interventions: &InterventionPrediction) -> ProtocolActivation {
        let triggers = alerts
            .iter()
            .map(|alert| Trigger::Alert(*alert))
            .chain(interventions.iter().map(|(need, _)| Trigger::Need(need)));

        let mut activation = ProtocolActivation::default();
        for trigger in triggers {
            match protocol_for(trigger) {
                Ok(protocol) => activation.activate(protocol),
                Err(error) => debug!(%error, "trigger has no protocol"),
            }
        }
        activation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stemi_actions_in_order() {
        let alerts: AlertSet = [Alert::Stemi].into_iter().collect();
        let activation = ProtocolActivator::activate(&alerts, &InterventionPrediction::new());
        let actions = activation.actions(Protocol::StemiProtocol).unwrap();
        assert_eq!(actions.len(), 5);
        assert_eq!(actions[0], "ACTIVATE CATHETER LAB - Door-to-balloon <90 min");
        assert_eq!(actions[4], "Designate Cath Lab bed");
    }

    #[test]
    fn test_alert_and_need_activate_once() {
        let alerts: AlertSet = [Alert::Stemi].into_iter().collect();
        let mut needs = InterventionPrediction::new();
        needs.record(Intervention::LikelyStemi, 0.9);
        let activation = ProtocolActivator::activate(&alerts, &needs);
        assert_eq!(activation.len(), 1);
    }

    #[test]
    fn test_untabled_needs_are_skipped() {
        let mut needs = InterventionPrediction::new();
        needs.record(Intervention::NeedsIcu, 0.8);
        needs.record(Intervention::NeedsOr, 0.75);
        needs.record(Intervention::NeedsIntubation, 0.9);
        let activation = ProtocolActivator::activate(&AlertSet::new(), &needs);
        assert_eq!(activation.protocols().collect::<Vec<_>>(), vec![Protocol::AirwayPrep]);
    }

    #[test]
    fn test_unknown_protocol_error() {
        let trigger = Trigger::Need(Intervention::NeedsIcu);
        assert_eq!(
            protocol_for(trigger),
            Err(ClinicalError::UnknownProtocol { trigger })
        );
    }

    #[test]
    fn test_arrest_sources_share_code_blue() {
        assert_eq!(
            protocol_for(Trigger::Alert(Alert::CardiacArrestRisk)),
            Ok(Protocol::CodeBluePrep)
        );
        assert_eq!(
            protocol_for(Trigger::Need(Intervention::CardiacArrestImminent)),
            Ok(Protocol::CodeBluePrep)
        );
    }

    #[test]
    fn test_every_protocol_has_actions() {
        assert!(Protocol::ALL.iter().all(|p| !p.actions().is_empty()));
    }

    #[test]
    fn test_activation_serializes_by_name() {
        let alerts: AlertSet = [Alert::Trauma].into_iter().collect();
        let activation = ProtocolActivator::activate(&alerts, &InterventionPrediction::new());
        let json = serde_json::to_value(&activation).unwrap();
        assert_eq!(json["TRAUMA_PROTOCOL"][0], "ACTIVATE TRAUMA TEAM");
    }
}
