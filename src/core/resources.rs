//! Hospital-wide resource demand across all tracked patients.

use serde::Serialize;

use crate::config::HospitalCapacity;
use crate::models::{Alert, Intervention, PatientAssessment};

/// Predicted resource counts. Always a fresh snapshot, never a running total.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ResourceDemand {
    pub icu_beds: u32,
    pub trauma_bays: u32,
    pub ct_scanner: u32,
    pub cath_lab: u32,
    pub ventilators: u32,
    pub operating_rooms: u32,
    pub blood_units_o_neg: u32,
}

/// Demand that exceeds what the hospital has available.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Shortfall {
    pub resource: &'static str,
    pub demand: u32,
    pub available: u32,
}

impl ResourceDemand {
    pub fn entries(&self) -> [(&'static str, u32); 7] {
        [
            ("icu_beds", self.icu_beds),
            ("trauma_bays", self.trauma_bays),
            ("ct_scanner", self.ct_scanner),
            ("cath_lab", self.cath_lab),
            ("ventilators", self.ventilators),
            ("operating_rooms", self.operating_rooms),
            ("blood_units_o_neg", self.blood_units_o_neg),
        ]
    }

    pub fn shortfalls(&self, capacity: &HospitalCapacity) -> Vec<Shortfall> {
        let available = [
            capacity.icu_beds,
            capacity.trauma_bays,
            capacity.ct_scanner,
            capacity.cath_lab,
            capacity.ventilators,
            capacity.operating_rooms,
            capacity.blood_units_o_neg,
        ];
        self.entries()
            .into_iter()
            .zip(available)
            .filter(|((_, demand), available)| demand > available)
            .map(|((resource, demand), available)| Shortfall {
                resource,
                demand,
                available,
            })
            .collect()
    }
}

pub struct ResourceAggregator;

impl ResourceAggregator {
    /// Sum needs over the given assessments in a single pass.
    pub fn forecast<'a, I>(assessments: I) -> ResourceDemand
    where
        I: IntoIterator<Item = &'a PatientAssessment>,
    {
        let mut demand = ResourceDemand::default();
        for assessment in assessments {
            let alerted = |alert: Alert| assessment.alerts.contains(&alert);
            let needs = |need: Intervention| assessment.interventions.contains(need);

            if needs(Intervention::NeedsIcu) {
                demand.icu_beds += 1;
            }
            if alerted(Alert::Trauma) {
                demand.trauma_bays += 1;
                demand.blood_units_o_neg += 2;
            }
            if alerted(Alert::Stroke) || alerted(Alert::Trauma) {
                demand.ct_scanner += 1;
            }
            if alerted(Alert::Stemi) {
                demand.cath_lab += 1;
            }
            if needs(Intervention::NeedsIntubation) {
                demand.ventilators += 1;
            }
            if needs(Intervention::NeedsOr) {
                demand.operating_rooms += 1;
            }
        }
        demand
    }
}
