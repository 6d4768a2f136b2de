use std::sync::Arc;
use std::thread;

use chrono::{Duration, Utc};
use noah_triage::models::symptoms::names;
use noah_triage::models::{
    Alert, Intervention, PatientInfo, ScoreKind, SeverityLevel, SymptomSet, VitalsSample,
};
use noah_triage::simulation::Scenario;
use noah_triage::{Config, PatientRegistry, Protocol};

fn stemi_symptoms() -> SymptomSet {
    SymptomSet::new()
        .flag(names::CHEST_PAIN)
        .flag(names::RADIATING_PAIN)
        .flag(names::DIAPHORESIS)
        .flag(names::ECG_ST_ELEVATION)
}

/// Deteriorating trend ending at HR 125, SpO2 90, BP 88/55.
fn deteriorating_stemi(registry: &PatientRegistry, patient_id: &str) {
    registry
        .register(patient_id, "AMB-001", PatientInfo::default(), Some(6))
        .unwrap();
    registry.ingest_symptoms(patient_id, stemi_symptoms()).unwrap();

    let end = Utc::now();
    for (i, (hr, spo2, sbp, dbp)) in [(100, 97, 120, 80), (110, 95, 105, 70), (125, 90, 88, 55)]
        .into_iter()
        .enumerate()
    {
        let at = end - Duration::seconds(60 * (2 - i as i64));
        registry
            .ingest_vitals(patient_id, VitalsSample::new(hr, spo2, sbp, dbp).at(at))
            .unwrap();
    }
}

#[test]
fn test_stemi_scenario() {
    let registry = PatientRegistry::default();
    deteriorating_stemi(&registry, "P-1");
    let assessment = registry.assessment("P-1").unwrap().unwrap();

    assert_eq!(assessment.scores.stemi_checklist, 4);
    assert!((assessment.scores.shock_index - 125.0 / 88.0).abs() < f64::EPSILON);
    assert!((assessment.scores.shock_index - 1.42).abs() < 0.01);
    assert!(assessment.alerts.contains(&Alert::Stemi));
    assert!(assessment.alerts.contains(&Alert::CardiacArrestRisk));
    assert_eq!(
        assessment.interventions.confidence(Intervention::LikelyStemi),
        Some(0.90)
    );
    assert_eq!(
        assessment
            .interventions
            .confidence(Intervention::CardiacArrestImminent),
        Some(0.85)
    );
    assert_eq!(assessment.severity.level, SeverityLevel::Critical);
}

#[test]
fn test_assessment_explains_severity_and_scores() {
    let registry = PatientRegistry::default();
    deteriorating_stemi(&registry, "P-1");
    let assessment = registry.assessment("P-1").unwrap().unwrap();

    assert!(assessment.contributing_factors.contains(&"Deteriorating Trend"));
    assert!(assessment.contributing_factors.contains(&"ST Elevation"));
    let stemi = assessment
        .interpretations
        .iter()
        .find(|reading| reading.score == ScoreKind::StemiChecklist)
        .unwrap();
    assert_eq!(stemi.recommendation, "Activate Cath Lab Immediately");

    let json = serde_json::to_value(&assessment).unwrap();
    assert_eq!(json["severity"]["priority"], "Resuscitation");
    assert_eq!(json["severity"]["color"], "red");
    assert_eq!(json["interpretations"][0]["score"], "nihss");
}

#[test]
fn test_stemi_protocol_actions() {
    let registry = PatientRegistry::default();
    deteriorating_stemi(&registry, "P-1");
    let assessment = registry.assessment("P-1").unwrap().unwrap();

    let actions = assessment
        .protocols
        .actions(Protocol::StemiProtocol)
        .unwrap();
    assert_eq!(
        actions,
        [
            "ACTIVATE CATHETER LAB - Door-to-balloon <90 min",
            "Page Interventional Cardiology",
            "Prepare: Aspirin, Clopidogrel, Heparin, Nitroglycerin",
            "STAT Labs: Troponin, CBC, BMP, Coag panel",
            "Designate Cath Lab bed",
        ]
    );
    assert!(assessment.protocols.contains(Protocol::CodeBluePrep));
}

#[test]
fn test_single_sample_has_no_deterioration() {
    let registry = PatientRegistry::default();
    registry
        .register("P-1", "AMB-001", PatientInfo::default(), None)
        .unwrap();
    let assessment = registry
        .ingest_vitals(
            "P-1",
            VitalsSample::new(125, 90, 88, 55)
                .with_gcs(14)
                .with_respiratory_rate(24),
        )
        .unwrap();

    assert_eq!(assessment.scores.deterioration_index, 0);
    assert!(assessment.scores.flags.is_empty());
    assert_eq!(assessment.scores.qsofa, 3);
    assert!(assessment.scores.value(ScoreKind::Rts).is_some());
}

#[test]
fn test_handoff_frozen_at_arrival() {
    let registry = PatientRegistry::default();
    deteriorating_stemi(&registry, "P-1");

    let issued = registry.update_eta("P-1", 0).unwrap().unwrap();
    let before = serde_json::to_string(&*issued).unwrap();

    registry
        .ingest_vitals("P-1", VitalsSample::new(70, 99, 135, 85))
        .unwrap();
    registry
        .ingest_symptoms("P-1", SymptomSet::new().flag("headache"))
        .unwrap();

    let again = registry.mark_arrived("P-1").unwrap();
    assert_eq!(serde_json::to_string(&*again).unwrap(), before);
    assert_eq!(registry.handoff("P-1").unwrap().unwrap().to_string(), issued.to_string());
}

#[test]
fn test_forecast_idempotent() {
    let registry = PatientRegistry::default();
    deteriorating_stemi(&registry, "P-1");
    deteriorating_stemi(&registry, "P-2");

    let first = registry.forecast();
    let second = registry.forecast();
    assert_eq!(first, second);
    assert_eq!(first.cath_lab, 2);
    assert_eq!(first.icu_beds, 2);
}

#[test]
fn test_forecast_reports_shortfall() {
    let registry = PatientRegistry::default();
    deteriorating_stemi(&registry, "P-1");
    deteriorating_stemi(&registry, "P-2");

    let shortfalls = registry.shortfalls();
    assert_eq!(shortfalls.len(), 1);
    assert_eq!(shortfalls[0].resource, "cath_lab");
    assert_eq!(shortfalls[0].demand, 2);
}

#[test]
fn test_every_scenario_runs_to_arrival() {
    let registry = PatientRegistry::default();
    for scenario in Scenario::ALL {
        let case = scenario.case().stamped(Utc::now(), Duration::seconds(30));
        let id = scenario.name();
        registry
            .register(id, "AMB-001", case.info, Some(case.eta_minutes))
            .unwrap();
        registry.ingest_symptoms(id, case.symptoms).unwrap();
        for sample in case.vitals {
            registry.ingest_vitals(id, sample).unwrap();
        }
        let handoff = registry.mark_arrived(id).unwrap();
        assert_eq!(handoff.patient_id, id);
    }

    let level = |id: &str| registry.assessment(id).unwrap().unwrap().severity.level;
    assert_eq!(level("stable"), SeverityLevel::NonEmergent);
    assert!(registry
        .assessment("stroke")
        .unwrap()
        .unwrap()
        .alerts
        .contains(&Alert::Stroke));
    assert!(registry
        .assessment("trauma")
        .unwrap()
        .unwrap()
        .alerts
        .contains(&Alert::Trauma));
    assert!(registry
        .assessment("sepsis")
        .unwrap()
        .unwrap()
        .alerts
        .contains(&Alert::Sepsis));
}

#[test]
fn test_parallel_patients() {
    let registry = Arc::new(PatientRegistry::new(Config::default()));
    let ids: Vec<String> = (0..8).map(|i| format!("P-{}", i)).collect();
    for id in &ids {
        registry
            .register(id, "AMB-001", PatientInfo::default(), None)
            .unwrap();
    }

    thread::scope(|scope| {
        for id in &ids {
            let registry = Arc::clone(&registry);
            scope.spawn(move || {
                registry.ingest_symptoms(id, stemi_symptoms()).unwrap();
                for hr in 80..120 {
                    registry
                        .ingest_vitals(id, VitalsSample::new(hr, 95, 110, 70))
                        .unwrap();
                }
            });
        }
    });

    for id in &ids {
        let assessment = registry.assessment(id).unwrap().unwrap();
        assert_eq!(assessment.scores.stemi_checklist, 4);
        assert!((assessment.scores.shock_index - 119.0 / 110.0).abs() < f64::EPSILON);
    }
    assert_eq!(registry.forecast().cath_lab, 8);
}
