use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anc_risk::clinic::{
    maybe_generate_alert, process_visit, Alert, AlertError, AlertPriority, AlertPublisher,
    AlertRecord, ClinicRepository, ClinicService, PatientId, PatientRecord, RepositoryError,
    RiskLevel, VisitObservation, VisitRecord,
};
use anc_risk::config::ClinicConfig;
use chrono::NaiveDate;
use serde_json::json;

#[derive(Default)]
struct Ledger {
    patients: Mutex<HashMap<PatientId, PatientRecord>>,
    visits: Mutex<Vec<VisitRecord>>,
    alerts: Mutex<Vec<AlertRecord>>,
}

impl ClinicRepository for Ledger {
    fn upsert_patient(&self, record: PatientRecord) -> Result<PatientRecord, RepositoryError> {
        self.patients
            .lock()
            .expect("patients lock")
            .insert(record.patient.patient_id.clone(), record.clone());
        Ok(record)
    }

    fn fetch_patient(&self, id: &PatientId) -> Result<Option<PatientRecord>, RepositoryError> {
        Ok(self.patients.lock().expect("patients lock").get(id).cloned())
    }

    fn patients(&self) -> Result<Vec<PatientRecord>, RepositoryError> {
        Ok(self
            .patients
            .lock()
            .expect("patients lock")
            .values()
            .cloned()
            .collect())
    }

    fn insert_visit(&self, record: VisitRecord) -> Result<(), RepositoryError> {
        self.visits.lock().expect("visits lock").push(record);
        Ok(())
    }

    fn visits_for(&self, id: &PatientId) -> Result<Vec<VisitRecord>, RepositoryError> {
        Ok(self
            .visits
            .lock()
            .expect("visits lock")
            .iter()
            .filter(|visit| &visit.patient_id == id)
            .cloned()
            .collect())
    }

    fn visits(&self) -> Result<Vec<VisitRecord>, RepositoryError> {
        Ok(self.visits.lock().expect("visits lock").clone())
    }

    fn insert_alert(&self, record: AlertRecord) -> Result<(), RepositoryError> {
        self.alerts.lock().expect("alerts lock").push(record);
        Ok(())
    }

    fn alerts(&self) -> Result<Vec<AlertRecord>, RepositoryError> {
        Ok(self.alerts.lock().expect("alerts lock").clone())
    }
}

#[derive(Default)]
struct Pager {
    sent: Mutex<Vec<Alert>>,
}

impl AlertPublisher for Pager {
    fn publish(&self, alert: &Alert) -> Result<(), AlertError> {
        self.sent.lock().expect("pager lock").push(alert.clone());
        Ok(())
    }
}

#[test]
fn raw_payloads_flow_through_scoring_and_alerting() {
    let routine = process_visit(
        &json!({
            "patient_id": "MUR001",
            "gestation_weeks": 28,
            "systolic_bp": 120,
            "diastolic_bp": 80,
            "urine_protein": 0,
            "symptoms": [],
            "medical_history": []
        })
        .to_string(),
    )
    .expect("routine visit assessed");
    assert_eq!(routine.risk_assessment.risk_level, RiskLevel::Low);
    assert!(routine.alert.is_none());

    let referral = process_visit(
        &json!({
            "patient_id": "MUR002",
            "gestation_weeks": 32,
            "systolic_bp": 160,
            "diastolic_bp": 110,
            "urine_protein": 2,
            "symptoms": ["severe headache"],
            "medical_history": ["previous_preeclampsia"]
        })
        .to_string(),
    )
    .expect("referral visit assessed");
    assert_eq!(referral.risk_assessment.score, 11);
    let alert = referral.alert.expect("critical alert raised");
    assert_eq!(alert.priority, AlertPriority::Critical);
    assert!(alert.message.starts_with("Hypertension Risk Critical Risk"));

    let rejected = process_visit(r#"{"patient_id": "MUR003", "gestation_weeks": "soon"}"#);
    assert!(rejected.is_err());
}

#[test]
fn alert_generation_reads_only_the_assessment() {
    let observation = VisitObservation::new(142, 88, 30).with_urine_protein(2);
    let assessment = anc_risk::clinic::assess_risk(&observation);

    let alert = maybe_generate_alert(&PatientId("MUR004".to_string()), &assessment)
        .expect("high risk alert");

    assert_eq!(alert.priority, AlertPriority::High);
    assert_eq!(alert.risk_factors, assessment.risk_factors);
}

#[test]
fn clinic_service_records_a_day_of_visits() {
    let ledger = Arc::new(Ledger::default());
    let pager = Arc::new(Pager::default());
    let service = ClinicService::new(ledger.clone(), pager.clone(), ClinicConfig::default());

    let payloads = [
        json!({"patient_id": "MUR001", "name": "Mary Kariuki", "dob": "1998-04-12",
               "gestation_weeks": 28, "systolic_bp": 120, "diastolic_bp": 80}),
        json!({"patient_id": "MUR002", "name": "Grace Wanjiru", "dob": "1990-01-30",
               "gestation_weeks": 32, "systolic_bp": 160, "diastolic_bp": 110,
               "urine_protein": 2, "symptoms": ["severe headache"],
               "medical_history": ["previous_preeclampsia"]}),
        json!({"patient_id": "MUR003", "name": "Esther Njeri", "dob": "2001-07-08",
               "gestation_weeks": 18, "systolic_bp": 145, "diastolic_bp": 92,
               "urine_protein": 1, "medical_history": ["diabetes"]}),
    ];
    for payload in payloads {
        service
            .assess(&payload.to_string(), Some("Nurse Achieng".to_string()))
            .expect("visit assessed");
    }

    let today = NaiveDate::from_ymd_opt(2025, 9, 24).expect("valid date");
    let summary = service.summary(today).expect("summary built");

    assert_eq!(summary.total_patients, 3);
    assert_eq!(summary.total_visits, 3);
    assert_eq!(summary.total_alerts, 1);
    assert_eq!(summary.critical_alerts, 1);
    assert_eq!(pager.sent.lock().expect("pager lock").len(), 1);
    assert!(ledger
        .visits
        .lock()
        .expect("visits lock")
        .iter()
        .all(|visit| visit.assessed_by.as_deref() == Some("Nurse Achieng")));
}
