use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde_json::{json, Value};

use crate::clinic::alerts::Alert;
use crate::clinic::domain::{PatientId, PatientRegistration, VisitObservation};
use crate::clinic::repository::{
    AlertError, AlertPublisher, AlertRecord, ClinicRepository, PatientRecord, RepositoryError,
    VisitRecord,
};
use crate::clinic::{clinic_router, ClinicService};
use crate::config::ClinicConfig;

pub(super) fn fixed_clock() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 9, 24, 9, 30, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 9, 24).expect("valid date")
}

pub(super) fn normal_observation() -> VisitObservation {
    VisitObservation::new(120, 80, 28)
}

pub(super) fn routine_third_trimester_visit() -> Value {
    json!({
        "patient_id": "MUR001",
        "name": "Mary Kariuki",
        "dob": "1998-04-12",
        "gestation_weeks": 28,
        "systolic_bp": 120,
        "diastolic_bp": 80,
        "urine_protein": 0,
        "symptoms": [],
        "medical_history": []
    })
}

pub(super) fn severe_preeclampsia_visit() -> Value {
    json!({
        "patient_id": "MUR002",
        "name": "Grace Wanjiru",
        "dob": "1990-01-30",
        "gestation_weeks": 32,
        "systolic_bp": 160,
        "diastolic_bp": 110,
        "urine_protein": 2,
        "symptoms": ["severe headache"],
        "medical_history": ["previous_preeclampsia"]
    })
}

pub(super) fn diabetic_elevated_bp_visit() -> Value {
    json!({
        "patient_id": "MUR003",
        "name": "Esther Njeri",
        "dob": "2001-07-08",
        "gestation_weeks": 18,
        "systolic_bp": 145,
        "diastolic_bp": 92,
        "urine_protein": 1,
        "symptoms": [],
        "medical_history": ["diabetes"]
    })
}

/// Scores 4: elevated BP, moderate proteinuria, late gestation.
pub(super) fn high_risk_visit() -> Value {
    json!({
        "patient_id": "MUR004",
        "name": "Ann Wambui",
        "gestation_weeks": 30,
        "systolic_bp": 142,
        "diastolic_bp": 88,
        "urine_protein": 2
    })
}

pub(super) fn registration(name: &str, village: &str) -> PatientRegistration {
    PatientRegistration {
        name: name.to_string(),
        dob: NaiveDate::from_ymd_opt(1996, 3, 14).expect("valid"),
        gestation_weeks: 16,
        phone: "0712000000".to_string(),
        village: village.to_string(),
    }
}

pub(super) fn build_service() -> (
    ClinicService<MemoryRepository, MemoryAlerts>,
    Arc<MemoryRepository>,
    Arc<MemoryAlerts>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let alerts = Arc::new(MemoryAlerts::default());
    let service = ClinicService::new(repository.clone(), alerts.clone(), ClinicConfig::default());
    (service, repository, alerts)
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    patients: Arc<Mutex<HashMap<PatientId, PatientRecord>>>,
    visits: Arc<Mutex<Vec<VisitRecord>>>,
    alerts: Arc<Mutex<Vec<AlertRecord>>>,
}

impl MemoryRepository {
    pub(super) fn visit_count(&self) -> usize {
        self.visits.lock().expect("visit mutex poisoned").len()
    }

    pub(super) fn alert_count(&self) -> usize {
        self.alerts.lock().expect("alert mutex poisoned").len()
    }
}

impl ClinicRepository for MemoryRepository {
    fn upsert_patient(&self, record: PatientRecord) -> Result<PatientRecord, RepositoryError> {
        let mut guard = self.patients.lock().expect("patient mutex poisoned");
        guard.insert(record.patient.patient_id.clone(), record.clone());
        Ok(record)
    }

    fn fetch_patient(&self, id: &PatientId) -> Result<Option<PatientRecord>, RepositoryError> {
        let guard = self.patients.lock().expect("patient mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn patients(&self) -> Result<Vec<PatientRecord>, RepositoryError> {
        let guard = self.patients.lock().expect("patient mutex poisoned");
        Ok(guard.values().cloned().collect())
    }

    fn insert_visit(&self, record: VisitRecord) -> Result<(), RepositoryError> {
        if !self
            .patients
            .lock()
            .expect("patient mutex poisoned")
            .contains_key(&record.patient_id)
        {
            return Err(RepositoryError::UnknownPatient(record.patient_id));
        }
        self.visits
            .lock()
            .expect("visit mutex poisoned")
            .push(record);
        Ok(())
    }

    fn visits_for(&self, id: &PatientId) -> Result<Vec<VisitRecord>, RepositoryError> {
        let guard = self.visits.lock().expect("visit mutex poisoned");
        Ok(guard
            .iter()
            .filter(|visit| &visit.patient_id == id)
            .cloned()
            .collect())
    }

    fn visits(&self) -> Result<Vec<VisitRecord>, RepositoryError> {
        Ok(self.visits.lock().expect("visit mutex poisoned").clone())
    }

    fn insert_alert(&self, record: AlertRecord) -> Result<(), RepositoryError> {
        self.alerts
            .lock()
            .expect("alert mutex poisoned")
            .push(record);
        Ok(())
    }

    fn alerts(&self) -> Result<Vec<AlertRecord>, RepositoryError> {
        Ok(self.alerts.lock().expect("alert mutex poisoned").clone())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryAlerts {
    events: Arc<Mutex<Vec<Alert>>>,
}

impl MemoryAlerts {
    pub(super) fn events(&self) -> Vec<Alert> {
        self.events.lock().expect("alert mutex poisoned").clone()
    }
}

impl AlertPublisher for MemoryAlerts {
    fn publish(&self, alert: &Alert) -> Result<(), AlertError> {
        self.events
            .lock()
            .expect("alert mutex poisoned")
            .push(alert.clone());
        Ok(())
    }
}

pub(super) struct OfflineAlerts;

impl AlertPublisher for OfflineAlerts {
    fn publish(&self, _alert: &Alert) -> Result<(), AlertError> {
        Err(AlertError::Transport("sms gateway offline".to_string()))
    }
}

pub(super) struct UnavailableRepository;

impl ClinicRepository for UnavailableRepository {
    fn upsert_patient(&self, _record: PatientRecord) -> Result<PatientRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch_patient(&self, _id: &PatientId) -> Result<Option<PatientRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn patients(&self) -> Result<Vec<PatientRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn insert_visit(&self, _record: VisitRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn visits_for(&self, _id: &PatientId) -> Result<Vec<VisitRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn visits(&self) -> Result<Vec<VisitRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn insert_alert(&self, _record: AlertRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn alerts(&self) -> Result<Vec<AlertRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn clinic_router_with_service(
    service: ClinicService<MemoryRepository, MemoryAlerts>,
) -> axum::Router {
    clinic_router(Arc::new(service))
}

/// Stores patients and visits but fails every alert write.
#[derive(Default, Clone)]
pub(super) struct AlertTableDown {
    pub(super) inner: MemoryRepository,
}

impl ClinicRepository for AlertTableDown {
    fn upsert_patient(&self, record: PatientRecord) -> Result<PatientRecord, RepositoryError> {
        self.inner.upsert_patient(record)
    }

    fn fetch_patient(&self, id: &PatientId) -> Result<Option<PatientRecord>, RepositoryError> {
        self.inner.fetch_patient(id)
    }

    fn patients(&self) -> Result<Vec<PatientRecord>, RepositoryError> {
        self.inner.patients()
    }

    fn insert_visit(&self, record: VisitRecord) -> Result<(), RepositoryError> {
        self.inner.insert_visit(record)
    }

    fn visits_for(&self, id: &PatientId) -> Result<Vec<VisitRecord>, RepositoryError> {
        self.inner.visits_for(id)
    }

    fn visits(&self) -> Result<Vec<VisitRecord>, RepositoryError> {
        self.inner.visits()
    }

    fn insert_alert(&self, _record: AlertRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("alert table locked".to_string()))
    }

    fn alerts(&self) -> Result<Vec<AlertRecord>, RepositoryError> {
        self.inner.alerts()
    }
}
