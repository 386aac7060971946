use anc_risk::clinic::{
    Alert, AlertError, AlertPublisher, AlertRecord, ClinicRepository, PatientId, PatientRecord,
    RepositoryError, VisitRecord,
};
use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::warn;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local clinic store used by the service and the CLI.
#[derive(Default, Clone)]
pub(crate) struct InMemoryClinicRepository {
    patients: Arc<Mutex<HashMap<PatientId, PatientRecord>>>,
    visits: Arc<Mutex<Vec<VisitRecord>>>,
    alerts: Arc<Mutex<Vec<AlertRecord>>>,
}

fn lock<'a, T>(mutex: &'a Mutex<T>, name: &str) -> Result<MutexGuard<'a, T>, RepositoryError> {
    mutex
        .lock()
        .map_err(|_| RepositoryError::Unavailable(format!("{name} store poisoned")))
}

impl ClinicRepository for InMemoryClinicRepository {
    fn upsert_patient(&self, record: PatientRecord) -> Result<PatientRecord, RepositoryError> {
        let mut guard = lock(&self.patients, "patient")?;
        guard.insert(record.patient.patient_id.clone(), record.clone());
        Ok(record)
    }

    fn fetch_patient(&self, id: &PatientId) -> Result<Option<PatientRecord>, RepositoryError> {
        Ok(lock(&self.patients, "patient")?.get(id).cloned())
    }

    fn patients(&self) -> Result<Vec<PatientRecord>, RepositoryError> {
        Ok(lock(&self.patients, "patient")?.values().cloned().collect())
    }

    fn insert_visit(&self, record: VisitRecord) -> Result<(), RepositoryError> {
        if !lock(&self.patients, "patient")?.contains_key(&record.patient_id) {
            return Err(RepositoryError::UnknownPatient(record.patient_id));
        }
        lock(&self.visits, "visit")?.push(record);
        Ok(())
    }

    fn visits_for(&self, id: &PatientId) -> Result<Vec<VisitRecord>, RepositoryError> {
        Ok(lock(&self.visits, "visit")?
            .iter()
            .filter(|visit| &visit.patient_id == id)
            .cloned()
            .collect())
    }

    fn visits(&self) -> Result<Vec<VisitRecord>, RepositoryError> {
        Ok(lock(&self.visits, "visit")?.clone())
    }

    fn insert_alert(&self, record: AlertRecord) -> Result<(), RepositoryError> {
        lock(&self.alerts, "alert")?.push(record);
        Ok(())
    }

    fn alerts(&self) -> Result<Vec<AlertRecord>, RepositoryError> {
        Ok(lock(&self.alerts, "alert")?.clone())
    }
}

/// Log-only alert transport for the server: each alert becomes a `warn` event on the
/// `alert_dispatch` target. The repository keeps the alert rows.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct LoggingAlertPublisher;

impl AlertPublisher for LoggingAlertPublisher {
    fn publish(&self, alert: &Alert) -> Result<(), AlertError> {
        warn!(
            target: "alert_dispatch",
            patient_id = %alert.patient_id,
            priority = alert.priority.label(),
            risk_score = alert.risk_score,
            timestamp = %alert.timestamp,
            "{}",
            alert.message
        );
        Ok(())
    }
}

/// Buffers dispatched alerts for the demo and tests.
#[derive(Default, Clone)]
pub(crate) struct InMemoryAlertPublisher {
    events: Arc<Mutex<Vec<Alert>>>,
}

impl AlertPublisher for InMemoryAlertPublisher {
    fn publish(&self, alert: &Alert) -> Result<(), AlertError> {
        let mut guard = self
            .events
            .lock()
            .map_err(|_| AlertError::Transport("alert outbox poisoned".to_string()))?;
        guard.push(alert.clone());
        Ok(())
    }
}

impl InMemoryAlertPublisher {
    pub(crate) fn events(&self) -> Vec<Alert> {
        self.events
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
