use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::alerts::{Alert, AlertPriority};
use super::assessment::RiskLevel;
use super::domain::{PatientId, PregnancyPatient};
use super::intake::AssessmentResult;

/// Stored patient row, keyed by `patient.patient_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientRecord {
    pub patient: PregnancyPatient,
    pub registered_at: DateTime<Utc>,
}

/// Stored visit row. List columns are JSON-encoded text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitRecord {
    pub patient_id: PatientId,
    pub visit_date: NaiveDate,
    pub gestation_weeks: u8,
    pub systolic_bp: u16,
    pub diastolic_bp: u16,
    pub urine_protein: u8,
    pub symptoms: String,
    pub medical_history: String,
    pub risk_score: u32,
    pub risk_level: RiskLevel,
    pub recommendation: String,
    pub assessed_by: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

impl VisitRecord {
    pub fn from_assessment(result: &AssessmentResult) -> Result<Self, serde_json::Error> {
        let visit = &result.visit;
        let assessment = &result.risk_assessment;

        Ok(Self {
            patient_id: visit.patient_id.clone(),
            visit_date: visit.visit_date,
            gestation_weeks: visit.gestation_weeks,
            systolic_bp: visit.systolic_bp,
            diastolic_bp: visit.diastolic_bp,
            urine_protein: visit.urine_protein,
            symptoms: serde_json::to_string(&visit.symptoms)?,
            medical_history: serde_json::to_string(&visit.medical_history)?,
            risk_score: assessment.score,
            risk_level: assessment.risk_level,
            recommendation: assessment.recommendation.clone(),
            assessed_by: visit.assessed_by.clone(),
            recorded_at: assessment.timestamp,
        })
    }

    pub fn symptom_list(&self) -> Result<Vec<String>, serde_json::Error> {
        serde_json::from_str(&self.symptoms)
    }

    pub fn medical_history_list(&self) -> Result<Vec<String>, serde_json::Error> {
        serde_json::from_str(&self.medical_history)
    }
}

/// Stored alert row. `risk_factors` is JSON-encoded text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertRecord {
    pub patient_id: PatientId,
    pub message: String,
    pub priority: AlertPriority,
    pub risk_score: u32,
    pub risk_factors: String,
    pub created_at: DateTime<Utc>,
}

impl AlertRecord {
    pub fn from_alert(alert: &Alert) -> Result<Self, serde_json::Error> {
        Ok(Self {
            patient_id: alert.patient_id.clone(),
            message: alert.message.clone(),
            priority: alert.priority,
            risk_score: alert.risk_score,
            risk_factors: serde_json::to_string(&alert.risk_factors)?,
            created_at: alert.timestamp,
        })
    }

    pub fn risk_factor_list(&self) -> Result<Vec<String>, serde_json::Error> {
        serde_json::from_str(&self.risk_factors)
    }
}

/// Storage abstraction for patients, visits, and alerts.
///
/// An assessment writes in a fixed order: patient upsert, then the visit, then the alert (HIGH
/// and CRITICAL only). The calls are not transactional; a failed write leaves the earlier rows
/// in place and surfaces as an error to the caller.
pub trait ClinicRepository: Send + Sync {
    /// Insert the patient, or replace the stored row with the same identifier.
    fn upsert_patient(&self, record: PatientRecord) -> Result<PatientRecord, RepositoryError>;
    fn fetch_patient(&self, id: &PatientId) -> Result<Option<PatientRecord>, RepositoryError>;
    fn patients(&self) -> Result<Vec<PatientRecord>, RepositoryError>;
    /// Fails with [`RepositoryError::UnknownPatient`] when the patient row is missing.
    fn insert_visit(&self, record: VisitRecord) -> Result<(), RepositoryError>;
    fn visits_for(&self, id: &PatientId) -> Result<Vec<VisitRecord>, RepositoryError>;
    fn visits(&self) -> Result<Vec<VisitRecord>, RepositoryError>;
    /// Called after the visit row is stored; a failure here leaves that visit without an alert row.
    fn insert_alert(&self, record: AlertRecord) -> Result<(), RepositoryError>;
    fn alerts(&self) -> Result<Vec<AlertRecord>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("patient {0} is not registered")]
    UnknownPatient(PatientId),
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Outbound notification hook (SMS gateway, ward pager, e-mail).
pub trait AlertPublisher: Send + Sync {
    fn publish(&self, alert: &Alert) -> Result<(), AlertError>;
}

/// Alert dispatch error.
#[derive(Debug, thiserror::Error)]
pub enum AlertError {
    #[error("alert transport unavailable: {0}")]
    Transport(String),
}
