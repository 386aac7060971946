use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tracing::{info, warn};

use super::alerts::AlertPriority;
use super::domain::{PatientId, PatientRegistration, PregnancyPatient};
use super::intake::coerce::MAX_GESTATION_WEEKS;
use super::intake::{assess_submission, AssessmentResult, IntakeError, VisitSubmission};
use super::report::ClinicSummary;
use super::repository::{
    AlertPublisher, AlertRecord, ClinicRepository, PatientRecord, RepositoryError, VisitRecord,
};
use crate::config::ClinicConfig;

/// Service composing intake, scoring, storage, and alert dispatch.
pub struct ClinicService<R, A> {
    repository: Arc<R>,
    alerts: Arc<A>,
    config: ClinicConfig,
}

impl<R, A> ClinicService<R, A>
where
    R: ClinicRepository + 'static,
    A: AlertPublisher + 'static,
{
    pub fn new(repository: Arc<R>, alerts: Arc<A>, config: ClinicConfig) -> Self {
        Self {
            repository,
            alerts,
            config,
        }
    }

    pub fn config(&self) -> &ClinicConfig {
        &self.config
    }

    /// Register a patient under the next sequential identifier.
    pub fn register_patient(
        &self,
        registration: PatientRegistration,
    ) -> Result<PatientRecord, ClinicServiceError> {
        if u64::from(registration.gestation_weeks) > MAX_GESTATION_WEEKS {
            return Err(ClinicServiceError::InvalidRegistration(format!(
                "gestation_weeks must be at most {MAX_GESTATION_WEEKS} (found {})",
                registration.gestation_weeks
            )));
        }

        let patient_id = self.next_patient_id()?;
        let PatientRegistration {
            name,
            dob,
            gestation_weeks,
            phone,
            village,
        } = registration;

        let record = PatientRecord {
            patient: PregnancyPatient {
                patient_id,
                name,
                dob: Some(dob),
                gender: "female".to_string(),
                gestation_weeks,
                phone,
                village,
            },
            registered_at: Utc::now(),
        };

        let stored = self.repository.upsert_patient(record)?;
        info!(patient_id = %stored.patient.patient_id, "patient registered");
        Ok(stored)
    }

    /// Decode, score, and persist a raw JSON visit submission.
    pub fn assess(
        &self,
        raw: &str,
        assessed_by: Option<String>,
    ) -> Result<AssessmentResult, ClinicServiceError> {
        let submission = VisitSubmission::from_json(raw)?;
        self.assess_submission(submission, assessed_by)
    }

    /// Score and persist an already-decoded submission.
    ///
    /// `assessed_by` (the signed-in staff member) takes precedence over any name in the payload.
    pub fn assess_submission(
        &self,
        mut submission: VisitSubmission,
        assessed_by: Option<String>,
    ) -> Result<AssessmentResult, ClinicServiceError> {
        if assessed_by.is_some() {
            submission.assessed_by = assessed_by;
        }

        let result = assess_submission(submission, Utc::now());
        let visit = VisitRecord::from_assessment(&result)?;
        let alert = result.alert.as_ref().map(AlertRecord::from_alert).transpose()?;

        self.store_patient(&result.patient)?;
        self.repository.insert_visit(visit)?;

        info!(
            patient_id = %result.patient.patient_id,
            score = result.risk_assessment.score,
            level = result.risk_assessment.risk_level.label(),
            "visit assessed"
        );

        if let (Some(record), Some(alert)) = (alert, result.alert.as_ref()) {
            self.repository.insert_alert(record)?;
            warn!(
                patient_id = %alert.patient_id,
                priority = alert.priority.label(),
                "{}",
                alert.message
            );
            if let Err(err) = self.alerts.publish(alert) {
                warn!(patient_id = %alert.patient_id, error = %err, "alert dispatch failed");
            }
        }

        Ok(result)
    }

    /// Patient details with visits, newest first.
    pub fn patient_profile(&self, id: &PatientId) -> Result<PatientProfile, ClinicServiceError> {
        let patient = self
            .repository
            .fetch_patient(id)?
            .ok_or_else(|| ClinicServiceError::PatientNotFound(id.clone()))?;
        let mut visits = self.repository.visits_for(id)?;
        visits.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));

        Ok(PatientProfile { patient, visits })
    }

    pub fn patients(&self) -> Result<Vec<PatientRecord>, ClinicServiceError> {
        let mut patients = self.repository.patients()?;
        patients.sort_by(|a, b| a.patient.patient_id.cmp(&b.patient.patient_id));
        Ok(patients)
    }

    /// Stored alerts, newest first, with per-priority counts.
    pub fn alert_board(&self) -> Result<AlertBoard, ClinicServiceError> {
        let mut alerts = self.repository.alerts()?;
        alerts.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let count = |priority: AlertPriority| {
            alerts
                .iter()
                .filter(|alert| alert.priority == priority)
                .count()
        };

        Ok(AlertBoard {
            critical_count: count(AlertPriority::Critical),
            high_count: count(AlertPriority::High),
            alerts,
        })
    }

    pub fn summary(&self, today: NaiveDate) -> Result<ClinicSummary, ClinicServiceError> {
        let patients = self.repository.patients()?;
        let visits = self.repository.visits()?;
        let alerts = self.repository.alerts()?;

        Ok(ClinicSummary::build(
            &self.config.facility,
            &patients,
            &visits,
            &alerts,
            today,
        ))
    }

    fn store_patient(&self, patient: &PregnancyPatient) -> Result<(), ClinicServiceError> {
        let record = match self.repository.fetch_patient(&patient.patient_id)? {
            Some(mut existing) => {
                existing.patient.gestation_weeks = patient.gestation_weeks;
                if existing.patient.dob.is_none() {
                    existing.patient.dob = patient.dob;
                }
                if existing.patient.name.is_empty() {
                    existing.patient.name = patient.name.clone();
                }
                existing
            }
            None => PatientRecord {
                patient: patient.clone(),
                registered_at: Utc::now(),
            },
        };

        self.repository.upsert_patient(record)?;
        Ok(())
    }

    fn next_patient_id(&self) -> Result<PatientId, ClinicServiceError> {
        let prefix = &self.config.patient_id_prefix;
        let last = self
            .repository
            .patients()?
            .iter()
            .filter_map(|record| {
                record
                    .patient
                    .patient_id
                    .as_str()
                    .strip_prefix(prefix.as_str())
                    .and_then(|suffix| suffix.parse::<u64>().ok())
            })
            .max()
            .unwrap_or(0);

        let next = last
            .checked_add(1)
            .ok_or_else(|| ClinicServiceError::IdentifiersExhausted(prefix.clone()))?;
        Ok(PatientId(format!("{prefix}{next:03}")))
    }
}

/// Patient row together with their recorded visits.
#[derive(Debug, Clone, Serialize)]
pub struct PatientProfile {
    pub patient: PatientRecord,
    pub visits: Vec<VisitRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AlertBoard {
    pub alerts: Vec<AlertRecord>,
    pub critical_count: usize,
    pub high_count: usize,
}

/// Error raised by the clinic service.
#[derive(Debug, thiserror::Error)]
pub enum ClinicServiceError {
    #[error(transparent)]
    Intake(#[from] IntakeError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("failed to encode record: {0}")]
    Encoding(#[from] serde_json::Error),
    #[error("patient {0} not found")]
    PatientNotFound(PatientId),
    #[error("invalid registration: {0}")]
    InvalidRegistration(String),
    #[error("no patient identifiers left under prefix {0}")]
    IdentifiersExhausted(String),
}
