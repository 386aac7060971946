//! Orchestrates a raw visit submission through scoring and alert generation.
//!
//! All fallibility lives here: once a submission has been decoded into a
//! [`VisitSubmission`], scoring and alerting cannot fail.

pub(crate) mod coerce;

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::alerts::{maybe_generate_alert, Alert};
use super::assessment::{assess_risk_at, RiskAssessment};
use super::domain::{AncVisit, PatientId, PregnancyPatient, VisitObservation};

/// Typed form of the visit payload posted by clinic staff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitSubmission {
    #[serde(deserialize_with = "coerce::patient_id")]
    pub patient_id: PatientId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "coerce::optional_date")]
    pub dob: Option<NaiveDate>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default, deserialize_with = "coerce::optional_date")]
    pub visit_date: Option<NaiveDate>,
    #[serde(deserialize_with = "coerce::gestation_weeks")]
    pub gestation_weeks: u8,
    #[serde(deserialize_with = "coerce::systolic_bp")]
    pub systolic_bp: u16,
    #[serde(deserialize_with = "coerce::diastolic_bp")]
    pub diastolic_bp: u16,
    #[serde(default, deserialize_with = "coerce::urine_protein")]
    pub urine_protein: u8,
    #[serde(default, deserialize_with = "coerce::tokens")]
    pub symptoms: BTreeSet<String>,
    #[serde(default, deserialize_with = "coerce::tokens")]
    pub medical_history: BTreeSet<String>,
    #[serde(default)]
    pub assessed_by: Option<String>,
}

impl VisitSubmission {
    pub fn from_json(raw: &str) -> Result<Self, IntakeError> {
        serde_json::from_str(raw).map_err(IntakeError::Malformed)
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self, IntakeError> {
        serde_json::from_value(value).map_err(IntakeError::Malformed)
    }

    pub fn observation(&self) -> VisitObservation {
        VisitObservation {
            systolic_bp: self.systolic_bp,
            diastolic_bp: self.diastolic_bp,
            gestational_age_weeks: self.gestation_weeks,
            urine_protein: self.urine_protein,
            symptoms: self.symptoms.clone(),
            medical_history: self.medical_history.clone(),
        }
    }
}

/// Complete output of one visit assessment, ready for the caller to persist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentResult {
    pub patient: PregnancyPatient,
    pub visit: AncVisit,
    pub risk_assessment: RiskAssessment,
    pub alert: Option<Alert>,
}

/// Intake failure; no assessment is produced alongside it.
#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("malformed visit submission: {0}")]
    Malformed(#[source] serde_json::Error),
}

impl IntakeError {
    /// Structured `{"error": ...}` marker handed back to callers.
    pub fn error_payload(&self) -> serde_json::Value {
        json!({ "error": self.to_string() })
    }
}

/// Decode a JSON visit payload and run the full assessment.
pub fn process_visit(raw: &str) -> Result<AssessmentResult, IntakeError> {
    let submission = VisitSubmission::from_json(raw)?;
    Ok(assess_submission(submission, Utc::now()))
}

/// Same as [`process_visit`] for payloads already parsed into JSON values.
pub fn process_visit_value(value: serde_json::Value) -> Result<AssessmentResult, IntakeError> {
    let submission = VisitSubmission::from_value(value)?;
    Ok(assess_submission(submission, Utc::now()))
}

/// Score a typed submission and package the patient, visit, assessment, and alert.
pub fn assess_submission(submission: VisitSubmission, at: DateTime<Utc>) -> AssessmentResult {
    let observation = submission.observation();
    let risk_assessment = assess_risk_at(&observation, at);
    let alert = maybe_generate_alert(&submission.patient_id, &risk_assessment);

    let VisitSubmission {
        patient_id,
        name,
        dob,
        gender,
        visit_date,
        gestation_weeks,
        systolic_bp,
        diastolic_bp,
        urine_protein,
        symptoms,
        medical_history,
        assessed_by,
    } = submission;

    let patient = PregnancyPatient {
        patient_id: patient_id.clone(),
        name: name.unwrap_or_default(),
        dob,
        gender: gender.unwrap_or_else(|| "female".to_string()),
        gestation_weeks,
        phone: String::new(),
        village: String::new(),
    };

    let visit = AncVisit {
        patient_id,
        visit_date: visit_date.unwrap_or_else(|| at.date_naive()),
        gestation_weeks,
        systolic_bp,
        diastolic_bp,
        urine_protein,
        symptoms,
        medical_history,
        assessed_by,
    };

    AssessmentResult {
        patient,
        visit,
        risk_assessment,
        alert,
    }
}
