//! Antenatal-care visit assessment: scoring, alerting, intake, and clinic records.

pub mod alerts;
pub mod assessment;
pub mod domain;
pub mod import;
pub mod intake;
pub mod report;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use alerts::{maybe_generate_alert, Alert, AlertPriority};
pub use assessment::{assess_risk, assess_risk_at, RiskAssessment, RiskLevel};
pub use domain::{AncVisit, PatientId, PatientRegistration, PregnancyPatient, VisitObservation};
pub use import::{read_register, read_register_file, RegisterImportError, RegisterRow};
pub use intake::{
    assess_submission, process_visit, process_visit_value, AssessmentResult, IntakeError,
    VisitSubmission,
};
pub use report::{ClinicSummary, CountEntry, RecentVisitEntry, VisitStatus};
pub use repository::{
    AlertError, AlertPublisher, AlertRecord, ClinicRepository, PatientRecord, RepositoryError,
    VisitRecord,
};
pub use router::{clinic_router, ASSESSED_BY_HEADER};
pub use service::{AlertBoard, ClinicService, ClinicServiceError, PatientProfile};
