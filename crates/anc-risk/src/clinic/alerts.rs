use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::assessment::{RiskAssessment, RiskLevel};
use super::domain::PatientId;

/// Urgency attached to a generated alert; mirrors the risk level that triggered it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertPriority {
    High,
    Critical,
}

impl AlertPriority {
    pub const fn label(self) -> &'static str {
        match self {
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        }
    }
}

/// Clinical alert raised for a high or critical risk assessment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub patient_id: PatientId,
    pub message: String,
    pub priority: AlertPriority,
    pub risk_score: u32,
    pub risk_factors: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

/// Build an alert when the assessment reaches the high or critical tier.
///
/// Nothing is dispatched here; the caller decides where the alert goes.
pub fn maybe_generate_alert(patient_id: &PatientId, assessment: &RiskAssessment) -> Option<Alert> {
    let priority = match assessment.risk_level {
        RiskLevel::Low | RiskLevel::Moderate => return None,
        RiskLevel::High => AlertPriority::High,
        RiskLevel::Critical => AlertPriority::Critical,
    };

    Some(Alert {
        patient_id: patient_id.clone(),
        message: format!(
            "Hypertension Risk {}: {}",
            assessment.risk_level.label(),
            assessment.recommendation
        ),
        priority,
        risk_score: assessment.score,
        risk_factors: assessment.risk_factors.clone(),
        timestamp: assessment.timestamp,
    })
}
