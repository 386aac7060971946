//! Rule-based hypertension risk scoring for antenatal visits.

mod level;
mod rules;

pub use level::RiskLevel;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::VisitObservation;

/// Immutable outcome of scoring one visit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskAssessment {
    #[serde(rename = "risk_score")]
    pub score: u32,
    #[serde(with = "level::display_label")]
    pub risk_level: RiskLevel,
    pub risk_factors: Vec<String>,
    pub recommendation: String,
    pub timestamp: DateTime<Utc>,
}

/// Score a visit, stamping the assessment with the current time.
pub fn assess_risk(observation: &VisitObservation) -> RiskAssessment {
    assess_risk_at(observation, Utc::now())
}

/// Score a visit with a caller-supplied timestamp.
pub fn assess_risk_at(observation: &VisitObservation, timestamp: DateTime<Utc>) -> RiskAssessment {
    let tally = rules::score_observation(observation);
    let risk_level = RiskLevel::from_score(tally.score);

    RiskAssessment {
        score: tally.score,
        risk_level,
        risk_factors: tally.factors,
        recommendation: risk_level.recommendation().to_string(),
        timestamp,
    }
}
