use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use super::alerts::AlertPriority;
use super::assessment::RiskLevel;
use super::repository::{AlertRecord, PatientRecord, VisitRecord};

const RECENT_VISIT_LIMIT: usize = 5;

/// Labelled count used for every distribution in the summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountEntry {
    pub label: String,
    pub count: usize,
}

/// Dashboard status bucket for a recorded visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VisitStatus {
    Normal,
    Warning,
    Critical,
}

impl VisitStatus {
    pub const fn from_level(level: RiskLevel) -> Self {
        match level {
            RiskLevel::Low => Self::Normal,
            RiskLevel::Moderate => Self::Warning,
            RiskLevel::High | RiskLevel::Critical => Self::Critical,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecentVisitEntry {
    pub patient_id: String,
    pub name: String,
    pub visit_date: NaiveDate,
    pub systolic_bp: u16,
    pub diastolic_bp: u16,
    pub risk_level_label: &'static str,
    pub status: VisitStatus,
}

/// Clinic-wide dashboard figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClinicSummary {
    pub facility: String,
    pub today: NaiveDate,
    pub total_patients: usize,
    pub total_visits: usize,
    pub total_alerts: usize,
    pub critical_alerts: usize,
    pub risk_distribution: Vec<CountEntry>,
    pub gestation_groups: Vec<CountEntry>,
    pub age_groups: Vec<CountEntry>,
    pub villages: Vec<CountEntry>,
    pub recent_visits: Vec<RecentVisitEntry>,
}

impl ClinicSummary {
    pub fn build(
        facility: &str,
        patients: &[PatientRecord],
        visits: &[VisitRecord],
        alerts: &[AlertRecord],
        today: NaiveDate,
    ) -> Self {
        Self {
            facility: facility.to_string(),
            today,
            total_patients: patients.len(),
            total_visits: visits.len(),
            total_alerts: alerts.len(),
            critical_alerts: alerts
                .iter()
                .filter(|alert| alert.priority == AlertPriority::Critical)
                .count(),
            risk_distribution: risk_distribution(visits),
            gestation_groups: gestation_groups(patients),
            age_groups: age_groups(patients, today),
            villages: villages(patients),
            recent_visits: recent_visits(patients, visits),
        }
    }
}

fn risk_distribution(visits: &[VisitRecord]) -> Vec<CountEntry> {
    RiskLevel::ordered()
        .into_iter()
        .map(|level| CountEntry {
            label: level.label().to_string(),
            count: visits
                .iter()
                .filter(|visit| visit.risk_level == level)
                .count(),
        })
        .collect()
}

const TRIMESTERS: [&str; 3] = [
    "1st trimester (<14w)",
    "2nd trimester (14-27w)",
    "3rd trimester (28w+)",
];

fn gestation_groups(patients: &[PatientRecord]) -> Vec<CountEntry> {
    let mut counts = [0usize; 3];
    for record in patients {
        let index = match record.patient.gestation_weeks {
            0..=13 => 0,
            14..=27 => 1,
            _ => 2,
        };
        counts[index] += 1;
    }

    labelled(&TRIMESTERS, &counts)
}

const AGE_BANDS: [&str; 5] = ["<20", "20-25", "26-30", "31-35", ">35"];

/// Patients without a date of birth are left out of the age bands.
fn age_groups(patients: &[PatientRecord], today: NaiveDate) -> Vec<CountEntry> {
    let mut counts = [0usize; 5];
    for age in patients
        .iter()
        .filter_map(|record| record.patient.age_on(today))
    {
        let index = match age {
            0..=19 => 0,
            20..=25 => 1,
            26..=30 => 2,
            31..=35 => 3,
            _ => 4,
        };
        counts[index] += 1;
    }

    labelled(&AGE_BANDS, &counts)
}

fn villages(patients: &[PatientRecord]) -> Vec<CountEntry> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for record in patients {
        let village = record.patient.village.trim();
        let key = if village.is_empty() { "Unknown" } else { village };
        *counts.entry(key.to_string()).or_default() += 1;
    }

    counts
        .into_iter()
        .map(|(label, count)| CountEntry { label, count })
        .collect()
}

fn recent_visits(patients: &[PatientRecord], visits: &[VisitRecord]) -> Vec<RecentVisitEntry> {
    let mut ordered: Vec<&VisitRecord> = visits.iter().collect();
    ordered.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));

    ordered
        .into_iter()
        .filter_map(|visit| {
            let patient = patients
                .iter()
                .find(|record| record.patient.patient_id == visit.patient_id)?;
            Some(RecentVisitEntry {
                patient_id: visit.patient_id.0.clone(),
                name: patient.patient.name.clone(),
                visit_date: visit.visit_date,
                systolic_bp: visit.systolic_bp,
                diastolic_bp: visit.diastolic_bp,
                risk_level_label: visit.risk_level.label(),
                status: VisitStatus::from_level(visit.risk_level),
            })
        })
        .take(RECENT_VISIT_LIMIT)
        .collect()
}

fn labelled(labels: &[&str], counts: &[usize]) -> Vec<CountEntry> {
    labels
        .iter()
        .zip(counts)
        .map(|(label, count)| CountEntry {
            label: (*label).to_string(),
            count: *count,
        })
        .collect()
}
