use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Identifier wrapper for registered patients (e.g. `MUR001`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatientId(pub String);

impl PatientId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Typed vitals and history captured at a single antenatal visit.
///
/// Callers are expected to have coerced raw input before building this value; the scoring
/// engine trusts every field as given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitObservation {
    pub systolic_bp: u16,
    pub diastolic_bp: u16,
    pub gestational_age_weeks: u8,
    /// Dipstick reading: 0 negative, 1..=3 increasing severity.
    pub urine_protein: u8,
    pub symptoms: BTreeSet<String>,
    pub medical_history: BTreeSet<String>,
}

impl VisitObservation {
    pub fn new(systolic_bp: u16, diastolic_bp: u16, gestational_age_weeks: u8) -> Self {
        Self {
            systolic_bp,
            diastolic_bp,
            gestational_age_weeks,
            urine_protein: 0,
            symptoms: BTreeSet::new(),
            medical_history: BTreeSet::new(),
        }
    }

    pub fn with_urine_protein(mut self, urine_protein: u8) -> Self {
        self.urine_protein = urine_protein;
        self
    }

    pub fn with_symptoms<I, S>(mut self, symptoms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.symptoms = symptoms.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_history<I, S>(mut self, history: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.medical_history = history.into_iter().map(Into::into).collect();
        self
    }
}

/// Identity and obstetric snapshot of a registered mother.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PregnancyPatient {
    pub patient_id: PatientId,
    pub name: String,
    pub dob: Option<NaiveDate>,
    pub gender: String,
    pub gestation_weeks: u8,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub village: String,
}

impl PregnancyPatient {
    /// Completed years of age on `today`, when a date of birth is on file.
    pub fn age_on(&self, today: NaiveDate) -> Option<u32> {
        self.dob.and_then(|dob| today.years_since(dob))
    }
}

/// Single antenatal-care visit as recorded by the clinic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AncVisit {
    pub patient_id: PatientId,
    pub visit_date: NaiveDate,
    pub gestation_weeks: u8,
    pub systolic_bp: u16,
    pub diastolic_bp: u16,
    pub urine_protein: u8,
    pub symptoms: BTreeSet<String>,
    pub medical_history: BTreeSet<String>,
    pub assessed_by: Option<String>,
}

impl AncVisit {
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

/// Demographics captured when a patient is registered ahead of any visit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientRegistration {
    pub name: String,
    pub dob: NaiveDate,
    #[serde(deserialize_with = "crate::clinic::intake::coerce::gestation_weeks")]
    pub gestation_weeks: u8,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub village: String,
}
