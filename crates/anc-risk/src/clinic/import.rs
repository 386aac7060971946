//! Bulk intake from a clinic ANC register exported as CSV.
//!
//! Expected header:
//! `patient_id,name,dob,gestation_weeks,systolic_bp,diastolic_bp,urine_protein,symptoms,medical_history`
//! with `;`-separated list columns. Rows go through the same coercion as JSON submissions.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use serde_json::{Map, Value};

use super::intake::{IntakeError, VisitSubmission};

#[derive(Debug, thiserror::Error)]
pub enum RegisterImportError {
    #[error("failed to read register export: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid register CSV data: {0}")]
    Csv(#[from] csv::Error),
}

/// One register row and its decoded submission (or the reason it was rejected).
#[derive(Debug)]
pub struct RegisterRow {
    /// 1-based data row number, excluding the header.
    pub row: usize,
    pub submission: Result<VisitSubmission, IntakeError>,
}

#[derive(Debug, Deserialize)]
struct RawRegisterRow {
    patient_id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    dob: String,
    #[serde(default)]
    visit_date: Option<String>,
    #[serde(default)]
    gestation_weeks: String,
    #[serde(default)]
    systolic_bp: String,
    #[serde(default)]
    diastolic_bp: String,
    #[serde(default)]
    urine_protein: String,
    #[serde(default)]
    symptoms: String,
    #[serde(default)]
    medical_history: String,
}

impl RawRegisterRow {
    fn into_value(self) -> Value {
        let mut fields = Map::new();
        fields.insert("patient_id".to_string(), Value::String(self.patient_id));
        fields.insert("name".to_string(), Value::String(self.name));
        fields.insert("dob".to_string(), Value::String(self.dob));
        if let Some(visit_date) = self.visit_date {
            fields.insert("visit_date".to_string(), Value::String(visit_date));
        }
        fields.insert(
            "gestation_weeks".to_string(),
            Value::String(self.gestation_weeks),
        );
        fields.insert("systolic_bp".to_string(), Value::String(self.systolic_bp));
        fields.insert("diastolic_bp".to_string(), Value::String(self.diastolic_bp));
        fields.insert(
            "urine_protein".to_string(),
            Value::String(self.urine_protein),
        );
        fields.insert("symptoms".to_string(), Value::String(self.symptoms));
        fields.insert(
            "medical_history".to_string(),
            Value::String(self.medical_history),
        );
        Value::Object(fields)
    }
}

pub fn read_register<R: Read>(reader: R) -> Result<Vec<RegisterRow>, RegisterImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let mut rows = Vec::new();

    for (index, record) in csv_reader.deserialize::<RawRegisterRow>().enumerate() {
        let raw = record?;
        rows.push(RegisterRow {
            row: index + 1,
            submission: VisitSubmission::from_value(raw.into_value()),
        });
    }

    Ok(rows)
}

pub fn read_register_file<P: AsRef<Path>>(
    path: P,
) -> Result<Vec<RegisterRow>, RegisterImportError> {
    let file = File::open(path)?;
    read_register(file)
}
