//! Field-level coercion for loosely typed visit submissions.
//!
//! Web forms post numbers as strings while API clients send JSON integers, so numeric
//! fields accept both and reject everything else.

use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;
use serde::de::{self, Deserializer, Visitor};
use serde::Deserialize;

use crate::clinic::domain::PatientId;

pub(crate) const MAX_GESTATION_WEEKS: u64 = 45;

struct WholeNumber {
    field: &'static str,
}

impl<'de> Visitor<'de> for WholeNumber {
    type Value = Option<u64>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} as a non-negative whole number", self.field)
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
        Ok(Some(value))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
        u64::try_from(value)
            .map(Some)
            .map_err(|_| E::custom(format!("{} must not be negative (found {value})", self.field)))
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Self::Value, E> {
        if value.is_finite() && value.fract() == 0.0 && value >= 0.0 && value <= u64::MAX as f64 {
            Ok(Some(value as u64))
        } else {
            Err(E::custom(format!(
                "{} must be a non-negative whole number (found {value})",
                self.field
            )))
        }
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        trimmed.parse::<u64>().map(Some).map_err(|_| {
            E::custom(format!(
                "{} must be a non-negative whole number (found '{value}')",
                self.field
            ))
        })
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_any(self)
    }
}

fn bounded<'de, D>(deserializer: D, field: &'static str, max: u64) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    match deserializer.deserialize_any(WholeNumber { field })? {
        Some(value) if value > max => Err(de::Error::custom(format!(
            "{field} must be at most {max} (found {value})"
        ))),
        other => Ok(other),
    }
}

fn required<'de, D>(deserializer: D, field: &'static str, max: u64) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    bounded(deserializer, field, max)?
        .ok_or_else(|| de::Error::custom(format!("{field} is required")))
}

pub(crate) fn gestation_weeks<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    required(deserializer, "gestation_weeks", MAX_GESTATION_WEEKS).map(|weeks| weeks as u8)
}

pub(crate) fn systolic_bp<'de, D>(deserializer: D) -> Result<u16, D::Error>
where
    D: Deserializer<'de>,
{
    required(deserializer, "systolic_bp", u16::MAX as u64).map(|value| value as u16)
}

pub(crate) fn diastolic_bp<'de, D>(deserializer: D) -> Result<u16, D::Error>
where
    D: Deserializer<'de>,
{
    required(deserializer, "diastolic_bp", u16::MAX as u64).map(|value| value as u16)
}

/// Absent, null, or blank readings default to a negative dipstick.
pub(crate) fn urine_protein<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    bounded(deserializer, "urine_protein", u8::MAX as u64)
        .map(|value| value.map_or(0, |protein| protein as u8))
}

pub(crate) fn patient_id<'de, D>(deserializer: D) -> Result<PatientId, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(de::Error::custom("patient_id must not be empty"));
    }
    Ok(PatientId(trimmed.to_string()))
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    opt.filter(|value| !value.trim().is_empty())
        .map(|value| parse_date(&value).map_err(de::Error::custom))
        .transpose()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TokenList {
    Many(Vec<String>),
    Joined(String),
}

/// Lowercased, trimmed set of free-form tokens; a single string is split on `,` or `;`.
pub(crate) fn tokens<'de, D>(deserializer: D) -> Result<BTreeSet<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<TokenList>::deserialize(deserializer)?;
    let values = match raw {
        None => Vec::new(),
        Some(TokenList::Many(values)) => values,
        Some(TokenList::Joined(joined)) => joined
            .split([',', ';'])
            .map(str::to_string)
            .collect(),
    };

    Ok(values
        .iter()
        .map(|value| value.trim().to_lowercase())
        .filter(|value| !value.is_empty())
        .collect())
}
