use serde::{Deserialize, Serialize};

/// Hypertension risk tier derived from the additive score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
    Critical,
}

const CRITICAL_THRESHOLD: u32 = 6;
const HIGH_THRESHOLD: u32 = 4;
const MODERATE_THRESHOLD: u32 = 2;

impl RiskLevel {
    pub const fn ordered() -> [Self; 4] {
        [Self::Low, Self::Moderate, Self::High, Self::Critical]
    }

    /// Thresholds are inclusive lower bounds, checked from the top.
    pub const fn from_score(score: u32) -> Self {
        if score >= CRITICAL_THRESHOLD {
            Self::Critical
        } else if score >= HIGH_THRESHOLD {
            Self::High
        } else if score >= MODERATE_THRESHOLD {
            Self::Moderate
        } else {
            Self::Low
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "Low Risk",
            Self::Moderate => "Moderate Risk",
            Self::High => "High Risk",
            Self::Critical => "Critical Risk - Refer Immediately",
        }
    }

    pub const fn recommendation(self) -> &'static str {
        match self {
            Self::Low => "Routine antenatal care",
            Self::Moderate => "Close monitoring, repeat tests in 1 week",
            Self::High => "Urgent review within 24 hours",
            Self::Critical => "IMMEDIATE REFERRAL to specialist care",
        }
    }

    pub const fn requires_alert(self) -> bool {
        matches!(self, Self::High | Self::Critical)
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ordered()
            .into_iter()
            .find(|level| level.label().eq_ignore_ascii_case(label.trim()))
    }
}

/// Serde adapter writing a [`RiskLevel`] as its display label.
pub(crate) mod display_label {
    use super::RiskLevel;
    use serde::{Deserialize, Deserializer, Serializer};

    pub(crate) fn serialize<S>(level: &RiskLevel, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(level.label())
    }

    pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<RiskLevel, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        RiskLevel::from_label(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown risk level '{raw}'")))
    }
}
