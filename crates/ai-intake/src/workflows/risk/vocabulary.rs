use serde::{Deserialize, Serialize};

/// Data types that put an AI system in the high-risk band on their own.
pub const HIGH_SENSITIVITY_DATA_TYPES: &[&str] = &[
    "pii",
    "personal data",
    "health data",
    "financial data",
    "biometric",
    "biometric data",
    "location data",
    "genetic data",
];

pub const MEDIUM_SENSITIVITY_DATA_TYPES: &[&str] = &[
    "customer data",
    "employee data",
    "usage data",
    "behavioral data",
];

/// Listed for intake forms and reports; contributes nothing to the score.
pub const LOW_SENSITIVITY_DATA_TYPES: &[&str] = &[
    "public data",
    "aggregated data",
    "product data",
    "internal documents",
];

/// Residency labels that raise the risk score.
pub const ELEVATED_RESIDENCIES: &[&str] = &["international", "multi-region", "unknown"];

/// Sensitivity band a data-type label belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSensitivity {
    Low,
    Medium,
    High,
}

impl DataSensitivity {
    /// Exact, case-insensitive membership lookup. Labels outside the vocabulary return `None`.
    pub fn classify(label: &str) -> Option<Self> {
        let normalized = normalize_label(label);
        let normalized = normalized.as_str();
        if HIGH_SENSITIVITY_DATA_TYPES.contains(&normalized) {
            Some(Self::High)
        } else if MEDIUM_SENSITIVITY_DATA_TYPES.contains(&normalized) {
            Some(Self::Medium)
        } else if LOW_SENSITIVITY_DATA_TYPES.contains(&normalized) {
            Some(Self::Low)
        } else {
            None
        }
    }

    pub const fn weight(self) -> u8 {
        match self {
            DataSensitivity::High => 3,
            DataSensitivity::Medium => 1,
            DataSensitivity::Low => 0,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            DataSensitivity::High => "high",
            DataSensitivity::Medium => "medium",
            DataSensitivity::Low => "low",
        }
    }
}

pub fn is_elevated_residency(residency: &str) -> bool {
    ELEVATED_RESIDENCIES.contains(&residency.to_lowercase().as_str())
}

pub(crate) fn normalize_label(label: &str) -> String {
    label.to_lowercase()
}
