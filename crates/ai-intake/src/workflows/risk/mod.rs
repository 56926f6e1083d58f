//! Data-handling risk tiering shared by intake records and the use-case registry.
//!
//! Scoring is a weighted rule table over three inputs: the declared data types, where the
//! data resides, and whether it leaves the organization. The engine is pure and total;
//! labels outside the vocabulary simply do not match any rule.

mod rules;
pub mod vocabulary;

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

pub use vocabulary::DataSensitivity;

/// Derived data-handling risk classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl RiskTier {
    pub const fn from_score(score: u8) -> Self {
        match score {
            0 => RiskTier::Low,
            1 | 2 => RiskTier::Medium,
            _ => RiskTier::High,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            RiskTier::Low => "low",
            RiskTier::Medium => "medium",
            RiskTier::High => "high",
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Whether data processed by the system is shared outside the organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExternalSharing {
    Yes,
    #[default]
    No,
}

impl ExternalSharing {
    pub const fn label(self) -> &'static str {
        match self {
            ExternalSharing::Yes => "yes",
            ExternalSharing::No => "no",
        }
    }
}

impl fmt::Display for ExternalSharing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("external sharing must be 'yes' or 'no', found '{0}'")]
pub struct ParseExternalSharingError(pub String);

impl FromStr for ExternalSharing {
    type Err = ParseExternalSharingError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "yes" => Ok(ExternalSharing::Yes),
            "no" => Ok(ExternalSharing::No),
            _ => Err(ParseExternalSharingError(value.to_string())),
        }
    }
}

impl<'de> Deserialize<'de> for ExternalSharing {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Immutable scoring input, derived on demand from a record and discarded afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RiskInput {
    data_types: BTreeSet<String>,
    residency: String,
    external_sharing: ExternalSharing,
}

impl RiskInput {
    pub fn new<I, S>(data_types: I, residency: impl Into<String>, external_sharing: ExternalSharing) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            data_types: data_types
                .into_iter()
                .map(|label| vocabulary::normalize_label(label.as_ref()))
                .collect(),
            residency: residency.into(),
            external_sharing,
        }
    }

    /// Normalized (lowercase) data-type labels.
    pub fn data_types(&self) -> impl Iterator<Item = &str> {
        self.data_types.iter().map(String::as_str)
    }

    pub fn residency(&self) -> &str {
        &self.residency
    }

    pub fn external_sharing(&self) -> ExternalSharing {
        self.external_sharing
    }

    /// Labels that fall outside every sensitivity band. Callers log these as a data-quality signal.
    pub fn unmatched_data_types(&self) -> Vec<&str> {
        self.data_types()
            .filter(|label| DataSensitivity::classify(label).is_none())
            .collect()
    }
}

/// Rule that contributed to a risk score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskFactor {
    HighSensitivityData,
    MediumSensitivityData,
    ElevatedResidency,
    ExternalSharing,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreComponent {
    pub factor: RiskFactor,
    pub weight: u8,
    pub notes: String,
}

/// Score, tier, and the rules that fired, for audit trails and CLI output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub tier: RiskTier,
    pub score: u8,
    pub components: Vec<ScoreComponent>,
}

pub fn assess(input: &RiskInput) -> RiskAssessment {
    let (components, score) = rules::score_input(input);
    RiskAssessment {
        tier: RiskTier::from_score(score),
        score,
        components,
    }
}

pub fn tier<I, S>(data_types: I, residency: &str, external_sharing: ExternalSharing) -> RiskTier
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    assess(&RiskInput::new(data_types, residency, external_sharing)).tier
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(data_types: &[&str], residency: &str, sharing: ExternalSharing) -> u8 {
        assess(&RiskInput::new(data_types, residency, sharing)).score
    }

    #[test]
    fn boundary_table_matches_documented_tiers() {
        let empty: [&str; 0] = [];
        assert_eq!(tier(["pii"], "us", ExternalSharing::No), RiskTier::High);
        assert_eq!(
            tier(["customer data"], "us", ExternalSharing::No),
            RiskTier::Medium
        );
        assert_eq!(tier(["public data"], "us", ExternalSharing::No), RiskTier::Low);
        assert_eq!(
            tier(empty, "international", ExternalSharing::No),
            RiskTier::Medium
        );
        assert_eq!(tier(empty, "us", ExternalSharing::Yes), RiskTier::Medium);
        assert_eq!(
            tier(["pii"], "international", ExternalSharing::Yes),
            RiskTier::High
        );
        assert_eq!(score(&["pii"], "international", ExternalSharing::Yes), 7);
    }

    #[test]
    fn multiple_high_sensitivity_labels_count_once() {
        let many = score(
            &["pii", "personal data", "health data"],
            "us",
            ExternalSharing::No,
        );
        assert_eq!(many, 3);
        assert_eq!(many, score(&["pii"], "us", ExternalSharing::No));
    }

    #[test]
    fn high_and_medium_bands_both_contribute() {
        let assessment = assess(&RiskInput::new(
            ["Health Data", "Employee Data"],
            "us",
            ExternalSharing::No,
        ));
        assert_eq!(assessment.score, 4);
        assert_eq!(assessment.components.len(), 2);
        assert_eq!(assessment.tier, RiskTier::High);
    }

    #[test]
    fn maximum_score_is_eight() {
        assert_eq!(
            score(
                &["pii", "usage data"],
                "multi-region",
                ExternalSharing::Yes
            ),
            8
        );
    }

    #[test]
    fn unknown_labels_are_silent_non_matches() {
        let input = RiskInput::new(["PII", "telemetry blobs"], "Mars", ExternalSharing::No);
        assert_eq!(input.unmatched_data_types(), vec!["telemetry blobs"]);
        assert_eq!(assess(&input).score, 3);
    }

    #[test]
    fn tiers_follow_score_thresholds() {
        assert_eq!(RiskTier::from_score(0), RiskTier::Low);
        assert_eq!(RiskTier::from_score(1), RiskTier::Medium);
        assert_eq!(RiskTier::from_score(2), RiskTier::Medium);
        assert_eq!(RiskTier::from_score(3), RiskTier::High);
        assert_eq!(RiskTier::from_score(8), RiskTier::High);
    }

    #[test]
    fn external_sharing_parses_case_insensitively() {
        assert_eq!("YES".parse::<ExternalSharing>(), Ok(ExternalSharing::Yes));
        assert_eq!("No".parse::<ExternalSharing>(), Ok(ExternalSharing::No));
        assert!("maybe".parse::<ExternalSharing>().is_err());

        let parsed: ExternalSharing = serde_json::from_str("\"Yes\"").expect("deserializes");
        assert_eq!(parsed, ExternalSharing::Yes);
    }

    #[test]
    fn padded_external_sharing_is_rejected() {
        assert_eq!(
            " yes ".parse::<ExternalSharing>(),
            Err(ParseExternalSharingError(" yes ".to_string()))
        );
        assert!(serde_json::from_str::<ExternalSharing>("\" no\"").is_err());
    }

    #[test]
    fn assessment_is_deterministic() {
        let input = RiskInput::new(["pii", "usage data"], "eu", ExternalSharing::Yes);
        assert_eq!(assess(&input), assess(&input));
    }
}
