use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::completion::{completion, SectionCompletion};
use super::entries::{ActionItem, RequiredArtifact, RiskFinding};
use super::lifecycle::IntakeStatus;
use crate::workflows::risk::{ExternalSharing, RiskInput, RiskTier};

/// Identifier wrapper for intake records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IntakeId(pub u64);

impl fmt::Display for IntakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The ten disclosure sections, in wizard order. Serialized as their 1-based index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Section {
    Inventory = 1,
    DecisionImpact = 2,
    DataSensitivity = 3,
    Ownership = 4,
    Regulatory = 5,
    Monitoring = 6,
    RiskFindings = 7,
    Artifacts = 8,
    Readiness = 9,
    Actions = 10,
}

impl Section {
    pub const ALL: [Section; 10] = [
        Section::Inventory,
        Section::DecisionImpact,
        Section::DataSensitivity,
        Section::Ownership,
        Section::Regulatory,
        Section::Monitoring,
        Section::RiskFindings,
        Section::Artifacts,
        Section::Readiness,
        Section::Actions,
    ];

    pub const fn index(self) -> u8 {
        self as u8
    }

    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|section| section.index() == index)
    }

    pub const fn title(self) -> &'static str {
        match self {
            Section::Inventory => "AI system inventory",
            Section::DecisionImpact => "Decision impact",
            Section::DataSensitivity => "Data sensitivity",
            Section::Ownership => "Ownership & accountability",
            Section::Regulatory => "Regulatory considerations",
            Section::Monitoring => "Monitoring & oversight",
            Section::RiskFindings => "Risk findings",
            Section::Artifacts => "Required artifacts",
            Section::Readiness => "Readiness determination",
            Section::Actions => "Action items",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}. {}", self.index(), self.title())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("section index must be between 1 and 10, found {0}")]
pub struct InvalidSection(pub u8);

impl TryFrom<u8> for Section {
    type Error = InvalidSection;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Section::from_index(value).ok_or(InvalidSection(value))
    }
}

impl From<Section> for u8 {
    fn from(section: Section) -> Self {
        section.index()
    }
}

/// How strongly the system's output drives decisions about people.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionClassification {
    Informational,
    DecisionSupport,
    ConsequentialDecision,
    FullyAutomated,
}

/// Readiness determination recorded in section 9.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadinessStatus {
    Approved,
    Conditional,
    NotReady,
}

impl ReadinessStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ReadinessStatus::Approved => "approved",
            ReadinessStatus::Conditional => "conditional",
            ReadinessStatus::NotReady => "not_ready",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventorySection {
    pub system_name: String,
    pub business_purpose: Option<String>,
    pub business_unit: Option<String>,
    pub vendor: Option<String>,
    pub model_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionImpactSection {
    pub decision_classification: Option<DecisionClassification>,
    pub affected_parties: Vec<String>,
    pub human_oversight: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSensitivitySection {
    pub approved_data_types: Vec<String>,
    pub prohibited_data_types: Vec<String>,
    pub data_residency: Option<String>,
    pub external_sharing: Option<ExternalSharing>,
    pub retention_period: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnershipSection {
    pub approving_authority: Option<String>,
    pub business_owner: Option<String>,
    pub business_owner_email: Option<String>,
    pub technical_owner: Option<String>,
    pub technical_owner_email: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegulatorySection {
    pub applicable_regulations: Vec<String>,
    pub regulatory_notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitoringSection {
    pub monitoring_plan: Option<String>,
    pub performance_metrics: Vec<String>,
    pub incident_contact: Option<String>,
    pub review_cadence: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskReviewSection {
    pub residual_risk_summary: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactReviewSection {
    pub artifact_notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadinessSection {
    pub readiness_status: Option<ReadinessStatus>,
    pub readiness_rationale: Option<String>,
    pub conditions: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionPlanSection {
    pub action_plan_notes: Option<String>,
}

/// One AI system's governance disclosure, filled in section by section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntakeRecord {
    pub id: IntakeId,
    /// Section content version. Only autosaves bump it; `expected_version` is checked
    /// against it.
    pub version: u64,
    /// Storage revision, bumped on every persisted write. The repository's
    /// compare-and-swap runs on this counter.
    pub revision: u64,
    pub status: IntakeStatus,
    pub current_step: Section,
    pub section_completion: SectionCompletion,
    pub risk_tier: Option<RiskTier>,
    pub identified_gaps: Vec<String>,

    pub inventory: InventorySection,
    pub decision_impact: DecisionImpactSection,
    pub data_sensitivity: DataSensitivitySection,
    pub ownership: OwnershipSection,
    pub regulatory: RegulatorySection,
    pub monitoring: MonitoringSection,
    pub risk_review: RiskReviewSection,
    pub artifact_review: ArtifactReviewSection,
    pub readiness: ReadinessSection,
    pub action_plan: ActionPlanSection,

    pub risk_findings: Vec<RiskFinding>,
    pub required_artifacts: Vec<RequiredArtifact>,
    pub action_items: Vec<ActionItem>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_autosave_at: Option<DateTime<Utc>>,
    pub submitted_at: Option<DateTime<Utc>>,
}

impl IntakeRecord {
    /// Fresh draft positioned on the first section, with completion already evaluated.
    pub fn new(id: IntakeId, system_name: impl Into<String>, now: DateTime<Utc>) -> Self {
        let mut record = Self {
            id,
            version: 1,
            revision: 1,
            status: IntakeStatus::Draft,
            current_step: Section::Inventory,
            section_completion: SectionCompletion::default(),
            risk_tier: None,
            identified_gaps: Vec::new(),
            inventory: InventorySection {
                system_name: system_name.into(),
                ..InventorySection::default()
            },
            decision_impact: DecisionImpactSection::default(),
            data_sensitivity: DataSensitivitySection::default(),
            ownership: OwnershipSection::default(),
            regulatory: RegulatorySection::default(),
            monitoring: MonitoringSection::default(),
            risk_review: RiskReviewSection::default(),
            artifact_review: ArtifactReviewSection::default(),
            readiness: ReadinessSection::default(),
            action_plan: ActionPlanSection::default(),
            risk_findings: Vec::new(),
            required_artifacts: Vec::new(),
            action_items: Vec::new(),
            created_at: now,
            updated_at: now,
            last_autosave_at: None,
            submitted_at: None,
        };
        record.refresh_completion();
        record
    }

    /// Scoring input built from the data-sensitivity section. Approved data types are the
    /// ones the system processes; prohibited types never reach the scorer.
    pub fn risk_input(&self) -> RiskInput {
        let data = &self.data_sensitivity;
        RiskInput::new(
            &data.approved_data_types,
            data.data_residency.clone().unwrap_or_default(),
            data.external_sharing.unwrap_or_default(),
        )
    }

    pub fn refresh_completion(&mut self) {
        self.section_completion = completion(self);
    }
}
