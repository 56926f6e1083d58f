use chrono::{DateTime, Utc};
use serde::Serialize;

use super::completion::SectionCompletion;
use super::domain::{IntakeId, IntakeRecord, ReadinessStatus, Section};
use super::lifecycle::IntakeStatus;
use crate::workflows::risk::RiskTier;

/// Storage abstraction so the service module can be exercised in isolation.
///
/// `update` is a compare-and-swap: the record passed in carries the next revision, and the
/// store accepts it only when its own copy is exactly one revision behind.
pub trait IntakeRepository: Send + Sync {
    fn insert(&self, record: IntakeRecord) -> Result<IntakeRecord, RepositoryError>;
    fn update(&self, record: IntakeRecord) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &IntakeId) -> Result<Option<IntakeRecord>, RepositoryError>;
    fn list(&self) -> Result<Vec<IntakeRecord>, RepositoryError>;
    fn delete(&self, id: &IntakeId) -> Result<bool, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record revision {attempted} does not follow stored revision {stored}")]
    RevisionMismatch { stored: u64, attempted: u64 },
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Row shown in intake listings.
#[derive(Debug, Clone, Serialize)]
pub struct IntakeSummary {
    pub id: IntakeId,
    pub version: u64,
    pub system_name: String,
    pub status: &'static str,
    pub risk_tier: Option<RiskTier>,
    pub readiness_status: Option<ReadinessStatus>,
    pub current_step: Section,
    pub completed_sections: usize,
    pub updated_at: DateTime<Utc>,
}

impl IntakeRecord {
    pub fn summary(&self) -> IntakeSummary {
        IntakeSummary {
            id: self.id,
            version: self.version,
            system_name: self.inventory.system_name.clone(),
            status: self.status.label(),
            risk_tier: self.risk_tier,
            readiness_status: self.readiness.readiness_status,
            current_step: self.current_step,
            completed_sections: self.section_completion.completed_count(),
            updated_at: self.updated_at,
        }
    }
}

/// Response body for a successful autosave.
#[derive(Debug, Clone, Serialize)]
pub struct AutosaveReceipt {
    pub status: &'static str,
    pub last_saved: DateTime<Utc>,
    pub version: u64,
    pub risk_tier: Option<RiskTier>,
    pub section_completion: SectionCompletion,
}

/// Response body for a successful submission.
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionReceipt {
    pub status: &'static str,
    pub intake_id: IntakeId,
    pub submitted_at: DateTime<Utc>,
}

/// Filter and paging for intake listings.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct IntakeQuery {
    pub status: Option<IntakeStatus>,
    #[serde(default)]
    pub skip: usize,
    pub limit: Option<usize>,
}
