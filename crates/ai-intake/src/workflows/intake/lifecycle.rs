use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::IntakeRecord;

/// Lifecycle of an intake. Only `draft -> submitted` is implemented; the review states are
/// reserved labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntakeStatus {
    Draft,
    Submitted,
    UnderReview,
    Completed,
}

impl IntakeStatus {
    pub const fn label(self) -> &'static str {
        match self {
            IntakeStatus::Draft => "draft",
            IntakeStatus::Submitted => "submitted",
            IntakeStatus::UnderReview => "under_review",
            IntakeStatus::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LifecycleError {
    #[error("only draft intakes can be submitted (current status: {})", .0.label())]
    NotDraft(IntakeStatus),
}

/// Moves a draft to `submitted` and stamps the submission time.
pub fn submit(record: &mut IntakeRecord, now: DateTime<Utc>) -> Result<(), LifecycleError> {
    if record.status != IntakeStatus::Draft {
        return Err(LifecycleError::NotDraft(record.status));
    }

    record.status = IntakeStatus::Submitted;
    record.submitted_at = Some(now);
    record.updated_at = now;
    Ok(())
}
