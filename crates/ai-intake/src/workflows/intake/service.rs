use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::domain::{IntakeId, IntakeRecord, Section};
use super::entries::{
    ActionItem, ActionItemDraft, ActionItemPatch, EntryId, RequiredArtifact,
    RequiredArtifactDraft, RequiredArtifactPatch, RiskFinding, RiskFindingDraft,
    RiskFindingPatch,
};
use super::lifecycle::{self, IntakeStatus, LifecycleError};
use super::repository::{
    AutosaveReceipt, IntakeQuery, IntakeRepository, IntakeSummary, RepositoryError,
    SubmissionReceipt,
};
use super::update::{merge, IntakeSectionUpdate};
use crate::config::IntakeSettings;

const DEFAULT_PAGE_LIMIT: usize = 100;

/// Policy dials for the intake service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntakePolicy {
    /// Reject section and entry edits once an intake has left `draft`.
    pub lock_submitted: bool,
    pub page_limit: usize,
}

impl Default for IntakePolicy {
    fn default() -> Self {
        Self {
            lock_submitted: false,
            page_limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

impl From<&IntakeSettings> for IntakePolicy {
    fn from(settings: &IntakeSettings) -> Self {
        Self {
            lock_submitted: settings.lock_submitted,
            page_limit: if settings.page_limit == 0 {
                DEFAULT_PAGE_LIMIT
            } else {
                settings.page_limit
            },
        }
    }
}

/// Payload for opening a new intake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewIntake {
    #[serde(default)]
    pub system_name: String,
    #[serde(default)]
    pub business_owner: Option<String>,
    #[serde(default)]
    pub business_owner_email: Option<String>,
}

/// Service composing the repository with the merge, tiering, and lifecycle rules.
pub struct IntakeService<R> {
    repository: Arc<R>,
    policy: IntakePolicy,
}

static INTAKE_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static ENTRY_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_intake_id() -> IntakeId {
    IntakeId(INTAKE_SEQUENCE.fetch_add(1, Ordering::Relaxed))
}

fn next_entry_id() -> EntryId {
    EntryId(ENTRY_SEQUENCE.fetch_add(1, Ordering::Relaxed))
}

impl<R> IntakeService<R>
where
    R: IntakeRepository + 'static,
{
    pub fn new(repository: Arc<R>, policy: IntakePolicy) -> Self {
        Self { repository, policy }
    }

    pub fn policy(&self) -> &IntakePolicy {
        &self.policy
    }

    /// Open a draft positioned on section 1.
    pub fn create(&self, request: NewIntake) -> Result<IntakeRecord, IntakeServiceError> {
        let now = Utc::now();
        let mut record = IntakeRecord::new(next_intake_id(), request.system_name, now);
        record.ownership.business_owner = request.business_owner;
        record.ownership.business_owner_email = request.business_owner_email;

        let stored = self.repository.insert(record)?;
        info!(intake_id = %stored.id, system = %stored.inventory.system_name, "intake created");
        Ok(stored)
    }

    pub fn get(&self, id: &IntakeId) -> Result<IntakeRecord, IntakeServiceError> {
        self.repository
            .fetch(id)?
            .ok_or(IntakeServiceError::NotFound(*id))
    }

    /// Most recently updated first, optionally filtered by lifecycle status.
    pub fn list(&self, query: &IntakeQuery) -> Result<Vec<IntakeSummary>, IntakeServiceError> {
        let limit = query
            .limit
            .unwrap_or(self.policy.page_limit)
            .min(self.policy.page_limit);

        let mut records = self.repository.list()?;
        records.retain(|record| query.status.map_or(true, |status| record.status == status));
        records.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(b.id.cmp(&a.id)));

        Ok(records
            .iter()
            .skip(query.skip)
            .take(limit)
            .map(IntakeRecord::summary)
            .collect())
    }

    pub fn all(&self) -> Result<Vec<IntakeRecord>, IntakeServiceError> {
        Ok(self.repository.list()?)
    }

    /// Merge a sparse section update and persist the re-derived state.
    pub fn autosave(
        &self,
        id: &IntakeId,
        update: &IntakeSectionUpdate,
    ) -> Result<AutosaveReceipt, IntakeServiceError> {
        self.modify(id, Edit::Sections, |record, now| {
            if let Some(expected) = update.expected_version {
                if expected != record.version {
                    return Err(IntakeServiceError::StaleWrite {
                        expected,
                        current: record.version,
                    });
                }
            }
            record.version += 1;

            let report = merge(record, update, now);

            if let Some(assessment) = &report.risk {
                for label in record.risk_input().unmatched_data_types() {
                    warn!(
                        intake_id = %record.id,
                        label,
                        "data type label matched no sensitivity class"
                    );
                }
                info!(
                    intake_id = %record.id,
                    tier = %assessment.tier,
                    score = assessment.score,
                    "risk tier recomputed"
                );
            }
            debug!(
                intake_id = %record.id,
                version = record.version,
                completed = record.section_completion.completed_count(),
                "intake autosaved"
            );

            Ok(AutosaveReceipt {
                status: "saved",
                last_saved: now,
                version: record.version,
                risk_tier: record.risk_tier,
                section_completion: record.section_completion.clone(),
            })
        })
    }

    /// Move the wizard cursor without touching section content.
    pub fn visit_step(
        &self,
        id: &IntakeId,
        step: Section,
    ) -> Result<IntakeRecord, IntakeServiceError> {
        self.modify(id, Edit::Navigation, |record, _| {
            record.current_step = step;
            Ok(record.clone())
        })
    }

    pub fn submit(&self, id: &IntakeId) -> Result<SubmissionReceipt, IntakeServiceError> {
        let receipt = self.modify(id, Edit::Navigation, |record, now| {
            lifecycle::submit(record, now)?;
            Ok(SubmissionReceipt {
                status: IntakeStatus::Submitted.label(),
                intake_id: record.id,
                submitted_at: now,
            })
        })?;
        info!(intake_id = %id, "intake submitted");
        Ok(receipt)
    }

    pub fn delete(&self, id: &IntakeId) -> Result<(), IntakeServiceError> {
        if !self.repository.delete(id)? {
            return Err(IntakeServiceError::NotFound(*id));
        }
        info!(intake_id = %id, "intake deleted");
        Ok(())
    }

    pub fn risk_findings(&self, id: &IntakeId) -> Result<Vec<RiskFinding>, IntakeServiceError> {
        Ok(self.get(id)?.risk_findings)
    }

    /// Adding the first finding completes section 7.
    pub fn add_risk_finding(
        &self,
        id: &IntakeId,
        draft: RiskFindingDraft,
    ) -> Result<RiskFinding, IntakeServiceError> {
        self.modify(id, Edit::Entries, |record, now| {
            let finding = draft.into_finding(next_entry_id(), now);
            record.risk_findings.push(finding.clone());
            record.refresh_completion();
            Ok(finding)
        })
    }

    pub fn update_risk_finding(
        &self,
        id: &IntakeId,
        entry: EntryId,
        patch: &RiskFindingPatch,
    ) -> Result<RiskFinding, IntakeServiceError> {
        self.modify(id, Edit::Entries, |record, _| {
            let finding = record
                .risk_findings
                .iter_mut()
                .find(|finding| finding.id == entry)
                .ok_or(IntakeServiceError::EntryNotFound { intake: *id, entry })?;
            patch.apply_to(finding);
            Ok(finding.clone())
        })
    }

    pub fn remove_risk_finding(
        &self,
        id: &IntakeId,
        entry: EntryId,
    ) -> Result<(), IntakeServiceError> {
        self.modify(id, Edit::Entries, |record, _| {
            remove_entry(&mut record.risk_findings, |finding| finding.id == entry)
                .ok_or(IntakeServiceError::EntryNotFound { intake: *id, entry })?;
            record.refresh_completion();
            Ok(())
        })
    }

    pub fn required_artifacts(
        &self,
        id: &IntakeId,
    ) -> Result<Vec<RequiredArtifact>, IntakeServiceError> {
        Ok(self.get(id)?.required_artifacts)
    }

    pub fn add_required_artifact(
        &self,
        id: &IntakeId,
        draft: RequiredArtifactDraft,
    ) -> Result<RequiredArtifact, IntakeServiceError> {
        self.modify(id, Edit::Entries, |record, now| {
            let artifact = draft.into_artifact(next_entry_id(), now);
            record.required_artifacts.push(artifact.clone());
            Ok(artifact)
        })
    }

    pub fn update_required_artifact(
        &self,
        id: &IntakeId,
        entry: EntryId,
        patch: &RequiredArtifactPatch,
    ) -> Result<RequiredArtifact, IntakeServiceError> {
        self.modify(id, Edit::Entries, |record, _| {
            let artifact = record
                .required_artifacts
                .iter_mut()
                .find(|artifact| artifact.id == entry)
                .ok_or(IntakeServiceError::EntryNotFound { intake: *id, entry })?;
            patch.apply_to(artifact);
            Ok(artifact.clone())
        })
    }

    pub fn remove_required_artifact(
        &self,
        id: &IntakeId,
        entry: EntryId,
    ) -> Result<(), IntakeServiceError> {
        self.modify(id, Edit::Entries, |record, _| {
            remove_entry(&mut record.required_artifacts, |artifact| artifact.id == entry)
                .ok_or(IntakeServiceError::EntryNotFound { intake: *id, entry })?;
            Ok(())
        })
    }

    pub fn action_items(&self, id: &IntakeId) -> Result<Vec<ActionItem>, IntakeServiceError> {
        Ok(self.get(id)?.action_items)
    }

    pub fn add_action_item(
        &self,
        id: &IntakeId,
        draft: ActionItemDraft,
    ) -> Result<ActionItem, IntakeServiceError> {
        self.modify(id, Edit::Entries, |record, now| {
            let action = draft.into_action(next_entry_id(), now);
            record.action_items.push(action.clone());
            Ok(action)
        })
    }

    pub fn update_action_item(
        &self,
        id: &IntakeId,
        entry: EntryId,
        patch: &ActionItemPatch,
    ) -> Result<ActionItem, IntakeServiceError> {
        self.modify(id, Edit::Entries, |record, now| {
            let action = record
                .action_items
                .iter_mut()
                .find(|action| action.id == entry)
                .ok_or(IntakeServiceError::EntryNotFound { intake: *id, entry })?;
            patch.apply_to(action, now);
            Ok(action.clone())
        })
    }

    pub fn remove_action_item(
        &self,
        id: &IntakeId,
        entry: EntryId,
    ) -> Result<(), IntakeServiceError> {
        self.modify(id, Edit::Entries, |record, _| {
            remove_entry(&mut record.action_items, |action| action.id == entry)
                .ok_or(IntakeServiceError::EntryNotFound { intake: *id, entry })?;
            Ok(())
        })
    }

    /// Load, bump the revision, apply `change`, and persist. Nothing is written when
    /// `change` fails.
    fn modify<T, F>(&self, id: &IntakeId, edit: Edit, change: F) -> Result<T, IntakeServiceError>
    where
        F: FnOnce(&mut IntakeRecord, DateTime<Utc>) -> Result<T, IntakeServiceError>,
    {
        let mut record = self.get(id)?;

        if edit != Edit::Navigation
            && self.policy.lock_submitted
            && record.status != IntakeStatus::Draft
        {
            return Err(IntakeServiceError::Locked(*id));
        }

        let now = Utc::now();
        record.revision += 1;
        let outcome = change(&mut record, now)?;
        record.updated_at = now;

        self.repository.update(record).map_err(|error| match error {
            RepositoryError::RevisionMismatch { .. } => IntakeServiceError::ConcurrentWrite(*id),
            RepositoryError::NotFound => IntakeServiceError::NotFound(*id),
            other => IntakeServiceError::Repository(other),
        })?;

        Ok(outcome)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edit {
    /// Section content; bumps the client-visible version.
    Sections,
    /// Risk findings, artifacts, and action items.
    Entries,
    /// Cursor moves and lifecycle transitions.
    Navigation,
}

fn remove_entry<T>(entries: &mut Vec<T>, matches: impl Fn(&T) -> bool) -> Option<T> {
    let position = entries.iter().position(matches)?;
    Some(entries.remove(position))
}

/// Error raised by the intake service.
#[derive(Debug, thiserror::Error)]
pub enum IntakeServiceError {
    #[error("intake {0} not found")]
    NotFound(IntakeId),
    #[error("entry {entry} not found on intake {intake}")]
    EntryNotFound { intake: IntakeId, entry: EntryId },
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
    #[error("stale write: client saw version {expected}, current version is {current}")]
    StaleWrite { expected: u64, current: u64 },
    #[error("intake {0} was written concurrently; reload and retry")]
    ConcurrentWrite(IntakeId),
    #[error("intake {0} has been submitted and no longer accepts edits")]
    Locked(IntakeId),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
