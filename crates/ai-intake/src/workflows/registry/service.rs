use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use super::domain::{UseCase, UseCaseDraft, UseCaseId, UseCasePatch, UseCaseValidationError};
use super::repository::{UseCaseQuery, UseCaseRepository};
use crate::workflows::intake::RepositoryError;

static USE_CASE_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_use_case_id() -> UseCaseId {
    UseCaseId(USE_CASE_SEQUENCE.fetch_add(1, Ordering::Relaxed))
}

/// Flat registry of AI use cases, each carrying its own derived risk tier.
pub struct UseCaseRegistry<R> {
    repository: Arc<R>,
    page_limit: usize,
}

impl<R> UseCaseRegistry<R>
where
    R: UseCaseRepository + 'static,
{
    pub fn new(repository: Arc<R>, page_limit: usize) -> Self {
        Self {
            repository,
            page_limit: page_limit.max(1),
        }
    }

    pub fn create(&self, draft: UseCaseDraft) -> Result<UseCase, RegistryError> {
        draft.validate()?;
        for label in draft.risk_input().unmatched_data_types() {
            warn!(title = %draft.title, label, "data type label matched no sensitivity class");
        }

        let use_case = UseCase::from_draft(next_use_case_id(), draft, Utc::now());
        let stored = self.repository.insert(use_case)?;
        info!(
            use_case_id = %stored.id,
            tier = %stored.risk_tier,
            "use case registered"
        );
        Ok(stored)
    }

    /// Insertion order, paged. The limit is capped by the configured page limit.
    pub fn list(&self, query: &UseCaseQuery) -> Result<Vec<UseCase>, RegistryError> {
        let limit = query
            .limit
            .unwrap_or(self.page_limit)
            .min(self.page_limit);
        let mut use_cases = self.repository.list()?;
        use_cases.sort_by_key(|use_case| use_case.id);
        Ok(use_cases.into_iter().skip(query.skip).take(limit).collect())
    }

    pub fn all(&self) -> Result<Vec<UseCase>, RegistryError> {
        Ok(self.repository.list()?)
    }

    pub fn get(&self, id: &UseCaseId) -> Result<UseCase, RegistryError> {
        self.repository
            .fetch(id)?
            .ok_or(RegistryError::NotFound(*id))
    }

    pub fn update(&self, id: &UseCaseId, patch: &UseCasePatch) -> Result<UseCase, RegistryError> {
        patch.validate()?;
        let mut use_case = self.get(id)?;
        if patch.apply_to(&mut use_case, Utc::now()) {
            info!(use_case_id = %id, tier = %use_case.risk_tier, "use case tier recomputed");
        }
        self.repository
            .update(use_case.clone())
            .map_err(|error| match error {
                RepositoryError::NotFound => RegistryError::NotFound(*id),
                other => RegistryError::Repository(other),
            })?;
        Ok(use_case)
    }

    pub fn delete(&self, id: &UseCaseId) -> Result<(), RegistryError> {
        if !self.repository.delete(id)? {
            return Err(RegistryError::NotFound(*id));
        }
        info!(use_case_id = %id, "use case deleted");
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("use case {0} not found")]
    NotFound(UseCaseId),
    #[error(transparent)]
    Invalid(#[from] UseCaseValidationError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
