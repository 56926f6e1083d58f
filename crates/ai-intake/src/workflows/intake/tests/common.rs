use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::workflows::intake::domain::{IntakeId, IntakeRecord};
use crate::workflows::intake::entries::{Rating, RiskFindingDraft};
use crate::workflows::intake::repository::{IntakeRepository, RepositoryError};
use crate::workflows::intake::service::{IntakePolicy, IntakeService, NewIntake};
use crate::workflows::intake::update::IntakeSectionUpdate;

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) records: Arc<Mutex<HashMap<IntakeId, IntakeRecord>>>,
}

impl IntakeRepository for MemoryRepository {
    fn insert(&self, record: IntakeRecord) -> Result<IntakeRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id, record.clone());
        Ok(record)
    }

    fn update(&self, record: IntakeRecord) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let stored = guard.get(&record.id).ok_or(RepositoryError::NotFound)?;
        if stored.revision + 1 != record.revision {
            return Err(RepositoryError::RevisionMismatch {
                stored: stored.revision,
                attempted: record.revision,
            });
        }
        guard.insert(record.id, record);
        Ok(())
    }

    fn fetch(&self, id: &IntakeId) -> Result<Option<IntakeRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn list(&self) -> Result<Vec<IntakeRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.values().cloned().collect())
    }

    fn delete(&self, id: &IntakeId) -> Result<bool, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.remove(id).is_some())
    }
}

impl MemoryRepository {
    /// Simulates another writer persisting the record.
    pub(super) fn bump_revision(&self, id: &IntakeId) {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if let Some(record) = guard.get_mut(id) {
            record.revision += 1;
        }
    }
}

/// Once `race` is set, every fetch is followed by another writer's save.
#[derive(Default)]
pub(super) struct RacingRepository {
    pub(super) inner: MemoryRepository,
    pub(super) race: AtomicBool,
}

impl IntakeRepository for RacingRepository {
    fn insert(&self, record: IntakeRecord) -> Result<IntakeRecord, RepositoryError> {
        self.inner.insert(record)
    }

    fn update(&self, record: IntakeRecord) -> Result<(), RepositoryError> {
        self.inner.update(record)
    }

    fn fetch(&self, id: &IntakeId) -> Result<Option<IntakeRecord>, RepositoryError> {
        let fetched = self.inner.fetch(id)?;
        if self.race.load(Ordering::SeqCst) {
            self.inner.bump_revision(id);
        }
        Ok(fetched)
    }

    fn list(&self) -> Result<Vec<IntakeRecord>, RepositoryError> {
        self.inner.list()
    }

    fn delete(&self, id: &IntakeId) -> Result<bool, RepositoryError> {
        self.inner.delete(id)
    }
}

pub(super) struct UnavailableRepository;

impl IntakeRepository for UnavailableRepository {
    fn insert(&self, _record: IntakeRecord) -> Result<IntakeRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _record: IntakeRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &IntakeId) -> Result<Option<IntakeRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list(&self) -> Result<Vec<IntakeRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn delete(&self, _id: &IntakeId) -> Result<bool, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) fn build_service() -> (IntakeService<MemoryRepository>, Arc<MemoryRepository>) {
    build_service_with(IntakePolicy::default())
}

pub(super) fn build_service_with(
    policy: IntakePolicy,
) -> (IntakeService<MemoryRepository>, Arc<MemoryRepository>) {
    let repository = Arc::new(MemoryRepository::default());
    let service = IntakeService::new(repository.clone(), policy);
    (service, repository)
}

pub(super) fn new_intake() -> NewIntake {
    NewIntake {
        system_name: "Claims Triage Assistant".to_string(),
        business_owner: Some("Priya Raman".to_string()),
        business_owner_email: Some("priya.raman@example.com".to_string()),
    }
}

pub(super) fn update_from(json: &str) -> IntakeSectionUpdate {
    serde_json::from_str(json).expect("update payload parses")
}

pub(super) fn finding() -> RiskFindingDraft {
    RiskFindingDraft {
        title: "Biased claim prioritization".to_string(),
        description: Some("Historic claims skew toward certain zip codes".to_string()),
        likelihood: Rating::Medium,
        impact: Rating::High,
        mitigation: Some("Quarterly fairness audit".to_string()),
        mitigation_status: Default::default(),
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
