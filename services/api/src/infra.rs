use ai_intake::workflows::intake::{
    IntakeId, IntakePolicy, IntakeRecord, IntakeRepository, IntakeService, RepositoryError,
};
use ai_intake::workflows::registry::{UseCase, UseCaseId, UseCaseRegistry, UseCaseRepository};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type IntakeHandle = Arc<IntakeService<InMemoryIntakeRepository>>;
pub(crate) type RegistryHandle = Arc<UseCaseRegistry<InMemoryUseCaseRepository>>;

/// Both stores, shared with the dashboard rollup.
#[derive(Clone)]
pub(crate) struct Workspace {
    pub(crate) intakes: IntakeHandle,
    pub(crate) registry: RegistryHandle,
}

impl Workspace {
    pub(crate) fn in_memory(policy: IntakePolicy) -> Self {
        let page_limit = policy.page_limit;
        Self {
            intakes: Arc::new(IntakeService::new(
                Arc::new(InMemoryIntakeRepository::default()),
                policy,
            )),
            registry: Arc::new(UseCaseRegistry::new(
                Arc::new(InMemoryUseCaseRepository::default()),
                page_limit,
            )),
        }
    }
}

/// Versioned in-memory store; `update` only lands on top of the revision it was read from.
#[derive(Default, Clone)]
pub(crate) struct InMemoryIntakeRepository {
    records: Arc<Mutex<HashMap<IntakeId, IntakeRecord>>>,
}

impl IntakeRepository for InMemoryIntakeRepository {
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

#[derive(Default, Clone)]
pub(crate) struct InMemoryUseCaseRepository {
    records: Arc<Mutex<HashMap<UseCaseId, UseCase>>>,
}

impl UseCaseRepository for InMemoryUseCaseRepository {
    fn insert(&self, use_case: UseCase) -> Result<UseCase, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&use_case.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(use_case.id, use_case.clone());
        Ok(use_case)
    }

    fn update(&self, use_case: UseCase) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&use_case.id) {
            guard.insert(use_case.id, use_case);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch(&self, id: &UseCaseId) -> Result<Option<UseCase>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn list(&self) -> Result<Vec<UseCase>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.values().cloned().collect())
    }

    fn delete(&self, id: &UseCaseId) -> Result<bool, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.remove(id).is_some())
    }
}
