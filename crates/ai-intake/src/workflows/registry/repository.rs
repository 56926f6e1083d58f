use serde::Deserialize;

use super::domain::{UseCase, UseCaseId};
use crate::workflows::intake::RepositoryError;

/// Storage abstraction for registered use cases.
pub trait UseCaseRepository: Send + Sync {
    fn insert(&self, use_case: UseCase) -> Result<UseCase, RepositoryError>;
    fn update(&self, use_case: UseCase) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &UseCaseId) -> Result<Option<UseCase>, RepositoryError>;
    fn list(&self) -> Result<Vec<UseCase>, RepositoryError>;
    fn delete(&self, id: &UseCaseId) -> Result<bool, RepositoryError>;
}

/// Paging for registry listings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UseCaseQuery {
    #[serde(default)]
    pub skip: usize,
    pub limit: Option<usize>,
}
