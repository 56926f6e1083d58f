//! Flat registry of AI use cases with a derived risk tier, plus bulk import from an
//! inventory CSV export.

pub mod domain;
pub mod import;
pub mod repository;
pub mod router;
pub mod service;

pub use domain::{
    ParseUseCaseStatusError, UseCase, UseCaseDraft, UseCaseId, UseCasePatch, UseCaseStatus,
    UseCaseValidationError,
};
pub use import::{import_inventory, import_inventory_from_path, InventoryImportError};
pub use repository::{UseCaseQuery, UseCaseRepository};
pub use router::registry_router;
pub use service::{RegistryError, UseCaseRegistry};
