//! Governance intake wizard: ten disclosure sections filled in by autosave, with derived
//! risk tier and per-section completion.
//!
//! The derivations (`completion`, `update::merge`, `lifecycle::submit`, and the shared
//! risk engine) are pure functions over an `IntakeRecord`. The service layer owns loading,
//! versioning, and persistence around them. `version` tracks section content for
//! client-side stale checks; `revision` guards every write against lost updates.

pub mod completion;
pub mod domain;
pub mod entries;
pub mod lifecycle;
pub mod repository;
pub mod router;
pub mod service;
pub mod update;

#[cfg(test)]
mod tests;

pub use completion::{completion, section_complete, SectionCompletion};
pub use domain::{
    DecisionClassification, IntakeId, IntakeRecord, InvalidSection, ReadinessStatus, Section,
};
pub use entries::{
    ActionItem, ActionItemDraft, ActionItemPatch, ActionStatus, ArtifactStatus, EntryId,
    MitigationStatus, Rating, RequiredArtifact, RequiredArtifactDraft, RequiredArtifactPatch,
    RiskFinding, RiskFindingDraft, RiskFindingPatch,
};
pub use lifecycle::{IntakeStatus, LifecycleError};
pub use repository::{
    AutosaveReceipt, IntakeQuery, IntakeRepository, IntakeSummary, RepositoryError,
    SubmissionReceipt,
};
pub use router::intake_router;
pub use service::{IntakePolicy, IntakeService, IntakeServiceError, NewIntake};
pub use update::{
    merge, DataSensitivityUpdate, IntakeSectionUpdate, InventoryUpdate, MergeReport,
    OwnershipUpdate,
};
