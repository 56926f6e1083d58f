use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::workflows::risk::{self, ExternalSharing, RiskInput, RiskTier};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UseCaseId(pub u64);

impl fmt::Display for UseCaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Approval state of a registered use case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UseCaseStatus {
    #[default]
    Draft,
    Pending,
    Approved,
    Rejected,
}

impl UseCaseStatus {
    pub const fn label(self) -> &'static str {
        match self {
            UseCaseStatus::Draft => "draft",
            UseCaseStatus::Pending => "pending",
            UseCaseStatus::Approved => "approved",
            UseCaseStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for UseCaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("use case status must be draft, pending, approved, or rejected; found '{0}'")]
pub struct ParseUseCaseStatusError(pub String);

impl FromStr for UseCaseStatus {
    type Err = ParseUseCaseStatusError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "draft" => Ok(UseCaseStatus::Draft),
            "pending" => Ok(UseCaseStatus::Pending),
            "approved" => Ok(UseCaseStatus::Approved),
            "rejected" => Ok(UseCaseStatus::Rejected),
            _ => Err(ParseUseCaseStatusError(value.to_string())),
        }
    }
}

/// A required free-text field was blank.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("field '{0}' must not be empty")]
pub struct UseCaseValidationError(pub &'static str);

fn require(field: &'static str, value: &str) -> Result<(), UseCaseValidationError> {
    if value.trim().is_empty() {
        Err(UseCaseValidationError(field))
    } else {
        Ok(())
    }
}

/// Registration payload for a new use case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UseCaseDraft {
    pub title: String,
    pub owner: String,
    pub business_unit: String,
    pub purpose: String,
    pub model_type: String,
    pub vendor: String,
    #[serde(default)]
    pub data_types: Vec<String>,
    pub data_residency: String,
    pub external_sharing: ExternalSharing,
    #[serde(default)]
    pub status: UseCaseStatus,
}

impl UseCaseDraft {
    pub fn validate(&self) -> Result<(), UseCaseValidationError> {
        require("title", &self.title)?;
        require("owner", &self.owner)?;
        require("business_unit", &self.business_unit)?;
        require("purpose", &self.purpose)?;
        require("model_type", &self.model_type)?;
        require("vendor", &self.vendor)?;
        require("data_residency", &self.data_residency)
    }

    pub fn risk_input(&self) -> RiskInput {
        RiskInput::new(&self.data_types, &self.data_residency, self.external_sharing)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UseCase {
    pub id: UseCaseId,
    pub title: String,
    pub owner: String,
    pub business_unit: String,
    pub purpose: String,
    pub model_type: String,
    pub vendor: String,
    pub data_types: Vec<String>,
    pub data_residency: String,
    pub external_sharing: ExternalSharing,
    pub risk_tier: RiskTier,
    pub status: UseCaseStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UseCase {
    pub fn from_draft(id: UseCaseId, draft: UseCaseDraft, now: DateTime<Utc>) -> Self {
        let risk_tier = risk::assess(&draft.risk_input()).tier;
        Self {
            id,
            title: draft.title,
            owner: draft.owner,
            business_unit: draft.business_unit,
            purpose: draft.purpose,
            model_type: draft.model_type,
            vendor: draft.vendor,
            data_types: draft.data_types,
            data_residency: draft.data_residency,
            external_sharing: draft.external_sharing,
            risk_tier,
            status: draft.status,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn risk_input(&self) -> RiskInput {
        RiskInput::new(&self.data_types, &self.data_residency, self.external_sharing)
    }
}

/// Partial update. Every field is optional; none of them can be cleared.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UseCasePatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub business_unit: Option<String>,
    #[serde(default)]
    pub purpose: Option<String>,
    #[serde(default)]
    pub model_type: Option<String>,
    #[serde(default)]
    pub vendor: Option<String>,
    #[serde(default)]
    pub data_types: Option<Vec<String>>,
    #[serde(default)]
    pub data_residency: Option<String>,
    #[serde(default)]
    pub external_sharing: Option<ExternalSharing>,
    #[serde(default)]
    pub status: Option<UseCaseStatus>,
}

impl UseCasePatch {
    pub fn validate(&self) -> Result<(), UseCaseValidationError> {
        let fields = [
            ("title", &self.title),
            ("owner", &self.owner),
            ("business_unit", &self.business_unit),
            ("purpose", &self.purpose),
            ("model_type", &self.model_type),
            ("vendor", &self.vendor),
            ("data_residency", &self.data_residency),
        ];
        for (field, value) in fields {
            if let Some(value) = value {
                require(field, value)?;
            }
        }
        Ok(())
    }

    pub fn touches_risk_inputs(&self) -> bool {
        self.data_types.is_some() || self.data_residency.is_some() || self.external_sharing.is_some()
    }

    /// Apply the patch, returning whether the risk tier was recomputed.
    pub fn apply_to(&self, use_case: &mut UseCase, now: DateTime<Utc>) -> bool {
        if let Some(title) = &self.title {
            use_case.title = title.clone();
        }
        if let Some(owner) = &self.owner {
            use_case.owner = owner.clone();
        }
        if let Some(business_unit) = &self.business_unit {
            use_case.business_unit = business_unit.clone();
        }
        if let Some(purpose) = &self.purpose {
            use_case.purpose = purpose.clone();
        }
        if let Some(model_type) = &self.model_type {
            use_case.model_type = model_type.clone();
        }
        if let Some(vendor) = &self.vendor {
            use_case.vendor = vendor.clone();
        }
        if let Some(data_types) = &self.data_types {
            use_case.data_types = data_types.clone();
        }
        if let Some(residency) = &self.data_residency {
            use_case.data_residency = residency.clone();
        }
        if let Some(sharing) = self.external_sharing {
            use_case.external_sharing = sharing;
        }
        if let Some(status) = self.status {
            use_case.status = status;
        }
        use_case.updated_at = now;

        let recompute = self.touches_risk_inputs();
        if recompute {
            use_case.risk_tier = risk::assess(&use_case.risk_input()).tier;
        }
        recompute
    }
}
