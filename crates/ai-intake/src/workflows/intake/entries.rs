//! Child collections owned by an intake: risk findings, required artifacts, and action items.
//!
//! Each entry has its own identity and is created, patched, and removed independently of the
//! section autosave flow. Patches follow the same rule as section updates: an absent field is
//! left alone, an explicit `null` clears an optional field.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::update::{assign, explicit};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntryId(pub u64);

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Coarse three-point rating used for likelihood, impact, and priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rating {
    Low,
    #[default]
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MitigationStatus {
    #[default]
    Open,
    InProgress,
    Mitigated,
    Accepted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactStatus {
    #[default]
    Required,
    InProgress,
    Provided,
    Waived,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionStatus {
    #[default]
    Open,
    InProgress,
    Completed,
}

/// One identified residual risk and where its mitigation stands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskFinding {
    pub id: EntryId,
    pub title: String,
    pub description: Option<String>,
    pub likelihood: Rating,
    pub impact: Rating,
    pub mitigation: Option<String>,
    pub mitigation_status: MitigationStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RiskFindingDraft {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub likelihood: Rating,
    #[serde(default)]
    pub impact: Rating,
    #[serde(default)]
    pub mitigation: Option<String>,
    #[serde(default)]
    pub mitigation_status: MitigationStatus,
}

impl RiskFindingDraft {
    pub fn into_finding(self, id: EntryId, now: DateTime<Utc>) -> RiskFinding {
        RiskFinding {
            id,
            title: self.title,
            description: self.description,
            likelihood: self.likelihood,
            impact: self.impact,
            mitigation: self.mitigation,
            mitigation_status: self.mitigation_status,
            created_at: now,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RiskFindingPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "explicit", skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub likelihood: Option<Rating>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impact: Option<Rating>,
    #[serde(default, deserialize_with = "explicit", skip_serializing_if = "Option::is_none")]
    pub mitigation: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mitigation_status: Option<MitigationStatus>,
}

impl RiskFindingPatch {
    pub fn apply_to(&self, finding: &mut RiskFinding) {
        if let Some(title) = &self.title {
            finding.title = title.clone();
        }
        assign(&mut finding.description, &self.description);
        if let Some(likelihood) = self.likelihood {
            finding.likelihood = likelihood;
        }
        if let Some(impact) = self.impact {
            finding.impact = impact;
        }
        assign(&mut finding.mitigation, &self.mitigation);
        if let Some(status) = self.mitigation_status {
            finding.mitigation_status = status;
        }
    }
}

/// Evidence the governance process expects before the system goes live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequiredArtifact {
    pub id: EntryId,
    pub name: String,
    pub artifact_type: Option<String>,
    pub status: ArtifactStatus,
    pub owner: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RequiredArtifactDraft {
    pub name: String,
    #[serde(default)]
    pub artifact_type: Option<String>,
    #[serde(default)]
    pub status: ArtifactStatus,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl RequiredArtifactDraft {
    pub fn into_artifact(self, id: EntryId, now: DateTime<Utc>) -> RequiredArtifact {
        RequiredArtifact {
            id,
            name: self.name,
            artifact_type: self.artifact_type,
            status: self.status,
            owner: self.owner,
            due_date: self.due_date,
            notes: self.notes,
            created_at: now,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RequiredArtifactPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "explicit", skip_serializing_if = "Option::is_none")]
    pub artifact_type: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ArtifactStatus>,
    #[serde(default, deserialize_with = "explicit", skip_serializing_if = "Option::is_none")]
    pub owner: Option<Option<String>>,
    #[serde(default, deserialize_with = "explicit", skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "explicit", skip_serializing_if = "Option::is_none")]
    pub notes: Option<Option<String>>,
}

impl RequiredArtifactPatch {
    pub fn apply_to(&self, artifact: &mut RequiredArtifact) {
        if let Some(name) = &self.name {
            artifact.name = name.clone();
        }
        assign(&mut artifact.artifact_type, &self.artifact_type);
        if let Some(status) = self.status {
            artifact.status = status;
        }
        assign(&mut artifact.owner, &self.owner);
        assign(&mut artifact.due_date, &self.due_date);
        assign(&mut artifact.notes, &self.notes);
    }
}

/// Follow-up work, typically raised when readiness is conditional or not ready.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionItem {
    pub id: EntryId,
    pub description: String,
    pub owner: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub priority: Rating,
    pub status: ActionStatus,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ActionItemDraft {
    pub description: String,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub priority: Rating,
    #[serde(default)]
    pub status: ActionStatus,
}

impl ActionItemDraft {
    pub fn into_action(self, id: EntryId, now: DateTime<Utc>) -> ActionItem {
        let completed_at = (self.status == ActionStatus::Completed).then_some(now);
        ActionItem {
            id,
            description: self.description,
            owner: self.owner,
            due_date: self.due_date,
            priority: self.priority,
            status: self.status,
            created_at: now,
            completed_at,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ActionItemPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "explicit", skip_serializing_if = "Option::is_none")]
    pub owner: Option<Option<String>>,
    #[serde(default, deserialize_with = "explicit", skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Option<NaiveDate>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Rating>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ActionStatus>,
}

impl ActionItemPatch {
    /// Completion is stamped the first time an item moves to `completed` and kept afterwards.
    pub fn apply_to(&self, action: &mut ActionItem, now: DateTime<Utc>) {
        if let Some(description) = &self.description {
            action.description = description.clone();
        }
        assign(&mut action.owner, &self.owner);
        assign(&mut action.due_date, &self.due_date);
        if let Some(priority) = self.priority {
            action.priority = priority;
        }
        if let Some(status) = self.status {
            action.status = status;
            if status == ActionStatus::Completed && action.completed_at.is_none() {
                action.completed_at = Some(now);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 4, 2, 14, 30, 0).unwrap()
    }

    fn action() -> ActionItem {
        ActionItemDraft {
            description: "Publish model card".to_string(),
            owner: Some("ML Platform".to_string()),
            due_date: NaiveDate::from_ymd_opt(2025, 5, 1),
            priority: Rating::High,
            status: ActionStatus::Open,
        }
        .into_action(EntryId(7), now())
    }

    #[test]
    fn completing_an_action_stamps_once() {
        let mut item = action();
        let patch = ActionItemPatch {
            status: Some(ActionStatus::Completed),
            ..ActionItemPatch::default()
        };

        patch.apply_to(&mut item, now());
        assert_eq!(item.completed_at, Some(now()));

        patch.apply_to(&mut item, now() + Duration::days(3));
        assert_eq!(item.completed_at, Some(now()));
    }

    #[test]
    fn explicit_null_clears_optional_fields_in_patches() {
        let mut item = action();
        let patch: ActionItemPatch =
            serde_json::from_str(r#"{"owner": null}"#).expect("patch parses");
        assert_eq!(patch.owner, Some(None));
        assert!(patch.due_date.is_none());

        patch.apply_to(&mut item, now());
        assert!(item.owner.is_none());
        assert_eq!(item.due_date, NaiveDate::from_ymd_opt(2025, 5, 1));
        assert_eq!(item.description, "Publish model card");
    }

    #[test]
    fn risk_finding_patch_updates_status_only() {
        let mut finding = RiskFindingDraft {
            title: "Hallucinated policy answers".to_string(),
            description: Some("Model may invent refund terms".to_string()),
            likelihood: Rating::Medium,
            impact: Rating::High,
            mitigation: None,
            mitigation_status: MitigationStatus::Open,
        }
        .into_finding(EntryId(1), now());

        let patch: RiskFindingPatch =
            serde_json::from_str(r#"{"mitigation_status": "mitigated"}"#).expect("parses");
        patch.apply_to(&mut finding);

        assert_eq!(finding.mitigation_status, MitigationStatus::Mitigated);
        assert_eq!(finding.impact, Rating::High);
        assert!(finding.description.is_some());
    }

    #[test]
    fn unknown_patch_fields_are_rejected() {
        let result = serde_json::from_str::<RequiredArtifactPatch>(r#"{"owner_name": "x"}"#);
        assert!(result.is_err());
    }
}
