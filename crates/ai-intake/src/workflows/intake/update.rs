//! Section-scoped autosave payloads and the rule that merges them onto a record.
//!
//! Every updatable field is an `Option<Option<T>>`: the outer layer records whether the
//! client sent the field at all, the inner layer carries the value or an explicit `null`.
//! Absent sections and absent fields leave the record untouched; `null` clears.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::domain::{
    ActionPlanSection, ArtifactReviewSection, DataSensitivitySection, DecisionClassification,
    DecisionImpactSection, IntakeRecord, InventorySection, MonitoringSection, OwnershipSection,
    ReadinessSection, ReadinessStatus, RegulatorySection, RiskReviewSection, Section,
};
use crate::workflows::risk::{self, ExternalSharing, RiskAssessment};

/// Keeps "sent as null" distinct from "not sent" when paired with `#[serde(default)]`.
pub(crate) fn explicit<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

pub(crate) fn assign<T: Clone>(slot: &mut Option<T>, value: &Option<Option<T>>) {
    if let Some(value) = value {
        *slot = value.clone();
    }
}

fn assign_list(slot: &mut Vec<String>, value: &Option<Option<Vec<String>>>) {
    if let Some(value) = value {
        *slot = value.clone().unwrap_or_default();
    }
}

fn assign_text(slot: &mut String, value: &Option<Option<String>>) {
    if let Some(value) = value {
        *slot = value.clone().unwrap_or_default();
    }
}

macro_rules! section_update {
    (
        $(#[$meta:meta])*
        $name:ident { $($field:ident : $ty:ty),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(deny_unknown_fields)]
        pub struct $name {
            $(
                #[serde(default, deserialize_with = "explicit", skip_serializing_if = "Option::is_none")]
                pub $field: Option<Option<$ty>>,
            )+
        }

        impl $name {
            pub fn is_empty(&self) -> bool {
                true $(&& self.$field.is_none())+
            }
        }
    };
}

section_update!(
    /// Section 1.
    InventoryUpdate {
        system_name: String,
        business_purpose: String,
        business_unit: String,
        vendor: String,
        model_type: String,
    }
);

section_update!(
    /// Section 2.
    DecisionImpactUpdate {
        decision_classification: DecisionClassification,
        affected_parties: Vec<String>,
        human_oversight: String,
    }
);

section_update!(
    /// Section 3. The only section whose fields feed the risk tier.
    DataSensitivityUpdate {
        approved_data_types: Vec<String>,
        prohibited_data_types: Vec<String>,
        data_residency: String,
        external_sharing: ExternalSharing,
        retention_period: String,
    }
);

section_update!(
    /// Section 4.
    OwnershipUpdate {
        approving_authority: String,
        business_owner: String,
        business_owner_email: String,
        technical_owner: String,
        technical_owner_email: String,
    }
);

section_update!(
    /// Section 5.
    RegulatoryUpdate {
        applicable_regulations: Vec<String>,
        regulatory_notes: String,
    }
);

section_update!(
    /// Section 6.
    MonitoringUpdate {
        monitoring_plan: String,
        performance_metrics: Vec<String>,
        incident_contact: String,
        review_cadence: String,
    }
);

section_update!(
    /// Section 7. Findings themselves are managed through the entry operations.
    RiskReviewUpdate {
        residual_risk_summary: String,
    }
);

section_update!(
    /// Section 8.
    ArtifactReviewUpdate {
        artifact_notes: String,
    }
);

section_update!(
    /// Section 9.
    ReadinessUpdate {
        readiness_status: ReadinessStatus,
        readiness_rationale: String,
        conditions: Vec<String>,
    }
);

section_update!(
    /// Section 10.
    ActionPlanUpdate {
        action_plan_notes: String,
    }
);

impl InventoryUpdate {
    fn apply_to(&self, section: &mut InventorySection) {
        assign_text(&mut section.system_name, &self.system_name);
        assign(&mut section.business_purpose, &self.business_purpose);
        assign(&mut section.business_unit, &self.business_unit);
        assign(&mut section.vendor, &self.vendor);
        assign(&mut section.model_type, &self.model_type);
    }
}

impl DecisionImpactUpdate {
    fn apply_to(&self, section: &mut DecisionImpactSection) {
        assign(
            &mut section.decision_classification,
            &self.decision_classification,
        );
        assign_list(&mut section.affected_parties, &self.affected_parties);
        assign(&mut section.human_oversight, &self.human_oversight);
    }
}

impl DataSensitivityUpdate {
    fn apply_to(&self, section: &mut DataSensitivitySection) {
        assign_list(&mut section.approved_data_types, &self.approved_data_types);
        assign_list(
            &mut section.prohibited_data_types,
            &self.prohibited_data_types,
        );
        assign(&mut section.data_residency, &self.data_residency);
        assign(&mut section.external_sharing, &self.external_sharing);
        assign(&mut section.retention_period, &self.retention_period);
    }

    /// True when the update carries any of the three risk-tier inputs.
    pub fn touches_risk_inputs(&self) -> bool {
        self.approved_data_types.is_some()
            || self.data_residency.is_some()
            || self.external_sharing.is_some()
    }
}

impl OwnershipUpdate {
    fn apply_to(&self, section: &mut OwnershipSection) {
        assign(&mut section.approving_authority, &self.approving_authority);
        assign(&mut section.business_owner, &self.business_owner);
        assign(&mut section.business_owner_email, &self.business_owner_email);
        assign(&mut section.technical_owner, &self.technical_owner);
        assign(
            &mut section.technical_owner_email,
            &self.technical_owner_email,
        );
    }
}

impl RegulatoryUpdate {
    fn apply_to(&self, section: &mut RegulatorySection) {
        assign_list(
            &mut section.applicable_regulations,
            &self.applicable_regulations,
        );
        assign(&mut section.regulatory_notes, &self.regulatory_notes);
    }
}

impl MonitoringUpdate {
    fn apply_to(&self, section: &mut MonitoringSection) {
        assign(&mut section.monitoring_plan, &self.monitoring_plan);
        assign_list(&mut section.performance_metrics, &self.performance_metrics);
        assign(&mut section.incident_contact, &self.incident_contact);
        assign(&mut section.review_cadence, &self.review_cadence);
    }
}

impl RiskReviewUpdate {
    fn apply_to(&self, section: &mut RiskReviewSection) {
        assign(
            &mut section.residual_risk_summary,
            &self.residual_risk_summary,
        );
    }
}

impl ArtifactReviewUpdate {
    fn apply_to(&self, section: &mut ArtifactReviewSection) {
        assign(&mut section.artifact_notes, &self.artifact_notes);
    }
}

impl ReadinessUpdate {
    fn apply_to(&self, section: &mut ReadinessSection) {
        assign(&mut section.readiness_status, &self.readiness_status);
        assign(&mut section.readiness_rationale, &self.readiness_rationale);
        assign_list(&mut section.conditions, &self.conditions);
    }
}

impl ActionPlanUpdate {
    fn apply_to(&self, section: &mut ActionPlanSection) {
        assign(&mut section.action_plan_notes, &self.action_plan_notes);
    }
}

/// Sparse autosave payload. Sections are keyed by their name; the wizard cursor and the gap
/// list sit at the top level and bypass section nesting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IntakeSectionUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_step: Option<Section>,
    #[serde(default, deserialize_with = "explicit", skip_serializing_if = "Option::is_none")]
    pub identified_gaps: Option<Option<Vec<String>>>,
    /// Version the client last saw. When present, a mismatch rejects the save.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_version: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inventory: Option<InventoryUpdate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decision_impact: Option<DecisionImpactUpdate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_sensitivity: Option<DataSensitivityUpdate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ownership: Option<OwnershipUpdate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regulatory: Option<RegulatoryUpdate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monitoring: Option<MonitoringUpdate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_review: Option<RiskReviewUpdate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact_review: Option<ArtifactReviewUpdate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readiness: Option<ReadinessUpdate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_plan: Option<ActionPlanUpdate>,
}

impl IntakeSectionUpdate {
    pub fn touches_risk_inputs(&self) -> bool {
        self.data_sensitivity
            .as_ref()
            .is_some_and(DataSensitivityUpdate::touches_risk_inputs)
    }
}

/// What a merge changed beyond plain field copies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeReport {
    /// Present when the update carried risk inputs and the tier was recomputed.
    pub risk: Option<RiskAssessment>,
}

/// Applies `update` to `record`, then re-derives the risk tier (only when risk inputs were
/// sent) and the completion map from the merged state, and stamps the autosave time.
pub fn merge(record: &mut IntakeRecord, update: &IntakeSectionUpdate, now: DateTime<Utc>) -> MergeReport {
    if let Some(step) = update.current_step {
        record.current_step = step;
    }
    assign_list(&mut record.identified_gaps, &update.identified_gaps);

    if let Some(section) = &update.inventory {
        section.apply_to(&mut record.inventory);
    }
    if let Some(section) = &update.decision_impact {
        section.apply_to(&mut record.decision_impact);
    }
    if let Some(section) = &update.data_sensitivity {
        section.apply_to(&mut record.data_sensitivity);
    }
    if let Some(section) = &update.ownership {
        section.apply_to(&mut record.ownership);
    }
    if let Some(section) = &update.regulatory {
        section.apply_to(&mut record.regulatory);
    }
    if let Some(section) = &update.monitoring {
        section.apply_to(&mut record.monitoring);
    }
    if let Some(section) = &update.risk_review {
        section.apply_to(&mut record.risk_review);
    }
    if let Some(section) = &update.artifact_review {
        section.apply_to(&mut record.artifact_review);
    }
    if let Some(section) = &update.readiness {
        section.apply_to(&mut record.readiness);
    }
    if let Some(section) = &update.action_plan {
        section.apply_to(&mut record.action_plan);
    }

    let risk = if update.touches_risk_inputs() {
        let assessment = risk::assess(&record.risk_input());
        record.risk_tier = Some(assessment.tier);
        Some(assessment)
    } else {
        None
    };

    record.refresh_completion();
    record.last_autosave_at = Some(now);
    record.updated_at = now;

    MergeReport { risk }
}
