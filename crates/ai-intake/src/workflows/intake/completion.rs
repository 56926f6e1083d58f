use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::domain::{IntakeRecord, Section};

/// Per-section completion flags keyed by section index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectionCompletion(BTreeMap<Section, bool>);

impl SectionCompletion {
    pub fn is_complete(&self, section: Section) -> bool {
        self.0.get(&section).copied().unwrap_or(false)
    }

    pub fn completed_count(&self) -> usize {
        self.0.values().filter(|complete| **complete).count()
    }

    pub fn incomplete(&self) -> Vec<Section> {
        self.0
            .iter()
            .filter(|(_, complete)| !**complete)
            .map(|(section, _)| *section)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Section, bool)> + '_ {
        self.0.iter().map(|(section, complete)| (*section, *complete))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(Section, bool)> for SectionCompletion {
    fn from_iter<T: IntoIterator<Item = (Section, bool)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Evaluates every section from the record's current state. Always yields all ten keys.
pub fn completion(record: &IntakeRecord) -> SectionCompletion {
    Section::ALL
        .iter()
        .map(|section| (*section, section_complete(*section, record)))
        .collect()
}

/// Minimum-required-field rule for a single section.
///
/// Sections 5, 6, 8, 9 and 10 are advisory and always count as complete; only the
/// inventory, decision, data, ownership and risk sections gate progress.
pub fn section_complete(section: Section, record: &IntakeRecord) -> bool {
    match section {
        Section::Inventory => {
            let inventory = &record.inventory;
            !inventory.system_name.is_empty() && is_filled(&inventory.business_purpose)
        }
        Section::DecisionImpact => record.decision_impact.decision_classification.is_some(),
        Section::DataSensitivity => {
            let data = &record.data_sensitivity;
            !data.approved_data_types.is_empty() || !data.prohibited_data_types.is_empty()
        }
        Section::Ownership => {
            let ownership = &record.ownership;
            is_filled(&ownership.approving_authority)
                && is_filled(&ownership.business_owner)
                && is_filled(&ownership.technical_owner)
        }
        Section::RiskFindings => !record.risk_findings.is_empty(),
        Section::Regulatory
        | Section::Monitoring
        | Section::Artifacts
        | Section::Readiness
        | Section::Actions => true,
    }
}

fn is_filled(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|text| !text.is_empty())
}
