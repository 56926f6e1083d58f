use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Deserializer};

use super::domain::{ParseUseCaseStatusError, UseCaseDraft, UseCaseStatus, UseCaseValidationError};
use crate::workflows::risk::{ExternalSharing, ParseExternalSharingError};

#[derive(Debug)]
pub enum InventoryImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    Row { line: u64, reason: String },
}

impl std::fmt::Display for InventoryImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InventoryImportError::Io(err) => write!(f, "failed to read inventory export: {}", err),
            InventoryImportError::Csv(err) => write!(f, "invalid inventory CSV data: {}", err),
            InventoryImportError::Row { line, reason } => {
                write!(f, "inventory row on line {}: {}", line, reason)
            }
        }
    }
}

impl std::error::Error for InventoryImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            InventoryImportError::Io(err) => Some(err),
            InventoryImportError::Csv(err) => Some(err),
            InventoryImportError::Row { .. } => None,
        }
    }
}

impl From<std::io::Error> for InventoryImportError {
    fn from(value: std::io::Error) -> Self {
        InventoryImportError::Io(value)
    }
}

impl From<csv::Error> for InventoryImportError {
    fn from(value: csv::Error) -> Self {
        InventoryImportError::Csv(value)
    }
}

pub fn import_inventory_from_path<P: AsRef<Path>>(
    path: P,
) -> Result<Vec<UseCaseDraft>, InventoryImportError> {
    let file = std::fs::File::open(path)?;
    import_inventory(file)
}

/// Read an inventory export into validated use-case drafts.
///
/// `data_types` is a single column with labels separated by `;`. Blank `status` cells
/// default to draft.
pub fn import_inventory<R: Read>(reader: R) -> Result<Vec<UseCaseDraft>, InventoryImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let mut drafts = Vec::new();

    for record in csv_reader.records() {
        let record = record?;
        let line = record.position().map_or(0, |position| position.line());
        let row: InventoryRow = record.deserialize(Some(&headers))?;
        drafts.push(row.into_draft(line)?);
    }

    Ok(drafts)
}

#[derive(Debug, Deserialize)]
struct InventoryRow {
    title: String,
    owner: String,
    business_unit: String,
    purpose: String,
    model_type: String,
    vendor: String,
    #[serde(default, deserialize_with = "semicolon_list")]
    data_types: Vec<String>,
    data_residency: String,
    external_sharing: String,
    #[serde(default)]
    status: String,
}

impl InventoryRow {
    fn into_draft(self, line: u64) -> Result<UseCaseDraft, InventoryImportError> {
        let reject = |reason: String| InventoryImportError::Row { line, reason };

        let external_sharing: ExternalSharing = self
            .external_sharing
            .parse()
            .map_err(|err: ParseExternalSharingError| reject(err.to_string()))?;
        let status = if self.status.is_empty() {
            UseCaseStatus::Draft
        } else {
            self.status
                .parse()
                .map_err(|err: ParseUseCaseStatusError| reject(err.to_string()))?
        };

        let draft = UseCaseDraft {
            title: self.title,
            owner: self.owner,
            business_unit: self.business_unit,
            purpose: self.purpose,
            model_type: self.model_type,
            vendor: self.vendor,
            data_types: self.data_types,
            data_residency: self.data_residency,
            external_sharing,
            status,
        };
        draft
            .validate()
            .map_err(|err: UseCaseValidationError| reject(err.to_string()))?;
        Ok(draft)
    }
}

fn semicolon_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .split(';')
        .map(str::trim)
        .filter(|label| !label.is_empty())
        .map(str::to_string)
        .collect())
}
