use super::vocabulary::{is_elevated_residency, DataSensitivity};
use super::{ExternalSharing, RiskFactor, RiskInput, ScoreComponent};

const ELEVATED_RESIDENCY_WEIGHT: u8 = 2;
const EXTERNAL_SHARING_WEIGHT: u8 = 2;

/// Additive rule table. Each factor fires at most once, whatever the number of matching labels.
pub(crate) fn score_input(input: &RiskInput) -> (Vec<ScoreComponent>, u8) {
    let mut components = Vec::new();
    let mut total: u8 = 0;

    let sensitivities: Vec<(DataSensitivity, &str)> = input
        .data_types()
        .filter_map(|label| DataSensitivity::classify(label).map(|class| (class, label)))
        .collect();

    for (factor, class) in [
        (RiskFactor::HighSensitivityData, DataSensitivity::High),
        (RiskFactor::MediumSensitivityData, DataSensitivity::Medium),
    ] {
        let matched: Vec<&str> = sensitivities
            .iter()
            .filter(|(sensitivity, _)| *sensitivity == class)
            .map(|(_, label)| *label)
            .collect();

        if !matched.is_empty() {
            components.push(ScoreComponent {
                factor,
                weight: class.weight(),
                notes: format!("{} sensitivity data: {}", class.label(), matched.join(", ")),
            });
            total += class.weight();
        }
    }

    if is_elevated_residency(input.residency()) {
        components.push(ScoreComponent {
            factor: RiskFactor::ElevatedResidency,
            weight: ELEVATED_RESIDENCY_WEIGHT,
            notes: format!("data resides in '{}'", input.residency()),
        });
        total += ELEVATED_RESIDENCY_WEIGHT;
    }

    if input.external_sharing() == ExternalSharing::Yes {
        components.push(ScoreComponent {
            factor: RiskFactor::ExternalSharing,
            weight: EXTERNAL_SHARING_WEIGHT,
            notes: "data is shared outside the organization".to_string(),
        });
        total += EXTERNAL_SHARING_WEIGHT;
    }

    (components, total)
}
