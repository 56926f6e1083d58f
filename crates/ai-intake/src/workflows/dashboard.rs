//! Executive rollup across the use-case registry and intake records.

use serde::Serialize;

use crate::workflows::intake::{IntakeRecord, IntakeStatus, ReadinessStatus};
use crate::workflows::registry::{UseCase, UseCaseId, UseCaseStatus};
use crate::workflows::risk::{ExternalSharing, RiskTier};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total_count: usize,
    pub high_risk_count: usize,
    pub pending_count: usize,
    /// Share of use cases with external sharing, percent rounded to one decimal.
    pub external_sharing_pct: f64,
    pub risk_distribution: RiskDistribution,
    pub high_risk_items: Vec<HighRiskItem>,
    pub intake_stats: IntakeStats,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RiskDistribution {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HighRiskItem {
    pub id: UseCaseId,
    pub title: String,
    pub owner: String,
    pub business_unit: String,
    pub data_types: Vec<String>,
    pub status: UseCaseStatus,
    pub risk_tier: RiskTier,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IntakeStats {
    pub total: usize,
    pub draft: usize,
    pub submitted: usize,
    pub approved: usize,
    pub conditional: usize,
    pub not_ready: usize,
}

impl DashboardStats {
    pub fn collect(use_cases: &[UseCase], intakes: &[IntakeRecord]) -> Self {
        let mut stats = DashboardStats {
            total_count: use_cases.len(),
            ..DashboardStats::default()
        };
        let mut shared = 0usize;

        for use_case in use_cases {
            match use_case.risk_tier {
                RiskTier::Low => stats.risk_distribution.low += 1,
                RiskTier::Medium => stats.risk_distribution.medium += 1,
                RiskTier::High => {
                    stats.risk_distribution.high += 1;
                    stats.high_risk_items.push(HighRiskItem {
                        id: use_case.id,
                        title: use_case.title.clone(),
                        owner: use_case.owner.clone(),
                        business_unit: use_case.business_unit.clone(),
                        data_types: use_case.data_types.clone(),
                        status: use_case.status,
                        risk_tier: use_case.risk_tier,
                    });
                }
            }
            if use_case.status == UseCaseStatus::Pending {
                stats.pending_count += 1;
            }
            if use_case.external_sharing == ExternalSharing::Yes {
                shared += 1;
            }
        }

        stats.high_risk_count = stats.risk_distribution.high;
        stats.high_risk_items.sort_by_key(|item| item.id);
        stats.external_sharing_pct = percentage(shared, use_cases.len());
        stats.intake_stats = IntakeStats::collect(intakes);
        stats
    }
}

impl IntakeStats {
    pub fn collect(intakes: &[IntakeRecord]) -> Self {
        let mut stats = IntakeStats {
            total: intakes.len(),
            ..IntakeStats::default()
        };
        for intake in intakes {
            match intake.status {
                IntakeStatus::Draft => stats.draft += 1,
                IntakeStatus::Submitted => stats.submitted += 1,
                IntakeStatus::UnderReview | IntakeStatus::Completed => {}
            }
            match intake.readiness.readiness_status {
                Some(ReadinessStatus::Approved) => stats.approved += 1,
                Some(ReadinessStatus::Conditional) => stats.conditional += 1,
                Some(ReadinessStatus::NotReady) => stats.not_ready += 1,
                None => {}
            }
        }
        stats
    }
}

fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    (part as f64 / whole as f64 * 1000.0).round_ties_even() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::intake::IntakeId;
    use crate::workflows::registry::UseCaseDraft;
    use chrono::Utc;

    fn use_case(id: u64, data_types: &[&str], sharing: ExternalSharing, status: UseCaseStatus) -> UseCase {
        UseCase::from_draft(
            UseCaseId(id),
            UseCaseDraft {
                title: format!("Use case {id}"),
                owner: "Jordan Kim".to_string(),
                business_unit: "Operations".to_string(),
                purpose: "Automate routing".to_string(),
                model_type: "LLM".to_string(),
                vendor: "Internal".to_string(),
                data_types: data_types.iter().map(|label| label.to_string()).collect(),
                data_residency: "us".to_string(),
                external_sharing: sharing,
                status,
            },
            Utc::now(),
        )
    }

    #[test]
    fn empty_inputs_produce_zeroes() {
        let stats = DashboardStats::collect(&[], &[]);
        assert_eq!(stats.total_count, 0);
        assert_eq!(stats.external_sharing_pct, 0.0);
        assert!(stats.high_risk_items.is_empty());
        assert_eq!(stats.intake_stats, IntakeStats::default());
    }

    #[test]
    fn counts_tiers_pending_and_sharing() {
        let use_cases = vec![
            use_case(1, &["pii"], ExternalSharing::No, UseCaseStatus::Pending),
            use_case(2, &["usage data"], ExternalSharing::No, UseCaseStatus::Draft),
            use_case(3, &[], ExternalSharing::No, UseCaseStatus::Approved),
        ];

        let stats = DashboardStats::collect(&use_cases, &[]);

        assert_eq!(stats.total_count, 3);
        assert_eq!(stats.pending_count, 1);
        assert_eq!(
            stats.risk_distribution,
            RiskDistribution {
                low: 1,
                medium: 1,
                high: 1
            }
        );
        assert_eq!(stats.high_risk_count, 1);
        assert_eq!(stats.high_risk_items[0].id, UseCaseId(1));
        assert_eq!(stats.external_sharing_pct, 0.0);
    }

    #[test]
    fn sharing_percentage_rounds_to_one_decimal() {
        let use_cases = vec![
            use_case(1, &[], ExternalSharing::Yes, UseCaseStatus::Draft),
            use_case(2, &[], ExternalSharing::No, UseCaseStatus::Draft),
            use_case(3, &[], ExternalSharing::No, UseCaseStatus::Draft),
        ];

        let stats = DashboardStats::collect(&use_cases, &[]);
        assert_eq!(stats.external_sharing_pct, 33.3);

        let mut sixteen = vec![use_case(1, &[], ExternalSharing::Yes, UseCaseStatus::Draft)];
        sixteen.extend(
            (2..=16).map(|id| use_case(id, &[], ExternalSharing::No, UseCaseStatus::Draft)),
        );
        let stats = DashboardStats::collect(&sixteen, &[]);
        assert_eq!(stats.external_sharing_pct, 6.2, "halves round to even");
    }

    #[test]
    fn intake_stats_split_status_and_readiness() {
        let now = Utc::now();
        let draft = IntakeRecord::new(IntakeId(1), "Draft system".to_string(), now);
        let mut submitted = IntakeRecord::new(IntakeId(2), "Submitted system".to_string(), now);
        submitted.status = IntakeStatus::Submitted;
        submitted.readiness.readiness_status = Some(ReadinessStatus::Conditional);
        let mut reviewed = IntakeRecord::new(IntakeId(3), "Reviewed system".to_string(), now);
        reviewed.status = IntakeStatus::Completed;
        reviewed.readiness.readiness_status = Some(ReadinessStatus::NotReady);

        let stats = IntakeStats::collect(&[draft, submitted, reviewed]);

        assert_eq!(
            stats,
            IntakeStats {
                total: 3,
                draft: 1,
                submitted: 1,
                approved: 0,
                conditional: 1,
                not_ready: 1,
            }
        );
    }
}
