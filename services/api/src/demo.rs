use crate::infra::Workspace;
use ai_intake::error::AppError;
use ai_intake::workflows::dashboard::DashboardStats;
use ai_intake::workflows::intake::{
    ActionItemDraft, ActionStatus, IntakePolicy, IntakeSectionUpdate, NewIntake, Rating,
    RequiredArtifactDraft, RiskFindingDraft, Section, SectionCompletion,
};
use ai_intake::workflows::registry::import_inventory_from_path;
use ai_intake::workflows::risk::{self, ExternalSharing, RiskAssessment, RiskInput};
use clap::Args;
use serde_json::json;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct AssessArgs {
    /// Data type processed by the system; repeat for several
    #[arg(long = "data-type")]
    pub(crate) data_types: Vec<String>,
    /// Where the data resides (e.g. us, eu, international, multi-region)
    #[arg(long)]
    pub(crate) residency: String,
    /// Whether data is shared outside the organization (yes/no)
    #[arg(long, default_value = "no")]
    pub(crate) external_sharing: ExternalSharing,
    /// Print the assessment as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ImportArgs {
    /// Inventory CSV export to tier
    pub(crate) path: PathBuf,
    /// Print the registered use cases as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Name of the AI system walked through the wizard
    #[arg(long, default_value = "Claims Triage Assistant")]
    pub(crate) system_name: String,
    /// Reject edits once the intake is submitted
    #[arg(long)]
    pub(crate) lock_submitted: bool,
}

pub(crate) fn run_assess(args: AssessArgs) -> Result<(), AppError> {
    let input = RiskInput::new(&args.data_types, args.residency, args.external_sharing);
    let assessment = risk::assess(&input);
    let unmatched = input.unmatched_data_types();

    if args.json {
        let payload = json!({
            "tier": assessment.tier,
            "score": assessment.score,
            "components": assessment.components,
            "unmatched_data_types": unmatched,
        });
        println!("{payload:#}");
        return Ok(());
    }

    render_assessment(&assessment);
    if !unmatched.is_empty() {
        println!("Unrecognised data types (no weight): {}", unmatched.join(", "));
    }
    Ok(())
}

pub(crate) fn run_registry_import(args: ImportArgs) -> Result<(), AppError> {
    let drafts = import_inventory_from_path(&args.path)?;
    let workspace = Workspace::in_memory(IntakePolicy::default());

    let mut registered = Vec::with_capacity(drafts.len());
    for draft in drafts {
        registered.push(workspace.registry.create(draft)?);
    }

    if args.json {
        match serde_json::to_string_pretty(&registered) {
            Ok(json) => println!("{json}"),
            Err(err) => println!("Registry payload unavailable: {err}"),
        }
        return Ok(());
    }

    println!(
        "Imported {} use cases from {}",
        registered.len(),
        args.path.display()
    );
    for use_case in &registered {
        println!(
            "- [{}] {} ({}, {}) -> {} risk",
            use_case.id, use_case.title, use_case.business_unit, use_case.status, use_case.risk_tier
        );
    }

    let stats = DashboardStats::collect(&registered, &[]);
    println!(
        "Risk distribution: {} low | {} medium | {} high",
        stats.risk_distribution.low, stats.risk_distribution.medium, stats.risk_distribution.high
    );
    println!(
        "{} pending approval | {:.1}% share data externally",
        stats.pending_count, stats.external_sharing_pct
    );
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        system_name,
        lock_submitted,
    } = args;

    let workspace = Workspace::in_memory(IntakePolicy {
        lock_submitted,
        ..IntakePolicy::default()
    });
    let intakes = &workspace.intakes;

    println!("AI governance intake demo");
    let record = intakes.create(NewIntake {
        system_name: system_name.clone(),
        business_owner: Some("Priya Raman".to_string()),
        business_owner_email: Some("priya.raman@example.com".to_string()),
    })?;
    println!("- Opened intake {} for '{}'", record.id, system_name);
    render_completion(&record.section_completion);

    let steps = [
        (
            "Inventory and decision impact",
            demo_update(json!({
                "current_step": 2,
                "inventory": {
                    "business_purpose": "Prioritize incoming insurance claims for adjusters",
                    "business_unit": "Claims",
                    "vendor": "Internal",
                    "model_type": "Gradient boosted classifier"
                },
                "decision_impact": {
                    "decision_classification": "decision_support",
                    "affected_parties": ["policyholders", "adjusters"],
                    "human_oversight": "Adjusters confirm every priority change"
                }
            }))?,
        ),
        (
            "Data sensitivity",
            demo_update(json!({
                "current_step": 3,
                "data_sensitivity": {
                    "approved_data_types": ["Customer Data", "Health Data", "claim notes"],
                    "prohibited_data_types": ["biometric data"],
                    "data_residency": "us",
                    "external_sharing": "no",
                    "retention_period": "7 years"
                }
            }))?,
        ),
        (
            "Ownership",
            demo_update(json!({
                "current_step": 4,
                "ownership": {
                    "approving_authority": "Model Risk Committee",
                    "technical_owner": "Claims ML Platform",
                    "technical_owner_email": "claims-ml@example.com"
                }
            }))?,
        ),
    ];

    for (label, update) in steps {
        let receipt = intakes.autosave(&record.id, &update)?;
        let tier = receipt
            .risk_tier
            .map(|tier| tier.label())
            .unwrap_or("not assessed");
        println!(
            "\n{} saved (version {}, risk tier {})",
            label, receipt.version, tier
        );
        render_completion(&receipt.section_completion);
    }

    let finding = intakes.add_risk_finding(
        &record.id,
        RiskFindingDraft {
            title: "Priority skew for rural claimants".to_string(),
            description: Some("Training data under-represents rural regions".to_string()),
            likelihood: Rating::Medium,
            impact: Rating::High,
            mitigation: Some("Quarterly fairness review by region".to_string()),
            mitigation_status: Default::default(),
        },
    )?;
    println!("\n- Logged risk finding {}: {}", finding.id, finding.title);
    intakes.add_required_artifact(
        &record.id,
        RequiredArtifactDraft {
            name: "Data protection impact assessment".to_string(),
            artifact_type: Some("DPIA".to_string()),
            status: Default::default(),
            owner: Some("Privacy Office".to_string()),
            due_date: None,
            notes: None,
        },
    )?;
    intakes.add_action_item(
        &record.id,
        ActionItemDraft {
            description: "Complete DPIA before production rollout".to_string(),
            owner: Some("Privacy Office".to_string()),
            due_date: None,
            priority: Rating::High,
            status: ActionStatus::Open,
        },
    )?;

    let readiness = demo_update(json!({
        "current_step": 9,
        "readiness": {
            "readiness_status": "conditional",
            "readiness_rationale": "Approved pending DPIA sign-off",
            "conditions": ["DPIA signed off"]
        }
    }))?;
    intakes.autosave(&record.id, &readiness)?;

    let submission = intakes.submit(&record.id)?;
    println!(
        "- Intake {} {} at {}",
        submission.intake_id,
        submission.status,
        submission.submitted_at.format("%Y-%m-%d %H:%M UTC")
    );

    let stored = intakes.get(&record.id)?;
    render_completion(&stored.section_completion);
    if let Some(tier) = stored.risk_tier {
        let assessment = risk::assess(&stored.risk_input());
        println!("\nFinal risk tier: {tier}");
        render_assessment(&assessment);
    }

    let stats = DashboardStats::collect(&workspace.registry.all()?, &intakes.all()?);
    match serde_json::to_string_pretty(&stats.intake_stats) {
        Ok(json) => println!("\nIntake statistics:\n{json}"),
        Err(err) => println!("\nIntake statistics unavailable: {err}"),
    }

    Ok(())
}

fn demo_update(value: serde_json::Value) -> Result<IntakeSectionUpdate, AppError> {
    Ok(serde_json::from_value(value)?)
}

fn render_assessment(assessment: &RiskAssessment) {
    println!(
        "Risk tier: {} (score {})",
        assessment.tier, assessment.score
    );
    if assessment.components.is_empty() {
        println!("  No risk factors fired");
    }
    for component in &assessment.components {
        println!(
            "  - {:?}: +{} ({})",
            component.factor, component.weight, component.notes
        );
    }
}

fn render_completion(completion: &SectionCompletion) {
    println!(
        "  Sections complete: {}/{}",
        completion.completed_count(),
        Section::ALL.len()
    );
    let missing: Vec<String> = completion
        .incomplete()
        .into_iter()
        .map(|section| section.to_string())
        .collect();
    if !missing.is_empty() {
        println!("  Still open: {}", missing.join("; "));
    }
}
