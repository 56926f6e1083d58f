//! End-to-end walk through the intake wizard via the public service facade and HTTP router.

mod common {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use ai_intake::workflows::intake::{IntakeId, IntakeRecord, IntakeRepository, RepositoryError};

    #[derive(Default)]
    pub struct MemoryRepository {
        records: Mutex<HashMap<IntakeId, IntakeRecord>>,
    }

    impl IntakeRepository for MemoryRepository {
        fn insert(&self, record: IntakeRecord) -> Result<IntakeRecord, RepositoryError> {
            let mut guard = self.records.lock().expect("repository mutex poisoned");
            if guard.contains_key(&record.id) {
                return Err(RepositoryError::Conflict);
            }
            guard.insert(record.id, record.clone());
            Ok(record)
        }

        fn update(&self, record: IntakeRecord) -> Result<(), RepositoryError> {
            let mut guard = self.records.lock().expect("repository mutex poisoned");
            let stored = guard.get(&record.id).ok_or(RepositoryError::NotFound)?;
            if stored.revision + 1 != record.revision {
                return Err(RepositoryError::RevisionMismatch {
                    stored: stored.revision,
                    attempted: record.revision,
                });
            }
            guard.insert(record.id, record);
            Ok(())
        }

        fn fetch(&self, id: &IntakeId) -> Result<Option<IntakeRecord>, RepositoryError> {
            Ok(self
                .records
                .lock()
                .expect("repository mutex poisoned")
                .get(id)
                .cloned())
        }

        fn list(&self) -> Result<Vec<IntakeRecord>, RepositoryError> {
            Ok(self
                .records
                .lock()
                .expect("repository mutex poisoned")
                .values()
                .cloned()
                .collect())
        }

        fn delete(&self, id: &IntakeId) -> Result<bool, RepositoryError> {
            Ok(self
                .records
                .lock()
                .expect("repository mutex poisoned")
                .remove(id)
                .is_some())
        }
    }
}

use std::sync::Arc;

use ai_intake::workflows::intake::{
    intake_router, IntakePolicy, IntakeSectionUpdate, IntakeService, IntakeStatus, NewIntake,
    Section,
};
use ai_intake::workflows::risk::RiskTier;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use common::MemoryRepository;
use serde_json::{json, Value};
use tower::ServiceExt;

fn service() -> Arc<IntakeService<MemoryRepository>> {
    Arc::new(IntakeService::new(
        Arc::new(MemoryRepository::default()),
        IntakePolicy::default(),
    ))
}

fn update(value: Value) -> IntakeSectionUpdate {
    serde_json::from_value(value).expect("update parses")
}

#[test]
fn wizard_fills_sections_and_submits() {
    let service = service();
    let record = service
        .create(NewIntake {
            system_name: "Underwriting Copilot".to_string(),
            business_owner: None,
            business_owner_email: None,
        })
        .expect("intake opens");

    let receipt = service
        .autosave(
            &record.id,
            &update(json!({
                "current_step": 4,
                "inventory": {
                    "business_purpose": "Draft underwriting memos",
                    "vendor": "Internal"
                },
                "decision_impact": {
                    "decision_classification": "decision_support",
                    "affected_parties": ["applicants"],
                    "human_oversight": "Underwriter signs every memo"
                },
                "data_sensitivity": {
                    "approved_data_types": ["Financial Data", "public data"],
                    "prohibited_data_types": ["biometric data"],
                    "data_residency": "us",
                    "external_sharing": "no"
                },
                "ownership": {
                    "approving_authority": "Model Risk Committee",
                    "business_owner": "Lee Chen",
                    "technical_owner": "Ravi Iyer"
                }
            })),
        )
        .expect("first autosave");
    assert_eq!(receipt.risk_tier, Some(RiskTier::High));
    for section in [
        Section::Inventory,
        Section::DecisionImpact,
        Section::DataSensitivity,
        Section::Ownership,
        Section::Regulatory,
        Section::Monitoring,
    ] {
        assert!(
            receipt.section_completion.is_complete(section),
            "section {section} should be complete"
        );
    }
    assert!(!receipt.section_completion.is_complete(Section::RiskFindings));

    service
        .autosave(
            &record.id,
            &update(json!({
                "readiness": {
                    "readiness_status": "conditional",
                    "readiness_rationale": "Pending fairness review"
                }
            })),
        )
        .expect("readiness autosave");

    let stored = service.get(&record.id).expect("record present");
    assert_eq!(stored.section_completion.completed_count(), 9);
    assert_eq!(stored.risk_tier, Some(RiskTier::High));
    assert_eq!(stored.current_step, Section::Ownership);

    let submission = service.submit(&record.id).expect("submits");
    assert_eq!(submission.status, "submitted");
    let stored = service.get(&record.id).expect("record present");
    assert_eq!(stored.status, IntakeStatus::Submitted);
    assert_eq!(stored.submitted_at, Some(submission.submitted_at));
}

#[test]
fn clearing_data_types_drops_the_tier_to_low() {
    let service = service();
    let record = service
        .create(NewIntake {
            system_name: "FAQ bot".to_string(),
            business_owner: None,
            business_owner_email: None,
        })
        .expect("intake opens");

    service
        .autosave(
            &record.id,
            &update(json!({ "data_sensitivity": { "approved_data_types": ["pii"] } })),
        )
        .expect("high-risk save");
    let receipt = service
        .autosave(
            &record.id,
            &update(json!({ "data_sensitivity": { "approved_data_types": [] } })),
        )
        .expect("clearing save");

    assert_eq!(receipt.risk_tier, Some(RiskTier::Low));
    assert!(!receipt.section_completion.is_complete(Section::DataSensitivity));
}

#[tokio::test]
async fn router_serves_the_full_wizard_flow() {
    let router = intake_router(service());

    let created = router
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/intakes")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    serde_json::to_vec(&json!({ "system_name": "Chat Concierge" })).unwrap(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(created.status(), StatusCode::CREATED);
    let body = axum::body::to_bytes(created.into_body(), usize::MAX)
        .await
        .unwrap();
    let created: Value = serde_json::from_slice(&body).unwrap();
    let id = created["id"].as_u64().unwrap();

    let saved = router
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::PATCH)
                .uri(format!("/api/intakes/{id}"))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    serde_json::to_vec(&json!({
                        "expected_version": 1,
                        "data_sensitivity": {
                            "approved_data_types": ["usage data"],
                            "data_residency": "multi-region"
                        }
                    }))
                    .unwrap(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(saved.status(), StatusCode::OK);
    let body = axum::body::to_bytes(saved.into_body(), usize::MAX)
        .await
        .unwrap();
    let receipt: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(receipt["risk_tier"], "high");
    assert_eq!(receipt["version"], 2);

    let submitted = router
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri(format!("/api/intakes/{id}/submit"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(submitted.status(), StatusCode::OK);

    let resubmitted = router
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri(format!("/api/intakes/{id}/submit"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resubmitted.status(), StatusCode::CONFLICT);
}
