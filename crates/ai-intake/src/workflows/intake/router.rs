use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post, put},
    Json, Router,
};
use serde::Serialize;
use serde_json::json;

use super::domain::{IntakeId, Section};
use super::entries::{
    ActionItemDraft, ActionItemPatch, EntryId, RequiredArtifactDraft, RequiredArtifactPatch,
    RiskFindingDraft, RiskFindingPatch,
};
use super::repository::{IntakeQuery, IntakeRepository};
use super::service::{IntakeService, IntakeServiceError, NewIntake};
use super::update::IntakeSectionUpdate;

type SharedService<R> = State<Arc<IntakeService<R>>>;

/// Router builder exposing the intake wizard API.
pub fn intake_router<R>(service: Arc<IntakeService<R>>) -> Router
where
    R: IntakeRepository + 'static,
{
    Router::new()
        .route(
            "/api/intakes",
            post(create_handler::<R>).get(list_handler::<R>),
        )
        .route(
            "/api/intakes/:intake_id",
            get(get_handler::<R>)
                .patch(autosave_handler::<R>)
                .delete(delete_handler::<R>),
        )
        .route("/api/intakes/:intake_id/submit", post(submit_handler::<R>))
        .route(
            "/api/intakes/:intake_id/step/:step",
            put(visit_step_handler::<R>),
        )
        .route(
            "/api/intakes/:intake_id/risks",
            get(list_risks_handler::<R>).post(create_risk_handler::<R>),
        )
        .route(
            "/api/intakes/:intake_id/risks/:entry_id",
            patch(update_risk_handler::<R>).delete(delete_risk_handler::<R>),
        )
        .route(
            "/api/intakes/:intake_id/artifacts",
            get(list_artifacts_handler::<R>).post(create_artifact_handler::<R>),
        )
        .route(
            "/api/intakes/:intake_id/artifacts/:entry_id",
            patch(update_artifact_handler::<R>).delete(delete_artifact_handler::<R>),
        )
        .route(
            "/api/intakes/:intake_id/actions",
            get(list_actions_handler::<R>).post(create_action_handler::<R>),
        )
        .route(
            "/api/intakes/:intake_id/actions/:entry_id",
            patch(update_action_handler::<R>).delete(delete_action_handler::<R>),
        )
        .with_state(service)
}

pub(crate) fn status_for(error: &IntakeServiceError) -> StatusCode {
    match error {
        IntakeServiceError::NotFound(_) | IntakeServiceError::EntryNotFound { .. } => {
            StatusCode::NOT_FOUND
        }
        IntakeServiceError::Lifecycle(_)
        | IntakeServiceError::StaleWrite { .. }
        | IntakeServiceError::ConcurrentWrite(_)
        | IntakeServiceError::Locked(_) => StatusCode::CONFLICT,
        IntakeServiceError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn failure(error: IntakeServiceError) -> Response {
    let payload = json!({ "error": error.to_string() });
    (status_for(&error), Json(payload)).into_response()
}

fn respond<T: Serialize>(status: StatusCode, result: Result<T, IntakeServiceError>) -> Response {
    match result {
        Ok(body) => (status, Json(body)).into_response(),
        Err(error) => failure(error),
    }
}

fn respond_empty(result: Result<(), IntakeServiceError>) -> Response {
    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => failure(error),
    }
}

pub(crate) async fn create_handler<R>(
    State(service): SharedService<R>,
    Json(request): Json<NewIntake>,
) -> Response
where
    R: IntakeRepository + 'static,
{
    respond(StatusCode::CREATED, service.create(request))
}

pub(crate) async fn list_handler<R>(
    State(service): SharedService<R>,
    Query(query): Query<IntakeQuery>,
) -> Response
where
    R: IntakeRepository + 'static,
{
    respond(StatusCode::OK, service.list(&query))
}

pub(crate) async fn get_handler<R>(
    State(service): SharedService<R>,
    Path(intake_id): Path<u64>,
) -> Response
where
    R: IntakeRepository + 'static,
{
    respond(StatusCode::OK, service.get(&IntakeId(intake_id)))
}

pub(crate) async fn autosave_handler<R>(
    State(service): SharedService<R>,
    Path(intake_id): Path<u64>,
    Json(update): Json<IntakeSectionUpdate>,
) -> Response
where
    R: IntakeRepository + 'static,
{
    respond(StatusCode::OK, service.autosave(&IntakeId(intake_id), &update))
}

pub(crate) async fn delete_handler<R>(
    State(service): SharedService<R>,
    Path(intake_id): Path<u64>,
) -> Response
where
    R: IntakeRepository + 'static,
{
    respond_empty(service.delete(&IntakeId(intake_id)))
}

pub(crate) async fn submit_handler<R>(
    State(service): SharedService<R>,
    Path(intake_id): Path<u64>,
) -> Response
where
    R: IntakeRepository + 'static,
{
    respond(StatusCode::OK, service.submit(&IntakeId(intake_id)))
}

pub(crate) async fn visit_step_handler<R>(
    State(service): SharedService<R>,
    Path((intake_id, step)): Path<(u64, u8)>,
) -> Response
where
    R: IntakeRepository + 'static,
{
    let Some(step) = Section::from_index(step) else {
        let payload = json!({ "error": format!("invalid step number {step}") });
        return (StatusCode::BAD_REQUEST, Json(payload)).into_response();
    };
    respond(
        StatusCode::OK,
        service
            .visit_step(&IntakeId(intake_id), step)
            .map(|record| record.summary()),
    )
}

pub(crate) async fn list_risks_handler<R>(
    State(service): SharedService<R>,
    Path(intake_id): Path<u64>,
) -> Response
where
    R: IntakeRepository + 'static,
{
    respond(StatusCode::OK, service.risk_findings(&IntakeId(intake_id)))
}

pub(crate) async fn create_risk_handler<R>(
    State(service): SharedService<R>,
    Path(intake_id): Path<u64>,
    Json(draft): Json<RiskFindingDraft>,
) -> Response
where
    R: IntakeRepository + 'static,
{
    respond(
        StatusCode::CREATED,
        service.add_risk_finding(&IntakeId(intake_id), draft),
    )
}

pub(crate) async fn update_risk_handler<R>(
    State(service): SharedService<R>,
    Path((intake_id, entry_id)): Path<(u64, u64)>,
    Json(patch): Json<RiskFindingPatch>,
) -> Response
where
    R: IntakeRepository + 'static,
{
    respond(
        StatusCode::OK,
        service.update_risk_finding(&IntakeId(intake_id), EntryId(entry_id), &patch),
    )
}

pub(crate) async fn delete_risk_handler<R>(
    State(service): SharedService<R>,
    Path((intake_id, entry_id)): Path<(u64, u64)>,
) -> Response
where
    R: IntakeRepository + 'static,
{
    respond_empty(service.remove_risk_finding(&IntakeId(intake_id), EntryId(entry_id)))
}

pub(crate) async fn list_artifacts_handler<R>(
    State(service): SharedService<R>,
    Path(intake_id): Path<u64>,
) -> Response
where
    R: IntakeRepository + 'static,
{
    respond(
        StatusCode::OK,
        service.required_artifacts(&IntakeId(intake_id)),
    )
}

pub(crate) async fn create_artifact_handler<R>(
    State(service): SharedService<R>,
    Path(intake_id): Path<u64>,
    Json(draft): Json<RequiredArtifactDraft>,
) -> Response
where
    R: IntakeRepository + 'static,
{
    respond(
        StatusCode::CREATED,
        service.add_required_artifact(&IntakeId(intake_id), draft),
    )
}

pub(crate) async fn update_artifact_handler<R>(
    State(service): SharedService<R>,
    Path((intake_id, entry_id)): Path<(u64, u64)>,
    Json(patch): Json<RequiredArtifactPatch>,
) -> Response
where
    R: IntakeRepository + 'static,
{
    respond(
        StatusCode::OK,
        service.update_required_artifact(&IntakeId(intake_id), EntryId(entry_id), &patch),
    )
}

pub(crate) async fn delete_artifact_handler<R>(
    State(service): SharedService<R>,
    Path((intake_id, entry_id)): Path<(u64, u64)>,
) -> Response
where
    R: IntakeRepository + 'static,
{
    respond_empty(service.remove_required_artifact(&IntakeId(intake_id), EntryId(entry_id)))
}

pub(crate) async fn list_actions_handler<R>(
    State(service): SharedService<R>,
    Path(intake_id): Path<u64>,
) -> Response
where
    R: IntakeRepository + 'static,
{
    respond(StatusCode::OK, service.action_items(&IntakeId(intake_id)))
}

pub(crate) async fn create_action_handler<R>(
    State(service): SharedService<R>,
    Path(intake_id): Path<u64>,
    Json(draft): Json<ActionItemDraft>,
) -> Response
where
    R: IntakeRepository + 'static,
{
    respond(
        StatusCode::CREATED,
        service.add_action_item(&IntakeId(intake_id), draft),
    )
}

pub(crate) async fn update_action_handler<R>(
    State(service): SharedService<R>,
    Path((intake_id, entry_id)): Path<(u64, u64)>,
    Json(patch): Json<ActionItemPatch>,
) -> Response
where
    R: IntakeRepository + 'static,
{
    respond(
        StatusCode::OK,
        service.update_action_item(&IntakeId(intake_id), EntryId(entry_id), &patch),
    )
}

pub(crate) async fn delete_action_handler<R>(
    State(service): SharedService<R>,
    Path((intake_id, entry_id)): Path<(u64, u64)>,
) -> Response
where
    R: IntakeRepository + 'static,
{
    respond_empty(service.remove_action_item(&IntakeId(intake_id), EntryId(entry_id)))
}
