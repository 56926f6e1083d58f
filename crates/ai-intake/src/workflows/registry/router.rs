use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use serde_json::json;

use super::domain::{UseCaseDraft, UseCaseId, UseCasePatch};
use super::repository::{UseCaseQuery, UseCaseRepository};
use super::service::{RegistryError, UseCaseRegistry};

type SharedRegistry<R> = State<Arc<UseCaseRegistry<R>>>;

pub fn registry_router<R>(registry: Arc<UseCaseRegistry<R>>) -> Router
where
    R: UseCaseRepository + 'static,
{
    Router::new()
        .route(
            "/usecases",
            get(list_handler::<R>).post(create_handler::<R>),
        )
        .route(
            "/usecases/:use_case_id",
            get(get_handler::<R>)
                .patch(update_handler::<R>)
                .delete(delete_handler::<R>),
        )
        .with_state(registry)
}

fn status_for(error: &RegistryError) -> StatusCode {
    match error {
        RegistryError::NotFound(_) => StatusCode::NOT_FOUND,
        RegistryError::Invalid(_) => StatusCode::UNPROCESSABLE_ENTITY,
        RegistryError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn failure(error: RegistryError) -> Response {
    let payload = json!({ "error": error.to_string() });
    (status_for(&error), Json(payload)).into_response()
}

fn respond<T: Serialize>(status: StatusCode, result: Result<T, RegistryError>) -> Response {
    match result {
        Ok(body) => (status, Json(body)).into_response(),
        Err(error) => failure(error),
    }
}

async fn create_handler<R>(
    State(registry): SharedRegistry<R>,
    Json(draft): Json<UseCaseDraft>,
) -> Response
where
    R: UseCaseRepository + 'static,
{
    respond(StatusCode::CREATED, registry.create(draft))
}

async fn list_handler<R>(
    State(registry): SharedRegistry<R>,
    Query(query): Query<UseCaseQuery>,
) -> Response
where
    R: UseCaseRepository + 'static,
{
    respond(StatusCode::OK, registry.list(&query))
}

async fn get_handler<R>(
    State(registry): SharedRegistry<R>,
    Path(use_case_id): Path<u64>,
) -> Response
where
    R: UseCaseRepository + 'static,
{
    respond(StatusCode::OK, registry.get(&UseCaseId(use_case_id)))
}

async fn update_handler<R>(
    State(registry): SharedRegistry<R>,
    Path(use_case_id): Path<u64>,
    Json(patch): Json<UseCasePatch>,
) -> Response
where
    R: UseCaseRepository + 'static,
{
    respond(
        StatusCode::OK,
        registry.update(&UseCaseId(use_case_id), &patch),
    )
}

async fn delete_handler<R>(
    State(registry): SharedRegistry<R>,
    Path(use_case_id): Path<u64>,
) -> Response
where
    R: UseCaseRepository + 'static,
{
    match registry.delete(&UseCaseId(use_case_id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => failure(error),
    }
}
