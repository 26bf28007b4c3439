use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};

use marquee_api::{MovieRecord, NewMovie};
use marquee_engine::ListRequest;

use super::AppState;
use crate::error::ApiError;

// ═══════════════════════════════════════════════════════════════
//  REST: GET /movies?search=&page=&limit=
// ═══════════════════════════════════════════════════════════════

#[derive(Deserialize)]
pub(crate) struct ListParams {
    search: Option<String>,
    page: Option<usize>,
    limit: Option<usize>,
}

pub(crate) async fn handle_list_movies(
    State(state): State<AppState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(params) = params.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let req = ListRequest {
        search: params.search,
        page: params.page,
        page_size: params.limit,
    };
    let page = state.gallery.list_all(&req).await?;
    Ok(Json(page))
}

// ═══════════════════════════════════════════════════════════════
//  REST: POST /movies
// ═══════════════════════════════════════════════════════════════

#[derive(Serialize)]
struct CreatedMovie {
    #[serde(flatten)]
    record: MovieRecord,
    target: String,
    overwritten: bool,
}

pub(crate) async fn handle_create_movie(
    State(state): State<AppState>,
    payload: Result<Json<NewMovie>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(movie) = payload.map_err(|e| ApiError::MalformedPayload(e.body_text()))?;
    let outcome = state.gallery.insert(movie).await?;
    let body = CreatedMovie {
        record: outcome.record,
        target: outcome.target,
        overwritten: outcome.overwritten,
    };
    Ok((StatusCode::CREATED, Json(body)))
}

// ═══════════════════════════════════════════════════════════════
//  REST: DELETE /movies?id=
// ═══════════════════════════════════════════════════════════════

#[derive(Deserialize)]
pub(crate) struct DeleteParams {
    id: Option<String>,
}

#[derive(Serialize)]
struct Deleted {
    success: bool,
    target: String,
}

pub(crate) async fn handle_delete_movie(
    State(state): State<AppState>,
    params: Result<Query<DeleteParams>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(params) = params.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let id = params
        .id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("missing movie id".into()))?;
    let outcome = state.gallery.delete_by_id(&id).await?;
    Ok(Json(Deleted {
        success: true,
        target: outcome.target,
    }))
}

// ═══════════════════════════════════════════════════════════════
//  REST: GET /api/targets, GET /healthz
// ═══════════════════════════════════════════════════════════════

pub(crate) async fn handle_list_targets(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.gallery.target_status().await)
}

pub(crate) async fn handle_health() -> &'static str {
    "ok"
}
