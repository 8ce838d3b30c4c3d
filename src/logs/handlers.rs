use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    auth::{extractors::AuthUser, guard},
    error::ApiError,
    logs::dto::AccessLogResponse,
    pagination::{Paginated, SearchFilter},
    state::AppState,
};

pub fn log_routes() -> Router<AppState> {
    Router::new()
        .route("/logs", get(list))
        .route("/logs/user/:user_id", get(list_by_user))
}

#[instrument(skip(state, claims))]
pub async fn list(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Query(filter): Query<SearchFilter>,
) -> Result<Json<Paginated<AccessLogResponse>>, ApiError> {
    guard::authorize(Some(&claims), guard::required_roles("GET /logs"))?;

    let (rows, total) = state.logs.list_all_paginated(&filter).await?;
    let items = rows.into_iter().map(AccessLogResponse::from).collect();
    Ok(Json(Paginated::new(items, total, &filter)))
}

#[instrument(skip(state, claims))]
pub async fn list_by_user(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<AccessLogResponse>>, ApiError> {
    guard::authorize(Some(&claims), guard::required_roles("GET /logs/user"))?;

    let rows = state.logs.list_by_user(user_id).await?;
    Ok(Json(rows.into_iter().map(AccessLogResponse::from).collect()))
}
