use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        extractors::AuthUser,
        guard,
        services::{hash_password, is_valid_email},
    },
    error::ApiError,
    pagination::{Paginated, SearchFilter},
    state::AppState,
    users::{
        dto::{CreateUserRequest, UserResponse},
        repo::NewUser,
    },
};

pub fn user_routes() -> Router<AppState> {
    Router::new().route("/users", post(create).get(list))
}

#[instrument(skip(state, payload))]
pub async fn create(
    State(state): State<AppState>,
    Json(mut payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    payload.name = payload.name.trim().to_string();
    payload.email = payload.email.trim().to_string();

    if payload.name.is_empty() {
        return Err(ApiError::Validation("Name must not be empty".into()));
    }
    if !is_valid_email(&payload.email) {
        return Err(ApiError::Validation("Invalid email".into()));
    }
    if payload.password.len() < 6 {
        return Err(ApiError::Validation("Password too short".into()));
    }

    // Pre-check keeps the common case friendly; the unique index settles
    // concurrent registrations.
    if state.users.find_by_email(&payload.email).await?.is_some() {
        warn!("email already registered");
        return Err(ApiError::Conflict("Email already registered".into()));
    }

    let password_hash = hash_password(&payload.password).map_err(ApiError::Internal)?;
    let user = state
        .users
        .create(NewUser {
            name: payload.name,
            email: payload.email,
            password_hash,
            role: payload.role,
        })
        .await?;

    info!(user_id = %user.id, "user created");
    Ok((StatusCode::CREATED, Json(user.into())))
}

#[instrument(skip(state, claims))]
pub async fn list(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Query(filter): Query<SearchFilter>,
) -> Result<Json<Paginated<UserResponse>>, ApiError> {
    guard::authorize(Some(&claims), guard::required_roles("GET /users"))?;

    let (users, total) = state.users.find_all_paginated(&filter).await?;
    let items = users.into_iter().map(UserResponse::from).collect();
    Ok(Json(Paginated::new(items, total, &filter)))
}
