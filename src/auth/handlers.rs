use axum::{extract::State, routing::post, Json, Router};
use tracing::{instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest},
        extractors::ClientIp,
        services::{self, is_valid_email},
    },
    error::ApiError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new().route("/auth/login", post(login))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    Json(mut payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    payload.email = payload.email.trim().to_string();

    if !is_valid_email(&payload.email) {
        warn!("login with malformed email");
        return Err(ApiError::Validation("Invalid email".into()));
    }
    if payload.password.is_empty() {
        return Err(ApiError::Validation("Password must not be empty".into()));
    }

    let response = services::authenticate(&state, &payload.email, &payload.password, &ip).await?;
    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        auth::services::hash_password,
        users::repo::{NewUser, Role},
    };

    #[tokio::test]
    async fn malformed_email_is_a_validation_error() {
        let state = AppState::fake();
        let err = login(
            State(state),
            ClientIp("10.0.0.1".into()),
            Json(LoginRequest {
                email: "not-an-email".into(),
                password: "secret1".into(),
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn login_round_trip_through_the_handler() {
        let state = AppState::fake();
        state
            .users
            .create(NewUser {
                name: "A".into(),
                email: "a@x.com".into(),
                password_hash: hash_password("secret1").expect("hash"),
                role: Role::User,
            })
            .await
            .expect("seed user");

        let Json(resp) = login(
            State(state),
            ClientIp("10.0.0.1".into()),
            Json(LoginRequest {
                email: " a@x.com ".into(),
                password: "secret1".into(),
            }),
        )
        .await
        .expect("login should succeed");
        assert_eq!(resp.token_type, "Bearer");
        assert_eq!(resp.expires_in, 86_400);
    }
}
