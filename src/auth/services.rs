use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use lazy_static::lazy_static;
use rand::rngs::OsRng;
use regex::Regex;
use std::time::Duration;
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::{debug, error, info, warn};

use crate::{
    auth::dto::{AuthResponse, Claims, JwtKeys},
    error::ApiError,
    state::AppState,
    users::repo::User,
};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

pub fn verify_password(plain: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        error!(error = %e, "argon2 parse hash error");
        anyhow::anyhow!(e.to_string())
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        let jwt = &state.config.jwt;
        Self {
            encoding: EncodingKey::from_secret(jwt.secret.as_bytes()),
            decoding: DecodingKey::from_secret(jwt.secret.as_bytes()),
            ttl: Duration::from_secs(jwt.expires_in_seconds()),
        }
    }
}

impl JwtKeys {
    /// Claims carry exactly the user's id/email/role, nothing else.
    pub fn sign(&self, user: &User) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let exp = now + TimeDuration::seconds(self.ttl.as_secs() as i64);
        let claims = Claims {
            sub: user.id,
            email: user.email.clone(),
            role: user.role,
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(user_id = %user.id, "jwt signed");
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> anyhow::Result<Claims> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default())?;
        Ok(data.claims)
    }
}

/// Login flow: lookup, verify, sign, audit. Token issuance and the audit
/// row are strictly gated on a verified credential pair.
pub async fn authenticate(
    state: &AppState,
    email: &str,
    password: &str,
    ip: &str,
) -> Result<AuthResponse, ApiError> {
    let user = match verify_credentials(state, email, password).await {
        Some(user) => user,
        None => {
            warn!(%ip, "login rejected");
            return Err(ApiError::Authentication);
        }
    };

    let keys = JwtKeys::from_ref(state);
    let access_token = keys.sign(&user).map_err(ApiError::Internal)?;
    let expires_in = state.config.jwt.expires_in_seconds();

    // The audit row is part of the success contract: if it cannot be
    // written, no token is handed out.
    state.logs.record(user.id, ip).await?;

    info!(user_id = %user.id, %ip, "user logged in");
    Ok(AuthResponse::new(access_token, expires_in))
}

/// Single catch boundary around lookup + hash verification. Unknown email,
/// wrong password and store/hash failures all collapse to None so the
/// caller cannot probe which emails exist.
async fn verify_credentials(state: &AppState, email: &str, password: &str) -> Option<User> {
    let user = match state.users.find_by_email(email).await {
        Ok(Some(user)) => user,
        Ok(None) => return None,
        Err(err) => {
            error!(error = %err, "user lookup failed during login");
            return None;
        }
    };
    match verify_password(password, &user.password_hash) {
        Ok(true) => Some(user),
        Ok(false) => None,
        Err(err) => {
            error!(error = %err, "password verification failed during login");
            None
        }
    }
}


#[cfg(test)]
mod jwt_tests {
    use super::*;
    use crate::users::repo::Role;
    use uuid::Uuid;

    fn keys(secret: &str) -> JwtKeys {
        JwtKeys {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::from_secs(86_400),
        }
    }

    fn user(role: Role) -> User {
        User {
            id: Uuid::new_v4(),
            name: "A".into(),
            email: "a@x.com".into(),
            password_hash: "h".into(),
            role,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn claims_mirror_the_user() {
        let keys = keys("dev-secret");
        let user = user(Role::Admin);
        let token = keys.sign(&user).expect("sign");
        let claims = keys.verify(&token).expect("verify");
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.email, user.email);
        assert_eq!(claims.role, Role::Admin);
        assert!(claims.exp > claims.iat);
        assert_eq!(claims.exp - claims.iat, 86_400);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let good = keys("secret-a");
        let bad = keys("secret-b");
        let token = good.sign(&user(Role::User)).expect("sign");
        assert!(bad.verify(&token).is_err());
    }

    #[test]
    fn tampered_token_is_rejected() {
        let keys = keys("dev-secret");
        let mut token = keys.sign(&user(Role::User)).expect("sign");
        token.push('x');
        assert!(keys.verify(&token).is_err());
    }
}

#[cfg(test)]
mod authenticate_tests {
    use super::*;
    use crate::{
        logs::repo::testing::MemoryLogStore,
        state::AppState,
        users::repo::{testing::MemoryUserStore, NewUser, Role, UserStore},
    };
    use std::sync::{Arc, Mutex};

    async fn state_with_user(
        email: &str,
        password: &str,
    ) -> (AppState, MemoryLogStore, User) {
        let users_data = Arc::new(Mutex::new(Vec::new()));
        let user_store = MemoryUserStore::shared(users_data.clone());
        let log_store = MemoryLogStore::new(users_data);

        let user = user_store
            .create(NewUser {
                name: "A".into(),
                email: email.into(),
                password_hash: hash_password(password).expect("hash"),
                role: Role::User,
            })
            .await
            .expect("create user");

        let state = AppState::fake_with(
            Arc::new(user_store),
            Arc::new(log_store.clone()),
        );
        (state, log_store, user)
    }

    #[tokio::test]
    async fn valid_credentials_yield_token_and_one_log_entry() {
        let (state, logs, user) = state_with_user("a@x.com", "secret1").await;

        let resp = authenticate(&state, "a@x.com", "secret1", "10.0.0.1")
            .await
            .expect("login should succeed");
        assert!(!resp.access_token.is_empty());
        assert_eq!(resp.token_type, "Bearer");
        assert_eq!(resp.expires_in, 86_400);

        let claims = JwtKeys::from_ref(&state)
            .verify(&resp.access_token)
            .expect("token verifies");
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.email, "a@x.com");
        assert_eq!(claims.role, Role::User);

        let entries = logs.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].user_id, user.id);
        assert_eq!(entries[0].ip, "10.0.0.1");
    }

    #[tokio::test]
    async fn second_login_appends_a_distinct_entry() {
        let (state, logs, _) = state_with_user("a@x.com", "secret1").await;

        authenticate(&state, "a@x.com", "secret1", "10.0.0.1")
            .await
            .expect("first login");
        authenticate(&state, "a@x.com", "secret1", "10.0.0.1")
            .await
            .expect("second login");

        let entries = logs.entries();
        assert_eq!(entries.len(), 2);
        assert_ne!(entries[0].id, entries[1].id);
    }

    #[tokio::test]
    async fn wrong_password_is_rejected_with_no_side_effects() {
        let (state, logs, _) = state_with_user("a@x.com", "secret1").await;

        let err = authenticate(&state, "a@x.com", "wrong", "10.0.0.1")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Authentication));
        assert!(logs.entries().is_empty());
    }

    #[tokio::test]
    async fn unknown_email_is_indistinguishable_from_wrong_password() {
        let (state, logs, _) = state_with_user("a@x.com", "secret1").await;

        let unknown = authenticate(&state, "ghost@x.com", "secret1", "10.0.0.1")
            .await
            .unwrap_err();
        let wrong = authenticate(&state, "a@x.com", "wrong", "10.0.0.1")
            .await
            .unwrap_err();

        assert_eq!(unknown.to_string(), wrong.to_string());
        assert_eq!(unknown.status(), wrong.status());
        assert!(logs.entries().is_empty());
    }
}
