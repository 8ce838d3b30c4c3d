use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::users::repo::{Role, User};

/// Request body for user registration.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Role,
}

/// Public projection of a user; the password hash never leaves the store.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
        }
    }
}

#[cfg(test)]
mod tests {
    use time::OffsetDateTime;

    use super::*;

    #[test]
    fn role_defaults_to_user_when_omitted() {
        let req: CreateUserRequest = serde_json::from_str(
            r#"{"name":"A","email":"a@x.com","password":"secret1"}"#,
        )
        .expect("deserialize");
        assert_eq!(req.role, Role::User);
    }

    #[test]
    fn role_accepts_lowercase_admin() {
        let req: CreateUserRequest = serde_json::from_str(
            r#"{"name":"A","email":"a@x.com","password":"secret1","role":"admin"}"#,
        )
        .expect("deserialize");
        assert_eq!(req.role, Role::Admin);
    }

    #[test]
    fn response_never_contains_the_password_hash() {
        let user = User {
            id: Uuid::new_v4(),
            name: "A".into(),
            email: "a@x.com".into(),
            password_hash: "$argon2id$secret".into(),
            role: Role::User,
            created_at: OffsetDateTime::now_utc(),
        };
        let json = serde_json::to_string(&UserResponse::from(user)).expect("serialize");
        assert!(!json.contains("argon2"));
        assert!(!json.contains("password"));
        assert!(json.contains("a@x.com"));
        assert!(json.contains(r#""role":"user""#));
    }
}
