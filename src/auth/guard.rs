use crate::{auth::dto::Claims, error::ApiError, users::repo::Role};

/// Role requirements per protected route, consulted explicitly by the
/// handlers. An empty slice means the route is open.
pub fn required_roles(route: &str) -> &'static [Role] {
    match route {
        "GET /users" | "GET /logs" | "GET /logs/user" => &[Role::Admin],
        _ => &[],
    }
}

/// Plain role check: an empty required set allows any caller.
pub fn allow(role: Role, required: &[Role]) -> bool {
    required.is_empty() || required.contains(&role)
}

/// Full gate: a missing identity and a present-but-underprivileged one
/// are distinct failures.
pub fn authorize(identity: Option<&Claims>, required: &[Role]) -> Result<(), ApiError> {
    if required.is_empty() {
        return Ok(());
    }
    let claims = identity.ok_or(ApiError::NoIdentity)?;
    if allow(claims.role, required) {
        Ok(())
    } else {
        Err(ApiError::InsufficientPrivilege)
    }
}
