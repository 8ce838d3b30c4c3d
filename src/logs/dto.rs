use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::logs::repo::AccessLogWithUser;

/// User reference resolved on an audit entry.
#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct AccessLogResponse {
    pub id: Uuid,
    pub user: UserInfo,
    pub ip: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

impl From<AccessLogWithUser> for AccessLogResponse {
    fn from(row: AccessLogWithUser) -> Self {
        // Placeholder identity when the referenced user no longer resolves.
        let user = match (row.user_name, row.user_email) {
            (Some(name), Some(email)) => UserInfo {
                id: row.user_id,
                name,
                email,
            },
            _ => UserInfo {
                id: row.user_id,
                name: "Unknown".into(),
                email: "unknown@example.com".into(),
            },
        };
        Self {
            id: row.id,
            user,
            ip: row.ip,
            timestamp: row.timestamp,
        }
    }
}
