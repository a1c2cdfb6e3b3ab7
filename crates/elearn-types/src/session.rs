use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ClientError;

/// Storage keys for the persisted session
pub const ACCESS_TOKEN_KEY: &str = "access_token";
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";
pub const USER_ID_KEY: &str = "user_id";
pub const ROLE_KEY: &str = "role";

/// Platform role of the signed-in user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Student,
    Teacher,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Student => "student",
            UserRole::Teacher => "teacher",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(UserRole::Student),
            "teacher" => Ok(UserRole::Teacher),
            other => Err(ClientError::Validation(format!("unknown role: {}", other))),
        }
    }
}

/// The persisted client session.
///
/// Owned by browser storage; the in-memory copy is rebuilt from storage on
/// every read so a refresh in one code path is visible to all others.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub user_id: Option<u64>,
    pub role: Option<UserRole>,
}

/// `Authorization` header value for an access token
pub fn bearer(access_token: &str) -> String {
    format!("Bearer {}", access_token)
}

/// Body of `POST /api/login/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Response of `POST /api/login/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access: String,
    pub refresh: String,
    pub user_id: u64,
    #[serde(default)]
    pub role: Option<UserRole>,
}

impl From<LoginResponse> for Session {
    fn from(r: LoginResponse) -> Self {
        Self {
            access_token: r.access,
            refresh_token: r.refresh,
            user_id: Some(r.user_id),
            role: r.role,
        }
    }
}

/// Response of `POST /api/token/refresh/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub access: String,
}

/// Body of `POST /api/register/`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
}
