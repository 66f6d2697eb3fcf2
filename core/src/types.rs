//! DTOs for the upstream auth API.
//!
//! # Design
//! These mirror the backend's auth schemas but are defined independently of
//! the mock upstream crate; the integration tests catch schema drift. `role`
//! stays a string because the backend stores it as one; [`User::role`]
//! interprets it against the shared role table.

use serde::{Deserialize, Serialize};

use crate::routes::{role_home, Role};

/// A user as returned by `/auth/me` and `/auth/register`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub is_active: bool,
    #[serde(rename = "role")]
    pub role_name: String,
}

impl User {
    pub fn role(&self) -> Option<Role> {
        self.role_name.parse().ok()
    }

    /// Where this user lands after signing in.
    pub fn dashboard_url(&self) -> &'static str {
        role_home(Some(&self.role_name))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthStatus {
    pub status: String,
    pub auth_version: String,
}

/// Error body: the backend's `{detail}` and the edge's 502
/// `{detail, error}` when upstream is unreachable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub detail: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
