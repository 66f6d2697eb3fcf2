//! Stateless request builder and response parser for the upstream auth API.
//!
//! # Design
//! `AuthClient` holds only a `base_url` and carries no mutable state between
//! calls. Each operation is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`. The
//! caller executes the round-trip. Pointed at the edge, requests travel
//! through the proxy; pointed at the backend origin, they go direct.

use crate::error::ApiError;
use crate::http::{Headers, HttpMethod, HttpRequest, HttpResponse};
use crate::proxy::API_PREFIX;
use crate::context::REFRESH_COOKIE;
use crate::types::{ErrorDetail, HealthStatus, LoginRequest, RegisterRequest, TokenResponse, User};

/// Synchronous, stateless client for `/api/v1/auth/*`.
#[derive(Debug, Clone)]
pub struct AuthClient {
    base_url: String,
}

impl AuthClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{API_PREFIX}/auth/{endpoint}", self.base_url)
    }

    pub fn build_login(&self, email: &str, password: &str) -> Result<HttpRequest, ApiError> {
        let input = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        self.json_request(HttpMethod::Post, "login", &input)
    }

    pub fn build_register(&self, input: &RegisterRequest) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, "register", input)
    }

    /// `GET /auth/me` authenticated with the session token as a bearer.
    pub fn build_current_user(&self, session_token: &str) -> HttpRequest {
        let mut headers = json_headers();
        headers.append("authorization", format!("Bearer {session_token}"));
        HttpRequest {
            method: HttpMethod::Get,
            url: self.url("me"),
            headers,
            body: None,
        }
    }

    /// `POST /auth/refresh`, presenting the refresh token as the cookie the
    /// backend set at login. The answer rotates both tokens.
    pub fn build_refresh(&self, refresh_token: &str) -> HttpRequest {
        let mut headers = Headers::new();
        headers.append("cookie", format!("{REFRESH_COOKIE}={refresh_token}"));
        HttpRequest {
            method: HttpMethod::Post,
            url: self.url("refresh"),
            headers,
            body: None,
        }
    }

    pub fn build_logout(&self) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Post,
            url: self.url("logout"),
            headers: Headers::new(),
            body: None,
        }
    }

    pub fn build_health(&self) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: self.url("health"),
            headers: Headers::new(),
            body: None,
        }
    }

    pub fn parse_login(&self, response: HttpResponse) -> Result<TokenResponse, ApiError> {
        check_status(&response, "Login failed")?;
        decode(&response)
    }

    pub fn parse_register(&self, response: HttpResponse) -> Result<User, ApiError> {
        check_status(&response, "Registration failed")?;
        decode(&response)
    }

    /// Any non-200 answer means "no current user"; only a 200 with a body
    /// that does not decode is an error.
    pub fn parse_current_user(&self, response: HttpResponse) -> Result<Option<User>, ApiError> {
        if response.status != 200 {
            return Ok(None);
        }
        decode(&response).map(Some)
    }

    pub fn parse_refresh(&self, response: HttpResponse) -> Result<TokenResponse, ApiError> {
        check_status(&response, "Token refresh failed")?;
        decode(&response)
    }

    pub fn parse_logout(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, "Logout failed")
    }

    pub fn parse_health(&self, response: HttpResponse) -> Result<HealthStatus, ApiError> {
        check_status(&response, "Health check failed")?;
        decode(&response)
    }

    fn json_request<T: serde::Serialize>(
        &self,
        method: HttpMethod,
        endpoint: &str,
        input: &T,
    ) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_vec(input).map_err(|e| ApiError::SerializationError(e.to_string()))?;
        Ok(HttpRequest {
            method,
            url: self.url(endpoint),
            headers: json_headers(),
            body: Some(body),
        })
    }
}

fn json_headers() -> Headers {
    [("content-type", "application/json")].into_iter().collect()
}

fn decode<T: serde::de::DeserializeOwned>(response: &HttpResponse) -> Result<T, ApiError> {
    serde_json::from_slice(&response.body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

/// Map a non-2xx response to `ApiError::Rejected`, preferring the backend's
/// `detail` field over `fallback`.
fn check_status(response: &HttpResponse, fallback: &str) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    let detail = serde_json::from_slice::<ErrorDetail>(&response.body)
        .ok()
        .map(|e| match e.detail {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        })
        .unwrap_or_else(|| fallback.to_string());
    Err(ApiError::Rejected {
        status: response.status,
        detail,
    })
}
