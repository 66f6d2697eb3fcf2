use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::State,
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{any, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "eduequity_session";
pub const REFRESH_COOKIE: &str = "refresh_token";
pub const ROLE_COOKIE: &str = "user_role";

const ACCESS_TOKEN_MAX_AGE: u32 = 30 * 60;
const REFRESH_TOKEN_MAX_AGE: u32 = 7 * 24 * 60 * 60;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub is_active: bool,
    pub role: String,
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub role: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Default)]
pub struct Store {
    /// email → (user, password)
    users: HashMap<String, (User, String)>,
    /// access token → user id
    sessions: HashMap<String, String>,
    /// refresh token → user id; each token is good for one refresh
    refresh_tokens: HashMap<String, String>,
}

impl Store {
    /// Mint an access/refresh pair for `user_id`.
    fn issue(&mut self, user_id: &str) -> (String, String) {
        let (access_token, refresh_token) = store.issue(&user.id);
    token_response(&access_token, &refresh_token, &user.role)
}

async fn refresh(State(db): State<Db>, headers: HeaderMap) -> Response {
    let Some(presented) = cookie(&headers, REFRESH_COOKIE) else {
        return detail(StatusCode::UNAUTHORIZED, "Refresh token not found in cookie or body");
    };
    let mut store = db.write().await;
    let Some(user_id) = store.refresh_tokens.remove(&presented) else {
        return detail(StatusCode::UNAUTHORIZED, "Invalid or expired refresh token");
    };
    let Some(user) = store.user_by_id(&user_id).cloned() else {
        return detail(StatusCode::UNAUTHORIZED, "User not found");
    };
    let (access_token, refresh_token) = store.issue(&user.id);
    token_response(&access_token, &refresh_token, &user.role)
}

/// Token body plus the three login cookies, each its own `Set-Cookie`.
fn token_response(access_token: &str, refresh_token: &str, role: &str) -> Response {
    let mut headers = HeaderMap::new();
    let cookies = [
        format!("{SESSION_COOKIE}={access_token}; HttpOnly; Max-Age={ACCESS_TOKEN_MAX_AGE}; Path=/; SameSite=lax"),
        format!("{REFRESH_COOKIE}={refresh_token}; HttpOnly; Max-Age={REFRESH_TOKEN_MAX_AGE}; Path=/; SameSite=lax"),
        format!("{ROLE_COOKIE}={role}; Max-Age={ACCESS_TOKEN_MAX_AGE}; Path=/; SameSite=lax"),
    ];
    for cookie in cookies {
        if let Ok(value) = cookie.parse() {
            headers.append(header::SET_COOKIE, value);
        }
    }

    let body = json!({ "access_token": access_token, "token_type": "bearer" });
    (headers, Json(body)).into_response()
}

async fn me(State(db): State<Db>, headers: HeaderMap) -> Response {
    let Some(token) = bearer_token(&headers).or_else(|| cookie(&headers, SESSION_COOKIE)) else {
        return detail(StatusCode::UNAUTHORIZED, "Could not validate credentials");
    };
    let store = db.read().await;
    let user = store
        .sessions
        .get(&token)
        .and_then(|id| store.user_by_id(id))
        .cloned();
    match user {
        Some(user) => Json(user).into_response(),
        None => detail(StatusCode::UNAUTHORIZED, "Could not validate credentials"),
    }
}

async fn logout(State(db): State<Db>, headers: HeaderMap) -> Response {
    {
        let mut store = db.write().await;
        if let Some(token) = cookie(&headers, SESSION_COOKIE) {
            store.sessions.remove(&token);
        }
        if let Some(token) = cookie(&headers, REFRESH_COOKIE) {
            store.refresh_tokens.remove(&token);
        }
    }
    let mut out = HeaderMap::new();
    for name in [SESSION_COOKIE, REFRESH_COOKIE, ROLE_COOKIE] {
        if let Ok(value) = format!("{name}=\"\"; Max-Age=0; Path=/").parse() {
            out.append(header::SET_COOKIE, value);
        }
    }
    (out, Json(json!({ "message": "Successfully logged out" }))).into_response()
}

/// Reflects what arrived so tests can see exactly what the proxy forwarded.
async fn echo(
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> Json<Value> {
    let headers: Vec<(String, String)> = headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();
    Json(json!({
        "method": method.as_str(),
        "path": uri.path(),
        "query": uri.query(),
        "headers": headers,
        "body": body,
    }))
}

async fn not_found() -> Response {
    detail(StatusCode::NOT_FOUND, "Not Found")
}

fn detail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "detail": message }))).into_response()
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::to_string)
}

fn cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(n, _)| *n == name)
        .map(|(_, value)| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_serializes_to_json() {
        let user = User {
            id: "u-1".to_string(),
            email: "s@school.edu".to_string(),
            full_name: "Student".to_string(),
            is_active: true,
            role: "student".to_string(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["id"], "u-1");
        assert_eq!(json["role"], "student");
        assert_eq!(json["is_active"], true);
    }

    #[test]
    fn register_rejects_missing_role() {
        let result: Result<RegisterRequest, _> =
            serde_json::from_str(r#"{"email":"a@b.c","password":"pw","full_name":"A"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn bearer_token_is_extracted() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Bearer abc".parse().unwrap());
        assert_eq!(bearer_token(&headers).as_deref(), Some("abc"));
    }

    #[test]
    fn non_bearer_authorization_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Basic abc".parse().unwrap());
        assert!(bearer_token(&headers).is_none());
    }

    #[test]
    fn session_cookie_is_found_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, "theme=dark; eduequity_session=tok".parse().unwrap());
        assert_eq!(cookie(&headers, SESSION_COOKIE).as_deref(), Some("tok"));
        assert!(cookie(&headers, REFRESH_COOKIE).is_none());
    }

    #[test]
    fn refresh_token_is_single_use() {
        let mut store = Store::default();
        let (_, refresh) = store.issue("u-1");
        assert_eq!(store.refresh_tokens.remove(&refresh).as_deref(), Some("u-1"));
        assert!(store.refresh_tokens.remove(&refresh).is_none());
    }
}
