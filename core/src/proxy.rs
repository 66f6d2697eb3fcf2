//! API proxy forwarder.
//!
//! # Design
//! `ApiProxy` holds only the upstream origin. Forwarding is split the same
//! way as the auth client: [`ApiProxy::build_target`] turns the incoming
//! `RequestContext` into the upstream `HttpRequest`, the host executes it,
//! and [`ApiProxy::relay`] turns the upstream answer into the outgoing
//! response. Preflight and transport failures are answered locally.
//!
//! The relayed body is the upstream's raw bytes. JSON is parsed only to
//! decide what to log, never re-serialized, so number precision, key order
//! and non-JSON payloads survive untouched.

use tracing::{debug, error, info, warn};

use crate::context::RequestContext;
use crate::error::ProxyError;
use crate::http::{Headers, HttpRequest, HttpResponse};
use crate::types::ErrorDetail;

/// Path prefix that triggers forwarding, both at the edge and upstream.
pub const API_PREFIX: &str = "/api/v1";

/// Upstream origin used when nothing is configured.
pub const DEFAULT_UPSTREAM_ORIGIN: &str = "http://localhost:8000";

/// `detail` of the 502 body produced on transport failure.
pub const BACKEND_UNREACHABLE: &str = "Failed to connect to backend API";

/// Request headers tied to the client's connection to the edge.
const HOP_REQUEST_HEADERS: [&str; 3] = ["host", "transfer-encoding", "connection"];

/// Response headers the serving layer recomputes for the outgoing connection.
const HOP_RESPONSE_HEADERS: [&str; 3] = ["connection", "transfer-encoding", "content-length"];

const CORS_PREFLIGHT_HEADERS: [(&str, &str); 5] = [
    ("Access-Control-Allow-Origin", "*"),
    ("Access-Control-Allow-Methods", "GET, POST, PUT, PATCH, DELETE, OPTIONS"),
    ("Access-Control-Allow-Headers", "Content-Type, Authorization, Cookie"),
    ("Access-Control-Allow-Credentials", "true"),
    ("Access-Control-Max-Age", "86400"),
];

/// The upstream call derived from one proxied request.
pub type ProxyTarget = HttpRequest;

/// The upstream's answer, before it is relayed.
pub type UpstreamResponse = HttpResponse;

#[derive(Debug, Clone)]
pub struct ApiProxy {
    origin: String,
}

impl ApiProxy {
    pub fn new(origin: &str) -> Self {
        Self {
            origin: origin.trim_end_matches('/').to_string(),
        }
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// `<origin>/api/v1/<rest>[?query]`.
    pub fn target_url(&self, rest: &str, query: Option<&str>) -> String {
        let mut url = format!("{}{API_PREFIX}/{rest}", self.origin);
        if let Some(query) = query.filter(|q| !q.is_empty()) {
            url.push('?');
            url.push_str(query);
        }
        url
    }

    /// Build the upstream request for `ctx`.
    ///
    /// A JSON body that fails to parse is logged and dropped; the call still
    /// goes ahead without a body.
    pub fn build_target(&self, ctx: &RequestContext) -> Result<ProxyTarget, ProxyError> {
        let rest = upstream_path(ctx.path())?;
        let url = self.target_url(rest, ctx.query());
        info!(method = %ctx.method(), path = ctx.path(), target = %url, "proxying request");

        let body = match forward_body(ctx) {
            Ok(body) => body,
            Err(err) => {
                warn!(path = ctx.path(), error = %err, "failed to parse request body, forwarding without it");
                None
            }
        };

        Ok(HttpRequest {
            method: ctx.method(),
            url,
            headers: forward_headers(ctx.headers()),
            body,
        })
    }

    /// Turn the upstream answer into the outgoing response.
    pub fn relay(&self, upstream: UpstreamResponse) -> HttpResponse {
        info!(status = upstream.status, "backend responded");

        if serde_json::from_slice::<serde_json::Value>(&upstream.body).is_err() {
            debug!(status = upstream.status, "backend body is not JSON, relaying as text");
        }
        if !upstream.is_success() {
            error!(status = upstream.status, body = %upstream.text(), "backend error response");
        }

        let headers = upstream
            .headers
            .into_iter()
            .filter(|(name, _)| !is_one_of(name, &HOP_RESPONSE_HEADERS))
            .collect();

        HttpResponse {
            status: upstream.status,
            headers,
            body: upstream.body,
        }
    }

    /// Answer a CORS preflight without contacting upstream.
    pub fn preflight() -> HttpResponse {
        HttpResponse {
            status: 204,
            headers: CORS_PREFLIGHT_HEADERS.into_iter().collect(),
            body: Vec::new(),
        }
    }

    /// 502 response for an upstream that could not be reached.
    pub fn transport_failure(err: &ProxyError) -> HttpResponse {
        error!(error = %err, "error connecting to backend");
        let body = ErrorDetail {
            detail: BACKEND_UNREACHABLE.into(),
            error: Some(err.to_string()),
        };
        let mut headers = Headers::new();
        headers.append("content-type", "application/json");
        HttpResponse {
            status: 502,
            headers,
            body: serde_json::to_vec(&body).unwrap_or_default(),
        }
    }
}

impl Default for ApiProxy {
    fn default() -> Self {
        Self::new(DEFAULT_UPSTREAM_ORIGIN)
    }
}

/// The part of `path` after `/api/v1/`.
pub fn upstream_path(path: &str) -> Result<&str, ProxyError> {
    let outside = || ProxyError::OutsidePrefix(path.to_string());
    let rest = path.strip_prefix(API_PREFIX).ok_or_else(outside)?;
    if rest.is_empty() {
        return Ok(rest);
    }
    rest.strip_prefix('/').ok_or_else(outside)
}

/// Every incoming header except the hop-specific ones. `Cookie` stays, so
/// the upstream sees the caller's session.
pub fn forward_headers(headers: &Headers) -> Headers {
    headers
        .iter()
        .filter(|(name, _)| !is_one_of(name, &HOP_REQUEST_HEADERS))
        .collect()
}

/// Body to send upstream. Only POST, PUT and PATCH carry one; JSON bodies
/// are parsed and re-serialized, anything else is forwarded as is.
pub fn forward_body(ctx: &RequestContext) -> Result<Option<Vec<u8>>, ProxyError> {
    if !ctx.method().carries_body() {
        return Ok(None);
    }
    let raw = ctx.body().unwrap_or_default();
    let is_json = ctx
        .content_type()
        .is_some_and(|ct| ct.contains("application/json"));
    if !is_json {
        return Ok(Some(raw.to_vec()));
    }
    let value: serde_json::Value = serde_json::from_slice(raw)?;
    Ok(Some(serde_json::to_vec(&value)?))
}

fn is_one_of(name: &str, set: &[&str]) -> bool {
    set.iter().any(|h| name.eq_ignore_ascii_case(h))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpMethod;

    fn proxy() -> ApiProxy {
        ApiProxy::new("http://backend:8000/")
    }

    fn post_json(path: &str, body: &str) -> RequestContext {
        RequestContext::builder(HttpMethod::Post, path)
            .header("Content-Type", "application/json; charset=utf-8")
            .body(body)
            .build()
    }

    #[test]
    fn target_url_joins_origin_prefix_and_query() {
        assert_eq!(proxy().target_url("users/42", None), "http://backend:8000/api/v1/users/42");
        assert_eq!(
            proxy().target_url("users", Some("page=2&size=10")),
            "http://backend:8000/api/v1/users?page=2&size=10"
        );
        assert_eq!(proxy().target_url("users", Some("")), "http://backend:8000/api/v1/users");
    }

    #[test]
    fn upstream_path_strips_prefix() {
        assert_eq!(upstream_path("/api/v1/auth/me").unwrap(), "auth/me");
        assert_eq!(upstream_path("/api/v1").unwrap(), "");
        assert!(matches!(upstream_path("/api/v10/x"), Err(ProxyError::OutsidePrefix(_))));
        assert!(matches!(upstream_path("/dashboard"), Err(ProxyError::OutsidePrefix(_))));
    }

    #[test]
    fn hop_headers_are_not_forwarded() {
        let ctx = RequestContext::builder(HttpMethod::Get, "/api/v1/users")
            .header("Host", "edge.local")
            .header("Connection", "keep-alive")
            .header("Transfer-Encoding", "chunked")
            .header("Authorization", "Bearer t")
            .header("Cookie", "eduequity_session=s")
            .build();
        let target = proxy().build_target(&ctx).unwrap();
        assert!(!target.headers.contains("host"));
        assert!(!target.headers.contains("connection"));
        assert!(!target.headers.contains("transfer-encoding"));
        assert_eq!(target.headers.get("authorization"), Some("Bearer t"));
        assert_eq!(target.headers.get("cookie"), Some("eduequity_session=s"));
    }

    #[test]
    fn json_body_is_normalized() {
        let ctx = post_json("/api/v1/quizzes", "{ \"a\" :  1 }");
        let target = proxy().build_target(&ctx).unwrap();
        assert_eq!(target.body.as_deref(), Some(&b"{\"a\":1}"[..]));
    }

    #[test]
    fn malformed_json_body_is_dropped() {
        let ctx = post_json("/api/v1/quizzes", "{not json");
        assert!(matches!(forward_body(&ctx), Err(ProxyError::MalformedJson(_))));
        let target = proxy().build_target(&ctx).unwrap();
        assert!(target.body.is_none());
        assert_eq!(target.method, HttpMethod::Post);
    }

    #[test]
    fn non_json_body_is_forwarded_raw() {
        let ctx = RequestContext::builder(HttpMethod::Put, "/api/v1/notes/1")
            .header("Content-Type", "text/plain")
            .body("  keep   spacing ")
            .build();
        let target = proxy().build_target(&ctx).unwrap();
        assert_eq!(target.body.as_deref(), Some(&b"  keep   spacing "[..]));
    }

    #[test]
    fn get_and_delete_never_carry_a_body() {
        for method in [HttpMethod::Get, HttpMethod::Delete, HttpMethod::Options] {
            let ctx = RequestContext::builder(method, "/api/v1/x")
                .header("Content-Type", "application/json")
                .body("{\"a\":1}")
                .build();
            assert!(forward_body(&ctx).unwrap().is_none(), "{method}");
        }
    }

    #[test]
    fn relay_keeps_status_body_and_each_set_cookie() {
        let upstream = HttpResponse {
            status: 200,
            headers: [
                ("content-type", "application/json"),
                ("content-length", "12"),
                ("set-cookie", "session=x; HttpOnly"),
                ("set-cookie", "role=y"),
                ("connection", "close"),
            ]
            .into_iter()
            .collect(),
            body: b"{\"ok\": 1.50}".to_vec(),
        };
        let out = proxy().relay(upstream);
        assert_eq!(out.status, 200);
        assert_eq!(out.body, b"{\"ok\": 1.50}");
        let cookies: Vec<_> = out.headers.get_all("set-cookie").collect();
        assert_eq!(cookies, vec!["session=x; HttpOnly", "role=y"]);
        assert!(!out.headers.contains("content-length"));
        assert!(!out.headers.contains("connection"));
    }

    #[test]
    fn relay_passes_errors_through() {
        let mut upstream = HttpResponse::new(404);
        upstream.body = br#"{"detail":"not found"}"#.to_vec();
        let out = proxy().relay(upstream);
        assert_eq!(out.status, 404);
        assert_eq!(out.text(), r#"{"detail":"not found"}"#);
    }

    #[test]
    fn preflight_is_local_and_empty() {
        let out = ApiProxy::preflight();
        assert_eq!(out.status, 204);
        assert!(out.body.is_empty());
        assert_eq!(out.headers.len(), 5);
        assert_eq!(out.headers.get("access-control-allow-origin"), Some("*"));
        assert_eq!(out.headers.get("access-control-max-age"), Some("86400"));
    }

    #[test]
    fn transport_failure_is_502_with_detail() {
        let out = ApiProxy::transport_failure(&ProxyError::Transport("connection refused".into()));
        assert_eq!(out.status, 502);
        let body: serde_json::Value = serde_json::from_slice(&out.body).unwrap();
        assert_eq!(body["detail"], BACKEND_UNREACHABLE);
        assert_eq!(body["error"], "connection refused");

        let typed: ErrorDetail = serde_json::from_slice(&out.body).unwrap();
        assert_eq!(typed.detail, BACKEND_UNREACHABLE);
        assert_eq!(typed.error.as_deref(), Some("connection refused"));
    }
}
