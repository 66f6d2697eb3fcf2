//! Translation between axum types and the core's plain-data types.

use axum::body::Body;
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use edge_core::{Headers, HttpMethod, HttpResponse, RequestContext};
use tracing::warn;

/// Copy every header value, in order, repeated names included.
pub fn headers_from(map: &HeaderMap) -> Headers {
    map.iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect()
}

/// Build the request context from the request head and an optional body.
pub fn context_from(
    method: HttpMethod,
    uri: &Uri,
    headers: &HeaderMap,
    body: Option<Vec<u8>>,
) -> RequestContext {
    let mut builder = RequestContext::builder(method, uri.path()).headers(headers_from(headers));
    if let Some(query) = uri.query() {
        builder = builder.query(query);
    }
    if let Some(body) = body {
        builder = builder.body(body);
    }
    builder.build()
}

/// Turn a core response into an axum one. Each header entry is appended on
/// its own, so repeated `Set-Cookie` values stay separate.
pub fn into_axum(response: HttpResponse) -> Response {
    let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::BAD_GATEWAY);
    let mut out = Response::new(Body::from(response.body));
    *out.status_mut() = status;
    let headers = out.headers_mut();
    for (name, value) in response.headers {
        match (HeaderName::try_from(name.as_str()), HeaderValue::try_from(value.as_str())) {
            (Ok(name), Ok(value)) => {
                headers.append(name, value);
            }
            _ => warn!(header = %name, "dropping header that cannot be relayed"),
        }
    }
    out
}

/// Handler return type for responses produced by the core.
#[derive(Debug)]
pub struct Relayed(pub HttpResponse);

impl IntoResponse for Relayed {
    fn into_response(self) -> Response {
        into_axum(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    #[test]
    fn repeated_set_cookie_survives_conversion() {
        let mut response = HttpResponse::new(200);
        response.headers.append("set-cookie", "session=x");
        response.headers.append("set-cookie", "role=y");
        let out = into_axum(response);
        let values: Vec<_> = out.headers().get_all("set-cookie").iter().collect();
        assert_eq!(values.len(), 2);
        assert_eq!(values[0], "session=x");
        assert_eq!(values[1], "role=y");
    }

    #[test]
    fn context_keeps_query_and_cookies() {
        let (parts, _) = Request::builder()
            .uri("/api/v1/users?page=2")
            .header("cookie", "eduequity_session=s; user_role=teacher")
            .body(())
            .unwrap()
            .into_parts();
        let ctx = context_from(HttpMethod::Get, &parts.uri, &parts.headers, None);
        assert_eq!(ctx.path(), "/api/v1/users");
        assert_eq!(ctx.query(), Some("page=2"));
        assert_eq!(ctx.role(), Some("teacher"));
        assert!(ctx.body().is_none());
    }

    #[test]
    fn invalid_status_becomes_bad_gateway() {
        let out = into_axum(HttpResponse::new(42));
        assert_eq!(out.status(), StatusCode::BAD_GATEWAY);
    }
}
