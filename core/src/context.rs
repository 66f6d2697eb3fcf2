//! The typed view of an incoming request.
//!
//! # Design
//! Framework request objects are translated into a `RequestContext` once, at
//! the server boundary. The gate and the forwarder only ever see this shape,
//! so neither depends on axum or inspects raw framework types. A context is
//! immutable once `build()` returns; cookies are parsed from the `Cookie`
//! headers at that point.

use std::collections::HashMap;

use crate::http::{Headers, HttpMethod};

/// Cookie whose presence asserts an authenticated session. Its value is
/// never interpreted at the edge.
pub const SESSION_COOKIE: &str = "eduequity_session";

/// Cookie the backend sets at login for rotating the session token.
pub const REFRESH_COOKIE: &str = "refresh_token";

/// Cookie carrying the caller's role, used only for dashboard routing.
pub const ROLE_COOKIE: &str = "user_role";

#[derive(Debug, Clone)]
pub struct RequestContext {
    method: HttpMethod,
    path: String,
    query: Option<String>,
    headers: Headers,
    cookies: HashMap<String, String>,
    body: Option<Vec<u8>>,
}

impl RequestContext {
    pub fn builder(method: HttpMethod, path: impl Into<String>) -> RequestContextBuilder {
        RequestContextBuilder {
            method,
            path: path.into(),
            query: None,
            headers: Headers::new(),
            body: None,
        }
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Raw query string without the leading `?`. Never empty.
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    pub fn has_session(&self) -> bool {
        self.cookies.contains_key(SESSION_COOKIE)
    }

    /// Raw role cookie value, recognized or not.
    pub fn role(&self) -> Option<&str> {
        self.cookie(ROLE_COOKIE)
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers.get("content-type")
    }

    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }
}

#[derive(Debug)]
pub struct RequestContextBuilder {
    method: HttpMethod,
    path: String,
    query: Option<String>,
    headers: Headers,
    body: Option<Vec<u8>>,
}

impl RequestContextBuilder {
    pub fn query(mut self, query: impl Into<String>) -> Self {
        let query = query.into();
        let query = query.trim_start_matches('?');
        self.query = (!query.is_empty()).then(|| query.to_string());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.append(name, value);
        self
    }

    pub fn headers(mut self, headers: Headers) -> Self {
        for (name, value) in headers {
            self.headers.append(name, value);
        }
        self
    }

    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn build(self) -> RequestContext {
        let mut cookies = HashMap::new();
        for header in self.headers.get_all("cookie") {
            for (name, value) in parse_cookie_header(header) {
                cookies.entry(name.to_string()).or_insert_with(|| value.to_string());
            }
        }
        RequestContext {
            method: self.method,
            path: self.path,
            query: self.query,
            headers: self.headers,
            cookies,
            body: self.body,
        }
    }
}

/// Value given to a bare cookie segment such as `Cookie: flag`.
const BARE_COOKIE_VALUE: &str = "true";

/// Split a `Cookie` header into `(name, value)` pairs. A segment without an
/// `=` is a cookie named by the whole segment with the value `"true"`, the
/// way browser-side cookie parsers read it. Empty names are skipped.
pub fn parse_cookie_header(header: &str) -> impl Iterator<Item = (&str, &str)> {
    header.split(';').filter_map(|pair| {
        let (name, value) = match pair.split_once('=') {
            Some((name, value)) => (name.trim(), value.trim().trim_matches('"')),
            None => (pair.trim(), BARE_COOKIE_VALUE),
        };
        if name.is_empty() {
            return None;
        }
        Some((name, value))
    })
}
