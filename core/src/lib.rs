//! Request-dispatch core of the EduEquity web edge.
//!
//! # Overview
//! Two pure components decide what happens to every request reaching the
//! web tier:
//! - [`AuthGate`] maps the path, the session cookie and the role cookie to
//!   a [`Decision`]: allow, or redirect.
//! - [`ApiProxy`] turns requests under `/api/v1` into upstream calls and
//!   upstream answers back into responses.
//!
//! [`AuthClient`] is a typed wrapper for the upstream's auth endpoints.
//!
//! # Design
//! - Host-does-IO: nothing in this crate touches the network. Builders
//!   produce [`HttpRequest`] values, parsers consume [`HttpResponse`] values.
//! - Framework requests are converted to a [`RequestContext`] once, at the
//!   server boundary.
//! - The role → dashboard table exists once, in [`routes`].

pub mod client;
pub mod context;
pub mod error;
pub mod gate;
pub mod http;
pub mod proxy;
pub mod routes;
pub mod types;

pub use client::AuthClient;
pub use context::{RequestContext, REFRESH_COOKIE, ROLE_COOKIE, SESSION_COOKIE};
pub use error::{ApiError, ProxyError};
pub use gate::{AuthGate, Decision};
pub use http::{Headers, HttpMethod, HttpRequest, HttpResponse};
pub use proxy::{ApiProxy, ProxyTarget, UpstreamResponse};
pub use routes::{role_home, Role, RouteClass, RouteTable};
pub use types::{HealthStatus, LoginRequest, RegisterRequest, TokenResponse, User};
