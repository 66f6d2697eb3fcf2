//! Edge authorization middleware.
//!
//! Runs in front of every route, the page fallback included. The request
//! body is never read here; the gate only needs the path and cookies.
//!
//! CORS preflights under the proxy prefix skip the gate: browsers send them
//! without cookies, and the forwarder answers them locally without ever
//! contacting upstream.

use axum::{
    extract::{Request, State},
    http::{Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use edge_core::{proxy::upstream_path, Decision, HttpMethod};
use tracing::{debug, info_span, Instrument};
use uuid::Uuid;

use crate::convert::context_from;
use crate::state::AppState;

pub async fn authorize(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let span = info_span!(
        "request",
        id = %Uuid::new_v4(),
        method = %request.method(),
        path = %request.uri().path(),
    );
    async move {
        let Some(method) = gated_method(request.method()) else {
            return StatusCode::METHOD_NOT_ALLOWED.into_response();
        };
        if method == HttpMethod::Options && upstream_path(request.uri().path()).is_ok() {
            return next.run(request).await;
        }
        let ctx = context_from(method, request.uri(), request.headers(), None);
        match state.gate.decide(&ctx) {
            Decision::Allow => next.run(request).await,
            Decision::RedirectTo(location) => {
                debug!(%location, "redirecting");
                Redirect::temporary(&location).into_response()
            }
        }
    }
    .instrument(span)
    .await
}

/// HEAD is gated exactly like GET; methods outside the edge's set are
/// refused before they reach any route.
fn gated_method(method: &Method) -> Option<HttpMethod> {
    if *method == Method::HEAD {
        return Some(HttpMethod::Get);
    }
    method.as_str().parse().ok()
}
