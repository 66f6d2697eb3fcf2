//! The `/api/v1/{*rest}` route.

use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
};
use edge_core::{ApiProxy, HttpMethod};
use tracing::warn;

use crate::convert::{context_from, Relayed};
use crate::state::AppState;

/// Largest request body the edge buffers before forwarding.
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// HEAD is sent upstream as GET and answered with the headers only.
pub async fn forward(State(state): State<AppState>, request: Request) -> Response {
    let head = *request.method() == Method::HEAD;
    let method = if head {
        HttpMethod::Get
    } else {
        match request.method().as_str().parse::<HttpMethod>() {
            Ok(method) => method,
            Err(_) => return StatusCode::METHOD_NOT_ALLOWED.into_response(),
        }
    };
    if method == HttpMethod::Options {
        return Relayed(ApiProxy::preflight()).into_response();
    }

    let (parts, body) = request.into_parts();
    let body = if method.carries_body() {
        match read_body(body).await {
            Ok(body) => Some(body),
            Err(response) => return response,
        }
    } else {
        None
    };
    let ctx = context_from(method, &parts.uri, &parts.headers, body);

    let target = match state.proxy.build_target(&ctx) {
        Ok(target) => target,
        Err(err) => {
            warn!(error = %err, "request reached the forwarder outside its prefix");
            return StatusCode::NOT_FOUND.into_response();
        }
    };

    let mut response = match state.upstream.execute(target).await {
        Ok(upstream) => state.proxy.relay(upstream),
        Err(err) => ApiProxy::transport_failure(&err),
    };
    if head {
        response.body.clear();
    }
    Relayed(response).into_response()
}

async fn read_body(body: Body) -> Result<Vec<u8>, Response> {
    match to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => Ok(bytes.to_vec()),
        Err(err) => {
            warn!(error = %err, "failed to read request body");
            Err(StatusCode::PAYLOAD_TOO_LARGE.into_response())
        }
    }
}
