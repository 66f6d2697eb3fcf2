use std::sync::Arc;

use edge_core::{ApiProxy, AuthGate, RouteTable};

use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::upstream::Upstream;

/// Read-only state shared by every request.
#[derive(Debug, Clone)]
pub struct AppState {
    pub gate: Arc<AuthGate>,
    pub proxy: Arc<ApiProxy>,
    pub upstream: Upstream,
}

impl AppState {
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
        Ok(Self {
            gate: Arc::new(AuthGate::new(RouteTable::new(config.public_paths.iter().cloned()))),
            proxy: Arc::new(ApiProxy::new(&config.upstream_origin)),
            upstream: Upstream::new()?,
        })
    }
}
