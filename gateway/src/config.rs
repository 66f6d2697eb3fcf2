//! Gateway configuration.
//!
//! Defaults are serialized into a figment and overridden by `EDUEQUITY_*`
//! environment variables. The frontend's `NEXT_PUBLIC_API_URL` is honoured
//! as a fallback for the upstream origin so existing deployments keep
//! working.

use std::net::SocketAddr;

use edge_core::proxy::DEFAULT_UPSTREAM_ORIGIN;
use edge_core::routes::DEFAULT_PUBLIC_PATHS;
use figment::providers::{Env, Serialized};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::error::GatewayError;

pub const ENV_PREFIX: &str = "EDUEQUITY_";
pub const LEGACY_UPSTREAM_VAR: &str = "NEXT_PUBLIC_API_URL";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct GatewayConfig {
    pub listen_addr: SocketAddr,
    pub upstream_origin: String,
    pub public_paths: Vec<String>,
    pub log_filter: String,
    pub json_logs: bool,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            upstream_origin: DEFAULT_UPSTREAM_ORIGIN.to_string(),
            public_paths: DEFAULT_PUBLIC_PATHS.iter().map(|p| p.to_string()).collect(),
            log_filter: "info".to_string(),
            json_logs: false,
        }
    }
}

impl GatewayConfig {
    pub fn figment() -> Figment {
        Figment::new()
            .merge(Serialized::defaults(GatewayConfig::default()))
            .merge(Env::raw().only(&[LEGACY_UPSTREAM_VAR]).map(|_| "upstream_origin".into()))
            .merge(Env::prefixed(ENV_PREFIX))
    }

    pub fn load() -> Result<Self, GatewayError> {
        Ok(Self::figment().extract()?)
    }
}
