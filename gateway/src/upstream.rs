//! Executes proxy targets against the upstream API.

use edge_core::{Headers, HttpMethod, ProxyError, ProxyTarget, UpstreamResponse};
use reqwest::{redirect, Client, Method};

use crate::error::GatewayError;

/// Thin wrapper over a shared `reqwest::Client`. No timeout is set: a hung
/// upstream holds the call until the host gives up.
#[derive(Debug, Clone)]
pub struct Upstream {
    client: Client,
}

impl Upstream {
    pub fn new() -> Result<Self, GatewayError> {
        let client = Client::builder()
            .redirect(redirect::Policy::none())
            .no_proxy()
            .build()?;
        Ok(Self { client })
    }

    pub async fn execute(&self, target: ProxyTarget) -> Result<UpstreamResponse, ProxyError> {
        let mut request = self.client.request(method(target.method), &target.url);
        for (name, value) in target.headers {
            // Framing is recomputed from the forwarded body.
            if name.eq_ignore_ascii_case("content-length") {
                continue;
            }
            request = request.header(name, value);
        }
        if let Some(body) = target.body {
            request = request.body(body);
        }

        let response = request.send().await.map_err(transport)?;
        let status = response.status().as_u16();
        let headers: Headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response.bytes().await.map_err(transport)?;

        Ok(UpstreamResponse {
            status,
            headers,
            body: body.to_vec(),
        })
    }
}

fn method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Delete => Method::DELETE,
        HttpMethod::Options => Method::OPTIONS,
    }
}

fn transport(err: reqwest::Error) -> ProxyError {
    ProxyError::Transport(err.to_string())
}
