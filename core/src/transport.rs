//! Execution of plain-data requests.
//!
//! [`UreqTransport`] performs exactly one blocking round trip per request.
//! Non-2xx statuses come back as ordinary responses so the endpoint can map
//! the error envelope; only transport-level failures are errors here.

use std::sync::Arc;
use std::time::Duration;

use crate::error::Result;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Executes one HTTP round trip. Implementations must not retry.
pub trait Transport: Send + Sync {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse> {
        (**self).execute(request)
    }
}

/// Blocking transport backed by a shared `ureq::Agent`.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(timeout))
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let url = request.url.as_str();
        let mut response = match (request.method, request.body.as_deref()) {
            (HttpMethod::Get, _) => {
                let mut builder = self.agent.get(url);
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                builder.call()?
            }
            (HttpMethod::Delete, _) => {
                let mut builder = self.agent.delete(url);
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                builder.call()?
            }
            (HttpMethod::Post, body) => {
                let mut builder = self.agent.post(url);
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                builder.send(body.unwrap_or_default().as_bytes())?
            }
            (HttpMethod::Patch, body) => {
                let mut builder = self.agent.patch(url);
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                builder.send(body.unwrap_or_default().as_bytes())?
            }
        };

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.body_mut().read_to_string()?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
