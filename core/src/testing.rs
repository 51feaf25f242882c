//! In-crate test doubles.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::auth::Credentials;
use crate::config::ClientConfig;
use crate::connection::Connection;
use crate::error::Result;
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::Transport;

pub(crate) const BASE_URL: &str = "http://localhost:3000";

/// Replays queued responses and records every request it was handed.
#[derive(Default)]
pub(crate) struct StubTransport {
    responses: Mutex<VecDeque<HttpResponse>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl StubTransport {
    pub(crate) fn push_response(&self, status: u16, body: &str) {
        self.responses.lock().unwrap().push_back(HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        });
    }

    pub(crate) fn push_json(&self, status: u16, body: serde_json::Value) {
        self.push_response(status, &body.to_string());
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Transport for StubTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(self.responses.lock().unwrap().pop_front().unwrap_or(HttpResponse {
            status: 599,
            headers: Vec::new(),
            body: "no stubbed response".to_string(),
        }))
    }
}

pub(crate) fn credentials() -> Credentials {
    Credentials::new(
        "69a6de70-0000-47e3-e053-5b8c7c11a4d1",
        "TESTKEY01",
        include_str!("../tests/fixtures/AuthKey_TESTKEY01.p8"),
    )
}

pub(crate) fn connection_with(stub: StubTransport) -> (Connection, Arc<StubTransport>) {
    let stub = Arc::new(stub);
    let connection = Connection::with_transport(credentials(), ClientConfig::new(BASE_URL), Arc::clone(&stub))
        .expect("test connection");
    (connection, stub)
}
