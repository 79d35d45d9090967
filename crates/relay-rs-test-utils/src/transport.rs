use async_trait::async_trait;
use parking_lot::Mutex;
use relay_rs_tools::{HttpTransport, RawResponse, TransportError, UpstreamRequest};
use reqwest::StatusCode;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub fn json_response(status: u16, body: &Value) -> RawResponse {
    text_response(status, body.to_string())
}

pub fn text_response(status: u16, body: impl Into<String>) -> RawResponse {
    RawResponse {
        status,
        reason: canonical_reason(status).map(str::to_string),
        body: body.into(),
    }
}

fn canonical_reason(status: u16) -> Option<&'static str> {
    StatusCode::from_u16(status)
        .ok()
        .and_then(|status| status.canonical_reason())
}

/// Transport that replays queued responses and records every request.
///
/// The last queued response is repeated once the queue drains.
#[derive(Debug, Clone)]
pub struct StubTransport {
    responses: Arc<Mutex<VecDeque<Result<RawResponse, TransportError>>>>,
    last: Arc<Mutex<Option<Result<RawResponse, TransportError>>>>,
    requests: Arc<Mutex<Vec<UpstreamRequest>>>,
    in_flight: Arc<AtomicUsize>,
    peak_in_flight: Arc<AtomicUsize>,
    delay: Option<Duration>,
}

impl StubTransport {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            last: Arc::new(Mutex::new(None)),
            requests: Arc::new(Mutex::new(Vec::new())),
            in_flight: Arc::new(AtomicUsize::new(0)),
            peak_in_flight: Arc::new(AtomicUsize::new(0)),
            delay: None,
        }
    }

    pub fn with_json(status: u16, body: Value) -> Self {
        Self::new().push_json(status, body)
    }

    pub fn push_json(self, status: u16, body: Value) -> Self {
        self.push(Ok(json_response(status, &body)))
    }

    pub fn push_text(self, status: u16, body: impl Into<String>) -> Self {
        self.push(Ok(text_response(status, body)))
    }

    pub fn push(self, response: Result<RawResponse, TransportError>) -> Self {
        self.responses.lock().push_back(response);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn requests(&self) -> Vec<UpstreamRequest> {
        self.requests.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    fn next_response(&self) -> Result<RawResponse, TransportError> {
        let mut last = self.last.lock();
        if let Some(response) = self.responses.lock().pop_front() {
            *last = Some(response);
        }
        last.clone()
            .unwrap_or_else(|| Err(TransportError::Request("no stub response queued".to_string())))
    }
}

impl Default for StubTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpTransport for StubTransport {
    async fn execute(&self, request: &UpstreamRequest) -> Result<RawResponse, TransportError> {
        self.requests.lock().push(request.clone());
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(current, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.next_response()
    }
}

/// Transport that fails every request before a response arrives.
#[derive(Debug, Clone)]
pub struct FailingTransport {
    message: String,
    calls: Arc<AtomicUsize>,
}

impl FailingTransport {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HttpTransport for FailingTransport {
    async fn execute(&self, _request: &UpstreamRequest) -> Result<RawResponse, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(TransportError::Request(self.message.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::text_response;

    #[test]
    fn responses_carry_canonical_reasons() {
        assert_eq!(
            text_response(503, "down").reason.as_deref(),
            Some("Service Unavailable")
        );
        assert_eq!(
            text_response(429, "").reason.as_deref(),
            Some("Too Many Requests")
        );
        assert_eq!(text_response(299, "").reason, None);
    }
}
