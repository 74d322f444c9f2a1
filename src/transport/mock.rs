//! Recording transport for tests.

use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use super::{BoxFuture, Transport};
use crate::error::GatewayError;
use crate::proxy::{ApiMethod, ConsoleRequest};

type Responder = Box<dyn Fn(&ConsoleRequest) -> Result<Value, GatewayError> + Send + Sync>;

/// Records every request and answers from a closure. Tracks how many requests are in
/// flight at once so tests can assert strict serialization.
pub(crate) struct MockTransport {
    responder: Responder,
    calls: Mutex<Vec<ConsoleRequest>>,
    searches: Mutex<Vec<(String, Value)>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockTransport {
    pub(crate) fn new<F>(responder: F) -> Self
    where
        F: Fn(&ConsoleRequest) -> Result<Value, GatewayError> + Send + Sync + 'static,
    {
        Self {
            responder: Box::new(responder),
            calls: Mutex::new(Vec::new()),
            searches: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Every console call succeeds with `{"acknowledged": true}`.
    pub(crate) fn ok() -> Self {
        Self::new(|_| Ok(json!({ "acknowledged": true })))
    }

    pub(crate) fn calls(&self) -> Vec<ConsoleRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn calls_with(&self, method: ApiMethod) -> Vec<ConsoleRequest> {
        self.calls()
            .into_iter()
            .filter(|c| c.method == method)
            .collect()
    }

    pub(crate) fn searches(&self) -> Vec<(String, Value)> {
        self.searches.lock().unwrap().clone()
    }

    pub(crate) fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

/// 404 in the shape the cluster returns it.
pub(crate) fn not_found() -> GatewayError {
    GatewayError::Status {
        status: 404,
        body: r#"{"found":false}"#.to_string(),
    }
}

pub(crate) fn server_error() -> GatewayError {
    GatewayError::Status {
        status: 500,
        body: "boom".to_string(),
    }
}

impl Transport for MockTransport {
    fn console<'a>(&'a self, request: &'a ConsoleRequest) -> BoxFuture<'a, Result<Value, GatewayError>> {
        Box::pin(async move {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            self.calls.lock().unwrap().push(request.clone());
            tokio::task::yield_now().await;
            let result = (self.responder)(request);
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            result
        })
    }

    fn search<'a>(&'a self, index: &'a str, body: &'a Value) -> BoxFuture<'a, Result<Value, GatewayError>> {
        Box::pin(async move {
            self.searches
                .lock()
                .unwrap()
                .push((index.to_string(), body.clone()));
            Ok(json!({ "hits": { "total": 0, "hits": [] } }))
        })
    }
}
