//! Console proxy addressing
//!
//! Every cluster call goes through the UI's developer-console proxy: an HTTP POST to
//! `<kibana_url><console_path>?path=<api path>&method=<METHOD>`. This module builds those
//! query strings and knows the API paths used by the gateway.

use serde_json::Value;
use std::fmt;

/// Default console proxy route on the UI server.
pub const DEFAULT_CONSOLE_PATH: &str = "/api/console/proxy";
/// Default watcher API prefix (`_xpack/watcher` on 6.x clusters).
pub const DEFAULT_WATCHER_PREFIX: &str = "_watcher";

/// Method of the underlying cluster API call (the proxy request itself is always POST).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiMethod {
    Get,
    Put,
    Delete,
}

impl ApiMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiMethod::Get => "GET",
            ApiMethod::Put => "PUT",
            ApiMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for ApiMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Encode the proxy query string for one underlying call.
pub fn create_query(method: ApiMethod, path: &str) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .append_pair("path", path)
        .append_pair("method", method.as_str())
        .finish()
}

/// One call to be tunnelled through the console proxy.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsoleRequest {
    pub method: ApiMethod,
    pub path: String,
    pub body: Option<Value>,
}

impl ConsoleRequest {
    pub fn new(method: ApiMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
        }
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn query_string(&self) -> String {
        create_query(self.method, &self.path)
    }
}

/// API path templates for watches, stored scripts and ML jobs.
#[derive(Debug, Clone)]
pub struct ApiPaths {
    watch: String,
}

impl ApiPaths {
    /// `watcher_prefix` is e.g. `_watcher` or `_xpack/watcher`.
    pub fn new(watcher_prefix: &str) -> Self {
        let prefix = watcher_prefix.trim().trim_matches('/');
        Self {
            watch: format!("{}/watch/", prefix),
        }
    }

    pub fn get_watch(&self, alert_id: &str) -> ConsoleRequest {
        ConsoleRequest::new(ApiMethod::Get, format!("{}{}", self.watch, alert_id))
    }

    pub fn delete_watch(&self, alert_id: &str) -> ConsoleRequest {
        ConsoleRequest::new(ApiMethod::Delete, format!("{}{}", self.watch, alert_id))
    }

    pub fn edit_watch(&self, alert_id: &str, body: Value) -> ConsoleRequest {
        ConsoleRequest::new(ApiMethod::Put, format!("{}{}", self.watch, alert_id)).with_body(body)
    }

    pub fn activate_watch(&self, alert_id: &str) -> ConsoleRequest {
        ConsoleRequest::new(ApiMethod::Put, format!("{}{}/_activate", self.watch, alert_id))
    }

    pub fn deactivate_watch(&self, alert_id: &str) -> ConsoleRequest {
        ConsoleRequest::new(ApiMethod::Put, format!("{}{}/_deactivate", self.watch, alert_id))
    }

    pub fn get_script(&self, name: &str) -> ConsoleRequest {
        ConsoleRequest::new(ApiMethod::Get, format!("_scripts/{}", name))
    }

    pub fn put_script(&self, name: &str, body: Value) -> ConsoleRequest {
        ConsoleRequest::new(ApiMethod::Put, format!("_scripts/{}", name)).with_body(body)
    }

    pub fn get_ml_job(&self, job_id: &str) -> ConsoleRequest {
        ConsoleRequest::new(ApiMethod::Get, format!("_ml/anomaly_detectors/{}", job_id))
    }

    pub fn list_datafeeds(&self) -> ConsoleRequest {
        ConsoleRequest::new(ApiMethod::Get, "_ml/datafeeds")
    }
}

impl Default for ApiPaths {
    fn default() -> Self {
        Self::new(DEFAULT_WATCHER_PREFIX)
    }
}
