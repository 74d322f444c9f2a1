//! HTTP transport to the cluster
//!
//! [`Transport`] is the seam the gateway talks through. [`HttpTransport`] is the reqwest
//! implementation: console calls are POSTed to the UI's proxy route, searches go straight
//! to the search endpoint.

use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tracing::{debug, error, info};
use url::Url;

use crate::config::GatewaySettings;
use crate::error::GatewayError;
use crate::logging::{ellipse, mask_credential};
use crate::proxy::ConsoleRequest;

#[cfg(test)]
pub(crate) mod mock;

/// Longest error body kept in [`GatewayError::Status`].
const MAX_ERROR_BODY_CHARS: usize = 500;

/// Metadata keys whose values never reach the log unmasked.
const SECRET_METADATA_KEYS: &[&str] = &["line_notify_access_token"];

/// Request body as it may appear in the debug log: secrets masked, length capped.
fn loggable_body(body: &Value) -> String {
    let mut shown = body.clone();
    if let Some(metadata) = shown.get_mut("metadata").and_then(Value::as_object_mut) {
        for key in SECRET_METADATA_KEYS {
            if let Some(Value::String(secret)) = metadata.get_mut(*key) {
                if !secret.is_empty() {
                    *secret = mask_credential(secret);
                }
            }
        }
    }
    ellipse(&shown.to_string(), 2_000)
}

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Sends requests to the cluster.
///
/// Returns `Pin<Box<dyn Future>>` so the trait stays dyn-compatible and the gateway can
/// hold an `Arc<dyn Transport>`.
pub trait Transport: Send + Sync {
    /// Tunnel one API call through the console proxy. Resolves to the parsed JSON body.
    fn console<'a>(&'a self, request: &'a ConsoleRequest) -> BoxFuture<'a, Result<Value, GatewayError>>;

    /// Run a search against `index` with the given query body.
    fn search<'a>(&'a self, index: &'a str, body: &'a Value) -> BoxFuture<'a, Result<Value, GatewayError>>;
}

/// reqwest-backed transport.
pub struct HttpTransport {
    client: reqwest::Client,
    console_url: Url,
    search_base: Url,
    credentials: Option<(String, Option<String>)>,
}

impl HttpTransport {
    pub fn new(settings: &GatewaySettings) -> Result<Self, GatewayError> {
        // Plain concatenation keeps a UI base path such as `/kibana` in front of the route.
        let console_url = Url::parse(&format!(
            "{}/{}",
            settings.kibana_url.trim_end_matches('/'),
            settings.console_path.trim_start_matches('/')
        ))?;
        let search_base = Url::parse(&format!(
            "{}/",
            settings.elasticsearch_url.trim_end_matches('/')
        ))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        info!(
            "Gateway: console proxy {} (search endpoint {})",
            console_url, search_base
        );

        let credentials = settings
            .username
            .as_ref()
            .map(|user| (user.clone(), settings.password.clone()));

        Ok(Self {
            client,
            console_url,
            search_base,
            credentials,
        })
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.credentials {
            Some((user, password)) => request.basic_auth(user, password.as_ref()),
            None => request,
        }
    }

    async fn read_json(response: reqwest::Response, what: &str) -> Result<Value, GatewayError> {
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            debug!("Gateway: {} -> {}: {}", what, status, ellipse(&text, 200));
            return Err(GatewayError::Status {
                status: status.as_u16(),
                body: ellipse(&text, MAX_ERROR_BODY_CHARS),
            });
        }
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }
}

impl Transport for HttpTransport {
    fn console<'a>(&'a self, request: &'a ConsoleRequest) -> BoxFuture<'a, Result<Value, GatewayError>> {
        Box::pin(async move {
            let mut url = self.console_url.clone();
            url.set_query(Some(&request.query_string()));
            info!("Gateway: {} {}", request.method, request.path);

            let mut http = self
                .authorize(self.client.post(url))
                .header("kbn-xsrf", "true");
            if let Some(ref body) = request.body {
                debug!(
                    "Gateway: {} {} body: {}",
                    request.method,
                    request.path,
                    loggable_body(body)
                );
                http = http.json(body);
            }

            let response = http.send().await.map_err(|e| {
                error!("Gateway: {} {} not sent: {}", request.method, request.path, e);
                e
            })?;
            Self::read_json(response, &format!("{} {}", request.method, request.path)).await
        })
    }

    fn search<'a>(&'a self, index: &'a str, body: &'a Value) -> BoxFuture<'a, Result<Value, GatewayError>> {
        Box::pin(async move {
            let url = self.search_base.join(&format!("{}/_search", index))?;
            info!("Gateway: search {}", url);
            let response = self
                .authorize(self.client.post(url))
                .json(body)
                .send()
                .await
                .map_err(|e| {
                    error!("Gateway: search {} not sent: {}", index, e);
                    e
                })?;
            Self::read_json(response, &format!("search {}", index)).await
        })
    }
}
