//! Alert gateway
//!
//! Translates alert-management intents into calls through the console proxy:
//! list / fetch / delete / (de)activate / bulk-edit / create watches, and make sure the
//! painless notification scripts exist before watches that use them are created.
//!
//! Batch operations run strictly one ID after another and never stop on a failed item;
//! the returned [`BatchOutcome`] carries the tally (see [`BatchOutcome::report`]).

use serde::Serialize;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::batch::{run_sequential, BatchOutcome};
use crate::config::GatewaySettings;
use crate::error::GatewayError;
use crate::ml::{self, Datafeed, JobTiming, MlJob};
use crate::proxy::{ApiPaths, ConsoleRequest};
use crate::scripts::{notification_scripts, ScriptDescriptor, ScriptNames};
use crate::transport::{HttpTransport, Transport};
use crate::watch::template::{watch_list_query, WATCH_INDEX};
use crate::watch::{apply_bulk_patch, AlertDefinition, BulkUpdateInput, WatchBuilder};

/// Result of a script check: which scripts were already there and which had to be created.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScriptCheckReport {
    pub existing: Vec<String>,
    pub created: Vec<String>,
}

pub struct AlertGateway {
    transport: Arc<dyn Transport>,
    paths: ApiPaths,
    scripts: ScriptNames,
    scripts_verified: AtomicBool,
}

impl AlertGateway {
    pub fn new(transport: Arc<dyn Transport>, paths: ApiPaths, scripts: ScriptNames) -> Self {
        Self {
            transport,
            paths,
            scripts,
            scripts_verified: AtomicBool::new(false),
        }
    }

    /// Gateway over HTTP, configured from `settings`.
    pub fn from_settings(settings: &GatewaySettings) -> Result<Self, GatewayError> {
        let transport = HttpTransport::new(settings)?;
        Ok(Self::new(
            Arc::new(transport),
            ApiPaths::new(&settings.watcher_prefix),
            settings.scripts.clone(),
        ))
    }

    async fn send(&self, request: ConsoleRequest) -> Result<Value, GatewayError> {
        self.transport.console(&request).await
    }

    /// All watches owned by this tool, sorted by ID. The raw search response is returned.
    pub async fn search_list(&self) -> Result<Value, GatewayError> {
        let query = watch_list_query();
        self.transport
            .search(WATCH_INDEX, &query)
            .await
            .map_err(|e| {
                error!("Gateway: listing watches failed: {}", e);
                e
            })
    }

    /// Fetch one watch.
    pub async fn search(&self, alert_id: &str) -> Result<Value, GatewayError> {
        self.send(self.paths.get_watch(alert_id)).await.map_err(|e| {
            error!("Gateway: fetching watch {} failed: {}", alert_id, e);
            e
        })
    }

    pub async fn delete(&self, alert_ids: &[String]) -> Result<BatchOutcome, GatewayError> {
        run_sequential("delete", alert_ids, |id| async move {
            self.send(self.paths.delete_watch(id)).await.map(|_| ())
        })
        .await
    }

    pub async fn activate(&self, alert_ids: &[String]) -> Result<BatchOutcome, GatewayError> {
        run_sequential("activate", alert_ids, |id| async move {
            self.send(self.paths.activate_watch(id)).await.map(|_| ())
        })
        .await
    }

    pub async fn deactivate(&self, alert_ids: &[String]) -> Result<BatchOutcome, GatewayError> {
        run_sequential("deactivate", alert_ids, |id| async move {
            self.send(self.paths.deactivate_watch(id)).await.map(|_| ())
        })
        .await
    }

    /// Fetch, patch and write back each watch in turn.
    pub async fn bulk_update(
        &self,
        alert_ids: &[String],
        input: &BulkUpdateInput,
    ) -> Result<BatchOutcome, GatewayError> {
        run_sequential("bulk update", alert_ids, |id| self.update_one(id, input)).await
    }

    async fn update_one(&self, alert_id: &str, input: &BulkUpdateInput) -> Result<(), GatewayError> {
        let mut response = self.send(self.paths.get_watch(alert_id)).await?;

        let target_id = response
            .get("_id")
            .and_then(|id| id.as_str())
            .unwrap_or(alert_id)
            .to_string();
        let mut watch = response
            .get_mut("watch")
            .map(Value::take)
            .ok_or_else(|| {
                GatewayError::MalformedResponse(format!("no `watch` in response for {}", alert_id))
            })?;

        apply_bulk_patch(&mut watch, input, &self.scripts)?;
        self.send(self.paths.edit_watch(&target_id, watch)).await?;
        debug!("Gateway: bulk update wrote {}", target_id);
        Ok(())
    }

    /// Check mail, Slack and LINE scripts in that order, creating any that is missing.
    /// Stops at the first script that can be neither fetched nor created.
    pub async fn check_scripts(&self) -> Result<ScriptCheckReport, GatewayError> {
        let mut report = ScriptCheckReport::default();
        for script in notification_scripts(&self.scripts) {
            if self.check_script(&script).await? {
                report.created.push(script.name);
            } else {
                report.existing.push(script.name);
            }
        }
        self.scripts_verified.store(true, Ordering::SeqCst);
        Ok(report)
    }

    /// Ok(true) when the script had to be created.
    async fn check_script(&self, script: &ScriptDescriptor) -> Result<bool, GatewayError> {
        match self.send(self.paths.get_script(&script.name)).await {
            Ok(_) => Ok(false),
            Err(fetch_err) => {
                info!("try to put script {} ({})", script.name, fetch_err);
                let request = self
                    .paths
                    .put_script(&script.name, script.registration_body());
                match self.send(request).await {
                    Ok(_) => Ok(true),
                    Err(e) => {
                        error!("Gateway: could not create script {}: {}", script.name, e);
                        Err(e)
                    }
                }
            }
        }
    }

    /// [`check_scripts`](Self::check_scripts) unless it already succeeded on this gateway.
    pub async fn ensure_scripts(&self) -> Result<ScriptCheckReport, GatewayError> {
        if self.scripts_verified.load(Ordering::SeqCst) {
            debug!("Gateway: scripts already verified this session");
            return Ok(ScriptCheckReport::default());
        }
        self.check_scripts().await
    }

    /// Create or overwrite the watch described by `definition`.
    pub async fn save(&self, definition: &AlertDefinition) -> Result<Value, GatewayError> {
        let body = WatchBuilder::new(&self.scripts).build(definition).map_err(|e| {
            error!("Gateway: cannot build watch {:?}: {}", definition.alert_id, e);
            e
        })?;
        info!("Gateway: saving watch {}", definition.alert_id);
        self.send(self.paths.edit_watch(&definition.alert_id, body))
            .await
            .map_err(|e| {
                error!("Gateway: saving watch {} failed: {}", definition.alert_id, e);
                e
            })
    }

    pub fn calculate_ml_process_time(job: &MlJob, datafeed: &Datafeed) -> Result<String, GatewayError> {
        ml::ml_process_time(job, datafeed)
    }

    pub fn calculate_kibana_display_term(job: &MlJob) -> Result<f64, GatewayError> {
        ml::kibana_display_term(job)
    }

    /// Fetch the job and its datafeed, then compute both timing values.
    pub async fn job_timing(&self, job_id: &str) -> Result<JobTiming, GatewayError> {
        self.fetch_job_timing(job_id).await.map_err(|e| {
            error!("Gateway: timing for job {} failed: {}", job_id, e);
            e
        })
    }

    async fn fetch_job_timing(&self, job_id: &str) -> Result<JobTiming, GatewayError> {
        let job_response = self.send(self.paths.get_ml_job(job_id)).await?;
        let job = ml::job_from_response(&job_response, job_id)?;
        let feeds_response = self.send(self.paths.list_datafeeds()).await?;
        let datafeed = ml::datafeed_for_job(&feeds_response, job_id)?;

        Ok(JobTiming {
            job_id: job_id.to_string(),
            ml_process_time: Self::calculate_ml_process_time(&job, &datafeed)?,
            kibana_display_term: Self::calculate_kibana_display_term(&job)?,
        })
    }
}
