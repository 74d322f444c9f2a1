//! Anomaly-detection job timing
//!
//! Results for a bucket are only final some time after the bucket closes. These helpers
//! derive how far behind "now" an alert must look, and how wide a window the dashboard
//! links should show.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::duration::parse_duration;
use crate::error::GatewayError;

/// Margin added on top of the job's own delays.
pub const SAFETY_MARGIN: &str = "30s";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub bucket_span: String,
}

/// The parts of an anomaly-detection job the timing needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MlJob {
    #[serde(default)]
    pub job_id: String,
    pub analysis_config: AnalysisConfig,
}

impl MlJob {
    pub fn with_bucket_span(bucket_span: &str) -> Self {
        Self {
            job_id: String::new(),
            analysis_config: AnalysisConfig {
                bucket_span: bucket_span.to_string(),
            },
        }
    }
}

/// The parts of a datafeed the timing needs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Datafeed {
    #[serde(default)]
    pub datafeed_id: String,
    #[serde(default)]
    pub job_id: String,
    #[serde(default)]
    pub frequency: Option<String>,
    #[serde(default)]
    pub query_delay: Option<String>,
}

/// Both timing values for one job.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobTiming {
    pub job_id: String,
    pub ml_process_time: String,
    pub kibana_display_term: f64,
}

/// bucket_span + frequency (defaults to bucket_span) + query_delay + 30s, in whole seconds
/// rounded up, formatted as `"<n>s"`. A datafeed without `query_delay` adds nothing for it.
pub fn ml_process_time(job: &MlJob, datafeed: &Datafeed) -> Result<String, GatewayError> {
    let bucket_span = &job.analysis_config.bucket_span;
    let frequency = datafeed.frequency.as_deref().unwrap_or(bucket_span);

    let mut total_ms = parse_duration(bucket_span)? + parse_duration(frequency)?;
    if let Some(ref delay) = datafeed.query_delay {
        total_ms += parse_duration(delay)?;
    }
    total_ms += parse_duration(SAFETY_MARGIN)?;

    let seconds = (total_ms / 1000.0).ceil() as u64;
    Ok(format!("{}s", seconds))
}

/// Two bucket spans, in seconds, unrounded.
pub fn kibana_display_term(job: &MlJob) -> Result<f64, GatewayError> {
    Ok(2.0 * parse_duration(&job.analysis_config.bucket_span)? / 1000.0)
}

/// Read a job from a `GET _ml/anomaly_detectors/<id>` response.
pub fn job_from_response(response: &Value, job_id: &str) -> Result<MlJob, GatewayError> {
    let job = response
        .get("jobs")
        .and_then(|j| j.as_array())
        .and_then(|jobs| {
            jobs.iter()
                .find(|j| j.get("job_id").and_then(|id| id.as_str()) == Some(job_id))
        })
        .ok_or_else(|| GatewayError::MalformedResponse(format!("job {} not in response", job_id)))?;
    Ok(serde_json::from_value(job.clone())?)
}

/// The datafeed feeding `job_id` from a `GET _ml/datafeeds` response.
pub fn datafeed_for_job(response: &Value, job_id: &str) -> Result<Datafeed, GatewayError> {
    let feed = response
        .get("datafeeds")
        .and_then(|d| d.as_array())
        .and_then(|feeds| {
            feeds
                .iter()
                .find(|f| f.get("job_id").and_then(|id| id.as_str()) == Some(job_id))
        })
        .ok_or_else(|| {
            GatewayError::MalformedResponse(format!("no datafeed for job {}", job_id))
        })?;
    Ok(serde_json::from_value(feed.clone())?)
}
