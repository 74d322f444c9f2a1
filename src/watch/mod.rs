//! Alert watch documents
//!
//! Typed inputs from the UI layer, the immutable watch templates, the builder used by `save`
//! and the patch used by `bulk_update`.

pub mod builder;
pub mod model;
pub mod patch;
pub mod template;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use builder::WatchBuilder;
pub use model::{AddressEntry, AlertDefinition, BulkUpdateInput, CompareOption, CompareType, ScheduleKind};
pub use patch::apply_bulk_patch;

/// One row of the watch list, read from a `.watches` search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchSummary {
    pub id: String,
    pub job_id: Option<String>,
    pub description: Option<String>,
    pub active: Option<bool>,
    pub actions: Vec<String>,
}

impl WatchSummary {
    /// Summaries of every hit in a search response; hits without `_id` are skipped.
    pub fn from_search_response(response: &Value) -> Vec<WatchSummary> {
        response
            .get("hits")
            .and_then(|h| h.get("hits"))
            .and_then(|h| h.as_array())
            .map(|hits| hits.iter().filter_map(Self::from_hit).collect())
            .unwrap_or_default()
    }

    fn from_hit(hit: &Value) -> Option<WatchSummary> {
        let id = hit.get("_id")?.as_str()?.to_string();
        let source = hit.get("_source").cloned().unwrap_or(Value::Null);
        let metadata = source.get("metadata");
        let text = |key: &str| {
            metadata
                .and_then(|m| m.get(key))
                .and_then(|v| v.as_str())
                .map(|s| s.to_string())
        };
        let active = source
            .get("status")
            .and_then(|s| s.get("state"))
            .and_then(|s| s.get("active"))
            .and_then(|a| a.as_bool());
        let mut actions: Vec<String> = source
            .get("actions")
            .and_then(|a| a.as_object())
            .map(|a| a.keys().cloned().collect())
            .unwrap_or_default();
        actions.sort();

        Some(WatchSummary {
            id,
            job_id: text("job_id"),
            description: text("description"),
            active,
            actions,
        })
    }
}
