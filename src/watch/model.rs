//! Alert inputs as the UI layer sends them (camelCase JSON).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One entry of an address list (`{"value": "ops@example.com"}`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddressEntry {
    #[serde(default)]
    pub value: String,
}

impl AddressEntry {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

/// Flatten an address list to its values.
pub fn address_values(entries: &[AddressEntry]) -> Vec<String> {
    entries.iter().map(|e| e.value.clone()).collect()
}

/// Whether the first entry holds a value. An empty list counts as empty.
pub fn first_value_present(entries: &[AddressEntry]) -> bool {
    entries.first().map(|e| !e.value.is_empty()).unwrap_or(false)
}

/// Comparison used by the actual-value filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompareType {
    Gt,
    #[default]
    Gte,
    Lt,
    Lte,
}

impl CompareType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompareType::Gt => "gt",
            CompareType::Gte => "gte",
            CompareType::Lt => "lt",
            CompareType::Lte => "lte",
        }
    }
}

/// Stored verbatim in `metadata.compareOption`. Keys other than `compareType` are kept
/// as sent so the UI gets them back.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompareOption {
    #[serde(default)]
    pub compare_type: CompareType,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleKind {
    #[default]
    Interval,
    Cron,
}

/// Everything needed to create (or fully overwrite) one alert watch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AlertDefinition {
    pub alert_id: String,

    pub send_mail: bool,
    pub mail_address_to: Vec<AddressEntry>,
    pub mail_address_cc: Vec<AddressEntry>,
    pub mail_address_bcc: Vec<AddressEntry>,

    pub notify_slack: bool,
    pub slack_to: Vec<AddressEntry>,
    pub slack_account: String,

    pub notify_line: bool,
    pub line_notify_access_token: String,

    pub ml_job_id: String,
    pub description: String,
    pub subject: String,
    pub link_dashboards: Vec<Value>,
    pub link_saved_searches: Vec<Value>,
    pub threshold: f64,
    pub detect_interval: Value,
    pub kibana_display_term: f64,
    pub kibana_url: String,
    pub locale: String,
    pub ml_process_time: String,

    pub filter_by_actual_value: bool,
    pub actual_value_threshold: f64,
    pub compare_option: CompareOption,

    pub schedule_kind: ScheduleKind,
    pub trigger_schedule: String,
}

/// Flags and values for editing many alerts at once.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BulkUpdateInput {
    pub edit_mail: bool,
    pub mail_address_to: Vec<AddressEntry>,
    pub mail_address_cc: Vec<AddressEntry>,
    pub mail_address_bcc: Vec<AddressEntry>,

    pub edit_slack: bool,
    pub slack_to: Vec<AddressEntry>,

    pub edit_line: bool,
    pub line_notify_access_token: String,

    pub edit_dashboard: bool,
    pub link_dashboards: Vec<Value>,
}
