//! Base structures of an alert watch.
//!
//! Each function returns a fresh value, so callers can fill it in without touching shared state.

use serde_json::{json, Map, Value};

use crate::scripts::ScriptNames;

/// `metadata.alert_type` marking watches owned by this tool.
pub const ALERT_TYPE: &str = "mla";
/// Index holding watch documents.
pub const WATCH_INDEX: &str = ".watches";
/// Index pattern of anomaly-detection results.
pub const ANOMALY_RESULTS_INDEX: &str = ".ml-anomalies-*";
/// Schedule used when no cron expression is given.
pub const DEFAULT_INTERVAL: &str = "1m";
/// Placeholder the cluster fills with the stored actual-value threshold.
pub const ACTUAL_VALUE_THRESHOLD_PLACEHOLDER: &str = "{{ctx.metadata.actualValueThreshold}}";

pub fn mail_action(scripts: &ScriptNames) -> Value {
    json!({
        "throttle_period_in_millis": 0,
        "transform": { "script": { "id": scripts.mail } },
        "email": {
            "profile": "standard",
            "to": [],
            "subject": "{{ctx.metadata.subject}}",
            "body": { "html": "{{ctx.payload.message}}" }
        }
    })
}

pub fn slack_action(scripts: &ScriptNames) -> Value {
    json!({
        "throttle_period_in_millis": 0,
        "transform": { "script": { "id": scripts.slack } },
        "slack": {
            "message": {
                "to": [],
                "text": "{{ctx.metadata.subject}}",
                "attachments": [
                    { "color": "danger", "text": "{{ctx.payload.message}}" }
                ]
            }
        }
    })
}

pub fn line_action(scripts: &ScriptNames) -> Value {
    json!({
        "throttle_period_in_millis": 0,
        "transform": { "script": { "id": scripts.line } },
        "webhook": {
            "scheme": "https",
            "host": "notify-api.line.me",
            "port": 443,
            "method": "post",
            "path": "/api/notify",
            "headers": {
                "Authorization": "Bearer {{ctx.metadata.line_notify_access_token}}",
                "Content-Type": "application/x-www-form-urlencoded"
            },
            "body": "message={{ctx.payload.message}}"
        }
    })
}

pub fn interval_trigger() -> Value {
    json!({ "schedule": { "interval": DEFAULT_INTERVAL } })
}

pub fn cron_trigger(expression: &str) -> Value {
    json!({ "schedule": { "cron": expression } })
}

/// Clauses every alert query starts with: records of the job, above the score threshold,
/// inside the detection window that ends `ml_process_time` ago.
pub fn base_must_clauses() -> Vec<Value> {
    vec![
        json!({ "term": { "job_id": "{{ctx.metadata.job_id}}" } }),
        json!({ "term": { "result_type": "record" } }),
        json!({ "range": { "record_score": { "gte": "{{ctx.metadata.threshold}}" } } }),
        json!({
            "range": {
                "timestamp": {
                    "gte": "now-{{ctx.metadata.ml_process_time}}-{{ctx.metadata.detect_interval}}m",
                    "lt": "now-{{ctx.metadata.ml_process_time}}"
                }
            }
        }),
    ]
}

/// Range clause on `actual` keyed by the comparison operator.
pub fn actual_value_clause(operator: &str) -> Value {
    let mut bound = Map::new();
    bound.insert(
        operator.to_string(),
        Value::String(ACTUAL_VALUE_THRESHOLD_PLACEHOLDER.to_string()),
    );
    json!({ "range": { "actual": bound } })
}

pub fn search_input(must: Vec<Value>) -> Value {
    json!({
        "search": {
            "request": {
                "indices": [ANOMALY_RESULTS_INDEX],
                "body": {
                    "size": 100,
                    "query": { "bool": { "must": must } },
                    "sort": [ { "record_score": { "order": "desc" } } ]
                }
            }
        }
    })
}

pub fn condition() -> Value {
    json!({ "compare": { "ctx.payload.hits.total": { "gt": 0 } } })
}

/// Query used to list this tool's watches, sorted by ID.
pub fn watch_list_query() -> Value {
    json!({
        "query": { "term": { "metadata.alert_type": ALERT_TYPE } },
        "sort": [ { "_id": { "order": "asc" } } ]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn actions_reference_script_names() {
        let names = ScriptNames::default();
        assert_eq!(mail_action(&names)["transform"]["script"]["id"], "mla_script_for_mail");
        assert_eq!(slack_action(&names)["transform"]["script"]["id"], "mla_script_for_slack");
        assert_eq!(line_action(&names)["transform"]["script"]["id"], "mla_script_for_line");
    }

    #[test]
    fn templates_are_fresh_values() {
        let names = ScriptNames::default();
        let mut first = mail_action(&names);
        first["email"]["to"] = json!(["changed@example.com"]);
        assert_eq!(mail_action(&names)["email"]["to"], json!([]));
    }

    #[test]
    fn actual_value_clause_uses_operator() {
        let clause = actual_value_clause("lte");
        assert_eq!(
            clause,
            json!({ "range": { "actual": { "lte": "{{ctx.metadata.actualValueThreshold}}" } } })
        );
    }
}
