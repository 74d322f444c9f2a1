//! Builds a complete watch body from an [`AlertDefinition`].

use cron::Schedule;
use serde_json::{json, Map, Value};
use std::str::FromStr;
use tracing::{debug, warn};

use super::model::{address_values, AlertDefinition, ScheduleKind};
use super::template;
use crate::error::GatewayError;
use crate::logging::mask_credential;
use crate::scripts::ScriptNames;

/// Composes a watch field by field from the immutable templates.
pub struct WatchBuilder<'a> {
    scripts: &'a ScriptNames,
}

impl<'a> WatchBuilder<'a> {
    pub fn new(scripts: &'a ScriptNames) -> Self {
        Self { scripts }
    }

    /// Full watch body for `definition`. Fails only on an empty alert ID.
    pub fn build(&self, definition: &AlertDefinition) -> Result<Value, GatewayError> {
        if definition.alert_id.trim().is_empty() {
            return Err(GatewayError::InvalidInput("alert ID must not be empty".to_string()));
        }

        let body = json!({
            "trigger": self.trigger(definition),
            "input": self.input(definition),
            "condition": template::condition(),
            "actions": self.actions(definition),
            "metadata": self.metadata(definition)?,
        });
        debug!("WatchBuilder: built watch {}", definition.alert_id);
        Ok(body)
    }

    fn trigger(&self, definition: &AlertDefinition) -> Value {
        match definition.schedule_kind {
            ScheduleKind::Cron => {
                // The cluster is the authority on cron syntax; a local miss is only logged.
                if let Err(e) = Schedule::from_str(&definition.trigger_schedule) {
                    warn!(
                        "WatchBuilder: cron {:?} for {} did not parse locally: {}",
                        definition.trigger_schedule, definition.alert_id, e
                    );
                }
                template::cron_trigger(&definition.trigger_schedule)
            }
            ScheduleKind::Interval => template::interval_trigger(),
        }
    }

    fn input(&self, definition: &AlertDefinition) -> Value {
        let mut must = template::base_must_clauses();
        if definition.filter_by_actual_value {
            must.push(template::actual_value_clause(
                definition.compare_option.compare_type.as_str(),
            ));
        }
        template::search_input(must)
    }

    fn actions(&self, definition: &AlertDefinition) -> Value {
        let mut actions = Map::new();

        if definition.send_mail {
            let mut mail = template::mail_action(self.scripts);
            let email = &mut mail["email"];
            email["to"] = json!(address_values(&definition.mail_address_to));
            if !definition.mail_address_cc.is_empty() {
                email["cc"] = json!(address_values(&definition.mail_address_cc));
            }
            if !definition.mail_address_bcc.is_empty() {
                email["bcc"] = json!(address_values(&definition.mail_address_bcc));
            }
            actions.insert("send_email".to_string(), mail);
        }

        if definition.notify_slack {
            let mut slack = template::slack_action(self.scripts);
            slack["slack"]["message"]["to"] = json!(address_values(&definition.slack_to));
            if !definition.slack_account.is_empty() {
                slack["slack"]["account"] = json!(definition.slack_account);
            }
            actions.insert("notify_slack".to_string(), slack);
        }

        if definition.notify_line {
            actions.insert("notify_line".to_string(), template::line_action(self.scripts));
        }

        Value::Object(actions)
    }

    fn metadata(&self, definition: &AlertDefinition) -> Result<Value, GatewayError> {
        let line_token = if definition.notify_line {
            debug!(
                "WatchBuilder: LINE token for {} ({})",
                definition.alert_id,
                mask_credential(&definition.line_notify_access_token)
            );
            definition.line_notify_access_token.clone()
        } else {
            String::new()
        };

        Ok(json!({
            "alert_type": template::ALERT_TYPE,
            "job_id": definition.ml_job_id,
            "description": definition.description,
            "subject": definition.subject,
            "link_dashboards": definition.link_dashboards,
            "link_saved_searches": definition.link_saved_searches,
            "threshold": definition.threshold,
            "detect_interval": definition.detect_interval,
            "kibana_display_term": definition.kibana_display_term,
            "kibana_url": definition.kibana_url,
            "locale": definition.locale,
            "ml_process_time": definition.ml_process_time,
            "line_notify_access_token": line_token,
            "filterByActualValue": definition.filter_by_actual_value,
            "actualValueThreshold": definition.actual_value_threshold,
            "compareOption": serde_json::to_value(&definition.compare_option)?,
        }))
    }
}
