//! Bulk-edit patch applied to a watch fetched from the cluster.
//!
//! Rules run top to bottom, each independent of the others:
//!
//! 1. set the mail / Slack / LINE action when its edit flag is on and a value was given;
//! 2. drop a channel whose value was cleared, but only while another channel remains;
//! 3. overwrite the dashboard links when asked.

use serde_json::{json, Map, Value};

use super::model::{address_values, first_value_present, BulkUpdateInput};
use super::template;
use crate::error::GatewayError;
use crate::scripts::ScriptNames;

const MAIL: &str = "send_email";
const SLACK: &str = "notify_slack";
const LINE: &str = "notify_line";

/// Patch `watch` (the `watch` object of a GET response) in place.
pub fn apply_bulk_patch(
    watch: &mut Value,
    input: &BulkUpdateInput,
    scripts: &ScriptNames,
) -> Result<(), GatewayError> {
    let root = watch
        .as_object_mut()
        .ok_or_else(|| GatewayError::MalformedResponse("watch is not a JSON object".to_string()))?;

    let mail_given = first_value_present(&input.mail_address_to);
    let slack_given = first_value_present(&input.slack_to);
    let line_given = !input.line_notify_access_token.is_empty();

    let mut line_token: Option<String> = None;
    {
        let actions = object_entry(root, "actions")?;

        if input.edit_mail && mail_given {
            let mut mail = template::mail_action(scripts);
            mail["email"]["to"] = json!(address_values(&input.mail_address_to));
            mail["email"]["cc"] = json!(address_values(&input.mail_address_cc));
            mail["email"]["bcc"] = json!(address_values(&input.mail_address_bcc));
            actions.insert(MAIL.to_string(), mail);
        }
        if input.edit_slack && slack_given {
            let mut slack = template::slack_action(scripts);
            slack["slack"]["message"]["to"] = json!(address_values(&input.slack_to));
            actions.insert(SLACK.to_string(), slack);
        }
        if input.edit_line && line_given {
            actions.insert(LINE.to_string(), template::line_action(scripts));
            line_token = Some(input.line_notify_access_token.clone());
        }

        if input.edit_mail
            && !mail_given
            && actions.contains_key(MAIL)
            && (actions.contains_key(SLACK) || actions.contains_key(LINE))
        {
            actions.remove(MAIL);
        }
        if input.edit_slack
            && !slack_given
            && (actions.contains_key(MAIL) || actions.contains_key(LINE))
            && actions.contains_key(SLACK)
        {
            actions.remove(SLACK);
        }
        if input.edit_line
            && !line_given
            && (actions.contains_key(MAIL) || actions.contains_key(SLACK))
            && actions.contains_key(LINE)
        {
            actions.remove(LINE);
            line_token = Some(String::new());
        }
    }

    if line_token.is_some() || input.edit_dashboard {
        let metadata = object_entry(root, "metadata")?;
        if let Some(token) = line_token {
            metadata.insert("line_notify_access_token".to_string(), Value::String(token));
        }
        if input.edit_dashboard {
            metadata.insert(
                "link_dashboards".to_string(),
                Value::Array(input.link_dashboards.clone()),
            );
        }
    }

    Ok(())
}

/// The object under `key`, created when absent.
fn object_entry<'m>(
    root: &'m mut Map<String, Value>,
    key: &str,
) -> Result<&'m mut Map<String, Value>, GatewayError> {
    root.entry(key.to_string())
        .or_insert_with(|| Value::Object(Map::new()))
        .as_object_mut()
        .ok_or_else(|| GatewayError::MalformedResponse(format!("watch `{}` is not an object", key)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::watch::model::AddressEntry;

    fn names() -> ScriptNames {
        ScriptNames::default()
    }

    fn watch_with(actions: &[&str]) -> Value {
        let mut map = Map::new();
        for a in actions {
            map.insert(a.to_string(), json!({ "existing": true }));
        }
        json!({
            "actions": map,
            "metadata": { "line_notify_access_token": "old-token", "link_dashboards": [] }
        })
    }

    fn action_keys(watch: &Value) -> Vec<String> {
        let mut keys: Vec<String> = watch["actions"].as_object().unwrap().keys().cloned().collect();
        keys.sort();
        keys
    }

    #[test]
    fn cleared_slack_removed_when_mail_remains() {
        let mut watch = watch_with(&[MAIL, SLACK]);
        let input = BulkUpdateInput {
            edit_slack: true,
            slack_to: vec![AddressEntry::new("")],
            ..Default::default()
        };
        apply_bulk_patch(&mut watch, &input, &names()).unwrap();
        assert_eq!(action_keys(&watch), vec![MAIL]);
        assert_eq!(watch["actions"][MAIL]["existing"], true);
    }

    #[test]
    fn sole_channel_is_not_cleared() {
        let mut watch = watch_with(&[SLACK]);
        let input = BulkUpdateInput {
            edit_slack: true,
            slack_to: vec![AddressEntry::new("")],
            ..Default::default()
        };
        apply_bulk_patch(&mut watch, &input, &names()).unwrap();
        assert_eq!(action_keys(&watch), vec![SLACK]);
    }

    #[test]
    fn mail_set_with_all_lists() {
        let mut watch = watch_with(&[]);
        let input = BulkUpdateInput {
            edit_mail: true,
            mail_address_to: vec![AddressEntry::new("a@example.com")],
            ..Default::default()
        };
        apply_bulk_patch(&mut watch, &input, &names()).unwrap();
        let email = &watch["actions"][MAIL]["email"];
        assert_eq!(email["to"], json!(["a@example.com"]));
        assert_eq!(email["cc"], json!([]));
        assert_eq!(email["bcc"], json!([]));
    }

    #[test]
    fn new_channel_then_clear_other_in_one_pass() {
        // Slack is set first, so the mail rule sees another channel and may drop mail.
        let mut watch = watch_with(&[MAIL]);
        let input = BulkUpdateInput {
            edit_mail: true,
            mail_address_to: vec![AddressEntry::new("")],
            edit_slack: true,
            slack_to: vec![AddressEntry::new("#ops")],
            ..Default::default()
        };
        apply_bulk_patch(&mut watch, &input, &names()).unwrap();
        assert_eq!(action_keys(&watch), vec![SLACK]);
        assert_eq!(watch["actions"][SLACK]["slack"]["message"]["to"], json!(["#ops"]));
    }

    #[test]
    fn line_token_set_and_reset() {
        let mut watch = watch_with(&[MAIL]);
        let input = BulkUpdateInput {
            edit_line: true,
            line_notify_access_token: "new-token".to_string(),
            ..Default::default()
        };
        apply_bulk_patch(&mut watch, &input, &names()).unwrap();
        assert!(watch["actions"].get(LINE).is_some());
        assert_eq!(watch["metadata"]["line_notify_access_token"], "new-token");

        let clear = BulkUpdateInput {
            edit_line: true,
            ..Default::default()
        };
        apply_bulk_patch(&mut watch, &clear, &names()).unwrap();
        assert!(watch["actions"].get(LINE).is_none());
        assert_eq!(watch["metadata"]["line_notify_access_token"], "");
    }

    #[test]
    fn flags_off_leave_watch_untouched() {
        let mut watch = watch_with(&[MAIL, LINE]);
        let before = watch.clone();
        let input = BulkUpdateInput {
            slack_to: vec![AddressEntry::new("#ignored")],
            line_notify_access_token: String::new(),
            ..Default::default()
        };
        apply_bulk_patch(&mut watch, &input, &names()).unwrap();
        assert_eq!(watch, before);
    }

    #[test]
    fn dashboards_overwritten() {
        let mut watch = watch_with(&[MAIL]);
        let input = BulkUpdateInput {
            edit_dashboard: true,
            link_dashboards: vec![json!({ "id": "d1", "title": "Ops" })],
            ..Default::default()
        };
        apply_bulk_patch(&mut watch, &input, &names()).unwrap();
        assert_eq!(watch["metadata"]["link_dashboards"], json!([{ "id": "d1", "title": "Ops" }]));
    }

    #[test]
    fn non_object_watch_rejected() {
        let mut watch = json!("nope");
        let err = apply_bulk_patch(&mut watch, &BulkUpdateInput::default(), &names()).unwrap_err();
        assert!(matches!(err, GatewayError::MalformedResponse(_)));
    }
}
