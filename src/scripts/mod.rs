//! Stored painless scripts used by alert watches
//!
//! Each notification action runs a transform script that turns the anomaly records found by
//! the watch input into a message. The scripts live in the cluster under fixed names and are
//! registered on first use (see `AlertGateway::check_scripts`).

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Language the scripts are registered with.
pub const SCRIPT_LANG: &str = "painless";

/// Transform for the e-mail action: an HTML list of anomaly records.
pub const MAIL_SCRIPT_SOURCE: &str = r#"
def hits = ctx.payload.hits.hits;
StringBuilder body = new StringBuilder();
body.append('<p>').append(ctx.metadata.description).append('</p><ul>');
for (def hit : hits) {
  def record = hit._source;
  body.append('<li>')
      .append(Instant.ofEpochMilli(record.timestamp).toString())
      .append(' score=').append(Math.round(record.record_score))
      .append(' actual=').append(record.actual)
      .append(' typical=').append(record.typical)
      .append('</li>');
}
body.append('</ul>');
for (def dashboard : ctx.metadata.link_dashboards) {
  body.append('<p><a href="').append(ctx.metadata.kibana_url)
      .append('app/kibana#/dashboard/').append(dashboard.id)
      .append('?_g=(time:(from:now-').append(ctx.metadata.kibana_display_term)
      .append('s,to:now))">').append(dashboard.title).append('</a></p>');
}
return ['message': body.toString(), 'count': hits.size()];
"#;

/// Transform for the Slack action: a plain-text summary with one line per record.
pub const SLACK_SCRIPT_SOURCE: &str = r#"
def hits = ctx.payload.hits.hits;
StringBuilder text = new StringBuilder();
text.append(ctx.metadata.description).append('\n');
for (def hit : hits) {
  def record = hit._source;
  text.append('• ')
      .append(Instant.ofEpochMilli(record.timestamp).toString())
      .append(' score=').append(Math.round(record.record_score))
      .append(' actual=').append(record.actual)
      .append('\n');
}
for (def dashboard : ctx.metadata.link_dashboards) {
  text.append('<').append(ctx.metadata.kibana_url)
      .append('app/kibana#/dashboard/').append(dashboard.id)
      .append('|').append(dashboard.title).append('>\n');
}
return ['message': text.toString(), 'count': hits.size()];
"#;

/// Transform for the LINE Notify action: a short form-encodable message.
pub const LINE_SCRIPT_SOURCE: &str = r#"
def hits = ctx.payload.hits.hits;
StringBuilder text = new StringBuilder();
text.append(ctx.metadata.subject).append('\n');
text.append(hits.size()).append(' anomalies for job ').append(ctx.metadata.job_id).append('\n');
for (def hit : hits) {
  def record = hit._source;
  text.append(Instant.ofEpochMilli(record.timestamp).toString())
      .append(' score=').append(Math.round(record.record_score))
      .append('\n');
}
return ['message': text.toString(), 'count': hits.size()];
"#;

/// Names the three scripts are stored under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptNames {
    pub mail: String,
    pub slack: String,
    pub line: String,
}

impl Default for ScriptNames {
    fn default() -> Self {
        Self {
            mail: "mla_script_for_mail".to_string(),
            slack: "mla_script_for_slack".to_string(),
            line: "mla_script_for_line".to_string(),
        }
    }
}

/// A stored script: its name and painless source.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptDescriptor {
    pub name: String,
    pub source: &'static str,
}

impl ScriptDescriptor {
    /// Body for `PUT _scripts/<name>`.
    pub fn registration_body(&self) -> Value {
        json!({
            "script": {
                "lang": SCRIPT_LANG,
                "source": self.source,
            }
        })
    }
}

/// The scripts in the order they are checked: mail, Slack, LINE.
pub fn notification_scripts(names: &ScriptNames) -> [ScriptDescriptor; 3] {
    [
        ScriptDescriptor {
            name: names.mail.clone(),
            source: MAIL_SCRIPT_SOURCE,
        },
        ScriptDescriptor {
            name: names.slack.clone(),
            source: SLACK_SCRIPT_SOURCE,
        },
        ScriptDescriptor {
            name: names.line.clone(),
            source: LINE_SCRIPT_SOURCE,
        },
    ]
}
