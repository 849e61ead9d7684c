//! Ticket content formatting.
//!
//! Builds the [`TicketDraft`] for an alert: title, wiki-markup body, label
//! set and configured custom fields. Everything here is a pure function of
//! the alert plus [`ContentSettings`]; the same inputs always render the
//! same draft.

use std::collections::BTreeSet;
use std::fmt::Write;

use chrono::SecondsFormat;
use serde_json::{json, Map, Value};

use crate::alert::AlertRecord;
use crate::config::ContentSettings;
use crate::ticket::identity::identity_key;

/// Column the advisory description is word-wrapped at.
const BODY_WRAP_COLUMN: usize = 100;

/// Rendered in place of a version when no fix is published.
const NO_FIX: &str = "no fix";

/// Everything needed to create a ticket, minus the tracker coordinates.
#[derive(Debug, Clone)]
pub struct TicketDraft {
    /// Deduplication key; also attached as a label.
    pub identity_key: String,
    /// Ticket summary line.
    pub title: String,
    /// Ticket body, Jira wiki markup.
    pub body: String,
    /// Labels to attach. Set semantics; iteration order is sorted.
    pub labels: BTreeSet<String>,
    /// Configured custom fields keyed by tracker field id.
    pub custom_fields: Map<String, Value>,
}

impl TicketDraft {
    /// Renders the draft for an alert.
    #[must_use]
    pub fn build(alert: &AlertRecord, settings: &ContentSettings) -> Self {
        let key = identity_key(alert);
        let safe_version = alert.safe_version.as_deref().unwrap_or(NO_FIX);

        let mut labels: BTreeSet<String> = BTreeSet::new();
        labels.insert(settings.repository.clone());
        labels.insert(key.clone());
        labels.extend(settings.extra_labels.iter().cloned());

        TicketDraft {
            title: format!("{} ({safe_version}) - {}", alert.package, alert.severity),
            body: body(alert, &settings.repository, safe_version),
            labels,
            custom_fields: custom_fields(alert, settings),
            identity_key: key,
        }
    }
}

fn body(alert: &AlertRecord, repository: &str, safe_version: &str) -> String {
    let mut body = String::new();
    let _ = writeln!(
        body,
        "- Repository: [{repository}|https://github.com/{repository}]"
    );
    let _ = writeln!(body, "- Package: {} ({})", alert.package, alert.ecosystem);
    let _ = writeln!(body, "- Vulnerable version: {}", alert.vulnerable_range);
    let _ = writeln!(body, "- Secure version: {safe_version}");

    if !alert.references.is_empty() {
        let _ = writeln!(body, "- Links:");
        for url in &alert.references {
            let _ = writeln!(body, "-- {url}");
        }
    }

    // The description is third-party text; {noformat} keeps any markup in
    // it from being interpreted by the tracker.
    let _ = writeln!(body);
    let _ = writeln!(body, "{{noformat}}");
    let _ = writeln!(body, "{}", word_wrap(&alert.description, BODY_WRAP_COLUMN));
    body.push_str("{noformat}");
    body
}

fn custom_fields(alert: &AlertRecord, settings: &ContentSettings) -> Map<String, Value> {
    let mapping = &settings.custom_fields;
    let mut fields = Map::new();

    if let Some(field) = &mapping.severity_field {
        fields.insert(field.clone(), json!({ "value": alert.severity.tracker_value() }));
    }
    if let Some(field) = &mapping.created_date_field {
        fields.insert(
            field.clone(),
            json!(alert.updated_at.to_rfc3339_opts(SecondsFormat::Secs, true)),
        );
    }
    if let Some((field, points)) = &mapping.story_points {
        fields.insert(field.clone(), json!(points));
    }
    if let Some((field, epic)) = &mapping.epic_link {
        fields.insert(field.clone(), json!(epic));
    }

    fields
}

/// Wraps text at word boundaries to the given width.
///
/// Existing newlines are preserved and words longer than the width stay
/// unbroken on their own line.
fn word_wrap(text: &str, width: usize) -> String {
    text.lines()
        .map(|line| wrap_line(line, width))
        .collect::<Vec<_>>()
        .join("\n")
}

fn wrap_line(line: &str, width: usize) -> String {
    let mut out = String::new();
    let mut column = 0;

    for word in line.split_whitespace() {
        let len = word.chars().count();
        if column == 0 {
            out.push_str(word);
            column = len;
        } else if column + 1 + len <= width {
            out.push(' ');
            out.push_str(word);
            column += 1 + len;
        } else {
            out.push('\n');
            out.push_str(word);
            column = len;
        }
    }

    out
}
