//! `secjira ensure` command.

use std::path::Path;

use crate::alert::parse_alerts;
use crate::config::Settings;
use crate::ticket::{identity_key, EnsureOutcome, TicketEnsurer};
use crate::tracker::JiraClient;

/// Execute the `ensure` command.
///
/// Loads settings, reads the alert document, and ensures a ticket per alert
/// sequentially. One result line is printed per alert; the first hard
/// failure aborts the run.
///
/// # Errors
///
/// Returns an error string when configuration is incomplete, the input
/// cannot be read or parsed, or a tracker call fails.
pub async fn run(input: Option<&Path>) -> Result<(), String> {
    let settings = Settings::from_env().map_err(|e| e.to_string())?;
    let document = super::read_input(input)?;
    let alerts = parse_alerts(&document).map_err(|e| e.to_string())?;

    let tracker =
        JiraClient::new(&settings.jira, &settings.project_key).map_err(|e| e.to_string())?;
    let ensurer = TicketEnsurer::new(tracker, settings);

    for alert in &alerts {
        let identity = identity_key(alert);
        let outcome = ensurer.ensure(alert).await.map_err(|e| e.to_string())?;
        println!("{}", result_line(&outcome, &identity));
    }

    Ok(())
}

fn result_line(outcome: &EnsureOutcome, identity: &str) -> String {
    match outcome {
        EnsureOutcome::Found { key } => format!("exists  {key} ({identity})"),
        EnsureOutcome::Created { key, watchers } if watchers.is_empty() => {
            format!("created {key} ({identity})")
        }
        EnsureOutcome::Created { key, watchers } => format!(
            "created {key} ({identity}), watchers: {} added, {} not found",
            watchers.added.len(),
            watchers.not_found.len()
        ),
    }
}
