//! `secjira render` command.

use std::path::Path;

use crate::alert::{parse_alerts, AlertRecord};
use crate::config::ContentSettings;
use crate::ticket::TicketDraft;

/// Execute the `render` command.
///
/// Prints the draft each alert would produce without touching the tracker;
/// only the content-shaping settings are read from the environment.
///
/// # Errors
///
/// Returns an error string when configuration is incomplete or the input
/// cannot be read or parsed.
pub fn run(input: Option<&Path>) -> Result<(), String> {
    let settings = ContentSettings::from_env().map_err(|e| e.to_string())?;
    let document = super::read_input(input)?;
    let alerts = parse_alerts(&document).map_err(|e| e.to_string())?;

    for alert in &alerts {
        println!("{}", render_alert(alert, &settings));
    }

    Ok(())
}

fn render_alert(alert: &AlertRecord, settings: &ContentSettings) -> String {
    let draft = TicketDraft::build(alert, settings);
    let labels: Vec<&str> = draft.labels.iter().map(String::as_str).collect();
    format!(
        "key:    {}\ntitle:  {}\nlabels: {}\n\n{}\n",
        draft.identity_key,
        draft.title,
        labels.join(", "),
        draft.body
    )
}
