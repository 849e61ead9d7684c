//! Watcher reconciliation.
//!
//! Maps the configured watcher identities onto tracker accounts for a
//! freshly created ticket. Resolution misses are expected: they are
//! collected and reported in a summary comment, never raised as errors.

use crate::tracker::{Account, TicketTracker, TrackerError};

const WATCHERS_TEXT: &str = "This issue is being watched by:";
const NO_WATCHERS_TEXT: &str = "No watchers were added to this issue.";
const NOT_FOUND_TEXT: &str = "Could not find user accounts for:";

/// Outcome of reconciling the watcher list against the tracker.
#[derive(Debug, Clone, Default)]
pub struct WatcherReport {
    /// Accounts resolved and added as watchers.
    pub added: Vec<Account>,
    /// Identities the tracker could not resolve.
    pub not_found: Vec<String>,
}

impl WatcherReport {
    /// Whether there is nothing to report.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.not_found.is_empty()
    }

    /// Composes the summary comment, or `None` when both lists are empty
    /// (nothing to report, no comment posted).
    #[must_use]
    pub fn summary_comment(&self) -> Option<String> {
        if self.is_empty() {
            return None;
        }

        let mut comment = if self.added.is_empty() {
            NO_WATCHERS_TEXT.to_string()
        } else {
            format!("{WATCHERS_TEXT} {}", display_names(&self.added))
        };

        if !self.not_found.is_empty() {
            comment.push_str("\n\n");
            comment.push_str(&format!("{NOT_FOUND_TEXT} {}", quoted(&self.not_found)));
        }

        Some(comment)
    }
}

/// Resolves and adds each watcher on the ticket, then posts the summary
/// comment unless there is nothing to report.
///
/// A watcher that does not resolve — the tracker knows no such account, or
/// the lookup call itself failed — lands in the not-found list and never
/// aborts the loop. Failures of the add-watcher and add-comment calls do
/// propagate.
///
/// # Errors
///
/// Returns an error when adding a watcher or posting the comment fails.
pub async fn reconcile<T: TicketTracker>(
    tracker: &T,
    ticket_key: &str,
    watchers: &[String],
) -> Result<WatcherReport, TrackerError> {
    let mut report = WatcherReport::default();

    for identity in watchers {
        match tracker.resolve_account(identity).await {
            Ok(Some(account)) => {
                tracker.add_watcher(ticket_key, &account.account_id).await?;
                report.added.push(account);
            }
            Ok(None) => {
                tracing::info!(identity = %identity, ticket = %ticket_key, "watcher not found in tracker");
                report.not_found.push(identity.clone());
            }
            Err(err) => {
                tracing::warn!(identity = %identity, error = %err, "watcher resolution failed");
                report.not_found.push(identity.clone());
            }
        }
    }

    if let Some(comment) = report.summary_comment() {
        tracker.add_comment(ticket_key, &comment).await?;
    } else {
        tracing::debug!(ticket = %ticket_key, "no watcher outcome to report, skipping comment");
    }

    Ok(report)
}

fn display_names(accounts: &[Account]) -> String {
    accounts
        .iter()
        .map(|a| a.display_name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn quoted(identities: &[String]) -> String {
    identities
        .iter()
        .map(|i| format!("\"{i}\""))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(id: &str, name: &str) -> Account {
        Account { account_id: id.to_string(), display_name: name.to_string() }
    }

    #[test]
    fn empty_report_produces_no_comment() {
        assert_eq!(WatcherReport::default().summary_comment(), None);
    }

    #[test]
    fn added_watchers_are_listed_by_display_name() {
        let report = WatcherReport {
            added: vec![account("1", "Ada Lovelace"), account("2", "Grace Hopper")],
            not_found: vec![],
        };
        assert_eq!(
            report.summary_comment().unwrap(),
            "This issue is being watched by: Ada Lovelace, Grace Hopper"
        );
    }

    #[test]
    fn only_misses_fall_back_to_no_watchers_text() {
        let report = WatcherReport {
            added: vec![],
            not_found: vec!["ghost@x.com".to_string()],
        };
        assert_eq!(
            report.summary_comment().unwrap(),
            "No watchers were added to this issue.\n\nCould not find user accounts for: \"ghost@x.com\""
        );
    }

    #[test]
    fn mixed_report_appends_quoted_misses() {
        let report = WatcherReport {
            added: vec![account("1", "Ada Lovelace")],
            not_found: vec!["ghost@x.com".to_string(), "gone@x.com".to_string()],
        };
        let comment = report.summary_comment().unwrap();
        assert!(comment.starts_with("This issue is being watched by: Ada Lovelace"));
        assert!(comment.ends_with(
            "Could not find user accounts for: \"ghost@x.com\", \"gone@x.com\""
        ));
    }
}
