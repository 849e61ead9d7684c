//! The idempotent ensure workflow.
//!
//! One call per alert: check for an existing ticket by identity-key label,
//! otherwise create one and reconcile watchers onto it. The workflow holds
//! no state between calls and never updates an existing ticket.

use crate::alert::AlertRecord;
use crate::config::Settings;
use crate::ticket::content::TicketDraft;
use crate::ticket::watchers::{self, WatcherReport};
use crate::tracker::{NewTicket, TicketTracker, TrackerError};

/// Errors from a single ensure call.
#[derive(Debug, thiserror::Error)]
pub enum EnsureError {
    /// The tracker rejected or failed the create call.
    #[error("could not create ticket: {0}")]
    CreateFailed(#[source] TrackerError),

    /// An existence-check, watcher or comment call failed; passed through
    /// unchanged.
    #[error(transparent)]
    Tracker(#[from] TrackerError),
}

/// Terminal result of an ensure call.
#[derive(Debug)]
pub enum EnsureOutcome {
    /// A ticket with this identity key already existed.
    Found {
        /// Key of the existing ticket.
        key: String,
    },
    /// A ticket was created and its watchers reconciled.
    Created {
        /// Key of the new ticket.
        key: String,
        /// What happened to each requested watcher.
        watchers: WatcherReport,
    },
}

impl EnsureOutcome {
    /// The ticket key, whichever path produced it.
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            EnsureOutcome::Found { key } | EnsureOutcome::Created { key, .. } => key,
        }
    }
}

/// Drives the ensure workflow against an injected tracker.
pub struct TicketEnsurer<T> {
    tracker: T,
    settings: Settings,
}

impl<T: TicketTracker> TicketEnsurer<T> {
    /// Creates an ensurer over the given tracker and settings.
    pub fn new(tracker: T, settings: Settings) -> Self {
        Self { tracker, settings }
    }

    /// Ensures a ticket exists for the alert.
    ///
    /// Checks for a ticket labeled with the alert's identity key first and
    /// returns it untouched when found. Otherwise renders the draft,
    /// creates the ticket, and reconciles the configured watchers onto it.
    ///
    /// # Errors
    ///
    /// Returns [`EnsureError::CreateFailed`] when the create call fails;
    /// existence-check, add-watcher and comment failures propagate as
    /// [`EnsureError::Tracker`].
    pub async fn ensure(&self, alert: &AlertRecord) -> Result<EnsureOutcome, EnsureError> {
        let draft = TicketDraft::build(alert, &self.settings.content);

        if let Some(existing) = self.tracker.find_ticket_by_label(&draft.identity_key).await? {
            tracing::info!(
                identity = %draft.identity_key,
                ticket = %existing,
                "ticket already exists"
            );
            return Ok(EnsureOutcome::Found { key: existing });
        }

        let identity = draft.identity_key.clone();
        let request = self.create_request(draft);
        let key = self
            .tracker
            .create_ticket(&request)
            .await
            .map_err(EnsureError::CreateFailed)?;
        tracing::info!(identity = %identity, ticket = %key, "created ticket");

        let watchers = watchers::reconcile(&self.tracker, &key, &self.settings.watchers).await?;

        Ok(EnsureOutcome::Created { key, watchers })
    }

    fn create_request(&self, draft: TicketDraft) -> NewTicket {
        NewTicket {
            project_key: self.settings.project_key.clone(),
            title: draft.title,
            body: draft.body,
            issue_type: self.settings.issue_type.clone(),
            labels: draft.labels.into_iter().collect(),
            custom_fields: draft.custom_fields,
        }
    }
}
