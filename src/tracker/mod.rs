//! Issue-tracker boundary.
//!
//! [`TicketTracker`] is the seam between the ticket logic and the external
//! tracker; the live Jira adapter lives in [`jira`], and tests drive the
//! ensurer with in-memory implementations instead of a real API.

pub mod jira;

use async_trait::async_trait;
use serde::Deserialize;

pub use jira::JiraClient;

/// Errors from tracker calls.
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    /// The HTTP request itself failed (connect, timeout, decode).
    #[error("tracker request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The tracker answered with a non-success status.
    #[error("tracker returned HTTP {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body text, as far as it could be read.
        message: String,
    },

    /// The response body did not match the expected shape.
    #[error("failed to decode tracker response: {0}")]
    Decode(String),
}

/// A resolved tracker user account.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Opaque account id used for watcher operations.
    pub account_id: String,
    /// Human-readable name used in summary comments.
    pub display_name: String,
}

/// A ticket create request, assembled from the draft and settings.
#[derive(Debug, Clone)]
pub struct NewTicket {
    /// Tracker project to create the ticket in.
    pub project_key: String,
    /// Ticket summary line.
    pub title: String,
    /// Ticket description body.
    pub body: String,
    /// Issue type name (e.g. `"Bug"`).
    pub issue_type: String,
    /// Labels to attach, including the identity key.
    pub labels: Vec<String>,
    /// Deployment-specific custom fields, merged into the create request.
    pub custom_fields: serde_json::Map<String, serde_json::Value>,
}

/// Manages tickets in an external tracker.
///
/// Abstracting the tracker keeps the ensure workflow testable without
/// touching a real tracker API.
#[async_trait]
pub trait TicketTracker: Send + Sync {
    /// Looks up a ticket tagged with the given label.
    ///
    /// Returns the key of the earliest matching ticket, or `None` when no
    /// ticket carries the label.
    ///
    /// # Errors
    ///
    /// Returns an error if the search request fails.
    async fn find_ticket_by_label(&self, label: &str) -> Result<Option<String>, TrackerError>;

    /// Creates a new ticket and returns its assigned key.
    ///
    /// # Errors
    ///
    /// Returns an error if the ticket cannot be created.
    async fn create_ticket(&self, ticket: &NewTicket) -> Result<String, TrackerError>;

    /// Resolves an external identity (email or username) to an account.
    ///
    /// Returns `None` when the tracker knows no matching account; that is
    /// an expected outcome, not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup request fails.
    async fn resolve_account(&self, identity: &str) -> Result<Option<Account>, TrackerError>;

    /// Adds an account as a watcher on a ticket.
    ///
    /// # Errors
    ///
    /// Returns an error if the watcher cannot be added.
    async fn add_watcher(&self, ticket_key: &str, account_id: &str) -> Result<(), TrackerError>;

    /// Posts a comment on a ticket.
    ///
    /// # Errors
    ///
    /// Returns an error if the comment cannot be posted.
    async fn add_comment(&self, ticket_key: &str, body: &str) -> Result<(), TrackerError>;
}
