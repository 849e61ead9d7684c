//! Live Jira adapter for the [`TicketTracker`] trait.
//!
//! Talks to the Jira REST v2 API with basic auth. Existence lookups are a
//! JQL search on the identity-key label, scoped to the configured project
//! and ordered by creation time so the earliest ticket wins.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::config::JiraSettings;

use super::{Account, NewTicket, TicketTracker, TrackerError};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const USER_AGENT: &str = concat!("secjira/", env!("CARGO_PKG_VERSION"));

/// Jira REST client.
pub struct JiraClient {
    http: reqwest::Client,
    base_url: String,
    user: String,
    token: String,
    project_key: String,
}

impl JiraClient {
    /// Builds a client for the given connection settings, scoping searches
    /// to `project_key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(settings: &JiraSettings, project_key: &str) -> Result<Self, TrackerError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            user: settings.user.clone(),
            token: settings.token.clone(),
            project_key: project_key.to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/rest/api/2/{path}", self.base_url)
    }

    async fn read_json<T>(response: reqwest::Response) -> Result<T, TrackerError>
    where
        T: serde::de::DeserializeOwned,
    {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();

        if !status.is_success() {
            return Err(TrackerError::Api { status: status.as_u16(), message: text });
        }

        serde_json::from_str(&text).map_err(|e| TrackerError::Decode(e.to_string()))
    }

    async fn expect_success(response: reqwest::Response) -> Result<(), TrackerError> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let message = response.text().await.unwrap_or_default();
        Err(TrackerError::Api { status: status.as_u16(), message })
    }
}

/// JQL for the existence lookup.
fn search_jql(project_key: &str, label: &str) -> String {
    format!("project = \"{project_key}\" AND labels = \"{label}\" ORDER BY created ASC")
}

/// The `fields` object of a create request.
fn create_fields(ticket: &NewTicket) -> Map<String, Value> {
    let mut fields = Map::new();
    fields.insert("project".to_string(), json!({ "key": ticket.project_key }));
    fields.insert("summary".to_string(), json!(ticket.title));
    fields.insert("description".to_string(), json!(ticket.body));
    fields.insert("issuetype".to_string(), json!({ "name": ticket.issue_type }));
    fields.insert("labels".to_string(), json!(ticket.labels));
    fields.extend(ticket.custom_fields.clone());
    fields
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    issues: Vec<IssueRef>,
}

#[derive(Debug, Deserialize)]
struct IssueRef {
    key: String,
}

#[derive(Debug, Deserialize)]
struct CreatedResponse {
    key: String,
}

#[async_trait]
impl TicketTracker for JiraClient {
    async fn find_ticket_by_label(&self, label: &str) -> Result<Option<String>, TrackerError> {
        let jql = search_jql(&self.project_key, label);
        tracing::debug!(jql = %jql, "searching for existing ticket");

        let response = self
            .http
            .get(self.url("search"))
            .basic_auth(&self.user, Some(&self.token))
            .query(&[("jql", jql.as_str()), ("maxResults", "1"), ("fields", "id")])
            .send()
            .await?;

        let found: SearchResponse = Self::read_json(response).await?;
        Ok(found.issues.into_iter().next().map(|issue| issue.key))
    }

    async fn create_ticket(&self, ticket: &NewTicket) -> Result<String, TrackerError> {
        let response = self
            .http
            .post(self.url("issue"))
            .basic_auth(&self.user, Some(&self.token))
            .json(&json!({ "fields": create_fields(ticket) }))
            .send()
            .await?;

        let created: CreatedResponse = Self::read_json(response).await?;
        tracing::debug!(ticket = %created.key, "create accepted");
        Ok(created.key)
    }

    async fn resolve_account(&self, identity: &str) -> Result<Option<Account>, TrackerError> {
        let response = self
            .http
            .get(self.url("user/search"))
            .basic_auth(&self.user, Some(&self.token))
            .query(&[("query", identity)])
            .send()
            .await?;

        let matches: Vec<Account> = Self::read_json(response).await?;
        Ok(matches.into_iter().next())
    }

    async fn add_watcher(&self, ticket_key: &str, account_id: &str) -> Result<(), TrackerError> {
        let response = self
            .http
            .post(self.url(&format!("issue/{ticket_key}/watchers")))
            .basic_auth(&self.user, Some(&self.token))
            // The watchers endpoint takes the account id as a bare JSON string.
            .json(&account_id)
            .send()
            .await?;

        Self::expect_success(response).await
    }

    async fn add_comment(&self, ticket_key: &str, body: &str) -> Result<(), TrackerError> {
        let response = self
            .http
            .post(self.url(&format!("issue/{ticket_key}/comment")))
            .basic_auth(&self.user, Some(&self.token))
            .json(&json!({ "body": body }))
            .send()
            .await?;

        Self::expect_success(response).await
    }
}
