//! Runtime configuration.
//!
//! All environment variables are enumerated here and read exactly once at
//! startup into [`Settings`]; nothing else in the crate touches the
//! environment. A `.env` file in the working directory is honored by the
//! binary before loading.

use std::env;

const ENV_REPOSITORY: &str = "GITHUB_REPOSITORY";
const ENV_JIRA_HOST: &str = "JIRA_HOST";
const ENV_JIRA_USER: &str = "JIRA_USER";
const ENV_JIRA_TOKEN: &str = "JIRA_TOKEN";
const ENV_JIRA_PROJECT: &str = "JIRA_PROJECT";
const ENV_JIRA_ISSUE_TYPE: &str = "JIRA_ISSUE_TYPE";
const ENV_JIRA_ISSUE_LABELS: &str = "JIRA_ISSUE_LABELS";
const ENV_JIRA_WATCHERS: &str = "JIRA_WATCHERS";
const ENV_SEVERITY_FIELD: &str = "JIRA_SEVERITY_FIELD";
const ENV_CREATED_DATE_FIELD: &str = "JIRA_CREATED_DATE_FIELD";
const ENV_STORY_POINTS_FIELD: &str = "JIRA_STORY_POINTS_FIELD";
const ENV_STORY_POINTS: &str = "JIRA_STORY_POINTS";
const ENV_EPIC_FIELD: &str = "JIRA_EPIC_FIELD";
const ENV_EPIC_KEY: &str = "JIRA_EPIC_KEY";

const DEFAULT_ISSUE_TYPE: &str = "Bug";

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required variable is absent or blank.
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    /// A variable is present but unusable.
    #[error("invalid value for {name}: {value:?} ({reason})")]
    Invalid {
        /// The variable name.
        name: &'static str,
        /// The offending value.
        value: String,
        /// Why it was rejected.
        reason: String,
    },
}

/// Tracker connection settings.
#[derive(Debug, Clone)]
pub struct JiraSettings {
    /// Tracker base URL, without a trailing slash.
    pub base_url: String,
    /// User (email) for basic auth.
    pub user: String,
    /// API token for basic auth.
    pub token: String,
}

/// Deployment-specific custom-field mapping.
///
/// Every field is optional; a deployment configures only the fields its
/// tracker project defines.
#[derive(Debug, Clone, Default)]
pub struct CustomFieldMap {
    /// Field id for the severity select field.
    pub severity_field: Option<String>,
    /// Field id receiving the alert's last-updated timestamp.
    pub created_date_field: Option<String>,
    /// Field id for story points, with the points value to set.
    pub story_points: Option<(String, f64)>,
    /// Field id for the epic link, with the epic issue key to set.
    pub epic_link: Option<(String, String)>,
}

/// Settings that shape ticket content, independent of any tracker
/// connection. The offline `render` command loads only these.
#[derive(Debug, Clone)]
pub struct ContentSettings {
    /// Repository identifier (e.g. `acme/webshop`).
    pub repository: String,
    /// Extra labels added to every ticket.
    pub extra_labels: Vec<String>,
    /// Custom-field mapping.
    pub custom_fields: CustomFieldMap,
}

/// Complete runtime settings for the `ensure` command.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Content-shaping settings.
    pub content: ContentSettings,
    /// Tracker connection settings.
    pub jira: JiraSettings,
    /// Tracker project to create tickets in.
    pub project_key: String,
    /// Issue type for created tickets.
    pub issue_type: String,
    /// Watcher identities to reconcile onto created tickets.
    pub watchers: Vec<String>,
}

impl ContentSettings {
    /// Loads content settings from the environment.
    ///
    /// # Errors
    ///
    /// Returns an error when a required variable is missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        Ok(ContentSettings {
            repository: required(&lookup, ENV_REPOSITORY)?,
            extra_labels: lookup(ENV_JIRA_ISSUE_LABELS)
                .map(|v| split_csv(&v))
                .unwrap_or_default(),
            custom_fields: custom_fields(&lookup)?,
        })
    }
}

impl Settings {
    /// Loads the full settings from the environment, validating everything
    /// up front so misconfiguration surfaces before any tracker call.
    ///
    /// # Errors
    ///
    /// Returns an error when a required variable is missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let content = ContentSettings::from_lookup(&lookup)?;

        let jira = JiraSettings {
            base_url: required(&lookup, ENV_JIRA_HOST)?
                .trim_end_matches('/')
                .to_string(),
            user: required(&lookup, ENV_JIRA_USER)?,
            token: required(&lookup, ENV_JIRA_TOKEN)?,
        };

        Ok(Settings {
            content,
            jira,
            project_key: required(&lookup, ENV_JIRA_PROJECT)?,
            issue_type: lookup(ENV_JIRA_ISSUE_TYPE)
                .unwrap_or_else(|| DEFAULT_ISSUE_TYPE.to_string()),
            watchers: lookup(ENV_JIRA_WATCHERS)
                .map(|v| split_csv(&v))
                .unwrap_or_default(),
        })
    }
}

fn custom_fields<F>(lookup: &F) -> Result<CustomFieldMap, ConfigError>
where
    F: Fn(&'static str) -> Option<String>,
{
    let story_points = match (lookup(ENV_STORY_POINTS_FIELD), lookup(ENV_STORY_POINTS)) {
        (Some(field), Some(points)) => {
            let value = points.parse::<f64>().map_err(|_| ConfigError::Invalid {
                name: ENV_STORY_POINTS,
                value: points.clone(),
                reason: "not a number".to_string(),
            })?;
            Some((field, value))
        }
        (Some(field), None) => {
            return Err(ConfigError::Invalid {
                name: ENV_STORY_POINTS_FIELD,
                value: field,
                reason: format!("set without {ENV_STORY_POINTS}"),
            });
        }
        (None, _) => None,
    };

    let epic_link = match (lookup(ENV_EPIC_FIELD), lookup(ENV_EPIC_KEY)) {
        (Some(field), Some(key)) => Some((field, key)),
        (Some(field), None) => {
            return Err(ConfigError::Invalid {
                name: ENV_EPIC_FIELD,
                value: field,
                reason: format!("set without {ENV_EPIC_KEY}"),
            });
        }
        (None, _) => None,
    };

    Ok(CustomFieldMap {
        severity_field: lookup(ENV_SEVERITY_FIELD),
        created_date_field: lookup(ENV_CREATED_DATE_FIELD),
        story_points,
        epic_link,
    })
}

fn env_lookup(name: &'static str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn required<F>(lookup: &F, name: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&'static str) -> Option<String>,
{
    lookup(name).ok_or(ConfigError::Missing(name))
}

/// Splits a comma-separated value, trimming entries and dropping empties.
fn split_csv(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from<'a>(
        pairs: &'a [(&'static str, &'static str)],
    ) -> impl Fn(&'static str) -> Option<String> + 'a {
        let map: HashMap<&'static str, String> =
            pairs.iter().map(|(k, v)| (*k, (*v).to_string())).collect();
        move |name| map.get(name).cloned()
    }

    fn base_pairs() -> Vec<(&'static str, &'static str)> {
        vec![
            (ENV_REPOSITORY, "acme/webshop"),
            (ENV_JIRA_HOST, "https://acme.atlassian.net/"),
            (ENV_JIRA_USER, "bot@acme.example"),
            (ENV_JIRA_TOKEN, "t0ken"),
            (ENV_JIRA_PROJECT, "SEC"),
        ]
    }

    #[test]
    fn loads_minimal_settings_with_defaults() {
        let pairs = base_pairs();
        let settings = Settings::from_lookup(lookup_from(&pairs)).unwrap();
        assert_eq!(settings.content.repository, "acme/webshop");
        assert_eq!(settings.jira.base_url, "https://acme.atlassian.net");
        assert_eq!(settings.project_key, "SEC");
        assert_eq!(settings.issue_type, "Bug");
        assert!(settings.watchers.is_empty());
        assert!(settings.content.extra_labels.is_empty());
        assert!(settings.content.custom_fields.severity_field.is_none());
    }

    #[test]
    fn missing_required_variable_is_reported_by_name() {
        let mut pairs = base_pairs();
        pairs.retain(|(name, _)| *name != ENV_JIRA_PROJECT);
        let err = Settings::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "missing required environment variable JIRA_PROJECT"
        );
    }

    #[test]
    fn blank_required_variable_counts_as_missing() {
        let pairs = vec![(ENV_REPOSITORY, "   ")];
        let err = ContentSettings::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(ENV_REPOSITORY)));
    }

    #[test]
    fn splits_labels_and_watchers() {
        let mut pairs = base_pairs();
        pairs.push((ENV_JIRA_ISSUE_LABELS, "security, dependencies ,,"));
        pairs.push((ENV_JIRA_WATCHERS, "a@x.com,ghost@x.com"));
        let settings = Settings::from_lookup(lookup_from(&pairs)).unwrap();
        assert_eq!(settings.content.extra_labels, vec!["security", "dependencies"]);
        assert_eq!(settings.watchers, vec!["a@x.com", "ghost@x.com"]);
    }

    #[test]
    fn parses_custom_field_pairs() {
        let mut pairs = base_pairs();
        pairs.push((ENV_SEVERITY_FIELD, "customfield_11633"));
        pairs.push((ENV_CREATED_DATE_FIELD, "customfield_11632"));
        pairs.push((ENV_STORY_POINTS_FIELD, "customfield_10004"));
        pairs.push((ENV_STORY_POINTS, "3"));
        pairs.push((ENV_EPIC_FIELD, "customfield_10008"));
        pairs.push((ENV_EPIC_KEY, "SEC-1"));
        let settings = Settings::from_lookup(lookup_from(&pairs)).unwrap();
        let fields = &settings.content.custom_fields;
        assert_eq!(fields.severity_field.as_deref(), Some("customfield_11633"));
        assert_eq!(fields.created_date_field.as_deref(), Some("customfield_11632"));
        assert_eq!(
            fields.story_points,
            Some(("customfield_10004".to_string(), 3.0))
        );
        assert_eq!(
            fields.epic_link,
            Some(("customfield_10008".to_string(), "SEC-1".to_string()))
        );
    }

    #[test]
    fn story_points_field_without_value_is_invalid() {
        let mut pairs = base_pairs();
        pairs.push((ENV_STORY_POINTS_FIELD, "customfield_10004"));
        let err = Settings::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name, .. } if name == ENV_STORY_POINTS_FIELD));
    }

    #[test]
    fn non_numeric_story_points_is_invalid() {
        let mut pairs = base_pairs();
        pairs.push((ENV_STORY_POINTS_FIELD, "customfield_10004"));
        pairs.push((ENV_STORY_POINTS, "three"));
        let err = Settings::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name, .. } if name == ENV_STORY_POINTS));
    }

    #[test]
    fn epic_field_without_key_is_invalid() {
        let mut pairs = base_pairs();
        pairs.push((ENV_EPIC_FIELD, "customfield_10008"));
        let err = Settings::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name, .. } if name == ENV_EPIC_FIELD));
    }
}
