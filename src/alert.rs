//! Vulnerability-alert input model.
//!
//! The scanning source emits alerts as nested JSON (one object per
//! vulnerable dependency). [`AlertRecord`] is the flattened, immutable view
//! the rest of the crate works with; flattening is also where the severity
//! vocabulary is enforced, so everything downstream can treat severity as
//! total.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Errors raised while turning alert JSON into [`AlertRecord`]s.
#[derive(Debug, thiserror::Error)]
pub enum AlertError {
    /// Severity value outside the fixed LOW/MODERATE/HIGH/CRITICAL vocabulary.
    #[error("unmapped severity {0:?}: expected LOW, MODERATE, HIGH or CRITICAL")]
    UnmappedSeverity(String),

    /// The input document could not be deserialized.
    #[error("invalid alert payload: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Alert severity, in the scanning source's vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Lowest severity tier.
    Low,
    /// Moderate severity tier.
    Moderate,
    /// High severity tier.
    High,
    /// Critical severity tier.
    Critical,
}

impl Severity {
    /// The tracker-side value for this severity (select-field vocabulary).
    #[must_use]
    pub fn tracker_value(self) -> &'static str {
        match self {
            Severity::Low => "Low",
            Severity::Moderate => "Medium",
            Severity::High => "High",
            Severity::Critical => "Critical",
        }
    }
}

impl FromStr for Severity {
    type Err = AlertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LOW" => Ok(Severity::Low),
            "MODERATE" => Ok(Severity::Moderate),
            "HIGH" => Ok(Severity::High),
            "CRITICAL" => Ok(Severity::Critical),
            other => Err(AlertError::UnmappedSeverity(other.to_string())),
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Low => "LOW",
            Severity::Moderate => "MODERATE",
            Severity::High => "HIGH",
            Severity::Critical => "CRITICAL",
        };
        f.write_str(s)
    }
}

/// One alert node as emitted by the scanning source.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertPayload {
    /// Path of the manifest file the vulnerable dependency is declared in.
    pub vulnerable_manifest_path: String,
    /// The vulnerability details for that dependency.
    pub security_vulnerability: SecurityVulnerability,
}

/// The `securityVulnerability` object of an alert node.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityVulnerability {
    /// The affected package.
    pub package: AlertPackage,
    /// Version range the advisory applies to.
    pub vulnerable_version_range: String,
    /// First patched version, absent while no fix is published.
    #[serde(default)]
    pub first_patched_version: Option<PatchedVersion>,
    /// Severity string (`LOW`/`MODERATE`/`HIGH`/`CRITICAL`).
    pub severity: String,
    /// When the source last updated this alert.
    pub updated_at: DateTime<Utc>,
    /// The underlying advisory.
    pub advisory: Advisory,
}

/// Package coordinates of an alert.
#[derive(Debug, Clone, Deserialize)]
pub struct AlertPackage {
    /// Package name.
    pub name: String,
    /// Package ecosystem (e.g. `npm`, `COMPOSER`); sometimes absent.
    #[serde(default)]
    pub ecosystem: Option<String>,
}

/// First patched version wrapper.
#[derive(Debug, Clone, Deserialize)]
pub struct PatchedVersion {
    /// The patched version string.
    pub identifier: String,
}

/// The advisory backing an alert.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Advisory {
    /// Globally unique advisory identifier.
    pub ghsa_id: String,
    /// Advisory description; sometimes absent.
    #[serde(default)]
    pub description: Option<String>,
    /// Reference entries; entries without a URL are dropped on flattening.
    #[serde(default)]
    pub references: Vec<AdvisoryReference>,
}

/// A single advisory reference entry.
#[derive(Debug, Clone, Deserialize)]
pub struct AdvisoryReference {
    /// Reference URL; malformed entries omit it.
    #[serde(default)]
    pub url: Option<String>,
}

/// Flattened, immutable alert view consumed by the ticket logic.
#[derive(Debug, Clone)]
pub struct AlertRecord {
    /// Affected package name.
    pub package: String,
    /// Package ecosystem; empty when the source omitted it.
    pub ecosystem: String,
    /// Vulnerable version range.
    pub vulnerable_range: String,
    /// First patched version, if a fix is published.
    pub safe_version: Option<String>,
    /// Advisory identifier.
    pub advisory_id: String,
    /// Parsed severity.
    pub severity: Severity,
    /// Advisory description; empty when the source omitted it.
    pub description: String,
    /// Reference URLs, in source order.
    pub references: Vec<String>,
    /// Directory of the manifest the dependency is declared in; `"."` for
    /// the repository root.
    pub manifest_path: String,
    /// When the source last updated this alert.
    pub updated_at: DateTime<Utc>,
}

impl AlertRecord {
    /// Flattens a source payload into an [`AlertRecord`].
    ///
    /// # Errors
    ///
    /// Returns [`AlertError::UnmappedSeverity`] when the severity value is
    /// outside the fixed vocabulary.
    pub fn from_payload(payload: AlertPayload) -> Result<Self, AlertError> {
        let vuln = payload.security_vulnerability;
        let severity = vuln.severity.parse()?;

        let references = vuln
            .advisory
            .references
            .into_iter()
            .filter_map(|r| r.url)
            .collect();

        Ok(AlertRecord {
            package: vuln.package.name,
            ecosystem: vuln.package.ecosystem.unwrap_or_default(),
            vulnerable_range: vuln.vulnerable_version_range,
            safe_version: vuln.first_patched_version.map(|v| v.identifier),
            advisory_id: vuln.advisory.ghsa_id,
            severity,
            description: vuln.advisory.description.unwrap_or_default(),
            references,
            manifest_path: manifest_dir(&payload.vulnerable_manifest_path),
            updated_at: vuln.updated_at,
        })
    }

    /// Whether the manifest sits at the repository root.
    #[must_use]
    pub fn is_root_manifest(&self) -> bool {
        self.manifest_path.is_empty() || self.manifest_path == "."
    }
}

/// Parses an input document holding one alert object or an array of them.
///
/// # Errors
///
/// Returns an error when the document is not valid JSON, does not match the
/// alert shape, or an alert carries an unmapped severity.
pub fn parse_alerts(input: &str) -> Result<Vec<AlertRecord>, AlertError> {
    let value: serde_json::Value = serde_json::from_str(input)?;
    let payloads: Vec<AlertPayload> = if value.is_array() {
        serde_json::from_value(value)?
    } else {
        vec![serde_json::from_value(value)?]
    };
    payloads.into_iter().map(AlertRecord::from_payload).collect()
}

/// Directory component of a manifest file path, `"."` for root-level files.
fn manifest_dir(path: &str) -> String {
    match Path::new(path).parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_string_lossy().into_owned(),
        _ => ".".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(manifest: &str, severity: &str) -> serde_json::Value {
        json!({
            "vulnerableManifestPath": manifest,
            "securityVulnerability": {
                "package": { "name": "lodash", "ecosystem": "npm" },
                "vulnerableVersionRange": "<4.17.21",
                "firstPatchedVersion": { "identifier": "4.17.21" },
                "severity": severity,
                "updatedAt": "2021-05-12T16:11:51Z",
                "advisory": {
                    "ghsaId": "GHSA-xxxx",
                    "description": "Prototype pollution.",
                    "references": [
                        { "url": "https://example.com/a" },
                        { "note": "no url here" }
                    ]
                }
            }
        })
    }

    fn record(manifest: &str, severity: &str) -> AlertRecord {
        let parsed: AlertPayload = serde_json::from_value(payload(manifest, severity)).unwrap();
        AlertRecord::from_payload(parsed).unwrap()
    }

    #[test]
    fn severity_parses_fixed_vocabulary() {
        assert_eq!("LOW".parse::<Severity>().unwrap(), Severity::Low);
        assert_eq!("MODERATE".parse::<Severity>().unwrap(), Severity::Moderate);
        assert_eq!("HIGH".parse::<Severity>().unwrap(), Severity::High);
        assert_eq!("CRITICAL".parse::<Severity>().unwrap(), Severity::Critical);
    }

    #[test]
    fn severity_rejects_unknown_value() {
        let err = "SEVERE".parse::<Severity>().unwrap_err();
        assert!(matches!(err, AlertError::UnmappedSeverity(ref v) if v == "SEVERE"));
    }

    #[test]
    fn severity_maps_moderate_to_medium() {
        assert_eq!(Severity::Moderate.tracker_value(), "Medium");
    }

    #[test]
    fn severity_displays_source_form() {
        assert_eq!(Severity::High.to_string(), "HIGH");
    }

    #[test]
    fn root_manifest_flattens_to_dot() {
        let rec = record("package-lock.json", "HIGH");
        assert_eq!(rec.manifest_path, ".");
        assert!(rec.is_root_manifest());
    }

    #[test]
    fn nested_manifest_keeps_directory() {
        let rec = record("services/api/package-lock.json", "HIGH");
        assert_eq!(rec.manifest_path, "services/api");
        assert!(!rec.is_root_manifest());
    }

    #[test]
    fn references_without_url_are_dropped() {
        let rec = record(".", "HIGH");
        assert_eq!(rec.references, vec!["https://example.com/a".to_string()]);
    }

    #[test]
    fn missing_ecosystem_and_description_become_empty() {
        let value = json!({
            "vulnerableManifestPath": "composer.lock",
            "securityVulnerability": {
                "package": { "name": "guzzle" },
                "vulnerableVersionRange": "<7.0",
                "severity": "LOW",
                "updatedAt": "2021-05-12T16:11:51Z",
                "advisory": { "ghsaId": "GHSA-yyyy" }
            }
        });
        let parsed: AlertPayload = serde_json::from_value(value).unwrap();
        let rec = AlertRecord::from_payload(parsed).unwrap();
        assert_eq!(rec.ecosystem, "");
        assert_eq!(rec.description, "");
        assert_eq!(rec.safe_version, None);
        assert!(rec.references.is_empty());
    }

    #[test]
    fn unmapped_severity_fails_flattening() {
        let parsed: AlertPayload =
            serde_json::from_value(payload(".", "WORRYING")).unwrap();
        let err = AlertRecord::from_payload(parsed).unwrap_err();
        assert!(matches!(err, AlertError::UnmappedSeverity(_)));
    }

    #[test]
    fn parse_alerts_accepts_single_object() {
        let input = payload(".", "HIGH").to_string();
        let records = parse_alerts(&input).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].package, "lodash");
    }

    #[test]
    fn parse_alerts_accepts_array() {
        let input = json!([payload(".", "HIGH"), payload("sub/app.lock", "LOW")]).to_string();
        let records = parse_alerts(&input).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].manifest_path, "sub");
    }

    #[test]
    fn parse_alerts_rejects_malformed_json() {
        assert!(matches!(parse_alerts("not json"), Err(AlertError::Payload(_))));
    }
}
