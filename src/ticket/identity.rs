//! Identity-key derivation.
//!
//! The key is attached to every ticket as a label and is the sole dedup
//! criterion: one key, one ticket.

use crate::alert::AlertRecord;

/// Derives the deduplication key for an alert.
///
/// The identifier part is the patched version when one exists, otherwise
/// the advisory id. A fix published after the ticket was created therefore
/// changes the key and yields a fresh ticket; the changed situation gets
/// its own tracking.
///
/// Keys double as tracker labels, so every whitespace character in the
/// composed key is replaced with an underscore.
#[must_use]
pub fn identity_key(alert: &AlertRecord) -> String {
    let identifier = alert
        .safe_version
        .as_deref()
        .unwrap_or(&alert.advisory_id);

    let composed = if alert.is_root_manifest() {
        format!("{}:{}", alert.package, identifier)
    } else {
        format!("{}:{}:{}", alert.package, alert.manifest_path, identifier)
    };

    composed
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect()
}
