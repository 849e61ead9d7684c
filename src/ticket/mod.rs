//! Ticket domain logic.
//!
//! Pure pieces first — identity-key derivation and content formatting —
//! then the watcher reconciler and the ensure workflow that drive the
//! tracker boundary.

pub mod content;
pub mod ensure;
pub mod identity;
pub mod watchers;

pub use content::TicketDraft;
pub use ensure::{EnsureError, EnsureOutcome, TicketEnsurer};
pub use identity::identity_key;
pub use watchers::WatcherReport;
