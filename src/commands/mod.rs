//! Command dispatch and handlers.

pub mod ensure;
pub mod render;

use std::fs;
use std::io::Read;
use std::path::Path;

use crate::cli::Command;

/// Dispatch a parsed command to its handler.
///
/// # Errors
///
/// Returns an error string if the selected command handler fails.
pub async fn dispatch(command: &Command) -> Result<(), String> {
    match command {
        Command::Ensure { input } => ensure::run(input.as_deref()).await,
        Command::Render { input } => render::run(input.as_deref()),
    }
}

/// Reads the alert document from a file, or stdin for `None` / `"-"`.
fn read_input(path: Option<&Path>) -> Result<String, String> {
    match path {
        Some(path) if path.as_os_str() != "-" => fs::read_to_string(path)
            .map_err(|e| format!("could not read {}: {e}", path.display())),
        _ => {
            let mut document = String::new();
            std::io::stdin()
                .read_to_string(&mut document)
                .map_err(|e| format!("could not read stdin: {e}"))?;
            Ok(document)
        }
    }
}
