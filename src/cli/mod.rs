//! Command-line front end.

pub mod commands;
pub mod output;
pub mod types;

pub use types::{Cli, Commands};

use crate::domain::DomainError;

/// Print a fatal error and exit non-zero.
pub fn handle_error(err: anyhow::Error, json_mode: bool) -> ! {
    let fatal = err
        .downcast_ref::<DomainError>()
        .is_some_and(DomainError::is_fatal_to_run);
    if json_mode {
        let value = serde_json::json!({
            "success": false,
            "error": format!("{err:#}"),
            "fatal_to_run": fatal,
        });
        println!("{}", serde_json::to_string_pretty(&value).unwrap_or_default());
    } else {
        eprintln!("Error: {err:#}");
    }
    std::process::exit(if fatal { 2 } else { 1 });
}
