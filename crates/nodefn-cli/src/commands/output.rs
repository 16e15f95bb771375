//! Shared success/error output for commands.

use miette::{IntoDiagnostic, Result};
use serde::Serialize;

/// Schema version for every `--json` payload.
pub const SCHEMA_VERSION: u32 = 1;

/// Exit code for validation errors.
pub const EXIT_VALIDATION_ERROR: i32 = 2;

/// Exit code for internal errors.
pub const EXIT_INTERNAL_ERROR: i32 = 1;

/// Print a pretty JSON document to stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).into_diagnostic()?;
    println!("{json}");
    Ok(())
}

/// Report a failure and exit.
///
/// JSON mode writes `{"ok": false, "error": {...}}` to stdout; otherwise the
/// message goes to stderr.
pub fn fail(code: &str, message: &str, validation: bool, json: bool) -> ! {
    if json {
        let error_json = serde_json::json!({
            "ok": false,
            "schema_version": SCHEMA_VERSION,
            "error": {
                "code": code,
                "message": message
            }
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&error_json).unwrap_or_default()
        );
    } else {
        eprintln!("error: {message}");
    }

    std::process::exit(if validation {
        EXIT_VALIDATION_ERROR
    } else {
        EXIT_INTERNAL_ERROR
    });
}
