//! Logging initialization for the CLI.
//!
//! Logging is owned by the CLI crate; the core and util crates only emit
//! events. All log output goes to stderr, so `--json` command output on
//! stdout stays a single document.
//!
//! With `--json`, every log record is one JSON object per line:
//!
//! ```text
//! {"timestamp":"2026-01-01T00:00:00.000000Z","level":"INFO",
//!  "fields":{"message":"entry resolved","id":"Fn","entry":"/app/lib/stack.Fn.ts"},
//!  "target":"nodefn_cli::commands::resolve",
//!  "span":{"cmd":"resolve","cwd":"/app","name":"resolve"}}
//! ```
//!
//! * `fields.message` is the event text (`entry resolved`, `lock file found`,
//!   `manifest loaded`, `planned`); the other `fields` keys are the event's
//!   structured values (`id`, `entry`, `lock_file`, `package_manager`,
//!   `manifest`, `hash`).
//! * `span` is the innermost span: the command span (`resolve`, `lockfile`,
//!   `plan`) carrying `cmd` and `cwd`, or the per-function `plan` span
//!   carrying `id`.
//!
//! `-v` raises nodefn's own level to DEBUG, `-vv` to TRACE. `RUST_LOG`
//! controls everything else (default `warn`).

use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber.
///
/// * `verbosity` - 0 = INFO, 1 = DEBUG, 2+ = TRACE
/// * `json` - If true, output JSON lines to stderr
///
/// Logs always go to stderr so stdout stays reserved for command output.
///
/// # Panics
/// Panics if the subscriber cannot be initialized (e.g., called twice).
pub fn init(verbosity: u8, json: bool) {
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    // RUST_LOG wins for other targets; -v always applies to nodefn itself
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"))
        .add_directive(format!("nodefn={level}").parse().unwrap());

    let subscriber = tracing_subscriber::registry().with(filter);

    if json {
        subscriber
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        subscriber
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
    }
}
