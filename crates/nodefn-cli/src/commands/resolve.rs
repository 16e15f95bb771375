//! `nodefn resolve` command implementation.

use super::output::{fail, print_json, SCHEMA_VERSION};
use miette::Result;
use nodefn_core::entry::{resolve_entry, EntryError, ResolutionRequest, ResolvedEntry};
use nodefn_util::fs::absolutize;
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Serialize)]
struct ResolveOutput<'a> {
    ok: bool,
    schema_version: u32,
    id: &'a str,
    entry: String,
    extension: &'static str,
}

/// Resolve the handler entry for construct `id` defined in `caller`.
pub fn run(cwd: &Path, id: &str, caller: &Path, entry: Option<&Path>, json: bool) -> Result<()> {
    let caller_file = absolutize(cwd, caller);
    let request = ResolutionRequest::from_caller(&caller_file, id)
        .with_entry(entry.map(Path::to_path_buf));

    debug!(
        base_dir = %request.base_dir.display(),
        stem = %request.caller_stem,
        explicit = request.explicit_entry.is_some(),
        "resolving entry"
    );

    match resolve_entry(&request) {
        Ok(resolved) => {
            info!(id, entry = %resolved.path.display(), "entry resolved");
            output(id, &resolved, json)
        }
        Err(e) => {
            let validation = !matches!(e, EntryError::Io { .. });
            fail(e.code(), &e.to_string(), validation, json)
        }
    }
}

fn output(id: &str, resolved: &ResolvedEntry, json: bool) -> Result<()> {
    if json {
        print_json(&ResolveOutput {
            ok: true,
            schema_version: SCHEMA_VERSION,
            id,
            entry: resolved.path.to_string_lossy().into_owned(),
            extension: resolved.extension.as_str(),
        })
    } else {
        println!("{}", resolved.path.display());
        Ok(())
    }
}
