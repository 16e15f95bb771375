//! `nodefn plan` command implementation.
//!
//! Plans every function in the project manifest (or the requested ids)
//! using the dry-run fingerprint bundler.

use super::output::{fail, print_json, SCHEMA_VERSION};
use miette::Result;
use nodefn_core::manifest::load_manifest;
use nodefn_core::{FingerprintBundler, FunctionBuilder, FunctionPlan};
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info, info_span};

/// Stable error codes owned by this command.
pub mod codes {
    pub const FUNCTION_UNKNOWN: &str = "FUNCTION_UNKNOWN";
}

#[derive(Debug, Serialize)]
struct PlanOutput<'a> {
    ok: bool,
    schema_version: u32,
    manifest: String,
    functions: &'a [FunctionPlan],
}

pub fn run(cwd: &Path, ids: &[String], manifest: Option<&Path>, json: bool) -> Result<()> {
    let loaded = match load_manifest(cwd, manifest) {
        Ok(loaded) => loaded,
        Err(e) => fail(e.code(), &e.to_string(), e.is_validation(), json),
    };
    debug!(manifest = %loaded.path.display(), "manifest loaded");

    if let Some(unknown) = ids
        .iter()
        .find(|id| !loaded.manifest.functions.contains_key(id.as_str()))
    {
        fail(
            codes::FUNCTION_UNKNOWN,
            &format!(
                "function {unknown:?} is not defined in {}",
                loaded.path.display()
            ),
            true,
            json,
        );
    }

    let caller_file = loaded.caller_file();
    let bundler = FingerprintBundler;
    let builder = FunctionBuilder::new(&caller_file, loaded.dir(), &bundler);

    let mut plans = Vec::new();
    for (id, props) in &loaded.manifest.functions {
        if !ids.is_empty() && !ids.contains(id) {
            continue;
        }

        let span = info_span!("plan", id = %id);
        let _guard = span.enter();

        match builder.build(id, props) {
            Ok(plan) => {
                info!(entry = %plan.entry.path.display(), hash = %plan.code.asset_hash, "planned");
                plans.push(plan);
            }
            Err(e) => fail(
                e.code(),
                &format!("{id}: {e}"),
                e.is_validation(),
                json,
            ),
        }
    }

    if json {
        print_json(&PlanOutput {
            ok: true,
            schema_version: SCHEMA_VERSION,
            manifest: loaded.path.to_string_lossy().into_owned(),
            functions: &plans,
        })
    } else {
        print_human(&plans);
        Ok(())
    }
}

fn print_human(plans: &[FunctionPlan]) {
    if plans.is_empty() {
        println!("No functions defined.");
        return;
    }

    for plan in plans {
        println!("\x1b[1m{}\x1b[0m", plan.id);
        println!("  Entry:        {}", plan.entry.path.display());
        println!("  Handler:      {}", plan.handler);
        println!("  Runtime:      {}", plan.runtime);
        println!(
            "  Lock file:    {} ({})",
            plan.lock_file.path.display(),
            plan.lock_file.package_manager.as_str()
        );
        println!("  Project root: {}", plan.project_root.display());
        println!(
            "  Memory:       {} MB, timeout {} s",
            plan.memory_size, plan.timeout_seconds
        );
        for (key, value) in &plan.environment {
            println!("  Env:          {key}={value}");
        }
        if let Some(vpc) = &plan.vpc {
            println!("  VPC:          {} ({})", vpc.vpc_id, vpc.subnet_ids.join(", "));
        }
        println!("  Asset hash:   {}", plan.code.asset_hash);
        println!();
    }
}
