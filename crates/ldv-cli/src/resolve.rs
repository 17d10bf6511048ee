//! # Resolve Subcommand
//!
//! Prints the routing of one pointer without fetching anything: its kind,
//! branch, schema location, package and version, constraints location and
//! the core package it maps to.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::Result;
use clap::Args;

use ldv_core::{PointerConventions, PointerKind};

/// Arguments for the `ldv resolve` subcommand.
#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// The `@context` pointer to inspect.
    #[arg(value_name = "POINTER")]
    pub pointer: String,
}

/// Execute the resolve subcommand. Exit code 1 when the pointer has no branch.
pub fn run_resolve(args: &ResolveArgs, config_path: Option<&Path>) -> Result<u8> {
    let config = crate::load_config(config_path)?;
    print!("{}", describe(&config.conventions, &args.pointer));
    let routable = config.conventions.branch_of(&args.pointer).is_some();
    Ok(if routable { 0 } else { 1 })
}

/// Human-readable routing of `raw`.
pub fn describe(conventions: &PointerConventions, raw: &str) -> String {
    let pointer = conventions.pointer(raw);
    let location = conventions.schema_location(raw);
    let none = || "-".to_string();

    let kind = match pointer.kind() {
        PointerKind::Core => "core",
        PointerKind::Composed => "composed",
        PointerKind::Attribute => "attribute",
    };
    let branch = conventions
        .branch_of(raw)
        .map_or_else(|| "- (unroutable)".to_string(), str::to_string);
    let package = conventions
        .package_name_and_version(location.as_str())
        .map_or_else(none, |(name, version)| format!("{name} {version}"));
    let constraints = conventions
        .constraints_location(raw)
        .map_or_else(none, |l| l.to_string());
    let core = if pointer.is_composed() {
        conventions.core_counterpart(&pointer).to_string()
    } else {
        none()
    };

    let mut out = String::new();
    for (label, value) in [
        ("kind", kind.to_string()),
        ("branch", branch),
        ("schema", location.to_string()),
        ("package", package),
        ("constraints", constraints),
        ("core", core),
    ] {
        // Writing to a String cannot fail.
        let _ = writeln!(out, "{label:<12} {value}");
    }
    out
}
