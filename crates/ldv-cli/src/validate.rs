//! # Validate Subcommand
//!
//! Validates every payload of every input file with one shared
//! [`SchemaStore`], so a schema referenced from many payloads is fetched
//! once per invocation.
//!
//! A file is either a single JSON payload or a Postman collection, whose
//! raw request bodies are validated one by one. Files that cannot be read
//! or parsed are reported and counted as operational errors; the remaining
//! files are still processed.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use serde::Serialize;
use serde_json::Value;

use ldv_client::{HttpConfig, HttpLoader};
use ldv_core::{SchemaLoader, ValidationError, ValidatorConfig};
use ldv_schema::{JsonSchemaChecker, RunOptions, SchemaStore, TermExpander, Validator};

use crate::collection::{is_collection, request_bodies};

/// Arguments for the `ldv validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// JSON payloads or Postman collections.
    #[arg(value_name = "FILE", required = true)]
    pub files: Vec<PathBuf>,

    /// Only validate core objects; skip domain-attribute objects.
    #[arg(long)]
    pub core_only: bool,

    /// Expand payloads against their composed context before validating.
    #[arg(long)]
    pub jsonld: bool,

    /// Alternate branch to try when a schema is missing on the declared one.
    /// Repeatable; tried in the order given, after configured fallbacks.
    #[arg(long = "fallback-branch", value_name = "BRANCH")]
    pub fallback_branches: Vec<String>,

    /// Report format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Execute the validate subcommand.
///
/// Returns exit code: 0 when every payload is valid, 1 on validation
/// errors, 2 when any input could not be processed.
pub fn run_validate(args: &ValidateArgs, config_path: Option<&Path>) -> Result<u8> {
    let mut config = crate::load_config(config_path)?;
    config.push_fallbacks(args.fallback_branches.iter().cloned());
    config.validate().context("invalid --fallback-branch")?;

    let loader = HttpLoader::new(&HttpConfig::from_env()).context("failed to create HTTP client")?;

    let stdout = std::io::stdout();
    let summary = validate_files(args, &config, &loader, &mut stdout.lock())?;
    tracing::info!(
        payloads = summary.payloads,
        invalid = summary.invalid,
        unreadable = summary.unreadable,
        "validation finished"
    );
    Ok(summary.exit_code())
}

/// Totals of one invocation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub payloads: usize,
    pub invalid: usize,
    /// Files that could not be read or parsed.
    pub unreadable: usize,
}

impl Summary {
    pub fn exit_code(&self) -> u8 {
        if self.unreadable > 0 {
            2
        } else if self.invalid > 0 {
            1
        } else {
            0
        }
    }
}

#[derive(Serialize)]
struct PayloadReport<'a> {
    source: &'a str,
    valid: bool,
    errors: &'a [ValidationError],
}

/// Validate every payload of `args.files`, writing the report to `out`.
pub fn validate_files(
    args: &ValidateArgs,
    config: &ValidatorConfig,
    loader: &dyn SchemaLoader,
    out: &mut dyn Write,
) -> Result<Summary> {
    let checker = JsonSchemaChecker::default();
    let expander = TermExpander::new(loader, &config.annotation_property, &config.type_property);
    let validator = Validator::new(config, loader, &checker)
        .with_options(RunOptions {
            core_only: args.core_only,
            jsonld: args.jsonld,
        })
        .with_expander(&expander);

    let mut store = SchemaStore::new();
    let mut summary = Summary::default();
    let mut json_reports = Vec::new();

    for path in &args.files {
        let payloads = match read_payloads(path) {
            Ok(payloads) => payloads,
            Err(e) => {
                summary.unreadable += 1;
                writeln!(out, "ERROR: {e:#}")?;
                continue;
            }
        };

        for (source, payload) in payloads {
            tracing::info!(%source, "validating payload");
            let errors = validator.validate(&payload, &mut store);
            summary.payloads += 1;
            if !errors.is_empty() {
                summary.invalid += 1;
            }
            match args.format {
                OutputFormat::Text => write_text(out, &source, &errors)?,
                OutputFormat::Json => json_reports.push((source, errors)),
            }
        }
    }

    match args.format {
        OutputFormat::Text => {
            writeln!(
                out,
                "\nPayloads: {}/{} valid",
                summary.payloads - summary.invalid,
                summary.payloads
            )?;
            if summary.unreadable > 0 {
                writeln!(out, "{} file(s) could not be processed.", summary.unreadable)?;
            }
        }
        OutputFormat::Json => {
            let reports: Vec<PayloadReport<'_>> = json_reports
                .iter()
                .map(|(source, errors)| PayloadReport {
                    source,
                    valid: errors.is_empty(),
                    errors,
                })
                .collect();
            serde_json::to_writer_pretty(&mut *out, &reports)?;
            writeln!(out)?;
        }
    }

    tracing::debug!(
        documents = store.cache().len(),
        attribute_packages = store.attributes().len(),
        "schema store at end of run"
    );
    Ok(summary)
}

fn write_text(out: &mut dyn Write, source: &str, errors: &[ValidationError]) -> std::io::Result<()> {
    if errors.is_empty() {
        return writeln!(out, "PASS: {source}");
    }
    writeln!(out, "FAIL: {source} ({} error(s))", errors.len())?;
    for error in errors {
        writeln!(out, "  {error}")?;
    }
    Ok(())
}

/// The payloads of one file, each labelled with its source.
fn read_payloads(path: &Path) -> Result<Vec<(String, Value)>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let document: Value = serde_json::from_str(&content)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;

    let label = path.display().to_string();
    if is_collection(&document) {
        let bodies = request_bodies(&document);
        tracing::info!(file = %label, requests = bodies.len(), "identified Postman collection");
        Ok(bodies
            .into_iter()
            .map(|body| (format!("{label}#{}", body.name), body.payload))
            .collect())
    } else {
        Ok(vec![(label, document)])
    }
}
