use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, info_span};

use ehi_codegen::write_module;
use ehi_hydrate::{hydrate_subject, subject_document};
use ehi_manifest::{build_coverage, enforce, validate_all};
use ehi_model::HydrationConfig;
use ehi_store::{SchemaCatalog, TableStore};

use crate::cli::{CodegenArgs, CoverageArgs, HydrateArgs, TablesArgs, ValidateArgs};
use crate::summary::{print_coverage, print_hydration_report, print_validations};

fn load_config(path: &Path) -> Result<HydrationConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("read config: {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parse config: {}", path.display()))
}

fn load_store(dir: &Path) -> Result<TableStore> {
    TableStore::load_dir(dir).with_context(|| format!("load export: {}", dir.display()))
}

pub fn run_hydrate(args: &HydrateArgs) -> Result<()> {
    let span = info_span!("hydrate", subject = args.subject.as_str());
    let _guard = span.enter();

    let config = load_config(&args.config)?;
    let store = load_store(&args.export_dir)?;
    let catalog = args
        .schema
        .as_deref()
        .map(|path| {
            SchemaCatalog::from_path(path)
                .with_context(|| format!("load schema catalog: {}", path.display()))
        })
        .transpose()?;

    let hydration = hydrate_subject(&store, &config, &args.subject)
        .with_context(|| format!("hydrate subject {}", args.subject))?;
    let document = subject_document(&store, &config, catalog.as_ref(), &hydration)
        .context("project subject document")?;

    let rendered = if args.pretty {
        serde_json::to_string_pretty(&document)?
    } else {
        serde_json::to_string(&document)?
    };
    match args.out.as_deref() {
        Some(path) => {
            std::fs::write(path, rendered)
                .with_context(|| format!("write document: {}", path.display()))?;
            info!(path = %path.display(), "document written");
        }
        None => println!("{rendered}"),
    }

    print_hydration_report(
        &args.subject,
        hydration.graph.entity_count(),
        &hydration.report,
    );
    Ok(())
}

pub fn run_coverage(args: &CoverageArgs) -> Result<()> {
    let config = load_config(&args.config)?;
    let store = load_store(&args.export_dir)?;
    let report = build_coverage(&store, &config);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_coverage(&report);
    }
    Ok(())
}

/// The onboarding gate: exit nonzero when any data-bearing column is
/// classified nowhere.
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    let config = load_config(&args.config)?;
    let store = load_store(&args.export_dir)?;
    let validations = validate_all(&store, &config).context("validate manifests")?;
    if validations.is_empty() {
        info!("no manifests configured; nothing to validate");
        return Ok(());
    }
    print_validations(&validations);
    let validations = enforce(validations).context("manifest drift")?;
    info!(manifests = validations.len(), "manifests clean");
    Ok(())
}

pub fn run_codegen(args: &CodegenArgs) -> Result<()> {
    let catalog = SchemaCatalog::from_path(&args.schema)
        .with_context(|| format!("load schema catalog: {}", args.schema.display()))?;
    write_module(&catalog, &args.out)
        .with_context(|| format!("write generated module: {}", args.out.display()))?;
    info!(
        tables = catalog.tables().count(),
        out = %args.out.display(),
        "generated row types"
    );
    Ok(())
}

pub fn run_tables(args: &TablesArgs) -> Result<()> {
    let store = load_store(&args.export_dir)?;
    for name in store.names() {
        let table = store.table(name).expect("listed table");
        println!(
            "{name}\t{} columns\t{} rows",
            table.columns().len(),
            table.row_count()
        );
    }
    Ok(())
}
