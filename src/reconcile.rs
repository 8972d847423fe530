//! End-to-end reconciliation: load both spreadsheets, resolve every source
//! address against the detail addresses, left-join on the result and write
//! the combined outputs.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{Level, debug, info, log_enabled};

use crate::{
    data::Cell,
    export::{self, OUTPUT_STEM, OutputPaths},
    loader,
    merge::{self, JoinOutput, JoinSpec},
    resolver::{LogObserver, NO_MATCH, ReferenceSet, Resolver, ResolverOptions},
    table::Table,
};

pub const ADDRESS_COLUMN: &str = "Address";
pub const DERIVED_COLUMN: &str = "Full_Address";

const KEY_COLUMNS: &[&str] = &["Complex Name", DERIVED_COLUMN, "URL"];

#[derive(Debug, Clone)]
pub struct ReconcileConfig {
    pub source_file: PathBuf,
    pub detail_file: PathBuf,
    pub output_dir: PathBuf,
    pub output_stem: String,
    pub resolver: ResolverOptions,
}

impl ReconcileConfig {
    pub fn new(source_file: PathBuf, detail_file: PathBuf, output_dir: PathBuf) -> Self {
        Self {
            source_file,
            detail_file,
            output_dir,
            output_stem: OUTPUT_STEM.to_string(),
            resolver: ResolverOptions::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReconcileSummary {
    pub source_rows: usize,
    pub resolved_rows: usize,
    pub joined_rows: usize,
    pub outputs: OutputPaths,
}

pub fn execute(config: &ReconcileConfig) -> Result<ReconcileSummary> {
    let mut source = load_input(&config.source_file)?;
    let detail = load_input(&config.detail_file)?;
    info!(
        "Loaded {} source row(s) from {:?} and {} detail row(s) from {:?}",
        source.row_count(),
        config.source_file,
        detail.row_count(),
        config.detail_file
    );
    log_table(&format!("Source table from {:?}", config.source_file), &source, &[]);
    log_table(&format!("Detail table from {:?}", config.detail_file), &detail, &[]);

    let derived = derive_matches(&source, &detail, config.resolver)?;
    let resolved_rows = derived
        .iter()
        .filter(|cell| cell.as_text() != NO_MATCH)
        .count();
    source
        .push_column(DERIVED_COLUMN, derived)
        .context("Adding derived address column")?;
    info!(
        "Resolved {} of {} source address(es); {} without a match",
        resolved_rows,
        source.row_count(),
        source.row_count() - resolved_rows
    );

    let spec = JoinSpec::new(DERIVED_COLUMN, ADDRESS_COLUMN).never_match(&[NO_MATCH]);
    let JoinOutput {
        table: merged,
        matched_rows,
    } = merge::left_join(&source, &detail, &spec)?;
    log_table("Merged table", &merged, &[]);
    log_table("Merged table key columns", &merged, KEY_COLUMNS);

    let outputs = OutputPaths::new(&config.output_dir, &config.output_stem);
    export::write_outputs(&merged, &outputs)?;
    info!(
        "Wrote {} merged row(s) to {:?} and {:?}",
        merged.row_count(),
        outputs.xlsx,
        outputs.json
    );

    Ok(ReconcileSummary {
        source_rows: source.row_count(),
        resolved_rows,
        joined_rows: matched_rows,
        outputs,
    })
}

/// Loads an input workbook and checks it has an address column. Load
/// failures keep their [`loader::LoadError`] type so the caller can abort
/// with the file name.
fn load_input(path: &Path) -> Result<Table> {
    let table = loader::load_table(path)?;
    table
        .require_column(ADDRESS_COLUMN)
        .with_context(|| format!("Validating columns of {path:?}"))?;
    Ok(table)
}

/// Resolves every source address against the detail addresses, returning
/// one cell per source row holding the match or the no-match sentinel.
pub fn derive_matches(
    source: &Table,
    detail: &Table,
    options: ResolverOptions,
) -> Result<Vec<Cell>> {
    let references = ReferenceSet::from_cells(
        detail
            .column(ADDRESS_COLUMN)
            .context("Reading detail addresses")?,
    );
    debug!("Reference set holds {} address(es)", references.len());
    let resolver = Resolver::new(&references, options);
    let mut observer = LogObserver;
    let cells = source
        .column(ADDRESS_COLUMN)
        .context("Reading source addresses")?
        .map(|cell| {
            let outcome = resolver.resolve_with(&cell.as_text(), &mut observer);
            Cell::String(outcome.into_value())
        })
        .collect();
    Ok(cells)
}

fn log_table(title: &str, table: &Table, columns: &[&str]) {
    if log_enabled!(Level::Debug) {
        debug!("{title}\n{}", table.render(columns));
    }
}
