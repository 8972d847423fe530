use std::path::PathBuf;

use clap::Parser;

pub const DEFAULT_SOURCE_FILE: &str = "DSN_Complex_List.xlsx";
pub const DEFAULT_DETAIL_FILE: &str = "DSN_Complex_Details.xlsx";

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Fuzzy-match source addresses against a detail spreadsheet and merge the two",
    long_about = None,
    after_help = "Set RUST_LOG=debug (or trace) to see every comparison."
)]
pub struct Cli {
    /// Source Excel file
    #[arg(short = 's', long = "source_file", default_value = DEFAULT_SOURCE_FILE)]
    pub source_file: PathBuf,
    /// Excel file with additional details needed in the source data
    #[arg(short = 'd', long = "detail_file", default_value = DEFAULT_DETAIL_FILE)]
    pub detail_file: PathBuf,
}
