use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use factbook_core::Language;
use factbook_core::export::ExportFormat;

/// Energy factbook pages in the terminal, plus the data-file tooling.
#[derive(Debug, Parser)]
#[command(name = "factbook", version, about)]
pub struct Cli {
    /// JSON config file. Every field is optional.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding data.csv and metadata.csv (overrides the config).
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Display language: en or fr.
    #[arg(long, global = true, value_parser = parse_language)]
    pub lang: Option<Language>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sections, their pages and vector prefixes, and the enabled sources.
    List,
    /// Interactive chart, table and summary for one page.
    View {
        /// Page anchor (`page-24`), tooling name (`Page24`) or number.
        page: String,
    },
    /// Write a page's table or chart to a file.
    Export {
        page: String,
        /// csv, document (docx) or image (png).
        #[arg(long, short, default_value = "csv")]
        format: ExportFormat,
        /// Output file. Defaults to the localized file name in the output directory.
        #[arg(long, short)]
        out: Option<PathBuf>,
        /// Chart size for image exports, in pixels.
        #[arg(long, default_value_t = 800.0)]
        width: f64,
        #[arg(long, default_value_t = 480.0)]
        height: f64,
        /// Dark palette for image exports.
        #[arg(long)]
        dark: bool,
    },
    /// Merge a fresh export into the published data files.
    Merge(MergeArgs),
    /// Report total drift and missing years per page.
    Validate {
        /// Allowed difference between a provided total and the category sum.
        #[arg(long, default_value_t = 0.5)]
        tolerance: f64,
    },
}

#[derive(Debug, Args)]
pub struct MergeArgs {
    /// Freshly exported data.csv.
    pub fresh_data: PathBuf,
    /// Freshly exported metadata.csv.
    #[arg(long)]
    pub fresh_metadata: Option<PathBuf>,
    /// Only vectors of this data source.
    #[arg(long, conflicts_with = "page")]
    pub source: Option<String>,
    /// Only vectors behind this page (`Page24`, `page-24` or `24`).
    #[arg(long)]
    pub page: Option<String>,
    /// Only vectors matching this glob (`capex_*`).
    #[arg(long)]
    pub pattern: Option<String>,
    /// Report what would change without writing.
    #[arg(long)]
    pub dry_run: bool,
}

pub fn parse_language(s: &str) -> Result<Language, String> {
    Language::from_code(s).ok_or_else(|| format!("unknown language `{s}` (expected en or fr)"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_export() {
        let cli = Cli::try_parse_from(["factbook", "--lang", "fr", "export", "page-24", "-f", "png"]).unwrap();
        assert_eq!(cli.lang, Some(Language::Fr));
        match cli.command {
            Command::Export { page, format, .. } => {
                assert_eq!(page, "page-24");
                assert_eq!(format, ExportFormat::Image);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn merge_filters_conflict() {
        assert!(Cli::try_parse_from(["factbook", "merge", "new.csv", "--source", "x", "--page", "24"]).is_err());
        let cli = Cli::try_parse_from(["factbook", "merge", "new.csv", "--pattern", "capex_*", "--dry-run"]).unwrap();
        assert!(matches!(cli.command, Command::Merge(MergeArgs { dry_run: true, .. })));
    }
}
