//! Non-interactive subcommands. Output goes to the given writer so tests can
//! capture it.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use factbook_core::catalog::{self, PageSpec, VectorFilter};
use factbook_core::config::FactbookConfig;
use factbook_core::export::ExportFormat;
use factbook_core::loaders::{self, LoadReport};
use factbook_core::merge;
use factbook_core::model::VectorStore;
use factbook_core::page::PageModel;
use factbook_core::{Language, TotalPolicy};
use factbook_protocol::Viewport;

use crate::cli::MergeArgs;

/// Read the configured data files. Metadata is optional.
pub fn load_store(config: &FactbookConfig) -> Result<VectorStore> {
    let data_path = config.data_path();
    let data = std::fs::read(&data_path).with_context(|| format!("reading {}", data_path.display()))?;
    let metadata_path = config.metadata_path();
    let metadata = match std::fs::read(&metadata_path) {
        Ok(bytes) => Some(bytes),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!(path = %metadata_path.display(), "no metadata file; units fall back to the catalog");
            None
        }
        Err(e) => return Err(e).with_context(|| format!("reading {}", metadata_path.display())),
    };
    let (store, report) = store_from_bytes(&data, metadata.as_deref())?;
    tracing::info!(
        rows = report.rows_read,
        used = report.rows_used,
        missing = report.missing_values,
        vectors = store.vectors().count(),
        "data loaded"
    );
    Ok(store)
}

pub fn store_from_bytes(data: &[u8], metadata: Option<&[u8]>) -> Result<(VectorStore, LoadReport)> {
    let (store, report) = loaders::load_store(data, metadata)?;
    for issue in &report.issues {
        tracing::warn!(line = issue.line, "{}", issue.message);
    }
    Ok((store, report))
}

pub fn resolve_page(name: &str) -> Result<&'static PageSpec> {
    catalog::find_page(name).ok_or_else(|| {
        let known: Vec<String> = catalog::PAGES.iter().map(|p| p.anchor.to_string()).collect();
        anyhow!("unknown page `{name}`; available: {}", known.join(", "))
    })
}

/// A page model with its load already settled against `store`.
pub fn open_page(store: &VectorStore, spec: &'static PageSpec, policy: TotalPolicy) -> PageModel {
    let mut page = PageModel::new(spec, policy);
    let ticket = page.begin_load();
    page.finish_load(ticket, loaders::dataset_for_prefix(store, spec.vector_prefix));
    page
}

pub fn list(config: &FactbookConfig, lang: Language, out: &mut impl Write) -> Result<()> {
    for section in config.enabled_sections() {
        writeln!(out, "{}  {}", section.route, section.title(lang))?;
        for page in section.pages {
            writeln!(
                out,
                "  {:<8} {:<7} {:<12} {}",
                page.anchor,
                page.tooling_name(),
                page.vector_prefix,
                page.title(lang)
            )?;
        }
    }
    writeln!(out, "sources: {}", config.enabled_sources().join(", "))?;
    Ok(())
}

pub struct ExportRequest {
    pub format: ExportFormat,
    pub out: Option<PathBuf>,
    pub width: f64,
    pub height: f64,
    pub dark: bool,
}

/// Render `page` in `format`. Returns the localized file name and contents.
pub fn render_export(page: &PageModel, request: &ExportRequest, lang: Language) -> Result<(String, Vec<u8>)> {
    let viewport = Viewport::new(request.width, request.height);
    let body = match request.format {
        ExportFormat::Image => page.export_image(&viewport, lang, request.dark),
        format => page.export(format, &viewport, lang),
    }
    .map_err(|e| anyhow!("{}: {e}", e.alert(lang)))?;
    Ok((page.file_name(lang, request.format), body))
}

pub fn export(
    config: &FactbookConfig,
    store: &VectorStore,
    page: &str,
    request: &ExportRequest,
    lang: Language,
    out: &mut impl Write,
) -> Result<PathBuf> {
    let spec = resolve_page(page)?;
    let model = open_page(store, spec, config.total_policy);
    let (file_name, body) = render_export(&model, request, lang)?;
    let path = request
        .out
        .clone()
        .unwrap_or_else(|| config.output_dir.join(file_name));
    std::fs::write(&path, body).with_context(|| format!("writing {}", path.display()))?;
    tracing::info!(page = spec.anchor, format = ?request.format, path = %path.display(), "exported");
    writeln!(out, "{}", path.display())?;
    Ok(path)
}

/// The filter for a merge, restricted to the sources the config enables.
pub fn merge_filter(config: &FactbookConfig, args: &MergeArgs) -> Result<VectorFilter> {
    let mut filter = VectorFilter::all();
    if let Some(source) = &args.source {
        if !config.enabled_sources().contains(&source.as_str()) {
            bail!("source `{source}` is disabled by the configuration");
        }
        filter = filter.source(source)?;
    }
    if let Some(page) = &args.page {
        filter = filter.page(page)?;
    }
    if let Some(pattern) = &args.pattern {
        filter = filter.pattern(pattern);
    }
    Ok(filter)
}

fn read_or_empty(path: &Path) -> Result<Vec<u8>> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(bytes),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(e).with_context(|| format!("reading {}", path.display())),
    }
}

pub fn merge(config: &FactbookConfig, args: &MergeArgs, out: &mut impl Write) -> Result<()> {
    let filter = merge_filter(config, args)?;
    let fresh = std::fs::read(&args.fresh_data).with_context(|| format!("reading {}", args.fresh_data.display()))?;

    let data_path = config.data_path();
    let existing = merge::read_data_rows(&read_or_empty(&data_path)?)?;
    let (rows, summary) = merge::merge_data(existing, merge::read_data_rows(&fresh)?, &filter);
    writeln!(out, "{}: {} updated, {} total", data_path.display(), summary.updated, summary.total)?;
    if summary.updated == 0 {
        tracing::warn!("no fresh rows matched the filter");
    }
    if !args.dry_run {
        std::fs::write(&data_path, merge::write_data_rows(&rows)?)
            .with_context(|| format!("writing {}", data_path.display()))?;
    }

    if let Some(fresh_meta) = &args.fresh_metadata {
        let fresh = std::fs::read(fresh_meta).with_context(|| format!("reading {}", fresh_meta.display()))?;
        let meta_path = config.metadata_path();
        let existing = merge::read_metadata_rows(&read_or_empty(&meta_path)?)?;
        let (rows, summary) = merge::merge_metadata(existing, merge::read_metadata_rows(&fresh)?, &filter);
        writeln!(out, "{}: {} updated, {} total", meta_path.display(), summary.updated, summary.total)?;
        if !args.dry_run {
            std::fs::write(&meta_path, merge::write_metadata_rows(&rows)?)
                .with_context(|| format!("writing {}", meta_path.display()))?;
        }
    }
    if args.dry_run {
        writeln!(out, "dry run: nothing written")?;
    }
    Ok(())
}

/// Check every enabled page. Returns the number of problems found.
pub fn validate(config: &FactbookConfig, store: &VectorStore, tolerance: f64, out: &mut impl Write) -> Result<usize> {
    let mut problems = 0;
    for section in config.enabled_sections() {
        for spec in section.pages {
            let dataset = match loaders::dataset_for_prefix(store, spec.vector_prefix) {
                Ok(dataset) => dataset,
                Err(e) => {
                    writeln!(out, "{}: {e}", spec.anchor)?;
                    problems += 1;
                    continue;
                }
            };
            if let Some(total_field) = spec.total_field {
                for drift in dataset.total_drift(&spec.category_fields(), total_field, tolerance) {
                    writeln!(
                        out,
                        "{}: {} total {} differs from category sum {} by {:.1}",
                        spec.anchor,
                        drift.year,
                        drift.provided,
                        drift.computed,
                        drift.difference()
                    )?;
                    problems += 1;
                }
            }
            let missing = dataset.missing_years();
            if !missing.is_empty() {
                let years: Vec<String> = missing.iter().map(i32::to_string).collect();
                writeln!(out, "{}: no data for {}", spec.anchor, years.join(", "))?;
                problems += 1;
            }
        }
    }
    writeln!(out, "{problems} problem(s)")?;
    Ok(problems)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DATA: &[u8] = include_bytes!("../../core/tests/fixtures/data.csv");
    const METADATA: &[u8] = include_bytes!("../../core/tests/fixtures/metadata.csv");

    fn store() -> VectorStore {
        store_from_bytes(DATA, Some(METADATA)).unwrap().0
    }

    fn merge_args(source: Option<&str>) -> MergeArgs {
        MergeArgs {
            fresh_data: PathBuf::from("fresh.csv"),
            fresh_metadata: None,
            source: source.map(str::to_string),
            page: None,
            pattern: None,
            dry_run: true,
        }
    }

    #[test]
    fn list_names_every_page() {
        let mut out = Vec::new();
        list(&FactbookConfig::default(), Language::En, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        for page in catalog::PAGES {
            assert!(text.contains(page.anchor), "{} missing", page.anchor);
        }
        assert!(text.contains("/section-3"));
        assert!(text.contains("capex_"));
    }

    #[test]
    fn unknown_page_lists_alternatives() {
        let err = resolve_page("page-99").unwrap_err().to_string();
        assert!(err.contains("page-24"), "{err}");
        assert_eq!(resolve_page("Page24").unwrap().anchor, "page-24");
    }

    #[test]
    fn csv_export_uses_localized_name() {
        let page = open_page(&store(), resolve_page("24").unwrap(), TotalPolicy::PreferProvided);
        let request = ExportRequest {
            format: ExportFormat::Csv,
            out: None,
            width: 800.0,
            height: 480.0,
            dark: false,
        };
        let (name, body) = render_export(&page, &request, Language::Fr).unwrap();
        assert!(name.ends_with(".csv"));
        assert!(body.starts_with("Année,".as_bytes()));
    }

    #[test]
    fn binary_exports_carry_their_signatures() {
        let page = open_page(&store(), resolve_page("24").unwrap(), TotalPolicy::PreferProvided);
        let mut request = ExportRequest {
            format: ExportFormat::Document,
            out: None,
            width: 320.0,
            height: 200.0,
            dark: false,
        };
        let (name, docx) = render_export(&page, &request, Language::En).unwrap();
        assert_eq!(name, "capital-expenditures.docx");
        assert!(docx.starts_with(b"PK"));

        request.format = ExportFormat::Image;
        let (name, png) = render_export(&page, &request, Language::En).unwrap();
        assert_eq!(name, "capital-expenditures.png");
        assert!(png.starts_with(b"\x89PNG\r\n\x1a\n"));
    }

    #[test]
    fn export_of_unloaded_page_fails() {
        let (store, _) = store_from_bytes(b"vector,ref_date,value\ncapex_total,2021,1\n", None).unwrap();
        let page = open_page(&store, resolve_page("page-8").unwrap(), TotalPolicy::PreferProvided);
        let request = ExportRequest {
            format: ExportFormat::Document,
            out: None,
            width: 800.0,
            height: 480.0,
            dark: false,
        };
        assert!(render_export(&page, &request, Language::En).is_err());
    }

    #[test]
    fn validate_reports_drift() {
        let config = FactbookConfig {
            sections: vec!["section-3".into()],
            ..FactbookConfig::default()
        };
        let mut out = Vec::new();
        let problems = validate(&config, &store(), 0.5, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(problems >= 1);
        assert!(text.contains("page-24: 2022 total"), "{text}");
    }

    #[test]
    fn merge_filter_respects_enabled_sources() {
        let name = catalog::sources::source_names().next().unwrap();
        let open = FactbookConfig::default();
        assert!(merge_filter(&open, &merge_args(Some(name))).unwrap().is_filtered());
        assert!(!merge_filter(&open, &merge_args(None)).unwrap().is_filtered());

        let other = catalog::sources::source_names().nth(1).unwrap();
        let restricted = FactbookConfig {
            sources: vec![other.to_string()],
            ..FactbookConfig::default()
        };
        assert!(merge_filter(&restricted, &merge_args(Some(name))).is_err());
        assert!(merge_filter(&open, &merge_args(Some("nope"))).is_err());
    }
}
