//! One chart page: its data load, selection, table disclosure and exports.

use factbook_protocol::{RenderCommand, Viewport};

use crate::analysis::{Summary, summarize};
use crate::catalog::PageSpec;
use crate::export::{self, ExportError, ExportFormat, ImageExport};
use crate::i18n::{self, Language};
use crate::load::{LoadState, LoadTicket, PageLoader};
use crate::model::{Dataset, TotalPolicy};
use crate::selection::{Selection, SelectionController, TapOutcome};
use crate::views::{self, AccessibleTable, ChartData, Disclosure, narrative};

#[derive(Debug)]
pub struct PageModel {
    spec: &'static PageSpec,
    policy: TotalPolicy,
    loader: PageLoader<Dataset>,
    selection: SelectionController,
    table: Disclosure,
}

impl PageModel {
    pub fn new(spec: &'static PageSpec, policy: TotalPolicy) -> Self {
        Self {
            spec,
            policy,
            loader: PageLoader::new(),
            selection: SelectionController::new(spec.categories.len()),
            table: Disclosure::default(),
        }
    }

    pub fn spec(&self) -> &'static PageSpec {
        self.spec
    }

    pub fn state(&self) -> &LoadState<Dataset> {
        self.loader.state()
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        self.loader.state().ready()
    }

    pub fn begin_load(&mut self) -> LoadTicket {
        self.loader.begin()
    }

    /// Apply a finished load. Selection starts over on new data.
    pub fn finish_load<E: std::fmt::Display>(&mut self, ticket: LoadTicket, result: Result<Dataset, E>) -> bool {
        let applied = self.loader.complete(ticket, result);
        if applied && self.dataset().is_some() {
            self.selection.reset(self.spec.categories.len());
        }
        applied
    }

    pub fn unmount(&mut self) {
        self.loader.unmount();
    }

    /// Show the page again after [`Self::unmount`]; call
    /// [`Self::begin_load`] next.
    pub fn mount(&mut self) {
        self.loader.mount();
    }

    pub fn summary(&self) -> Option<Summary> {
        summarize(self.spec, self.dataset()?, self.policy)
    }

    pub fn chart_data(&self, lang: Language) -> Option<ChartData> {
        self.dataset()
            .map(|ds| ChartData::from_dataset(self.spec, ds, lang, self.policy))
    }

    /// Chart commands, or a loading/error message in the chart's place.
    pub fn chart(&self, viewport: &Viewport, lang: Language) -> Vec<RenderCommand> {
        match self.loader.state() {
            LoadState::Loading => views::render_message(viewport, i18n::text("common.loading", lang)),
            LoadState::Failed(message) => views::render_message(viewport, &self.error_text(message, lang)),
            LoadState::Ready(ds) => {
                let data = ChartData::from_dataset(self.spec, ds, lang, self.policy);
                views::render_chart(self.spec.chart, &data, self.selection.selection(), viewport, lang)
            }
        }
    }

    /// `The data could not be loaded: HTTP 404`
    pub fn error_text(&self, message: &str, lang: Language) -> String {
        format!("{}: {message}", i18n::text("common.error", lang))
    }

    pub fn table(&self, lang: Language) -> Option<AccessibleTable> {
        self.dataset()
            .map(|ds| AccessibleTable::build(self.spec, ds, lang, self.policy))
    }

    pub fn bullets(&self, lang: Language) -> Vec<String> {
        self.summary()
            .map(|s| narrative::bullets(self.spec, &s, lang))
            .unwrap_or_default()
    }

    pub fn selection(&self) -> &Selection {
        self.selection.selection()
    }

    pub fn click(&mut self, item_id: u64) {
        self.selection.click(views::decode_item(item_id).0);
    }

    pub fn double_click(&mut self, item_id: u64) {
        self.selection.double_click(views::decode_item(item_id).0);
    }

    pub fn tap(&mut self, item_id: u64, now_ms: u64, viewport_width: f64) -> TapOutcome {
        self.selection.tap(views::decode_item(item_id).0, now_ms, viewport_width)
    }

    pub fn double_tap(&mut self, item_id: u64) {
        self.selection.double_tap(views::decode_item(item_id).0);
    }

    /// Tooltip for a chart item. Legend swatches name the series only.
    pub fn tooltip(&self, item_id: u64, lang: Language) -> Option<String> {
        let data = self.chart_data(lang)?;
        let (series, point) = views::decode_item(item_id);
        if point == views::WHOLE_SERIES {
            return data.series.get(series).map(|s| s.label.clone());
        }
        data.tooltip(series, point)
    }

    pub fn table_disclosure(&self) -> Disclosure {
        self.table
    }

    pub fn toggle_table(&mut self) -> bool {
        self.table.toggle()
    }

    pub fn file_name(&self, lang: Language, format: ExportFormat) -> String {
        export::file_name(self.spec, lang, format)
    }

    fn ready_table(&self, lang: Language) -> Result<AccessibleTable, ExportError> {
        self.table(lang).ok_or(ExportError::NotReady)
    }

    pub fn export_csv(&self, lang: Language) -> Result<String, ExportError> {
        export::table_to_csv(&self.ready_table(lang)?)
    }

    pub fn export_document(&self, lang: Language) -> Result<Vec<u8>, ExportError> {
        export::table_to_document(&self.ready_table(lang)?, lang)
    }

    fn image(&self, viewport: &Viewport, lang: Language, dark: bool) -> Result<ImageExport<'static>, ExportError> {
        if self.dataset().is_none() {
            return Err(ExportError::NotReady);
        }
        Ok(ImageExport {
            title: self.spec.title(lang),
            width: viewport.width,
            height: viewport.height,
            dark,
        })
    }

    /// The titled chart as SVG markup, the source of [`Self::export_image`].
    pub fn image_svg(&self, viewport: &Viewport, lang: Language, dark: bool) -> Result<String, ExportError> {
        self.image(viewport, lang, dark)?.to_svg(&self.chart(viewport, lang))
    }

    /// The chart as currently drawn, selection included, with the title
    /// above, as PNG bytes.
    pub fn export_image(&self, viewport: &Viewport, lang: Language, dark: bool) -> Result<Vec<u8>, ExportError> {
        self.image(viewport, lang, dark)?.to_png(&self.chart(viewport, lang))
    }

    pub fn export(&self, format: ExportFormat, viewport: &Viewport, lang: Language) -> Result<Vec<u8>, ExportError> {
        match format {
            ExportFormat::Csv => self.export_csv(lang).map(String::into_bytes),
            ExportFormat::Document => self.export_document(lang),
            ExportFormat::Image => self.export_image(viewport, lang, false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::PAGE_24;
    use crate::model::YearRecord;
    use crate::views::{WHOLE_SERIES, encode_item};

    fn dataset() -> Dataset {
        Dataset::from_records(vec![
            YearRecord::new(2021).with("oil_gas", 10.0).with("electricity", 5.0).with("other", 5.0),
            YearRecord::new(2022).with("oil_gas", 12.0).with("electricity", 6.0).with("other", 2.0),
        ])
    }

    fn ready() -> PageModel {
        let mut page = PageModel::new(&PAGE_24, TotalPolicy::default());
        let t = page.begin_load();
        assert!(page.finish_load(t, Ok::<_, String>(dataset())));
        page
    }

    #[test]
    fn loading_page_shows_message_and_refuses_exports() {
        let page = PageModel::new(&PAGE_24, TotalPolicy::default());
        let cmds = page.chart(&Viewport::new(400.0, 300.0), Language::En);
        assert!(matches!(&cmds[..], [RenderCommand::DrawText { text, .. }] if text == "Loading data…"));
        assert!(matches!(page.export_csv(Language::En), Err(ExportError::NotReady)));
        assert!(matches!(
            page.export_image(&Viewport::new(400.0, 300.0), Language::En, false),
            Err(ExportError::NotReady)
        ));
        assert!(page.bullets(Language::En).is_empty());
    }

    #[test]
    fn failed_load_shows_message_verbatim() {
        let mut page = PageModel::new(&PAGE_24, TotalPolicy::default());
        let t = page.begin_load();
        page.finish_load(t, Err::<Dataset, _>("network unreachable"));
        let cmds = page.chart(&Viewport::new(400.0, 300.0), Language::En);
        assert!(matches!(
            &cmds[..],
            [RenderCommand::DrawText { text, .. }] if text == "The data could not be loaded: network unreachable"
        ));
    }

    #[test]
    fn selection_follows_clicks_and_resets_on_reload() {
        let mut page = ready();
        page.click(encode_item(1, 0));
        assert!(page.selection().contains(1));
        page.double_click(encode_item(0, WHOLE_SERIES));
        assert_eq!(page.selection().items(), vec![0]);

        let t = page.begin_load();
        page.finish_load(t, Ok::<_, String>(dataset()));
        assert!(page.selection().is_none());
    }

    #[test]
    fn tooltips() {
        let page = ready();
        assert_eq!(page.tooltip(encode_item(0, WHOLE_SERIES), Language::En).as_deref(), Some("Oil and gas"));
        assert_eq!(
            page.tooltip(encode_item(0, 1), Language::En).as_deref(),
            Some("Oil and gas: $12 million (60.0%)")
        );
    }

    #[test]
    fn ready_page_exports() {
        let page = ready();
        let csv = page.export_csv(Language::En).unwrap();
        assert_eq!(csv.lines().count(), 3);
        assert!(page.export_document(Language::Fr).unwrap().starts_with(b"PK"));
        let viewport = Viewport::new(600.0, 400.0);
        let svg = page.image_svg(&viewport, Language::En, false).unwrap();
        assert!(svg.contains("Capital expenditures"));
        let png = page.export(ExportFormat::Image, &viewport, Language::En).unwrap();
        assert!(png.starts_with(b"\x89PNG\r\n\x1a\n"));
        assert_eq!(page.file_name(Language::Fr, ExportFormat::Csv), "depenses-immobilisations.csv");
    }

    #[test]
    fn unmounted_page_keeps_its_data() {
        let mut page = ready();
        page.unmount();
        let t = page.begin_load();
        assert!(!page.finish_load(t, Err::<Dataset, _>("HTTP 500")));
        assert!(page.dataset().is_some());

        page.mount();
        let t = page.begin_load();
        assert!(page.finish_load(t, Err::<Dataset, _>("HTTP 500")));
        assert_eq!(page.state().error(), Some("HTTP 500"));
    }

    #[test]
    fn table_starts_closed() {
        let mut page = ready();
        assert!(!page.table_disclosure().is_open());
        assert!(page.toggle_table());
        assert_eq!(page.table(Language::En).map(|t| t.rows.len()), Some(2));
    }
}
