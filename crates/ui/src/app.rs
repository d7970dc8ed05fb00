use std::sync::{Arc, Mutex};

use eframe::egui;
use factbook_core::catalog::SectionSpec;
use factbook_core::config::FactbookConfig;
use factbook_core::export::ExportFormat;
use factbook_core::i18n::text;
use factbook_core::layout::{AlignmentTrigger, AnchorGeometry, LayoutPadding};
use factbook_core::loaders::{LoadError, dataset_for_prefix, load_store};
use factbook_core::model::VectorStore;
use factbook_core::page::PageModel;
use factbook_core::scroll::ScrollAction;
use factbook_core::site::Site;
use factbook_core::views::AccessibleTable;
use factbook_core::{Language, TotalPolicy};
use factbook_protocol::{Rect as ChartRect, ThemeToken, Viewport};

use crate::renderer;
use crate::theme::{self, ThemeMode};

const CHART_HEIGHT: f32 = 360.0;

/// `data.csv` and `metadata.csv` bytes handed over from an async fetch.
type PendingData = Arc<Mutex<Option<Result<(Vec<u8>, Option<Vec<u8>>), String>>>>;

/// Where a scroll request should land on the next frame.
#[derive(Debug, Clone, PartialEq)]
enum ScrollRequest {
    Top,
    Anchor(String),
}

/// Main application state.
pub struct FactbookApp {
    site: Site,
    policy: TotalPolicy,
    store: Option<VectorStore>,
    /// One model per page of the active section.
    pages: Vec<PageModel>,
    theme_mode: ThemeMode,
    /// Localized alert from a failed export.
    alert: Option<String>,
    /// Data file problem shown in the status bar.
    error: Option<String>,
    pending_data: PendingData,
    scroll_request: Option<ScrollRequest>,
    /// Last measured anchors; re-measured when the window is resized.
    geometry: AnchorGeometry,
    mounted: bool,
    last_size: egui::Vec2,
}

fn to_chart_rect(r: egui::Rect) -> ChartRect {
    ChartRect::new(
        f64::from(r.left()),
        f64::from(r.top()),
        f64::from(r.width()),
        f64::from(r.height()),
    )
}

impl FactbookApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let theme_mode = ThemeMode::Light;
        cc.egui_ctx.set_visuals(theme_mode.visuals());

        let pending_data: PendingData = Arc::new(Mutex::new(None));
        let (language, policy, route) = Self::startup(&pending_data, &cc.egui_ctx);

        let mut app = Self {
            site: Site::new(language),
            policy,
            store: None,
            pages: Vec::new(),
            theme_mode,
            alert: None,
            error: None,
            pending_data,
            scroll_request: None,
            geometry: AnchorGeometry::default(),
            mounted: false,
            last_size: egui::Vec2::ZERO,
        };
        app.navigate(&route, 0);
        app
    }

    /// Read the config and start reading the data files.
    #[cfg(not(target_arch = "wasm32"))]
    fn startup(pending: &PendingData, _ctx: &egui::Context) -> (Language, TotalPolicy, String) {
        let config = match FactbookConfig::load(None) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(error = %e, "configuration ignored");
                FactbookConfig::default()
            }
        };
        let data = std::fs::read(config.data_path())
            .map_err(|e| format!("{}: {e}", config.data_path().display()));
        let metadata = std::fs::read(config.metadata_path()).ok();
        if let Ok(mut slot) = pending.lock() {
            *slot = Some(data.map(|d| (d, metadata)));
        }
        let route = config
            .enabled_sections()
            .first()
            .map_or("/section-1", |s| s.route)
            .to_string();
        (config.default_language, config.total_policy, route)
    }

    #[cfg(target_arch = "wasm32")]
    fn startup(pending: &PendingData, ctx: &egui::Context) -> (Language, TotalPolicy, String) {
        let config = FactbookConfig::default();
        Self::register_export_font();
        let location = web_sys::window().map(|w| w.location());
        let route = location
            .as_ref()
            .map(|l| {
                let path = l.pathname().unwrap_or_default();
                let hash = l.hash().unwrap_or_default();
                format!("{path}{hash}")
            })
            .unwrap_or_default();
        let language = location
            .and_then(|l| l.search().ok())
            .and_then(|q| q.contains("lang=fr").then_some(Language::Fr))
            .unwrap_or(config.default_language);

        let pd = pending.clone();
        let ctx = ctx.clone();
        let data_url = format!("{}/{}", config.data_dir.display(), config.data_file);
        let meta_url = format!("{}/{}", config.data_dir.display(), config.metadata_file);
        web_sys::console::log_1(&format!("factbook: fetching {data_url}").into());
        wasm_bindgen_futures::spawn_local(async move {
            let data = Self::fetch_bytes(&data_url).await;
            let metadata = Self::fetch_bytes(&meta_url).await.ok();
            if let Err(e) = &data {
                web_sys::console::error_1(&format!("factbook: fetch error: {e}").into());
            }
            if let Ok(mut slot) = pd.lock() {
                *slot = Some(data.map(|d| (d, metadata)));
            }
            ctx.request_repaint();
        });
        (language, config.total_policy, route)
    }

    fn now_ms(ctx: &egui::Context) -> u64 {
        (ctx.input(|i| i.time) * 1000.0) as u64
    }

    fn language(&self) -> Language {
        self.site.language()
    }

    fn take_pending_data(&mut self, now_ms: u64) {
        let pending = {
            let mut lock = self.pending_data.lock().unwrap_or_else(|e| e.into_inner());
            lock.take()
        };
        let Some(result) = pending else {
            return;
        };
        match result.and_then(|(data, meta)| {
            load_store(&data, meta.as_deref()).map_err(|e| e.to_string())
        }) {
            Ok((store, report)) => {
                tracing::info!(
                    rows = report.rows_read,
                    used = report.rows_used,
                    issues = report.issues.len(),
                    "data loaded"
                );
                self.store = Some(store);
                self.error = None;
            }
            Err(e) => {
                self.error = Some(e);
                self.store = None;
            }
        }
        self.load_pages(now_ms);
    }

    /// Replace the page models with the ones for `section`.
    fn open_section(&mut self, section: &'static SectionSpec) {
        for page in &mut self.pages {
            page.unmount();
        }
        self.pages = section
            .pages
            .iter()
            .map(|spec| PageModel::new(spec, self.policy))
            .collect();
    }

    fn load_pages(&mut self, now_ms: u64) {
        let Some(store) = &self.store else {
            let message = self.error.clone();
            for page in &mut self.pages {
                let ticket = page.begin_load();
                // Still loading unless the data files failed.
                if let Some(message) = &message {
                    page.finish_load(ticket, Err(LoadError::Fetch(message.clone())));
                }
            }
            return;
        };
        for page in &mut self.pages {
            let ticket = page.begin_load();
            let result = dataset_for_prefix(store, page.spec().vector_prefix);
            let ok = result.is_ok();
            if page.finish_load(ticket, result) && ok {
                self.site.page_ready(page.spec().anchor, now_ms);
            }
        }
    }

    fn navigate(&mut self, location: &str, now_ms: u64) {
        let previous = self.site.active_section().id;
        let action = self.site.navigate(location, &self.geometry, now_ms);
        if previous != self.site.active_section().id || self.pages.is_empty() {
            self.open_section(self.site.active_section());
            self.load_pages(now_ms);
        }
        self.request_scroll(action);
    }

    fn request_scroll(&mut self, action: ScrollAction) {
        self.scroll_request = Some(match action {
            ScrollAction::Top => ScrollRequest::Top,
            ScrollAction::Anchor(id) => ScrollRequest::Anchor(id),
        });
    }

    fn export(&mut self, idx: usize, format: ExportFormat, size: egui::Vec2) {
        let lang = self.language();
        let Some(page) = self.pages.get(idx) else {
            return;
        };
        let viewport = Viewport::new(f64::from(size.x), f64::from(size.y));
        let result = match format {
            ExportFormat::Image => page.export_image(&viewport, lang, self.theme_mode.is_dark()),
            _ => page.export(format, &viewport, lang),
        };
        match result {
            Ok(content) => {
                let name = page.file_name(lang, format);
                if let Err(e) = save_file(&name, format.mime_type(), &content) {
                    self.alert = Some(e);
                }
            }
            Err(e) => {
                tracing::warn!(page = page.spec().number, error = %e, "export failed");
                self.alert = Some(e.alert(lang).to_string());
            }
        }
    }

    fn sidebar_ui(&mut self, ui: &mut egui::Ui, now_ms: u64) {
        let lang = self.language();
        let mut go_to: Option<String> = None;
        let mut toggle: Option<&'static str> = None;
        ui.heading(text("common.menu", lang));
        ui.separator();
        for node in self.site.sidebar() {
            ui.horizontal(|ui| {
                let arrow = if node.expanded { "▾" } else { "▸" };
                if ui.small_button(arrow).clicked() {
                    toggle = Some(node.id);
                }
                if ui.selectable_label(node.active, &node.label).clicked() {
                    go_to = Some(node.href.to_string());
                }
            });
            if node.expanded {
                ui.indent(node.id, |ui| {
                    for link in &node.children {
                        if ui.link(&link.label).clicked() {
                            go_to = Some(link.href.clone());
                        }
                    }
                });
            }
        }
        if let Some(id) = toggle {
            self.site.toggle_sidebar(id);
        }
        if let Some(href) = go_to {
            self.navigate(&href, now_ms);
        }
    }

    fn page_ui(&mut self, ui: &mut egui::Ui, idx: usize, now_ms: u64) {
        let lang = self.language();
        let mode = self.theme_mode;
        let Some(page) = self.pages.get_mut(idx) else {
            return;
        };
        let spec = page.spec();

        let title = ui.heading(egui::RichText::new(spec.title(lang)).size(theme::FONT_TITLE));
        if self.scroll_request == Some(ScrollRequest::Anchor(spec.anchor.to_string())) {
            ui.scroll_to_rect(title.rect, Some(egui::Align::TOP));
            self.scroll_request = None;
        }
        ui.label(egui::RichText::new(text("common.chart_hint", lang)).size(theme::FONT_CAPTION));

        let width = ui.available_width();
        let (rect, response) = ui.allocate_exact_size(
            egui::vec2(width, CHART_HEIGHT),
            egui::Sense::click(),
        );
        let viewport = Viewport::new(f64::from(rect.width()), f64::from(rect.height()));
        let cmds = page.chart(&viewport, lang);
        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, egui::CornerRadius::ZERO, theme::resolve(ThemeToken::Background, mode));
        renderer::render_commands(&painter, &cmds, rect.min, mode);

        let hovered = response
            .hover_pos()
            .and_then(|pos| renderer::item_at(&cmds, rect.min, pos));
        let pointer = response.interact_pointer_pos();
        let clicked = pointer.and_then(|pos| renderer::item_at(&cmds, rect.min, pos));
        let touch = ui.input(|i| i.any_touches());
        if let Some(item) = clicked {
            if response.double_clicked() {
                if touch { page.double_tap(item) } else { page.double_click(item) }
            } else if response.clicked() {
                if touch {
                    page.tap(item, now_ms, f64::from(ui.ctx().screen_rect().width()));
                } else {
                    page.click(item);
                }
            }
        }
        if let Some(item) = hovered
            && let Some(tip) = page.tooltip(item, lang)
        {
            response.on_hover_text_at_pointer(tip);
        }

        for bullet in page.bullets(lang) {
            ui.label(format!("• {bullet}"));
        }

        let disclosure = page.table_disclosure();
        if ui.button(disclosure.button_label(lang)).clicked() {
            page.toggle_table();
        }
        if page.table_disclosure().is_open()
            && let Some(table) = page.table(lang)
        {
            table_ui(ui, &table, spec.anchor);
        }

        let mut export: Option<ExportFormat> = None;
        ui.horizontal_wrapped(|ui| {
            for format in [ExportFormat::Csv, ExportFormat::Document, ExportFormat::Image] {
                if ui.button(text(format.label_key(), lang)).clicked() {
                    export = Some(format);
                }
            }
        });
        if let Some(format) = export {
            self.export(idx, format, rect.size());
        }
        ui.add_space(24.0);
    }

    /// Measure the header anchors against the content area.
    fn remeasure(&mut self, trigger: AlignmentTrigger, now_ms: u64) {
        if self.mounted {
            self.site.measure(trigger, &self.geometry, now_ms);
        } else {
            self.site.mount(&self.geometry, now_ms);
            self.mounted = true;
        }
    }
}

/// `content` with the measured padding taken off both sides. The width
/// never goes negative.
fn padded(content: egui::Rect, padding: LayoutPadding) -> egui::Rect {
    let left = (content.left() + padding.left as f32).min(content.right());
    let right = (content.right() - padding.right as f32).max(left);
    egui::Rect::from_x_y_ranges(left..=right, content.y_range())
}

fn table_ui(ui: &mut egui::Ui, table: &AccessibleTable, id: &str) {
    ui.label(egui::RichText::new(&table.caption).strong());
    ui.label(egui::RichText::new(&table.unit_label).size(theme::FONT_CAPTION));
    egui::Grid::new(("table", id)).striped(true).show(ui, |ui| {
        for header in &table.headers {
            ui.label(egui::RichText::new(header).strong());
        }
        ui.end_row();
        for row in &table.rows {
            ui.label(row.year.to_string());
            for cell in &row.cells {
                ui.label(&cell.text).on_hover_text(&cell.aria_label);
            }
            ui.end_row();
        }
    });
}

#[cfg(not(target_arch = "wasm32"))]
fn save_file(file_name: &str, _mime: &str, content: &[u8]) -> Result<(), String> {
    let Some(path) = rfd::FileDialog::new().set_file_name(file_name).save_file() else {
        return Ok(());
    };
    std::fs::write(&path, content).map_err(|e| format!("{}: {e}", path.display()))?;
    tracing::info!(path = %path.display(), "exported");
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn save_file(file_name: &str, mime: &str, content: &[u8]) -> Result<(), String> {
    use wasm_bindgen::JsCast;

    let parts = js_sys::Array::of1(&js_sys::Uint8Array::from(content));
    let options = web_sys::BlobPropertyBag::new();
    options.set_type(mime);
    let blob = web_sys::Blob::new_with_u8_array_sequence_and_options(&parts, &options)
        .map_err(|e| format!("{e:?}"))?;
    let url = web_sys::Url::create_object_url_with_blob(&blob).map_err(|e| format!("{e:?}"))?;
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or("no document")?;
    let anchor: web_sys::HtmlAnchorElement = document
        .create_element("a")
        .map_err(|e| format!("{e:?}"))?
        .dyn_into()
        .map_err(|_| "not an anchor element")?;
    anchor.set_href(&url);
    anchor.set_download(file_name);
    anchor.click();
    web_sys::Url::revoke_object_url(&url).map_err(|e| format!("{e:?}"))
}

#[cfg(target_arch = "wasm32")]
impl FactbookApp {
    /// The rasterizer sees no system fonts in the browser; lend it egui's
    /// bundled proportional face.
    fn register_export_font() {
        let fonts = egui::FontDefinitions::default();
        let face = fonts
            .families
            .get(&egui::FontFamily::Proportional)
            .and_then(|names| names.first())
            .and_then(|name| fonts.font_data.get(name));
        let Some(face) = face else {
            web_sys::console::warn_1(&"factbook: no bundled font for image exports".into());
            return;
        };
        if let Err(e) = factbook_core::export::register_font(face.font.to_vec()) {
            web_sys::console::warn_1(&format!("factbook: export font rejected: {e}").into());
        }
    }

    async fn fetch_bytes(url: &str) -> Result<Vec<u8>, String> {
        use wasm_bindgen::JsCast;
        use wasm_bindgen_futures::JsFuture;

        let window = web_sys::window().ok_or("no window")?;
        let resp_value = JsFuture::from(window.fetch_with_str(url))
            .await
            .map_err(|e| format!("{e:?}"))?;
        let resp: web_sys::Response = resp_value.dyn_into().map_err(|_| "not a Response")?;
        if !resp.ok() {
            return Err(format!("HTTP {}", resp.status()));
        }
        let buf = JsFuture::from(resp.array_buffer().map_err(|e| format!("{e:?}"))?)
            .await
            .map_err(|e| format!("{e:?}"))?;
        Ok(js_sys::Uint8Array::new(&buf).to_vec())
    }
}

impl eframe::App for FactbookApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now_ms = Self::now_ms(ctx);
        self.take_pending_data(now_ms);

        let lang = self.language();
        let mut header_left = None;
        let mut header_right = None;

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let title = ui.heading(text("app.title", lang));
                header_left = Some(title.rect);
                ui.label(egui::RichText::new(text("app.subtitle", lang)).size(theme::FONT_BODY));

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let toggle = ui.button(text("common.language_toggle", lang));
                    header_right = Some(toggle.rect);
                    if toggle.clicked() {
                        self.site.toggle_language();
                    }
                    let theme_label = match self.theme_mode {
                        ThemeMode::Dark => "☀",
                        ThemeMode::Light => "🌙",
                    };
                    if ui.button(theme_label).clicked() {
                        self.theme_mode = self.theme_mode.toggled();
                        ctx.set_visuals(self.theme_mode.visuals());
                    }

                    #[cfg(not(target_arch = "wasm32"))]
                    {
                        if ui.button("📂").clicked()
                            && let Some(path) = rfd::FileDialog::new().add_filter("CSV", &["csv"]).pick_file()
                        {
                            let data = std::fs::read(&path).map_err(|e| format!("{}: {e}", path.display()));
                            let metadata = std::fs::read(path.with_file_name("metadata.csv")).ok();
                            if let Ok(mut slot) = self.pending_data.lock() {
                                *slot = Some(data.map(|d| (d, metadata)));
                            }
                        }
                    }
                });
            });
        });

        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            if let Some(err) = &self.error {
                ui.colored_label(ui.visuals().error_fg_color, err);
            } else {
                ui.label(text("export.source", lang));
            }
        });

        egui::SidePanel::left("sidebar")
            .resizable(true)
            .default_width(240.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| self.sidebar_ui(ui, now_ms));
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            let content = ui.available_rect_before_wrap();
            self.geometry = AnchorGeometry {
                left_anchor: header_left.map(to_chart_rect),
                right_anchor: header_right.map(to_chart_rect),
                container: Some(to_chart_rect(content)),
            };
            let size = ctx.screen_rect().size();
            if !self.mounted {
                self.remeasure(AlignmentTrigger::Mount, now_ms);
                self.last_size = size;
            } else if size != self.last_size {
                self.remeasure(AlignmentTrigger::Resize, now_ms);
                self.last_size = size;
            }

            let padding = self.site.context().padding;
            let mut area = egui::ScrollArea::vertical().auto_shrink([false, false]);
            if self.scroll_request == Some(ScrollRequest::Top) {
                area = area.vertical_scroll_offset(0.0);
                self.scroll_request = None;
            }
            area.show(ui, |ui| {
                let inner = padded(ui.available_rect_before_wrap(), padding);
                ui.scope_builder(egui::UiBuilder::new().max_rect(inner), |ui| {
                    ui.set_width(inner.width());
                    ui.heading(self.site.active_section().title(lang));
                    ui.add_space(12.0);
                    for idx in 0..self.pages.len() {
                        self.page_ui(ui, idx, now_ms);
                    }
                });
            });
        });

        if let Some(message) = self.alert.clone() {
            egui::Window::new("⚠")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
                .show(ctx, |ui| {
                    ui.label(message);
                    if ui.button("OK").clicked() {
                        self.alert = None;
                    }
                });
        }

        let tick = self.site.poll(now_ms);
        if tick.remeasure {
            self.remeasure(AlignmentTrigger::Recheck, now_ms);
        }
        if let Some(action) = tick.scrolls.into_iter().last() {
            self.request_scroll(action);
        }
        ctx.request_repaint_after(std::time::Duration::from_millis(50));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wide_padding_is_kept_exactly() {
        let content = egui::Rect::from_min_size(egui::pos2(0.0, 40.0), egui::vec2(1600.0, 900.0));
        let inner = padded(content, LayoutPadding::new(312.0, 200.5));
        assert_eq!(inner.left(), 312.0);
        assert_eq!(inner.right(), 1399.5);
        assert_eq!(inner.y_range(), content.y_range());
    }

    #[test]
    fn padding_wider_than_content_leaves_no_width() {
        let content = egui::Rect::from_min_size(egui::pos2(0.0, 0.0), egui::vec2(300.0, 100.0));
        let inner = padded(content, LayoutPadding::new(250.0, 250.0));
        assert_eq!(inner.width(), 0.0);
        assert_eq!(inner.left(), 250.0);
    }
}
