mod slots;

use std::sync::{Mutex, MutexGuard};

use factbook_core::catalog::find_page;
use factbook_core::export::{self, ExportError, ExportFormat};
use factbook_core::layout::{
    AlignmentTrigger, AnchorGeometry, CONTAINER_ID, LEFT_ANCHOR_ID, LayoutPadding, RIGHT_ANCHOR_ID,
};
use factbook_core::load::LoadTicket;
use factbook_core::loaders::{LoadError, dataset_for_prefix, load_store};
use factbook_core::model::{Dataset, VectorStore};
use factbook_core::page::PageModel;
use factbook_core::scroll::ScrollAction;
use factbook_core::site::Site;
use factbook_core::{Language, TotalPolicy};
use factbook_protocol::{Rect, Viewport};
use serde::Serialize;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, HtmlElement, ScrollBehavior, ScrollIntoViewOptions, console};

use crate::slots::PageSlots;

static STORE: Mutex<Option<VectorStore>> = Mutex::new(None);
static PAGES: Mutex<PageSlots> = Mutex::new(PageSlots::new());
static SITE: Mutex<Option<Site>> = Mutex::new(None);

fn lock<T>(m: &Mutex<T>) -> Result<MutexGuard<'_, T>, JsError> {
    m.lock().map_err(|_| JsError::new("state lock poisoned"))
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, JsError> {
    serde_json::to_string(value).map_err(|e| JsError::new(&e.to_string()))
}

fn language(code: &str) -> Result<Language, JsError> {
    Language::from_code(code).ok_or_else(|| JsError::new(&format!("unknown language: {code}")))
}

fn with_page<R>(handle: usize, f: impl FnOnce(&mut PageModel) -> Result<R, JsError>) -> Result<R, JsError> {
    let mut pages = lock(&PAGES)?;
    let page = pages
        .get_mut(handle)
        .ok_or_else(|| JsError::new("invalid page handle"))?;
    f(page)
}

fn with_site<R>(f: impl FnOnce(&mut Site) -> R) -> Result<R, JsError> {
    let mut site = lock(&SITE)?;
    let site = site
        .as_mut()
        .ok_or_else(|| JsError::new("site is not mounted"))?;
    Ok(f(site))
}

/// Load the published `data.csv` (and optionally `metadata.csv`).
/// Returns the load report as JSON.
#[wasm_bindgen]
pub fn load_data(data: &[u8], metadata: Option<Vec<u8>>) -> Result<String, JsError> {
    let (store, report) =
        load_store(data, metadata.as_deref()).map_err(|e| JsError::new(&e.to_string()))?;
    let issues: Vec<_> = report
        .issues
        .iter()
        .map(|i| serde_json::json!({ "line": i.line, "message": i.message }))
        .collect();
    let summary = serde_json::json!({
        "rows_read": report.rows_read,
        "rows_used": report.rows_used,
        "missing_values": report.missing_values,
        "issues": issues,
    });
    *lock(&STORE)? = Some(store);
    to_json(&summary)
}

/// Create a page by anchor (`page-24`), tooling name or number and start its
/// load. Returns `{ handle, ticket }` as JSON. With data already loaded the
/// page is settled at once; otherwise answer the ticket with
/// `complete_page` or `fail_page` once the host's fetch finishes.
#[wasm_bindgen]
pub fn open_page(name: &str) -> Result<String, JsError> {
    let spec = find_page(name).ok_or_else(|| JsError::new(&format!("unknown page: {name}")))?;
    let mut page = PageModel::new(spec, TotalPolicy::default());
    let ticket = page.begin_load();
    let handle = lock(&PAGES)?.insert(page);
    if lock(&STORE)?.is_some() {
        complete_page(handle, ticket.id())?;
    }
    to_json(&serde_json::json!({ "handle": handle, "ticket": ticket.id() }))
}

/// Start a new load of an open page. Earlier tickets become stale.
#[wasm_bindgen]
pub fn reload_page(handle: usize) -> Result<u64, JsError> {
    with_page(handle, |page| Ok(page.begin_load().id()))
}

/// Answer `ticket` by pivoting the page's dataset from the loaded store.
/// Returns whether the page changed; closed pages and stale tickets do not.
#[wasm_bindgen]
pub fn complete_page(handle: usize, ticket: u64) -> Result<bool, JsError> {
    let store = lock(&STORE)?;
    settle(handle, ticket, |page| match store.as_ref() {
        Some(store) => dataset_for_prefix(store, page.spec().vector_prefix),
        None => Err(LoadError::Fetch("data.csv has not been loaded".into())),
    })
}

/// The host's fetch for `ticket` failed. The page shows `message` in place
/// of the chart, unless it was closed or reloaded since.
#[wasm_bindgen]
pub fn fail_page(handle: usize, ticket: u64, message: &str) -> Result<bool, JsError> {
    console::error_1(&format!("factbook: page load failed: {message}").into());
    settle(handle, ticket, |_| Err(LoadError::Fetch(message.to_string())))
}

fn settle(
    handle: usize,
    ticket: u64,
    result: impl FnOnce(&PageModel) -> Result<Dataset, LoadError>,
) -> Result<bool, JsError> {
    let mut pages = lock(&PAGES)?;
    let Some(page) = pages.get_mut(handle) else {
        console::log_1(&format!("factbook: load for closed page {handle} dropped").into());
        return Ok(false);
    };
    let result = result(page);
    Ok(page.finish_load(LoadTicket::from_id(ticket), result))
}

/// Page left the DOM. Its handle is freed and late loads are dropped.
#[wasm_bindgen]
pub fn close_page(handle: usize) -> Result<(), JsError> {
    if !lock(&PAGES)?.close(handle) {
        console::log_1(&format!("factbook: page {handle} was already closed").into());
    }
    Ok(())
}

/// Render a page's chart, returning render commands as JSON.
#[wasm_bindgen]
pub fn render_page(handle: usize, width: f64, height: f64, dpr: f64, lang: &str) -> Result<String, JsError> {
    let lang = language(lang)?;
    let viewport = Viewport { width, height, dpr };
    with_page(handle, |page| to_json(&page.chart(&viewport, lang)))
}

#[wasm_bindgen]
pub fn page_table(handle: usize, lang: &str) -> Result<String, JsError> {
    let lang = language(lang)?;
    with_page(handle, |page| {
        let table = page.table(lang);
        to_json(&serde_json::json!({
            "open": page.table_disclosure().is_open(),
            "button": page.table_disclosure().button_label(lang),
            "table": table,
        }))
    })
}

/// Returns the new open state.
#[wasm_bindgen]
pub fn toggle_page_table(handle: usize) -> Result<bool, JsError> {
    with_page(handle, |page| Ok(page.toggle_table()))
}

#[wasm_bindgen]
pub fn page_bullets(handle: usize, lang: &str) -> Result<String, JsError> {
    let lang = language(lang)?;
    with_page(handle, |page| to_json(&page.bullets(lang)))
}

#[wasm_bindgen]
pub fn page_tooltip(handle: usize, item_id: u64, lang: &str) -> Result<Option<String>, JsError> {
    let lang = language(lang)?;
    with_page(handle, |page| Ok(page.tooltip(item_id, lang)))
}

/// Apply a pointer event to a chart item. `kind` is `click`,
/// `double_click`, `tap` or `double_tap`. Returns the selection as JSON.
#[wasm_bindgen]
pub fn page_select(handle: usize, kind: &str, item_id: u64, now_ms: f64, viewport_width: f64) -> Result<String, JsError> {
    with_page(handle, |page| {
        match kind {
            "click" => page.click(item_id),
            "double_click" => page.double_click(item_id),
            "tap" => {
                page.tap(item_id, now_ms as u64, viewport_width);
            }
            "double_tap" => page.double_tap(item_id),
            other => return Err(JsError::new(&format!("unknown selection event: {other}"))),
        }
        to_json(page.selection())
    })
}

fn export_with<T>(
    handle: usize,
    lang: &str,
    run: impl FnOnce(&PageModel, Language) -> Result<T, ExportError>,
) -> Result<T, JsError> {
    let lang = language(lang)?;
    with_page(handle, |page| {
        run(page, lang).map_err(|e| {
            console::warn_1(&format!("factbook: export failed: {e}").into());
            JsError::new(e.alert(lang))
        })
    })
}

/// The page's table as CSV. Errors carry the localized alert text.
#[wasm_bindgen]
pub fn export_page_csv(handle: usize, lang: &str) -> Result<String, JsError> {
    export_with(handle, lang, |page, lang| page.export_csv(lang))
}

/// The page's table as `.docx` bytes.
#[wasm_bindgen]
pub fn export_page_document(handle: usize, lang: &str) -> Result<Vec<u8>, JsError> {
    export_with(handle, lang, |page, lang| page.export_document(lang))
}

/// The chart as drawn at `width` x `height`, title included, as PNG bytes.
/// Call `register_font` first or the labels are missing.
#[wasm_bindgen]
pub fn export_page_image(handle: usize, width: f64, height: f64, lang: &str, dark: bool) -> Result<Vec<u8>, JsError> {
    let viewport = Viewport::new(width, height);
    export_with(handle, lang, |page, lang| page.export_image(&viewport, lang, dark))
}

/// Add a TrueType/OpenType font for chart images. The browser exposes no
/// system fonts to the rasterizer.
#[wasm_bindgen]
pub fn register_font(data: Vec<u8>) -> Result<(), JsError> {
    export::register_font(data).map_err(|e| JsError::new(&e.to_string()))
}

/// Localized download name and MIME type as JSON: `{ file_name, mime_type }`.
#[wasm_bindgen]
pub fn export_file_name(handle: usize, format: &str, lang: &str) -> Result<String, JsError> {
    let lang = language(lang)?;
    let format: ExportFormat = format.parse().map_err(|e: String| JsError::new(&e))?;
    with_page(handle, |page| {
        to_json(&serde_json::json!({
            "file_name": page.file_name(lang, format),
            "mime_type": format.mime_type(),
        }))
    })
}

fn document() -> Result<Document, JsError> {
    web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsError::new("no document"))
}

fn element_rect(document: &Document, id: &str) -> Option<Rect> {
    let r = document.get_element_by_id(id)?.get_bounding_client_rect();
    Some(Rect::new(r.x(), r.y(), r.width(), r.height()))
}

/// Read the header anchors and the content container from the DOM.
fn measure_dom(document: &Document) -> AnchorGeometry {
    AnchorGeometry {
        left_anchor: element_rect(document, LEFT_ANCHOR_ID),
        right_anchor: element_rect(document, RIGHT_ANCHOR_ID),
        container: element_rect(document, CONTAINER_ID),
    }
}

fn apply_padding(document: &Document, padding: LayoutPadding) -> Result<(), JsError> {
    let Some(container) = document
        .get_element_by_id(CONTAINER_ID)
        .and_then(|e| e.dyn_into::<HtmlElement>().ok())
    else {
        return Ok(());
    };
    let style = container.style();
    let set = |name: &str, px: f64| {
        style
            .set_property(name, &format!("{px}px"))
            .map_err(|_| JsError::new("could not set container padding"))
    };
    set("padding-left", padding.left)?;
    set("padding-right", padding.right)
}

fn scroll(action: &ScrollAction) {
    let Some(window) = web_sys::window() else {
        return;
    };
    match action {
        ScrollAction::Top => window.scroll_to_with_x_and_y(0.0, 0.0),
        ScrollAction::Anchor(id) => {
            let target = window.document().and_then(|d| d.get_element_by_id(id));
            match target {
                Some(el) => {
                    let options = ScrollIntoViewOptions::new();
                    options.set_behavior(ScrollBehavior::Smooth);
                    el.scroll_into_view_with_scroll_into_view_options(&options);
                }
                None => console::log_1(&format!("factbook: no element #{id} to scroll to").into()),
            }
        }
    }
}

/// Create the site shell and take the first measurement. Returns the
/// padding as a CSS declaration.
#[wasm_bindgen]
pub fn mount_site(lang: &str, now_ms: f64) -> Result<String, JsError> {
    let document = document()?;
    let mut site = Site::new(language(lang)?);
    let padding = site.mount(&measure_dom(&document), now_ms as u64);
    apply_padding(&document, padding)?;
    *lock(&SITE)? = Some(site);
    Ok(padding.to_css())
}

/// Re-measure the anchors and pad the container. `trigger` is `mount`,
/// `resize`, `route_change` or `recheck`.
#[wasm_bindgen]
pub fn measure_alignment(trigger: &str, now_ms: f64) -> Result<String, JsError> {
    let trigger: AlignmentTrigger = serde_json::from_value(serde_json::Value::String(trigger.to_string()))
        .map_err(|e| JsError::new(&e.to_string()))?;
    let document = document()?;
    let geometry = measure_dom(&document);
    let padding = with_site(|site| site.measure(trigger, &geometry, now_ms as u64))?;
    apply_padding(&document, padding)?;
    Ok(padding.to_css())
}

/// Stop tracking the anchors. The container keeps its padding.
#[wasm_bindgen]
pub fn detach_alignment() -> Result<(), JsError> {
    with_site(Site::detach_alignment)
}

/// Enter the section at `location` (`/section-3#page-25`): scroll to the top
/// now and schedule the anchor scroll.
#[wasm_bindgen]
pub fn enter_section(location: &str, now_ms: f64) -> Result<(), JsError> {
    let geometry = measure_dom(&document()?);
    let action = with_site(|site| site.navigate(location, &geometry, now_ms as u64))?;
    scroll(&action);
    Ok(())
}

#[wasm_bindgen]
pub fn page_ready(anchor: &str, now_ms: f64) -> Result<(), JsError> {
    with_site(|site| site.page_ready(anchor, now_ms as u64))
}

/// Run whatever came due at `now_ms`: the alignment recheck and any
/// pending scrolls. Returns the number of scrolls performed.
#[wasm_bindgen]
pub fn poll_section_scroll(now_ms: f64) -> Result<usize, JsError> {
    let tick = with_site(|site| site.poll(now_ms as u64))?;
    if tick.remeasure {
        measure_alignment("recheck", now_ms)?;
    }
    tick.scrolls.iter().for_each(scroll);
    Ok(tick.scrolls.len())
}

/// The section view went away. Its pending scroll is dropped.
#[wasm_bindgen]
pub fn leave_section() -> Result<(), JsError> {
    with_site(Site::leave_section)
}

#[wasm_bindgen]
pub fn sidebar_tree() -> Result<String, JsError> {
    with_site(|site| to_json(&site.sidebar()))?
}

#[wasm_bindgen]
pub fn toggle_sidebar(section: &str) -> Result<(), JsError> {
    with_site(|site| site.toggle_sidebar(section))
}

/// Returns the new language code.
#[wasm_bindgen]
pub fn toggle_language() -> Result<String, JsError> {
    with_site(|site| site.toggle_language().code().to_string())
}

#[wasm_bindgen]
pub fn unmount_site() -> Result<(), JsError> {
    if let Some(site) = lock(&SITE)?.as_mut() {
        site.unmount();
    }
    Ok(())
}
