//! Scroll-to-fragment for a section that stacks several pages.
//!
//! Entering a section jumps to the top at once, then after
//! [`SECTION_SETTLE_DELAY_MS`] scrolls to the fragment's page, or to the
//! section's first page. Pages may ask to focus themselves sooner
//! ([`PAGE_FOCUS_DELAY_MS`]); the section scroll lands last and wins.

use serde::Serialize;

use crate::catalog::SectionSpec;

/// Delay a page waits before focusing itself after its data arrives.
pub const PAGE_FOCUS_DELAY_MS: u64 = 100;

/// Delay before the section scrolls to its target anchor.
pub const SECTION_SETTLE_DELAY_MS: u64 = 500;

const _: () = assert!(SECTION_SETTLE_DELAY_MS > PAGE_FOCUS_DELAY_MS);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "anchor", rename_all = "snake_case")]
pub enum ScrollAction {
    /// Scroll the window to the top.
    Top,
    /// Scroll the element with this id into view.
    Anchor(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Pending {
    due_ms: u64,
    action: ScrollAction,
}

/// Pending delayed scrolls for the mounted section.
#[derive(Debug, Clone, Default)]
pub struct SectionScroller {
    section: Option<&'static str>,
    fragment: Option<String>,
    settle: Option<Pending>,
    page_focus: Option<Pending>,
}

/// `#page-25`, `page-25` and `` all map to the anchor name or `None`.
pub fn fragment_anchor(fragment: Option<&str>) -> Option<&str> {
    fragment
        .map(|f| f.trim_start_matches('#'))
        .filter(|f| !f.is_empty())
}

impl SectionScroller {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn section(&self) -> Option<&'static str> {
        self.section
    }

    /// The anchor the settle scroll will target, if one is pending.
    pub fn pending_target(&self) -> Option<&ScrollAction> {
        self.settle.as_ref().map(|p| &p.action)
    }

    /// Enter `section` with an optional URL fragment. Replaces any pending
    /// scroll. Returns the immediate action.
    pub fn enter(&mut self, section: &'static SectionSpec, fragment: Option<&str>, now_ms: u64) -> ScrollAction {
        self.cancel();
        let requested = fragment_anchor(fragment);
        let target = match requested {
            Some(anchor) if section.has_anchor(anchor) => Some(anchor),
            Some(anchor) => {
                tracing::debug!(section = section.id, anchor, "unknown fragment, using first page");
                section.first_anchor()
            }
            None => section.first_anchor(),
        };
        self.section = Some(section.id);
        self.fragment = requested.map(str::to_owned);
        self.settle = target.map(|anchor| Pending {
            due_ms: now_ms + SECTION_SETTLE_DELAY_MS,
            action: ScrollAction::Anchor(anchor.to_owned()),
        });
        ScrollAction::Top
    }

    /// A page finished loading. If the URL fragment names it, it focuses
    /// itself after [`PAGE_FOCUS_DELAY_MS`].
    pub fn page_ready(&mut self, anchor: &str, now_ms: u64) {
        if self.section.is_none() || self.fragment.as_deref() != Some(anchor) {
            return;
        }
        self.page_focus = Some(Pending {
            due_ms: now_ms + PAGE_FOCUS_DELAY_MS,
            action: ScrollAction::Anchor(anchor.to_owned()),
        });
    }

    /// Actions due at `now_ms`, earliest first. Each fires once.
    pub fn poll(&mut self, now_ms: u64) -> Vec<ScrollAction> {
        let mut due: Vec<Pending> = [&mut self.page_focus, &mut self.settle]
            .into_iter()
            .filter_map(|slot| slot.take_if(|p| now_ms >= p.due_ms))
            .collect();
        due.sort_by_key(|p| p.due_ms);
        due.into_iter().map(|p| p.action).collect()
    }

    /// Route left or component unmounted: nothing pending fires.
    pub fn cancel(&mut self) {
        if self.settle.is_some() || self.page_focus.is_some() {
            tracing::trace!(section = self.section, "pending scroll cancelled");
        }
        self.section = None;
        self.fragment = None;
        self.settle = None;
        self.page_focus = None;
    }
}
