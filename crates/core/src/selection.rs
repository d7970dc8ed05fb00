//! Chart highlight state.
//!
//! A page's selection is either empty (everything shown normally) or a set of
//! highlighted series/slice indices. A selection that would contain every
//! item collapses back to empty, so "all selected" is never a distinct state.

use std::collections::BTreeSet;

use serde::Serialize;

/// Viewports narrower than this use tap-to-preview, tap-again-to-select.
pub const SMALL_VIEWPORT_MAX_WIDTH: f64 = 768.0;

/// Window in which a second tap on the same item counts as a select.
pub const DOUBLE_TAP_WINDOW_MS: u64 = 300;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub enum Selection {
    #[default]
    None,
    Some(BTreeSet<usize>),
}

impl Selection {
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    pub fn contains(&self, item: usize) -> bool {
        match self {
            Self::None => false,
            Self::Some(set) => set.contains(&item),
        }
    }

    /// Whether `item` is drawn at full strength. With no selection, all are.
    pub fn is_emphasized(&self, item: usize) -> bool {
        match self {
            Self::None => true,
            Self::Some(set) => set.contains(&item),
        }
    }

    pub fn items(&self) -> Vec<usize> {
        match self {
            Self::None => Vec::new(),
            Self::Some(set) => set.iter().copied().collect(),
        }
    }

    /// Add or remove `item`. Out-of-range items are ignored.
    pub fn toggle(&mut self, item: usize, item_count: usize) {
        if item >= item_count {
            return;
        }
        let mut set = match std::mem::take(self) {
            Self::None => BTreeSet::new(),
            Self::Some(set) => set,
        };
        if !set.remove(&item) {
            set.insert(item);
        }
        *self = Self::normalized(set, item_count);
    }

    /// Select only `item`, or clear if it is already the sole selection.
    pub fn isolate(&mut self, item: usize, item_count: usize) {
        if item >= item_count {
            return;
        }
        let already_isolated = matches!(self, Self::Some(set) if set.len() == 1 && set.contains(&item));
        *self = if already_isolated {
            Self::None
        } else {
            Self::normalized(BTreeSet::from([item]), item_count)
        };
    }

    pub fn clear(&mut self) {
        *self = Self::None;
    }

    fn normalized(set: BTreeSet<usize>, item_count: usize) -> Self {
        if set.is_empty() || set.len() >= item_count {
            Self::None
        } else {
            Self::Some(set)
        }
    }
}

/// What a tap did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapOutcome {
    /// First tap on a small screen: show the item's tooltip only.
    ShowTooltip(usize),
    /// The selection changed.
    Toggled(usize),
}

/// Per-page selection plus the touch state needed to tell preview taps
/// from select taps.
#[derive(Debug, Clone, Default)]
pub struct SelectionController {
    selection: Selection,
    item_count: usize,
    last_tap: Option<(usize, u64)>,
}

impl SelectionController {
    pub fn new(item_count: usize) -> Self {
        Self {
            item_count,
            ..Self::default()
        }
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn item_count(&self) -> usize {
        self.item_count
    }

    /// Called when the page's data is (re)loaded.
    pub fn reset(&mut self, item_count: usize) {
        self.item_count = item_count;
        self.selection.clear();
        self.last_tap = None;
    }

    /// Mouse click or keyboard activation.
    pub fn click(&mut self, item: usize) {
        self.selection.toggle(item, self.item_count);
    }

    pub fn double_click(&mut self, item: usize) {
        self.selection.isolate(item, self.item_count);
    }

    /// Touch tap at `now_ms` on a viewport `viewport_width` wide.
    ///
    /// On large viewports a tap is a click. On small ones the first tap only
    /// previews; a second tap on the same item within
    /// [`DOUBLE_TAP_WINDOW_MS`] toggles it.
    pub fn tap(&mut self, item: usize, now_ms: u64, viewport_width: f64) -> TapOutcome {
        if viewport_width >= SMALL_VIEWPORT_MAX_WIDTH {
            self.click(item);
            return TapOutcome::Toggled(item);
        }
        match self.last_tap {
            Some((last, at)) if last == item && now_ms.saturating_sub(at) <= DOUBLE_TAP_WINDOW_MS => {
                self.last_tap = None;
                self.click(item);
                TapOutcome::Toggled(item)
            }
            _ => {
                self.last_tap = Some((item, now_ms));
                TapOutcome::ShowTooltip(item)
            }
        }
    }

    /// Touch double-tap gesture reported by the host.
    pub fn double_tap(&mut self, item: usize) {
        self.last_tap = None;
        self.double_click(item);
    }
}
