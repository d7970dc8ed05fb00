//! The site shell: language, layout padding, sidebar and the active section.

use serde::Serialize;

use crate::catalog::{SECTIONS, SectionSpec, find_section};
use crate::i18n::Language;
use crate::layout::{AlignmentTracker, AlignmentTrigger, AnchorGeometry, LayoutPadding};
use crate::scroll::{ScrollAction, SectionScroller};
use crate::sidebar::{SidebarNode, SidebarState};

/// What pages see of the shell. Handed out by value; pages cannot change it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LayoutContext {
    pub padding: LayoutPadding,
    pub language: Language,
}

/// Split `/section-3#page-25` into route and fragment. Query strings are
/// dropped.
pub fn split_location(location: &str) -> (&str, Option<&str>) {
    let (path, fragment) = match location.split_once('#') {
        Some((p, f)) => (p, Some(f)),
        None => (location, None),
    };
    let path = path.split_once('?').map_or(path, |(p, _)| p);
    (path, fragment)
}

/// Timers that came due during [`Site::poll`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SiteTick {
    /// The host should measure anchors and call [`Site::measure`] with
    /// [`AlignmentTrigger::Recheck`].
    pub remeasure: bool,
    pub scrolls: Vec<ScrollAction>,
}

#[derive(Debug)]
pub struct Site {
    language: Language,
    tracker: AlignmentTracker,
    scroller: SectionScroller,
    sidebar: SidebarState,
    active: &'static SectionSpec,
}

impl Site {
    pub fn new(language: Language) -> Self {
        Self {
            language,
            tracker: AlignmentTracker::new(),
            scroller: SectionScroller::new(),
            sidebar: SidebarState::new(),
            active: &SECTIONS[0],
        }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    pub fn toggle_language(&mut self) -> Language {
        self.language = self.language.toggled();
        self.language
    }

    pub fn active_section(&self) -> &'static SectionSpec {
        self.active
    }

    pub fn context(&self) -> LayoutContext {
        LayoutContext {
            padding: self.tracker.padding(),
            language: self.language,
        }
    }

    pub fn sidebar(&self) -> Vec<SidebarNode> {
        self.sidebar.tree(self.language, Some(self.active.id))
    }

    pub fn toggle_sidebar(&mut self, section: &str) {
        self.sidebar.toggle(section);
    }

    /// First layout pass after the shell is mounted.
    pub fn mount(&mut self, geometry: &AnchorGeometry, now_ms: u64) -> LayoutPadding {
        self.tracker.attach(geometry, now_ms)
    }

    pub fn measure(&mut self, trigger: AlignmentTrigger, geometry: &AnchorGeometry, now_ms: u64) -> LayoutPadding {
        self.tracker.measure(trigger, geometry, now_ms)
    }

    /// Go to `location`. Unknown routes resolve to the first section.
    pub fn navigate(&mut self, location: &str, geometry: &AnchorGeometry, now_ms: u64) -> ScrollAction {
        let (route, fragment) = split_location(location);
        let section = find_section(route).unwrap_or_else(|| {
            tracing::debug!(route, "unknown route, showing first section");
            &SECTIONS[0]
        });
        self.active = section;
        self.sidebar.expand(section);
        self.tracker.measure(AlignmentTrigger::RouteChange, geometry, now_ms);
        self.scroller.enter(section, fragment, now_ms)
    }

    /// A page's data arrived.
    pub fn page_ready(&mut self, anchor: &str, now_ms: u64) {
        self.scroller.page_ready(anchor, now_ms);
    }

    pub fn poll(&mut self, now_ms: u64) -> SiteTick {
        SiteTick {
            remeasure: self.tracker.take_due_recheck(now_ms),
            scrolls: self.scroller.poll(now_ms),
        }
    }

    /// The section view went away; its pending scroll must not fire.
    pub fn leave_section(&mut self) {
        self.scroller.cancel();
    }

    /// Stop tracking anchors. Padding keeps its last value.
    pub fn detach_alignment(&mut self) {
        self.tracker.detach();
    }

    /// Shell torn down: timers and listeners go away.
    pub fn unmount(&mut self) {
        self.detach_alignment();
        self.leave_section();
    }
}

impl Default for Site {
    fn default() -> Self {
        Self::new(Language::default())
    }
}
