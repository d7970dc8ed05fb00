//! Content padding that lines page text up under header landmarks.
//!
//! The host measures three elements (left anchor, right anchor, content
//! container) and feeds their client rectangles in. Padding is a pure
//! function of that geometry, so repeated or overlapping triggers never
//! accumulate.

use factbook_protocol::Rect;
use serde::{Deserialize, Serialize};

pub const LEFT_ANCHOR_ID: &str = "header-align-left";
pub const RIGHT_ANCHOR_ID: &str = "header-align-right";
pub const CONTAINER_ID: &str = "main-content";

/// Delay before the follow-up measurement that catches late font and image
/// layout shifts.
pub const ALIGNMENT_RECHECK_DELAY_MS: u64 = 150;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutPadding {
    pub left: f64,
    pub right: f64,
}

impl LayoutPadding {
    pub fn new(left: f64, right: f64) -> Self {
        Self { left, right }
    }

    /// Inline style for the content container.
    pub fn to_css(&self) -> String {
        format!("padding-left: {}px; padding-right: {}px;", self.left, self.right)
    }
}

/// Client rectangles of the three measured elements. `None` means the
/// element is not in the document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AnchorGeometry {
    pub left_anchor: Option<Rect>,
    pub right_anchor: Option<Rect>,
    pub container: Option<Rect>,
}

/// Padding for the given geometry. Negative offsets clamp to zero.
pub fn compute_padding(left_anchor: &Rect, right_anchor: &Rect, container: &Rect) -> LayoutPadding {
    LayoutPadding {
        left: (left_anchor.left() - container.left()).max(0.0),
        right: (container.right() - right_anchor.right()).max(0.0),
    }
}

impl AnchorGeometry {
    /// Padding if all three elements are present.
    pub fn padding(&self) -> Option<LayoutPadding> {
        match (&self.left_anchor, &self.right_anchor, &self.container) {
            (Some(l), Some(r), Some(c)) => Some(compute_padding(l, r, c)),
            _ => None,
        }
    }
}

/// Why a measurement is being taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlignmentTrigger {
    Mount,
    Resize,
    RouteChange,
    /// The delayed follow-up; does not schedule another.
    Recheck,
}

/// Owns the active padding and the pending follow-up measurement.
#[derive(Debug, Clone, Default)]
pub struct AlignmentTracker {
    padding: LayoutPadding,
    attached: bool,
    recheck_at: Option<u64>,
}

impl AlignmentTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn padding(&self) -> LayoutPadding {
        self.padding
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn pending_recheck(&self) -> Option<u64> {
        self.recheck_at
    }

    /// Start listening and take the first measurement.
    pub fn attach(&mut self, geometry: &AnchorGeometry, now_ms: u64) -> LayoutPadding {
        self.attached = true;
        self.measure(AlignmentTrigger::Mount, geometry, now_ms)
    }

    /// Stop listening. Pending follow-ups are dropped and later triggers
    /// are ignored. The last padding is kept.
    pub fn detach(&mut self) {
        self.attached = false;
        self.recheck_at = None;
    }

    /// Recompute from `geometry`. With an element missing, the previous
    /// padding stays in place.
    pub fn measure(&mut self, trigger: AlignmentTrigger, geometry: &AnchorGeometry, now_ms: u64) -> LayoutPadding {
        if !self.attached {
            return self.padding;
        }
        match geometry.padding() {
            Some(p) => {
                if p != self.padding {
                    tracing::debug!(?trigger, left = p.left, right = p.right, "layout padding changed");
                }
                self.padding = p;
            }
            None => tracing::trace!(?trigger, "alignment anchor missing, padding kept"),
        }
        if trigger != AlignmentTrigger::Recheck {
            self.recheck_at = Some(now_ms + ALIGNMENT_RECHECK_DELAY_MS);
        }
        self.padding
    }

    /// Whether the follow-up measurement is due. Consumes it when it is.
    pub fn take_due_recheck(&mut self, now_ms: u64) -> bool {
        match self.recheck_at {
            Some(at) if self.attached && now_ms >= at => {
                self.recheck_at = None;
                true
            }
            _ => false,
        }
    }
}
