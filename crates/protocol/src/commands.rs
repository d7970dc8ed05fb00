use serde::{Deserialize, Serialize};

use crate::theme::ThemeToken;
use crate::types::{Point, Rect};

/// A single, stateless render instruction.
///
/// The core emits a `Vec<RenderCommand>` for each chart. Renderers consume
/// this list sequentially; each command carries all the data it needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RenderCommand {
    /// Draw a filled rectangle, optionally with a text label and a chart
    /// item identifier (for hit-testing / selection).
    DrawRect {
        rect: Rect,
        color: ThemeToken,
        border_color: Option<ThemeToken>,
        label: Option<String>,
        item_id: Option<u64>,
        /// Drawn faded because another item is selected.
        dimmed: bool,
    },

    /// Draw a pie slice. Angles are radians, clockwise from twelve o'clock.
    DrawWedge {
        center: Point,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
        color: ThemeToken,
        label: Option<String>,
        item_id: Option<u64>,
        dimmed: bool,
    },

    /// Draw a text string at a position.
    DrawText {
        position: Point,
        text: String,
        color: ThemeToken,
        font_size: f64,
        align: TextAlign,
    },

    /// Draw a line segment.
    DrawLine {
        from: Point,
        to: Point,
        color: ThemeToken,
        width: f64,
    },

    /// Begin a logical group (plot area, legend, title). Renderers may use
    /// this for layering or accessibility.
    BeginGroup { id: String, label: Option<String> },

    /// End the current group.
    EndGroup,
}

impl RenderCommand {
    /// The chart item this command belongs to, if it is interactive.
    pub fn item_id(&self) -> Option<u64> {
        match self {
            Self::DrawRect { item_id, .. } | Self::DrawWedge { item_id, .. } => *item_id,
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_variant_tag() {
        let cmd = RenderCommand::DrawRect {
            rect: Rect::new(0.0, 0.0, 10.0, 20.0),
            color: ThemeToken::Series1,
            border_color: None,
            label: Some("Oil and gas".into()),
            item_id: Some(3),
            dimmed: false,
        };
        let json = serde_json::to_string(&cmd).unwrap();
        assert!(json.starts_with("{\"DrawRect\""));
        let back: RenderCommand = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cmd);
        assert_eq!(back.item_id(), Some(3));
    }

    #[test]
    fn text_has_no_item() {
        let cmd = RenderCommand::DrawText {
            position: Point::new(1.0, 2.0),
            text: "2022".into(),
            color: ThemeToken::TextMuted,
            font_size: 11.0,
            align: TextAlign::Center,
        };
        assert_eq!(cmd.item_id(), None);
    }
}
