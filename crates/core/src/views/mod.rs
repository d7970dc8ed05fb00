//! Chart views. Each turns a page's [`ChartData`] into render commands.

pub mod axis;
pub mod bar_chart;
pub mod legend;
pub mod narrative;
pub mod pie_chart;
pub mod series;
pub mod table;

use factbook_protocol::{Point, Rect, RenderCommand, TextAlign, ThemeToken, Viewport};

use crate::catalog::ChartKind;
use crate::i18n::{self, Language};
use crate::selection::Selection;

pub use series::{ChartData, ChartSeries};
pub use table::{AccessibleTable, Disclosure};

/// Point index used by shapes that stand for a whole series (legend swatches).
pub const WHOLE_SERIES: usize = u32::MAX as usize;

/// Pack a series and point index into a render item id.
pub fn encode_item(series: usize, point: usize) -> u64 {
    ((series as u64) << 32) | (point as u64 & 0xFFFF_FFFF)
}

/// Inverse of [`encode_item`]: `(series, point)`.
pub fn decode_item(id: u64) -> (usize, usize) {
    ((id >> 32) as usize, (id & 0xFFFF_FFFF) as usize)
}

pub(crate) const TITLE_FONT_SIZE: f64 = 16.0;
pub(crate) const LABEL_FONT_SIZE: f64 = 11.0;
const MARGIN: f64 = 12.0;
const AXIS_GUTTER: f64 = 64.0;
const X_LABEL_HEIGHT: f64 = 20.0;

/// Split a viewport into plot area and legend area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartFrame {
    pub plot: Rect,
    pub legend: Rect,
}

impl ChartFrame {
    pub fn new(viewport: &Viewport, kind: ChartKind, legend_rows: usize) -> Self {
        let legend_h = legend::height(legend_rows);
        let bottom = (viewport.height - MARGIN - legend_h).max(MARGIN);
        let left = match kind {
            ChartKind::Pie => MARGIN,
            _ => MARGIN + AXIS_GUTTER,
        };
        let x_labels = match kind {
            ChartKind::Pie => 0.0,
            _ => X_LABEL_HEIGHT,
        };
        let plot = Rect::from_edges(
            left,
            MARGIN,
            (viewport.width - MARGIN).max(left),
            (bottom - x_labels).max(MARGIN),
        );
        let legend = Rect::new(MARGIN, bottom, (viewport.width - 2.0 * MARGIN).max(0.0), legend_h);
        Self { plot, legend }
    }
}

/// Full chart for a page: plot, axis and legend.
pub fn render_chart(
    kind: ChartKind,
    data: &ChartData,
    selection: &Selection,
    viewport: &Viewport,
    lang: Language,
) -> Vec<RenderCommand> {
    if data.is_empty() {
        return render_message(viewport, i18n::text("common.no_data", lang));
    }
    let frame = ChartFrame::new(viewport, kind, legend::rows(data, frame_width(viewport)));
    let mut commands = Vec::with_capacity(data.point_count() * 2 + 32);
    commands.push(RenderCommand::BeginGroup {
        id: "plot".into(),
        label: None,
    });
    match kind {
        ChartKind::StackedBar => commands.extend(bar_chart::render_stacked(data, selection, &frame.plot, lang)),
        ChartKind::GroupedBar => commands.extend(bar_chart::render_grouped(data, selection, &frame.plot, lang)),
        ChartKind::Pie => commands.extend(pie_chart::render_pie(data, selection, &frame.plot)),
    }
    commands.push(RenderCommand::EndGroup);
    commands.extend(legend::render_legend(data, selection, &frame.legend));
    commands
}

fn frame_width(viewport: &Viewport) -> f64 {
    (viewport.width - 2.0 * MARGIN).max(0.0)
}

/// A centred line of text in place of a chart (loading, error, no data).
pub fn render_message(viewport: &Viewport, message: &str) -> Vec<RenderCommand> {
    vec![RenderCommand::DrawText {
        position: Point::new(viewport.width / 2.0, viewport.height / 2.0),
        text: message.to_string(),
        color: ThemeToken::TextMuted,
        font_size: LABEL_FONT_SIZE + 2.0,
        align: TextAlign::Center,
    }]
}

/// Item under `point`, topmost first.
pub fn hit_test(commands: &[RenderCommand], point: Point) -> Option<u64> {
    commands.iter().rev().find_map(|cmd| match cmd {
        RenderCommand::DrawRect { rect, item_id: Some(id), .. } if rect.contains(point) => Some(*id),
        RenderCommand::DrawWedge {
            center,
            radius,
            start_angle,
            end_angle,
            item_id: Some(id),
            ..
        } if pie_chart::wedge_contains(*center, *radius, *start_angle, *end_angle, point) => Some(*id),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_ids_round_trip() {
        assert_eq!(decode_item(encode_item(3, 7)), (3, 7));
        assert_eq!(decode_item(encode_item(0, WHOLE_SERIES)), (0, WHOLE_SERIES));
    }

    #[test]
    fn hit_test_prefers_topmost() {
        let rect = |id| RenderCommand::DrawRect {
            rect: Rect::new(0.0, 0.0, 10.0, 10.0),
            color: ThemeToken::Series1,
            border_color: None,
            label: None,
            item_id: Some(id),
            dimmed: false,
        };
        let cmds = vec![rect(1), rect(2)];
        assert_eq!(hit_test(&cmds, Point::new(5.0, 5.0)), Some(2));
        assert_eq!(hit_test(&cmds, Point::new(50.0, 5.0)), None);
    }

    #[test]
    fn frame_reserves_axis_gutter_for_bars() {
        let vp = Viewport::new(600.0, 400.0);
        let bars = ChartFrame::new(&vp, ChartKind::StackedBar, 1);
        let pie = ChartFrame::new(&vp, ChartKind::Pie, 1);
        assert!(bars.plot.x > pie.plot.x);
        assert!(bars.plot.bottom() <= bars.legend.y);
    }
}
