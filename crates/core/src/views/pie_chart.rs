use std::f64::consts::TAU;

use factbook_protocol::{Point, Rect, RenderCommand, TextAlign, ThemeToken};

use super::{ChartData, LABEL_FONT_SIZE, encode_item};
use crate::i18n;
use crate::selection::Selection;

/// Latest year as a pie. Slices are sized against [`ChartData::share_base`],
/// the same base as the tooltip shares; whatever the categories leave of the
/// total is drawn as a muted remainder with no item.
pub fn render_pie(data: &ChartData, selection: &Selection, plot: &Rect) -> Vec<RenderCommand> {
    let Some(point) = data.latest_point() else {
        return Vec::new();
    };
    let center = Point::new(plot.x + plot.w / 2.0, plot.y + plot.h / 2.0);
    let radius = (plot.w.min(plot.h) / 2.0).max(0.0);

    let values: Vec<f64> = (0..data.series.len()).map(|s| data.value(s, point).max(0.0)).collect();
    let base = data.share_base(point);
    if values.iter().all(|v| *v <= 0.0) || radius == 0.0 {
        return vec![RenderCommand::DrawText {
            position: center,
            text: i18n::text("common.no_data", data.language).to_string(),
            color: ThemeToken::TextMuted,
            font_size: LABEL_FONT_SIZE,
            align: TextAlign::Center,
        }];
    }

    let mut commands = Vec::with_capacity(values.len() + 2);
    let mut angle = 0.0;
    for (series, v) in values.iter().enumerate() {
        if *v <= 0.0 {
            continue;
        }
        let sweep = v / base * TAU;
        commands.push(RenderCommand::DrawWedge {
            center,
            radius,
            start_angle: angle,
            end_angle: angle + sweep,
            color: data.series[series].color,
            label: data.tooltip(series, point),
            item_id: Some(encode_item(series, point)),
            dimmed: !selection.is_emphasized(series),
        });
        angle += sweep;
    }
    if TAU - angle > 1e-9 {
        commands.push(RenderCommand::DrawWedge {
            center,
            radius,
            start_angle: angle,
            end_angle: TAU,
            color: ThemeToken::Gridline,
            label: None,
            item_id: None,
            dimmed: false,
        });
    }
    commands.push(RenderCommand::DrawText {
        position: Point::new(center.x, plot.y + plot.h + LABEL_FONT_SIZE),
        text: data.years[point].to_string(),
        color: ThemeToken::TextSecondary,
        font_size: LABEL_FONT_SIZE,
        align: TextAlign::Center,
    });
    commands
}

/// Clockwise angle of `p` around `center`, from twelve o'clock, in `0..TAU`.
pub fn angle_of(center: Point, p: Point) -> f64 {
    let a = (p.x - center.x).atan2(center.y - p.y);
    if a < 0.0 { a + TAU } else { a }
}

pub fn wedge_contains(center: Point, radius: f64, start: f64, end: f64, p: Point) -> bool {
    let (dx, dy) = (p.x - center.x, p.y - center.y);
    if dx * dx + dy * dy > radius * radius {
        return false;
    }
    let a = angle_of(center, p);
    a >= start && a < end
}

/// Point on the circle at `angle`, for renderers tessellating wedges.
pub fn point_at(center: Point, radius: f64, angle: f64) -> Point {
    Point::new(center.x + radius * angle.sin(), center.y - radius * angle.cos())
}
