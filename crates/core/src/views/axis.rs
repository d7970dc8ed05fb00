use factbook_protocol::{Point, Rect, RenderCommand, TextAlign, ThemeToken};

use crate::format::format_number;
use crate::i18n::Language;

const TICK_LENGTH: f64 = 4.0;
const LABEL_GAP: f64 = 6.0;
const FONT_SIZE: f64 = 10.0;
const MIN_TICK_SPACING_PX: f64 = 40.0;

/// Choose a "nice" tick interval for values in `0..=max` drawn over
/// `height_px`: 1, 2 or 5 times a power of ten.
pub fn nice_interval(max: f64, height_px: f64) -> f64 {
    if max <= 0.0 || !max.is_finite() {
        return 1.0;
    }
    let target_count = (height_px / MIN_TICK_SPACING_PX).clamp(2.0, 10.0);
    let raw = max / target_count;
    let magnitude = 10.0_f64.powf(raw.log10().floor());
    for step in [1.0, 2.0, 5.0, 10.0] {
        if step * magnitude >= raw {
            return step * magnitude;
        }
    }
    10.0 * magnitude
}

/// Tick values from zero up to the first tick at or above `max`.
pub fn ticks(max: f64, height_px: f64) -> Vec<f64> {
    let interval = nice_interval(max, height_px);
    let count = (max.max(0.0) / interval).ceil().max(1.0) as usize;
    (0..=count).map(|i| i as f64 * interval).collect()
}

/// Top of the value scale for `max`: the last tick.
pub fn scale_max(max: f64, height_px: f64) -> f64 {
    ticks(max, height_px).last().copied().unwrap_or(1.0)
}

/// Render a vertical value axis along the left edge of `plot`, with
/// gridlines across it.
pub fn render_value_axis(plot: &Rect, max: f64, lang: Language) -> Vec<RenderCommand> {
    let values = ticks(max, plot.h);
    let top = values.last().copied().unwrap_or(1.0);
    let interval = values.get(1).copied().unwrap_or(1.0);
    let decimals = if interval < 1.0 { 1 } else { 0 };
    let mut commands = Vec::with_capacity(values.len() * 3 + 1);

    commands.push(RenderCommand::DrawLine {
        from: Point::new(plot.x, plot.y),
        to: Point::new(plot.x, plot.bottom()),
        color: ThemeToken::Axis,
        width: 1.0,
    });

    for v in values {
        let y = plot.bottom() - v / top * plot.h;
        commands.push(RenderCommand::DrawLine {
            from: Point::new(plot.x - TICK_LENGTH, y),
            to: Point::new(plot.right(), y),
            color: if v == 0.0 { ThemeToken::Axis } else { ThemeToken::Gridline },
            width: if v == 0.0 { 1.0 } else { 0.5 },
        });
        commands.push(RenderCommand::DrawText {
            position: Point::new(plot.x - LABEL_GAP, y + FONT_SIZE / 3.0),
            text: format_number(v, decimals, lang),
            color: ThemeToken::TextSecondary,
            font_size: FONT_SIZE,
            align: TextAlign::Right,
        });
    }
    commands
}

/// Year labels centred under each slot of width `slot_w`.
pub fn render_year_labels(plot: &Rect, years: &[i32], slot_w: f64) -> Vec<RenderCommand> {
    // Thin out labels so they do not collide on narrow charts.
    let stride = ((36.0 / slot_w).ceil() as usize).max(1);
    years
        .iter()
        .enumerate()
        .filter(|(i, _)| i % stride == 0 || *i + 1 == years.len())
        .map(|(i, year)| RenderCommand::DrawText {
            position: Point::new(plot.x + (i as f64 + 0.5) * slot_w, plot.bottom() + FONT_SIZE + 4.0),
            text: year.to_string(),
            color: ThemeToken::TextSecondary,
            font_size: FONT_SIZE,
            align: TextAlign::Center,
        })
        .collect()
}
