use factbook_protocol::{Point, Rect, RenderCommand, TextAlign, ThemeToken};

use super::{ChartData, WHOLE_SERIES, encode_item};
use crate::selection::Selection;

const ROW_HEIGHT: f64 = 20.0;
const SWATCH: f64 = 12.0;
const GAP: f64 = 6.0;
const FONT_SIZE: f64 = 11.0;
const CHAR_WIDTH: f64 = 6.5;

/// Rough text width at the legend font size.
fn entry_width(label: &str) -> f64 {
    SWATCH + GAP + label.chars().count() as f64 * CHAR_WIDTH + 2.0 * GAP
}

/// Wrap entries into rows of at most `width`: `(series, x, row)`.
fn layout(data: &ChartData, width: f64) -> Vec<(usize, f64, usize)> {
    let mut out = Vec::with_capacity(data.series.len());
    let (mut x, mut row) = (0.0, 0);
    for (i, s) in data.series.iter().enumerate() {
        let w = entry_width(&s.label);
        if x > 0.0 && x + w > width {
            x = 0.0;
            row += 1;
        }
        out.push((i, x, row));
        x += w;
    }
    out
}

pub fn rows(data: &ChartData, width: f64) -> usize {
    layout(data, width).last().map_or(0, |(_, _, row)| row + 1)
}

pub fn height(rows: usize) -> f64 {
    rows as f64 * ROW_HEIGHT
}

/// Clickable legend: a swatch and label per series. Swatches carry a
/// whole-series item id so clicking one toggles that series.
pub fn render_legend(data: &ChartData, selection: &Selection, area: &Rect) -> Vec<RenderCommand> {
    let mut commands = Vec::with_capacity(data.series.len() * 2 + 2);
    commands.push(RenderCommand::BeginGroup {
        id: "legend".into(),
        label: None,
    });
    for (series, x, row) in layout(data, area.w) {
        let s = &data.series[series];
        let y = area.y + row as f64 * ROW_HEIGHT;
        let dimmed = !selection.is_emphasized(series);
        commands.push(RenderCommand::DrawRect {
            rect: Rect::new(area.x + x, y + (ROW_HEIGHT - SWATCH) / 2.0, entry_width(&s.label) - GAP, SWATCH),
            color: s.color,
            border_color: selection.contains(series).then_some(ThemeToken::SelectionHighlight),
            label: Some(s.label.clone()),
            item_id: Some(encode_item(series, WHOLE_SERIES)),
            dimmed,
        });
        commands.push(RenderCommand::DrawText {
            position: Point::new(area.x + x + SWATCH + GAP, y + ROW_HEIGHT / 2.0 + FONT_SIZE / 3.0),
            text: s.label.clone(),
            color: if dimmed { ThemeToken::TextMuted } else { ThemeToken::TextPrimary },
            font_size: FONT_SIZE,
            align: TextAlign::Left,
        });
    }
    commands.push(RenderCommand::EndGroup);
    commands
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{PAGE_24, PAGE_33};
    use crate::i18n::Language;
    use crate::model::{Dataset, TotalPolicy, YearRecord};
    use crate::views::decode_item;

    fn data(page: &crate::catalog::PageSpec) -> ChartData {
        let ds = Dataset::from_records(vec![YearRecord::new(2022)]);
        ChartData::from_dataset(page, &ds, Language::En, TotalPolicy::PreferProvided)
    }

    #[test]
    fn wraps_long_legends() {
        assert_eq!(rows(&data(&PAGE_24), 1_000.0), 1);
        assert!(rows(&data(&PAGE_33), 300.0) > 2);
    }

    #[test]
    fn swatches_address_whole_series() {
        let cmds = render_legend(&data(&PAGE_24), &Selection::None, &Rect::new(0.0, 0.0, 600.0, 20.0));
        let ids: Vec<_> = cmds.iter().filter_map(RenderCommand::item_id).map(decode_item).collect();
        assert_eq!(ids, vec![(0, WHOLE_SERIES), (1, WHOLE_SERIES), (2, WHOLE_SERIES)]);
    }
}
