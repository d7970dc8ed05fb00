use factbook_protocol::{Rect, RenderCommand, ThemeToken};

use super::axis::{render_value_axis, render_year_labels, scale_max};
use super::{ChartData, encode_item};
use crate::i18n::Language;
use crate::selection::Selection;

const STACK_FILL: f64 = 0.7;
const GROUP_FILL: f64 = 0.8;

fn bar(data: &ChartData, selection: &Selection, series: usize, point: usize, rect: Rect) -> RenderCommand {
    RenderCommand::DrawRect {
        rect,
        color: data.series[series].color,
        border_color: None,
        label: data.tooltip(series, point),
        item_id: Some(encode_item(series, point)),
        dimmed: !selection.is_emphasized(series),
    }
}

fn plot_background(plot: &Rect) -> RenderCommand {
    RenderCommand::DrawRect {
        rect: *plot,
        color: ThemeToken::Surface,
        border_color: None,
        label: None,
        item_id: None,
        dimmed: false,
    }
}

/// One bar per year with categories stacked bottom-up in catalog order.
/// Negative and missing values are not drawn.
pub fn render_stacked(data: &ChartData, selection: &Selection, plot: &Rect, lang: Language) -> Vec<RenderCommand> {
    let years = data.years.len();
    if years == 0 || plot.h <= 0.0 {
        return Vec::new();
    }
    let top = scale_max(data.max_stacked(), plot.h);
    let y_scale = plot.h / top;
    let slot_w = plot.w / years as f64;
    let bar_w = slot_w * STACK_FILL;

    let mut commands = Vec::with_capacity(data.point_count() + 32);
    commands.push(plot_background(plot));
    commands.extend(render_value_axis(plot, data.max_stacked(), lang));

    for point in 0..years {
        let x = plot.x + point as f64 * slot_w + (slot_w - bar_w) / 2.0;
        let mut base = plot.bottom();
        for series in 0..data.series.len() {
            let v = data.value(series, point);
            if v <= 0.0 {
                continue;
            }
            let h = v * y_scale;
            commands.push(bar(data, selection, series, point, Rect::new(x, base - h, bar_w, h)));
            base -= h;
        }
    }

    commands.extend(render_year_labels(plot, &data.years, slot_w));
    commands
}

/// One cluster per year, one bar per category.
pub fn render_grouped(data: &ChartData, selection: &Selection, plot: &Rect, lang: Language) -> Vec<RenderCommand> {
    let years = data.years.len();
    let n = data.series.len();
    if years == 0 || n == 0 || plot.h <= 0.0 {
        return Vec::new();
    }
    let top = scale_max(data.max_value(), plot.h);
    let y_scale = plot.h / top;
    let slot_w = plot.w / years as f64;
    let bar_w = slot_w * GROUP_FILL / n as f64;

    let mut commands = Vec::with_capacity(data.point_count() + 32);
    commands.push(plot_background(plot));
    commands.extend(render_value_axis(plot, data.max_value(), lang));

    for point in 0..years {
        let cluster_x = plot.x + point as f64 * slot_w + slot_w * (1.0 - GROUP_FILL) / 2.0;
        for series in 0..n {
            let v = data.value(series, point);
            if v <= 0.0 {
                continue;
            }
            let h = v * y_scale;
            let x = cluster_x + series as f64 * bar_w;
            commands.push(bar(data, selection, series, point, Rect::new(x, plot.bottom() - h, bar_w, h)));
        }
    }

    commands.extend(render_year_labels(plot, &data.years, slot_w));
    commands
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{PAGE_11, PAGE_24};
    use crate::model::{Dataset, TotalPolicy, YearRecord};
    use crate::views::decode_item;
    use approx::assert_relative_eq;

    fn bars(cmds: &[RenderCommand]) -> Vec<(Rect, u64, bool)> {
        cmds.iter()
            .filter_map(|c| match c {
                RenderCommand::DrawRect {
                    rect,
                    item_id: Some(id),
                    dimmed,
                    ..
                } => Some((*rect, *id, *dimmed)),
                _ => None,
            })
            .collect()
    }

    fn capex() -> ChartData {
        let ds = Dataset::from_records(vec![
            YearRecord::new(2021).with("oil_gas", 60.0).with("electricity", 40.0),
            YearRecord::new(2022).with("oil_gas", 50.0).with("electricity", 30.0).with("other", 20.0),
        ]);
        ChartData::from_dataset(&PAGE_24, &ds, Language::En, TotalPolicy::PreferProvided)
    }

    #[test]
    fn stacks_bottom_up() {
        let plot = Rect::new(0.0, 0.0, 200.0, 100.0);
        let cmds = render_stacked(&capex(), &Selection::None, &plot, Language::En);
        let b = bars(&cmds);
        // Missing "other" in 2021 is skipped.
        assert_eq!(b.len(), 5);
        let (first, id, dimmed) = b[0];
        assert_eq!(decode_item(id), (0, 0));
        assert!(!dimmed);
        assert_relative_eq!(first.bottom(), plot.bottom());
        assert_relative_eq!(b[1].0.bottom(), first.y);
    }

    #[test]
    fn selection_dims_other_series() {
        let plot = Rect::new(0.0, 0.0, 200.0, 100.0);
        let mut sel = Selection::None;
        sel.toggle(1, 3);
        let cmds = render_stacked(&capex(), &sel, &plot, Language::En);
        for (_, id, dimmed) in bars(&cmds) {
            assert_eq!(dimmed, decode_item(id).0 != 1);
        }
    }

    #[test]
    fn grouped_bars_sit_side_by_side() {
        let ds = Dataset::from_records(vec![
            YearRecord::new(2022).with("gdp", 100.0).with("employment_income", 50.0).with("investment_value", 25.0),
        ]);
        let data = ChartData::from_dataset(&PAGE_11, &ds, Language::En, TotalPolicy::PreferProvided);
        let plot = Rect::new(0.0, 0.0, 300.0, 100.0);
        let b = bars(&render_grouped(&data, &Selection::None, &plot, Language::En));
        assert_eq!(b.len(), 3);
        assert!(b[0].0.right() <= b[1].0.x + 1e-9);
        assert!(b[0].0.h > b[1].0.h && b[1].0.h > b[2].0.h);
    }
}
