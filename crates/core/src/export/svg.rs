//! SVG renderer: converts `RenderCommand` lists into standalone SVG strings.

use std::f64::consts::TAU;

use factbook_protocol::{RenderCommand, TextAlign, ThemeToken};

use super::ExportError;
use crate::views::TITLE_FONT_SIZE;
use crate::views::pie_chart::point_at;

const TITLE_HEIGHT: f64 = 36.0;
const DIMMED_OPACITY: f64 = 0.3;

/// Render a list of commands as an SVG document string.
///
/// `width` and `height` define the SVG viewBox dimensions.
/// `dark` selects the color palette.
pub fn render_svg(commands: &[RenderCommand], width: f64, height: f64, dark: bool) -> String {
    let mut svg = String::with_capacity(commands.len() * 200);
    open_document(&mut svg, width, height, dark);
    draw_commands(&mut svg, commands, dark);
    svg.push_str("</svg>");
    svg
}

fn open_document(svg: &mut String, width: f64, height: f64, dark: bool) {
    svg.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {width} {height}" width="{width}" height="{height}" style="font-family:system-ui,-apple-system,sans-serif;font-size:11px">"#,
    ));
    let bg = resolve_color(ThemeToken::Background, dark);
    svg.push_str(&format!(r#"<rect width="{width}" height="{height}" fill="{bg}"/>"#));
}

fn opacity(dimmed: bool) -> String {
    if dimmed {
        format!(r#" fill-opacity="{DIMMED_OPACITY}""#)
    } else {
        String::new()
    }
}

fn draw_commands(svg: &mut String, commands: &[RenderCommand], dark: bool) {
    for cmd in commands {
        match cmd {
            RenderCommand::DrawRect {
                rect,
                color,
                border_color,
                label,
                dimmed,
                ..
            } => {
                let fill = resolve_color(*color, dark);
                let stroke = border_color
                    .map(|b| format!(r#" stroke="{}" stroke-width="1""#, resolve_color(b, dark)))
                    .unwrap_or_default();
                svg.push_str(&format!(
                    r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{fill}"{stroke}{}>"#,
                    rect.x,
                    rect.y,
                    rect.w,
                    rect.h,
                    opacity(*dimmed),
                ));
                if let Some(label) = label {
                    svg.push_str(&format!("<title>{}</title>", escape_xml(label)));
                }
                svg.push_str("</rect>");
            }
            RenderCommand::DrawWedge {
                center,
                radius,
                start_angle,
                end_angle,
                color,
                label,
                dimmed,
                ..
            } => {
                let fill = resolve_color(*color, dark);
                let sweep = end_angle - start_angle;
                if sweep >= TAU - 1e-9 {
                    svg.push_str(&format!(
                        r#"<circle cx="{}" cy="{}" r="{radius}" fill="{fill}"{}>"#,
                        center.x,
                        center.y,
                        opacity(*dimmed),
                    ));
                } else {
                    let from = point_at(*center, *radius, *start_angle);
                    let to = point_at(*center, *radius, *end_angle);
                    let large = u8::from(sweep > TAU / 2.0);
                    svg.push_str(&format!(
                        r#"<path d="M{} {} L{} {} A{radius} {radius} 0 {large} 1 {} {} Z" fill="{fill}"{}>"#,
                        center.x,
                        center.y,
                        from.x,
                        from.y,
                        to.x,
                        to.y,
                        opacity(*dimmed),
                    ));
                }
                if let Some(label) = label {
                    svg.push_str(&format!("<title>{}</title>", escape_xml(label)));
                }
                svg.push_str(if sweep >= TAU - 1e-9 { "</circle>" } else { "</path>" });
            }
            RenderCommand::DrawLine {
                from,
                to,
                color,
                width: line_width,
            } => {
                let stroke = resolve_color(*color, dark);
                svg.push_str(&format!(
                    r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{stroke}" stroke-width="{line_width}"/>"#,
                    from.x, from.y, to.x, to.y,
                ));
            }
            RenderCommand::DrawText {
                text,
                position,
                color,
                font_size,
                align,
            } => {
                let fill = resolve_color(*color, dark);
                let anchor = match align {
                    TextAlign::Left => "start",
                    TextAlign::Center => "middle",
                    TextAlign::Right => "end",
                };
                svg.push_str(&format!(
                    r#"<text x="{}" y="{}" fill="{fill}" font-size="{font_size}" text-anchor="{anchor}">{}</text>"#,
                    position.x,
                    position.y,
                    escape_xml(text),
                ));
            }
            RenderCommand::BeginGroup { id, .. } => {
                svg.push_str(&format!(r#"<g id="{}">"#, escape_xml(id)));
            }
            RenderCommand::EndGroup => svg.push_str("</g>"),
        }
    }
}

/// A chart image with the page title drawn above it.
#[derive(Debug, Clone)]
pub struct ImageExport<'a> {
    pub title: &'a str,
    /// Size of the chart itself; the title band is added on top.
    pub width: f64,
    pub height: f64,
    pub dark: bool,
}

impl ImageExport<'_> {
    /// The titled chart as PNG bytes.
    pub fn to_png(&self, chart: &[RenderCommand]) -> Result<Vec<u8>, ExportError> {
        let svg = self.to_svg(chart)?;
        super::raster::svg_to_png(&svg, self.width, self.height + TITLE_HEIGHT)
    }

    pub fn to_svg(&self, chart: &[RenderCommand]) -> Result<String, ExportError> {
        if !chart.iter().any(|c| c.item_id().is_some()) {
            return Err(ExportError::MissingChart);
        }
        let total_height = self.height + TITLE_HEIGHT;
        let mut svg = String::with_capacity(chart.len() * 200 + 512);
        open_document(&mut svg, self.width, total_height, self.dark);
        svg.push_str(&format!(
            r#"<text x="{}" y="{}" fill="{}" font-size="{TITLE_FONT_SIZE}" font-weight="bold" text-anchor="middle">{}</text>"#,
            self.width / 2.0,
            TITLE_HEIGHT * 0.65,
            resolve_color(ThemeToken::TextPrimary, self.dark),
            escape_xml(self.title),
        ));
        svg.push_str(&format!(r#"<g transform="translate(0 {TITLE_HEIGHT})">"#));
        draw_commands(&mut svg, chart, self.dark);
        svg.push_str("</g></svg>");
        Ok(svg)
    }
}

pub fn resolve_color(token: ThemeToken, dark: bool) -> &'static str {
    if dark {
        match token {
            ThemeToken::Series1 => "#4e9bd6",
            ThemeToken::Series2 => "#f2a541",
            ThemeToken::Series3 => "#5cc08a",
            ThemeToken::Series4 => "#e2677b",
            ThemeToken::Series5 => "#a58fe0",
            ThemeToken::Series6 => "#57c4c9",
            ThemeToken::Series7 => "#d9c75b",
            ThemeToken::Series8 => "#c98b6b",
            ThemeToken::Series9 => "#8fb3e8",
            ThemeToken::Series10 => "#e89bc5",
            ThemeToken::Series11 => "#9bc46a",
            ThemeToken::Series12 => "#b0b0b0",
            ThemeToken::TextPrimary => "#ececec",
            ThemeToken::TextSecondary | ThemeToken::TextMuted => "#9e9e9e",
            ThemeToken::SelectionHighlight | ThemeToken::HoverHighlight => "#ffd600",
            ThemeToken::Background => "#181818",
            ThemeToken::Surface | ThemeToken::TableRowOdd => "#202020",
            ThemeToken::TableRowEven | ThemeToken::TableHeaderBackground => "#2a2a2a",
            ThemeToken::Border | ThemeToken::TableBorder | ThemeToken::Axis => "#616161",
            ThemeToken::Gridline => "#303030",
        }
    } else {
        match token {
            ThemeToken::Series1 => "#26374a",
            ThemeToken::Series2 => "#e58a2c",
            ThemeToken::Series3 => "#2b8a5a",
            ThemeToken::Series4 => "#b5323f",
            ThemeToken::Series5 => "#6e56a8",
            ThemeToken::Series6 => "#1f8a94",
            ThemeToken::Series7 => "#b09a1c",
            ThemeToken::Series8 => "#8a5236",
            ThemeToken::Series9 => "#5b84c4",
            ThemeToken::Series10 => "#c2609a",
            ThemeToken::Series11 => "#6b9a36",
            ThemeToken::Series12 => "#7a7a7a",
            ThemeToken::TextPrimary => "#1a1a2e",
            ThemeToken::TextSecondary | ThemeToken::TextMuted => "#666677",
            ThemeToken::SelectionHighlight | ThemeToken::HoverHighlight => "#ffbf47",
            ThemeToken::Background => "#ffffff",
            ThemeToken::Surface | ThemeToken::TableRowOdd => "#ffffff",
            ThemeToken::TableRowEven | ThemeToken::TableHeaderBackground => "#f2f2f2",
            ThemeToken::Border | ThemeToken::TableBorder | ThemeToken::Axis => "#999999",
            ThemeToken::Gridline => "#e6e6e6",
        }
    }
}

pub(crate) fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
