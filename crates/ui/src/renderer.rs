use std::f64::consts::FRAC_PI_2;

use egui::{Align2, CornerRadius, FontId, Pos2, Rect, Shape, Stroke, StrokeKind};
use factbook_core::views::hit_test;
use factbook_core::views::pie_chart::point_at;
use factbook_protocol::{Point, RenderCommand, TextAlign, ThemeToken};

use crate::theme::{self, ThemeMode};

/// Render a list of `RenderCommand` into an egui `Painter`.
///
/// `offset` is the top-left pixel position of the chart area.
pub fn render_commands(painter: &egui::Painter, commands: &[RenderCommand], offset: Pos2, mode: ThemeMode) {
    let at = |p: Point| Pos2::new(p.x as f32 + offset.x, p.y as f32 + offset.y);

    for cmd in commands {
        match cmd {
            RenderCommand::DrawRect {
                rect,
                color,
                border_color,
                dimmed,
                ..
            } => {
                if rect.w < 0.5 || rect.h < 0.5 {
                    continue;
                }
                let egui_rect = Rect::from_min_size(
                    at(Point::new(rect.x, rect.y)),
                    egui::vec2(rect.w as f32, rect.h as f32),
                );
                if !painter.clip_rect().intersects(egui_rect) {
                    continue;
                }
                painter.rect_filled(egui_rect, CornerRadius::ZERO, theme::resolve_dimmed(*color, mode, *dimmed));
                if let Some(bc) = border_color {
                    painter.rect_stroke(
                        egui_rect,
                        CornerRadius::ZERO,
                        Stroke::new(2.0, theme::resolve(*bc, mode)),
                        StrokeKind::Outside,
                    );
                }
            }

            RenderCommand::DrawWedge {
                center,
                radius,
                start_angle,
                end_angle,
                color,
                dimmed,
                ..
            } => {
                let fill = theme::resolve_dimmed(*color, mode, *dimmed);
                let c = at(*center);
                // Convex pieces: no piece spans more than a quarter turn.
                let mut from = *start_angle;
                while from < *end_angle {
                    let to = (from + FRAC_PI_2).min(*end_angle);
                    let steps = (((to - from) * radius / 4.0).ceil() as usize).clamp(2, 64);
                    let mut points = Vec::with_capacity(steps + 2);
                    points.push(c);
                    for i in 0..=steps {
                        let a = from + (to - from) * i as f64 / steps as f64;
                        points.push(at(point_at(*center, *radius, a)));
                    }
                    painter.add(Shape::convex_polygon(points, fill, Stroke::NONE));
                    from = to;
                }
                let edge = theme::resolve(ThemeToken::Surface, mode);
                painter.line_segment([c, at(point_at(*center, *radius, *start_angle))], Stroke::new(1.0, edge));
            }

            RenderCommand::DrawText {
                position,
                text,
                color,
                font_size,
                align,
            } => {
                let size = *font_size as f32;
                if size < 1.0 {
                    continue;
                }
                let anchor = match align {
                    TextAlign::Left => Align2::LEFT_BOTTOM,
                    TextAlign::Center => Align2::CENTER_BOTTOM,
                    TextAlign::Right => Align2::RIGHT_BOTTOM,
                };
                painter.text(
                    at(*position),
                    anchor,
                    text,
                    FontId::proportional(size),
                    theme::resolve(*color, mode),
                );
            }

            RenderCommand::DrawLine {
                from,
                to,
                color,
                width,
            } => {
                painter.line_segment(
                    [at(*from), at(*to)],
                    Stroke::new(*width as f32, theme::resolve(*color, mode)),
                );
            }

            RenderCommand::BeginGroup { .. } | RenderCommand::EndGroup => {
                // No visual effect.
            }
        }
    }
}

/// The chart item under `pointer`, given the same `offset` used to render.
pub fn item_at(commands: &[RenderCommand], offset: Pos2, pointer: Pos2) -> Option<u64> {
    hit_test(
        commands,
        Point::new(f64::from(pointer.x - offset.x), f64::from(pointer.y - offset.y)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pointer_is_translated_before_hit_testing() {
        let cmds = [RenderCommand::DrawRect {
            rect: factbook_protocol::Rect::new(10.0, 10.0, 20.0, 20.0),
            color: ThemeToken::Series1,
            border_color: None,
            label: None,
            item_id: Some(7),
            dimmed: false,
        }];
        let offset = Pos2::new(100.0, 50.0);
        assert_eq!(item_at(&cmds, offset, Pos2::new(115.0, 65.0)), Some(7));
        assert_eq!(item_at(&cmds, offset, Pos2::new(15.0, 15.0)), None);
    }
}
