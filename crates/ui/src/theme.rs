use factbook_core::export::svg::resolve_color;
use factbook_protocol::ThemeToken;

/// Resolved RGBA color for egui rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl ResolvedColor {
    const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// `#rrggbb`; anything else is magenta so a bad palette entry is obvious.
    fn from_hex(hex: &str) -> Self {
        let channel = |i: usize| {
            hex.get(i..i + 2)
                .and_then(|s| u8::from_str_radix(s, 16).ok())
        };
        match (hex.len(), channel(1), channel(3), channel(5)) {
            (7, Some(r), Some(g), Some(b)) => Self::rgb(r, g, b),
            _ => Self::rgb(0xff, 0x00, 0xff),
        }
    }

    pub fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    pub fn to_color32(self) -> egui::Color32 {
        egui::Color32::from_rgba_unmultiplied(self.r, self.g, self.b, self.a)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeMode {
    Dark,
    Light,
}

impl ThemeMode {
    pub fn is_dark(self) -> bool {
        self == Self::Dark
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    pub fn visuals(self) -> egui::Visuals {
        match self {
            Self::Dark => factbook_dark_visuals(),
            Self::Light => factbook_light_visuals(),
        }
    }
}

/// Alpha for series faded out by a selection.
pub const DIMMED_ALPHA: u8 = 77;

/// The same palette the SVG export uses, so saved images match the screen.
pub fn resolve_rgba(token: ThemeToken, mode: ThemeMode) -> ResolvedColor {
    ResolvedColor::from_hex(resolve_color(token, mode.is_dark()))
}

pub fn resolve(token: ThemeToken, mode: ThemeMode) -> egui::Color32 {
    resolve_rgba(token, mode).to_color32()
}

pub fn resolve_dimmed(token: ThemeToken, mode: ThemeMode, dimmed: bool) -> egui::Color32 {
    let color = resolve_rgba(token, mode);
    if dimmed { color.with_alpha(DIMMED_ALPHA) } else { color }.to_color32()
}

// ── Typography scale ───────────────────────────────────────────────────────

pub const FONT_TITLE: f32 = 18.0;
pub const FONT_BODY: f32 = 13.0;
pub const FONT_CAPTION: f32 = 11.0;

// ── egui visual presets ────────────────────────────────────────────────────

pub fn factbook_dark_visuals() -> egui::Visuals {
    let mut v = egui::Visuals::dark();
    v.panel_fill = egui::Color32::from_rgb(0x18, 0x18, 0x18);
    v.window_fill = egui::Color32::from_rgb(0x20, 0x20, 0x20);
    v.extreme_bg_color = egui::Color32::from_rgb(0x10, 0x10, 0x10);
    v.faint_bg_color = egui::Color32::from_rgb(0x2a, 0x2a, 0x2a);
    v.hyperlink_color = egui::Color32::from_rgb(0x8f, 0xb3, 0xe8);
    v.selection.bg_fill = egui::Color32::from_rgba_unmultiplied(0x4e, 0x9b, 0xd6, 70);
    v.selection.stroke = egui::Stroke::new(1.0, egui::Color32::from_rgb(0x4e, 0x9b, 0xd6));
    v.window_corner_radius = egui::CornerRadius::same(4);
    v.widgets.inactive.corner_radius = egui::CornerRadius::same(3);
    v.widgets.hovered.corner_radius = egui::CornerRadius::same(3);
    v.widgets.active.corner_radius = egui::CornerRadius::same(3);
    v
}

pub fn factbook_light_visuals() -> egui::Visuals {
    let mut v = egui::Visuals::light();
    v.panel_fill = egui::Color32::from_rgb(0xff, 0xff, 0xff);
    v.window_fill = egui::Color32::from_rgb(0xff, 0xff, 0xff);
    v.faint_bg_color = egui::Color32::from_rgb(0xf2, 0xf2, 0xf2);
    v.hyperlink_color = egui::Color32::from_rgb(0x28, 0x4f, 0x8a);
    v.selection.bg_fill = egui::Color32::from_rgba_unmultiplied(0x26, 0x37, 0x4a, 50);
    v.selection.stroke = egui::Stroke::new(1.0, egui::Color32::from_rgb(0x26, 0x37, 0x4a));
    v.window_corner_radius = egui::CornerRadius::same(4);
    v.widgets.inactive.corner_radius = egui::CornerRadius::same(3);
    v.widgets.hovered.corner_radius = egui::CornerRadius::same(3);
    v.widgets.active.corner_radius = egui::CornerRadius::same(3);
    v
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_palette_hex() {
        assert_eq!(ResolvedColor::from_hex("#26374a"), ResolvedColor::rgb(0x26, 0x37, 0x4a));
        assert_eq!(ResolvedColor::from_hex("nope"), ResolvedColor::rgb(0xff, 0x00, 0xff));
    }

    #[test]
    fn every_token_resolves() {
        use ThemeToken::*;
        let tokens = [
            Series1, Series2, Series3, Series4, Series5, Series6, Series7, Series8, Series9, Series10,
            Series11, Series12, TextPrimary, TextSecondary, TextMuted, SelectionHighlight,
            HoverHighlight, Background, Surface, Border, Axis, Gridline, TableRowEven, TableRowOdd,
            TableHeaderBackground, TableBorder,
        ];
        for mode in [ThemeMode::Dark, ThemeMode::Light] {
            for token in tokens {
                assert_ne!(resolve_rgba(token, mode), ResolvedColor::rgb(0xff, 0x00, 0xff), "{token:?}");
            }
        }
    }

    #[test]
    fn dimming_only_changes_alpha() {
        let full = resolve(ThemeToken::Series1, ThemeMode::Light);
        let dim = resolve_dimmed(ThemeToken::Series1, ThemeMode::Light, true);
        assert_eq!(full.a(), 255);
        assert!(dim.a() < 255);
    }
}
