use serde::{Deserialize, Serialize};

/// Semantic color tokens resolved by the renderer's active theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ThemeToken {
    // Categorical chart palette, assigned per category in the catalog.
    Series1,
    Series2,
    Series3,
    Series4,
    Series5,
    Series6,
    Series7,
    Series8,
    Series9,
    Series10,
    Series11,
    Series12,

    TextPrimary,
    TextSecondary,
    TextMuted,

    SelectionHighlight,
    HoverHighlight,

    Background,
    Surface,
    Border,

    // Axes
    Axis,
    Gridline,

    // Data table
    TableRowEven,
    TableRowOdd,
    TableHeaderBackground,
    TableBorder,
}

impl ThemeToken {
    /// The categorical palette in assignment order.
    pub const SERIES: [ThemeToken; 12] = [
        Self::Series1,
        Self::Series2,
        Self::Series3,
        Self::Series4,
        Self::Series5,
        Self::Series6,
        Self::Series7,
        Self::Series8,
        Self::Series9,
        Self::Series10,
        Self::Series11,
        Self::Series12,
    ];

    /// Palette entry for the `index`th category, wrapping around.
    pub fn series(index: usize) -> Self {
        Self::SERIES[index % Self::SERIES.len()]
    }
}
