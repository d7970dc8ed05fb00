use std::io::stdout;

use anyhow::Result;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
        MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use factbook_core::catalog::{self, PageSpec};
use factbook_core::model::VectorStore;
use factbook_core::page::PageModel;
use factbook_core::views::{AccessibleTable, encode_item, hit_test};
use factbook_core::{Language, TotalPolicy};
use factbook_protocol::{Point, RenderCommand, TextAlign, ThemeToken, Viewport};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Widget, Wrap},
};

use crate::commands;

/// Chart pixels per terminal cell. Cells are roughly twice as tall as wide.
const CELL_W: f64 = 8.0;
const CELL_H: f64 = 16.0;

fn theme_to_color(token: ThemeToken) -> Color {
    match token {
        ThemeToken::Series1 => Color::Blue,
        ThemeToken::Series2 => Color::Red,
        ThemeToken::Series3 => Color::Green,
        ThemeToken::Series4 => Color::Yellow,
        ThemeToken::Series5 => Color::Magenta,
        ThemeToken::Series6 => Color::Cyan,
        ThemeToken::Series7 => Color::LightBlue,
        ThemeToken::Series8 => Color::LightRed,
        ThemeToken::Series9 => Color::LightGreen,
        ThemeToken::Series10 => Color::LightYellow,
        ThemeToken::Series11 => Color::LightMagenta,
        ThemeToken::Series12 => Color::LightCyan,
        ThemeToken::TextPrimary => Color::White,
        ThemeToken::TextSecondary => Color::Gray,
        ThemeToken::TextMuted => Color::DarkGray,
        ThemeToken::SelectionHighlight => Color::White,
        ThemeToken::HoverHighlight => Color::LightYellow,
        ThemeToken::Background | ThemeToken::Surface => Color::Black,
        ThemeToken::Border | ThemeToken::Axis | ThemeToken::Gridline => Color::DarkGray,
        ThemeToken::TableRowEven => Color::Black,
        ThemeToken::TableRowOdd => Color::Rgb(20, 20, 20),
        ThemeToken::TableHeaderBackground | ThemeToken::TableBorder => Color::DarkGray,
    }
}

/// Fill token of the shape covering chart position `p`, and whether it is dimmed.
fn fill_at(commands: &[RenderCommand], p: Point) -> Option<(ThemeToken, bool)> {
    let id = hit_test(commands, p)?;
    commands.iter().rev().find_map(|cmd| match cmd {
        RenderCommand::DrawRect {
            color,
            item_id: Some(item),
            dimmed,
            ..
        }
        | RenderCommand::DrawWedge {
            color,
            item_id: Some(item),
            dimmed,
            ..
        } if *item == id => Some((*color, *dimmed)),
        _ => None,
    })
}

/// Chart coordinates of the centre of cell `(col, row)` within the chart area.
fn cell_center(col: u16, row: u16) -> Point {
    Point::new(
        (f64::from(col) + 0.5) * CELL_W,
        (f64::from(row) + 0.5) * CELL_H,
    )
}

fn chart_viewport(area: Rect) -> Viewport {
    Viewport::new(f64::from(area.width) * CELL_W, f64::from(area.height) * CELL_H)
}

/// Draws chart commands as block characters, sampling each cell centre.
struct ChartWidget<'a> {
    commands: &'a [RenderCommand],
}

impl Widget for ChartWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        for row in 0..area.height {
            for col in 0..area.width {
                if let Some((token, dimmed)) = fill_at(self.commands, cell_center(col, row)) {
                    let symbol = if dimmed { "░" } else { "█" };
                    buf[(area.x + col, area.y + row)]
                        .set_symbol(symbol)
                        .set_fg(theme_to_color(token));
                }
            }
        }

        for cmd in self.commands {
            let RenderCommand::DrawText {
                position,
                text,
                color,
                align,
                ..
            } = cmd
            else {
                continue;
            };
            // Text is anchored at its baseline.
            let row = ((position.y - 1.0) / CELL_H).floor();
            let len = text.chars().count() as f64;
            let start = position.x / CELL_W
                - match align {
                    TextAlign::Left => 0.0,
                    TextAlign::Center => len / 2.0,
                    TextAlign::Right => len,
                };
            if row < 0.0 || row >= f64::from(area.height) {
                continue;
            }
            let fg = theme_to_color(*color);
            for (i, ch) in text.chars().enumerate() {
                let col = start.round() + i as f64;
                if col < 0.0 || col >= f64::from(area.width) {
                    continue;
                }
                buf[(area.x + col as u16, area.y + row as u16)]
                    .set_char(ch)
                    .set_fg(fg);
            }
        }
    }
}

fn table_widget(table: &AccessibleTable) -> Table<'_> {
    let header = Row::new(table.headers.iter().map(|h| Cell::from(h.as_str())))
        .style(Style::default().add_modifier(Modifier::BOLD).bg(theme_to_color(ThemeToken::TableHeaderBackground)));
    let rows = table.rows.iter().enumerate().map(|(i, row)| {
        let token = if i % 2 == 0 { ThemeToken::TableRowEven } else { ThemeToken::TableRowOdd };
        Row::new(
            std::iter::once(Cell::from(row.year.to_string()))
                .chain(row.cells.iter().map(|c| Cell::from(c.text.as_str()))),
        )
        .style(Style::default().bg(theme_to_color(token)))
    });
    let widths = vec![Constraint::Fill(1); table.column_count()];
    Table::new(rows, widths).header(header).block(
        Block::default()
            .borders(Borders::TOP)
            .title(format!(" {} ({}) ", table.caption, table.unit_label)),
    )
}

struct PageViewer<'a> {
    store: &'a VectorStore,
    policy: TotalPolicy,
    pages: Vec<&'static PageSpec>,
    index: usize,
    page: PageModel,
    lang: Language,
    /// Series the arrow keys act on.
    focus: usize,
    /// Commands and area of the last frame, for mouse hit testing.
    chart: Vec<RenderCommand>,
    chart_area: Rect,
}

impl<'a> PageViewer<'a> {
    fn new(store: &'a VectorStore, spec: &'static PageSpec, policy: TotalPolicy, lang: Language) -> Self {
        // Tab walks the pages of the section the page belongs to.
        let pages = catalog::SECTIONS
            .iter()
            .find(|s| s.has_anchor(spec.anchor))
            .map_or_else(|| vec![spec], |s| s.pages.to_vec());
        let index = pages.iter().position(|p| p.anchor == spec.anchor).unwrap_or(0);
        Self {
            store,
            policy,
            pages,
            index,
            page: commands::open_page(store, spec, policy),
            lang,
            focus: 0,
            chart: Vec::new(),
            chart_area: Rect::default(),
        }
    }

    fn series_count(&self) -> usize {
        self.page
            .chart_data(self.lang)
            .map_or(0, |data| data.series.len())
    }

    fn show(&mut self, index: usize) {
        self.page.unmount();
        self.index = index % self.pages.len();
        let spec = self.pages[self.index];
        self.page = commands::open_page(self.store, spec, self.policy);
        self.focus = 0;
        tracing::debug!(page = spec.anchor, "page opened");
    }

    fn move_focus(&mut self, forward: bool) {
        let count = self.series_count();
        if count == 0 {
            return;
        }
        self.focus = if forward {
            (self.focus + 1) % count
        } else {
            (self.focus + count - 1) % count
        };
    }

    fn layout(&self, area: Rect) -> [Rect; 5] {
        let bullets = self.page.bullets(self.lang).len() as u16;
        let table = match self.page.table(self.lang) {
            Some(t) if self.page.table_disclosure().is_open() => t.rows.len() as u16 + 2,
            _ => 0,
        };
        Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(8),
            Constraint::Length(bullets),
            Constraint::Length(table),
            Constraint::Length(1),
        ])
        .areas(area)
    }

    fn draw(&self, frame: &mut Frame) {
        let [header, chart, bullets, table, footer] = self.layout(frame.area());
        let spec = self.page.spec();

        let title = format!(
            " {} | {} ({}/{}) ",
            spec.title(self.lang),
            spec.anchor,
            self.index + 1,
            self.pages.len()
        );
        frame.render_widget(
            Block::default()
                .title(title)
                .style(Style::default().fg(Color::White).bg(Color::DarkGray)),
            header,
        );
        frame.render_widget(ChartWidget { commands: &self.chart }, chart);

        let lines: Vec<Line> = self
            .page
            .bullets(self.lang)
            .into_iter()
            .map(|b| Line::from(format!("• {b}")))
            .collect();
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), bullets);

        if table.height > 0
            && let Some(t) = self.page.table(self.lang)
        {
            frame.render_widget(table_widget(&t), table);
        }

        let focused = self
            .page
            .tooltip(encode_item(self.focus, factbook_core::views::WHOLE_SERIES), self.lang)
            .unwrap_or_default();
        let help = format!(
            " [{focused}] ←→ series | space select | i isolate | t {} | l {} | tab page | q quit ",
            self.page.table_disclosure().button_label(self.lang),
            self.lang.toggled().code()
        );
        frame.render_widget(
            Paragraph::new(help).style(Style::default().fg(Color::Gray).bg(Color::DarkGray)),
            footer,
        );
    }

    /// Handle one key. Returns `false` to quit.
    fn key(&mut self, code: KeyCode) -> bool {
        let whole = |series| encode_item(series, factbook_core::views::WHOLE_SERIES);
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return false,
            KeyCode::Left => self.move_focus(false),
            KeyCode::Right => self.move_focus(true),
            KeyCode::Char(' ') | KeyCode::Enter => self.page.click(whole(self.focus)),
            KeyCode::Char('i') => self.page.double_click(whole(self.focus)),
            KeyCode::Char('t') => {
                self.page.toggle_table();
            }
            KeyCode::Char('l') => self.lang = self.lang.toggled(),
            KeyCode::Tab => self.show(self.index + 1),
            KeyCode::BackTab => self.show(self.index + self.pages.len() - 1),
            _ => {}
        }
        true
    }

    fn mouse(&mut self, col: u16, row: u16, isolate: bool) {
        let area = self.chart_area;
        if col < area.x || row < area.y || col >= area.x + area.width || row >= area.y + area.height {
            return;
        }
        if let Some(id) = hit_test(&self.chart, cell_center(col - area.x, row - area.y)) {
            if isolate {
                self.page.double_click(id);
            } else {
                self.page.click(id);
            }
        }
    }
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    viewer: &mut PageViewer<'_>,
) -> Result<()> {
    loop {
        let size = terminal.size()?;
        let [_, chart_area, ..] = viewer.layout(Rect::new(0, 0, size.width, size.height));
        viewer.chart_area = chart_area;
        viewer.chart = viewer.page.chart(&chart_viewport(chart_area), viewer.lang);

        terminal.draw(|frame| viewer.draw(frame))?;

        if event::poll(std::time::Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if !viewer.key(key.code) {
                        return Ok(());
                    }
                }
                Event::Mouse(mouse) => match mouse.kind {
                    MouseEventKind::Down(MouseButton::Left) => viewer.mouse(mouse.column, mouse.row, false),
                    MouseEventKind::Down(MouseButton::Right) => viewer.mouse(mouse.column, mouse.row, true),
                    _ => {}
                },
                _ => {}
            }
        }
    }
}

pub fn render_tui(store: &VectorStore, spec: &'static PageSpec, policy: TotalPolicy, lang: Language) -> Result<()> {
    let mut viewer = PageViewer::new(store, spec, policy, lang);

    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, &mut viewer);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use factbook_protocol::Rect as ChartRect;

    fn bar(x: f64, item: u64, color: ThemeToken, dimmed: bool) -> RenderCommand {
        RenderCommand::DrawRect {
            rect: ChartRect::new(x, 0.0, CELL_W * 2.0, CELL_H * 2.0),
            color,
            border_color: None,
            label: None,
            item_id: Some(item),
            dimmed,
        }
    }

    #[test]
    fn cells_take_the_color_of_the_shape_under_them() {
        let cmds = [
            bar(0.0, 1, ThemeToken::Series1, false),
            bar(CELL_W * 2.0, 2, ThemeToken::Series2, true),
        ];
        assert_eq!(fill_at(&cmds, cell_center(0, 1)), Some((ThemeToken::Series1, false)));
        assert_eq!(fill_at(&cmds, cell_center(3, 0)), Some((ThemeToken::Series2, true)));
        assert_eq!(fill_at(&cmds, cell_center(5, 0)), None);
    }

    #[test]
    fn widget_draws_blocks_and_text() {
        let cmds = [
            bar(0.0, 1, ThemeToken::Series1, false),
            RenderCommand::DrawText {
                position: Point::new(CELL_W * 4.0, CELL_H * 3.0),
                text: "2022".into(),
                color: ThemeToken::TextPrimary,
                font_size: 11.0,
                align: TextAlign::Left,
            },
        ];
        let area = Rect::new(0, 0, 10, 4);
        let mut buf = Buffer::empty(area);
        ChartWidget { commands: &cmds }.render(area, &mut buf);
        assert_eq!(buf[(0, 0)].symbol(), "█");
        assert_eq!(buf[(0, 0)].fg, Color::Blue);
        assert_eq!(buf[(4, 2)].symbol(), "2");
        assert_eq!(buf[(7, 2)].symbol(), "2");
        assert_eq!(buf[(9, 3)].symbol(), " ");
    }

    #[test]
    fn viewer_walks_the_section_and_wraps() {
        let (store, _) = commands::store_from_bytes(include_bytes!("../../core/tests/fixtures/data.csv"), None).unwrap();
        let mut viewer = PageViewer::new(&store, &catalog::PAGE_25, TotalPolicy::PreferProvided, Language::En);
        assert_eq!(viewer.index, 1);
        assert!(viewer.key(KeyCode::BackTab));
        assert_eq!(viewer.page.spec().anchor, "page-24");
        assert!(viewer.key(KeyCode::BackTab));
        assert_eq!(viewer.page.spec().anchor, "page-28");
        assert!(!viewer.key(KeyCode::Char('q')));
    }

    #[test]
    fn space_toggles_the_focused_series() {
        let (store, _) = commands::store_from_bytes(include_bytes!("../../core/tests/fixtures/data.csv"), None).unwrap();
        let mut viewer = PageViewer::new(&store, &catalog::PAGE_24, TotalPolicy::PreferProvided, Language::En);
        viewer.key(KeyCode::Right);
        assert_eq!(viewer.focus, 1);
        viewer.key(KeyCode::Char(' '));
        assert!(viewer.page.selection().contains(1));
        viewer.key(KeyCode::Left);
        viewer.key(KeyCode::Left);
        assert_eq!(viewer.focus, 2);
    }
}
