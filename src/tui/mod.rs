//! Ratatui-based terminal UI.
//!
//! The TUI provides a district search box with a suggestion panel, then
//! renders the selected district's year table and absenteeism chart. The
//! dataset loads on a background thread; the event loop polls for its
//! outcome between input events.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Row, Table},
};

use crate::data::{DatasetConfig, LoadHandle, LoadOutcome, spawn_load};
use crate::domain::{DistrictRecord, TableRow};
use crate::error::{AppError, EXIT_UI};
use crate::report::{VALUE_HEADING, YEAR_HEADING};

mod plotters_chart;

use plotters_chart::{AbsenteeChart, ChartSlot, SeriesChart};

/// Banner shown when the dataset cannot be loaded.
pub const LOAD_FAILED_MESSAGE: &str = "Failed to load data. Please try again later.";

const CHART_X_LABEL: &str = "School Year";
const CHART_Y_LABEL: &str = "Chronic Absent Percent";

/// Start the TUI.
pub fn run(config: DatasetConfig) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(EXIT_UI, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(config);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen, mouse) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode()
            .map_err(|e| AppError::new(EXIT_UI, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen, EnableMouseCapture) {
            let _ = disable_raw_mode();
            return Err(AppError::new(EXIT_UI, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), DisableMouseCapture, LeaveAlternateScreen);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoadState {
    Loading,
    Ready,
    Failed,
}

/// Table content for the current selection.
#[derive(Debug, Clone)]
struct Selection {
    district: String,
    rows: Vec<TableRow>,
}

struct App {
    source: String,
    loader: LoadHandle,
    load_state: LoadState,
    records: Vec<DistrictRecord>,
    query: String,
    /// Positions in `records`, dataset order.
    suggestions: Vec<usize>,
    suggestions_visible: bool,
    highlighted: usize,
    /// Kept across frames so the list scroll offset is known to the mouse handler.
    suggestion_list: ListState,
    selection: Option<Selection>,
    chart: ChartSlot,
    status: String,
    /// Screen regions from the last draw, for mouse hit-testing.
    search_area: Rect,
    suggestion_area: Option<Rect>,
}

impl App {
    fn new(config: DatasetConfig) -> Self {
        let source = config.source.to_string();
        Self::with_loader(source, spawn_load(config))
    }

    fn with_loader(source: String, loader: LoadHandle) -> Self {
        Self {
            status: format!("Loading district data from {source}..."),
            source,
            loader,
            load_state: LoadState::Loading,
            records: Vec::new(),
            query: String::new(),
            suggestions: Vec::new(),
            suggestions_visible: false,
            highlighted: 0,
            suggestion_list: ListState::default(),
            selection: None,
            chart: ChartSlot::default(),
            search_area: Rect::default(),
            suggestion_area: None,
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if self.poll_loader() {
                needs_redraw = true;
            }

            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(EXIT_UI, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(EXIT_UI, format!("Event poll error: {e}")))? {
                continue;
            }

            match event::read().map_err(|e| AppError::new(EXIT_UI, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Mouse(mouse) => {
                    self.handle_mouse(mouse);
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Apply the load outcome if it has arrived. Returns `true` on change.
    fn poll_loader(&mut self) -> bool {
        let Some(outcome) = self.loader.poll() else {
            return false;
        };

        match outcome {
            LoadOutcome::Loaded(records) => {
                self.status = format!("{} districts loaded from {}.", records.len(), self.source);
                self.records = records;
                self.load_state = LoadState::Ready;
            }
            LoadOutcome::Failed(err) => {
                tracing::error!(source = %self.source, error = %err, "dataset load failed");
                self.status = LOAD_FAILED_MESSAGE.to_string();
                self.load_state = LoadState::Failed;
            }
        }
        true
    }

    /// Returns `true` when the app should quit.
    fn handle_key(&mut self, key: KeyEvent) -> bool {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('c') if ctrl => return true,
            KeyCode::Char('u') if ctrl => {
                self.query.clear();
                self.refresh_suggestions();
            }
            KeyCode::Char(c) if !ctrl => {
                self.query.push(c);
                self.refresh_suggestions();
            }
            KeyCode::Backspace => {
                self.query.pop();
                self.refresh_suggestions();
            }
            KeyCode::Up => {
                self.highlighted = self.highlighted.saturating_sub(1);
            }
            KeyCode::Down => {
                if self.highlighted + 1 < self.suggestions.len() {
                    self.highlighted += 1;
                }
            }
            KeyCode::Enter => {
                if self.suggestions_visible {
                    self.select_suggestion(self.highlighted);
                }
            }
            KeyCode::Left => {
                if let Some(chart) = self.chart.get_mut() {
                    chart.focus_prev();
                }
            }
            KeyCode::Right => {
                if let Some(chart) = self.chart.get_mut() {
                    chart.focus_next();
                }
            }
            KeyCode::Esc => {
                if !self.suggestions_visible {
                    return true;
                }
                self.hide_suggestions();
            }
            _ => {}
        }
        false
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        if !matches!(mouse.kind, MouseEventKind::Down(_)) {
            return;
        }
        let (x, y) = (mouse.column, mouse.row);

        if let Some(area) = self.suggestion_area.filter(|_| self.suggestions_visible) {
            if contains(area, x, y) {
                // Rows 0 and `height - 1` are the panel border.
                let row = y - area.y;
                if row >= 1 && row + 1 < area.height {
                    let pos = self.suggestion_list.offset() + usize::from(row - 1);
                    self.select_suggestion(pos);
                }
                return;
            }
        }

        if !contains(self.search_area, x, y) {
            self.hide_suggestions();
        }
    }

    fn refresh_suggestions(&mut self) {
        self.suggestions = crate::search::search_indices(&self.records, &self.query);
        self.highlighted = 0;
        self.suggestion_list = ListState::default();
        self.suggestions_visible = !self.suggestions.is_empty();
    }

    fn hide_suggestions(&mut self) {
        self.suggestions_visible = false;
    }

    fn select_suggestion(&mut self, pos: usize) {
        let Some(&idx) = self.suggestions.get(pos) else {
            return;
        };
        let series = crate::series::extract_series(&self.records[idx]);

        self.query = series.district.clone();
        self.hide_suggestions();
        tracing::info!(district = %series.district, years = series.len(), "district selected");

        self.selection = Some(Selection {
            district: series.district.clone(),
            rows: crate::report::table_rows(&series),
        });
        self.chart.replace(SeriesChart::new(&series));
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let banner_height = if self.load_state == LoadState::Failed { 3 } else { 0 };
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(banner_height),
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(3),
            ])
            .split(size);

        self.draw_header(frame, chunks[0]);
        if banner_height > 0 {
            self.draw_error_banner(frame, chunks[1]);
        }
        self.draw_search(frame, chunks[2]);
        self.draw_results(frame, chunks[3]);
        self.draw_footer(frame, chunks[4]);

        // Drawn last so the panel overlays the results.
        self.draw_suggestions(frame, chunks[2], chunks[3]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let (text, style) = match self.load_state {
            LoadState::Loading => (
                "Loading district data...".to_string(),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
            LoadState::Ready => (
                format!("{} districts", self.records.len()),
                Style::default().fg(Color::Gray),
            ),
            LoadState::Failed => ("No data".to_string(), Style::default().fg(Color::Red)),
        };

        let line = Line::from(vec![
            Span::styled("absence", Style::default().fg(Color::Cyan)),
            Span::raw(" | district chronic absenteeism | "),
            Span::styled(text, style),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_error_banner(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let p = Paragraph::new(LOAD_FAILED_MESSAGE)
            .style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD))
            .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Red)));
        frame.render_widget(p, area);
    }

    fn draw_search(&mut self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        self.search_area = area;

        let p = Paragraph::new(self.query.as_str())
            .block(Block::default().title("Search district").borders(Borders::ALL));
        frame.render_widget(p, area);

        let cursor_x = area.x + 1 + self.query.chars().count() as u16;
        if cursor_x < area.x + area.width.saturating_sub(1) {
            frame.set_cursor_position((cursor_x, area.y + 1));
        }
    }

    fn draw_suggestions(&mut self, frame: &mut ratatui::Frame<'_>, search: Rect, below: Rect) {
        if !self.suggestions_visible || self.suggestions.is_empty() {
            self.suggestion_area = None;
            return;
        }

        let wanted = self.suggestions.len() as u16 + 2;
        let area = Rect {
            x: search.x,
            y: search.y + search.height,
            width: search.width,
            height: wanted.min(below.height),
        };
        self.suggestion_area = Some(area);

        let items: Vec<ListItem> = self
            .suggestions
            .iter()
            .map(|&idx| ListItem::new(self.records[idx].display_name().to_string()))
            .collect();

        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        self.suggestion_list.select(Some(self.highlighted));
        frame.render_widget(Clear, area);
        frame.render_stateful_widget(list, area, &mut self.suggestion_list);
    }

    fn draw_results(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let Some(selection) = &self.selection else {
            let hint = match self.load_state {
                LoadState::Loading => "Waiting for data...",
                LoadState::Ready => "Type at least 2 characters to search for a district.",
                LoadState::Failed => "",
            };
            let p = Paragraph::new(hint)
                .style(Style::default().fg(Color::Gray))
                .block(Block::default().borders(Borders::ALL));
            frame.render_widget(p, area);
            return;
        };

        let block = Block::default()
            .title(Span::styled(
                selection.district.as_str(),
                Style::default().add_modifier(Modifier::BOLD),
            ))
            .borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(36), Constraint::Min(0)])
            .split(inner);

        self.draw_table(frame, chunks[0], &selection.rows);
        self.draw_chart(frame, chunks[1]);
    }

    fn draw_table(&self, frame: &mut ratatui::Frame<'_>, area: Rect, rows: &[TableRow]) {
        let header = Row::new(vec![YEAR_HEADING, VALUE_HEADING])
            .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));
        let body: Vec<Row> = rows
            .iter()
            .map(|r| Row::new(vec![r.label.clone(), r.display.clone()]))
            .collect();

        let table = Table::new(body, [Constraint::Length(12), Constraint::Length(20)])
            .header(header)
            .block(Block::default().borders(Borders::RIGHT));
        frame.render_widget(table, area);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let Some(chart) = self.chart.get() else {
            return;
        };

        let title = chart.tooltip().unwrap_or_default();
        let block = Block::default().title(Span::styled(title, Style::default().fg(Color::Yellow)));
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let widget = AbsenteeChart {
            chart,
            x_label: CHART_X_LABEL,
            y_label: CHART_Y_LABEL,
        };
        frame.render_widget(widget, inner);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "type to search  ↑/↓ pick  Enter select  ←/→ inspect year  Esc close/quit";
        let status_style = match self.load_state {
            LoadState::Failed => Style::default().fg(Color::Red),
            _ => Style::default().fg(Color::Yellow),
        };
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, status_style),
        ]);
        let p = Paragraph::new(Text::from(line)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn contains(area: Rect, x: u16, y: u16) -> bool {
    x >= area.x && x < area.x + area.width && y >= area.y && y < area.y + area.height
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::MouseButton;
    use ratatui::backend::TestBackend;
    use std::sync::mpsc;

    fn record(name: &str, fields: &[(&str, &str)]) -> DistrictRecord {
        DistrictRecord::new(
            Some(name.to_string()),
            fields
                .iter()
                .map(|(k, v)| (k.to_string(), Some(v.to_string())))
                .collect(),
        )
    }

    fn dataset() -> Vec<DistrictRecord> {
        vec![
            record("Lincoln Unified", &[("20192020", "12.5"), ("20202021", "NA")]),
            record("Oakland Unified", &[("20192020", "20.1"), ("20202021", "25.3")]),
            record("Lincoln East", &[("20192020", "7"), ("20202021", "8")]),
        ]
    }

    fn app_with(outcome: Option<LoadOutcome>) -> (App, mpsc::Sender<LoadOutcome>) {
        let (tx, rx) = mpsc::channel();
        let mut app = App::with_loader("test.csv".to_string(), LoadHandle::from_receiver(rx));
        if let Some(outcome) = outcome {
            tx.send(outcome).unwrap();
            assert!(app.poll_loader());
        }
        (app, tx)
    }

    fn type_str(app: &mut App, s: &str) {
        for c in s.chars() {
            app.handle_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE));
        }
    }

    fn press(app: &mut App, code: KeyCode) -> bool {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn click(app: &mut App, column: u16, row: u16) {
        app.handle_mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        });
    }

    fn suggestion_names(app: &App) -> Vec<&str> {
        app.suggestions
            .iter()
            .map(|&i| app.records[i].display_name())
            .collect()
    }

    fn render(app: &mut App) -> String {
        render_rows(app, 100, 30).concat()
    }

    fn render_rows(app: &mut App, width: u16, height: u16) -> Vec<String> {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|f| app.draw(f)).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .chunks(usize::from(width))
            .map(|row| row.iter().map(|cell| cell.symbol()).collect())
            .collect()
    }

    #[test]
    fn search_finds_nothing_while_loading() {
        let (mut app, _tx) = app_with(None);
        type_str(&mut app, "linc");
        assert_eq!(app.load_state, LoadState::Loading);
        assert!(app.suggestions.is_empty());
        assert!(!app.suggestions_visible);
    }

    #[test]
    fn typing_shows_matches_in_dataset_order() {
        let (mut app, _tx) = app_with(Some(LoadOutcome::Loaded(dataset())));
        type_str(&mut app, "linc");
        assert!(app.suggestions_visible);
        assert_eq!(suggestion_names(&app), vec!["Lincoln Unified", "Lincoln East"]);
    }

    #[test]
    fn short_or_unmatched_query_hides_panel() {
        let (mut app, _tx) = app_with(Some(LoadOutcome::Loaded(dataset())));
        type_str(&mut app, "li");
        assert!(app.suggestions_visible);
        press(&mut app, KeyCode::Backspace);
        assert!(!app.suggestions_visible);

        type_str(&mut app, "zzz");
        assert!(!app.suggestions_visible);
    }

    #[test]
    fn enter_selects_highlighted_suggestion() {
        let (mut app, _tx) = app_with(Some(LoadOutcome::Loaded(dataset())));
        type_str(&mut app, "linc");
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.query, "Lincoln Unified");
        assert!(!app.suggestions_visible);

        let selection = app.selection.as_ref().unwrap();
        assert_eq!(selection.district, "Lincoln Unified");
        assert_eq!(
            selection.rows,
            vec![
                TableRow { label: "2020-2021".to_string(), display: "N/A".to_string() },
                TableRow { label: "2019-2020".to_string(), display: "12.5%".to_string() },
            ]
        );

        let chart = app.chart.get().unwrap();
        assert_eq!(chart.labels, vec!["2019-2020", "2020-2021"]);
        assert_eq!(chart.values, vec![Some(12.5), None]);
    }

    #[test]
    fn reselecting_replaces_the_chart() {
        let (mut app, _tx) = app_with(Some(LoadOutcome::Loaded(dataset())));
        type_str(&mut app, "linc");
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.chart.get().unwrap().district, "Lincoln East");

        app.handle_key(KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL));
        type_str(&mut app, "oak");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.chart.get().unwrap().district, "Oakland Unified");
        assert_eq!(app.selection.as_ref().unwrap().district, "Oakland Unified");
    }

    #[test]
    fn escape_closes_panel_then_quits() {
        let (mut app, _tx) = app_with(Some(LoadOutcome::Loaded(dataset())));
        type_str(&mut app, "linc");
        assert!(!press(&mut app, KeyCode::Esc));
        assert!(!app.suggestions_visible);
        assert!(press(&mut app, KeyCode::Esc));
    }

    #[test]
    fn arrows_move_chart_tooltip() {
        let (mut app, _tx) = app_with(Some(LoadOutcome::Loaded(dataset())));
        type_str(&mut app, "lincoln uni");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.chart.get().unwrap().tooltip().as_deref(), Some("2020-2021: N/A"));
        press(&mut app, KeyCode::Left);
        assert_eq!(
            app.chart.get().unwrap().tooltip().as_deref(),
            Some("12.5% Chronically Absent")
        );
    }

    #[test]
    fn click_on_suggestion_selects_it() {
        let (mut app, _tx) = app_with(Some(LoadOutcome::Loaded(dataset())));
        type_str(&mut app, "linc");
        render(&mut app);

        let area = app.suggestion_area.unwrap();
        // Second suggestion row (row 0 is the border).
        click(&mut app, area.x + 2, area.y + 2);
        assert_eq!(app.query, "Lincoln East");
        assert!(!app.suggestions_visible);
        assert_eq!(app.selection.as_ref().unwrap().district, "Lincoln East");
    }

    #[test]
    fn click_after_scrolling_selects_the_row_shown() {
        let districts = (0..10)
            .map(|i| record(&format!("District {i}"), &[("20192020", "5")]))
            .collect();
        let (mut app, _tx) = app_with(Some(LoadOutcome::Loaded(districts)));
        type_str(&mut app, "district");
        for _ in 0..6 {
            press(&mut app, KeyCode::Down);
        }

        // A short terminal clips the panel, so the list scrolls to keep the
        // highlighted row visible.
        let screen = render_rows(&mut app, 60, 15);
        let area = app.suggestion_area.unwrap();
        let offset = app.suggestion_list.offset();
        assert!(offset > 0);

        let expected = format!("District {offset}");
        assert!(screen[usize::from(area.y + 1)].contains(&expected));

        click(&mut app, area.x + 2, area.y + 1);
        assert_eq!(app.selection.as_ref().unwrap().district, expected);
        assert_eq!(app.query, expected);
    }

    #[test]
    fn click_on_panel_border_selects_nothing() {
        let (mut app, _tx) = app_with(Some(LoadOutcome::Loaded(dataset())));
        type_str(&mut app, "linc");
        render(&mut app);

        let area = app.suggestion_area.unwrap();
        click(&mut app, area.x + 2, area.y + area.height - 1);
        assert!(app.selection.is_none());
        assert!(app.suggestions_visible);
    }

    #[test]
    fn click_outside_search_dismisses_panel() {
        let (mut app, _tx) = app_with(Some(LoadOutcome::Loaded(dataset())));
        type_str(&mut app, "linc");
        render(&mut app);

        let search = app.search_area;
        click(&mut app, search.x + 1, search.y + 1);
        assert!(app.suggestions_visible);

        click(&mut app, 0, 29);
        assert!(!app.suggestions_visible);
        assert!(app.selection.is_none());
    }

    #[test]
    fn load_failure_shows_banner_and_search_stays_empty() {
        let (mut app, _tx) = app_with(Some(LoadOutcome::Failed(AppError::data_load("boom"))));
        assert_eq!(app.load_state, LoadState::Failed);

        type_str(&mut app, "linc");
        assert!(app.suggestions.is_empty());

        let screen = render(&mut app);
        assert!(screen.contains(LOAD_FAILED_MESSAGE));
        assert!(!screen.contains("boom"));
    }

    #[test]
    fn loading_indicator_clears_after_load() {
        let (mut app, tx) = app_with(None);
        assert!(render(&mut app).contains("Loading district data..."));

        tx.send(LoadOutcome::Loaded(dataset())).unwrap();
        assert!(app.poll_loader());
        assert!(!app.poll_loader());

        let screen = render(&mut app);
        assert!(!screen.contains("Loading district data..."));
        assert!(screen.contains("3 districts"));
    }
}
