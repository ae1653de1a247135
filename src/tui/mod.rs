//! Ratatui-based terminal UI.
//!
//! The TUI provides a selection panel (sex, grade, purchase and sale bracket,
//! cost of gain, target ADG), a price-by-weight chart of the chosen slice, and
//! the resulting value-of-gain metrics.

use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};

use crate::app::pipeline::{SharedCache, open_cache};
use crate::cli::TuiArgs;
use crate::domain::NormalizedReport;
use crate::error::{AppError, ReportError};
use crate::report::fmt_money;

mod plotters_chart;
pub mod state;

use plotters_chart::{PriceChart, price_series};
use state::{Field, Selection};

/// Start the TUI.
pub fn run(args: TuiArgs) -> Result<(), AppError> {
    // Resolve settings and credentials before touching the terminal so a
    // configuration error prints normally.
    let assumptions = args.feed.to_assumptions()?;
    let cache = open_cache(&args.source.to_config())?;

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(cache, Selection::new(assumptions));
    terminal
        .draw(|f| app.draw(f))
        .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
    app.load(false);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

struct App {
    cache: SharedCache,
    report: Option<Arc<NormalizedReport>>,
    /// Last fetch failure; shown instead of results while no snapshot exists.
    error: Option<ReportError>,
    selection: Selection,
    status: String,
}

impl App {
    fn new(cache: SharedCache, selection: Selection) -> Self {
        Self {
            cache,
            report: None,
            error: None,
            selection,
            status: "Fetching market report...".to_string(),
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))? {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
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

    /// Returns `true` when the user asked to quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Up => self.selection.prev_field(),
            KeyCode::Down => self.selection.next_field(),
            KeyCode::Left => self.adjust(-1),
            KeyCode::Right => self.adjust(1),
            KeyCode::Char('r') => self.load(false),
            KeyCode::Char('R') => self.load(true),
            KeyCode::Char('e') => self.export(),
            KeyCode::Char('d') => self.write_debug(),
            _ => {}
        }
        false
    }

    fn adjust(&mut self, delta: i32) {
        let Some(report) = &self.report else {
            self.status = "No market data loaded.".to_string();
            return;
        };
        self.selection.adjust(report, delta);
        self.status = self.describe_field(report);
    }

    /// Pull the snapshot from the cache; `force` bypasses the TTL.
    fn load(&mut self, force: bool) {
        let outcome = if force {
            self.cache.refresh()
        } else {
            self.cache.get_or_refresh()
        };

        match outcome {
            Ok(report) => {
                let replaced = self
                    .report
                    .as_ref()
                    .is_none_or(|current| !Arc::ptr_eq(current, &report));
                if replaced {
                    if self.report.is_none() {
                        self.selection.reset_brackets(&report);
                    }
                    self.selection.clamp_to(&report);
                }
                self.status = format!(
                    "Report date {} ({} brackets){}",
                    report.report_date.as_deref().unwrap_or("-"),
                    report.entries.len(),
                    if replaced { "" } else { " [cached]" }
                );
                self.report = Some(report);
                self.error = None;
            }
            Err(err) => {
                self.status = err.to_string();
                self.error = Some(err);
            }
        }
    }

    fn export(&mut self) {
        let Some(report) = &self.report else {
            self.status = "No market data to export.".to_string();
            return;
        };
        let path = std::path::PathBuf::from(format!(
            "vog_table_{}.csv",
            chrono::Local::now().format("%Y%m%d_%H%M%S")
        ));
        self.status = match crate::io::export::write_table_csv(&path, report) {
            Ok(()) => format!("Exported table: {}", path.display()),
            Err(err) => format!("Export failed: {err}"),
        };
    }

    fn write_debug(&mut self) {
        let Some(report) = &self.report else {
            self.status = "No market data loaded.".to_string();
            return;
        };
        let source = self.cache.source().describe();
        self.status = match crate::debug::write_debug_bundle(std::path::Path::new("."), report, &source) {
            Ok(path) => format!("Wrote debug bundle: {}", path.display()),
            Err(err) => format!("Debug write failed: {err}"),
        };
    }

    fn describe_field(&self, report: &NormalizedReport) -> String {
        let s = &self.selection;
        match s.field {
            Field::Sex => format!("sex: {}", s.sex(report).map(|x| x.to_string()).unwrap_or_default()),
            Field::Grade => format!("grade: {}", s.grade(report).unwrap_or_default()),
            Field::Purchase => format!(
                "purchase: {}",
                s.purchase(report).map(|e| e.weight_range.as_str()).unwrap_or("-")
            ),
            Field::Sale => format!(
                "sale: {}",
                s.sale(report).map(|e| e.weight_range.as_str()).unwrap_or("-")
            ),
            Field::CostOfGain => format!("cost of gain: ${:.2}/lb", s.cost_of_gain()),
            Field::TargetAdg => format!("target ADG: {:.1} lbs/day", s.target_adg()),
        }
    }

    fn draw(&self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("vog", Style::default().fg(Color::Cyan)),
            Span::raw(" - feeder cattle value of gain"),
        ]));

        let date = self
            .report
            .as_ref()
            .and_then(|r| r.report_date.clone())
            .unwrap_or_else(|| "-".to_string());
        let age = self
            .cache
            .age_at(Instant::now())
            .map(|d| format!("{}m ago", d.as_secs() / 60))
            .unwrap_or_else(|| "-".to_string());

        lines.push(Line::from(Span::styled(
            format!(
                "source: {} | report date: {date} | fetched: {age}",
                self.cache.source().describe()
            ),
            Style::default().fg(Color::Gray),
        )));

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let Some(report) = &self.report else {
            let msg = match &self.error {
                Some(err) => Paragraph::new(format!("{err}\n\nPress r to retry after the cache expires, R to force a refresh, q to quit."))
                    .style(Style::default().fg(Color::Red)),
                None => Paragraph::new("Waiting for data...").style(Style::default().fg(Color::Yellow)),
            };
            frame.render_widget(
                msg.wrap(Wrap { trim: true })
                    .block(Block::default().title("Status").borders(Borders::ALL)),
                area,
            );
            return;
        };

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(44), Constraint::Min(0)])
            .split(area);
        let left = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(8), Constraint::Min(0)])
            .split(columns[0]);

        self.draw_settings(frame, left[0], report);
        self.draw_results(frame, left[1], report);
        self.draw_chart(frame, columns[1], report);
    }

    fn draw_settings(&self, frame: &mut ratatui::Frame<'_>, area: Rect, report: &NormalizedReport) {
        let s = &self.selection;
        let bracket_label = |e: Option<&crate::domain::MarketEntry>| {
            e.map(|e| format!("{} ({:.0} lbs, ${:.2})", e.weight_range, e.avg_weight, e.avg_price))
                .unwrap_or_else(|| "-".to_string())
        };

        let items = vec![
            ListItem::new(format!(
                "Sex:      {}",
                s.sex(report).map(|x| x.to_string()).unwrap_or_else(|| "-".to_string())
            )),
            ListItem::new(format!("Grade:    {}", s.grade(report).unwrap_or_else(|| "-".to_string()))),
            ListItem::new(format!("Purchase: {}", bracket_label(s.purchase(report)))),
            ListItem::new(format!("Sale:     {}", bracket_label(s.sale(report)))),
            ListItem::new(format!("COG:      ${:.2}/lb", s.cost_of_gain())),
            ListItem::new(format!("ADG:      {:.1} lbs/day", s.target_adg())),
        ];

        let list = List::new(items)
            .block(Block::default().title("Selection").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ListState::default();
        state.select(Some(s.field.index()));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_results(&self, frame: &mut ratatui::Frame<'_>, area: Rect, report: &NormalizedReport) {
        let block = Block::default().title("Value of Gain").borders(Borders::ALL);

        let text = match self.selection.outcome(report) {
            None => Text::from(Line::from(Span::styled(
                "Select a purchase and a sale bracket.",
                Style::default().fg(Color::Yellow),
            ))),
            Some(Ok(r)) => {
                let profit_color = if r.net_profit >= 0.0 { Color::Green } else { Color::Red };
                Text::from(vec![
                    Line::from(format!("Purchase value: {}", fmt_money(r.purchase_value))),
                    Line::from(format!("Sale value:     {}", fmt_money(r.sale_value))),
                    Line::from(format!("Gain:           {:.0} lbs", r.gain)),
                    Line::from(format!("VOG:            ${:.2}/lb", r.value_of_gain)),
                    Line::from(format!("ROG:            ${:.2}/lb", r.return_on_gain)),
                    Line::from(Span::styled(
                        format!("Net profit:     {}/head", fmt_money(r.net_profit)),
                        Style::default().fg(profit_color).add_modifier(Modifier::BOLD),
                    )),
                    Line::from(format!("Days on feed:   {}", r.whole_days())),
                ])
            }
            Some(Err(err)) if err.is_recoverable() => Text::from(Line::from(Span::styled(
                err.to_string(),
                Style::default().fg(Color::Yellow),
            ))),
            Some(Err(err)) => Text::from(Line::from(Span::styled(
                err.to_string(),
                Style::default().fg(Color::Red),
            ))),
        };

        frame.render_widget(
            Paragraph::new(text).wrap(Wrap { trim: true }).block(block),
            area,
        );
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect, report: &NormalizedReport) {
        let title = match (self.selection.sex(report), self.selection.grade(report)) {
            (Some(sex), Some(grade)) => format!("Price by weight - {sex} / {grade}"),
            _ => "Price by weight".to_string(),
        };
        let block = Block::default().title(title).borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let points: Vec<(f64, f64)> = self
            .selection
            .brackets(report)
            .iter()
            .map(|e| (e.avg_weight, e.avg_price))
            .collect();
        if points.is_empty() {
            frame.render_widget(
                Paragraph::new("No brackets for this slice.").style(Style::default().fg(Color::Yellow)),
                inner,
            );
            return;
        }

        let (curve, x_bounds, y_bounds) = price_series(&points);
        let widget = PriceChart {
            curve: &curve,
            purchase: self.selection.purchase(report).map(|e| (e.avg_weight, e.avg_price)),
            sale: self.selection.sale(report).map(|e| (e.avg_weight, e.avg_price)),
            x_bounds,
            y_bounds,
        };
        frame.render_widget(widget, inner);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ select  ←/→ adjust  r reload  R refresh  e export  d debug  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}
