//! Interactive TUI for browsing the catalog grid and the player

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    prelude::*,
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame, Terminal,
};
use std::io;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::api::{CatalogSource, VideoId};
use crate::catalog::SortKey;
use crate::utils::format_date;
use crate::view::{App, Event as ViewEvent, GridView, Notice, PlayerView, Screen, ViewState};

/// Browser state that lives outside the page runtime
struct BrowserState {
    list_state: ListState,
    /// View the list selection belongs to; a change resets the cursor
    last_view: Option<ViewState>,
    status_message: String,
    /// When the status message was set (for auto-clear timeout)
    status_message_time: Option<Instant>,
    /// Search/filter mode
    search_mode: bool,
    /// Current search query
    search_query: String,
    /// Show help overlay
    show_help: bool,
}

impl BrowserState {
    fn new() -> Self {
        let mut list_state = ListState::default();
        list_state.select(Some(0));

        Self {
            list_state,
            last_view: None,
            status_message: String::new(),
            status_message_time: None,
            search_mode: false,
            search_query: String::new(),
            show_help: false,
        }
    }

    /// Set status message with auto-clear timeout
    fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
        self.status_message_time = Some(Instant::now());
    }

    fn clear_status(&mut self) {
        self.status_message.clear();
        self.status_message_time = None;
    }

    /// Check and clear status message if timeout expired (3 seconds)
    fn check_status_timeout(&mut self) {
        if let Some(time) = self.status_message_time
            && time.elapsed() > Duration::from_secs(3)
        {
            self.clear_status();
        }
    }

    fn show_notice(&mut self, notice: Notice) {
        match notice {
            Notice::Shared { title, link } => match title {
                Some(title) => self.set_status(format!("Share \"{}\": {}", title, link)),
                None => self.set_status(format!("Share: {}", link)),
            },
            Notice::Navigated(url) => self.set_status(format!("Opened {}", url)),
            Notice::ConnectionLost => self.set_status("Connection lost"),
            Notice::ConnectionRestored => self.set_status("Connection restored"),
        }
    }

    /// Keep the list cursor valid for whatever the page now shows
    fn sync_view(&mut self, state: &ViewState, len: usize) {
        if self.last_view.as_ref() != Some(state) {
            self.last_view = Some(state.clone());
            self.list_state.select(Some(0));
        } else if let Some(i) = self.list_state.selected()
            && i >= len
        {
            self.list_state.select(Some(len.saturating_sub(1)));
        }
    }

    fn move_up(&mut self, len: usize) {
        if len == 0 {
            return;
        }

        let i = match self.list_state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.list_state.select(Some(i));
    }

    fn move_down(&mut self, len: usize) {
        if len == 0 {
            return;
        }

        let i = match self.list_state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.list_state.select(Some(i));
    }

    /// Video under the cursor: a grid card or a related item
    fn highlighted(&self, screen: &Screen<'_>) -> Option<VideoId> {
        let idx = self.list_state.selected()?;
        match screen {
            Screen::Grid(grid) => grid.records.get(idx).map(|r| r.id),
            Screen::Player(player) => player.related.get(idx).map(|r| r.id),
            _ => None,
        }
    }
}

/// Number of selectable rows on a screen
fn selectable_len(screen: &Screen<'_>) -> usize {
    match screen {
        Screen::Grid(grid) => grid.records.len(),
        Screen::Player(player) => player.related.len(),
        _ => 0,
    }
}

/// Run the interactive browser until the user quits
pub async fn run_browser<S>(app: &mut App<S>) -> Result<()>
where
    S: CatalogSource + ?Sized,
{
    // Enable TUI mode to suppress stderr logging
    crate::utils::set_tui_mode(true);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut state = BrowserState::new();

    let result = run_browser_loop(&mut terminal, &mut state, app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    // Disable TUI mode to restore normal logging
    crate::utils::set_tui_mode(false);

    result
}

/// Show `message` while the page is busy with a dispatch that may fetch
fn show_busy<S>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    state: &mut BrowserState,
    app: &App<S>,
    message: &str,
) -> Result<()>
where
    S: CatalogSource + ?Sized,
{
    state.set_status(message);
    terminal.draw(|f| draw_ui(f, state, app))?;
    Ok(())
}

async fn run_browser_loop<S>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    state: &mut BrowserState,
    app: &mut App<S>,
) -> Result<()>
where
    S: CatalogSource + ?Sized,
{
    show_busy(terminal, state, app, "Loading...")?;
    app.start().await;
    state.clear_status();

    loop {
        for notice in app.take_notices() {
            state.show_notice(notice);
        }

        let len = selectable_len(&app.screen());
        state.sync_view(app.state(), len);

        // Check for status message timeout
        state.check_status_timeout();

        terminal.draw(|f| draw_ui(f, state, app))?;

        // Handle input
        if event::poll(Duration::from_millis(50))?
            && let Event::Key(key) = event::read()?
        {
            if key.kind != KeyEventKind::Press {
                continue;
            }

            // Any key closes help
            if state.show_help {
                state.show_help = false;
                continue;
            }

            if state.search_mode {
                match key.code {
                    KeyCode::Esc => {
                        state.search_mode = false;
                        state.search_query.clear();
                        app.dispatch(ViewEvent::FilterChanged(String::new())).await;
                    }
                    KeyCode::Enter => {
                        state.search_mode = false;
                    }
                    KeyCode::Backspace => {
                        state.search_query.pop();
                        app.dispatch(ViewEvent::FilterChanged(state.search_query.clone())).await;
                        state.list_state.select(Some(0));
                    }
                    KeyCode::Char(c) => {
                        state.search_query.push(c);
                        app.dispatch(ViewEvent::FilterChanged(state.search_query.clone())).await;
                        state.list_state.select(Some(0));
                    }
                    _ => {}
                }
                continue;
            }

            match key.code {
                KeyCode::Char('q') => return Ok(()),
                KeyCode::Esc => {
                    // Esc clears the filter if active, otherwise acts like back
                    if !app.filter().is_empty() {
                        state.search_query.clear();
                        app.dispatch(ViewEvent::FilterChanged(String::new())).await;
                    } else {
                        show_busy(terminal, state, app, "Going back...")?;
                        let moved = app.back().await;
                        state.clear_status();
                        if !moved {
                            state.set_status("Nothing to go back to");
                        }
                    }
                }
                KeyCode::Up | KeyCode::Char('k') => state.move_up(len),
                KeyCode::Down | KeyCode::Char('j') => state.move_down(len),
                KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => {
                    let target = state.highlighted(&app.screen());
                    if let Some(id) = target {
                        debug!("Selecting video {}", id);
                        show_busy(terminal, state, app, "Loading...")?;
                        app.dispatch(ViewEvent::Select(id)).await;
                        state.clear_status();
                    }
                }
                KeyCode::Backspace | KeyCode::Left | KeyCode::Char('h') => {
                    show_busy(terminal, state, app, "Going back...")?;
                    let moved = app.back().await;
                    state.clear_status();
                    if !moved {
                        state.set_status("Nothing to go back to");
                    }
                }
                KeyCode::Char('f') => {
                    show_busy(terminal, state, app, "Going forward...")?;
                    let moved = app.forward().await;
                    state.clear_status();
                    if !moved {
                        state.set_status("Nothing to go forward to");
                    }
                }
                KeyCode::Char('H') | KeyCode::Home => {
                    show_busy(terminal, state, app, "Loading...")?;
                    app.dispatch(ViewEvent::GoHome).await;
                    state.clear_status();
                }
                KeyCode::Char('s') => {
                    let next = app.sort().next();
                    app.dispatch(ViewEvent::SortChanged(next)).await;
                    state.list_state.select(Some(0));
                    state.set_status(format!("Sorted by {}", next.label()));
                }
                KeyCode::Char('/') => {
                    state.search_mode = true;
                    state.search_query = app.filter().to_string();
                }
                KeyCode::Char('y') => {
                    app.dispatch(ViewEvent::Share).await;
                }
                KeyCode::Char('r') => {
                    show_busy(terminal, state, app, "Retrying...")?;
                    app.dispatch(ViewEvent::Retry).await;
                    state.clear_status();
                }
                KeyCode::Char('?') => {
                    state.show_help = !state.show_help;
                }
                _ => {}
            }
        }
    }
}

fn draw_ui<S>(f: &mut Frame, state: &BrowserState, app: &App<S>)
where
    S: CatalogSource + ?Sized,
{
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(10),   // Body
            Constraint::Length(3), // Footer/help
        ])
        .split(f.area());

    // Header
    let history = app.history();
    let header_text = format!(
        "{}  [{}]  {} videos  {}/{}",
        app.location(),
        app.sort().label(),
        app.store().len(),
        history.position() + 1,
        history.depth()
    );
    let header = Paragraph::new(header_text)
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::BOTTOM));
    f.render_widget(header, chunks[0]);

    let screen = app.screen();
    match &screen {
        Screen::Blank => {}
        Screen::Loading { target } => {
            let text = match target {
                Some(id) => format!("Loading video {}...", id),
                None => "Loading videos...".to_string(),
            };
            let loading = Paragraph::new(text)
                .style(Style::default().fg(Color::Yellow))
                .block(Block::default().borders(Borders::ALL));
            f.render_widget(loading, chunks[1]);
        }
        Screen::Grid(grid) => draw_grid(f, state, grid, chunks[1]),
        Screen::Player(player) => draw_player(f, state, player, chunks[1]),
        Screen::GridError { reason } => {
            let lines = vec![
                Line::styled(
                    "Could not load videos",
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                ),
                Line::from(""),
                Line::from(reason.to_string()),
                Line::from(""),
                Line::styled("Press r to retry", Style::default().fg(Color::DarkGray)),
            ];
            let error = Paragraph::new(lines)
                .block(Block::default().borders(Borders::ALL))
                .wrap(Wrap { trim: false });
            f.render_widget(error, chunks[1]);
        }
        Screen::PlayerError(failure) => {
            let lines = vec![
                Line::styled(
                    "Could not open video",
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                ),
                Line::from(""),
                Line::from(failure.to_string()),
                Line::from(""),
                Line::styled(
                    "Press r to retry, H to return to the catalog",
                    Style::default().fg(Color::DarkGray),
                ),
            ];
            let error = Paragraph::new(lines)
                .block(Block::default().borders(Borders::ALL))
                .wrap(Wrap { trim: false });
            f.render_widget(error, chunks[1]);
        }
    }

    let help_text = match &screen {
        Screen::Grid(_) => "↑/↓: Navigate | Enter: Play | s: Sort | /: Search | ?: Help | q: Quit",
        Screen::Player(_) => "↑/↓: Related | Enter: Play | h: Back | H: Home | y: Share | q: Quit",
        Screen::GridError { .. } | Screen::PlayerError(_) => "r: Retry | h: Back | H: Home | q: Quit",
        Screen::Blank | Screen::Loading { .. } => "q: Quit",
    };

    let footer = Paragraph::new(help_text)
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::TOP));
    f.render_widget(footer, chunks[2]);

    // Search input overlay
    if state.search_mode || !app.filter().is_empty() {
        let (search_text, search_style) = if state.search_mode {
            (format!("Search: {}█", state.search_query), Style::default().fg(Color::Yellow))
        } else {
            (format!("Filter: {} (Esc to clear)", app.filter()), Style::default().fg(Color::Cyan))
        };
        let search = Paragraph::new(search_text)
            .style(search_style)
            .block(Block::default().borders(Borders::ALL).title("Search"));
        let area = centered_rect(60, 3, f.area());
        f.render_widget(Clear, area);
        f.render_widget(search, area);
    }

    // Help overlay
    if state.show_help {
        let sorts: Vec<&str> = SortKey::ALL.iter().map(|key| key.label()).collect();
        let help_lines = vec![
            Line::from("Keyboard Shortcuts"),
            Line::from(""),
            Line::styled("Navigation", Style::default().add_modifier(Modifier::BOLD)),
            Line::from("  ↑/k, ↓/j    Move up/down"),
            Line::from("  Enter/l     Play selected video"),
            Line::from("  Backspace/h Back"),
            Line::from("  f           Forward"),
            Line::from("  H/Home      Back to the catalog"),
            Line::from(""),
            Line::styled("Grid", Style::default().add_modifier(Modifier::BOLD)),
            Line::from("  s           Cycle sort order"),
            Line::from(format!("              {}", sorts.join(" / "))),
            Line::from("  /           Search titles"),
            Line::from(""),
            Line::styled("Actions", Style::default().add_modifier(Modifier::BOLD)),
            Line::from("  y           Share current video"),
            Line::from("  r           Retry loading"),
            Line::from("  q           Quit"),
            Line::from(""),
            Line::styled("Press any key to close", Style::default().fg(Color::DarkGray)),
        ];
        let help_popup = Paragraph::new(help_lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title("Help")
                .style(Style::default().bg(Color::Black)),
        );
        let area = centered_rect(50, 23, f.area());
        f.render_widget(Clear, area);
        f.render_widget(help_popup, area);
    }

    // Status message overlay
    if !state.status_message.is_empty() && !state.show_help {
        let status = Paragraph::new(state.status_message.clone())
            .style(Style::default().fg(Color::Yellow))
            .block(Block::default().borders(Borders::ALL));
        let area = centered_rect(60, 3, f.area());
        f.render_widget(Clear, area);
        f.render_widget(status, area);
    }
}

fn draw_grid(f: &mut Frame, state: &BrowserState, grid: &GridView<'_>, area: Rect) {
    let title = format!("Videos ({}) - {}", grid.records.len(), grid.sort.label());

    if grid.no_results {
        let empty = Paragraph::new("No se encontraron videos")
            .style(Style::default().fg(Color::Yellow))
            .block(Block::default().borders(Borders::ALL).title(title));
        f.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = grid
        .records
        .iter()
        .map(|record| {
            ListItem::new(Line::from(vec![
                Span::raw(record.title.clone()),
                Span::styled(
                    format!("  {}", format_date(&record.created_at)),
                    Style::default().fg(Color::DarkGray),
                ),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    f.render_stateful_widget(list, area, &mut state.list_state.clone());
}

fn draw_player(f: &mut Frame, state: &BrowserState, player: &PlayerView<'_>, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let record = player.record;
    let details = vec![
        Line::styled(
            record.title.clone(),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
        Line::from(format_date(&record.created_at)),
        Line::from(""),
        Line::from(format!("Play:      {}", record.drive_url)),
        Line::from(format!("Thumbnail: {}", record.image_url)),
    ];
    let details = Paragraph::new(details)
        .block(Block::default().borders(Borders::ALL).title("Now playing"))
        .wrap(Wrap { trim: false });
    f.render_widget(details, columns[0]);

    let items: Vec<ListItem> = if player.related.is_empty() {
        vec![ListItem::new("No related videos").style(Style::default().fg(Color::DarkGray))]
    } else {
        player
            .related
            .iter()
            .map(|r| ListItem::new(r.title.clone()))
            .collect()
    };

    let related = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Related"))
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    f.render_stateful_widget(related, columns[1], &mut state.list_state.clone());
}

fn centered_rect(percent_x: u16, height: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - height) / 2),
            Constraint::Length(height),
            Constraint::Percentage((100 - height) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
