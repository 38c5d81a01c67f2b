use crate::config::config::Config;
use crate::data::csv_store::{CsvOptions, CsvStore};
use crate::data::dataset::DatasetHandle;
use crate::ui::file_info::{file_info, NO_FILE_LOADED};
use crate::ui::slot_pool::SlotPool;
use crate::ui::table_view::{grid_area, gutter_width, render_table, TableViewContext};
use crate::ui::viewport::{ColumnLayout, ScrollCoordinator, TableController};
use crate::utils::logging::get_log_buffer;
use anyhow::{anyhow, Result};
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame, Terminal,
};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

/// Rows moved per mouse wheel notch
const WHEEL_ROWS: isize = 3;
const LOG_VIEW_ENTRIES: usize = 200;

/// A loaded file and the viewport built on it
struct OpenTable {
    controller: TableController,
    pool: SlotPool,
    layout: ColumnLayout,
}

impl OpenTable {
    fn new(dataset: DatasetHandle, config: &Config) -> Self {
        let labeler = config.display.labeler();
        let layout = ColumnLayout::measure(&dataset, &labeler, &config.display.layout_settings());
        Self {
            controller: TableController::new(dataset, ScrollCoordinator::new(), labeler),
            pool: SlotPool::new(config.display.pin_header),
            layout,
        }
    }

    fn replace(&mut self, dataset: DatasetHandle, config: &Config) {
        self.layout = ColumnLayout::measure(
            &dataset,
            self.controller.labeler(),
            &config.display.layout_settings(),
        );
        self.controller.replace_dataset(dataset);
        self.pool.to_first();
    }
}

#[derive(Debug, Clone, Copy)]
struct DragState {
    screen_row: usize,
    start_x: u16,
    start_offset: usize,
}

pub struct ViewerApp {
    config: Config,
    csv_options: CsvOptions,
    files: Vec<PathBuf>,
    current: usize,
    table: Option<OpenTable>,
    status: String,
    show_logs: bool,
    drag: Option<DragState>,
    /// Grid area from the last frame, for mouse hit testing
    grid: Rect,
}

/// Load `path` into a fresh dataset handle
pub fn load_dataset(path: &Path, options: &CsvOptions) -> Result<DatasetHandle> {
    let store = CsvStore::load(path, options)?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(DatasetHandle::new(Arc::new(store)).with_name(name))
}

impl ViewerApp {
    pub fn new(config: Config, csv_options: CsvOptions, files: Vec<PathBuf>) -> Self {
        let mut app = Self {
            config,
            csv_options,
            files,
            current: 0,
            table: None,
            status: String::new(),
            show_logs: false,
            drag: None,
            grid: Rect::default(),
        };
        app.open_current();
        app
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn current_file(&self) -> Option<&Path> {
        self.files.get(self.current).map(PathBuf::as_path)
    }

    pub fn controller(&self) -> Option<&TableController> {
        self.table.as_ref().map(|table| &table.controller)
    }

    pub fn pool(&self) -> Option<&SlotPool> {
        self.table.as_ref().map(|table| &table.pool)
    }

    pub fn show_logs(&self) -> bool {
        self.show_logs
    }

    /// (Re)load the file at `self.current`
    ///
    /// A failed load is reported once in the status line and leaves no
    /// viewport behind.
    fn open_current(&mut self) {
        let Some(path) = self.files.get(self.current).cloned() else {
            self.status = NO_FILE_LOADED.to_string();
            return;
        };

        match load_dataset(&path, &self.csv_options) {
            Ok(dataset) => {
                info!(target: "app", "Opened {}", path.display());
                match self.table.as_mut() {
                    Some(table) => table.replace(dataset, &self.config),
                    None => self.table = Some(OpenTable::new(dataset, &self.config)),
                }
                self.status = "Loaded".to_string();
            }
            Err(e) => {
                error!(target: "app", "Failed to load {}: {:#}", path.display(), e);
                self.close_table();
                self.status = format!("Error loading {}: {}", path.display(), e);
            }
        }
    }

    fn close_table(&mut self) {
        if let Some(mut table) = self.table.take() {
            table.pool.teardown(&mut table.controller);
        }
        self.drag = None;
    }

    fn switch_file(&mut self, forward: bool) {
        if self.files.len() < 2 {
            self.status = "Only one file open".to_string();
            return;
        }
        let count = self.files.len();
        self.current = if forward {
            (self.current + 1) % count
        } else {
            (self.current + count - 1) % count
        };
        debug!(target: "app", "Switching to file {} of {}", self.current + 1, count);
        self.open_current();
    }

    fn content_width(&self) -> usize {
        let row_count = self
            .controller()
            .and_then(TableController::dataset)
            .map_or(0, DatasetHandle::row_count);
        let gutter = gutter_width(row_count, self.config.display.show_row_numbers);
        self.grid.width.saturating_sub(gutter) as usize
    }

    fn max_offset(&self) -> usize {
        let total = self
            .table
            .as_ref()
            .map_or(0, |table| table.layout.total_width());
        total.saturating_sub(self.content_width())
    }

    /// Set the shared horizontal offset through the first visible row
    fn scroll_horizontally_to(&mut self, offset: usize) {
        let offset = offset.min(self.max_offset());
        if let Some(table) = &self.table {
            table.pool.scroll_row_to(0, offset);
        }
    }

    fn scroll_horizontally_by(&mut self, delta: isize) {
        let current = self.pool().map_or(0, SlotPool::offset);
        self.scroll_horizontally_to(current.saturating_add_signed(delta));
    }

    /// Returns true when the app should exit
    pub fn handle_key(&mut self, key: KeyEvent) -> Result<bool> {
        let step = self.config.behavior.horizontal_step as isize;
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(true),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return Ok(true)
            }
            KeyCode::F(5) => self.show_logs = !self.show_logs,
            KeyCode::Char(']') => self.switch_file(true),
            KeyCode::Char('[') => self.switch_file(false),
            KeyCode::Char('r') => self.open_current(),
            KeyCode::Left | KeyCode::Char('h') => self.scroll_horizontally_by(-step),
            KeyCode::Right | KeyCode::Char('l') => self.scroll_horizontally_by(step),
            KeyCode::Char('0') => self.scroll_horizontally_to(0),
            _ => {
                let Some(table) = self.table.as_mut() else {
                    return Ok(false);
                };
                let result = match key.code {
                    KeyCode::Down | KeyCode::Char('j') => table.pool.scroll_by(1),
                    KeyCode::Up | KeyCode::Char('k') => table.pool.scroll_by(-1),
                    KeyCode::PageDown => table.pool.page_down(),
                    KeyCode::PageUp => table.pool.page_up(),
                    KeyCode::Home => table.pool.to_first(),
                    KeyCode::End => table.pool.to_last(),
                    _ => return Ok(false),
                };
                if result.viewport_changed {
                    self.status = result.description;
                }
            }
        }
        Ok(false)
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        let step = self.config.behavior.horizontal_step as isize;
        match mouse.kind {
            MouseEventKind::ScrollDown if mouse.modifiers.contains(KeyModifiers::SHIFT) => {
                self.scroll_horizontally_by(step)
            }
            MouseEventKind::ScrollUp if mouse.modifiers.contains(KeyModifiers::SHIFT) => {
                self.scroll_horizontally_by(-step)
            }
            MouseEventKind::ScrollDown => {
                if let Some(table) = self.table.as_mut() {
                    table.pool.scroll_by(WHEEL_ROWS);
                }
            }
            MouseEventKind::ScrollUp => {
                if let Some(table) = self.table.as_mut() {
                    table.pool.scroll_by(-WHEEL_ROWS);
                }
            }
            MouseEventKind::Down(MouseButton::Left) => self.start_drag(mouse.column, mouse.row),
            MouseEventKind::Drag(MouseButton::Left) => self.continue_drag(mouse.column),
            MouseEventKind::Up(MouseButton::Left) => self.drag = None,
            _ => {}
        }
    }

    fn screen_row_at(&self, y: u16) -> Option<usize> {
        let inside = y >= self.grid.y && y < self.grid.y + self.grid.height;
        inside.then(|| (y - self.grid.y) as usize)
    }

    fn start_drag(&mut self, x: u16, y: u16) {
        let Some(screen_row) = self.screen_row_at(y) else {
            return;
        };
        let Some(table) = &self.table else {
            return;
        };
        let Some(slot) = table.pool.slot_at(screen_row) else {
            return;
        };

        self.drag = Some(DragState {
            screen_row,
            start_x: x,
            start_offset: slot.offset(),
        });

        if slot.kind().is_some_and(|kind| kind.is_header()) {
            let gutter = gutter_width(
                table.controller.dataset().map_or(0, DatasetHandle::row_count),
                self.config.display.show_row_numbers,
            );
            let content_x = x.saturating_sub(self.grid.x + gutter) as usize + slot.offset();
            if let Some(header) = table
                .layout
                .column_at(content_x)
                .and_then(|col| table.controller.full_header(col))
            {
                self.status = format!("Column: {}", header);
            }
        }
    }

    fn continue_drag(&mut self, x: u16) {
        let Some(drag) = self.drag else {
            return;
        };
        let moved = drag.start_x as isize - x as isize;
        let offset = drag
            .start_offset
            .saturating_add_signed(moved)
            .min(self.max_offset());
        if let Some(table) = &self.table {
            table.pool.scroll_row_to(drag.screen_row, offset);
        }
    }

    pub fn ui(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(1)])
            .split(f.area());

        self.grid = grid_area(chunks[0]);
        let height = self.grid.height as usize;
        let title = self.title();
        let show_row_numbers = self.config.display.show_row_numbers;

        match self.table.as_mut() {
            Some(table) => {
                if let Err(e) = table.pool.sync(&mut table.controller, height) {
                    error!(target: "app", "Viewport sync failed: {}", e);
                    self.status = format!("Viewport error: {}", e);
                }
                let ctx = TableViewContext {
                    pool: &table.pool,
                    layout: &table.layout,
                    title,
                    row_count: table.controller.dataset().map_or(0, DatasetHandle::row_count),
                    show_row_numbers,
                };
                render_table(f, chunks[0], &ctx);
            }
            None => {
                let empty = Paragraph::new(self.status.clone())
                    .block(Block::default().borders(Borders::ALL).title(title))
                    .style(Style::default().fg(Color::Yellow));
                f.render_widget(empty, chunks[0]);
            }
        }

        self.render_status_line(f, chunks[1]);
        if self.show_logs {
            render_log_overlay(f, chunks[0]);
        }
    }

    fn title(&self) -> String {
        let info = file_info(self.controller().and_then(TableController::dataset));
        if self.files.len() > 1 {
            format!(" {} [{}/{}] ", info, self.current + 1, self.files.len())
        } else {
            format!(" {} ", info)
        }
    }

    fn render_status_line(&self, f: &mut Frame, area: Rect) {
        let offset = self.pool().map_or(0, SlotPool::offset);
        let position = self.pool().map_or(0, SlotPool::top);
        let line = Line::from(vec![
            Span::styled(
                format!(" row {} col {} ", position, offset),
                Style::default().fg(Color::Black).bg(Color::Cyan),
            ),
            Span::raw(" "),
            Span::raw(self.status.clone()),
            Span::styled(
                "  q quit • F5 logs • ] [ files",
                Style::default().fg(Color::DarkGray),
            ),
        ]);
        f.render_widget(Paragraph::new(line), area);
    }

    pub fn run(mut self) -> Result<()> {
        // Setup terminal with error handling
        if let Err(e) = enable_raw_mode() {
            return Err(anyhow!("Failed to enable raw mode: {}", e));
        }

        let mut stdout = io::stdout();
        if let Err(e) = execute!(stdout, EnterAlternateScreen, EnableMouseCapture) {
            let _ = disable_raw_mode();
            return Err(anyhow!("Failed to setup terminal: {}", e));
        }

        let backend = CrosstermBackend::new(stdout);
        let mut terminal = match Terminal::new(backend) {
            Ok(t) => t,
            Err(e) => {
                let _ = disable_raw_mode();
                return Err(anyhow!("Failed to create terminal: {}", e));
            }
        };

        let res = self.run_app(&mut terminal);

        // Always restore terminal, even on error
        self.close_table();
        let _ = disable_raw_mode();
        let _ = execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        );
        let _ = terminal.show_cursor();

        res.map_err(|e| anyhow!("TUI error: {}", e))
    }

    fn run_app<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        terminal.draw(|f| self.ui(f))?;

        loop {
            if !event::poll(Duration::from_millis(50))? {
                continue;
            }
            match event::read()? {
                Event::Key(key) => {
                    // Only handle presses so toggles don't fire twice on Windows
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key)? {
                        break;
                    }
                }
                Event::Mouse(mouse) => self.handle_mouse(mouse),
                Event::Resize(_, _) => {}
                _ => continue,
            }
            terminal.draw(|f| self.ui(f))?;
        }
        Ok(())
    }
}

fn render_log_overlay(f: &mut Frame, area: Rect) {
    let popup = Rect {
        x: area.x + area.width / 10,
        y: area.y + area.height / 10,
        width: area.width - area.width / 5,
        height: area.height - area.height / 5,
    };
    let visible = popup.height.saturating_sub(2) as usize;
    let entries = get_log_buffer()
        .map(|buffer| buffer.get_recent(LOG_VIEW_ENTRIES))
        .unwrap_or_default();
    let lines: Vec<Line> = entries
        .iter()
        .skip(entries.len().saturating_sub(visible))
        .map(|entry| Line::from(entry.format_for_display()))
        .collect();

    f.render_widget(Clear, popup);
    f.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Logs (F5 to close) ")
                .title_style(Style::default().add_modifier(Modifier::BOLD)),
        ),
        popup,
    );
}
