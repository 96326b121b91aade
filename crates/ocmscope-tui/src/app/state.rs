use ratatui::widgets::TableState;

use ocmscope_logs::{LogBuffer, LogRequest, LogSearch};
use ocmscope_table::{DetailsTable, KeyValueStore, ResourceRow};

/// Screen enumeration
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Screen {
    DetailsTable,
    LogViewer,
}

/// UI-specific transient state
#[derive(Default)]
pub struct UiState {
    /// Is the search bar taking input?
    pub search_active: bool,

    /// Is help overlay visible?
    pub help_visible: bool,

    /// Selected row within the current table page
    pub table_state: TableState,

    /// Error message to display (if any)
    pub error_message: Option<String>,

    /// Informational message, e.g. after an export
    pub info_message: Option<String>,
}

/// State of the log viewer for one pod
pub struct LogViewState {
    /// Request for the log currently shown
    pub request: LogRequest,

    /// Containers of the pod, in pod spec order
    pub containers: Vec<String>,

    pub container_index: usize,

    pub buffer: LogBuffer,

    pub search: LogSearch,

    /// First line in the viewport
    pub scroll: usize,

    pub wrap_lines: bool,

    /// A fetch is in flight
    pub loading: bool,

    /// Lines that fit in the viewport, updated on render
    pub viewport_height: usize,
}

impl LogViewState {
    pub fn new(request: LogRequest, min_search_chars: usize, capacity: usize) -> Self {
        let containers: Vec<String> = request.container.iter().cloned().collect();
        Self {
            request,
            containers,
            container_index: 0,
            buffer: LogBuffer::new(capacity),
            search: LogSearch::new(min_search_chars),
            scroll: 0,
            wrap_lines: false,
            loading: true,
            viewport_height: 20,
        }
    }

    pub fn current_container(&self) -> Option<&str> {
        self.request.container.as_deref()
    }

    /// Record the pod's containers, keeping the requested one selected if present
    ///
    /// Returns the request to fetch next.
    pub fn set_containers(&mut self, containers: Vec<String>) -> LogRequest {
        let wanted = self.request.container.clone();
        self.container_index = wanted
            .as_deref()
            .and_then(|w| containers.iter().position(|c| c == w))
            .unwrap_or(0);
        self.containers = containers;
        self.select_container(self.container_index)
    }

    /// Switch to another container: the old lines and search are discarded
    pub fn select_container(&mut self, index: usize) -> LogRequest {
        if let Some(name) = self.containers.get(index) {
            self.container_index = index;
            self.request.container = Some(name.clone());
        }
        self.search.reset();
        self.begin_reload()
    }

    /// Step to the next or previous container; `None` with fewer than two
    pub fn cycle_container(&mut self, forward: bool) -> Option<LogRequest> {
        let count = self.containers.len();
        if count < 2 {
            return None;
        }
        let index = if forward {
            (self.container_index + 1) % count
        } else {
            (self.container_index + count - 1) % count
        };
        Some(self.select_container(index))
    }

    /// Flip between current and previous container instance
    pub fn toggle_previous(&mut self) -> LogRequest {
        self.request.previous = !self.request.previous;
        self.begin_reload()
    }

    /// Clear the view and hand out the request to fetch
    pub fn begin_reload(&mut self) -> LogRequest {
        self.buffer.clear();
        self.scroll = 0;
        self.loading = true;
        self.request.clone()
    }

    /// Show freshly fetched text, re-running any active search over it
    pub fn load(&mut self, text: &str) {
        self.buffer.replace(text);
        self.loading = false;
        self.scroll = 0;
        self.search.invalidate();

        let input = self.search.input().to_string();
        if !input.is_empty() {
            self.update_search(&input);
        }
    }

    pub fn fail(&mut self) {
        self.loading = false;
    }

    /// Apply new search input and bring the first match into view
    pub fn update_search(&mut self, input: &str) {
        let count = self.buffer.len();
        let row = self
            .buffer
            .with_lines(|lines| self.search.update(input, lines, count));
        if let Some(row) = row {
            self.scroll_into_view(row);
        }
    }

    pub fn next_match(&mut self) {
        if let Some(row) = self.search.next() {
            self.scroll_into_view(row);
        }
    }

    pub fn prev_match(&mut self) {
        if let Some(row) = self.search.prev() {
            self.scroll_into_view(row);
        }
    }

    /// Adjust scroll so `row` is visible, centering it when it was not
    pub fn scroll_into_view(&mut self, row: usize) {
        let height = self.viewport_height.max(1);
        if row < self.scroll || row >= self.scroll + height {
            self.scroll = row.saturating_sub(height / 2);
        }
        self.clamp_scroll();
    }

    pub fn max_scroll(&self) -> usize {
        self.buffer.len().saturating_sub(self.viewport_height.max(1))
    }

    pub fn clamp_scroll(&mut self) {
        self.scroll = self.scroll.min(self.max_scroll());
    }

    pub fn scroll_up(&mut self, n: usize) {
        self.scroll = self.scroll.saturating_sub(n);
    }

    pub fn scroll_down(&mut self, n: usize) {
        self.scroll = self.scroll.saturating_add(n);
        self.clamp_scroll();
    }

    pub fn page_up(&mut self) {
        self.scroll_up(self.viewport_height.max(1));
    }

    pub fn page_down(&mut self) {
        self.scroll_down(self.viewport_height.max(1));
    }

    pub fn scroll_to_top(&mut self) {
        self.scroll = 0;
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll = self.max_scroll();
    }

    /// File name for exporting the current log
    pub fn export_file_name(&self) -> String {
        match &self.request.container {
            Some(container) => format!("{}-{}.log", self.request.pod, container),
            None => format!("{}.log", self.request.pod),
        }
    }
}

/// Global application state
pub struct AppState {
    /// Current screen being displayed
    pub current_screen: Screen,

    /// Navigation stack for back navigation
    pub screen_stack: Vec<Screen>,

    /// Name of the node the table was built from
    pub title: String,

    /// Details table, when a node was opened
    pub table: Option<DetailsTable<Box<dyn KeyValueStore>>>,

    /// Log viewer, when a pod was opened
    pub logs: Option<LogViewState>,

    /// UI state
    pub ui_state: UiState,

    /// Whether app should quit
    pub should_quit: bool,
}

impl AppState {
    pub fn new(screen: Screen) -> Self {
        let mut ui_state = UiState::default();
        ui_state.table_state.select(Some(0));

        Self {
            current_screen: screen,
            screen_stack: Vec::new(),
            title: String::new(),
            table: None,
            logs: None,
            ui_state,
            should_quit: false,
        }
    }

    /// Navigate to a new screen, pushing current to stack
    pub fn navigate_to(&mut self, screen: Screen) {
        self.screen_stack.push(self.current_screen);
        self.current_screen = screen;
        self.ui_state.search_active = false;
    }

    /// Go back to previous screen
    pub fn go_back(&mut self) -> bool {
        if let Some(prev_screen) = self.screen_stack.pop() {
            if self.current_screen == Screen::LogViewer {
                self.logs = None;
            }
            self.current_screen = prev_screen;
            self.ui_state.search_active = false;
            true
        } else {
            false
        }
    }

    /// Open the log viewer for a new pod
    pub fn open_logs(&mut self, view: LogViewState) {
        self.logs = Some(view);
        if self.current_screen != Screen::LogViewer {
            self.navigate_to(Screen::LogViewer);
        }
    }

    /// Number of rows on the current table page
    pub fn visible_row_count(&self) -> usize {
        self.table.as_ref().map_or(0, |t| t.visible_rows().len())
    }

    /// Move selection up
    pub fn row_up(&mut self) {
        let len = self.visible_row_count();
        if len == 0 {
            return;
        }

        let i = match self.ui_state.table_state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i.min(len) - 1,
        };
        self.ui_state.table_state.select(Some(i));
    }

    /// Move selection down
    pub fn row_down(&mut self) {
        let len = self.visible_row_count();
        if len == 0 {
            return;
        }

        let i = match self.ui_state.table_state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.ui_state.table_state.select(Some(i));
    }

    /// Return the selection to the first row, e.g. after the page changed
    pub fn reset_selection(&mut self) {
        self.ui_state.table_state.select(Some(0));
    }

    /// Row under the cursor
    pub fn selected_row(&self) -> Option<&ResourceRow> {
        let index = self.ui_state.table_state.selected()?;
        self.table.as_ref()?.visible_row(index)
    }

    /// Show an error message
    pub fn show_error(&mut self, msg: String) {
        tracing::debug!(error = %msg, "showing error");
        self.ui_state.info_message = None;
        self.ui_state.error_message = Some(msg);
    }

    pub fn show_info(&mut self, msg: String) {
        self.ui_state.info_message = Some(msg);
    }

    /// Dismiss any message
    pub fn dismiss_message(&mut self) {
        self.ui_state.error_message = None;
        self.ui_state.info_message = None;
    }

    pub fn has_message(&self) -> bool {
        self.ui_state.error_message.is_some() || self.ui_state.info_message.is_some()
    }

    /// Current text of the search bar on this screen
    pub fn search_input(&self) -> &str {
        match self.current_screen {
            Screen::DetailsTable => self.table.as_ref().map_or("", |t| t.search()),
            Screen::LogViewer => self.logs.as_ref().map_or("", |l| l.search.input()),
        }
    }

    /// Start search input mode
    pub fn start_search(&mut self) {
        self.ui_state.search_active = true;
    }

    /// Leave input mode, keeping the current search
    pub fn apply_search(&mut self) {
        self.ui_state.search_active = false;
    }

    /// Leave input mode and clear the search
    pub fn cancel_search(&mut self) {
        self.ui_state.search_active = false;
        self.set_search_input(String::new());
    }

    /// Add a character to search input
    pub fn search_input_char(&mut self, c: char) {
        let mut input = self.search_input().to_string();
        input.push(c);
        self.set_search_input(input);
    }

    /// Remove last character from search input
    pub fn search_input_backspace(&mut self) {
        let mut input = self.search_input().to_string();
        input.pop();
        self.set_search_input(input);
    }

    /// Apply search text to the current screen as it is typed
    pub fn set_search_input(&mut self, input: String) {
        match self.current_screen {
            Screen::DetailsTable => {
                if let Some(table) = &mut self.table {
                    table.set_search(input);
                    self.reset_selection();
                }
            }
            Screen::LogViewer => {
                if let Some(logs) = &mut self.logs {
                    logs.update_search(&input);
                }
            }
        }
    }
}
