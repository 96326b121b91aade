use ocmscope_table::Column;

/// All possible actions in the application (command pattern)
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    // Navigation
    GoBack,
    Quit,
    ToggleHelp,

    // Search bar (table filter or log search, depending on screen)
    OpenSearch,
    CloseSearch,
    ApplySearch,
    SearchInput(char),
    SearchBackspace,
    SearchClear,

    // Details table
    RowUp,
    RowDown,
    OpenRow,
    NextPage,
    PrevPage,
    CyclePageSize,
    SortBy(Column),
    ClearSort,

    // Log viewer
    ScrollUp(usize),
    ScrollDown(usize),
    PageUp,
    PageDown,
    ScrollToTop,
    ScrollToBottom,
    NextMatch,
    PrevMatch,
    NextContainer,
    PrevContainer,
    TogglePrevious,
    ToggleWrap,
    ReloadLogs,
    ExportLogs,

    // Messages
    ShowError(String),
    DismissMessage,

    Render,
}
