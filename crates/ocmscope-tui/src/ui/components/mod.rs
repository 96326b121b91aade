mod help_overlay;
mod search_bar;
mod status_bar;

pub use help_overlay::HelpOverlay;
pub use search_bar::SearchBar;
pub use status_bar::{StatusBar, log_viewer_hints, table_hints};
