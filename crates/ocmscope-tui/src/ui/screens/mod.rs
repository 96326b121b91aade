mod details_table;
mod log_viewer;

pub use details_table::DetailsTableScreen;
pub use log_viewer::{LogViewerScreen, highlight_line};
