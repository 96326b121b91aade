mod action;
mod state;

pub use action::Action;
pub use state::{AppState, LogViewState, Screen, UiState};
