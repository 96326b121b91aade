//! TUI components for ocmscope
//!
//! This crate provides the terminal user interface for ocmscope: the
//! resource details table, the container log viewer, state management,
//! keybindings, settings, event handling, and shared UI components.

pub mod app;
pub mod config;
pub mod tui;
pub mod ui;

pub use app::{Action, AppState, LogViewState, Screen, UiState};
pub use config::{
    KeyBinding, KeyBindings, KeyContext, LogSettings, Settings, SettingsError, TableSettings,
};
pub use tui::{Event, EventHandler, Tui};
pub use ui::components::{HelpOverlay, SearchBar, StatusBar};
pub use ui::screens::{DetailsTableScreen, LogViewerScreen};
pub use ui::{Layout, Theme};
