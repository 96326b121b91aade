mod keybindings;
mod settings;

pub use keybindings::{KeyBinding, KeyBindings, KeyContext};
pub use settings::{
    LogSettings, Settings, SettingsError, TableSettings, config_dir, default_config_path,
    table_state_path,
};
