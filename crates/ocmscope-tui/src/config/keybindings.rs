use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::HashMap;

use ocmscope_table::Column;

use crate::app::Action;

/// A key combination
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct KeyBinding {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBinding {
    pub fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::NONE,
        }
    }

    pub fn ctrl(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::CONTROL,
        }
    }

    pub fn shift(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::SHIFT,
        }
    }

    pub fn from_event(event: &KeyEvent) -> Self {
        Self {
            code: event.code,
            modifiers: event.modifiers,
        }
    }
}

/// Context for keybindings
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyContext {
    Global,
    DetailsTable,
    LogViewer,
    SearchInput,
}

/// Keybinding configuration
pub struct KeyBindings {
    bindings: HashMap<KeyContext, HashMap<KeyBinding, Action>>,
}

impl KeyBindings {
    pub fn new() -> Self {
        let mut bindings = HashMap::new();

        let mut global = HashMap::new();
        global.insert(KeyBinding::new(KeyCode::Char('?')), Action::ToggleHelp);
        global.insert(KeyBinding::new(KeyCode::Esc), Action::GoBack);
        global.insert(KeyBinding::ctrl(KeyCode::Char('c')), Action::Quit);
        global.insert(KeyBinding::new(KeyCode::Char('q')), Action::Quit);
        global.insert(KeyBinding::new(KeyCode::Char('/')), Action::OpenSearch);
        bindings.insert(KeyContext::Global, global);

        let mut table = HashMap::new();
        table.insert(KeyBinding::new(KeyCode::Char('j')), Action::RowDown);
        table.insert(KeyBinding::new(KeyCode::Down), Action::RowDown);
        table.insert(KeyBinding::new(KeyCode::Char('k')), Action::RowUp);
        table.insert(KeyBinding::new(KeyCode::Up), Action::RowUp);
        table.insert(KeyBinding::new(KeyCode::Enter), Action::OpenRow);
        table.insert(KeyBinding::new(KeyCode::Char('l')), Action::NextPage);
        table.insert(KeyBinding::new(KeyCode::Right), Action::NextPage);
        table.insert(KeyBinding::new(KeyCode::PageDown), Action::NextPage);
        table.insert(KeyBinding::new(KeyCode::Char('h')), Action::PrevPage);
        table.insert(KeyBinding::new(KeyCode::Left), Action::PrevPage);
        table.insert(KeyBinding::new(KeyCode::PageUp), Action::PrevPage);
        table.insert(KeyBinding::new(KeyCode::Char('p')), Action::CyclePageSize);
        table.insert(KeyBinding::new(KeyCode::Char('1')), Action::SortBy(Column::Name));
        table.insert(KeyBinding::new(KeyCode::Char('2')), Action::SortBy(Column::Namespace));
        table.insert(KeyBinding::new(KeyCode::Char('3')), Action::SortBy(Column::Cluster));
        table.insert(KeyBinding::new(KeyCode::Char('0')), Action::ClearSort);
        bindings.insert(KeyContext::DetailsTable, table);

        // less-like navigation
        let mut log_viewer = HashMap::new();
        log_viewer.insert(KeyBinding::new(KeyCode::Char('j')), Action::ScrollDown(1));
        log_viewer.insert(KeyBinding::new(KeyCode::Down), Action::ScrollDown(1));
        log_viewer.insert(KeyBinding::new(KeyCode::Char('k')), Action::ScrollUp(1));
        log_viewer.insert(KeyBinding::new(KeyCode::Up), Action::ScrollUp(1));
        log_viewer.insert(KeyBinding::ctrl(KeyCode::Char('f')), Action::PageDown);
        log_viewer.insert(KeyBinding::ctrl(KeyCode::Char('b')), Action::PageUp);
        log_viewer.insert(KeyBinding::ctrl(KeyCode::Char('d')), Action::PageDown);
        log_viewer.insert(KeyBinding::ctrl(KeyCode::Char('u')), Action::PageUp);
        log_viewer.insert(KeyBinding::new(KeyCode::PageDown), Action::PageDown);
        log_viewer.insert(KeyBinding::new(KeyCode::PageUp), Action::PageUp);
        log_viewer.insert(KeyBinding::new(KeyCode::Char('g')), Action::ScrollToTop);
        log_viewer.insert(KeyBinding::shift(KeyCode::Char('G')), Action::ScrollToBottom);
        log_viewer.insert(KeyBinding::new(KeyCode::Home), Action::ScrollToTop);
        log_viewer.insert(KeyBinding::new(KeyCode::End), Action::ScrollToBottom);
        log_viewer.insert(KeyBinding::new(KeyCode::Char('n')), Action::NextMatch);
        log_viewer.insert(KeyBinding::shift(KeyCode::Char('N')), Action::PrevMatch);
        log_viewer.insert(KeyBinding::new(KeyCode::Tab), Action::NextContainer);
        log_viewer.insert(KeyBinding::shift(KeyCode::BackTab), Action::PrevContainer);
        log_viewer.insert(KeyBinding::new(KeyCode::BackTab), Action::PrevContainer);
        log_viewer.insert(KeyBinding::new(KeyCode::Char('p')), Action::TogglePrevious);
        log_viewer.insert(KeyBinding::new(KeyCode::Char('w')), Action::ToggleWrap);
        log_viewer.insert(KeyBinding::new(KeyCode::Char('r')), Action::ReloadLogs);
        log_viewer.insert(KeyBinding::new(KeyCode::Char('e')), Action::ExportLogs);
        bindings.insert(KeyContext::LogViewer, log_viewer);

        // Search bar is active
        let mut search_input = HashMap::new();
        search_input.insert(KeyBinding::new(KeyCode::Enter), Action::ApplySearch);
        search_input.insert(KeyBinding::new(KeyCode::Esc), Action::CloseSearch);
        search_input.insert(KeyBinding::new(KeyCode::Backspace), Action::SearchBackspace);
        search_input.insert(KeyBinding::ctrl(KeyCode::Char('u')), Action::SearchClear);
        search_input.insert(KeyBinding::ctrl(KeyCode::Char('c')), Action::CloseSearch);
        search_input.insert(KeyBinding::new(KeyCode::Down), Action::NextMatch);
        search_input.insert(KeyBinding::new(KeyCode::Up), Action::PrevMatch);
        bindings.insert(KeyContext::SearchInput, search_input);

        Self { bindings }
    }

    /// Look up action for key event in given context
    pub fn get_action(&self, context: KeyContext, key: &KeyEvent) -> Option<Action> {
        let binding = KeyBinding::from_event(key);

        if let Some(action) = self
            .bindings
            .get(&context)
            .and_then(|context_bindings| context_bindings.get(&binding))
        {
            return Some(action.clone());
        }

        // Fall back to global bindings
        self.bindings
            .get(&KeyContext::Global)?
            .get(&binding)
            .cloned()
    }

    /// Handle key event while the search bar takes input
    /// Returns Some(Action) for special keys and typed characters
    pub fn get_search_input_action(&self, key: &KeyEvent) -> Option<Action> {
        let binding = KeyBinding::from_event(key);

        if let Some(action) = self
            .bindings
            .get(&KeyContext::SearchInput)
            .and_then(|search_bindings| search_bindings.get(&binding))
        {
            return Some(action.clone());
        }

        match key.code {
            KeyCode::Char(c)
                if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT =>
            {
                Some(Action::SearchInput(c))
            }
            _ => None,
        }
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_context_binding_wins_over_global() {
        let bindings = KeyBindings::new();
        assert_eq!(
            bindings.get_action(KeyContext::DetailsTable, &key(KeyCode::Enter)),
            Some(Action::OpenRow)
        );
        assert_eq!(
            bindings.get_action(KeyContext::LogViewer, &key(KeyCode::Char('n'))),
            Some(Action::NextMatch)
        );
    }

    #[test]
    fn test_falls_back_to_global() {
        let bindings = KeyBindings::new();
        assert_eq!(
            bindings.get_action(KeyContext::LogViewer, &key(KeyCode::Char('q'))),
            Some(Action::Quit)
        );
        assert_eq!(
            bindings.get_action(KeyContext::DetailsTable, &key(KeyCode::Char('/'))),
            Some(Action::OpenSearch)
        );
    }

    #[test]
    fn test_search_input_captures_characters() {
        let bindings = KeyBindings::new();
        // 'q' is text while typing, not quit
        assert_eq!(
            bindings.get_search_input_action(&key(KeyCode::Char('q'))),
            Some(Action::SearchInput('q'))
        );
        assert_eq!(
            bindings.get_search_input_action(&KeyEvent::new(
                KeyCode::Char('E'),
                KeyModifiers::SHIFT
            )),
            Some(Action::SearchInput('E'))
        );
        assert_eq!(
            bindings.get_search_input_action(&key(KeyCode::Esc)),
            Some(Action::CloseSearch)
        );
        assert_eq!(bindings.get_search_input_action(&key(KeyCode::F(2))), None);
    }
}
