mod key_action;

pub use key_action::KeyAction;

use crate::media::MediaKind;
use crate::state::AppState;

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use mathcast_core::ViewMode;

/// Event handler for the TUI application
pub struct EventHandler;

impl EventHandler {
    /// Map a key press to an action, applying text edits to the input directly
    pub fn handle_key_event(event: KeyEvent, state: &mut AppState, mode: ViewMode) -> Option<KeyAction> {
        if event.kind != KeyEventKind::Press {
            return None;
        }

        let ctrl = event.modifiers.contains(KeyModifiers::CONTROL);
        let alt = event.modifiers.contains(KeyModifiers::ALT);

        if ctrl {
            return match event.code {
                KeyCode::Char('c') | KeyCode::Char('q') => Some(KeyAction::Exit),
                KeyCode::Char('n') => Some(KeyAction::NewChat),
                KeyCode::Char('t') => Some(KeyAction::ToggleTheme),
                _ => None,
            };
        }

        match event.code {
            KeyCode::Enter => {
                if state.input.is_blank() {
                    return None;
                }
                Some(KeyAction::SendMessage { message: state.input.take() })
            }
            KeyCode::Esc => Some(KeyAction::CancelStreaming),
            KeyCode::F(2) => Some(KeyAction::Download { kind: MediaKind::Video }),
            KeyCode::F(3) => Some(KeyAction::Download { kind: MediaKind::Transcript }),
            KeyCode::F(4) => Some(KeyAction::Download { kind: MediaKind::Audio }),
            KeyCode::Tab if mode == ViewMode::Conversation => Some(KeyAction::SwitchTab),
            KeyCode::PageUp if mode == ViewMode::Conversation => Some(KeyAction::PageUp),
            KeyCode::PageDown if mode == ViewMode::Conversation => Some(KeyAction::PageDown),
            KeyCode::Backspace => {
                state.input.backspace();
                None
            }
            KeyCode::Delete => {
                state.input.delete();
                None
            }
            KeyCode::Left => {
                state.input.move_left();
                None
            }
            KeyCode::Right => {
                state.input.move_right();
                None
            }
            KeyCode::Home => {
                state.input.move_home();
                None
            }
            KeyCode::End => {
                state.input.move_end();
                None
            }
            KeyCode::Char(c) if !alt => {
                state.input.insert_char(c);
                None
            }
            _ => None,
        }
    }

    pub fn handle_event(event: &Event, state: &mut AppState, mode: ViewMode) -> Option<KeyAction> {
        match event {
            Event::Key(key_event) => Self::handle_key_event(*key_event, state, mode),
            _ => None,
        }
    }
}
