use super::App;
use crate::event_handler::{EventHandler, KeyAction};
use crate::media::DownloadOutcome;

use crossterm::event::Event;
use mathcast_core::SubmitOutcome;

/// Lines moved per PageUp/PageDown
const PAGE_LINES: u16 = 10;

pub fn handle_event(app: &mut App, event: &Event) {
    let mode = app.vm.mode();
    let action = EventHandler::handle_event(event, &mut app.state, mode);
    app.vm.set_draft(app.state.input.buffer.clone());

    if let Some(action) = action {
        handle_key_action(app, action);
    }
}

pub fn handle_key_action(app: &mut App, action: KeyAction) {
    match action {
        KeyAction::SendMessage { message } => match app.vm.submit_message(&message) {
            SubmitOutcome::Sent => {
                app.state.ui.scroll_to_bottom();
                app.state.ui.clear_status();
            }
            SubmitOutcome::EmptyDraft => {}
        },
        KeyAction::NewChat => {
            let id = app.vm.create_session();
            app.state.input.clear();
            app.state.ui.scroll_to_bottom();
            app.state.ui.info("New chat started");
            tracing::info!(chat_id = %id, "new chat");
        }
        KeyAction::ToggleTheme => {
            let theme = app.vm.toggle_theme();
            app.state.ui.info(format!("Theme switched to {theme}"));
        }
        KeyAction::SwitchTab => app.state.ui.switch_tab(),
        KeyAction::PageUp => app.state.ui.scroll_up(PAGE_LINES),
        KeyAction::PageDown => app.state.ui.scroll_down(PAGE_LINES),
        KeyAction::Download { kind } => {
            if !app.vm.panels_visible() {
                return;
            }
            match app.state.media.download(kind) {
                Ok(DownloadOutcome::Saved(path)) => {
                    app.state.ui.info(format!("Saved {} to {}", kind.title(), path.display()));
                }
                Ok(DownloadOutcome::NothingToDownload) => {
                    app.state.ui.info(format!("Nothing to download for {}", kind.title()));
                }
                Err(e) => {
                    tracing::warn!(kind = kind.title(), error = %e, "download failed");
                    app.state.ui.error(format!("Download failed: {e}"));
                }
            }
        }
        KeyAction::CancelStreaming => {
            if app.vm.transport_turn(|transport| transport.cancel()) {
                app.state.ui.info("Response cancelled");
            }
        }
        KeyAction::Exit => app.should_exit = true,
    }
}
