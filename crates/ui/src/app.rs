mod event_loop;
mod keybinds;
mod rendering;

use crate::event_handler::KeyAction;
use crate::state::AppState;

use crossterm::event::Event;
use futures::Stream;
use mathcast_core::{SessionViewModel, ThemeMode};
use mathcast_providers::{ChatTransport, TransportUpdate};
use ratatui::Frame;
use std::io::Result;
use tokio::sync::mpsc::UnboundedReceiver;

/// Main TUI application
///
/// Owns the session view model (and through it the chat transport) plus the
/// receiving end of the transport's update channel. Every mutation of the view
/// state happens on the task that drives [`App::run`].
pub struct App {
    vm: SessionViewModel<ChatTransport>,
    updates: UnboundedReceiver<TransportUpdate>,
    state: AppState,
    should_exit: bool,
}

impl App {
    /// Create the application and its first chat session
    pub fn new(
        transport: ChatTransport, updates: UnboundedReceiver<TransportUpdate>, state: AppState, theme: ThemeMode,
    ) -> Self {
        let mut vm = SessionViewModel::with_theme(transport, theme);
        vm.initialize();
        Self { vm, updates, state, should_exit: false }
    }

    pub fn view_model(&self) -> &SessionViewModel<ChatTransport> {
        &self.vm
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn should_exit(&self) -> bool {
        self.should_exit
    }

    /// Render the current screen into `frame`
    pub fn render(&self, frame: &mut Frame<'_>) {
        rendering::render(self, frame);
    }

    /// Route a terminal event through the key map, then keep the transport draft in step with the input
    pub fn handle_event(&mut self, event: &Event) {
        keybinds::handle_event(self, event);
    }

    pub fn handle_key_action(&mut self, action: KeyAction) {
        keybinds::handle_key_action(self, action);
    }

    /// Fold one transport update into the active session
    ///
    /// Returns `false` when the update was stale and dropped.
    pub fn handle_update(&mut self, update: TransportUpdate) -> bool {
        self.vm.transport_turn(|transport| transport.apply(update))
    }

    /// Wait for the next transport update and apply it
    ///
    /// Returns `false` once the channel is closed.
    pub async fn next_update(&mut self) -> bool {
        match self.updates.recv().await {
            Some(update) => {
                self.handle_update(update);
                true
            }
            None => false,
        }
    }

    /// Run the interactive loop until the user exits
    pub async fn run(&mut self) -> Result<()> {
        event_loop::run(self).await
    }

    /// Drive the loop from any event source, calling `redraw` after each wake-up
    ///
    /// Returns once the user exits, the event source ends, or the transport
    /// update channel closes.
    pub async fn run_with_events<S, F>(&mut self, events: &mut S, redraw: F) -> Result<()>
    where
        S: Stream<Item = Result<Event>> + Unpin,
        F: FnMut(&App) -> Result<()>,
    {
        event_loop::drive(self, events, redraw).await
    }
}
