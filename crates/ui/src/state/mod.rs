mod input;
mod ui;

pub use input::InputState;
pub use ui::{ChatTab, StatusKind, StatusMessage, UiState};

use crate::media::MediaPanels;

/// Host-side application state; chat sessions themselves live in the view model
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub input: InputState,
    pub ui: UiState,
    pub media: MediaPanels,
    /// Provider label shown in the header
    pub provider_name: String,
}

impl AppState {
    pub fn new(media: MediaPanels, provider_name: impl Into<String>) -> Self {
        Self { input: InputState::new(), ui: UiState::default(), media, provider_name: provider_name.into() }
    }
}
