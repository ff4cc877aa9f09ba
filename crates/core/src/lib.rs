pub mod config;
pub mod error;
pub mod logging;
pub mod message;
pub mod session;
pub mod transport;
pub mod view_model;

pub use config::{ChatConfig, Config, ConfigError, MediaConfig, ProviderConfig, UiConfig};
pub use error::{Error, Result};
pub use message::{Message, MessageError, MessageId, Role};
pub use session::{ChatId, ChatIdAllocator, ChatSession, DEFAULT_TITLE, derive_title};
pub use transport::Transport;
pub use view_model::{SessionViewModel, SubmitOutcome, ThemeMode, ViewMode, ViewState};
