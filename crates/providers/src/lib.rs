pub mod adapter;
pub mod mock;
pub mod retry;
pub mod transport;
pub mod types;

pub use adapter::{OpenAiProvider, Provider, ProviderFactory};
pub use mock::{MockEvent, MockProvider, MockResponse};
pub use retry::RetryConfig;
pub use transport::ChatTransport;
pub use types::{ChatMessage, ChatRequest, StreamEvent, TransportEvent, TransportUpdate};

pub use mathcast_core::{Error, Result};
