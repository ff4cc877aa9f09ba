pub mod chat;
pub mod footer;
pub mod header;
pub mod input;
pub mod media;
pub mod prompt;

pub use chat::{ChatTabs, ChatView};
pub use footer::Footer;
pub use header::Header;
pub use input::InputBox;
pub use media::MediaView;
pub use prompt::Heading;
