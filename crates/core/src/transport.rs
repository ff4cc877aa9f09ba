//! The seam between the session view model and whatever performs the
//! chat-completion exchange.
//!
//! A transport owns a draft slot, a live buffer of messages that grows while
//! an exchange streams, and a reset operation. Network errors, retries and
//! streaming are its own business: the view model only reads the buffer and
//! the error state.

use crate::message::Message;

/// External collaborator performing the chat exchange
pub trait Transport {
    /// Current draft text
    fn draft(&self) -> &str;

    /// Replace the draft text
    fn set_draft(&mut self, draft: String);

    /// Send the current draft and start the exchange
    fn submit(&mut self);

    /// Live buffer of messages for the current conversation
    fn messages(&self) -> &[Message];

    /// Clear the live buffer, abandoning any in-flight exchange
    fn reset(&mut self);

    /// Error reported by the most recent exchange, if it failed
    fn last_error(&self) -> Option<&str> {
        None
    }

    /// Whether an exchange is still streaming
    fn is_streaming(&self) -> bool {
        false
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn draft(&self) -> &str {
        (**self).draft()
    }

    fn set_draft(&mut self, draft: String) {
        (**self).set_draft(draft)
    }

    fn submit(&mut self) {
        (**self).submit()
    }

    fn messages(&self) -> &[Message] {
        (**self).messages()
    }

    fn reset(&mut self) {
        (**self).reset()
    }

    fn last_error(&self) -> Option<&str> {
        (**self).last_error()
    }

    fn is_streaming(&self) -> bool {
        (**self).is_streaming()
    }
}
