mod input;
mod message;
mod modal;

pub use input::ChatInput;
pub use message::MessageBubble;
pub use modal::{AlertDialog, ConfirmDialog, Modal};
