pub mod controller;
pub mod events;
pub mod menus;
pub mod sessions;
pub mod transport;

pub use controller::Controller;
pub use events::{Command, EventKind, InboundEvent, Update};
pub use transport::{ChatId, ChatTransport, MessageId, TelegramTransport};
