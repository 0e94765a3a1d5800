use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{
    bot::transport::{ChatId, MessageId},
    services::pagination::BrowseSession,
};

/// How free text from the user is interpreted
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Idle,
    AwaitingSearch,
}

/// Proof that a fetch was started; stale once a newer one begins
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTicket(u64);

/// Everything the bot remembers about one conversation
#[derive(Debug, Default)]
pub struct ChatState {
    pub mode: Mode,
    pub browse: Option<BrowseSession>,
    /// The message the next render replaces
    pub last_message: Option<MessageId>,
    generation: u64,
}

impl ChatState {
    /// Invalidates any fetch in flight and returns a ticket for a new one
    pub fn begin_request(&mut self) -> RequestTicket {
        self.generation += 1;
        RequestTicket(self.generation)
    }

    /// Whether `ticket` belongs to the most recent request
    pub fn is_current(&self, ticket: RequestTicket) -> bool {
        self.generation == ticket.0
    }

    /// Back to the root menu: no session, no search mode, nothing in flight
    pub fn reset(&mut self) {
        self.mode = Mode::Idle;
        self.browse = None;
        self.generation += 1;
    }
}

/// Per-conversation state, each behind its own lock
///
/// The outer map lock is held only long enough to look up or insert an entry,
/// so a slow event in one chat never delays another.
#[derive(Default)]
pub struct SessionRegistry {
    chats: Mutex<HashMap<ChatId, Arc<Mutex<ChatState>>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, chat_id: ChatId) -> Arc<Mutex<ChatState>> {
        let mut chats = self.chats.lock().await;
        chats.entry(chat_id).or_default().clone()
    }
}
