use serde::Deserialize;

use crate::{
    bot::transport::{ChatId, MessageId},
    services::render::Action,
};

/// Slash commands the bot understands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Unknown(String),
}

impl Command {
    /// Parses `/name` or `/name@botname`; `None` for text that is not a command
    pub fn parse(text: &str) -> Option<Self> {
        let word = text.split_whitespace().next()?;
        let name = word.strip_prefix('/')?;
        let name = name.split('@').next().unwrap_or(name);

        Some(match name {
            "start" => Command::Start,
            "help" => Command::Help,
            other => Command::Unknown(other.to_string()),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    Command(Command),
    Text(String),
    /// `action` is `None` when the identifier is not one the bot issued
    Button {
        callback_id: String,
        action: Option<Action>,
    },
    /// Button press whose message is gone (too old or sent inline); it can
    /// only be acknowledged
    DetachedButton { callback_id: String },
}

/// One user interaction, stripped of platform details
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    pub chat_id: ChatId,
    pub user_id: i64,
    pub kind: EventKind,
}

// ============================================================================
// Telegram webhook payload
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<TgMessage>,
    #[serde(default)]
    pub callback_query: Option<TgCallbackQuery>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TgMessage {
    pub message_id: MessageId,
    pub chat: TgChat,
    #[serde(default)]
    pub from: Option<TgUser>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TgChat {
    pub id: ChatId,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TgUser {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TgCallbackQuery {
    pub id: String,
    pub from: TgUser,
    #[serde(default)]
    pub message: Option<TgMessage>,
    #[serde(default)]
    pub data: Option<String>,
}

impl Update {
    /// Converts an update into an event, or `None` for updates the bot ignores
    /// (edits, stickers, ...)
    pub fn into_event(self) -> Option<InboundEvent> {
        if let Some(query) = self.callback_query {
            let user_id = query.from.id;
            let Some(message) = query.message else {
                return Some(InboundEvent {
                    chat_id: user_id,
                    user_id,
                    kind: EventKind::DetachedButton {
                        callback_id: query.id,
                    },
                });
            };
            let action = query.data.as_deref().and_then(|data| data.parse().ok());
            return Some(InboundEvent {
                chat_id: message.chat.id,
                user_id,
                kind: EventKind::Button {
                    callback_id: query.id,
                    action,
                },
            });
        }

        let message = self.message?;
        let text = message.text?;
        let user_id = message.from.map(|u| u.id).unwrap_or(message.chat.id);
        let kind = match Command::parse(&text) {
            Some(command) => EventKind::Command(command),
            None => EventKind::Text(text),
        };

        Some(InboundEvent {
            chat_id: message.chat.id,
            user_id,
            kind,
        })
    }
}
