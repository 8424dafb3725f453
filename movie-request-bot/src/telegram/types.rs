//! The subset of the Telegram Bot API objects the bot reads and writes.

use chat_flow::{Event, Keyboard};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub from: Option<User>,
    pub chat: Chat,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    pub first_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: User,
    pub message: Option<Message>,
    pub data: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InlineKeyboardButton {
    pub text: String,
    pub callback_data: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InlineKeyboardMarkup {
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

impl InlineKeyboardMarkup {
    /// `None` for an empty keyboard so the field is left out of the request
    pub fn from_keyboard(keyboard: &Keyboard) -> Option<Self> {
        if keyboard.is_empty() {
            return None;
        }
        Some(Self {
            inline_keyboard: keyboard
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|b| InlineKeyboardButton {
                            text: b.label.clone(),
                            callback_data: b.token.clone(),
                        })
                        .collect()
                })
                .collect(),
        })
    }
}

/// An event together with where its replies have to go
#[derive(Debug, Clone)]
pub struct Inbound {
    pub event: Event,
    pub chat_id: i64,
    /// Message whose button was pressed, for edits
    pub message_id: Option<i64>,
    pub callback_query_id: Option<String>,
}

/// What the poller does with one update
#[derive(Debug, Clone)]
pub enum Incoming {
    /// A command or button press to run through the flow
    Dispatch(Inbound),
    /// A button press whose message is no longer available; there is nowhere to
    /// reply, but the press still has to be answered
    AnswerOnly { callback_query_id: String },
}

impl Incoming {
    /// Commands and button presses are kept; anything else is dropped.
    pub fn from_update(update: Update) -> Option<Self> {
        if let Some(query) = update.callback_query {
            let Some(message) = query.message else {
                return Some(Incoming::AnswerOnly {
                    callback_query_id: query.id,
                });
            };
            let token = query.data.unwrap_or_default();
            let event = Event::callback(query.from.id.to_string(), token)
                .with_display_name(query.from.first_name);
            return Some(Incoming::Dispatch(Inbound {
                event,
                chat_id: message.chat.id,
                message_id: Some(message.message_id),
                callback_query_id: Some(query.id),
            }));
        }

        let message = update.message?;
        let from = message.from?;
        let (name, args) = parse_command(message.text.as_deref()?)?;
        let event =
            Event::command(from.id.to_string(), name, args).with_display_name(from.first_name);
        Some(Incoming::Dispatch(Inbound {
            event,
            chat_id: message.chat.id,
            message_id: Some(message.message_id),
            callback_query_id: None,
        }))
    }
}

/// `/search@MyBot  the  matrix` → `("search", "the matrix")`
pub fn parse_command(text: &str) -> Option<(String, String)> {
    let mut words = text.split_whitespace();
    let head = words.next()?.strip_prefix('/')?;
    let name = head.split('@').next().unwrap_or_default();
    if name.is_empty() {
        return None;
    }
    let args = words.collect::<Vec<_>>().join(" ");
    Some((name.to_lowercase(), args))
}
