//! Transport-neutral inbound events and outbound replies.
//!
//! A chat transport turns its native updates into [`Event`]s, hands them to the
//! [`FlowRunner`](crate::FlowRunner) and renders the returned [`Reply`] list back
//! onto the channel the event arrived on.

use serde::{Deserialize, Serialize};

/// Something a user did in the chat
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Identity of the requester, compared verbatim by the access guard
    pub user_id: String,
    /// Human readable name, used for greetings only
    pub display_name: Option<String>,
    pub kind: EventKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    /// A slash command such as `/search dune`; `args` is everything after the name
    Command { name: String, args: String },
    /// A button press carrying the opaque token attached to the button
    Callback { token: String },
}

impl Event {
    pub fn command(
        user_id: impl Into<String>,
        name: impl Into<String>,
        args: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            display_name: None,
            kind: EventKind::Command {
                name: name.into(),
                args: args.into(),
            },
        }
    }

    pub fn callback(user_id: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            display_name: None,
            kind: EventKind::Callback {
                token: token.into(),
            },
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Command arguments, or the button token for callbacks
    pub fn input(&self) -> &str {
        match &self.kind {
            EventKind::Command { args, .. } => args,
            EventKind::Callback { token } => token,
        }
    }

    pub fn is_callback(&self) -> bool {
        matches!(self.kind, EventKind::Callback { .. })
    }
}

/// Inline button attached to a message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    pub label: String,
    pub token: String,
}

impl Button {
    pub fn new(label: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            token: token.into(),
        }
    }
}

/// Rows of buttons, rendered top to bottom
pub type Keyboard = Vec<Vec<Button>>;

/// Something the bot says back
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reply {
    /// New text message in the chat
    Text { text: String, buttons: Keyboard },
    /// New photo message with a caption
    Photo {
        url: String,
        caption: String,
        buttons: Keyboard,
    },
    /// Replace the text of the message whose button was pressed
    EditText { text: String },
    /// Answer to a button press: a transient notice, or a modal alert
    Notice { text: String, alert: bool },
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Reply::Text {
            text: text.into(),
            buttons: Vec::new(),
        }
    }

    pub fn text_with_buttons(text: impl Into<String>, buttons: Keyboard) -> Self {
        Reply::Text {
            text: text.into(),
            buttons,
        }
    }

    pub fn photo(url: impl Into<String>, caption: impl Into<String>, buttons: Keyboard) -> Self {
        Reply::Photo {
            url: url.into(),
            caption: caption.into(),
            buttons,
        }
    }

    pub fn edit(text: impl Into<String>) -> Self {
        Reply::EditText { text: text.into() }
    }

    pub fn notice(text: impl Into<String>) -> Self {
        Reply::Notice {
            text: text.into(),
            alert: false,
        }
    }

    pub fn alert(text: impl Into<String>) -> Self {
        Reply::Notice {
            text: text.into(),
            alert: true,
        }
    }

    /// The visible text of this reply, whatever its shape
    pub fn body(&self) -> &str {
        match self {
            Reply::Text { text, .. } | Reply::EditText { text } | Reply::Notice { text, .. } => {
                text
            }
            Reply::Photo { caption, .. } => caption,
        }
    }

    pub fn buttons(&self) -> &[Vec<Button>] {
        match self {
            Reply::Text { buttons, .. } | Reply::Photo { buttons, .. } => buttons,
            _ => &[],
        }
    }
}
