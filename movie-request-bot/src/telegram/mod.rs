pub mod api;
pub mod poller;
pub mod types;

pub use api::{BotApi, TelegramClient, TelegramError};
pub use poller::Poller;
pub use types::{Inbound, Incoming, parse_command};
