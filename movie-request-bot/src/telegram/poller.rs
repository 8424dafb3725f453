//! Long-polling event dispatcher.
//!
//! Updates are fanned out to one worker per user. A worker handles its user's
//! events strictly in arrival order, so a slow upstream call only holds up the
//! user who triggered it.

use chat_flow::{FlowRunner, Reply};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{Instrument, debug, error, info, info_span, warn};
use uuid::Uuid;

use super::{
    api::{BotApi, TelegramError},
    types::{InlineKeyboardMarkup, Inbound, Incoming},
};

const POLL_ERROR_PAUSE: Duration = Duration::from_secs(5);
const WORKER_IDLE_TIMEOUT: Duration = Duration::from_secs(600);

pub struct Poller {
    api: Arc<dyn BotApi>,
    runner: FlowRunner,
    workers: DashMap<String, mpsc::UnboundedSender<Inbound>>,
}

impl Poller {
    pub fn new(api: Arc<dyn BotApi>, runner: FlowRunner) -> Arc<Self> {
        Arc::new(Self {
            api,
            runner,
            workers: DashMap::new(),
        })
    }

    /// Poll forever. Transport errors are logged and polling resumes after a pause.
    pub async fn run(self: Arc<Self>) {
        let mut offset = 0;
        info!("Polling Telegram for updates");

        loop {
            let updates = match self.api.get_updates(offset).await {
                Ok(updates) => updates,
                Err(e) => {
                    error!("Failed to fetch updates: {}", e);
                    tokio::time::sleep(POLL_ERROR_PAUSE).await;
                    continue;
                }
            };

            for update in updates {
                offset = offset.max(update.update_id + 1);
                match Incoming::from_update(update) {
                    Some(Incoming::Dispatch(inbound)) => self.enqueue(inbound),
                    Some(Incoming::AnswerOnly { callback_query_id }) => {
                        self.answer_orphaned(callback_query_id)
                    }
                    None => debug!("ignoring update without command or button press"),
                }
            }
        }
    }

    fn answer_orphaned(&self, callback_query_id: String) {
        let api = Arc::clone(&self.api);
        tokio::spawn(async move {
            debug!("answering button press on a message that is no longer available");
            if let Err(e) = api.answer_callback_query(&callback_query_id, None, false).await {
                error!("Failed to acknowledge button press: {}", e);
            }
        });
    }

    fn enqueue(self: &Arc<Self>, inbound: Inbound) {
        let user_id = inbound.event.user_id.clone();
        let sender = self
            .workers
            .entry(user_id.clone())
            .or_insert_with(|| self.spawn_worker(user_id.clone()))
            .clone();

        // the worker retired between lookup and send; start a fresh one
        if let Err(mpsc::error::SendError(inbound)) = sender.send(inbound) {
            let sender = self.spawn_worker(user_id.clone());
            self.workers.insert(user_id, sender.clone());
            if sender.send(inbound).is_err() {
                error!("Worker channel closed immediately after spawn");
            }
        }
    }

    fn spawn_worker(self: &Arc<Self>, user_id: String) -> mpsc::UnboundedSender<Inbound> {
        let (tx, mut rx) = mpsc::unbounded_channel::<Inbound>();
        let poller = Arc::clone(self);
        let own_tx = tx.clone();

        tokio::spawn(async move {
            loop {
                match tokio::time::timeout(WORKER_IDLE_TIMEOUT, rx.recv()).await {
                    Ok(Some(inbound)) => poller.handle(inbound).await,
                    Ok(None) => break,
                    Err(_) => {
                        poller
                            .workers
                            .remove_if(&user_id, |_, current| current.same_channel(&own_tx));
                        rx.close();
                        while let Ok(inbound) = rx.try_recv() {
                            poller.handle(inbound).await;
                        }
                        debug!(user_id = %user_id, "worker retired after inactivity");
                        break;
                    }
                }
            }
        });

        tx
    }

    async fn handle(&self, inbound: Inbound) {
        let span = info_span!(
            "update",
            correlation_id = %Uuid::new_v4(),
            user_id = %inbound.event.user_id,
        );

        async {
            let replies = match self.runner.run(&inbound.event).await {
                Ok(result) => result.replies,
                Err(e) => {
                    error!("Failed to handle event: {}", e);
                    Vec::new()
                }
            };
            deliver(self.api.as_ref(), &inbound, replies).await;
        }
        .instrument(span)
        .await
    }
}

/// Render replies on the channel the event came from. A button press is always
/// answered exactly once, silently when no reply answered it.
pub async fn deliver(api: &dyn BotApi, inbound: &Inbound, replies: Vec<Reply>) {
    let mut answered = false;

    for reply in replies {
        let outcome = match reply {
            Reply::Text { text, buttons } => {
                let markup = InlineKeyboardMarkup::from_keyboard(&buttons);
                api.send_message(inbound.chat_id, &text, markup).await
            }
            Reply::Photo {
                url,
                caption,
                buttons,
            } => send_photo_or_text(api, inbound.chat_id, &url, &caption, buttons).await,
            Reply::EditText { text } => edit_or_send(api, inbound, &text).await,
            Reply::Notice { text, alert } => match &inbound.callback_query_id {
                Some(id) if !answered => {
                    answered = true;
                    api.answer_callback_query(id, Some(&text), alert).await
                }
                _ => api.send_message(inbound.chat_id, &text, None).await,
            },
        };

        if let Err(e) = outcome {
            error!("Failed to deliver reply: {}", e);
        }
    }

    if let (Some(id), false) = (&inbound.callback_query_id, answered) {
        if let Err(e) = api.answer_callback_query(id, None, false).await {
            error!("Failed to acknowledge button press: {}", e);
        }
    }
}

async fn send_photo_or_text(
    api: &dyn BotApi,
    chat_id: i64,
    url: &str,
    caption: &str,
    buttons: chat_flow::Keyboard,
) -> Result<(), TelegramError> {
    let sent = api
        .send_photo(chat_id, url, caption, InlineKeyboardMarkup::from_keyboard(&buttons))
        .await;
    match sent {
        Ok(()) => Ok(()),
        Err(e) => {
            warn!("Poster could not be sent, falling back to text: {}", e);
            api.send_message(chat_id, caption, InlineKeyboardMarkup::from_keyboard(&buttons))
                .await
        }
    }
}

async fn edit_or_send(
    api: &dyn BotApi,
    inbound: &Inbound,
    text: &str,
) -> Result<(), TelegramError> {
    let editable = inbound.message_id.filter(|_| inbound.callback_query_id.is_some());
    let Some(message_id) = editable else {
        return api.send_message(inbound.chat_id, text, None).await;
    };

    match api.edit_message_text(inbound.chat_id, message_id, text).await {
        Ok(()) => Ok(()),
        Err(e) => {
            warn!("Message could not be edited, sending instead: {}", e);
            api.send_message(inbound.chat_id, text, None).await
        }
    }
}
