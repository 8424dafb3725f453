use async_trait::async_trait;
use chat_flow::{Context, Event, NextAction, Reply, Result, Task, TaskResult};
use chrono::Utc;
use std::sync::Arc;
use tracing::{error, info};

use super::types::{messages, session_keys, tokens};
use crate::{acquisition::MediaAcquisition, models::PendingSelection};

/// "Yes" on the confirmation prompt: submits the pending movie exactly once.
///
/// The pending selection is taken out of the context before the submission and
/// only when its id matches the button, so a repeated or outdated press finds
/// nothing and is answered as no longer pending. Routed in every state.
pub struct ConfirmTask {
    acquisition: Arc<dyn MediaAcquisition>,
}

impl ConfirmTask {
    pub fn new(acquisition: Arc<dyn MediaAcquisition>) -> Self {
        Self { acquisition }
    }
}

#[async_trait]
impl Task for ConfirmTask {
    fn id(&self) -> &str {
        std::any::type_name::<Self>()
    }

    async fn run(&self, event: &Event, context: Context) -> Result<TaskResult> {
        let pending = match tokens::parse_confirm(event.input()) {
            Some(movie_id) => {
                context
                    .take_if(session_keys::PENDING_SELECTION, |p: &PendingSelection| {
                        p.movie.id == movie_id
                    })
                    .await
            }
            None => None,
        };

        let Some(pending) = pending else {
            info!(user_id = %event.user_id, token = %event.input(), "stale confirmation ignored");
            return Ok(TaskResult::new(
                vec![Reply::notice(messages::SELECTION_NOT_PENDING)],
                NextAction::WaitForInput,
            ));
        };

        context.remove(session_keys::OFFERED_RESULTS).await;

        let waited_secs = (Utc::now() - pending.selected_at).num_seconds();
        let movie = pending.movie;
        info!(user_id = %event.user_id, movie_id = movie.id, waited_secs, "submitting movie");

        let reply = match self.acquisition.submit(&movie).await {
            Ok(()) => Reply::edit(messages::ADDED),
            Err(e) => {
                error!(
                    user_id = %event.user_id,
                    movie_id = movie.id,
                    "Error adding movie to Radarr: {}",
                    e
                );
                Reply::edit(messages::ADD_FAILED)
            }
        };

        Ok(TaskResult::new_with_status(
            vec![reply],
            NextAction::End,
            Some(format!("Submitted {} ({})", movie.title, movie.id)),
        ))
    }
}
