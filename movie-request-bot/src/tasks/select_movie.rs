use async_trait::async_trait;
use chat_flow::{Context, Event, NextAction, Reply, Result, Task, TaskResult};
use std::sync::Arc;
use tracing::{info, warn};

use super::{
    types::{messages, session_keys, states, tokens},
    utils::{confirmation_prompt, render_details},
};
use crate::{
    catalog::CatalogLookup,
    models::{MovieId, PendingSelection},
};

/// Selection token pressed on a search hit: shows the details and asks for confirmation
pub struct SelectMovieTask {
    catalog: Arc<dyn CatalogLookup>,
}

impl SelectMovieTask {
    pub fn new(catalog: Arc<dyn CatalogLookup>) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl Task for SelectMovieTask {
    fn id(&self) -> &str {
        std::any::type_name::<Self>()
    }

    async fn run(&self, event: &Event, context: Context) -> Result<TaskResult> {
        let offered: Vec<MovieId> = context
            .get(session_keys::OFFERED_RESULTS)
            .await
            .unwrap_or_default();
        let selected = tokens::parse_selection(event.input()).filter(|id| offered.contains(id));
        let Some(movie_id) = selected else {
            warn!(
                user_id = %event.user_id,
                token = %event.input(),
                "selection of a result that is not on offer"
            );
            return Ok(TaskResult::new(
                vec![Reply::notice(messages::BUTTON_INACTIVE)],
                NextAction::WaitForInput,
            ));
        };

        // whatever was pending is superseded by this selection, even if the fetch fails
        context.remove(session_keys::PENDING_SELECTION).await;

        let Some(details) = self.catalog.fetch_details(movie_id).await else {
            context.remove(session_keys::OFFERED_RESULTS).await;
            return Ok(TaskResult::new(
                vec![Reply::text(messages::DETAILS_FETCH_FAILED)],
                NextAction::End,
            ));
        };

        info!(user_id = %event.user_id, movie_id, title = %details.title, "movie selected");
        let replies = vec![render_details(&details), confirmation_prompt(&details)];
        context
            .set(session_keys::PENDING_SELECTION, PendingSelection::new(details))
            .await?;

        Ok(TaskResult::new(
            replies,
            NextAction::GoTo(states::DETAILS_CONFIRM_PENDING.to_string()),
        ))
    }
}
