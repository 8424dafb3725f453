use async_trait::async_trait;
use chat_flow::{Context, Event, NextAction, Reply, Result, Task, TaskResult};
use std::sync::Arc;
use tracing::info;

use super::{
    types::{messages, session_keys, states},
    utils::render_summary,
};
use crate::{
    catalog::CatalogLookup,
    models::{MovieId, MovieSummary},
};

/// Results shown per search
pub const MAX_RESULTS: usize = 5;

/// `/search <query>`: lists up to five catalog hits as selectable items.
///
/// A new search starts a new interaction, so any offered results and any
/// pending selection from a previous one are dropped first.
pub struct SearchTask {
    catalog: Arc<dyn CatalogLookup>,
}

impl SearchTask {
    pub fn new(catalog: Arc<dyn CatalogLookup>) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl Task for SearchTask {
    fn id(&self) -> &str {
        std::any::type_name::<Self>()
    }

    async fn run(&self, event: &Event, context: Context) -> Result<TaskResult> {
        context.remove(session_keys::OFFERED_RESULTS).await;
        context.remove(session_keys::PENDING_SELECTION).await;

        let query = event.input().trim();
        if query.is_empty() {
            return Ok(TaskResult::new(
                vec![Reply::text(messages::USAGE_HINT)],
                NextAction::End,
            ));
        }

        info!(user_id = %event.user_id, query = %query, "searching catalog");
        let results: Vec<MovieSummary> = self
            .catalog
            .search_titles(query)
            .await
            .into_iter()
            .take(MAX_RESULTS)
            .collect();

        if results.is_empty() {
            return Ok(TaskResult::new(
                vec![Reply::text(messages::NO_MOVIES_FOUND)],
                NextAction::End,
            ));
        }

        let offered: Vec<MovieId> = results.iter().map(|m| m.id).collect();
        context.set(session_keys::OFFERED_RESULTS, &offered).await?;

        let mut replies = Vec::with_capacity(results.len() + 1);
        replies.push(Reply::text(messages::FOUND_MOVIES));
        replies.extend(results.iter().map(render_summary));

        Ok(TaskResult::new_with_status(
            replies,
            NextAction::GoTo(states::RESULTS_SHOWN.to_string()),
            Some(format!("Offered {} results for {query:?}", offered.len())),
        ))
    }
}
