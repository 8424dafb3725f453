use async_trait::async_trait;
use chat_flow::{Context, Event, NextAction, Reply, Result, Task, TaskResult};
use tracing::info;

use super::types::{messages, session_keys};

/// "No" on the confirmation prompt. Always lands in idle, pending or not.
pub struct CancelTask;

#[async_trait]
impl Task for CancelTask {
    fn id(&self) -> &str {
        std::any::type_name::<Self>()
    }

    async fn run(&self, event: &Event, context: Context) -> Result<TaskResult> {
        let dropped = context.remove(session_keys::PENDING_SELECTION).await.is_some();
        context.remove(session_keys::OFFERED_RESULTS).await;
        info!(user_id = %event.user_id, dropped, "selection cancelled");

        Ok(TaskResult::new(
            vec![Reply::edit(messages::CANCELLED)],
            NextAction::End,
        ))
    }
}
