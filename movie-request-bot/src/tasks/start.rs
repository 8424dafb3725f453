use async_trait::async_trait;
use chat_flow::{Context, Event, EventKind, NextAction, Reply, Result, Task, TaskResult};

use super::types::messages;

/// `/start`
pub struct StartTask;

#[async_trait]
impl Task for StartTask {
    fn id(&self) -> &str {
        std::any::type_name::<Self>()
    }

    async fn run(&self, event: &Event, _context: Context) -> Result<TaskResult> {
        let greeting = match &event.display_name {
            Some(name) => format!("Hi {name}!"),
            None => "Hi!".to_string(),
        };
        Ok(TaskResult::new(
            vec![Reply::text(format!("{greeting}\n{}", messages::HELP))],
            NextAction::WaitForInput,
        ))
    }
}

/// `/help`
pub struct HelpTask;

#[async_trait]
impl Task for HelpTask {
    fn id(&self) -> &str {
        std::any::type_name::<Self>()
    }

    async fn run(&self, _event: &Event, _context: Context) -> Result<TaskResult> {
        Ok(TaskResult::new(
            vec![Reply::text(messages::HELP)],
            NextAction::WaitForInput,
        ))
    }
}

/// Catches everything no route accepts. Button presses get a stale notice so the
/// client stops spinning; unknown commands are ignored.
pub struct StaleEventTask;

#[async_trait]
impl Task for StaleEventTask {
    fn id(&self) -> &str {
        std::any::type_name::<Self>()
    }

    async fn run(&self, event: &Event, _context: Context) -> Result<TaskResult> {
        let replies = match &event.kind {
            EventKind::Callback { .. } => vec![Reply::notice(messages::BUTTON_INACTIVE)],
            EventKind::Command { .. } => Vec::new(),
        };
        Ok(TaskResult::new(replies, NextAction::WaitForInput))
    }
}
