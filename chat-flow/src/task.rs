use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{
    context::Context,
    error::Result,
    event::{Event, Reply},
};

/// Result of a task execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskResult {
    /// Replies to render back to the user, in order
    pub replies: Vec<Reply>,
    /// Where the session goes next
    pub next_action: NextAction,
    /// Optional status message stored on the session
    pub status_message: Option<String>,
}

impl TaskResult {
    pub fn new(replies: Vec<Reply>, next_action: NextAction) -> Self {
        Self {
            replies,
            next_action,
            status_message: None,
        }
    }

    pub fn new_with_status(
        replies: Vec<Reply>,
        next_action: NextAction,
        status_message: Option<String>,
    ) -> Self {
        Self {
            replies,
            next_action,
            status_message,
        }
    }
}

/// Defines what happens to the session after a task completes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NextAction {
    /// Move the session into the named state and wait for the next event
    GoTo(String),
    /// Keep the current state
    WaitForInput,
    /// Interaction finished, back to idle
    End,
}

/// Core trait that all tasks must implement
#[async_trait]
pub trait Task: Send + Sync {
    /// Unique identifier for this task
    fn id(&self) -> &str;

    /// Handle one inbound event with the session's context
    async fn run(&self, event: &Event, context: Context) -> Result<TaskResult>;
}
