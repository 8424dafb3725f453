//! FlowRunner – the single entry point a chat transport calls for every inbound event.
//!
//! Each call authorizes the requester, loads (or creates) that user's session,
//! executes exactly **one** task and saves the session back. Unauthorized events
//! never reach storage or any task.
//!
//! Create one `FlowRunner` at startup and share it across all event handlers:
//! ```rust,ignore
//! let runner = FlowRunner::new(Arc::new(flow), Arc::new(InMemorySessionStorage::new()));
//! let result = runner.run(&event).await?;
//! for reply in result.replies { /* render */ }
//! ```

use chrono::{Duration, Utc};
use std::sync::Arc;
use tracing::debug;

use crate::{
    error::Result,
    event::Event,
    flow::{ExecutionResult, ExecutionStatus, Flow},
    guard::Access,
    storage::{Session, SessionStorage},
};

/// High-level helper that orchestrates the _authorize → load → execute → save_ pattern.
#[derive(Clone)]
pub struct FlowRunner {
    flow: Arc<Flow>,
    storage: Arc<dyn SessionStorage>,
}

impl FlowRunner {
    pub fn new(flow: Arc<Flow>, storage: Arc<dyn SessionStorage>) -> Self {
        Self { flow, storage }
    }

    /// Handle one event for its sender.
    pub async fn run(&self, event: &Event) -> Result<ExecutionResult> {
        if self.flow.guard().authorize(&event.user_id) == Access::Deny {
            return Ok(ExecutionResult {
                replies: vec![self.flow.guard().denial(event)],
                status: ExecutionStatus::Denied,
            });
        }

        let mut session = match self.storage.get(&event.user_id).await? {
            Some(session) => session,
            None => {
                debug!(user_id = %event.user_id, "starting new session");
                Session::new(event.user_id.clone())
            }
        };

        let result = self.flow.execute_session(&mut session, event).await?;

        session.touch();
        self.storage.save(session).await?;

        Ok(result)
    }

    /// Drop sessions idle for longer than `ttl`.
    pub async fn purge_idle_sessions(&self, ttl: Duration) -> Result<usize> {
        self.storage.purge_idle(Utc::now() - ttl).await
    }
}
