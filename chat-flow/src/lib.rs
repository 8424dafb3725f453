pub mod context;
pub mod error;
pub mod event;
pub mod flow;
pub mod guard;
pub mod runner;
pub mod storage;
pub mod task;

// Re-export commonly used types
pub use context::Context;
pub use error::{FlowError, Result};
pub use event::{Button, Event, EventKind, Keyboard, Reply};
pub use flow::{ExecutionResult, ExecutionStatus, Flow, FlowBuilder, Route, Trigger};
pub use guard::{ACCESS_DENIED, Access, AccessGuard};
pub use runner::FlowRunner;
pub use storage::{IDLE_STATE, InMemorySessionStorage, Session, SessionStorage};
pub use task::{NextAction, Task, TaskResult};

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Arc;

    struct EchoTask {
        id: String,
        next: NextAction,
    }

    #[async_trait]
    impl Task for EchoTask {
        fn id(&self) -> &str {
            &self.id
        }

        async fn run(&self, event: &Event, context: Context) -> Result<TaskResult> {
            context.set("last_input", event.input()).await?;
            Ok(TaskResult::new_with_status(
                vec![Reply::text(format!("{}: {}", self.id, event.input()))],
                self.next.clone(),
                Some(format!("{} ran", self.id)),
            ))
        }
    }

    fn task(id: &str, next: NextAction) -> Arc<dyn Task> {
        Arc::new(EchoTask {
            id: id.to_string(),
            next,
        })
    }

    fn runner() -> (FlowRunner, Arc<InMemorySessionStorage>) {
        let flow = FlowBuilder::new("test", AccessGuard::allow_only("123"))
            .add_task(task("open", NextAction::GoTo("open".to_string())))
            .add_task(task("press", NextAction::End))
            .add_task(task("stale", NextAction::WaitForInput))
            .add_command_route("open", "open")
            .add_state_callback_route(&["open"], "press", |token| token.starts_with("p_"))
            .set_fallback_task("stale")
            .build()
            .unwrap();
        let storage = Arc::new(InMemorySessionStorage::new());
        (FlowRunner::new(Arc::new(flow), storage.clone()), storage)
    }

    #[tokio::test]
    async fn test_command_moves_session_into_state() {
        let (runner, storage) = runner();

        let result = runner.run(&Event::command("123", "open", "x")).await.unwrap();

        assert_eq!(result.status, ExecutionStatus::WaitingForInput);
        assert_eq!(result.replies, vec![Reply::text("open: x")]);
        let session = storage.get("123").await.unwrap().unwrap();
        assert_eq!(session.current_state, "open");
        assert_eq!(session.status_message.as_deref(), Some("open ran"));
        let last: String = session.context.get("last_input").await.unwrap();
        assert_eq!(last, "x");
    }

    #[tokio::test]
    async fn test_state_route_only_fires_in_its_state() {
        let (runner, storage) = runner();

        let early = runner.run(&Event::callback("123", "p_1")).await.unwrap();
        assert_eq!(early.replies, vec![Reply::text("stale: p_1")]);

        runner.run(&Event::command("123", "open", "")).await.unwrap();
        let pressed = runner.run(&Event::callback("123", "p_1")).await.unwrap();
        assert_eq!(pressed.status, ExecutionStatus::Completed);
        assert_eq!(pressed.replies, vec![Reply::text("press: p_1")]);

        let session = storage.get("123").await.unwrap().unwrap();
        assert!(session.is_idle());
    }

    #[tokio::test]
    async fn test_guard_rejects_before_storage() {
        let (runner, storage) = runner();

        let command = runner.run(&Event::command("999", "open", "x")).await.unwrap();
        assert_eq!(command.status, ExecutionStatus::Denied);
        assert_eq!(command.replies, vec![Reply::text(ACCESS_DENIED)]);

        let press = runner.run(&Event::callback("999", "p_1")).await.unwrap();
        assert_eq!(press.replies, vec![Reply::alert(ACCESS_DENIED)]);

        assert!(storage.is_empty());
    }

    #[tokio::test]
    async fn test_build_rejects_unknown_task() {
        let result = FlowBuilder::new("broken", AccessGuard::allow_only("1"))
            .add_command_route("open", "missing")
            .build();
        assert!(matches!(result, Err(FlowError::TaskNotFound(id)) if id == "missing"));
    }

    #[tokio::test]
    async fn test_storage_purges_idle_sessions() {
        let storage = InMemorySessionStorage::new();
        let mut old = Session::new("old");
        old.updated_at = chrono::Utc::now() - chrono::Duration::hours(2);
        storage.save(old).await.unwrap();
        storage.save(Session::new("fresh")).await.unwrap();

        let removed = storage
            .purge_idle(chrono::Utc::now() - chrono::Duration::hours(1))
            .await
            .unwrap();

        assert_eq!(removed, 1);
        assert!(storage.get("old").await.unwrap().is_none());
        assert!(storage.get("fresh").await.unwrap().is_some());
    }
}
