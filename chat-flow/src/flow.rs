use dashmap::DashMap;
use std::sync::Arc;
use tracing::{debug, info};

use crate::{
    error::{FlowError, Result},
    event::{Event, EventKind, Reply},
    guard::AccessGuard,
    storage::{IDLE_STATE, Session},
    task::{NextAction, Task, TaskResult},
};

/// Predicate deciding whether a button token belongs to a route
pub type TokenMatcher = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// What an inbound event has to look like for a route to fire
#[derive(Clone)]
pub enum Trigger {
    /// Slash command by name, without the leading `/`
    Command(String),
    /// Button press whose token satisfies the matcher
    Callback(TokenMatcher),
}

impl Trigger {
    fn matches(&self, event: &Event) -> bool {
        match (self, &event.kind) {
            (Trigger::Command(expected), EventKind::Command { name, .. }) => expected == name,
            (Trigger::Callback(matcher), EventKind::Callback { token }) => matcher(token),
            _ => false,
        }
    }
}

/// Edge from an inbound event to the task handling it
#[derive(Clone)]
pub struct Route {
    pub trigger: Trigger,
    pub task_id: String,
    /// Session states the route is live in; empty means any state
    pub states: Vec<String>,
}

impl Route {
    fn accepts(&self, event: &Event, session: &Session) -> bool {
        self.trigger.matches(event)
            && (self.states.is_empty() || self.states.iter().any(|s| *s == session.current_state))
    }
}

/// A guarded set of tasks and the routes that reach them
pub struct Flow {
    pub id: String,
    guard: AccessGuard,
    tasks: DashMap<String, Arc<dyn Task>>,
    routes: Vec<Route>,
    fallback_task_id: Option<String>,
}

impl Flow {
    pub fn guard(&self) -> &AccessGuard {
        &self.guard
    }

    /// Run the task routed for `event` against `session` and apply its next action.
    ///
    /// The caller is responsible for authorizing the event and for persisting the
    /// session afterwards; see [`FlowRunner`](crate::FlowRunner).
    pub async fn execute_session(
        &self,
        session: &mut Session,
        event: &Event,
    ) -> Result<ExecutionResult> {
        let Some(task_id) = self.find_task_id(event, session) else {
            debug!(
                user_id = %event.user_id,
                state = %session.current_state,
                "no route for event, ignoring"
            );
            return Ok(ExecutionResult {
                replies: Vec::new(),
                status: ExecutionStatus::WaitingForInput,
            });
        };

        let result = self.execute_single_task(&task_id, event, session).await?;
        session.status_message = result.status_message.clone();

        let status = match &result.next_action {
            NextAction::GoTo(state) => {
                session.current_state = state.clone();
                ExecutionStatus::WaitingForInput
            }
            NextAction::WaitForInput => ExecutionStatus::WaitingForInput,
            NextAction::End => {
                session.current_state = IDLE_STATE.to_string();
                ExecutionStatus::Completed
            }
        };

        info!(
            flow = %self.id,
            user_id = %event.user_id,
            task = %task_id,
            state = %session.current_state,
            status = session.status_message.as_deref().unwrap_or("-"),
            "event handled"
        );

        Ok(ExecutionResult {
            replies: result.replies,
            status,
        })
    }

    async fn execute_single_task(
        &self,
        task_id: &str,
        event: &Event,
        session: &Session,
    ) -> Result<TaskResult> {
        let task = self
            .get_task(task_id)
            .ok_or_else(|| FlowError::TaskNotFound(task_id.to_string()))?;
        task.run(event, session.context.clone()).await
    }

    /// First route accepting the event in the session's current state, else the fallback
    pub fn find_task_id(&self, event: &Event, session: &Session) -> Option<String> {
        self.routes
            .iter()
            .find(|route| route.accepts(event, session))
            .map(|route| route.task_id.clone())
            .or_else(|| self.fallback_task_id.clone())
    }

    /// Get a task by ID
    pub fn get_task(&self, task_id: &str) -> Option<Arc<dyn Task>> {
        self.tasks.get(task_id).map(|entry| entry.clone())
    }
}

/// Builder for creating flows
pub struct FlowBuilder {
    id: String,
    guard: AccessGuard,
    tasks: DashMap<String, Arc<dyn Task>>,
    routes: Vec<Route>,
    fallback_task_id: Option<String>,
}

impl FlowBuilder {
    pub fn new(id: impl Into<String>, guard: AccessGuard) -> Self {
        Self {
            id: id.into(),
            guard,
            tasks: DashMap::new(),
            routes: Vec::new(),
            fallback_task_id: None,
        }
    }

    pub fn add_task(self, task: Arc<dyn Task>) -> Self {
        self.tasks.insert(task.id().to_string(), task);
        self
    }

    pub fn add_command_route(
        mut self,
        command: impl Into<String>,
        task_id: impl Into<String>,
    ) -> Self {
        self.routes.push(Route {
            trigger: Trigger::Command(command.into()),
            task_id: task_id.into(),
            states: Vec::new(),
        });
        self
    }

    pub fn add_callback_route<F>(mut self, task_id: impl Into<String>, matcher: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.routes.push(Route {
            trigger: Trigger::Callback(Arc::new(matcher)),
            task_id: task_id.into(),
            states: Vec::new(),
        });
        self
    }

    /// Like [`add_callback_route`](Self::add_callback_route), but only live while the
    /// session is in one of `states`
    pub fn add_state_callback_route<F>(
        mut self,
        states: &[&str],
        task_id: impl Into<String>,
        matcher: F,
    ) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.routes.push(Route {
            trigger: Trigger::Callback(Arc::new(matcher)),
            task_id: task_id.into(),
            states: states.iter().map(|s| s.to_string()).collect(),
        });
        self
    }

    /// Task run for events no route accepts
    pub fn set_fallback_task(mut self, task_id: impl Into<String>) -> Self {
        self.fallback_task_id = Some(task_id.into());
        self
    }

    pub fn build(self) -> Result<Flow> {
        let referenced = self
            .routes
            .iter()
            .map(|r| &r.task_id)
            .chain(self.fallback_task_id.iter());
        for task_id in referenced {
            if !self.tasks.contains_key(task_id) {
                return Err(FlowError::TaskNotFound(task_id.clone()));
            }
        }

        Ok(Flow {
            id: self.id,
            guard: self.guard,
            tasks: self.tasks,
            routes: self.routes,
            fallback_task_id: self.fallback_task_id,
        })
    }
}

/// Outcome of handling one event
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub replies: Vec<Reply>,
    pub status: ExecutionStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionStatus {
    /// Session is waiting for the user's next event
    WaitingForInput,
    /// Flow finished and the session is idle again
    Completed,
    /// The access guard rejected the requester
    Denied,
}
