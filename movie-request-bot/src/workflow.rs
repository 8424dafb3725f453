use chat_flow::{
    AccessGuard, Flow, FlowBuilder, FlowRunner, InMemorySessionStorage, SessionStorage, Task,
};
use std::sync::Arc;

use crate::{
    acquisition::MediaAcquisition,
    catalog::CatalogLookup,
    tasks::{
        CancelTask, ConfirmTask, HelpTask, SearchTask, SelectMovieTask, StaleEventTask,
        StartTask, states, tokens,
    },
};

/// Wires the search → select → confirm interaction.
pub fn build_movie_request_flow(
    catalog: Arc<dyn CatalogLookup>,
    acquisition: Arc<dyn MediaAcquisition>,
    guard: AccessGuard,
) -> chat_flow::Result<Flow> {
    let start_task = Arc::new(StartTask);
    let start_id = start_task.id().to_string();

    let help_task = Arc::new(HelpTask);
    let help_id = help_task.id().to_string();

    let search_task = Arc::new(SearchTask::new(catalog.clone()));
    let search_id = search_task.id().to_string();

    let select_task = Arc::new(SelectMovieTask::new(catalog));
    let select_id = select_task.id().to_string();

    let confirm_task = Arc::new(ConfirmTask::new(acquisition));
    let confirm_id = confirm_task.id().to_string();

    let cancel_task = Arc::new(CancelTask);
    let cancel_id = cancel_task.id().to_string();

    let stale_task = Arc::new(StaleEventTask);
    let stale_id = stale_task.id().to_string();

    FlowBuilder::new("movie_requests", guard)
        .add_task(start_task)
        .add_task(help_task)
        .add_task(search_task)
        .add_task(select_task)
        .add_task(confirm_task)
        .add_task(cancel_task)
        .add_task(stale_task)
        .add_command_route("start", &start_id)
        .add_command_route("help", &help_id)
        .add_command_route("search", &search_id)
        .add_state_callback_route(
            &[states::RESULTS_SHOWN, states::DETAILS_CONFIRM_PENDING],
            &select_id,
            tokens::is_selection,
        )
        .add_callback_route(&confirm_id, tokens::is_confirm)
        .add_callback_route(&cancel_id, tokens::is_cancel)
        .set_fallback_task(&stale_id)
        .build()
}

pub fn create_session_storage() -> Arc<dyn SessionStorage> {
    Arc::new(InMemorySessionStorage::new())
}

pub fn create_flow_runner(
    catalog: Arc<dyn CatalogLookup>,
    acquisition: Arc<dyn MediaAcquisition>,
    guard: AccessGuard,
    session_storage: Arc<dyn SessionStorage>,
) -> chat_flow::Result<FlowRunner> {
    let flow = Arc::new(build_movie_request_flow(catalog, acquisition, guard)?);
    Ok(FlowRunner::new(flow, session_storage))
}
