pub mod cancel;
pub mod confirm;
pub mod search;
pub mod select_movie;
pub mod start;
pub mod types;
pub mod utils;

// Re-export task implementations
pub use cancel::CancelTask;
pub use confirm::ConfirmTask;
pub use search::{MAX_RESULTS, SearchTask};
pub use select_movie::SelectMovieTask;
pub use start::{HelpTask, StaleEventTask, StartTask};
pub use types::{messages, session_keys, states, tokens};
