pub mod acquisition;
pub mod catalog;
pub mod config;
pub mod models;
pub mod tasks;
pub mod telegram;
pub mod workflow;

pub use acquisition::{AcquisitionError, MediaAcquisition, RadarrClient};
pub use catalog::{CatalogError, CatalogLookup, TmdbClient};
pub use config::{ConfigError, Settings};
pub use workflow::{build_movie_request_flow, create_flow_runner, create_session_storage};
