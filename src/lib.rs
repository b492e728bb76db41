pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliConfig;

pub use adapters::storage::{AtomicFile, InPlaceFile};
pub use config::Settings;
pub use crate::core::editor::{rewrite_routes, Rewrite, RouteEditor};
pub use domain::model::{MarkerPolicy, Markers, Route, RouteTable, RewriteReport, UpdateOutcome, WriteMode};
pub use utils::error::{Result, RouteError};
