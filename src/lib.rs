pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{HttpSource, LocalSource, MemorySource};
pub use app::{Dashboard, DashboardService, DashboardView};
pub use config::DashboardConfig;
pub use core::resolver::SnapshotResolver;
pub use domain::model::{Community, Platform, Selection, Snapshot};
pub use utils::error::{DashboardError, Result};
