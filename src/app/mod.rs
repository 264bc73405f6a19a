pub mod dashboard;
pub mod render;
pub mod service;
pub mod store;

pub use dashboard::Dashboard;
pub use render::{render, OutputFormat, RenderOptions};
pub use service::{DashboardService, DashboardView};
pub use store::{reduce, Action, DashboardState, Effect};
