pub mod analysis;
pub mod compare;
pub mod cumulative;
pub mod naming;
pub mod poller;
pub mod resolver;
pub mod weekly;

pub use crate::domain::model::{Community, Platform, Resolved, Selection, Snapshot};
pub use crate::domain::ports::{Clock, SnapshotPath, SnapshotSource, SystemClock};
pub use crate::utils::error::Result;
