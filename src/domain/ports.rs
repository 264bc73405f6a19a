use crate::domain::model::Platform;
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDate};

/// Location of a published file, relative to the platform's root.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SnapshotPath {
    pub platform: Platform,
    pub path: String,
}

impl SnapshotPath {
    pub fn new(platform: Platform, path: impl Into<String>) -> Self {
        Self {
            platform,
            path: path.into(),
        }
    }

    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}

impl std::fmt::Display for SnapshotPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.platform, self.path)
    }
}

/// Read-only access to published snapshot files.
///
/// Implementations return `NotFound`/`HttpStatus`/`Transport`/`Io` when a file
/// cannot be read; callers do not distinguish between them.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    async fn fetch(&self, path: &SnapshotPath) -> Result<Vec<u8>>;
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;

    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }

    /// The date of the newest snapshot that can exist right now.
    fn yesterday(&self) -> NaiveDate {
        self.today().pred_opt().unwrap_or(NaiveDate::MIN)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}
