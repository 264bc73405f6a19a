use crate::core::naming::SnapshotLocator;
use crate::domain::model::{Community, CumulativeSnapshot, Platform};
use crate::domain::ports::SnapshotSource;
use crate::utils::error::Result;
use chrono::NaiveDate;
use std::sync::Arc;

/// Fetches the all-time aggregate published for `as_of` (normally yesterday).
pub async fn fetch_cumulative(
    source: &dyn SnapshotSource,
    locator: &SnapshotLocator,
    platform: Platform,
    community: &Community,
    as_of: NaiveDate,
) -> Result<CumulativeSnapshot> {
    let path = locator.cumulative(platform, community, as_of);
    tracing::debug!("Fetching cumulative data from {}", path);
    let bytes = source.fetch(&path).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[derive(Clone)]
pub struct CumulativeFetcher {
    source: Arc<dyn SnapshotSource>,
    locator: SnapshotLocator,
}

impl CumulativeFetcher {
    pub fn new(source: Arc<dyn SnapshotSource>, locator: SnapshotLocator) -> Self {
        Self { source, locator }
    }

    pub async fn fetch(
        &self,
        platform: Platform,
        community: &Community,
        as_of: NaiveDate,
    ) -> Result<CumulativeSnapshot> {
        fetch_cumulative(self.source.as_ref(), &self.locator, platform, community, as_of).await
    }
}
