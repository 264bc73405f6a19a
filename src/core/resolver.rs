use crate::core::naming::SnapshotLocator;
use crate::domain::model::{Community, Freshness, Platform, Resolved, Snapshot};
use crate::domain::ports::SnapshotSource;
use crate::utils::error::{DashboardError, Result};
use chrono::NaiveDate;
use std::sync::Arc;

/// Finds the best available snapshot for a date: the date itself, or the day
/// before it. Never looks further back than one day.
#[derive(Clone)]
pub struct SnapshotResolver {
    source: Arc<dyn SnapshotSource>,
    locator: SnapshotLocator,
}

impl SnapshotResolver {
    pub fn new(source: Arc<dyn SnapshotSource>, locator: SnapshotLocator) -> Self {
        Self { source, locator }
    }

    pub fn locator(&self) -> &SnapshotLocator {
        &self.locator
    }

    /// Fetches and decodes a single day with no fallback.
    pub async fn fetch_snapshot(
        &self,
        platform: Platform,
        community: &Community,
        date: NaiveDate,
    ) -> Result<Snapshot> {
        let path = self.locator.daily(platform, community, date);
        tracing::debug!("Fetching snapshot {}", path);
        let bytes = self.source.fetch(&path).await?;
        Ok(Snapshot::from_slice(platform, &bytes)?)
    }

    pub async fn resolve(
        &self,
        platform: Platform,
        community: &Community,
        requested: NaiveDate,
    ) -> Result<Resolved> {
        let (displayed, freshness, snapshot) =
            match self.fetch_snapshot(platform, community, requested).await {
                Ok(snapshot) => (requested, Freshness::Current, snapshot),
                Err(e) if e.is_unavailable() => {
                    let previous = requested
                        .pred_opt()
                        .ok_or(DashboardError::DataNotFound { requested })?;
                    tracing::info!(
                        "[{}] {} data not available for {} ({}), trying {}",
                        community,
                        platform,
                        requested,
                        e,
                        previous
                    );
                    match self.fetch_snapshot(platform, community, previous).await {
                        Ok(snapshot) => (previous, Freshness::PreviousDay, snapshot),
                        Err(e) if e.is_unavailable() => {
                            tracing::info!(
                                "[{}] {} data not available for {} either ({})",
                                community,
                                platform,
                                previous,
                                e
                            );
                            return Err(DashboardError::DataNotFound { requested });
                        }
                        Err(e) => return Err(e),
                    }
                }
                Err(e) => return Err(e),
            };

        let baseline = self.fetch_baseline(platform, community, displayed).await;

        Ok(Resolved {
            requested,
            displayed,
            freshness,
            snapshot,
            baseline,
        })
    }

    /// Snapshot of the day before `displayed`, for day-over-day deltas.
    /// Any failure means "no baseline".
    pub async fn fetch_baseline(
        &self,
        platform: Platform,
        community: &Community,
        displayed: NaiveDate,
    ) -> Option<Snapshot> {
        let day = displayed.pred_opt()?;
        match self.fetch_snapshot(platform, community, day).await {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                tracing::debug!("[{}] No baseline for {}: {}", community, day, e);
                None
            }
        }
    }
}
