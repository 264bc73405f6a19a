use crate::config::toml_config::DashboardConfig;
use crate::core::compare::DayOverDay;
use crate::core::cumulative::CumulativeFetcher;
use crate::core::naming::SnapshotLocator;
use crate::core::resolver::SnapshotResolver;
use crate::core::weekly::WeeklyAggregator;
use crate::domain::model::{
    CumulativeSnapshot, Freshness, HourBucket, Resolved, Selection,
};
use crate::domain::ports::SnapshotSource;
use crate::utils::error::DashboardError;
use chrono::{DateTime, Local, NaiveDate};
use serde::Serialize;
use std::sync::Arc;

/// Everything one load of the dashboard produced. Sections that failed carry a
/// message instead of data; nothing here is fatal.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub selection: Selection,
    pub resolved: Option<Resolved>,
    /// Set when the displayed day is not the requested one.
    pub notice: Option<String>,
    pub error: Option<String>,
    pub deltas: Option<DayOverDay>,
    pub weekly: Vec<HourBucket>,
    pub cumulative: Option<CumulativeSnapshot>,
    pub cumulative_error: Option<String>,
    pub last_updated: Option<DateTime<Local>>,
}

impl DashboardView {
    pub fn has_data(&self) -> bool {
        self.resolved.is_some()
    }
}

pub fn fallback_notice(displayed: NaiveDate) -> String {
    format!(
        "Showing data from {} (today's data not available yet)",
        displayed.format("%a %b %d %Y")
    )
}

/// Runs the full fetch path for one selection.
#[derive(Clone)]
pub struct DashboardService {
    resolver: SnapshotResolver,
    weekly: WeeklyAggregator,
    cumulative: CumulativeFetcher,
}

impl DashboardService {
    pub fn new(source: Arc<dyn SnapshotSource>, locator: SnapshotLocator) -> Self {
        let resolver = SnapshotResolver::new(Arc::clone(&source), locator.clone());
        Self {
            weekly: WeeklyAggregator::new(resolver.clone()),
            cumulative: CumulativeFetcher::new(source, locator),
            resolver,
        }
    }

    pub fn from_config(source: Arc<dyn SnapshotSource>, config: &DashboardConfig) -> Self {
        Self::new(source, config.locator())
    }

    /// Loads the selected day, its seven-day window and the cumulative totals
    /// as of yesterday (relative to `today`, not to the selection).
    pub async fn load(&self, selection: &Selection, today: NaiveDate) -> DashboardView {
        let Selection {
            platform,
            community,
            date,
        } = selection;
        let as_of = today.pred_opt().unwrap_or(today);

        let (resolved, weekly, cumulative) = tokio::join!(
            self.resolver.resolve(*platform, community, *date),
            self.weekly.aggregate(*platform, community, *date),
            self.cumulative.fetch(*platform, community, as_of),
        );

        let (resolved, error) = match resolved {
            Ok(resolved) => (Some(resolved), None),
            Err(e) => {
                match &e {
                    DashboardError::DataNotFound { .. } => {
                        tracing::info!("[{}] {}", community, e)
                    }
                    _ => tracing::warn!("[{}] Failed to load {} data: {}", community, platform, e),
                }
                (None, Some(e.user_friendly_message()))
            }
        };

        let notice = resolved
            .as_ref()
            .filter(|r| r.freshness == Freshness::PreviousDay)
            .map(|r| fallback_notice(r.displayed));

        let deltas = resolved.as_ref().and_then(|r| {
            r.baseline
                .as_ref()
                .map(|baseline| DayOverDay::between(&r.snapshot, baseline))
        });

        let (cumulative, cumulative_error) = match cumulative {
            Ok(data) => (Some(data), None),
            Err(e) => {
                tracing::debug!("[{}] Cumulative data unavailable: {}", community, e);
                (None, Some(format!("Cumulative data not found: {}", e)))
            }
        };

        DashboardView {
            selection: selection.clone(),
            last_updated: resolved.as_ref().map(|_| Local::now()),
            resolved,
            notice,
            error,
            deltas,
            weekly,
            cumulative,
            cumulative_error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemorySource;
    use crate::domain::model::{Community, Platform};
    use crate::domain::ports::SnapshotPath;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, m, d).unwrap()
    }

    fn telegram_day(messages: u64, users: u64) -> serde_json::Value {
        serde_json::json!({
            "totals": {"messages": messages, "users": users},
            "active_hours_sgt": {"09 PM": messages},
            "ai_analysis": "Summary: Calm. Top Community Questions:\n- When?"
        })
    }

    fn selection(platform: Platform, m: u32, d: u32) -> Selection {
        Selection {
            platform,
            community: Community::new("SOSOVALUE"),
            date: date(m, d),
        }
    }

    #[tokio::test]
    async fn test_load_full_view() {
        let source = Arc::new(MemorySource::new());
        source.insert_json(
            SnapshotPath::new(Platform::Telegram, "SOSOVALUE/mar3_processed.json"),
            &telegram_day(150, 12),
        );
        source.insert_json(
            SnapshotPath::new(Platform::Telegram, "SOSOVALUE/mar2_processed.json"),
            &telegram_day(100, 12),
        );
        source.insert_json(
            SnapshotPath::new(Platform::Telegram, "SOSOVALUE/mar3cumm.json"),
            &serde_json::json!({"cumulative_until": "mar3"}),
        );
        let service = DashboardService::new(source, SnapshotLocator::default());

        let view = service.load(&selection(Platform::Telegram, 3, 3), date(3, 4)).await;

        assert!(view.has_data());
        assert!(view.notice.is_none());
        assert!(view.error.is_none());
        let deltas = view.deltas.unwrap();
        assert_eq!(deltas.messages.percent, 50.0);
        assert_eq!(deltas.users.percent, 0.0);
        assert_eq!(view.weekly[21].count, 250);
        assert_eq!(view.cumulative.unwrap().cumulative_until.as_deref(), Some("mar3"));
        assert!(view.last_updated.is_some());
    }

    #[tokio::test]
    async fn test_load_fallback_sets_notice() {
        let source = Arc::new(MemorySource::new());
        source.insert_json(
            SnapshotPath::new(Platform::Telegram, "SOSOVALUE/mar2_processed.json"),
            &telegram_day(80, 7),
        );
        let service = DashboardService::new(source, SnapshotLocator::default());

        let view = service.load(&selection(Platform::Telegram, 3, 3), date(3, 4)).await;

        assert_eq!(
            view.notice.as_deref(),
            Some("Showing data from Sun Mar 02 2025 (today's data not available yet)")
        );
        assert!(view.deltas.is_none());
        assert!(view.cumulative.is_none());
        assert!(view.cumulative_error.is_some());
    }

    #[tokio::test]
    async fn test_load_missing_data_degrades() {
        let source = Arc::new(MemorySource::new());
        let service = DashboardService::new(source, SnapshotLocator::default());

        let view = service.load(&selection(Platform::Discord, 3, 3), date(3, 4)).await;

        assert!(!view.has_data());
        assert_eq!(view.error.as_deref(), Some("Data not found for Mon Mar 03 2025"));
        assert_eq!(view.weekly.len(), 24);
        assert!(view.last_updated.is_none());
    }

    #[tokio::test]
    async fn test_load_malformed_snapshot_reports_generic_failure() {
        let source = Arc::new(MemorySource::new());
        source.insert(
            SnapshotPath::new(Platform::Discord, "mar3.json"),
            b"<html>".to_vec(),
        );
        let service = DashboardService::new(source, SnapshotLocator::default());

        let view = service.load(&selection(Platform::Discord, 3, 3), date(3, 4)).await;

        assert_eq!(view.error.as_deref(), Some("Failed to fetch data"));
    }
}
