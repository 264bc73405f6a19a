use crate::core::resolver::SnapshotResolver;
use crate::domain::model::{Community, HourBucket, Platform};
use chrono::{Days, NaiveDate};
use std::collections::HashMap;
use tokio::task::JoinSet;

pub const WINDOW_DAYS: u64 = 7;

/// The dates of the window ending on `end`, newest first.
pub fn window_dates(end: NaiveDate) -> Vec<NaiveDate> {
    (0..WINDOW_DAYS)
        .filter_map(|offset| end.checked_sub_days(Days::new(offset)))
        .collect()
}

/// Sums histograms per hour into the platform's 24 canonical buckets.
/// Labels outside the canonical set are ignored.
pub fn merge_hourly<'a, I>(platform: Platform, histograms: I) -> Vec<HourBucket>
where
    I: IntoIterator<Item = &'a HashMap<String, u64>>,
{
    let mut totals: HashMap<&str, u64> = HashMap::new();
    for histogram in histograms {
        for (hour, count) in histogram {
            *totals.entry(hour.as_str()).or_default() += count;
        }
    }

    platform
        .hour_labels()
        .iter()
        .map(|hour| HourBucket {
            hour: hour.to_string(),
            count: totals.get(hour).copied().unwrap_or(0),
        })
        .collect()
}

/// Hour-of-day activity over the seven days ending on a date.
#[derive(Clone)]
pub struct WeeklyAggregator {
    resolver: SnapshotResolver,
}

impl WeeklyAggregator {
    pub fn new(resolver: SnapshotResolver) -> Self {
        Self { resolver }
    }

    pub async fn aggregate(
        &self,
        platform: Platform,
        community: &Community,
        end: NaiveDate,
    ) -> Vec<HourBucket> {
        let mut fetches = JoinSet::new();
        for day in window_dates(end) {
            let resolver = self.resolver.clone();
            let community = community.clone();
            fetches.spawn(async move {
                let result = resolver.fetch_snapshot(platform, &community, day).await;
                (day, result)
            });
        }

        let mut histograms = Vec::new();
        while let Some(joined) = fetches.join_next().await {
            match joined {
                Ok((_, Ok(snapshot))) => histograms.push(snapshot.hourly().clone()),
                Ok((day, Err(e))) => {
                    tracing::debug!("[{}] Skipping {} in weekly window: {}", community, day, e)
                }
                Err(e) => tracing::warn!("[{}] Weekly fetch task failed: {}", community, e),
            }
        }

        tracing::debug!(
            "[{}] Weekly window ending {} built from {}/{} days",
            community,
            end,
            histograms.len(),
            WINDOW_DAYS
        );
        merge_hourly(platform, &histograms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemorySource;
    use crate::core::naming::SnapshotLocator;
    use std::sync::Arc;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, m, d).unwrap()
    }

    fn histogram(pairs: &[(&str, u64)]) -> HashMap<String, u64> {
        pairs.iter().map(|(h, c)| (h.to_string(), *c)).collect()
    }

    #[test]
    fn test_window_dates_cross_month_boundary() {
        let dates = window_dates(date(3, 3));
        assert_eq!(dates.len(), 7);
        assert_eq!(dates[0], date(3, 3));
        assert_eq!(dates[6], date(2, 25));
    }

    #[test]
    fn test_merge_hourly_sums_and_orders() {
        let a = histogram(&[("12 AM", 2), ("05 PM", 10)]);
        let b = histogram(&[("12 AM", 3), ("not an hour", 99)]);

        let buckets = merge_hourly(Platform::Telegram, [&a, &b]);

        assert_eq!(buckets.len(), 24);
        assert_eq!(buckets[0], HourBucket { hour: "12 AM".to_string(), count: 5 });
        assert_eq!(buckets[17], HourBucket { hour: "05 PM".to_string(), count: 10 });
        assert_eq!(buckets.iter().map(|b| b.count).sum::<u64>(), 15);
    }

    #[test]
    fn test_merge_hourly_empty_is_all_zero() {
        let buckets = merge_hourly(Platform::Discord, std::iter::empty::<&HashMap<String, u64>>());
        assert_eq!(buckets.len(), 24);
        assert_eq!(buckets[0].hour, "00:00");
        assert!(buckets.iter().all(|b| b.count == 0));
    }

    #[tokio::test]
    async fn test_aggregate_skips_missing_days() {
        let source = Arc::new(MemorySource::new());
        let resolver = SnapshotResolver::new(source.clone(), SnapshotLocator::default());
        let community = Community::new("SODEX");

        for (day, count) in [(3, 1u64), (1, 2), (2, 4)] {
            source.insert_json(
                resolver.locator().daily(Platform::Discord, &community, date(3, day)),
                &serde_json::json!({"hourly_activity": {"13:00": count, "00:00": 1}}),
            );
        }
        // Outside the window.
        source.insert_json(
            resolver.locator().daily(Platform::Discord, &community, date(2, 20)),
            &serde_json::json!({"hourly_activity": {"13:00": 1000}}),
        );

        let buckets = WeeklyAggregator::new(resolver)
            .aggregate(Platform::Discord, &community, date(3, 3))
            .await;

        assert_eq!(buckets.len(), 24);
        assert_eq!(buckets[13].count, 7);
        assert_eq!(buckets[0].count, 3);
        assert_eq!(source.calls().len(), 7);
    }

    #[tokio::test]
    async fn test_aggregate_all_missing() {
        let source = Arc::new(MemorySource::new());
        let resolver = SnapshotResolver::new(source, SnapshotLocator::default());

        let buckets = WeeklyAggregator::new(resolver)
            .aggregate(Platform::Telegram, &Community::new("SOSOVALUE"), date(1, 2))
            .await;

        assert_eq!(buckets.len(), 24);
        assert_eq!(buckets.iter().map(|b| b.count).sum::<u64>(), 0);
    }
}
