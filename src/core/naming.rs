//! File naming for published snapshots.
//!
//! Files are keyed by `{mon}{day}`: the lower-case English month abbreviation
//! followed by the day of month without a leading zero (`mar3`, `dec25`).

use crate::domain::model::{Community, Platform};
use crate::domain::ports::SnapshotPath;
use chrono::{Datelike, NaiveDate};

pub fn date_stem(date: NaiveDate) -> String {
    format!("{}{}", date.format("%b").to_string().to_lowercase(), date.day())
}

pub fn daily_file_name(platform: Platform, date: NaiveDate) -> String {
    match platform {
        Platform::Telegram => format!("{}_processed.json", date_stem(date)),
        Platform::Discord => format!("{}.json", date_stem(date)),
    }
}

pub fn cumulative_file_name(date: NaiveDate) -> String {
    format!("{}cumm.json", date_stem(date))
}

/// Maps (platform, community, date) to the relative path of a file.
///
/// Telegram files live in one folder per community. Discord daily files sit at
/// the root of the Discord host, its cumulative files in a single subfolder.
#[derive(Debug, Clone)]
pub struct SnapshotLocator {
    discord_cumulative_dir: String,
}

impl SnapshotLocator {
    pub fn new(discord_cumulative_dir: impl Into<String>) -> Self {
        Self {
            discord_cumulative_dir: discord_cumulative_dir.into().trim_matches('/').to_string(),
        }
    }

    pub fn daily(&self, platform: Platform, community: &Community, date: NaiveDate) -> SnapshotPath {
        let file = daily_file_name(platform, date);
        match platform {
            Platform::Telegram => SnapshotPath::new(platform, format!("{}/{}", community, file)),
            Platform::Discord => SnapshotPath::new(platform, file),
        }
    }

    pub fn cumulative(
        &self,
        platform: Platform,
        community: &Community,
        date: NaiveDate,
    ) -> SnapshotPath {
        let file = cumulative_file_name(date);
        match platform {
            Platform::Telegram => SnapshotPath::new(platform, format!("{}/{}", community, file)),
            Platform::Discord if self.discord_cumulative_dir.is_empty() => {
                SnapshotPath::new(platform, file)
            }
            Platform::Discord => {
                SnapshotPath::new(platform, format!("{}/{}", self.discord_cumulative_dir, file))
            }
        }
    }
}

impl Default for SnapshotLocator {
    fn default() -> Self {
        Self::new("DISCORD")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_daily_file_names() {
        assert_eq!(daily_file_name(Platform::Telegram, date(2025, 3, 3)), "mar3_processed.json");
        assert_eq!(daily_file_name(Platform::Telegram, date(2025, 12, 25)), "dec25_processed.json");
        assert_eq!(daily_file_name(Platform::Discord, date(2025, 9, 9)), "sep9.json");
    }

    #[test]
    fn test_cumulative_file_name() {
        assert_eq!(cumulative_file_name(date(2025, 3, 3)), "mar3cumm.json");
        assert_eq!(cumulative_file_name(date(2025, 11, 30)), "nov30cumm.json");
    }

    #[test]
    fn test_locator_paths() {
        let locator = SnapshotLocator::default();
        let community = Community::new("SOSOVALUE");

        assert_eq!(
            locator.daily(Platform::Telegram, &community, date(2025, 1, 7)).path,
            "SOSOVALUE/jan7_processed.json"
        );
        assert_eq!(locator.daily(Platform::Discord, &community, date(2025, 1, 7)).path, "jan7.json");
        assert_eq!(
            locator.cumulative(Platform::Telegram, &community, date(2025, 1, 7)).path,
            "SOSOVALUE/jan7cumm.json"
        );
        assert_eq!(
            locator.cumulative(Platform::Discord, &community, date(2025, 1, 7)).path,
            "DISCORD/jan7cumm.json"
        );
    }

    #[test]
    fn test_locator_trims_cumulative_dir() {
        let locator = SnapshotLocator::new("/stats/");
        let path = locator.cumulative(Platform::Discord, &Community::new("SODEX"), date(2025, 2, 1));
        assert_eq!(path.path, "stats/feb1cumm.json");
        assert_eq!(path.file_name(), "feb1cumm.json");
    }
}
