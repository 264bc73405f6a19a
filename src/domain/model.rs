use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::utils::error::DashboardError;

const TELEGRAM_HOURS: [&str; 24] = [
    "12 AM", "01 AM", "02 AM", "03 AM", "04 AM", "05 AM", "06 AM", "07 AM", "08 AM", "09 AM",
    "10 AM", "11 AM", "12 PM", "01 PM", "02 PM", "03 PM", "04 PM", "05 PM", "06 PM", "07 PM",
    "08 PM", "09 PM", "10 PM", "11 PM",
];

const DISCORD_HOURS: [&str; 24] = [
    "00:00", "01:00", "02:00", "03:00", "04:00", "05:00", "06:00", "07:00", "08:00", "09:00",
    "10:00", "11:00", "12:00", "13:00", "14:00", "15:00", "16:00", "17:00", "18:00", "19:00",
    "20:00", "21:00", "22:00", "23:00",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Telegram,
    Discord,
}

impl Platform {
    /// Canonical hour-of-day labels, in display order.
    pub fn hour_labels(&self) -> &'static [&'static str; 24] {
        match self {
            Platform::Telegram => &TELEGRAM_HOURS,
            Platform::Discord => &DISCORD_HOURS,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Telegram => "telegram",
            Platform::Discord => "discord",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "telegram" | "tg" => Ok(Platform::Telegram),
            "discord" => Ok(Platform::Discord),
            other => Err(DashboardError::InvalidConfigValue {
                field: "platform".to_string(),
                value: other.to_string(),
                reason: "Expected 'telegram' or 'discord'".to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Community(String);

impl Community {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Community {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub name: String,
    /// Published under `count`, `points` or `messages` depending on the file.
    #[serde(default, alias = "points", alias = "messages")]
    pub count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub questions: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TelegramTotals {
    #[serde(default)]
    pub messages: u64,
    #[serde(default)]
    pub users: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub name: String,
    #[serde(default)]
    pub msgs: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TelegramLeaderboards {
    #[serde(default)]
    pub community_users: Vec<LeaderboardEntry>,
    #[serde(default)]
    pub moderators: Vec<LeaderboardEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelegramSnapshot {
    pub totals: TelegramTotals,
    #[serde(default)]
    pub active_hours_sgt: HashMap<String, u64>,
    /// Free text with `Summary:` and `Top Community Questions:` sections.
    #[serde(default)]
    pub ai_analysis: String,
    #[serde(default)]
    pub sections: Option<Vec<Section>>,
    #[serde(default)]
    pub leaderboards: TelegramLeaderboards,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiscordVitals {
    #[serde(default)]
    pub total_messages: u64,
    #[serde(default)]
    pub active_users_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscordSnapshot {
    #[serde(default)]
    pub vitals: DiscordVitals,
    #[serde(default)]
    pub hourly_activity: HashMap<String, u64>,
    #[serde(default)]
    pub ai_analysis: Analysis,
    #[serde(default)]
    pub top_moderators: Vec<LeaderboardEntry>,
    #[serde(default)]
    pub top_chatters: Vec<LeaderboardEntry>,
}

/// One day of statistics for one platform/community.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "platform", content = "data", rename_all = "lowercase")]
pub enum Snapshot {
    Telegram(TelegramSnapshot),
    Discord(DiscordSnapshot),
}

impl Snapshot {
    /// Decodes a fetched body into the payload shape of `platform`.
    pub fn from_slice(platform: Platform, bytes: &[u8]) -> serde_json::Result<Self> {
        Ok(match platform {
            Platform::Telegram => Snapshot::Telegram(serde_json::from_slice(bytes)?),
            Platform::Discord => Snapshot::Discord(serde_json::from_slice(bytes)?),
        })
    }

    pub fn platform(&self) -> Platform {
        match self {
            Snapshot::Telegram(_) => Platform::Telegram,
            Snapshot::Discord(_) => Platform::Discord,
        }
    }

    pub fn total_messages(&self) -> u64 {
        match self {
            Snapshot::Telegram(s) => s.totals.messages,
            Snapshot::Discord(s) => s.vitals.total_messages,
        }
    }

    pub fn active_users(&self) -> u64 {
        match self {
            Snapshot::Telegram(s) => s.totals.users,
            Snapshot::Discord(s) => s.vitals.active_users_count,
        }
    }

    pub fn hourly(&self) -> &HashMap<String, u64> {
        match self {
            Snapshot::Telegram(s) => &s.active_hours_sgt,
            Snapshot::Discord(s) => &s.hourly_activity,
        }
    }

    pub fn analysis(&self) -> Analysis {
        match self {
            Snapshot::Telegram(s) => crate::core::analysis::parse_analysis(&s.ai_analysis),
            Snapshot::Discord(s) => s.ai_analysis.clone(),
        }
    }

    pub fn sections(&self) -> &[Section] {
        match self {
            Snapshot::Telegram(s) => s.sections.as_deref().unwrap_or_default(),
            Snapshot::Discord(_) => &[],
        }
    }

    pub fn moderators(&self) -> &[LeaderboardEntry] {
        match self {
            Snapshot::Telegram(s) => &s.leaderboards.moderators,
            Snapshot::Discord(s) => &s.top_moderators,
        }
    }

    /// Community users on Telegram, top chatters on Discord.
    pub fn members(&self) -> &[LeaderboardEntry] {
        match self {
            Snapshot::Telegram(s) => &s.leaderboards.community_users,
            Snapshot::Discord(s) => &s.top_chatters,
        }
    }
}

/// All-time totals as of the previous day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CumulativeSnapshot {
    #[serde(default)]
    pub total_active_hours: HashMap<String, u64>,
    #[serde(default)]
    pub cumulative_until: Option<String>,
    #[serde(default)]
    pub top_moderators: Vec<LeaderboardEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Freshness {
    Current,
    PreviousDay,
}

/// Outcome of resolving a requested date to the best available snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolved {
    pub requested: NaiveDate,
    pub displayed: NaiveDate,
    pub freshness: Freshness,
    pub snapshot: Snapshot,
    pub baseline: Option<Snapshot>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HourBucket {
    pub hour: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Selection {
    pub platform: Platform,
    pub community: Community,
    pub date: NaiveDate,
}
