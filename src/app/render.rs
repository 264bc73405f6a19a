use crate::app::service::DashboardView;
use crate::core::compare::Delta;
use crate::domain::model::{HourBucket, LeaderboardEntry, Platform, Snapshot};
use crate::utils::error::{DashboardError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt::Write as _;
use std::str::FromStr;
use std::sync::OnceLock;

const BAR_WIDTH: u64 = 30;
const MAX_QUESTIONS: usize = 3;
const DISCORD_MODERATORS: usize = 5;
const DISCORD_CHATTERS: usize = 10;
const TELEGRAM_LEADERBOARD: usize = 10;

fn numbered_prefix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+\.\s*").expect("static regex"))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Csv,
}

impl FromStr for OutputFormat {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(DashboardError::InvalidConfigValue {
                field: "format".to_string(),
                value: other.to_string(),
                reason: "Valid formats: text, json, csv".to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    pub community_label: String,
    pub max_sections: Option<usize>,
}

pub fn render(view: &DashboardView, format: OutputFormat, options: &RenderOptions) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(view, options)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(view)?),
        OutputFormat::Csv => render_csv(view),
    }
}

/// `hour,daily,weekly` rows in canonical hour order.
pub fn render_csv(view: &DashboardView) -> Result<String> {
    let platform = view.selection.platform;
    let empty = HashMap::new();
    let daily = view
        .resolved
        .as_ref()
        .map(|r| r.snapshot.hourly())
        .unwrap_or(&empty);
    let weekly: HashMap<&str, u64> = view
        .weekly
        .iter()
        .map(|b| (b.hour.as_str(), b.count))
        .collect();

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["hour", "daily", "weekly"])?;
    for hour in platform.hour_labels() {
        writer.write_record([
            hour.to_string(),
            daily.get(*hour).copied().unwrap_or(0).to_string(),
            weekly.get(hour).copied().unwrap_or(0).to_string(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| DashboardError::Io(e.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn format_delta(delta: Option<&Delta>) -> String {
    match delta {
        Some(d) if d.is_increase() => format!(" (▲ {:.1}%)", d.percent.abs()),
        Some(d) => format!(" (▼ {:.1}%)", d.percent.abs()),
        None => String::new(),
    }
}

fn write_histogram(out: &mut String, title: &str, buckets: &[HourBucket]) {
    let max = buckets.iter().map(|b| b.count).max().unwrap_or(0);
    let _ = writeln!(out, "\n{}", title);
    if max == 0 {
        let _ = writeln!(out, "  (no activity)");
        return;
    }
    for bucket in buckets {
        let bar = "█".repeat((bucket.count * BAR_WIDTH / max) as usize);
        let _ = writeln!(out, "  {:>5} | {} {}", bucket.hour, bar, bucket.count);
    }
}

fn write_leaderboard(out: &mut String, title: &str, entries: &[LeaderboardEntry], limit: Option<usize>) {
    if entries.is_empty() {
        return;
    }
    let _ = writeln!(out, "\n{}", title);
    let shown = limit.unwrap_or(entries.len());
    for (i, entry) in entries.iter().take(shown).enumerate() {
        let _ = writeln!(out, "  {}. {} - {} messages", i + 1, entry.name, group_thousands(entry.count));
    }
}

fn ordered_buckets(platform: Platform, histogram: &HashMap<String, u64>) -> Vec<HourBucket> {
    crate::core::weekly::merge_hourly(platform, [histogram])
}

pub fn render_text(view: &DashboardView, options: &RenderOptions) -> String {
    let selection = &view.selection;
    let platform = selection.platform;
    let mut out = String::new();

    let label = if options.community_label.is_empty() {
        selection.community.as_str()
    } else {
        options.community_label.as_str()
    };
    let _ = writeln!(
        out,
        "{} · {} · {}",
        label,
        platform,
        selection.date.format("%a %b %d %Y")
    );

    if let Some(notice) = &view.notice {
        let _ = writeln!(out, "{}", notice);
    }
    if let Some(error) = &view.error {
        let _ = writeln!(out, "⚠ {}", error);
    }

    if let Some(resolved) = &view.resolved {
        let snapshot = &resolved.snapshot;
        let deltas = view.deltas.as_ref();
        let _ = writeln!(
            out,
            "\nTotal messages: {}{}",
            group_thousands(snapshot.total_messages()),
            format_delta(deltas.map(|d| &d.messages))
        );
        let _ = writeln!(
            out,
            "Active users:   {}{}",
            group_thousands(snapshot.active_users()),
            format_delta(deltas.map(|d| &d.users))
        );

        let analysis = snapshot.analysis();
        if !analysis.summary.is_empty() {
            let _ = writeln!(out, "\nSummary\n  {}", analysis.summary);
        }
        if !analysis.questions.is_empty() {
            let _ = writeln!(out, "\nTop community questions");
            for (i, question) in analysis.questions.iter().take(MAX_QUESTIONS).enumerate() {
                // Telegram questions sometimes arrive already numbered.
                let question = match snapshot {
                    Snapshot::Telegram(_) => numbered_prefix().replace(question, ""),
                    Snapshot::Discord(_) => Cow::Borrowed(question.as_str()),
                };
                let _ = writeln!(out, "  {}. {}", i + 1, question);
            }
        }

        write_histogram(&mut out, "Hourly activity", &ordered_buckets(platform, snapshot.hourly()));
    }

    write_histogram(&mut out, "Weekly peak hours (past 7 days)", &view.weekly);

    if let Some(resolved) = &view.resolved {
        let snapshot = &resolved.snapshot;
        let sections = snapshot.sections();
        if !sections.is_empty() {
            let _ = writeln!(out, "\nSections");
            for section in sections.iter().take(options.max_sections.unwrap_or(sections.len())) {
                let _ = writeln!(out, "  {} - {} msgs", section.name, group_thousands(section.msgs));
            }
        }

        match snapshot {
            Snapshot::Telegram(_) => {
                write_leaderboard(&mut out, "Moderators", snapshot.moderators(), Some(TELEGRAM_LEADERBOARD));
                write_leaderboard(&mut out, "Community users", snapshot.members(), Some(TELEGRAM_LEADERBOARD));
            }
            Snapshot::Discord(_) => {
                write_leaderboard(&mut out, "Top moderators", snapshot.moderators(), Some(DISCORD_MODERATORS));
                write_leaderboard(&mut out, "Top chatters", snapshot.members(), Some(DISCORD_CHATTERS));
            }
        }
    }

    if let Some(cumulative) = &view.cumulative {
        if !cumulative.total_active_hours.is_empty() {
            write_histogram(
                &mut out,
                "All-time activity by hour",
                &ordered_buckets(platform, &cumulative.total_active_hours),
            );
        }
        write_leaderboard(&mut out, "All-time moderators", &cumulative.top_moderators, None);
        if let Some(until) = &cumulative.cumulative_until {
            let _ = writeln!(out, "  Data cumulative until {}", until);
        }
    }

    if let Some(updated) = &view.last_updated {
        let _ = writeln!(out, "\nLast updated: {}", updated.format("%Y-%m-%d %H:%M:%S"));
    }

    out
}
