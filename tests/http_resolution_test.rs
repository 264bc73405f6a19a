use chrono::NaiveDate;
use community_pulse::domain::model::Freshness;
use community_pulse::{
    Community, DashboardConfig, DashboardService, HttpSource, Platform, Selection,
};
use httpmock::prelude::*;
use std::sync::Arc;
use std::time::Duration;

fn date(m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, m, d).unwrap()
}

fn service_for(server: &MockServer) -> DashboardService {
    let source = HttpSource::new(
        &server.url("/Json-data/main"),
        &server.url("/discord-bot-data/main"),
        Duration::from_secs(5),
        true,
    )
    .unwrap();
    DashboardService::from_config(Arc::new(source), &DashboardConfig::default())
}

fn telegram_body(messages: u64, users: u64) -> serde_json::Value {
    serde_json::json!({
        "totals": {"messages": messages, "users": users},
        "active_hours_sgt": {"08 PM": messages},
        "ai_analysis": "Summary: Launch chatter. Top Community Questions:\n- When airdrop?\n• Which chain?",
        "sections": [{"name": "General", "msgs": messages}],
        "leaderboards": {
            "community_users": [{"name": "alice", "points": 12}],
            "moderators": [{"name": "bob", "count": 4}]
        }
    })
}

fn selection(platform: Platform, community: &str, day: NaiveDate) -> Selection {
    Selection {
        platform,
        community: Community::new(community),
        date: day,
    }
}

#[tokio::test]
async fn test_missing_day_falls_back_to_previous_day_with_baseline() {
    let server = MockServer::start();
    let primary = server.mock(|when, then| {
        when.method(GET).path("/Json-data/main/SOSOVALUE/mar3_processed.json");
        then.status(404);
    });
    let previous = server.mock(|when, then| {
        when.method(GET)
            .path("/Json-data/main/SOSOVALUE/mar2_processed.json")
            .query_param_exists("t");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(telegram_body(200, 20));
    });
    let baseline = server.mock(|when, then| {
        when.method(GET).path("/Json-data/main/SOSOVALUE/mar1_processed.json");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(telegram_body(100, 25));
    });

    let service = service_for(&server);
    let view = service
        .load(&selection(Platform::Telegram, "SOSOVALUE", date(3, 3)), date(3, 4))
        .await;

    let resolved = view.resolved.as_ref().expect("fallback snapshot");
    assert_eq!(resolved.requested, date(3, 3));
    assert_eq!(resolved.displayed, date(3, 2));
    assert_eq!(resolved.freshness, Freshness::PreviousDay);
    assert_eq!(resolved.snapshot.total_messages(), 200);
    assert_eq!(resolved.baseline.as_ref().unwrap().total_messages(), 100);
    assert_eq!(
        view.notice.as_deref(),
        Some("Showing data from Sun Mar 02 2025 (today's data not available yet)")
    );

    let deltas = view.deltas.unwrap();
    assert_eq!(deltas.messages.percent, 100.0);
    assert_eq!(deltas.users.percent, -20.0);

    let analysis = resolved.snapshot.analysis();
    assert_eq!(analysis.summary, "Launch chatter.");
    assert_eq!(analysis.questions, vec!["When airdrop?", "Which chain?"]);

    // Primary: resolver + weekly window. Previous/baseline: resolver + weekly window.
    primary.assert_hits(2);
    previous.assert_hits(2);
    baseline.assert_hits(2);
}

#[tokio::test]
async fn test_two_missing_days_report_requested_date() {
    let server = MockServer::start();
    let older = server.mock(|when, then| {
        when.method(GET).path("/Json-data/main/SODEX/mar1_processed.json");
        then.status(200).json_body(telegram_body(1, 1));
    });

    let service = service_for(&server);
    let view = service
        .load(&selection(Platform::Telegram, "SODEX", date(3, 3)), date(3, 4))
        .await;

    assert!(view.resolved.is_none());
    assert_eq!(view.error.as_deref(), Some("Data not found for Mon Mar 03 2025"));
    // Only the weekly window reads two days back; the resolver never does.
    older.assert_hits(1);
    assert_eq!(view.weekly.iter().map(|b| b.count).sum::<u64>(), 1);
}

#[tokio::test]
async fn test_server_error_is_treated_like_missing_file() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/discord-bot-data/main/mar3.json");
        then.status(502);
    });
    server.mock(|when, then| {
        when.method(GET).path("/discord-bot-data/main/mar2.json");
        then.status(200)
            .json_body(serde_json::json!({"vitals": {"total_messages": 9, "active_users_count": 3}}));
    });

    let service = service_for(&server);
    let view = service
        .load(&selection(Platform::Discord, "SODEX", date(3, 3)), date(3, 4))
        .await;

    let resolved = view.resolved.unwrap();
    assert_eq!(resolved.freshness, Freshness::PreviousDay);
    assert_eq!(resolved.snapshot.total_messages(), 9);
    assert!(resolved.baseline.is_none());
    assert!(view.deltas.is_none());
}

#[tokio::test]
async fn test_weekly_window_sums_successful_days_only() {
    let server = MockServer::start();
    for (file, count) in [("mar3.json", 5u64), ("feb28.json", 7), ("feb25.json", 11)] {
        server.mock(move |when, then| {
            when.method(GET).path(format!("/discord-bot-data/main/{}", file));
            then.status(200)
                .json_body(serde_json::json!({"hourly_activity": {"18:00": count, "02:00": 1}}));
        });
    }
    // Malformed and failing days contribute nothing.
    server.mock(|when, then| {
        when.method(GET).path("/discord-bot-data/main/mar1.json");
        then.status(200).body("<html>rate limited</html>");
    });
    server.mock(|when, then| {
        when.method(GET).path("/discord-bot-data/main/mar2.json");
        then.status(500);
    });
    // Outside the seven-day window.
    let outside = server.mock(|when, then| {
        when.method(GET).path("/discord-bot-data/main/feb24.json");
        then.status(200)
            .json_body(serde_json::json!({"hourly_activity": {"18:00": 1000}}));
    });

    let service = service_for(&server);
    let view = service
        .load(&selection(Platform::Discord, "SODEX", date(3, 3)), date(3, 4))
        .await;

    assert_eq!(view.weekly.len(), 24);
    assert_eq!(view.weekly[18].hour, "18:00");
    assert_eq!(view.weekly[18].count, 23);
    assert_eq!(view.weekly[2].count, 3);
    assert_eq!(view.weekly.iter().map(|b| b.count).sum::<u64>(), 26);
    outside.assert_hits(0);
}

#[tokio::test]
async fn test_cumulative_uses_yesterday_not_selection() {
    let server = MockServer::start();
    let cumulative = server.mock(|when, then| {
        when.method(GET).path("/discord-bot-data/main/DISCORD/mar9cumm.json");
        then.status(200).json_body(serde_json::json!({
            "total_active_hours": {"18:00": 400},
            "cumulative_until": "March 9",
            "top_moderators": [{"name": "m", "messages": 80}]
        }));
    });

    let service = service_for(&server);
    let view = service
        .load(&selection(Platform::Discord, "SODEX", date(3, 3)), date(3, 10))
        .await;

    cumulative.assert();
    let data = view.cumulative.unwrap();
    assert_eq!(data.cumulative_until.as_deref(), Some("March 9"));
    assert_eq!(data.top_moderators[0].count, 80);
    assert!(view.cumulative_error.is_none());
}
