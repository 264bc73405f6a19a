use anyhow::Context;
use clap::Parser;
use community_pulse::app::render::{render, RenderOptions};
use community_pulse::app::store::DashboardState;
use community_pulse::domain::ports::{Clock, SnapshotSource, SystemClock};
use community_pulse::utils::error::ErrorSeverity;
use community_pulse::utils::{logger, validation::Validate};
use community_pulse::{
    CliConfig, Dashboard, DashboardConfig, DashboardError, DashboardService, HttpSource,
    LocalSource, Selection,
};
use std::sync::Arc;

fn exit_with(e: &DashboardError) -> ! {
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}

fn render_options(config: &DashboardConfig, selection: &Selection) -> RenderOptions {
    let community = config.community(selection.community.as_str());
    RenderOptions {
        community_label: community
            .map(|c| c.display_label().to_string())
            .unwrap_or_else(|| selection.community.to_string()),
        max_sections: community.and_then(|c| c.max_sections),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }
    tracing::info!("Starting community-pulse");
    tracing::debug!("CLI config: {:?}", cli);

    let config = match cli.validate().and_then(|_| cli.dashboard_config()) {
        Ok(config) => config,
        Err(e) => exit_with(&e),
    };

    let source: Arc<dyn SnapshotSource> = match &cli.data_dir {
        Some(dir) => {
            tracing::info!("📁 Reading snapshots from {}", dir.display());
            Arc::new(LocalSource::new(dir))
        }
        None => match HttpSource::from_config(&config.source) {
            Ok(source) => Arc::new(source),
            Err(e) => exit_with(&e),
        },
    };
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let selection = Selection {
        platform: config.defaults.platform,
        community: config.default_community(),
        date: cli.date.unwrap_or_else(|| clock.yesterday()),
    };
    let options = render_options(&config, &selection);

    if cli.watch {
        run_watch(&cli, &config, source, clock, selection, &options).await
    } else {
        let service = DashboardService::from_config(source, &config);
        let view = service.load(&selection, clock.today()).await;
        let report = render(&view, cli.format, &options)
            .with_context(|| format!("Failed to render {:?} report", cli.format))?;
        println!("{}", report);
        Ok(())
    }
}

async fn run_watch(
    cli: &CliConfig,
    config: &DashboardConfig,
    source: Arc<dyn SnapshotSource>,
    clock: Arc<dyn Clock>,
    selection: Selection,
    options: &RenderOptions,
) -> anyhow::Result<()> {
    tracing::info!(
        "🔍 Watching {} {} (refresh every {:?}, poll every {:?})",
        selection.community,
        selection.platform,
        config.refresh_interval(),
        config.poll_interval()
    );

    let mut dashboard = Dashboard::new(source, config, clock, DashboardState::new(selection));
    let mut views = dashboard.subscribe();
    dashboard.mount();

    loop {
        tokio::select! {
            changed = views.changed() => {
                if changed.is_err() {
                    break;
                }
                let latest = views.borrow_and_update().clone();
                if let Some(view) = latest {
                    match render(&view, cli.format, options) {
                        Ok(report) => println!("{}", report),
                        Err(e) => tracing::error!("Failed to render report: {}", e),
                    }
                }
            }
            signal = tokio::signal::ctrl_c() => {
                signal.context("Failed to listen for Ctrl-C")?;
                tracing::info!("Shutting down");
                break;
            }
        }
    }

    dashboard.teardown();
    Ok(())
}
