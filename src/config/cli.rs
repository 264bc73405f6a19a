use crate::config::toml_config::DashboardConfig;
use crate::app::render::OutputFormat;
use crate::domain::model::Platform;
use crate::utils::error::{DashboardError, Result};
use crate::utils::validation::Validate;
use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "community-pulse")]
#[command(about = "Community engagement dashboard for Telegram and Discord snapshots")]
pub struct CliConfig {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// telegram or discord (overrides defaults.platform)
    #[arg(long)]
    pub platform: Option<Platform>,

    /// Community id (overrides defaults.community)
    #[arg(long)]
    pub community: Option<String>,

    /// Day to show, YYYY-MM-DD. Defaults to yesterday.
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// Read snapshots from a local mirror instead of the file host
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    #[arg(long, default_value = "text")]
    pub format: OutputFormat,

    /// Keep running: refresh periodically and poll for yesterday's data
    #[arg(long)]
    pub watch: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,
}

impl CliConfig {
    /// Loads the configuration file (or the built-in defaults) and applies
    /// command-line overrides on top.
    pub fn dashboard_config(&self) -> Result<DashboardConfig> {
        let mut config = match &self.config {
            Some(path) => DashboardConfig::from_file(path)?,
            None => DashboardConfig::default(),
        };
        if let Some(platform) = self.platform {
            config.defaults.platform = platform;
        }
        if let Some(community) = &self.community {
            config.defaults.community = community.clone();
        }
        config.validate()?;
        Ok(config)
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        if let Some(dir) = &self.data_dir {
            if !dir.is_dir() {
                return Err(DashboardError::InvalidConfigValue {
                    field: "data_dir".to_string(),
                    value: dir.display().to_string(),
                    reason: "Not a directory".to_string(),
                });
            }
        }
        Ok(())
    }
}
