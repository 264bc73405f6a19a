use crate::core::naming::SnapshotLocator;
use crate::domain::model::{Community, Platform};
use crate::utils::error::{DashboardError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

const DEFAULT_TELEGRAM_BASE_URL: &str = "https://raw.githubusercontent.com/Eliasdegemu61/Json-data/main";
const DEFAULT_DISCORD_BASE_URL: &str =
    "https://raw.githubusercontent.com/Eliasdegemu61/discord-bot-data/main";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub defaults: DefaultsConfig,
    #[serde(default = "default_communities")]
    pub communities: Vec<CommunityConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default = "default_telegram_base_url")]
    pub telegram_base_url: String,
    #[serde(default = "default_discord_base_url")]
    pub discord_base_url: String,
    #[serde(default = "default_discord_cumulative_dir")]
    pub discord_cumulative_dir: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    /// Appends `t=<millis>` to every request so intermediaries never serve stale files.
    #[serde(default = "default_true")]
    pub cache_bust: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_seconds: u64,
    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default = "default_platform")]
    pub platform: Platform,
    #[serde(default = "default_community")]
    pub community: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommunityConfig {
    pub id: String,
    #[serde(default)]
    pub label: Option<String>,
    /// How many chat sections the report lists; all of them when unset.
    #[serde(default)]
    pub max_sections: Option<usize>,
}

fn default_telegram_base_url() -> String {
    DEFAULT_TELEGRAM_BASE_URL.to_string()
}

fn default_discord_base_url() -> String {
    DEFAULT_DISCORD_BASE_URL.to_string()
}

fn default_discord_cumulative_dir() -> String {
    "DISCORD".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

fn default_refresh_interval() -> u64 {
    3600
}

fn default_poll_interval() -> u64 {
    1800
}

fn default_platform() -> Platform {
    Platform::Telegram
}

fn default_community() -> String {
    "SOSOVALUE".to_string()
}

fn default_communities() -> Vec<CommunityConfig> {
    vec![
        CommunityConfig {
            id: "SOSOVALUE".to_string(),
            label: Some("SoSoValue".to_string()),
            max_sections: Some(5),
        },
        CommunityConfig {
            id: "SODEX".to_string(),
            label: Some("SoDEX".to_string()),
            max_sections: None,
        },
    ]
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            telegram_base_url: default_telegram_base_url(),
            discord_base_url: default_discord_base_url(),
            discord_cumulative_dir: default_discord_cumulative_dir(),
            timeout_seconds: default_timeout_seconds(),
            cache_bust: true,
        }
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            refresh_interval_seconds: default_refresh_interval(),
            poll_interval_seconds: default_poll_interval(),
        }
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            platform: default_platform(),
            community: default_community(),
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            source: SourceConfig::default(),
            schedule: ScheduleConfig::default(),
            defaults: DefaultsConfig::default(),
            communities: default_communities(),
        }
    }
}

impl CommunityConfig {
    pub fn community(&self) -> Community {
        Community::new(&self.id)
    }

    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.id)
    }
}

impl DashboardConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(DashboardError::Io)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| DashboardError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${SNAPSHOT_HOST})
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| DashboardError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_url("source.telegram_base_url", &self.source.telegram_base_url)?;
        validation::validate_url("source.discord_base_url", &self.source.discord_base_url)?;
        validation::validate_positive_number("source.timeout_seconds", self.source.timeout_seconds, 1)?;
        validation::validate_positive_number(
            "schedule.refresh_interval_seconds",
            self.schedule.refresh_interval_seconds,
            1,
        )?;
        validation::validate_positive_number(
            "schedule.poll_interval_seconds",
            self.schedule.poll_interval_seconds,
            1,
        )?;

        if self.communities.is_empty() {
            return Err(DashboardError::MissingConfig {
                field: "communities".to_string(),
            });
        }
        for community in &self.communities {
            validation::validate_path_segment("communities.id", &community.id)?;
        }
        validation::validate_unique(
            "communities.id",
            self.communities.iter().map(|c| c.id.as_str()),
        )?;

        if self.community(&self.defaults.community).is_none() {
            return Err(DashboardError::InvalidConfigValue {
                field: "defaults.community".to_string(),
                value: self.defaults.community.clone(),
                reason: format!(
                    "Not a configured community. Configured: {}",
                    self.communities
                        .iter()
                        .map(|c| c.id.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            });
        }

        Ok(())
    }

    pub fn community(&self, id: &str) -> Option<&CommunityConfig> {
        self.communities
            .iter()
            .find(|c| c.id.eq_ignore_ascii_case(id))
    }

    pub fn default_community(&self) -> Community {
        self.community(&self.defaults.community)
            .map(CommunityConfig::community)
            .unwrap_or_else(|| Community::new(&self.defaults.community))
    }

    pub fn locator(&self) -> SnapshotLocator {
        SnapshotLocator::new(&self.source.discord_cumulative_dir)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.schedule.refresh_interval_seconds)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.schedule.poll_interval_seconds)
    }

    pub fn max_sections(&self, community: &Community) -> Option<usize> {
        self.community(community.as_str()).and_then(|c| c.max_sections)
    }
}

impl Validate for DashboardConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config_is_valid() {
        let config = DashboardConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.default_community(), Community::new("SOSOVALUE"));
        assert_eq!(config.max_sections(&Community::new("SOSOVALUE")), Some(5));
        assert_eq!(config.max_sections(&Community::new("SODEX")), None);
        assert_eq!(config.poll_interval(), Duration::from_secs(1800));
    }

    #[test]
    fn test_parse_partial_toml_uses_defaults() {
        let toml_content = r#"
[schedule]
poll_interval_seconds = 600

[defaults]
platform = "discord"
community = "SODEX"
"#;

        let config = DashboardConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.schedule.poll_interval_seconds, 600);
        assert_eq!(config.schedule.refresh_interval_seconds, 3600);
        assert_eq!(config.defaults.platform, Platform::Discord);
        assert_eq!(config.communities.len(), 2);
        assert!(config.source.cache_bust);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("PULSE_TEST_HOST", "https://mirror.example.com");

        let toml_content = r#"
[source]
telegram_base_url = "${PULSE_TEST_HOST}/telegram"
"#;

        let config = DashboardConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.source.telegram_base_url, "https://mirror.example.com/telegram");

        std::env::remove_var("PULSE_TEST_HOST");
    }

    #[test]
    fn test_config_validation() {
        let invalid_url = DashboardConfig::from_toml_str(
            r#"
[source]
discord_base_url = "invalid-url"
"#,
        )
        .unwrap();
        assert!(invalid_url.validate().is_err());

        let unknown_default = DashboardConfig::from_toml_str(
            r#"
[defaults]
community = "ELSEWHERE"
"#,
        )
        .unwrap();
        assert!(matches!(
            unknown_default.validate(),
            Err(DashboardError::InvalidConfigValue { .. })
        ));

        let zero_poll = DashboardConfig::from_toml_str(
            r#"
[schedule]
poll_interval_seconds = 0
"#,
        )
        .unwrap();
        assert!(zero_poll.validate().is_err());
    }

    #[test]
    fn test_custom_communities() {
        let config = DashboardConfig::from_toml_str(
            r#"
[defaults]
community = "ALPHA"

[[communities]]
id = "ALPHA"
max_sections = 3

[[communities]]
id = "BETA"
label = "Beta Chat"
"#,
        )
        .unwrap();

        assert!(config.validate().is_ok());
        assert_eq!(config.community("alpha").unwrap().display_label(), "ALPHA");
        assert_eq!(config.community("BETA").unwrap().display_label(), "Beta Chat");
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[source]\ntimeout_seconds = 5\ncache_bust = false\n")
            .unwrap();

        let config = DashboardConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.source.timeout_seconds, 5);
        assert!(!config.source.cache_bust);
    }

    #[test]
    fn test_invalid_toml() {
        let err = DashboardConfig::from_toml_str("[source\n").unwrap_err();
        assert!(matches!(err, DashboardError::ConfigError { .. }));
    }
}
