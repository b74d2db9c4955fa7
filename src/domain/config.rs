//! # Configuration
//!
//! Loads the bot configuration from an optional `config.yaml` and layers the
//! `MIA_*` environment variables on top of it.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Main application configuration structure.
/// Matches the layout of `data/config.yaml`.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub services: ServicesConfig,
    #[serde(default)]
    pub feeds: FeedsConfig,
    #[serde(default)]
    pub check: CheckConfig,
    #[serde(default)]
    pub tools: ToolsConfig,
    #[serde(default)]
    pub system: SystemConfig,
}

/// Connected chat services. Each one is optional; at least one must be set.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ServicesConfig {
    #[serde(default)]
    pub telegram: Option<TelegramConfig>,
    #[serde(default)]
    pub matrix: Option<MatrixConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TelegramConfig {
    pub token: String,
    /// Chats that receive new-episode announcements.
    #[serde(default)]
    pub chat_ids: Vec<String>,
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout_secs: u64,
    #[serde(default = "default_telegram_api")]
    pub api_url: String,
}

/// Specific configuration for the Matrix service.
#[derive(Debug, Deserialize, Clone)]
pub struct MatrixConfig {
    pub username: String,
    pub password: String,
    pub homeserver: String,
    /// Rooms that receive new-episode announcements.
    #[serde(default)]
    pub rooms: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FeedsConfig {
    #[serde(default)]
    pub urls: Vec<String>,
    #[serde(default)]
    pub youtube: Option<String>,
    /// Path prefix for snapshot dumps; feed `i` is stored at `{dump}_{i}`.
    #[serde(default)]
    pub dump: Option<String>,
    #[serde(default = "default_max_age")]
    pub max_age_secs: u64,
    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,
}

impl Default for FeedsConfig {
    fn default() -> Self {
        Self {
            urls: Vec::new(),
            youtube: None,
            dump: None,
            max_age_secs: default_max_age(),
            http_timeout_secs: default_http_timeout(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct CheckConfig {
    #[serde(default = "default_interval")]
    pub interval_secs: u64,
    #[serde(default = "default_first_delay")]
    pub first_delay_secs: u64,
    #[serde(default = "default_initial_check_age")]
    pub initial_check_age_secs: u64,
    #[serde(default = "default_debug_max_age")]
    pub debug_max_age_secs: u64,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval(),
            first_delay_secs: default_first_delay(),
            initial_check_age_secs: default_initial_check_age(),
            debug_max_age_secs: default_debug_max_age(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ToolsConfig {
    #[serde(default = "default_cowsay")]
    pub cowsay: String,
    #[serde(default = "default_fortune")]
    pub fortune: String,
    /// Cow file passed to `cowsay -f`. The bundled crow is used when unset.
    #[serde(default)]
    pub cow_file: Option<String>,
    #[serde(default = "default_tool_timeout")]
    pub timeout_secs: u64,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            cowsay: default_cowsay(),
            fortune: default_fortune(),
            cow_file: None,
            timeout_secs: default_tool_timeout(),
        }
    }
}

/// System-level settings for the bot.
#[derive(Debug, Deserialize, Clone)]
pub struct SystemConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default)]
    pub debug: bool,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            debug: false,
        }
    }
}

fn default_poll_timeout() -> u64 {
    50
}
fn default_telegram_api() -> String {
    "https://api.telegram.org".to_string()
}
fn default_max_age() -> u64 {
    3600
}
fn default_http_timeout() -> u64 {
    30
}
fn default_interval() -> u64 {
    3600
}
fn default_first_delay() -> u64 {
    5
}
fn default_initial_check_age() -> u64 {
    3600
}
fn default_debug_max_age() -> u64 {
    3600 * 24 * 30
}
fn default_cowsay() -> String {
    "cowsay".to_string()
}
fn default_fortune() -> String {
    "fortune".to_string()
}
fn default_tool_timeout() -> u64 {
    10
}
fn default_data_dir() -> String {
    "data".to_string()
}

impl AppConfig {
    /// Reads `path` if it exists, then applies the process environment.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse {}", path.display()))?
        } else {
            tracing::info!("No config file at {}, using environment only", path.display());
            AppConfig::default()
        };
        config.apply_env(|key| std::env::var(key).ok());
        config.normalize();
        Ok(config)
    }

    /// Applies the `MIA_*` variables. `lookup` abstracts `std::env::var` for tests.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup("MIA_TG_TOKEN") {
            let chat_ids = lookup("MIA_TG_CHATID")
                .map(|ids| split_list(&ids))
                .unwrap_or_default();
            match &mut self.services.telegram {
                Some(tg) => {
                    tg.token = token;
                    if !chat_ids.is_empty() {
                        tg.chat_ids = chat_ids;
                    }
                }
                None => {
                    self.services.telegram = Some(TelegramConfig {
                        token,
                        chat_ids,
                        poll_timeout_secs: default_poll_timeout(),
                        api_url: default_telegram_api(),
                    });
                }
            }
        } else if let (Some(tg), Some(ids)) = (&mut self.services.telegram, lookup("MIA_TG_CHATID")) {
            tg.chat_ids = split_list(&ids);
        }

        if let Some(feeds) = lookup("MIA_PODCAST_FEED") {
            self.feeds.urls = split_list(&feeds);
        }
        if let Some(youtube) = lookup("MIA_YOUTUBE_FEED") {
            self.feeds.youtube = Some(youtube);
        }
        if let Some(dump) = lookup("MIA_DUMP") {
            self.feeds.dump = Some(dump);
        }
        if let Some(debug) = lookup("MIA_DEBUG") {
            self.system.debug = is_truthy(&debug);
        }
    }

    /// Drops empty entries and folds the YouTube feed into the feed list.
    pub fn normalize(&mut self) {
        self.feeds.urls.retain(|u| !u.trim().is_empty());
        if let Some(yt) = self.feeds.youtube.take()
            && !yt.trim().is_empty()
            && !self.feeds.urls.contains(&yt)
        {
            self.feeds.urls.push(yt.trim().to_string());
        }
        if let Some(dump) = &self.feeds.dump
            && dump.is_empty()
        {
            self.feeds.dump = None;
        }
        if let Some(tg) = &mut self.services.telegram {
            tg.chat_ids.retain(|c| !c.trim().is_empty());
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.feeds.urls.is_empty() {
            anyhow::bail!("No feeds configured (set MIA_PODCAST_FEED or feeds.urls)");
        }
        if let Some(tg) = &self.services.telegram
            && tg.token.trim().is_empty()
        {
            anyhow::bail!("Telegram token is empty");
        }
        if !self.has_transport() {
            anyhow::bail!("No chat service configured (set MIA_TG_TOKEN or services.matrix)");
        }
        Ok(())
    }

    fn has_transport(&self) -> bool {
        let matrix = cfg!(feature = "matrix") && self.services.matrix.is_some();
        self.services.telegram.is_some() || matrix
    }

    /// Snapshot dump path for the feed at `index`, if dumping is enabled.
    pub fn dump_path(&self, index: usize) -> Option<String> {
        self.feeds.dump.as_ref().map(|prefix| format!("{prefix}_{index}"))
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

pub fn is_truthy(raw: &str) -> bool {
    matches!(raw.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "y")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn env_only_configuration() {
        let mut config = AppConfig::default();
        config.apply_env(env(&[
            ("MIA_TG_TOKEN", "123:abc"),
            ("MIA_TG_CHATID", "-100, 42,"),
            ("MIA_PODCAST_FEED", "http://a/feed,http://b/feed"),
            ("MIA_YOUTUBE_FEED", "https://www.youtube.com/feeds/videos.xml?channel_id=x"),
            ("MIA_DEBUG", "Yes"),
        ]));
        config.normalize();

        let tg = config.services.telegram.as_ref().unwrap();
        assert_eq!(tg.token, "123:abc");
        assert_eq!(tg.chat_ids, vec!["-100", "42"]);
        assert_eq!(config.feeds.urls.len(), 3);
        assert!(config.feeds.urls[2].contains("youtube"));
        assert!(config.system.debug);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn yaml_defaults_and_env_override() {
        let yaml = r#"
services:
  telegram:
    token: "from-file"
    chat_ids: ["1"]
feeds:
  urls: ["http://file/feed"]
check:
  interval_secs: 60
"#;
        let mut config: AppConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.check.interval_secs, 60);
        assert_eq!(config.check.initial_check_age_secs, 3600);
        assert_eq!(config.feeds.max_age_secs, 3600);
        assert_eq!(config.tools.cowsay, "cowsay");

        config.apply_env(env(&[("MIA_TG_CHATID", "7,8")]));
        let tg = config.services.telegram.as_ref().unwrap();
        assert_eq!(tg.token, "from-file");
        assert_eq!(tg.chat_ids, vec!["7", "8"]);
    }

    #[test]
    fn validation_requires_feeds_and_transport() {
        let mut config = AppConfig::default();
        assert!(config.validate().is_err());

        config.feeds.urls.push("http://a/feed".into());
        assert!(config.validate().is_err());

        config.apply_env(env(&[("MIA_TG_TOKEN", "t")]));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn dump_paths_are_indexed() {
        let mut config = AppConfig::default();
        assert_eq!(config.dump_path(0), None);
        config.feeds.dump = Some("/tmp/feed".into());
        assert_eq!(config.dump_path(1).as_deref(), Some("/tmp/feed_1"));
    }

    #[test]
    fn truthy_values() {
        for v in ["1", "true", "YES", "y"] {
            assert!(is_truthy(v));
        }
        for v in ["", "0", "no", "false"] {
            assert!(!is_truthy(v));
        }
    }
}
