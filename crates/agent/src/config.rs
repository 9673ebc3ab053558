//! Agent configuration
//!
//! Operator-facing knobs come from two places: the two required CLI flags
//! (window length and lookback hours) and a set of STORM_-prefixed
//! environment variables for endpoints and intervals.

use anyhow::Result;
use clap::Parser;
use serde::Deserialize;

/// Storm detection agent
#[derive(Debug, Parser)]
#[command(name = "storm-agent")]
#[command(author, version, about = "Environmental storm detection agent", long_about = None)]
pub struct Cli {
    /// Sliding window length per metric (number of samples)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..), required = true)]
    pub maxlen: u32,

    /// Lookback hours per sample average
    #[arg(long = "time-hours", value_parser = clap::value_parser!(u32).range(1..), required = true)]
    pub time_hours: u32,
}

/// Environment-driven settings
#[derive(Debug, Clone, Deserialize)]
pub struct AgentConfig {
    /// Base URL of the search backend
    #[serde(default = "default_search_url")]
    pub search_url: String,

    /// Index holding the device reports
    #[serde(default = "default_search_index")]
    pub search_index: String,

    /// Webhook endpoint alerts are POSTed to
    #[serde(default = "default_webhook_url")]
    pub webhook_url: String,

    /// API server port for health/metrics
    #[serde(default = "default_api_port")]
    pub api_port: u16,

    /// Delay between detection cycles in seconds
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Minimum gap between two dispatched alerts in seconds
    #[serde(default = "default_cooldown")]
    pub cooldown_secs: i64,

    /// Bounded timeout for backend and webhook calls in seconds
    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,
}

fn default_search_url() -> String {
    "http://localhost:9200/".to_string()
}

fn default_search_index() -> String {
    "iot".to_string()
}

fn default_webhook_url() -> String {
    "http://localhost:8081/alerts".to_string()
}

fn default_api_port() -> u16 {
    8080
}

fn default_poll_interval() -> u64 {
    10
}

fn default_cooldown() -> i64 {
    600
}

fn default_http_timeout() -> u64 {
    30
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            search_url: default_search_url(),
            search_index: default_search_index(),
            webhook_url: default_webhook_url(),
            api_port: default_api_port(),
            poll_interval_secs: default_poll_interval(),
            cooldown_secs: default_cooldown(),
            http_timeout_secs: default_http_timeout(),
        }
    }
}

impl AgentConfig {
    /// Load configuration from STORM_-prefixed environment variables
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("STORM"))
            .build()?;

        Ok(config.try_deserialize().unwrap_or_default())
    }
}

/// Fully resolved agent settings (CLI merged with environment)
#[derive(Debug, Clone)]
pub struct Settings {
    pub window_len: usize,
    pub lookback_hours: u32,
    pub config: AgentConfig,
}

impl Settings {
    pub fn from_cli(cli: Cli) -> Result<Self> {
        Ok(Self {
            window_len: cli.maxlen as usize,
            lookback_hours: cli.time_hours,
            config: AgentConfig::load()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_requires_both_flags() {
        assert!(Cli::try_parse_from(["storm-agent"]).is_err());
        assert!(Cli::try_parse_from(["storm-agent", "--maxlen", "3"]).is_err());
        assert!(Cli::try_parse_from(["storm-agent", "--time-hours", "24"]).is_err());
    }

    #[test]
    fn test_cli_rejects_zero_values() {
        assert!(Cli::try_parse_from(["storm-agent", "--maxlen", "0", "--time-hours", "24"]).is_err());
        assert!(Cli::try_parse_from(["storm-agent", "--maxlen", "3", "--time-hours", "0"]).is_err());
    }

    #[test]
    fn test_cli_parses_valid_flags() {
        let cli = Cli::try_parse_from(["storm-agent", "--maxlen", "3", "--time-hours", "24"]).unwrap();
        assert_eq!(cli.maxlen, 3);
        assert_eq!(cli.time_hours, 24);
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_config_defaults() {
        let config = AgentConfig::default();
        assert_eq!(config.poll_interval_secs, 10);
        assert_eq!(config.cooldown_secs, 600);
        assert_eq!(config.api_port, 8080);
        assert_eq!(config.search_index, "iot");
    }
}
