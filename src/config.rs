use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use crate::holidays::web::{DEFAULT_FETCH_TIMEOUT, DEFAULT_HOLIDAYS_URL};
use crate::holidays::SourceKind;

pub const TOASTS_FILE: &str = "toasts.json";
pub const HOLIDAYS_FILE: &str = "holidays.json";

/// Command line / environment options
#[derive(Debug, Parser)]
#[command(name = "povod-bot", version, about = "Telegram bot that finds a reason to celebrate today")]
pub struct Args {
    /// Telegram bot token
    #[arg(long, env = "BOT_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Where today's holidays come from
    #[arg(long, env = "HOLIDAY_SOURCE", value_enum, default_value_t = SourceKind::Web)]
    pub source: SourceKind,

    /// Directory with toasts.json and holidays.json (defaults to the executable's directory)
    #[arg(long, env = "DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Holiday page scraped by the web source
    #[arg(long, env = "HOLIDAYS_URL", default_value = DEFAULT_HOLIDAYS_URL)]
    pub holidays_url: String,

    /// Timeout for a single page fetch, in seconds
    #[arg(long, env = "FETCH_TIMEOUT_SECS", default_value_t = DEFAULT_FETCH_TIMEOUT.as_secs())]
    pub fetch_timeout_secs: u64,

    /// Retry failed fetches with the anti-bot fallback client
    #[arg(long, env = "ANTIBOT_FALLBACK", default_value_t = true, action = clap::ArgAction::Set)]
    pub antibot_fallback: bool,

    /// Maximum number of page fetches running at once
    #[arg(long, env = "MAX_CONCURRENT_FETCHES", default_value_t = 4)]
    pub max_concurrent_fetches: usize,
}

/// Validated startup configuration, built once and passed down
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub token: String,
    pub source: SourceKind,
    pub data_dir: PathBuf,
    pub holidays_url: String,
    pub fetch_timeout: Duration,
    pub antibot_fallback: bool,
    pub max_concurrent_fetches: usize,
}

impl BotConfig {
    pub fn from_args(args: Args) -> Result<Self> {
        let token = match args.token {
            Some(token) if !token.trim().is_empty() => token,
            _ => bail!("Environment variable BOT_TOKEN is required"),
        };

        let data_dir = match args.data_dir {
            Some(dir) => dir,
            None => executable_dir()?,
        };

        Ok(Self {
            token,
            source: args.source,
            data_dir,
            holidays_url: args.holidays_url,
            fetch_timeout: Duration::from_secs(args.fetch_timeout_secs.max(1)),
            antibot_fallback: args.antibot_fallback,
            max_concurrent_fetches: args.max_concurrent_fetches.max(1),
        })
    }

    pub fn toasts_path(&self) -> PathBuf {
        self.data_dir.join(TOASTS_FILE)
    }

    pub fn holidays_path(&self) -> PathBuf {
        self.data_dir.join(HOLIDAYS_FILE)
    }
}

fn executable_dir() -> Result<PathBuf> {
    let exe = std::env::current_exe().context("Failed to locate the executable")?;
    exe.parent()
        .map(PathBuf::from)
        .context("Executable has no parent directory")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("povod-bot").chain(argv.iter().copied())).unwrap()
    }

    #[test]
    fn missing_token_is_fatal() {
        let mut args = parse(&["--data-dir", "/tmp"]);
        args.token = None;
        let err = BotConfig::from_args(args).unwrap_err();
        assert!(err.to_string().contains("BOT_TOKEN"));
    }

    #[test]
    fn blank_token_is_fatal() {
        let mut args = parse(&["--data-dir", "/tmp"]);
        args.token = Some("   ".to_string());
        assert!(BotConfig::from_args(args).is_err());
    }

    #[test]
    fn fetch_timeout_defaults_to_fifteen_seconds() {
        let config = BotConfig::from_args(parse(&["--token", "123:abc", "--data-dir", "/tmp"])).unwrap();
        assert_eq!(config.fetch_timeout, DEFAULT_FETCH_TIMEOUT);
        assert_eq!(config.fetch_timeout, Duration::from_secs(15));
    }

    #[test]
    fn explicit_options_are_used() {
        let args = parse(&[
            "--token",
            "123:abc",
            "--source",
            "local",
            "--data-dir",
            "/srv/povod",
            "--fetch-timeout-secs",
            "5",
            "--antibot-fallback",
            "false",
        ]);
        let config = BotConfig::from_args(args).unwrap();

        assert_eq!(config.token, "123:abc");
        assert_eq!(config.source, SourceKind::Local);
        assert_eq!(config.fetch_timeout, Duration::from_secs(5));
        assert!(!config.antibot_fallback);
        assert_eq!(config.toasts_path(), PathBuf::from("/srv/povod/toasts.json"));
        assert_eq!(config.holidays_path(), PathBuf::from("/srv/povod/holidays.json"));
    }
}
