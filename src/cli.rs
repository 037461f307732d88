//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use stickerbot_core::config::BotSettings;
use stickerbot_core::download::DEFAULT_MAX_RETRIES;
use stickerbot_core::telegram::{ClientTimeouts, DEFAULT_API_URL};

/// Telegram bot that downloads sticker packs.
///
/// Send the bot a t.me/addstickers/... link and it replies with a zip
/// archive of every sticker in the pack. Credentials are read from
/// TELEGRAM_API_ID, TELEGRAM_API_HASH and TELEGRAM_BOT_TOKEN.
#[derive(Parser, Debug)]
#[command(name = "stickerbot")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Directory for temporary per-request downloads
    #[arg(short = 'w', long, default_value = "stickers")]
    pub work_dir: PathBuf,

    /// Bot API base URL
    #[arg(long, default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Long-poll timeout for getUpdates in seconds (1-50)
    #[arg(short = 'p', long, default_value_t = 30, value_parser = clap::value_parser!(u64).range(1..=50))]
    pub poll_timeout: u64,

    /// Maximum retry attempts per sticker for transient failures (0-10)
    #[arg(short = 'r', long, default_value_t = DEFAULT_MAX_RETRIES as u8, value_parser = clap::value_parser!(u8).range(0..=10))]
    pub max_retries: u8,

    /// HTTP connect timeout in seconds
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..))]
    pub connect_timeout: u64,

    /// HTTP request timeout in seconds (must exceed the poll timeout)
    #[arg(long, default_value_t = 120, value_parser = clap::value_parser!(u64).range(1..))]
    pub read_timeout: u64,

    /// Seconds to wait for in-flight requests on shutdown
    #[arg(long, default_value_t = 30)]
    pub shutdown_grace: u64,
}

impl Args {
    /// Runtime settings for the bot.
    #[must_use]
    pub fn settings(&self) -> BotSettings {
        BotSettings {
            work_root: self.work_dir.clone(),
            api_url: self.api_url.clone(),
            poll_timeout_secs: self.poll_timeout,
            max_retries: u32::from(self.max_retries),
            timeouts: ClientTimeouts {
                connect_secs: self.connect_timeout,
                read_secs: self.read_timeout,
            },
            shutdown_grace: Duration::from_secs(self.shutdown_grace),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default_args_parses_successfully() {
        let args = Args::try_parse_from(["stickerbot"]).unwrap();
        assert_eq!(args.verbose, 0);
        assert!(!args.quiet);
        assert_eq!(args.work_dir, PathBuf::from("stickers"));
        assert_eq!(args.api_url, "https://api.telegram.org");
        assert_eq!(args.poll_timeout, 30);
        assert_eq!(args.max_retries, 3); // DEFAULT_MAX_RETRIES
        assert_eq!(
            args.settings().retry_policy().max_attempts(),
            stickerbot_core::download::DEFAULT_MAX_ATTEMPTS
        );
        assert_eq!(args.connect_timeout, 10);
        assert_eq!(args.read_timeout, 120);
        assert_eq!(args.shutdown_grace, 30);
    }

    #[test]
    fn test_cli_verbose_flag_increments_count() {
        let args = Args::try_parse_from(["stickerbot", "-v"]).unwrap();
        assert_eq!(args.verbose, 1);

        let args = Args::try_parse_from(["stickerbot", "-vv"]).unwrap();
        assert_eq!(args.verbose, 2);

        let args = Args::try_parse_from(["stickerbot", "--verbose", "--verbose"]).unwrap();
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn test_cli_quiet_flag_sets_quiet() {
        let args = Args::try_parse_from(["stickerbot", "-q"]).unwrap();
        assert!(args.quiet);
    }

    #[test]
    fn test_cli_help_flag_shows_usage() {
        // --help causes early exit, so we check it returns an error with Help kind
        let err = Args::try_parse_from(["stickerbot", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_cli_version_flag_shows_version() {
        let err = Args::try_parse_from(["stickerbot", "--version"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_cli_invalid_flag_returns_error() {
        let err = Args::try_parse_from(["stickerbot", "--invalid-flag"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::UnknownArgument);
    }

    #[test]
    fn test_cli_work_dir_flags() {
        let args = Args::try_parse_from(["stickerbot", "-w", "/tmp/packs"]).unwrap();
        assert_eq!(args.work_dir, PathBuf::from("/tmp/packs"));

        let args = Args::try_parse_from(["stickerbot", "--work-dir", "out"]).unwrap();
        assert_eq!(args.work_dir, PathBuf::from("out"));
    }

    // ==================== Poll Timeout Tests ====================

    #[test]
    fn test_cli_poll_timeout_bounds() {
        assert_eq!(Args::try_parse_from(["stickerbot", "-p", "1"]).unwrap().poll_timeout, 1);
        assert_eq!(
            Args::try_parse_from(["stickerbot", "--poll-timeout", "50"]).unwrap().poll_timeout,
            50
        );
    }

    #[test]
    fn test_cli_poll_timeout_zero_rejected() {
        let err = Args::try_parse_from(["stickerbot", "-p", "0"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn test_cli_poll_timeout_over_max_rejected() {
        let err = Args::try_parse_from(["stickerbot", "-p", "51"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    // ==================== Max Retries Tests ====================

    #[test]
    fn test_cli_max_retries_short_flag() {
        let args = Args::try_parse_from(["stickerbot", "-r", "5"]).unwrap();
        assert_eq!(args.max_retries, 5);
    }

    #[test]
    fn test_cli_max_retries_zero_allowed() {
        // 0 retries means a single attempt per sticker
        let args = Args::try_parse_from(["stickerbot", "-r", "0"]).unwrap();
        assert_eq!(args.max_retries, 0);
        assert_eq!(args.settings().retry_policy().max_attempts(), 1);
    }

    #[test]
    fn test_cli_max_retries_over_max_rejected() {
        let err = Args::try_parse_from(["stickerbot", "-r", "11"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    // ==================== Settings Tests ====================

    #[test]
    fn test_cli_settings_carry_all_flags() {
        let args = Args::try_parse_from([
            "stickerbot",
            "-w",
            "packs",
            "--api-url",
            "http://127.0.0.1:8081",
            "-p",
            "20",
            "--connect-timeout",
            "5",
            "--read-timeout",
            "60",
            "--shutdown-grace",
            "3",
        ])
        .unwrap();
        let settings = args.settings();
        assert_eq!(settings.work_root, PathBuf::from("packs"));
        assert_eq!(settings.api_url, "http://127.0.0.1:8081");
        assert_eq!(settings.poll_timeout_secs, 20);
        assert_eq!(settings.timeouts.connect_secs, 5);
        assert_eq!(settings.timeouts.read_secs, 60);
        assert_eq!(settings.shutdown_grace, Duration::from_secs(3));
        settings.validate().unwrap();
    }

    #[test]
    fn test_cli_read_timeout_below_poll_fails_validation() {
        let args = Args::try_parse_from(["stickerbot", "-p", "40", "--read-timeout", "30"]).unwrap();
        assert!(args.settings().validate().is_err());
    }
}
