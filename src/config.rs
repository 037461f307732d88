//! Process configuration: platform credentials and runtime settings.
//!
//! Credentials come from the environment and are validated before anything
//! touches the network:
//!
//! | Variable | Format |
//! |----------|--------|
//! | `TELEGRAM_API_ID` | integer |
//! | `TELEGRAM_API_HASH` | 32 hex characters |
//! | `TELEGRAM_BOT_TOKEN` | `<digits>:<secret>` |

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::bot::PollSettings;
use crate::download::{DEFAULT_MAX_RETRIES, RetryPolicy};
use crate::telegram::{ClientTimeouts, DEFAULT_API_URL};

/// Environment variable holding the application id.
pub const API_ID_VAR: &str = "TELEGRAM_API_ID";
/// Environment variable holding the application hash.
pub const API_HASH_VAR: &str = "TELEGRAM_API_HASH";
/// Environment variable holding the bot token.
pub const BOT_TOKEN_VAR: &str = "TELEGRAM_BOT_TOKEN";

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// One or more required variables are unset or blank.
    #[error(
        "missing required environment variables: {}. Please set TELEGRAM_API_ID, TELEGRAM_API_HASH, and TELEGRAM_BOT_TOKEN",
        .0.join(", ")
    )]
    Missing(Vec<&'static str>),

    /// A variable is present but malformed.
    #[error("{var} {reason}")]
    Invalid {
        /// Offending variable.
        var: &'static str,
        /// What is wrong with it.
        reason: &'static str,
    },

    /// Runtime settings are inconsistent.
    #[error("invalid setting {setting}: {reason}")]
    Setting {
        /// Offending setting.
        setting: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

/// Validated platform credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Application id.
    pub api_id: i64,
    /// Application hash.
    pub api_hash: String,
    /// Bot token.
    pub bot_token: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_id", &self.api_id)
            .field("api_hash", &"<redacted>")
            .field("bot_token", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    /// Reads credentials from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a variable is missing or malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads credentials through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] listing every unset variable, or
    /// [`ConfigError::Invalid`] for the first malformed one.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let api_id = read(API_ID_VAR);
        let api_hash = read(API_HASH_VAR);
        let bot_token = read(BOT_TOKEN_VAR);

        let (Some(api_id), Some(api_hash), Some(bot_token)) = (api_id.as_ref(), api_hash.as_ref(), bot_token.as_ref())
        else {
            let missing = [
                (API_ID_VAR, api_id.is_none()),
                (API_HASH_VAR, api_hash.is_none()),
                (BOT_TOKEN_VAR, bot_token.is_none()),
            ]
            .into_iter()
            .filter_map(|(name, absent)| absent.then_some(name))
            .collect();
            return Err(ConfigError::Missing(missing));
        };

        let api_id = api_id.parse::<i64>().map_err(|_| ConfigError::Invalid {
            var: API_ID_VAR,
            reason: "must be an integer",
        })?;

        if api_hash.len() != 32 || !api_hash.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ConfigError::Invalid {
                var: API_HASH_VAR,
                reason: "must be 32 hexadecimal characters",
            });
        }

        if !is_valid_bot_token(bot_token) {
            return Err(ConfigError::Invalid {
                var: BOT_TOKEN_VAR,
                reason: "must look like <digits>:<secret>",
            });
        }

        Ok(Self {
            api_id,
            api_hash: api_hash.clone(),
            bot_token: bot_token.clone(),
        })
    }
}

fn is_valid_bot_token(token: &str) -> bool {
    let Some((id, secret)) = token.split_once(':') else {
        return false;
    };
    !id.is_empty()
        && id.chars().all(|c| c.is_ascii_digit())
        && !secret.is_empty()
        && secret
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Runtime settings assembled from command-line flags.
#[derive(Debug, Clone)]
pub struct BotSettings {
    /// Directory holding per-request workspaces.
    pub work_root: PathBuf,
    /// Bot API base URL.
    pub api_url: String,
    /// Long-poll timeout in seconds.
    pub poll_timeout_secs: u64,
    /// Retries after the first download attempt of each sticker.
    pub max_retries: u32,
    /// HTTP timeouts.
    pub timeouts: ClientTimeouts,
    /// Grace period for in-flight requests at shutdown.
    pub shutdown_grace: Duration,
}

impl Default for BotSettings {
    fn default() -> Self {
        Self {
            work_root: PathBuf::from("stickers"),
            api_url: DEFAULT_API_URL.to_string(),
            poll_timeout_secs: 30,
            max_retries: DEFAULT_MAX_RETRIES,
            timeouts: ClientTimeouts::default(),
            shutdown_grace: Duration::from_secs(30),
        }
    }
}

impl BotSettings {
    /// Checks cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Setting`] if the read timeout would cut long
    /// polls short or the work directory is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.work_root.as_os_str().is_empty() {
            return Err(ConfigError::Setting {
                setting: "work-dir",
                reason: "must not be empty".to_string(),
            });
        }
        if self.timeouts.read_secs <= self.poll_timeout_secs {
            return Err(ConfigError::Setting {
                setting: "read-timeout",
                reason: format!(
                    "must exceed the poll timeout ({}s), got {}s",
                    self.poll_timeout_secs, self.timeouts.read_secs
                ),
            });
        }
        Ok(())
    }

    /// Per-sticker retry policy; `max_retries` counts attempts after the first.
    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::with_max_attempts(self.max_retries.saturating_add(1))
    }

    /// Polling loop settings.
    #[must_use]
    pub fn poll_settings(&self) -> PollSettings {
        PollSettings {
            poll_timeout_secs: self.poll_timeout_secs,
            shutdown_grace: self.shutdown_grace,
            ..PollSettings::default()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    const HASH: &str = "0123456789abcdef0123456789ABCDEF";
    const TOKEN: &str = "123456:ABC-def_ghi";

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_credentials_valid() {
        let creds = Credentials::from_lookup(lookup(&[
            (API_ID_VAR, "12345"),
            (API_HASH_VAR, HASH),
            (BOT_TOKEN_VAR, TOKEN),
        ]))
        .unwrap();
        assert_eq!(creds.api_id, 12345);
        assert_eq!(creds.bot_token, TOKEN);
    }

    #[test]
    fn test_credentials_missing_lists_all_absent() {
        let err = Credentials::from_lookup(lookup(&[(API_HASH_VAR, HASH), (BOT_TOKEN_VAR, "  ")]))
            .unwrap_err();
        assert_eq!(err, ConfigError::Missing(vec![API_ID_VAR, BOT_TOKEN_VAR]));
        assert!(err.to_string().contains("TELEGRAM_API_ID"));
    }

    #[test]
    fn test_credentials_api_id_must_be_integer() {
        let err = Credentials::from_lookup(lookup(&[
            (API_ID_VAR, "abc"),
            (API_HASH_VAR, HASH),
            (BOT_TOKEN_VAR, TOKEN),
        ]))
        .unwrap_err();
        assert_eq!(err.to_string(), "TELEGRAM_API_ID must be an integer");
    }

    #[test]
    fn test_credentials_api_hash_format() {
        let too_long = format!("{HASH}0");
        for bad in ["short", "g123456789abcdef0123456789abcdef", too_long.as_str()] {
            let err = Credentials::from_lookup(lookup(&[
                (API_ID_VAR, "1"),
                (API_HASH_VAR, bad),
                (BOT_TOKEN_VAR, TOKEN),
            ]))
            .unwrap_err();
            assert!(matches!(err, ConfigError::Invalid { var: API_HASH_VAR, .. }), "{bad}");
        }
    }

    #[test]
    fn test_bot_token_format() {
        assert!(is_valid_bot_token("1:a"));
        assert!(is_valid_bot_token(TOKEN));
        assert!(!is_valid_bot_token("abc:def"));
        assert!(!is_valid_bot_token("123456"));
        assert!(!is_valid_bot_token("123:"));
        assert!(!is_valid_bot_token(":secret"));
        assert!(!is_valid_bot_token("12:se/cret"));
    }

    #[test]
    fn test_credentials_debug_redacts_secrets() {
        let creds = Credentials {
            api_id: 1,
            api_hash: HASH.to_string(),
            bot_token: TOKEN.to_string(),
        };
        let debug = format!("{creds:?}");
        assert!(!debug.contains(HASH));
        assert!(!debug.contains("ABC-def"));
    }

    #[test]
    fn test_settings_default_is_valid() {
        let settings = BotSettings::default();
        settings.validate().unwrap();
        assert_eq!(settings.retry_policy().max_attempts(), 4);
        assert_eq!(
            settings.retry_policy().max_attempts(),
            RetryPolicy::default().max_attempts()
        );
        assert_eq!(settings.poll_settings().poll_timeout_secs, 30);
    }

    #[test]
    fn test_settings_read_timeout_must_exceed_poll() {
        let settings = BotSettings {
            poll_timeout_secs: 50,
            timeouts: ClientTimeouts {
                connect_secs: 10,
                read_secs: 50,
            },
            ..BotSettings::default()
        };
        let err = settings.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Setting { setting: "read-timeout", .. }));
    }

    #[test]
    fn test_settings_zero_retries_means_single_attempt() {
        let settings = BotSettings {
            max_retries: 0,
            ..BotSettings::default()
        };
        assert_eq!(settings.retry_policy().max_attempts(), 1);
    }
}
