//! # Configuration Module
//!
//! Startup configuration read once from the environment and passed
//! explicitly to the parts that need it.

use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;

use crate::dialogue::UserKey;
use crate::error::ConfigError;
use crate::storage::DEFAULT_OUTPUT_FILE;

pub const TOKEN_VAR: &str = "TELEGRAM_BOT_TOKEN";
pub const OUTPUT_FILE_VAR: &str = "INTAKE_OUTPUT_FILE";
pub const BLOCKED_USERS_VAR: &str = "BLOCKED_USER_IDS";
pub const LOG_FORMAT_VAR: &str = "LOG_FORMAT";

/// Output format for log lines
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "" | "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(ConfigError::InvalidValue {
                key: LOG_FORMAT_VAR.to_string(),
                message: format!("expected \"text\" or \"json\", got {other:?}"),
            }),
        }
    }
}

/// Telegram bot credential; never printed in full
#[derive(Clone, PartialEq, Eq)]
pub struct BotToken(String);

impl BotToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BotToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BotToken(***)")
    }
}

/// Users denied any interaction with the bot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Blocklist(HashSet<UserKey>);

impl Blocklist {
    pub fn new(ids: impl IntoIterator<Item = UserKey>) -> Self {
        Self(ids.into_iter().collect())
    }

    pub fn contains(&self, user: UserKey) -> bool {
        self.0.contains(&user)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parse a comma-separated list of numeric user ids; blanks are skipped
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        raw.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| {
                part.parse::<UserKey>().map_err(|e| ConfigError::InvalidValue {
                    key: BLOCKED_USERS_VAR.to_string(),
                    message: format!("{part:?} is not a user id: {e}"),
                })
            })
            .collect::<Result<HashSet<_>, _>>()
            .map(Self)
    }
}

/// Configuration for the intake bot
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub token: BotToken,
    pub output_path: PathBuf,
    pub blocklist: Blocklist,
    pub log_format: LogFormat,
}

impl BotConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token = lookup(TOKEN_VAR)
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(TOKEN_VAR.to_string()))?;

        let output_path = lookup(OUTPUT_FILE_VAR)
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_FILE));

        let blocklist = match lookup(BLOCKED_USERS_VAR) {
            Some(raw) => Blocklist::parse(&raw)?,
            None => Blocklist::default(),
        };

        let log_format = match lookup(LOG_FORMAT_VAR) {
            Some(raw) => LogFormat::parse(&raw)?,
            None => LogFormat::default(),
        };

        Ok(Self {
            token: BotToken::new(token),
            output_path,
            blocklist,
            log_format,
        })
    }
}
