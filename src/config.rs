use std::env;
use std::error::Error;
use std::fmt;
use std::time::Duration;
use url::Url;

use crate::broadcast::DEFAULT_GROUP_DEBOUNCE;

const DEFAULT_APP_URL: &str = "https://os-gift.store/";

#[derive(Debug)]
pub enum ConfigError {
    MissingVar(&'static str),
    InvalidVar(&'static str, String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingVar(name) => {
                write!(f, "{} environment variable is required", name)
            }
            ConfigError::InvalidVar(name, value) => {
                write!(f, "{} has an invalid value: {}", name, value)
            }
        }
    }
}

impl Error for ConfigError {}

#[derive(Debug, Clone)]
pub struct BotConfig {
    pub bot_token: String,
    pub database_url: String,
    /// operators allowed to run broadcasts and read statistics
    pub admin_ids: Vec<i64>,
    /// shop web app opened by in-app buttons
    pub app_url: Url,
    /// media group debounce window
    pub group_debounce: Duration,
}

impl BotConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let bot_token = env::var("BOT_TOKEN").map_err(|_| ConfigError::MissingVar("BOT_TOKEN"))?;
        let database_url =
            env::var("DATABASE_URL").map_err(|_| ConfigError::MissingVar("DATABASE_URL"))?;

        let admin_ids = Self::parse_admin_ids(&env::var("ADMIN_IDS").unwrap_or_default());

        let app_url_raw = env::var("APP_URL").unwrap_or_else(|_| DEFAULT_APP_URL.to_string());
        let app_url = Url::parse(&app_url_raw)
            .map_err(|_| ConfigError::InvalidVar("APP_URL", app_url_raw.clone()))?;

        let group_debounce = match env::var("MEDIA_GROUP_DEBOUNCE_MS") {
            Ok(raw) => Duration::from_millis(
                raw.parse::<u64>()
                    .map_err(|_| ConfigError::InvalidVar("MEDIA_GROUP_DEBOUNCE_MS", raw.clone()))?,
            ),
            Err(_) => DEFAULT_GROUP_DEBOUNCE,
        };

        Ok(Self {
            bot_token,
            database_url,
            admin_ids,
            app_url,
            group_debounce,
        })
    }

    /// parses the comma-separated ADMIN_IDS list, skipping anything that is
    /// not a number (format: ADMIN_IDS=123456789,987654321)
    pub fn parse_admin_ids(raw: &str) -> Vec<i64> {
        raw.split(',')
            .filter_map(|part| part.trim().parse::<i64>().ok())
            .collect()
    }

    pub fn is_admin(&self, user_id: i64) -> bool {
        self.admin_ids.contains(&user_id)
    }
}
