use serde::Deserialize;
use std::time::Duration;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Telegram bot token
    pub telegram_bot_token: String,

    /// Telegram Bot API base URL
    #[serde(default = "default_telegram_api_url")]
    pub telegram_api_url: String,

    /// Shared secret Telegram echoes back in `X-Telegram-Bot-Api-Secret-Token`
    #[serde(default)]
    pub webhook_secret: Option<String>,

    /// TMDB API key
    pub tmdb_api_key: String,

    /// TMDB API base URL
    #[serde(default = "default_tmdb_api_url")]
    pub tmdb_api_url: String,

    /// Prefix joined with a TMDB `poster_path` to form a fetchable image URL
    #[serde(default = "default_tmdb_image_url")]
    pub tmdb_image_url: String,

    /// Locale passed to TMDB as the `language` parameter
    #[serde(default = "default_tmdb_language")]
    pub tmdb_language: String,

    /// SQLite database URL for the favorites table
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Attempts per metadata request
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base delay for backoff and fallback for a missing `Retry-After`
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,

    /// Per-attempt timeout for metadata requests
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Store a new row even when the user already has the title saved
    #[serde(default)]
    pub favorites_allow_duplicates: bool,
}

fn default_telegram_api_url() -> String {
    "https://api.telegram.org".to_string()
}

fn default_tmdb_api_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_tmdb_image_url() -> String {
    "https://image.tmdb.org/t/p/w500".to_string()
}

fn default_tmdb_language() -> String {
    "en-US".to_string()
}

fn default_database_url() -> String {
    "sqlite://movie_bot.db?mode=rwc".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_secs() -> u64 {
    1
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
