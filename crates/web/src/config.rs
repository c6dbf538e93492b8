use anyhow::{Context, Result, ensure};
use leaderboard::month::{DEFAULT_HOUR_OFFSET, HOUR_OFFSET_RANGE};
use leaderboard::ocr::ollama_client::{DEFAULT_OLLAMA_MODEL, DEFAULT_OLLAMA_URL};

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub webhook_keys: String,
    pub ollama_url: String,
    pub ollama_model: String,
    pub month_hour_offset: i64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            host: std::env::var("HOST").context("Cannot load HOST env variable")?,
            port: std::env::var("PORT")
                .context("Cannot load PORT env variable")?
                .parse()
                .context("PORT must be a number")?,
            database_url: std::env::var("DATABASE_URL")
                .context("Cannot load DATABASE_URL env variable")?,
            webhook_keys: std::env::var("WEBHOOK_KEYS").unwrap_or_default(),
            ollama_url: std::env::var("OLLAMA_URL")
                .unwrap_or_else(|_| DEFAULT_OLLAMA_URL.to_string()),
            ollama_model: std::env::var("OLLAMA_MODEL")
                .unwrap_or_else(|_| DEFAULT_OLLAMA_MODEL.to_string()),
            month_hour_offset: parse_hour_offset(std::env::var("MONTH_HOUR_OFFSET").ok())?,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_hour_offset(value: Option<String>) -> Result<i64> {
    let Some(value) = value else {
        return Ok(DEFAULT_HOUR_OFFSET);
    };

    let offset: i64 = value
        .trim()
        .parse()
        .context("MONTH_HOUR_OFFSET must be a whole number of hours")?;
    ensure!(
        HOUR_OFFSET_RANGE.contains(&offset),
        "MONTH_HOUR_OFFSET must be between {} and {}",
        HOUR_OFFSET_RANGE.start(),
        HOUR_OFFSET_RANGE.end()
    );

    Ok(offset)
}
