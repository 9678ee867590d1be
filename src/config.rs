use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BOOKS_ENDPOINT: &str = "http://localhost:8080/api/books";

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    /// Remote catalog the storefront loader fetches from
    pub books_endpoint: String,
    /// Directory backing the storefront's durable key-value store
    pub storage_dir: PathBuf,
    pub http_timeout: Duration,
    /// Seed the demo catalog when the books table is empty
    pub seed_demo: bool,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://book4us.db?mode=rwc".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .ok()
                .map(|s| {
                    s.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            books_endpoint: env::var("BOOKS_ENDPOINT")
                .unwrap_or_else(|_| DEFAULT_BOOKS_ENDPOINT.to_string()),
            storage_dir: env::var("STORAGE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".book4us")),
            http_timeout: Duration::from_secs(
                env::var("HTTP_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(10),
            ),
            seed_demo: env::var("SEED_DEMO")
                .map(|v| v != "false" && v != "0")
                .unwrap_or(true),
        }
    }
}
