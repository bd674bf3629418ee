use serde::Deserialize;

use beos_core::config::Config;
use beos_core::tracing::LogFormat;

/// API service configuration loaded from environment variables.
#[derive(Debug, Deserialize)]
pub struct ApiConfig {
    /// PostgreSQL connection URL. Env var: `DATABASE_URL`.
    pub database_url: String,
    /// Identity provider base URL (e.g. "https://xyz.supabase.co"). Env var: `SUPABASE_URL`.
    pub supabase_url: String,
    /// Provider API key sent as the `apikey` header. Env var: `SUPABASE_KEY`.
    pub supabase_key: String,
    /// HS256 secret the provider signs access tokens with. Env var: `JWT_SECRET`.
    pub jwt_secret: String,
    /// TCP port for the HTTP server (default 8000). Env var: `API_PORT`.
    #[serde(default = "default_api_port")]
    pub api_port: u16,
    /// Comma-separated browser origins allowed by CORS. Env var: `CORS_ORIGINS`.
    #[serde(default = "default_cors_origins")]
    pub cors_origins: String,
    /// `json` or `pretty`. Env var: `LOG_FORMAT`.
    #[serde(default)]
    pub log_format: LogFormat,
}

fn default_api_port() -> u16 {
    8000
}

fn default_cors_origins() -> String {
    "http://localhost:5173,http://127.0.0.1:5173".to_owned()
}

impl Config for ApiConfig {}

impl ApiConfig {
    pub fn cors_origin_list(&self) -> Vec<String> {
        self.cors_origins
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
            .collect()
    }
}
